use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum FormatError {
    /// 文件名不符合 `<前缀>_<学生>_<后缀>_<时间戳>_<文件名>` 的命名规则
    #[error("文件名格式错误: {name}")]
    MalformedName { name: String },

    /// 扩展名映射表校验失败
    #[error("无效的语言映射 {extension:?} -> {dialect:?}: {reason}")]
    InvalidLanguage {
        extension: String,
        dialect: String,
        reason: &'static str,
    },

    /// 配置错误
    #[error("配置错误 ({path}): {message}")]
    Config { path: String, message: String },

    /// 文件操作错误
    #[error("文件操作失败 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// PDF 读写错误
    #[error("PDF 处理失败 ({}): {source}", path.display())]
    Pdf {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// PDF 合并失败
    #[error("PDF 合并失败: {0}")]
    Merge(String),
}

// ========== 便捷构造函数 ==========

impl FormatError {
    /// 创建文件操作错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FormatError::Io {
            path: path.into(),
            source,
        }
    }

    /// 创建 PDF 处理错误
    pub fn pdf(path: impl Into<PathBuf>, source: lopdf::Error) -> Self {
        FormatError::Pdf {
            path: path.into(),
            source,
        }
    }

    /// 创建文件名格式错误
    pub fn malformed(name: impl Into<String>) -> Self {
        FormatError::MalformedName { name: name.into() }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, FormatError>;
