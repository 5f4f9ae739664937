use crate::error::{AppResult, FormatError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 默认配置文件名（位于当前目录时自动加载）
pub const DEFAULT_CONFIG_FILE: &str = "hw_formatter.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 中间文件目录（.tex / .log / 单文件 PDF）
    pub scratch_dir: PathBuf,
    /// 排版引擎程序名
    pub engine: String,
    /// 排版引擎参数（放在源文件名之前）
    pub engine_args: Vec<String>,
    /// 忽略的扩展名（精确匹配，不含点）
    pub ignore_extensions: Vec<String>,
    /// 合并顺序：列出的逻辑文件名排在前面
    pub file_order: Vec<String>,
    /// 跳过文件记录，相对路径时放在输出目录下
    pub skip_log: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 额外的扩展名 -> listings 语言映射
    pub languages: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from("WORKING_DIRECTORY"),
            engine: "pdflatex".to_string(),
            engine_args: vec![
                "-interaction=nonstopmode".to_string(),
                "-halt-on-error".to_string(),
            ],
            ignore_extensions: vec!["txt".to_string(), "fasta".to_string()],
            file_order: Vec::new(),
            skip_log: PathBuf::from("skipped.txt"),
            verbose_logging: false,
            languages: BTreeMap::new(),
        }
    }
}

impl Config {
    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| FormatError::io(path, e))?;
        toml::from_str(&content).map_err(|e| FormatError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 读取配置：当前目录下的配置文件（若存在），再叠加环境变量
    pub fn discover() -> AppResult<Self> {
        let base = if Path::new(DEFAULT_CONFIG_FILE).is_file() {
            Self::load(Path::new(DEFAULT_CONFIG_FILE))?
        } else {
            Self::default()
        };
        Ok(base.with_env())
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env(self) -> Self {
        let list = |v: String| -> Vec<String> {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        };
        Self {
            scratch_dir: std::env::var("HW_SCRATCH_DIR").map(PathBuf::from).unwrap_or(self.scratch_dir),
            engine: std::env::var("HW_ENGINE").unwrap_or(self.engine),
            ignore_extensions: std::env::var("HW_IGNORE_EXTS").map(list).unwrap_or(self.ignore_extensions),
            file_order: std::env::var("HW_FILE_ORDER").map(list).unwrap_or(self.file_order),
            skip_log: std::env::var("HW_SKIP_LOG").map(PathBuf::from).unwrap_or(self.skip_log),
            verbose_logging: std::env::var("HW_VERBOSE").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            ..self
        }
    }

    /// 是否忽略该扩展名
    pub fn is_ignored(&self, extension: &str) -> bool {
        self.ignore_extensions.iter().any(|e| e == extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ignores_txt_and_fasta() {
        let config = Config::default();
        assert!(config.is_ignored("txt"));
        assert!(config.is_ignored("fasta"));
        assert!(!config.is_ignored("py"));
        // 精确匹配，不做大小写转换
        assert!(!config.is_ignored("TXT"));
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hw_formatter.toml");
        std::fs::write(
            &path,
            r#"
engine = "xelatex"
file_order = ["README.txt", "main.py"]

[languages]
hs = "Haskell"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.engine, "xelatex");
        assert_eq!(config.file_order, vec!["README.txt", "main.py"]);
        assert_eq!(config.languages.get("hs").map(String::as_str), Some("Haskell"));
        // 未写的字段保持默认
        assert_eq!(config.scratch_dir, PathBuf::from("WORKING_DIRECTORY"));
        assert!(config.is_ignored("fasta"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "engine = [").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, FormatError::Config { .. }));
    }
}
