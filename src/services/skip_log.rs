//! 跳过记录服务 - 业务能力层
//!
//! 只负责"写 skipped.txt"能力，不关心流程

use crate::error::{AppResult, FormatError};
use crate::services::converter::SkipReason;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 跳过记录
///
/// 职责：
/// - 把没能转换的文件追加写入记录文件
/// - 每次只处理单个文件
pub struct SkipLog {
    path: PathBuf,
}

impl SkipLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入一条跳过记录
    ///
    /// # 参数
    /// - `student`: 学生标识
    /// - `file`: 被跳过的原始文件
    /// - `reason`: 跳过原因
    pub fn record(&self, student: &str, file: &Path, reason: &SkipReason) -> AppResult<()> {
        debug!("写入跳过记录: {} | {}", student, file.display());

        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| FormatError::io(&self.path, e))?;

        let line = format!(
            "{} | 学生 {} | {} | {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            student,
            file.display(),
            reason
        );
        out.write_all(line.as_bytes())
            .map_err(|e| FormatError::io(&self.path, e))?;

        Ok(())
    }
}
