//! 单个上传文件
//!
//! 上传系统的命名规则：`<前缀>_<学生>_<后缀>_<YYYY-MM-DD-HH-MM-SS>_<原文件名>`

use crate::error::{AppResult, FormatError};
use chrono::NaiveDateTime;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<prefix>[^_]*)_(?P<student>[^_]+)_(?P<suffix>.*?)_(?P<timestamp>\d{4}-\d{2}-\d{2}-\d{2}-\d{2}-\d{2})_(?P<name>.+)$",
        )
        .expect("文件名正则无效")
    })
}

/// 一次提交（某个逻辑文件的一个版本）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// 原始文件路径
    pub path: PathBuf,
    /// 学生标识
    pub student: String,
    /// 提交时间
    pub submitted_at: NaiveDateTime,
    /// 逻辑文件名（去掉学生和时间戳后的原文件名）
    pub logical_name: String,
}

impl Submission {
    /// 从文件路径解析提交信息
    pub fn parse(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FormatError::malformed(path.display().to_string()))?;

        let caps = name_pattern()
            .captures(file_name)
            .ok_or_else(|| FormatError::malformed(file_name))?;

        let submitted_at = NaiveDateTime::parse_from_str(&caps["timestamp"], TIMESTAMP_FORMAT)
            .map_err(|_| FormatError::malformed(file_name))?;

        Ok(Self {
            student: caps["student"].to_string(),
            logical_name: caps["name"].to_string(),
            submitted_at,
            path,
        })
    }

    /// 逻辑文件名的扩展名（不含点，可能为空）
    pub fn extension(&self) -> &str {
        match self.logical_name.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => "",
        }
    }

    /// 适合放进 LaTeX 页眉的文件名
    pub fn display_name(&self) -> String {
        escape_header(&self.logical_name)
    }

    /// 原始文件名去掉扩展名，用作中间文件的名字
    pub fn raw_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.logical_name.clone())
    }
}

/// 转义页眉中的 LaTeX 特殊字符
pub fn escape_header(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '_' | '%' | '&' | '#' | '$' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

impl std::fmt::Display for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} | {} | {}]",
            self.student,
            self.logical_name,
            self.submitted_at.format(TIMESTAMP_FORMAT)
        )
    }
}
