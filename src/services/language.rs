//! 扩展名 -> 排版语言映射

use crate::error::{AppResult, FormatError};
use phf::phf_map;
use std::collections::BTreeMap;

/// 排版方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Language {
    /// listings 宏包语法高亮，值为 listings 的语言名
    Listing(String),
    /// 原样输出（verbatim 环境）
    Verbatim,
}

impl Language {
    fn from_tag(tag: &str) -> Self {
        if tag == VERBATIM_TAG {
            Language::Verbatim
        } else {
            Language::Listing(tag.to_string())
        }
    }
}

const VERBATIM_TAG: &str = "verbatim";

/// 内置映射（大小写敏感）
static BUILTIN: phf::Map<&'static str, &'static str> = phf_map! {
    "cc" => "C++",
    "cpp" => "C++",
    "c" => "C",
    "R" => "R",
    "r" => "R",
    "php" => "PHP",
    "rb" => "Ruby",
    "py" => "Python",
    "pl" => "Perl",
    "java" => "Java",
    "txt" => "verbatim",
    "Rnw" => "verbatim",
    "Rmd" => "verbatim",
};

/// 启动时校验过的扩展名映射表
#[derive(Debug, Clone)]
pub struct LanguageTable {
    entries: BTreeMap<String, Language>,
}

impl LanguageTable {
    /// 内置映射
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .entries()
            .map(|(ext, tag)| (ext.to_string(), Language::from_tag(tag)))
            .collect();
        Self { entries }
    }

    /// 内置映射 + 配置中的额外映射（同名时配置优先）
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> AppResult<Self> {
        let mut table = Self::builtin();
        for (ext, tag) in overrides {
            validate_entry(ext, tag)?;
            table.entries.insert(ext.clone(), Language::from_tag(tag));
        }
        Ok(table)
    }

    pub fn lookup(&self, extension: &str) -> Option<&Language> {
        self.entries.get(extension)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_entry(extension: &str, dialect: &str) -> AppResult<()> {
    let invalid = |reason| FormatError::InvalidLanguage {
        extension: extension.to_string(),
        dialect: dialect.to_string(),
        reason,
    };

    if extension.is_empty() {
        return Err(invalid("扩展名为空"));
    }
    if extension.contains('.') {
        return Err(invalid("扩展名不能包含点"));
    }
    if extension.eq_ignore_ascii_case("pdf") {
        return Err(invalid("pdf 文件直接复制，不能映射语言"));
    }
    if dialect.trim().is_empty() {
        return Err(invalid("语言名为空"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let table = LanguageTable::builtin();
        assert_eq!(table.lookup("py"), Some(&Language::Listing("Python".into())));
        assert_eq!(table.lookup("cc"), Some(&Language::Listing("C++".into())));
        assert_eq!(table.lookup("R"), table.lookup("r"));
        assert_eq!(table.lookup("Rmd"), Some(&Language::Verbatim));
        assert_eq!(table.lookup("txt"), Some(&Language::Verbatim));
        assert_eq!(table.lookup("fasta"), None);
        // 大小写敏感
        assert_eq!(table.lookup("PY"), None);
    }

    #[test]
    fn test_builtin_entries_are_valid() {
        for (ext, tag) in BUILTIN.entries() {
            assert!(validate_entry(ext, tag).is_ok(), "{} -> {}", ext, tag);
        }
        assert_eq!(LanguageTable::builtin().len(), BUILTIN.len());
    }

    #[test]
    fn test_overrides() {
        let mut extra = BTreeMap::new();
        extra.insert("hs".to_string(), "Haskell".to_string());
        extra.insert("py".to_string(), "verbatim".to_string());

        let table = LanguageTable::with_overrides(&extra).unwrap();
        assert_eq!(table.lookup("hs"), Some(&Language::Listing("Haskell".into())));
        assert_eq!(table.lookup("py"), Some(&Language::Verbatim));
    }

    #[test]
    fn test_invalid_overrides() {
        for (ext, tag) in [("", "C"), (".py", "Python"), ("pdf", "verbatim"), ("go", "  ")] {
            let mut extra = BTreeMap::new();
            extra.insert(ext.to_string(), tag.to_string());
            let err = LanguageTable::with_overrides(&extra).unwrap_err();
            assert!(matches!(err, FormatError::InvalidLanguage { .. }));
        }
    }
}
