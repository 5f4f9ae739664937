//! 格式转换服务 - 业务能力层
//!
//! 只负责"把一个提交文件变成 PDF"，不关心合并和学生分组

use crate::error::{AppResult, FormatError};
use crate::infrastructure::{PdfLatex, TypesetOutcome, Typesetter};
use crate::models::Submission;
use crate::services::language::LanguageTable;
use crate::services::template;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::fs;
use tracing::{debug, info, warn};

/// 单个文件的转换结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// 转换成功，PDF 位于中间目录
    Converted(PathBuf),
    /// 文件被跳过（不影响该学生的其他文件）
    Skipped(SkipReason),
}

/// 跳过原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 扩展名不在映射表中
    UnsupportedExtension(String),
    /// 排版失败
    ConversionFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnsupportedExtension(ext) => write!(f, "不支持的扩展名: {:?}", ext),
            SkipReason::ConversionFailed(detail) => write!(f, "转换失败: {}", detail),
        }
    }
}

/// PDF 转换器
///
/// 职责：
/// - PDF 直接复制到中间目录
/// - 代码/文本套模板后交给排版引擎
/// - 中间文件（.tex / .log）留在中间目录，不清理
/// - 同一次运行内每个提交的中间文件名互不相同
pub struct PdfConverter<T = PdfLatex> {
    scratch_dir: PathBuf,
    languages: LanguageTable,
    typesetter: T,
    claimed: Mutex<HashSet<String>>,
}

impl<T: Typesetter> PdfConverter<T> {
    /// 创建转换器，中间目录不存在时自动创建
    pub fn new(scratch_dir: impl Into<PathBuf>, languages: LanguageTable, typesetter: T) -> AppResult<Self> {
        let scratch_dir = scratch_dir.into();
        std::fs::create_dir_all(&scratch_dir).map_err(|e| FormatError::io(&scratch_dir, e))?;
        Ok(Self {
            scratch_dir,
            languages,
            typesetter,
            claimed: Mutex::new(HashSet::new()),
        })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// 占用一个中间文件名（不含扩展名），已被占用时追加 `-2`、`-3`……
    fn claim_stem(&self, base: &str) -> String {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stem = base.to_string();
        let mut n = 1;
        while !claimed.insert(stem.clone()) {
            n += 1;
            stem = format!("{}-{}", base, n);
        }
        stem
    }

    /// 转换单个文件
    ///
    /// # 参数
    /// - `submission`: 待转换的提交
    /// - `display_name`: 页眉中显示的名字（通常是学生标识）
    pub async fn convert(&self, submission: &Submission, display_name: &str) -> AppResult<Conversion> {
        let ext = submission.extension();

        if ext.eq_ignore_ascii_case("pdf") {
            // 加后缀，避免和同名代码文件生成的 PDF 冲突
            let stem = self.claim_stem(&format!("{}__", submission.raw_stem()));
            let target = self.scratch_dir.join(format!("{}.pdf", stem));
            fs::copy(&submission.path, &target)
                .await
                .map_err(|e| FormatError::io(&submission.path, e))?;
            debug!("复制 PDF: {} -> {}", submission.path.display(), target.display());
            return Ok(Conversion::Converted(target));
        }

        let Some(language) = self.languages.lookup(ext) else {
            warn!("⚠️ 无法转换扩展名为 {:?} 的文件: {}", ext, submission.path.display());
            return Ok(Conversion::Skipped(SkipReason::UnsupportedExtension(ext.to_string())));
        };

        let bytes = fs::read(&submission.path)
            .await
            .map_err(|e| FormatError::io(&submission.path, e))?;
        let body = String::from_utf8_lossy(&bytes);

        let latex = template::render(
            &crate::models::escape_header(display_name),
            &submission.display_name(),
            language,
            &body,
        );

        // 扩展名也进文件名：main.py 和 main.c 不能共用 main.tex / main.pdf
        let base = format!("{}_{}", submission.raw_stem(), ext).replace(' ', "_");
        let source = self
            .scratch_dir
            .join(format!("{}.tex", self.claim_stem(&base)));
        fs::write(&source, latex)
            .await
            .map_err(|e| FormatError::io(&source, e))?;

        info!("📝 排版 {}", submission);
        match self.typesetter.typeset(&source, &self.scratch_dir).await {
            TypesetOutcome::Produced(pdf) => Ok(Conversion::Converted(pdf)),
            TypesetOutcome::Failed(detail) => {
                warn!("⚠️ 排版失败 {}: {}", submission.path.display(), detail);
                Ok(Conversion::Skipped(SkipReason::ConversionFailed(detail)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// 记录调用参数，并写出一个假的 PDF
    #[derive(Default)]
    struct RecordingTypesetter {
        calls: RefCell<Vec<(PathBuf, PathBuf)>>,
        fail: bool,
    }

    impl Typesetter for RecordingTypesetter {
        async fn typeset(&self, source: &Path, workdir: &Path) -> TypesetOutcome {
            self.calls
                .borrow_mut()
                .push((source.to_path_buf(), workdir.to_path_buf()));
            if self.fail {
                return TypesetOutcome::Failed("boom".into());
            }
            let pdf = source.with_extension("pdf");
            std::fs::write(&pdf, b"%PDF-fake").unwrap();
            TypesetOutcome::Produced(pdf)
        }
    }

    fn setup(typesetter: RecordingTypesetter) -> (tempfile::TempDir, PdfConverter<RecordingTypesetter>) {
        let dir = tempfile::tempdir().unwrap();
        let converter =
            PdfConverter::new(dir.path().join("scratch"), LanguageTable::builtin(), typesetter).unwrap();
        (dir, converter)
    }

    fn write_submission(dir: &Path, name: &str, content: &[u8]) -> Submission {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        Submission::parse(path).unwrap()
    }

    #[tokio::test]
    async fn test_pdf_is_copied_verbatim() {
        let (dir, converter) = setup(RecordingTypesetter::default());
        let content = b"%PDF-1.4 not really parsed";
        let sub = write_submission(dir.path(), "s_alice_x_2023-01-01-09-00-00_hw1.PDF", content);

        let result = converter.convert(&sub, "alice").await.unwrap();
        let Conversion::Converted(path) = result else {
            panic!("PDF 应该被直接复制");
        };
        assert_eq!(
            path.file_name().unwrap().to_str(),
            Some("s_alice_x_2023-01-01-09-00-00_hw1__.pdf")
        );
        assert_eq!(std::fs::read(&path).unwrap(), content);
        assert!(converter.typesetter.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_skipped() {
        let (dir, converter) = setup(RecordingTypesetter::default());
        let sub = write_submission(dir.path(), "s_alice_x_2023-01-01-09-00-00_seq.fasta", b">a\nACGT");

        let result = converter.convert(&sub, "alice").await.unwrap();
        assert_eq!(
            result,
            Conversion::Skipped(SkipReason::UnsupportedExtension("fasta".into()))
        );
        assert!(converter.typesetter.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_code_is_typeset_in_scratch_dir() {
        let (dir, converter) = setup(RecordingTypesetter::default());
        let sub = write_submission(
            dir.path(),
            "s_alice_x_2023-01-02-10-00-00_my hw_1.py",
            b"print('hello')\n",
        );

        let result = converter.convert(&sub, "alice").await.unwrap();
        assert!(matches!(result, Conversion::Converted(_)));

        let calls = converter.typesetter.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (source, workdir) = &calls[0];
        assert_eq!(workdir, converter.scratch_dir());
        // 空格替换为下划线，扩展名保留在文件名里
        assert_eq!(
            source.file_name().unwrap().to_str(),
            Some("s_alice_x_2023-01-02-10-00-00_my_hw_1_py.tex")
        );

        let latex = std::fs::read_to_string(source).unwrap();
        assert!(latex.contains(r"\lhead{alice: my hw\_1.py}"));
        assert!(latex.contains("[language=Python]"));
        assert!(latex.contains("print('hello')"));
    }

    #[tokio::test]
    async fn test_same_stem_gets_distinct_scratch_files() {
        let (dir, converter) = setup(RecordingTypesetter::default());
        let names = [
            "s_alice_x_2023-01-01-10-00-00_main.py",
            "s_alice_x_2023-01-01-10-00-00_main.c",
            "s_alice_x_2023-01-01-10-00-00_my hw.py",
            "s_alice_x_2023-01-01-10-00-00_my_hw.py",
        ];

        let mut pdfs = Vec::new();
        for name in names {
            let sub = write_submission(dir.path(), name, name.as_bytes());
            let Conversion::Converted(pdf) = converter.convert(&sub, "alice").await.unwrap() else {
                panic!("{} 应该转换成功", name);
            };
            pdfs.push(pdf);
        }

        let sources: HashSet<PathBuf> = converter
            .typesetter
            .calls
            .borrow()
            .iter()
            .map(|(source, _)| source.clone())
            .collect();
        assert_eq!(sources.len(), names.len());
        assert_eq!(pdfs.iter().collect::<HashSet<_>>().len(), names.len());

        // 每个 .tex 里仍是各自的内容
        for ((source, _), name) in converter.typesetter.calls.borrow().iter().zip(names) {
            assert!(std::fs::read_to_string(source).unwrap().contains(name));
        }
    }

    #[tokio::test]
    async fn test_typeset_failure_is_skipped() {
        let (dir, converter) = setup(RecordingTypesetter {
            fail: true,
            ..Default::default()
        });
        let sub = write_submission(dir.path(), "s_bob_x_2023-01-02-10-00-00_main.c", b"int main;");

        let result = converter.convert(&sub, "bob").await.unwrap();
        assert_eq!(
            result,
            Conversion::Skipped(SkipReason::ConversionFailed("boom".into()))
        );
    }

    #[tokio::test]
    async fn test_missing_input_is_error() {
        let (dir, converter) = setup(RecordingTypesetter::default());
        let sub = Submission::parse(dir.path().join("s_bob_x_2023-01-02-10-00-00_gone.pdf")).unwrap();

        let err = converter.convert(&sub, "bob").await.unwrap_err();
        assert!(matches!(err, FormatError::Io { .. }));
    }
}
