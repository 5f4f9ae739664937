//! 排版引擎 - 基础设施层
//!
//! 只负责"把一个 .tex 变成 PDF"的能力，不认识学生和作业

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// 一次排版的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypesetOutcome {
    /// 生成了 PDF
    Produced(PathBuf),
    /// 排版失败（原因仅用于日志）
    Failed(String),
}

/// 排版引擎
#[allow(async_fn_in_trait)]
pub trait Typesetter {
    /// 在 `workdir` 中排版 `source`，成功时返回同名 PDF 的路径
    async fn typeset(&self, source: &Path, workdir: &Path) -> TypesetOutcome;
}

/// 调用外部 pdflatex（或兼容程序）
#[derive(Debug, Clone)]
pub struct PdfLatex {
    program: String,
    args: Vec<String>,
}

impl PdfLatex {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Typesetter for PdfLatex {
    async fn typeset(&self, source: &Path, workdir: &Path) -> TypesetOutcome {
        let Some(file_name) = source.file_name() else {
            return TypesetOutcome::Failed(format!("无效的源文件路径: {}", source.display()));
        };

        // 工作目录直接交给子进程，不修改本进程的当前目录
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(file_name)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => return TypesetOutcome::Failed(format!("无法启动 {}: {}", self.program, e)),
        };

        debug!(
            "{} 输出:\n{}",
            self.program,
            String::from_utf8_lossy(&output.stdout)
        );
        if !output.stderr.is_empty() {
            debug!(
                "{} 错误输出:\n{}",
                self.program,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        if !output.status.success() {
            return TypesetOutcome::Failed(format!("{} 退出状态: {}", self.program, output.status));
        }

        let pdf = workdir.join(Path::new(file_name).with_extension("pdf"));
        if pdf.is_file() {
            TypesetOutcome::Produced(pdf)
        } else {
            TypesetOutcome::Failed(format!("{} 未生成 {}", self.program, pdf.display()))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("a.tex");
        std::fs::write(&tex, "x").unwrap();

        let engine = PdfLatex::new("false", Vec::new());
        let outcome = engine.typeset(&tex, dir.path()).await;
        assert!(matches!(outcome, TypesetOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_missing_output_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("a.tex");
        std::fs::write(&tex, "x").unwrap();

        // 退出码为 0 但没有生成 PDF
        let engine = PdfLatex::new("true", Vec::new());
        let outcome = engine.typeset(&tex, dir.path()).await;
        assert!(matches!(outcome, TypesetOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_missing_program_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("a.tex");

        let engine = PdfLatex::new("definitely-not-a-typesetter-binary", Vec::new());
        let outcome = engine.typeset(&tex, dir.path()).await;
        assert!(matches!(outcome, TypesetOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_runs_in_workdir() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("b.tex");
        std::fs::write(&tex, "x").unwrap();

        // cp b.tex b.pdf 只有在工作目录正确时才能成功
        let engine = PdfLatex::new("sh", vec!["-c".into(), "cp \"$0\" b.pdf".into()]);
        let outcome = engine.typeset(&tex, dir.path()).await;
        assert_eq!(outcome, TypesetOutcome::Produced(dir.path().join("b.pdf")));
    }

    #[tokio::test]
    async fn test_stderr_noise_is_not_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("c.tex");
        std::fs::write(&tex, "x").unwrap();

        // 引擎往 stderr 写警告但正常结束，结果只看退出码和 PDF
        let engine = PdfLatex::new(
            "sh",
            vec!["-c".into(), "echo 'LaTeX Warning' >&2; cp \"$0\" c.pdf".into()],
        );
        let outcome = engine.typeset(&tex, dir.path()).await;
        assert_eq!(outcome, TypesetOutcome::Produced(dir.path().join("c.pdf")));
    }
}
