//! 单个学生处理器 - 编排层
//!
//! ## 职责
//!
//! 处理一个学生的全部文件：逐个转换，再合并成 `<学生>.pdf`。
//!
//! 1. **幂等**：输出文件已存在时直接跳过（不覆盖）
//! 2. **逐个转换**：委托给 `PdfConverter`
//! 3. **跳过记录**：无法转换的文件写入 `SkipLog`，不影响其他文件
//! 4. **合并**：委托给 `assembler`

use crate::infrastructure::Typesetter;
use crate::models::HomeworkSet;
use crate::services::{assembler, Assembled, Conversion, PdfConverter, SkipLog};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

/// 单个学生的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeworkOutcome {
    /// 已生成输出文件（页数读不出来时为 `None`）
    Written { pages: Option<usize>, skipped: usize },
    /// 输出文件已存在，未处理
    AlreadyPresent,
    /// 没有任何文件能转换，未生成输出
    Empty { skipped: usize },
}

/// 处理单个学生
///
/// # 参数
/// - `converter`: 格式转换器
/// - `skip_log`: 跳过记录
/// - `homework`: 学生作业（已筛选为最新版本）
/// - `out_folder`: 输出目录
pub async fn process_homework<T: Typesetter>(
    converter: &PdfConverter<T>,
    skip_log: &SkipLog,
    homework: &HomeworkSet,
    out_folder: &Path,
) -> Result<HomeworkOutcome> {
    let student = homework.student.as_str();
    let outfile = out_folder.join(format!("{}.pdf", student));
    if outfile.exists() {
        info!("[{}] ⏭ 输出已存在，跳过: {}", student, outfile.display());
        return Ok(HomeworkOutcome::AlreadyPresent);
    }

    let mut pdfs = Vec::with_capacity(homework.len());
    let mut skipped = 0;

    for submission in &homework.submissions {
        let conversion = converter
            .convert(submission, student)
            .await
            .with_context(|| format!("转换失败: {}", submission.path.display()))?;

        match conversion {
            Conversion::Converted(pdf) => pdfs.push(pdf),
            Conversion::Skipped(reason) => {
                skipped += 1;
                warn!("[{}] 跳过 {}: {}", student, submission.logical_name, reason);
                if let Err(e) = skip_log.record(student, &submission.path, &reason) {
                    error!("[{}] 写入跳过记录失败: {}", student, e);
                }
            }
        }
    }

    // lopdf 的解析和写盘是同步的，放到阻塞线程里，不卡住 Ctrl-C 的处理
    let assembled = {
        let pdfs = pdfs.clone();
        let outfile = outfile.clone();
        tokio::task::spawn_blocking(move || assembler::assemble(&pdfs, &outfile))
            .await
            .context("合并任务异常退出")?
    };

    match assembled {
        Ok(Assembled::Written { pages }) => {
            let pages_text = pages.map_or_else(|| "?".to_string(), |n| n.to_string());
            info!(
                "[{}] ✓ 已生成 {} ({} 个文件, {} 页)",
                student,
                outfile.display(),
                pdfs.len(),
                pages_text
            );
            Ok(HomeworkOutcome::Written { pages, skipped })
        }
        Ok(Assembled::Nothing) => {
            warn!("[{}] 没有可合并的文件，未生成输出", student);
            Ok(HomeworkOutcome::Empty { skipped })
        }
        Err(e) => {
            // 不留下半成品，否则下次运行会被当成已完成
            let _ = std::fs::remove_file(&outfile);
            Err(e).with_context(|| format!("合并失败: {}", outfile.display()))
        }
    }
}
