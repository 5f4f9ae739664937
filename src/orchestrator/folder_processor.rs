//! 作业目录处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责整个目录的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验扩展名映射、创建中间目录
//! 2. **扫描**：读取输入目录（不递归），按扩展名过滤，按学生分组
//! 3. **版本筛选**：每个学生的每个文件只保留最新版本
//! 4. **顺序处理**：逐个学生委托 `homework_processor`，单个学生失败不影响其他学生
//! 5. **全局统计**：汇总所有学生的处理结果

use crate::config::Config;
use crate::infrastructure::{PdfLatex, Typesetter};
use crate::models::{HomeworkSet, Submission};
use crate::orchestrator::homework_processor::{self, HomeworkOutcome};
use crate::services::{LanguageTable, PdfConverter, SkipLog};
use crate::utils::logging;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App<T = PdfLatex> {
    config: Config,
    converter: PdfConverter<T>,
}

impl App<PdfLatex> {
    /// 使用配置中的排版引擎初始化应用
    pub fn new(config: Config) -> Result<Self> {
        let typesetter = PdfLatex::new(config.engine.clone(), config.engine_args.clone());
        Self::with_typesetter(config, typesetter)
    }
}

impl<T: Typesetter> App<T> {
    /// 使用指定的排版引擎初始化应用
    pub fn with_typesetter(config: Config, typesetter: T) -> Result<Self> {
        let languages = LanguageTable::with_overrides(&config.languages)
            .context("扩展名映射校验失败")?;
        let converter = PdfConverter::new(config.scratch_dir.clone(), languages, typesetter)
            .context("无法创建中间目录")?;

        Ok(Self { config, converter })
    }

    /// 处理整个输入目录
    ///
    /// # 参数
    /// - `input`: 输入目录（上传系统导出的平铺目录）
    /// - `output`: 输出目录，每个学生一个 `<学生>.pdf`
    pub async fn run(&self, input: &Path, output: &Path) -> Result<RunStats> {
        logging::log_startup(&self.config, input, output);

        fs::create_dir_all(output)
            .await
            .with_context(|| format!("无法创建输出目录: {}", output.display()))?;

        let homeworks = self.load_homeworks(input).await?;
        let mut stats = RunStats {
            total: homeworks.len(),
            ..Default::default()
        };

        let skip_log = SkipLog::new(output.join(&self.config.skip_log));

        if homeworks.is_empty() {
            warn!("⚠️ 没有找到待处理的文件，程序结束");
            return Ok(stats);
        }

        for (idx, homework) in homeworks.iter().enumerate() {
            logging::log_student_start(idx + 1, stats.total, &homework.student, homework.len());

            match homework_processor::process_homework(&self.converter, &skip_log, homework, output)
                .await
            {
                Ok(HomeworkOutcome::Written { skipped, .. }) => {
                    stats.written += 1;
                    stats.skipped_files += skipped;
                }
                Ok(HomeworkOutcome::AlreadyPresent) => stats.already_present += 1,
                Ok(HomeworkOutcome::Empty { skipped }) => {
                    stats.empty += 1;
                    stats.skipped_files += skipped;
                }
                Err(e) => {
                    error!("[{}] ❌ 处理过程中发生错误: {:#}", homework.student, e);
                    stats.failed += 1;
                }
            }
        }

        logging::print_final_stats(&stats, skip_log.path());
        Ok(stats)
    }

    /// 扫描输入目录，按学生分组并筛选最新版本
    async fn load_homeworks(&self, input: &Path) -> Result<Vec<HomeworkSet>> {
        info!("\n📁 正在扫描 {} ...", input.display());

        let mut entries = fs::read_dir(input)
            .await
            .with_context(|| format!("无法读取输入目录: {}", input.display()))?;

        let mut by_student: BTreeMap<String, Vec<Submission>> = BTreeMap::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let path = entry.path();
            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.config.is_ignored(&extension) {
                continue;
            }

            match Submission::parse(&path) {
                Ok(submission) => by_student
                    .entry(submission.student.clone())
                    .or_default()
                    .push(submission),
                Err(e) => warn!("⚠️ 无法识别的文件，已忽略: {}", e),
            }
        }

        let homeworks: Vec<HomeworkSet> = by_student
            .into_iter()
            .map(|(student, submissions)| {
                HomeworkSet::new(student, submissions, &self.config.file_order)
            })
            .collect();

        let files = homeworks.iter().map(HomeworkSet::len).sum();
        logging::log_students_loaded(homeworks.len(), files);

        Ok(homeworks)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// 学生总数
    pub total: usize,
    /// 新生成的输出文件
    pub written: usize,
    /// 输出已存在而跳过的学生
    pub already_present: usize,
    /// 没有可用文件的学生
    pub empty: usize,
    /// 处理失败的学生
    pub failed: usize,
    /// 被跳过的单个文件
    pub skipped_files: usize,
}
