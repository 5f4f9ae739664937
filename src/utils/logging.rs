//! 日志工具模块
//!
//! 提供日志初始化和批处理各阶段的输出

use crate::config::Config;
use crate::orchestrator::RunStats;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 默认级别 info（`verbose` 时为 debug），可用 `RUST_LOG` 覆盖
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, input: &Path, output: &Path) {
    info!("{}", "=".repeat(60));
    info!("🚀 作业整理开始");
    info!("📂 输入目录: {}", input.display());
    info!("📁 输出目录: {}", output.display());
    info!("🛠 中间目录: {}", config.scratch_dir.display());
    info!("🖨 排版引擎: {}", config.engine);
    info!("{}", "=".repeat(60));
}

/// 记录扫描结果
///
/// # 参数
/// - `students`: 学生数量
/// - `files`: 参与处理的文件数量（已去掉旧版本）
pub fn log_students_loaded(students: usize, files: usize) {
    info!("✓ 找到 {} 个学生，共 {} 个文件", students, files);
}

/// 记录单个学生开始处理
pub fn log_student_start(index: usize, total: usize, student: &str, files: usize) {
    info!("\n{}", "─".repeat(60));
    info!("👤 [{}/{}] {} ({} 个文件)", index, total, student, files);
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &RunStats, skip_log: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 生成: {}/{}", stats.written, stats.total);
    info!("⏭ 已存在: {}", stats.already_present);
    info!("∅ 无可用文件: {}", stats.empty);
    info!("❌ 失败: {}", stats.failed);
    info!("{}", "=".repeat(60));
    if stats.skipped_files > 0 {
        info!("\n{} 个文件被跳过，记录见: {}", stats.skipped_files, skip_log.display());
    }
}
