//! # HW Formatter
//!
//! 把学习管理系统导出的作业文件（代码 + PDF）整理成每个学生一个 PDF
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部排版进程的调用，只暴露能力
//! - `Typesetter` / `PdfLatex` - 在指定目录中把 .tex 排成 PDF
//!
//! ### ② 数据层（Models）
//! - `Submission` - 解析上传文件名（学生、时间戳、逻辑文件名）
//! - `HomeworkSet` - 单个学生的作业，每个逻辑文件只保留最新版本
//!
//! ### ③ 业务能力层（Services）
//! - `PdfConverter` - 单个文件转 PDF（PDF 直接复制，代码套模板排版）
//! - `assembler` - 按顺序合并 PDF
//! - `SkipLog` - 写跳过记录
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/folder_processor` - 整个目录，按学生顺序处理
//! - `orchestrator/homework_processor` - 单个学生：转换 → 合并

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppResult, FormatError};
pub use infrastructure::{PdfLatex, TypesetOutcome, Typesetter};
pub use models::{HomeworkSet, Submission};
pub use orchestrator::{App, RunStats};
pub use services::{Conversion, PdfConverter, SkipReason};
