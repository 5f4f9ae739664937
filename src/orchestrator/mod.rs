//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整个目录的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `folder_processor` - 作业目录处理器
//! - 管理应用生命周期（初始化、运行）
//! - 扫描目录，按学生分组（Vec<HomeworkSet>）
//! - 输出全局统计信息
//!
//! ### `homework_processor` - 单个学生处理器
//! - 遍历单个学生的文件（Vec<Submission>）
//! - 转换、记录跳过、合并
//!
//! ## 层次关系
//!
//! ```text
//! folder_processor (处理 Vec<HomeworkSet>)
//!     ↓
//! homework_processor (处理 Vec<Submission>)
//!     ↓
//! services (能力层：converter / assembler / skip_log)
//!     ↓
//! infrastructure (基础设施：Typesetter)
//! ```

pub mod folder_processor;
pub mod homework_processor;

// 重新导出主要类型
pub use folder_processor::{App, RunStats};
pub use homework_processor::{process_homework, HomeworkOutcome};
