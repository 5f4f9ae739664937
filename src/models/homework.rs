//! 单个学生的作业集合

use crate::models::submission::Submission;
use std::collections::BTreeMap;

/// 单个学生的作业：每个逻辑文件只保留最新版本
#[derive(Debug, Clone)]
pub struct HomeworkSet {
    pub student: String,
    pub submissions: Vec<Submission>,
}

impl HomeworkSet {
    /// 创建作业集合
    ///
    /// # 参数
    /// - `student`: 学生标识
    /// - `submissions`: 该学生的全部提交（可含多个版本）
    /// - `file_order`: 指定的合并顺序，未列出的文件按逻辑文件名排在后面
    pub fn new(student: impl Into<String>, submissions: Vec<Submission>, file_order: &[String]) -> Self {
        let mut latest = select_latest(submissions);
        if !file_order.is_empty() {
            // sort_by_key 是稳定排序，未列出的文件保持按文件名的顺序
            latest.sort_by_key(|s| {
                file_order
                    .iter()
                    .position(|name| name == &s.logical_name)
                    .unwrap_or(file_order.len())
            });
        }
        Self {
            student: student.into(),
            submissions: latest,
        }
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}

/// 按逻辑文件名分组，每组保留提交时间最晚的一个
///
/// 结果按逻辑文件名排序。时间戳完全相同的两个版本谁被保留是未定义的。
pub fn select_latest(submissions: Vec<Submission>) -> Vec<Submission> {
    let mut groups: BTreeMap<String, Vec<Submission>> = BTreeMap::new();
    for sub in submissions {
        groups.entry(sub.logical_name.clone()).or_default().push(sub);
    }

    groups
        .into_values()
        .filter_map(|group| group.into_iter().max_by_key(|s| s.submitted_at))
        .collect()
}
