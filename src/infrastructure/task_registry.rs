// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::application::use_cases::batch_analysis::BatchReport;

/// 批量分析任务状态
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchTaskState {
    /// 已创建，尚未开始处理
    Starting,
    /// 处理中
    Processing,
    /// 已完成
    Completed,
    /// 已失败
    Failed,
}

/// 批量分析任务
#[derive(Debug, Clone, Serialize)]
pub struct BatchTask {
    /// 任务标识
    pub id: Uuid,
    /// 任务状态
    pub state: BatchTaskState,
    /// 进度百分比 [0.0, 100.0]
    pub progress: f64,
    /// 已完成的域数量
    pub completed: usize,
    /// 域总数
    pub total: usize,
    /// 失败原因
    pub error: Option<String>,
    /// 完成后的批处理报告
    #[serde(skip)]
    pub report: Option<BatchReport>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

/// 内存任务注册表
///
/// 供并发的后台批量分析任务记录和更新进度；每个任务
/// 在完成前只由其所属的后台任务写入
#[derive(Default)]
pub struct TaskRegistry {
    tasks: DashMap<Uuid, BatchTask>,
}

impl TaskRegistry {
    /// 创建新的任务注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个新任务并返回其标识
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.tasks.insert(
            id,
            BatchTask {
                id,
                state: BatchTaskState::Starting,
                progress: 0.0,
                completed: 0,
                total: 0,
                error: None,
                report: None,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// 标记任务进入处理状态
    pub fn mark_processing(&self, id: Uuid, total: usize) {
        if let Some(mut task) = self.tasks.get_mut(&id) {
            task.state = BatchTaskState::Processing;
            task.total = total;
        }
    }

    /// 更新任务进度
    pub fn update_progress(&self, id: Uuid, completed: usize, total: usize) {
        if let Some(mut task) = self.tasks.get_mut(&id) {
            task.completed = completed;
            task.total = total;
            task.progress = if total == 0 {
                100.0
            } else {
                completed as f64 / total as f64 * 100.0
            };
        }
    }

    /// 标记任务完成并保存报告
    pub fn complete(&self, id: Uuid, report: BatchReport) {
        if let Some(mut task) = self.tasks.get_mut(&id) {
            task.state = BatchTaskState::Completed;
            task.progress = 100.0;
            task.report = Some(report);
        }
    }

    /// 标记任务失败
    pub fn fail(&self, id: Uuid, error: String) {
        if let Some(mut task) = self.tasks.get_mut(&id) {
            task.state = BatchTaskState::Failed;
            task.error = Some(error);
        }
    }

    /// 读取任务快照
    pub fn get(&self, id: Uuid) -> Option<BatchTask> {
        self.tasks.get(&id).map(|task| task.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::batch_analysis::BatchReport;

    #[test]
    fn test_task_lifecycle() {
        let registry = TaskRegistry::new();
        let id = registry.create();

        let task = registry.get(id).unwrap();
        assert_eq!(task.state, BatchTaskState::Starting);
        assert_eq!(task.progress, 0.0);

        registry.mark_processing(id, 4);
        registry.update_progress(id, 1, 4);
        let task = registry.get(id).unwrap();
        assert_eq!(task.state, BatchTaskState::Processing);
        assert_eq!(task.progress, 25.0);

        registry.complete(id, BatchReport::default());
        let task = registry.get(id).unwrap();
        assert_eq!(task.state, BatchTaskState::Completed);
        assert_eq!(task.progress, 100.0);
        assert!(task.report.is_some());
    }

    #[test]
    fn test_task_failure() {
        let registry = TaskRegistry::new();
        let id = registry.create();
        registry.fail(id, "bad input".to_string());

        let task = registry.get(id).unwrap();
        assert_eq!(task.state, BatchTaskState::Failed);
        assert_eq!(task.error.as_deref(), Some("bad input"));
    }

    #[test]
    fn test_unknown_task_is_none() {
        let registry = TaskRegistry::new();
        assert!(registry.get(Uuid::new_v4()).is_none());
    }
}
