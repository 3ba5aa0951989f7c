//! Read-only views of the simulation handed to the presentation layer each tick.
use crate::{core::Core, task::Task};
use serde_derive::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreSnapshot {
    pub core_id: usize,
    /// Completion ratio of the task in progress, if any.
    pub current_task_progress: Option<f64>,
    pub backlog_len: usize,
}

impl CoreSnapshot {
    pub fn new(core: &Core, tasks: &[Task]) -> Self {
        Self {
            core_id: core.core_id(),
            current_task_progress: core
                .processing_task()
                .map(|task_id| tasks[task_id].completion_ratio()),
            backlog_len: core.backlog().len(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.current_task_progress.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessorSnapshot {
    pub tick: u64,
    pub core_snapshots: Vec<CoreSnapshot>,
    pub done_count: usize,
    pub total_tasks: usize,
}

impl ProcessorSnapshot {
    /// Share of finished tasks in percent. An empty batch counts as fully done.
    pub fn progress_percent(&self) -> f64 {
        if self.total_tasks == 0 {
            return 100.0;
        }
        self.done_count as f64 / self.total_tasks as f64 * 100.0
    }
}
