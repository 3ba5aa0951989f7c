//! This module contains the definition of the core and the process result enum
use crate::{
    core::ProcessResult::*,
    task::{Task, TaskId},
};
use getset::{CopyGetters, Getters};
use std::collections::VecDeque;

///enum to represent three types of states
///nothing left to process, execution in progress, execution finished
#[derive(Debug, PartialEq, Clone)]
pub enum ProcessResult {
    Idle,
    Continue,
    Done(TaskId),
}

#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct Core {
    #[getset(get_copy = "pub")]
    core_id: usize,
    #[getset(get_copy = "pub")]
    processing_task: Option<TaskId>,
    #[getset(get = "pub")]
    backlog: VecDeque<TaskId>,
}

impl Core {
    pub fn new(core_id: usize) -> Self {
        Self {
            core_id,
            processing_task: None,
            backlog: VecDeque::new(),
        }
    }

    /// Appends `task` to the end of the backlog and records this core as its owner.
    pub fn enqueue(&mut self, task: &mut Task) {
        task.assign_to(self.core_id);
        self.backlog.push_back(task.id());
    }

    /// Advances this core by one tick.
    ///
    /// An idle core first pulls the head of its backlog, then the processing task
    /// receives `work_amount`. A finished task is released and reported as `Done`.
    pub fn process(&mut self, tasks: &mut [Task], work_amount: f64) -> ProcessResult {
        if self.processing_task.is_none() {
            self.processing_task = self.backlog.pop_front();
        }
        let Some(task_id) = self.processing_task else {
            return Idle;
        };
        if tasks[task_id].apply_work(work_amount) {
            self.processing_task = None;
            return Done(task_id);
        }
        Continue
    }

    /// Number of tasks held, regardless of their remaining work.
    pub fn load(&self) -> usize {
        usize::from(self.processing_task.is_some()) + self.backlog.len()
    }

    pub fn is_idle(&self) -> bool {
        self.load() == 0
    }
}
