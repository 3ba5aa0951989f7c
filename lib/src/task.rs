//! This module contains the definition of the task and the random task batch generator
use getset::CopyGetters;
use rand::Rng;
use serde_derive::Serialize;
use std::ops::RangeInclusive;

/// Index of a task inside its batch.
pub type TaskId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Task {
    id: TaskId,
    total_size: f64,
    remaining: f64,
    is_complete: bool,
    core_id: Option<usize>,
}

impl Task {
    pub fn new(id: TaskId, total_size: f64) -> Self {
        assert!(
            total_size.is_finite() && total_size > 0.0,
            "Task {} must have a positive size, got {}",
            id,
            total_size
        );
        Self {
            id,
            total_size,
            remaining: total_size,
            is_complete: false,
            core_id: None,
        }
    }

    /// Consumes `amount` units of work and returns whether the task is complete.
    ///
    /// Work applied to a finished task is discarded. A negative (or NaN) amount
    /// is a caller bug and panics.
    pub fn apply_work(&mut self, amount: f64) -> bool {
        assert!(
            amount >= 0.0,
            "Work applied to task {} must not be negative, got {}",
            self.id,
            amount
        );
        if self.is_complete {
            return true;
        }
        self.remaining = (self.remaining - amount).max(0.0);
        if self.remaining == 0.0 {
            self.is_complete = true;
        }
        self.is_complete
    }

    /// Ratio of consumed work, in `[0, 1]`.
    pub fn completion_ratio(&self) -> f64 {
        1.0 - self.remaining / self.total_size
    }

    ///a task is owned by a single core for its whole life
    pub(crate) fn assign_to(&mut self, core_id: usize) {
        if let Some(owner) = self.core_id {
            panic!(
                "Task {} is already assigned to core {}, cannot assign it to core {}",
                self.id, owner, core_id
            );
        }
        self.core_id = Some(core_id);
    }
}

/// Builds a batch whose task ids match their index.
pub fn create_task_batch(task_sizes: &[f64]) -> Vec<Task> {
    task_sizes
        .iter()
        .enumerate()
        .map(|(id, &size)| Task::new(id, size))
        .collect()
}

/// Draws `num_tasks` integral sizes uniformly from `size_range`.
pub fn generate_task_sizes<R: Rng + ?Sized>(
    num_tasks: usize,
    size_range: RangeInclusive<u32>,
    rng: &mut R,
) -> Vec<f64> {
    (0..num_tasks)
        .map(|_| f64::from(rng.random_range(size_range.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_task_new_normal() {
        let task = Task::new(3, 120.0);
        assert_eq!(task.id(), 3);
        assert_eq!(task.total_size(), 120.0);
        assert_eq!(task.remaining(), 120.0);
        assert!(!task.is_complete());
        assert_eq!(task.core_id(), None);
    }

    #[test]
    #[should_panic]
    fn test_task_new_zero_size() {
        Task::new(0, 0.0);
    }

    #[test]
    fn test_task_apply_work_normal() {
        let mut task = Task::new(0, 100.0);
        assert!(!task.apply_work(25.0));
        assert_eq!(task.remaining(), 75.0);
        assert_eq!(task.completion_ratio(), 0.25);
    }

    #[test]
    fn test_task_apply_work_clamps_at_zero() {
        let mut task = Task::new(0, 10.0);
        assert!(task.apply_work(25.0));
        assert_eq!(task.remaining(), 0.0);
        assert!(task.is_complete());
        assert_eq!(task.completion_ratio(), 1.0);
    }

    #[test]
    fn test_task_apply_work_after_complete() {
        let mut task = Task::new(0, 10.0);
        task.apply_work(10.0);
        let finished = task.clone();
        assert!(task.apply_work(5.0));
        assert!(task.apply_work(0.0));
        assert_eq!(task, finished);
    }

    #[test]
    fn test_task_apply_work_zero_amount() {
        let mut task = Task::new(0, 10.0);
        assert!(!task.apply_work(0.0));
        assert_eq!(task.remaining(), 10.0);
    }

    #[test]
    #[should_panic]
    fn test_task_apply_work_negative_amount() {
        let mut task = Task::new(0, 10.0);
        task.apply_work(-1.0);
    }

    #[test]
    fn test_task_remaining_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for size in generate_task_sizes(50, 80..=150, &mut rng) {
            let mut task = Task::new(0, size);
            while !task.is_complete() {
                task.apply_work(rng.random_range(0.0..12.0));
                assert!(task.remaining() >= 0.0);
                assert!(task.remaining() <= task.total_size());
                assert_eq!(task.is_complete(), task.remaining() == 0.0);
            }
        }
    }

    #[test]
    fn test_task_assign_to_normal() {
        let mut task = Task::new(0, 10.0);
        task.assign_to(2);
        assert_eq!(task.core_id(), Some(2));
    }

    #[test]
    #[should_panic]
    fn test_task_assign_to_twice() {
        let mut task = Task::new(0, 10.0);
        task.assign_to(0);
        task.assign_to(1);
    }

    #[test]
    fn test_create_task_batch_ids_match_index() {
        let tasks = create_task_batch(&[10.0, 20.0, 30.0]);
        assert_eq!(tasks.len(), 3);
        for (i, task) in tasks.iter().enumerate() {
            assert_eq!(task.id(), i);
        }
        assert_eq!(tasks[2].total_size(), 30.0);
    }

    #[test]
    fn test_generate_task_sizes_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let sizes = generate_task_sizes(200, 80..=150, &mut rng);
        assert_eq!(sizes.len(), 200);
        assert!(sizes.iter().all(|size| (80.0..=150.0).contains(size)));
        assert!(sizes.iter().all(|size| size.fract() == 0.0));
    }

    #[test]
    fn test_generate_task_sizes_same_seed() {
        let first = generate_task_sizes(20, 80..=150, &mut StdRng::seed_from_u64(1));
        let second = generate_task_sizes(20, 80..=150, &mut StdRng::seed_from_u64(1));
        assert_eq!(first, second);
    }
}
