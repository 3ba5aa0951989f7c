use crate::{
    error::SimulationError,
    task::{Task, TaskId},
};
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Serial,
    Parallel,
}

impl ExecutionMode {
    pub fn title(&self) -> &'static str {
        match self {
            ExecutionMode::Serial => "MODE 1: SINGLE PROCESSING",
            ExecutionMode::Parallel => "MODE 2: PARALLEL PROCESSING + SCHEDULING",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskLog {
    pub task_id: TaskId,
    pub core_id: usize,
    pub total_size: f64,
    pub start_tick: Option<u64>,
    pub finish_tick: Option<u64>,
}

impl TaskLog {
    pub fn new(task: &Task) -> Self {
        Self {
            task_id: task.id(),
            core_id: task.core_id().unwrap_or_default(),
            total_size: task.total_size(),
            start_tick: None,
            finish_tick: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreLog {
    pub core_id: usize,
    pub assigned_tasks: usize,
    pub total_work: f64,
    pub busy_ticks: u64,
    pub utilization: f64,
}

impl CoreLog {
    pub fn new(core_id: usize) -> Self {
        Self {
            core_id,
            assigned_tasks: Default::default(),
            total_work: Default::default(),
            busy_ticks: Default::default(),
            utilization: Default::default(),
        }
    }

    pub fn calculate_utilization(&mut self, total_ticks: u64) {
        self.utilization = if total_ticks == 0 {
            0.0
        } else {
            self.busy_ticks as f64 / total_ticks as f64
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorLog {
    pub average_utilization: f64,
    pub variance_utilization: f64,
    pub core_logs: Vec<CoreLog>,
}

impl ProcessorLog {
    pub fn new(num_cores: usize) -> Self {
        Self {
            average_utilization: Default::default(),
            variance_utilization: Default::default(),
            core_logs: (0..num_cores).map(CoreLog::new).collect(),
        }
    }

    pub fn calculate_average_utilization(&mut self) {
        self.average_utilization = self
            .core_logs
            .iter()
            .map(|core_log| core_log.utilization)
            .sum::<f64>()
            / self.core_logs.len() as f64;
    }

    pub fn calculate_variance_utilization(&mut self) {
        self.variance_utilization = self
            .core_logs
            .iter()
            .map(|core_log| (core_log.utilization - self.average_utilization).powi(2))
            .sum::<f64>()
            / self.core_logs.len() as f64;
    }

    pub fn calculate_cores_utilization(&mut self, total_ticks: u64) {
        for core_log in self.core_logs.iter_mut() {
            core_log.calculate_utilization(total_ticks);
        }
    }
}

/// Everything recorded about one finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub mode: ExecutionMode,
    pub number_of_cores: usize,
    pub number_of_tasks: usize,
    pub total_ticks: u64,
    pub elapsed_secs: f64,
    pub completion_order: Vec<TaskId>,
    pub task_logs: Vec<TaskLog>,
    pub processor_log: ProcessorLog,
}

impl RunLog {
    /// Tick at which the `n`-th task (1-based) finished, following completion order.
    pub fn get_done_count_tick(&self, done_count: usize) -> Option<u64> {
        let task_id = self.completion_order.get(done_count.checked_sub(1)?)?;
        self.task_logs[*task_id].finish_tick
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub serial: RunLog,
    pub parallel: RunLog,
    /// Serial elapsed time over parallel elapsed time.
    pub speedup: Option<f64>,
    /// Same ratio measured in ticks, independent of frame timing jitter.
    pub tick_speedup: Option<f64>,
}

impl ComparisonReport {
    pub fn new(serial: RunLog, parallel: RunLog) -> Self {
        let speedup =
            (parallel.elapsed_secs > 0.0).then(|| serial.elapsed_secs / parallel.elapsed_secs);
        let tick_speedup = (parallel.total_ticks > 0)
            .then(|| serial.total_ticks as f64 / parallel.total_ticks as f64);
        Self {
            generated_at: Utc::now(),
            serial,
            parallel,
            speedup,
            tick_speedup,
        }
    }

    pub fn to_yaml(&self) -> Result<String, SimulationError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_run_log(mode: ExecutionMode, total_ticks: u64, elapsed_secs: f64) -> RunLog {
        RunLog {
            mode,
            number_of_cores: 1,
            number_of_tasks: 2,
            total_ticks,
            elapsed_secs,
            completion_order: vec![1, 0],
            task_logs: vec![
                TaskLog {
                    task_id: 0,
                    core_id: 0,
                    total_size: 10.0,
                    start_tick: Some(2),
                    finish_tick: Some(total_ticks),
                },
                TaskLog {
                    task_id: 1,
                    core_id: 0,
                    total_size: 10.0,
                    start_tick: Some(1),
                    finish_tick: Some(1),
                },
            ],
            processor_log: ProcessorLog::new(1),
        }
    }

    #[test]
    fn test_core_log_calculate_utilization() {
        let mut core_log = CoreLog::new(0);
        core_log.busy_ticks = 3;
        core_log.calculate_utilization(4);
        assert_eq!(core_log.utilization, 0.75);
        core_log.calculate_utilization(0);
        assert_eq!(core_log.utilization, 0.0);
    }

    #[test]
    fn test_processor_log_calculate_statistics() {
        let mut processor_log = ProcessorLog::new(2);
        processor_log.core_logs[0].busy_ticks = 4;
        processor_log.core_logs[1].busy_ticks = 2;
        processor_log.calculate_cores_utilization(4);
        processor_log.calculate_average_utilization();
        processor_log.calculate_variance_utilization();
        assert_eq!(processor_log.core_logs[0].utilization, 1.0);
        assert_eq!(processor_log.core_logs[1].utilization, 0.5);
        assert_eq!(processor_log.average_utilization, 0.75);
        assert_eq!(processor_log.variance_utilization, 0.0625);
    }

    #[test]
    fn test_run_log_get_done_count_tick() {
        let run_log = create_run_log(ExecutionMode::Serial, 5, 1.0);
        assert_eq!(run_log.get_done_count_tick(0), None);
        assert_eq!(run_log.get_done_count_tick(1), Some(1));
        assert_eq!(run_log.get_done_count_tick(2), Some(5));
        assert_eq!(run_log.get_done_count_tick(3), None);
    }

    #[test]
    fn test_comparison_report_speedup() {
        let report = ComparisonReport::new(
            create_run_log(ExecutionMode::Serial, 40, 2.0),
            create_run_log(ExecutionMode::Parallel, 10, 0.5),
        );
        assert_eq!(report.speedup, Some(4.0));
        assert_eq!(report.tick_speedup, Some(4.0));
    }

    #[test]
    fn test_comparison_report_zero_parallel_time() {
        let report = ComparisonReport::new(
            create_run_log(ExecutionMode::Serial, 40, 2.0),
            create_run_log(ExecutionMode::Parallel, 0, 0.0),
        );
        assert_eq!(report.speedup, None);
        assert_eq!(report.tick_speedup, None);
    }

    #[test]
    fn test_comparison_report_to_yaml() {
        let report = ComparisonReport::new(
            create_run_log(ExecutionMode::Serial, 40, 2.0),
            create_run_log(ExecutionMode::Parallel, 10, 0.5),
        );
        let yaml = report.to_yaml().unwrap();
        let parsed: ComparisonReport = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed.serial.mode, ExecutionMode::Serial);
        assert_eq!(parsed.parallel.mode, ExecutionMode::Parallel);
        assert_eq!(parsed.serial.total_ticks, 40);
        assert_eq!(parsed.parallel.completion_order, vec![1, 0]);
        assert_eq!(parsed.speedup, Some(4.0));
        assert!(yaml.contains("mode: serial"));
    }
}
