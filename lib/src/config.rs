//! Parameters shared by the serial and the parallel run.
use crate::{error::SimulationError, task::generate_task_sizes};
use log::warn;
use rand::{rngs::StdRng, SeedableRng};
use serde_derive::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const DEFAULT_NUMBER_OF_TASKS: usize = 20;
pub const DEFAULT_NUMBER_OF_CORES: usize = 4;
pub const MIN_NUMBER_OF_TASKS: usize = 1;
pub const MAX_NUMBER_OF_TASKS: usize = 1000;
pub const MIN_NUMBER_OF_CORES: usize = 1;
pub const MAX_NUMBER_OF_CORES: usize = 64;
/// Work units consumed per millisecond of frame time.
pub const DEFAULT_SPEED_FACTOR: f64 = 0.08;
pub const DEFAULT_TICK_RATE: u32 = 60;
pub const DEFAULT_TASK_SIZE_MIN: u32 = 80;
pub const DEFAULT_TASK_SIZE_MAX: u32 = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub number_of_tasks: usize,
    pub number_of_cores: usize,
    pub speed_factor: f64,
    pub tick_rate: u32,
    pub task_size_min: u32,
    pub task_size_max: u32,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            number_of_tasks: DEFAULT_NUMBER_OF_TASKS,
            number_of_cores: DEFAULT_NUMBER_OF_CORES,
            speed_factor: DEFAULT_SPEED_FACTOR,
            tick_rate: DEFAULT_TICK_RATE,
            task_size_min: DEFAULT_TASK_SIZE_MIN,
            task_size_max: DEFAULT_TASK_SIZE_MAX,
            seed: None,
        }
    }
}

fn check_count(value: i64, min: usize, max: usize) -> Option<usize> {
    usize::try_from(value)
        .ok()
        .filter(|count| (min..=max).contains(count))
}

fn clamp_count(value: i64, min: usize, max: usize) -> usize {
    usize::try_from(value).unwrap_or(min).clamp(min, max)
}

impl SimulationConfig {
    /// Builds a default configuration with the given counts, rejecting values out of bounds.
    pub fn with_counts(
        number_of_tasks: i64,
        number_of_cores: i64,
    ) -> Result<Self, SimulationError> {
        let Some(tasks) = check_count(number_of_tasks, MIN_NUMBER_OF_TASKS, MAX_NUMBER_OF_TASKS)
        else {
            return Err(SimulationError::InvalidTaskCount {
                value: number_of_tasks,
                min: MIN_NUMBER_OF_TASKS,
                max: MAX_NUMBER_OF_TASKS,
            });
        };
        let Some(cores) = check_count(number_of_cores, MIN_NUMBER_OF_CORES, MAX_NUMBER_OF_CORES)
        else {
            return Err(SimulationError::InvalidCoreCount {
                value: number_of_cores,
                min: MIN_NUMBER_OF_CORES,
                max: MAX_NUMBER_OF_CORES,
            });
        };
        Ok(Self {
            number_of_tasks: tasks,
            number_of_cores: cores,
            ..Default::default()
        })
    }

    /// Same as `with_counts`, but out-of-range counts are pulled back into bounds.
    pub fn with_clamped_counts(number_of_tasks: i64, number_of_cores: i64) -> Self {
        let tasks = clamp_count(number_of_tasks, MIN_NUMBER_OF_TASKS, MAX_NUMBER_OF_TASKS);
        let cores = clamp_count(number_of_cores, MIN_NUMBER_OF_CORES, MAX_NUMBER_OF_CORES);
        if i64::try_from(tasks) != Ok(number_of_tasks) {
            warn!(
                "Number of tasks {} is out of range, using {}",
                number_of_tasks, tasks
            );
        }
        if i64::try_from(cores) != Ok(number_of_cores) {
            warn!(
                "Number of cores {} is out of range, using {}",
                number_of_cores, cores
            );
        }
        Self {
            number_of_tasks: tasks,
            number_of_cores: cores,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(MIN_NUMBER_OF_TASKS..=MAX_NUMBER_OF_TASKS).contains(&self.number_of_tasks) {
            return Err(SimulationError::InvalidTaskCount {
                value: i64::try_from(self.number_of_tasks).unwrap_or(i64::MAX),
                min: MIN_NUMBER_OF_TASKS,
                max: MAX_NUMBER_OF_TASKS,
            });
        }
        if !(MIN_NUMBER_OF_CORES..=MAX_NUMBER_OF_CORES).contains(&self.number_of_cores) {
            return Err(SimulationError::InvalidCoreCount {
                value: i64::try_from(self.number_of_cores).unwrap_or(i64::MAX),
                min: MIN_NUMBER_OF_CORES,
                max: MAX_NUMBER_OF_CORES,
            });
        }
        if !(self.speed_factor.is_finite() && self.speed_factor > 0.0) {
            return Err(SimulationError::InvalidSpeedFactor(self.speed_factor));
        }
        if self.tick_rate == 0 {
            return Err(SimulationError::InvalidTickRate(self.tick_rate));
        }
        if self.task_size_min == 0 || self.task_size_min > self.task_size_max {
            return Err(SimulationError::InvalidTaskSizeRange {
                min: self.task_size_min,
                max: self.task_size_max,
            });
        }
        Ok(())
    }

    pub fn task_size_range(&self) -> RangeInclusive<u32> {
        self.task_size_min..=self.task_size_max
    }

    pub fn create_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    pub fn generate_task_sizes(&self, rng: &mut StdRng) -> Vec<f64> {
        generate_task_sizes(self.number_of_tasks, self.task_size_range(), rng)
    }
}
