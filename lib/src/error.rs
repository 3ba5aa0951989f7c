//! Errors raised while building a simulation from user supplied parameters.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("number of tasks must be between {min} and {max}, got {value}")]
    InvalidTaskCount { value: i64, min: usize, max: usize },
    #[error("number of cores must be between {min} and {max}, got {value}")]
    InvalidCoreCount { value: i64, min: usize, max: usize },
    #[error("speed factor must be a positive finite number, got {0}")]
    InvalidSpeedFactor(f64),
    #[error("tick rate must be at least 1 tick per second, got {0}")]
    InvalidTickRate(u32),
    #[error("task size range {min}..={max} is empty or starts at zero")]
    InvalidTaskSizeRange { min: u32, max: u32 },
    #[error("failed to serialize report to YAML")]
    Serialize(#[from] serde_yaml::Error),
}
