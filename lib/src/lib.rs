pub mod clock;
pub mod config;
pub mod core;
pub mod distributor;
pub mod error;
pub mod homogeneous;
pub mod output_log;
pub mod simulator;
pub mod snapshot;
pub mod task;
