//! Sources of the per-tick elapsed time that drives the work quantum.
use std::{
    thread,
    time::{Duration, Instant},
};

pub trait FrameClock {
    /// Milliseconds elapsed since the previous tick.
    fn tick(&mut self) -> f64;
}

/// Wall clock capped at a target tick rate.
///
/// Each call sleeps for whatever remains of the frame budget, then reports the
/// real time since the previous call, sleep included.
#[derive(Debug, Clone)]
pub struct ThrottledClock {
    frame_budget: Duration,
    last_tick: Instant,
}

impl ThrottledClock {
    pub fn new(target_tick_rate: u32) -> Self {
        assert!(target_tick_rate > 0, "Tick rate must be positive");
        Self {
            frame_budget: Duration::from_secs(1) / target_tick_rate,
            last_tick: Instant::now(),
        }
    }
}

impl FrameClock for ThrottledClock {
    fn tick(&mut self) -> f64 {
        let busy = self.last_tick.elapsed();
        if busy < self.frame_budget {
            thread::sleep(self.frame_budget - busy);
        }
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        self.last_tick = now;
        dt.as_secs_f64() * 1000.0
    }
}

/// Reports the same interval on every tick without waiting.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    dt_ms: f64,
}

impl FixedClock {
    pub fn new(dt_ms: f64) -> Self {
        assert!(
            dt_ms.is_finite() && dt_ms > 0.0,
            "Tick interval must be positive"
        );
        Self { dt_ms }
    }

    /// Interval of one frame at `target_tick_rate` ticks per second.
    pub fn from_tick_rate(target_tick_rate: u32) -> Self {
        assert!(target_tick_rate > 0, "Tick rate must be positive");
        Self::new(1000.0 / f64::from(target_tick_rate))
    }
}

impl FrameClock for FixedClock {
    fn tick(&mut self) -> f64 {
        self.dt_ms
    }
}
