//! Scheduler configuration.

use std::time::Duration;

use crate::interpolate::Interpolation;

/// Settings shared by every replay loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Frames emitted per wall-clock second while playing
    pub target_fps: u32,
    /// Upper bound on simultaneously registered replays
    pub max_concurrent_replays: usize,
    pub interpolation: Interpolation,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            max_concurrent_replays: 100,
            interpolation: Interpolation::Step,
        }
    }
}

impl SchedulerConfig {
    /// Longest a loop waits for a command before ticking.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_interval_from_fps() {
        let config = SchedulerConfig {
            target_fps: 20,
            ..Default::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_millis(50));

        let zero = SchedulerConfig {
            target_fps: 0,
            ..Default::default()
        };
        assert_eq!(zero.frame_interval(), Duration::from_secs(1));
    }
}
