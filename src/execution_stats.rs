// Loss of precision is allowable in this module's use cases.
#![allow(clippy::cast_precision_loss)]

use std::time::{Duration, Instant};

use humantime::format_duration;
use log::info;

/// Wall-clock statistics for a headless run. If no days were simulated the per-day time is
/// zero.
#[derive(Debug)]
pub struct ExecutionStatistics {
    pub wall_time: Duration,
    pub days: u32,
    pub wall_time_per_day: Duration,
}

pub(crate) struct ExecutionTimer {
    start_time: Instant,
}

impl ExecutionTimer {
    pub fn start() -> ExecutionTimer {
        ExecutionTimer {
            start_time: Instant::now(),
        }
    }

    pub fn finish(&self, days: u32) -> ExecutionStatistics {
        let wall_time = self.start_time.elapsed();
        let wall_time_per_day = if days > 0 {
            wall_time / days
        } else {
            Duration::ZERO
        };
        ExecutionStatistics {
            wall_time,
            days,
            wall_time_per_day,
        }
    }
}

pub fn log_execution_statistics(stats: &ExecutionStatistics) {
    info!("simulated {} days", stats.days);
    info!("wall time: {}", format_duration(stats.wall_time));
    if stats.days > 0 {
        info!(
            "wall time per day: {} ({:.1} days/s)",
            format_duration(stats.wall_time_per_day),
            f64::from(stats.days) / stats.wall_time.as_secs_f64().max(f64::MIN_POSITIVE)
        );
    }
}
