//! Background stepping of a shared simulation.
//!
//! `AutoAdvance` runs at most one loop at a time. The loop steps the model through its
//! [`SimulationHandle`], sleeps for the configured interval, and checks its run flag before every
//! step. Pausing only clears that flag: a step already in progress always completes, and no
//! further step starts after the loop observes the cleared flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use humantime::format_duration;
use log::{debug, info, warn};

use crate::error::SentinelError;
use crate::handle::SimulationHandle;

type RunFlag = Arc<AtomicBool>;

#[derive(Default)]
pub struct AutoAdvance {
    current: Mutex<Option<RunFlag>>,
}

fn run_loop(handle: &SimulationHandle, running: &AtomicBool, interval: Duration) {
    while running.load(Ordering::Acquire) {
        if let Err(err) = handle.step() {
            warn!("auto-advance stopped: {err}");
            running.store(false, Ordering::Release);
            break;
        }
        thread::sleep(interval);
    }
    debug!("auto-advance loop exited");
}

impl AutoAdvance {
    #[must_use]
    pub fn new() -> Self {
        AutoAdvance::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<RunFlag>> {
        self.current.lock().expect("Mutex poisoned")
    }

    /// Starts stepping `handle` `speed` times per second, replacing any loop already running.
    ///
    /// # Errors
    /// Returns `SentinelError::InvalidConfig` if `speed` is not a positive, finite rate, and
    /// `SentinelError::NotInitialized` if the handle holds no model.
    pub fn start(&self, handle: SimulationHandle, speed: f64) -> Result<(), SentinelError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(SentinelError::InvalidConfig(format!(
                "speed must be a positive number of steps per second, got {speed}"
            )));
        }
        let interval = Duration::try_from_secs_f64(1.0 / speed).map_err(|_| {
            SentinelError::InvalidConfig(format!("speed {speed} is too slow to schedule"))
        })?;
        if !handle.is_initialized() {
            return Err(SentinelError::NotInitialized);
        }

        let running: RunFlag = Arc::new(AtomicBool::new(true));
        if let Some(previous) = self.lock().replace(Arc::clone(&running)) {
            previous.store(false, Ordering::Release);
        }

        info!(
            "auto-advance started: one day every {}",
            format_duration(interval)
        );
        thread::spawn(move || run_loop(&handle, &running, interval));
        Ok(())
    }

    /// Stops the running loop, if any. Returns whether a loop was running.
    pub fn pause(&self) -> bool {
        match self.lock().take() {
            Some(running) => {
                let was_running = running.swap(false, Ordering::AcqRel);
                if was_running {
                    info!("auto-advance paused");
                }
                was_running
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|running| running.load(Ordering::Acquire))
    }
}

impl Drop for AutoAdvance {
    fn drop(&mut self) {
        self.pause();
    }
}
