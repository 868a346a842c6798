//! A shareable slot holding at most one [`OutbreakModel`].
//!
//! The model itself does no locking. `SimulationHandle` is the single writer gate: every
//! operation takes the one mutex for its whole duration, so a step never interleaves with a
//! snapshot or a manual trigger, and initializing replaces the whole model at once. Clones of a
//! handle share the same slot.

use std::sync::{Arc, Mutex, MutexGuard};

use log::info;

use crate::config::ModelConfig;
use crate::error::SentinelError;
use crate::model::OutbreakModel;
use crate::state::ModelState;

#[derive(Clone, Default)]
pub struct SimulationHandle {
    slot: Arc<Mutex<Option<OutbreakModel>>>,
}

impl SimulationHandle {
    #[must_use]
    pub fn new() -> Self {
        SimulationHandle::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<OutbreakModel>> {
        self.slot.lock().expect("Mutex poisoned")
    }

    /// Builds a new model from `config` and swaps it in, discarding any previous model and its
    /// history. Returns the new model's initial snapshot.
    ///
    /// # Errors
    /// Returns `SentinelError::InvalidConfig` if the configuration does not validate; the
    /// current model, if any, is left untouched.
    pub fn initialize(&self, config: ModelConfig) -> Result<ModelState, SentinelError> {
        // Build outside the lock so readers are only blocked for the swap.
        let model = OutbreakModel::new(config)?;
        let state = model.get_state();
        let previous = self.lock().replace(model);
        if let Some(previous) = previous {
            info!(
                "replaced simulation that had run for {} days",
                previous.current_day()
            );
        }
        Ok(state)
    }

    /// Same as [`SimulationHandle::initialize`].
    ///
    /// # Errors
    /// See [`SimulationHandle::initialize`].
    pub fn reset(&self, config: ModelConfig) -> Result<ModelState, SentinelError> {
        self.initialize(config)
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.lock().is_some()
    }

    /// Runs `f` with exclusive access to the model.
    ///
    /// # Errors
    /// Returns `SentinelError::NotInitialized` if no model has been initialized.
    pub fn with_model<T>(
        &self,
        f: impl FnOnce(&mut OutbreakModel) -> T,
    ) -> Result<T, SentinelError> {
        let mut slot = self.lock();
        let model = slot.as_mut().ok_or(SentinelError::NotInitialized)?;
        Ok(f(model))
    }

    /// Advances one day and returns the resulting snapshot.
    ///
    /// # Errors
    /// Returns `SentinelError::NotInitialized` if no model has been initialized.
    pub fn step(&self) -> Result<ModelState, SentinelError> {
        self.with_model(|model| {
            model.step();
            model.get_state()
        })
    }

    /// Attempts to start an outbreak; see [`OutbreakModel::trigger_outbreak`].
    ///
    /// # Errors
    /// Returns `SentinelError::NotInitialized` if no model has been initialized.
    pub fn trigger_outbreak(&self) -> Result<bool, SentinelError> {
        self.with_model(OutbreakModel::trigger_outbreak)
    }

    /// # Errors
    /// Returns `SentinelError::NotInitialized` if no model has been initialized.
    pub fn state(&self) -> Result<ModelState, SentinelError> {
        self.with_model(|model| model.get_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn config(seed: u64) -> ModelConfig {
        ModelConfig {
            seed: Some(seed),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn uninitialized_use_is_an_error() {
        let handle = SimulationHandle::new();
        assert!(!handle.is_initialized());
        assert!(matches!(handle.step(), Err(SentinelError::NotInitialized)));
        assert!(matches!(
            handle.trigger_outbreak(),
            Err(SentinelError::NotInitialized)
        ));
        assert!(matches!(handle.state(), Err(SentinelError::NotInitialized)));
    }

    #[test]
    fn initialize_then_step() {
        let handle = SimulationHandle::new();
        let initial = handle.initialize(config(1)).unwrap();
        assert_eq!(initial.day, 0);
        assert_eq!(initial.clinics.len(), 12);

        let stepped = handle.step().unwrap();
        assert_eq!(stepped.day, 1);
        assert_eq!(handle.state().unwrap(), stepped);
    }

    #[test]
    fn reset_discards_history() {
        let handle = SimulationHandle::new();
        handle.initialize(config(1)).unwrap();
        for _ in 0..5 {
            handle.step().unwrap();
        }
        let state = handle
            .reset(ModelConfig {
                num_clinics: 3,
                ..config(2)
            })
            .unwrap();
        assert_eq!(state.day, 0);
        assert!(state.daily_cases_history.is_empty());
        assert_eq!(handle.state().unwrap().clinics.len(), 3);
    }

    #[test]
    fn invalid_config_keeps_current_model() {
        let handle = SimulationHandle::new();
        handle.initialize(config(1)).unwrap();
        handle.step().unwrap();
        let bad = ModelConfig {
            outbreak_probability: 500,
            ..config(1)
        };
        assert!(handle.initialize(bad).is_err());
        assert_eq!(handle.state().unwrap().day, 1);
    }

    #[test]
    fn clones_share_one_model() {
        let handle = SimulationHandle::new();
        handle.initialize(config(3)).unwrap();
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        handle.step().unwrap();
                        handle.state().unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        let state = handle.state().unwrap();
        assert_eq!(state.day, 100);
        assert_eq!(state.daily_cases_history.len(), 100);
    }
}
