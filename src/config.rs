//! Model configuration. A `ModelConfig` can be built in code, deserialized from a JSON file or
//! request body (any missing field takes its default), and must pass [`ModelConfig::validate`]
//! before a model is built from it.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::clinic::CLINIC_NAMES;
use crate::error::SentinelError;

pub const DEFAULT_NUM_CLINICS: usize = 12;
pub const DEFAULT_OUTBREAK_PROBABILITY: u32 = 30;
pub const DEFAULT_GRID_WIDTH: u32 = 10;
pub const DEFAULT_GRID_HEIGHT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of clinics to create; capped by the size of the clinic name pool.
    pub num_clinics: usize,
    /// Chance, in percent, that an attempted outbreak trigger succeeds.
    pub outbreak_probability: u32,
    pub grid_width: u32,
    pub grid_height: u32,
    /// Base seed for all random streams. Drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            num_clinics: DEFAULT_NUM_CLINICS,
            outbreak_probability: DEFAULT_OUTBREAK_PROBABILITY,
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            seed: None,
        }
    }
}

impl ModelConfig {
    /// Reads a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid configuration.
    pub fn from_json_file(path: &Path) -> Result<ModelConfig, SentinelError> {
        let data = std::fs::read_to_string(path)?;
        let config: ModelConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// The outbreak probability as a fraction in `[0, 1]`.
    #[must_use]
    pub fn outbreak_chance(&self) -> f64 {
        f64::from(self.outbreak_probability) / 100.0
    }

    /// Clamps `num_clinics` to the name pool and rejects values the simulation cannot run with.
    ///
    /// # Errors
    /// Returns `SentinelError::InvalidConfig` if the outbreak probability is above 100, a grid
    /// dimension is zero, or the grid has fewer cells than clinics.
    pub fn validate(mut self) -> Result<ModelConfig, SentinelError> {
        if self.num_clinics > CLINIC_NAMES.len() {
            warn!(
                "requested {} clinics but only {} names are available; clamping",
                self.num_clinics,
                CLINIC_NAMES.len()
            );
            self.num_clinics = CLINIC_NAMES.len();
        }
        if self.outbreak_probability > 100 {
            return Err(SentinelError::InvalidConfig(format!(
                "outbreak_probability must be a percentage between 0 and 100, got {}",
                self.outbreak_probability
            )));
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(SentinelError::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        let cells = u64::from(self.grid_width) * u64::from(self.grid_height);
        if cells < self.num_clinics as u64 {
            return Err(SentinelError::InvalidConfig(format!(
                "a {}x{} grid cannot hold {} clinics",
                self.grid_width, self.grid_height, self.num_clinics
            )));
        }
        Ok(self)
    }
}
