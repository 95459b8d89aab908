//! Generation settings.
//!
//! Sizes, budgets and the empirically tuned constants of the pipeline. Every
//! field has a default so a JSON file only needs to name what it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GenError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of the square world grid
    pub size: usize,
    /// Side length of the WFC landmass before growth
    pub landmass_size: usize,
    /// Side length of the WFC overlap window
    pub wfc_pattern_size: usize,
    /// WFC observation budget before giving up
    pub wfc_max_iterations: usize,
    /// RNG cursor checkpointed at construction; every reseed restarts here
    pub initial_rng_position: i32,
    /// Diagonal search radius D for the coastal falloff
    pub coast_falloff_radius: usize,
    /// Blur passes applied to the coastal falloff
    pub coast_smoothing_passes: usize,
    /// Upper bound on rivers carved per world
    pub river_count_max: usize,
    /// Rivers are only carved when the sink is closer than this
    pub river_length_max: usize,
    /// Side length of the coarse grid sampled for river sinks
    pub river_endpoint_resolution: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: 128,
            landmass_size: 17,
            wfc_pattern_size: 2,
            wfc_max_iterations: 1000,
            initial_rng_position: 12999,
            coast_falloff_radius: 5,
            coast_smoothing_passes: 4,
            river_count_max: 120,
            river_length_max: 14,
            river_endpoint_resolution: 64,
        }
    }
}

impl WorldConfig {
    /// Read a config from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, GenError> {
        let contents = std::fs::read_to_string(path)?;
        let config: WorldConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GenError> {
        if self.size < 2 {
            return Err(GenError::InvalidConfig(format!(
                "size must be at least 2, got {}",
                self.size
            )));
        }
        if self.wfc_pattern_size < 2 {
            return Err(GenError::InvalidConfig(format!(
                "wfc_pattern_size must be at least 2, got {}",
                self.wfc_pattern_size
            )));
        }
        if self.landmass_size < self.wfc_pattern_size {
            return Err(GenError::InvalidConfig(format!(
                "landmass_size {} is smaller than the WFC window {}",
                self.landmass_size, self.wfc_pattern_size
            )));
        }
        if self.coast_falloff_radius == 0 {
            return Err(GenError::InvalidConfig(
                "coast_falloff_radius must be positive".to_string(),
            ));
        }
        if self.river_endpoint_resolution == 0 {
            return Err(GenError::InvalidConfig(
                "river_endpoint_resolution must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
