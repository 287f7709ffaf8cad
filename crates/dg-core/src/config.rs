//! Generator settings
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. `validate` must pass before a run touches the scene.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::GridBounds;
use crate::rng::GameRng;

/// Tunable parameters of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Grid cells along x
    pub grid_width: i32,
    /// Grid cells along y (world z)
    pub grid_height: i32,
    /// World size of one grid cell
    pub unit_size: f32,
    pub target_room_count: usize,
    /// Tries per template before giving up on it
    pub max_placement_attempts: u32,
    /// Probability of keeping an edge that closes a loop
    pub loop_chance: f64,
    /// Cost of entering an uncarved cell
    pub digging_cost: u32,
    /// Cost of entering an already carved corridor cell
    pub existing_path_cost: u32,
    /// Extra cost of changing direction
    pub turn_cost: u32,
    pub seed: u64,
    /// Draw a fresh seed from entropy instead of `seed`
    pub use_random_seed: bool,
    /// Probability of offering an unused door a cap room before sealing it
    pub cap_room_chance: f64,
    /// World elevation between consecutive layers
    pub layer_height_gap: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            grid_width: 50,
            grid_height: 50,
            unit_size: 5.0,
            target_room_count: 10,
            max_placement_attempts: 50,
            loop_chance: 0.15,
            digging_cost: 5,
            existing_path_cost: 1,
            turn_cost: 10,
            seed: 12345,
            use_random_seed: false,
            cap_room_chance: 0.25,
            layer_height_gap: 4.0,
        }
    }
}

impl GeneratorConfig {
    pub fn bounds(&self) -> GridBounds {
        GridBounds::new(self.grid_width, self.grid_height)
    }

    /// The RNG for a run: entropy when `use_random_seed` is set, otherwise `seed`
    pub fn make_rng(&self) -> GameRng {
        if self.use_random_seed {
            GameRng::from_entropy()
        } else {
            GameRng::new(self.seed)
        }
    }

    /// Reject settings the pipeline cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        // A room needs its one-cell halo inside the grid.
        if self.grid_width < 3 || self.grid_height < 3 {
            return Err(ConfigError::GridTooSmall {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if !(self.unit_size.is_finite() && self.unit_size > 0.0) {
            return Err(ConfigError::InvalidUnitSize(self.unit_size));
        }
        if self.max_placement_attempts == 0 {
            return Err(ConfigError::ZeroPlacementAttempts);
        }
        check_probability("loop_chance", self.loop_chance)?;
        check_probability("cap_room_chance", self.cap_room_chance)?;
        if self.digging_cost <= self.existing_path_cost {
            return Err(ConfigError::CostOrdering {
                digging: self.digging_cost,
                existing: self.existing_path_cost,
            });
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}
