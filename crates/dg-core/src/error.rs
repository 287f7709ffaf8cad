//! Error types for generation
//!
//! Only configuration problems are errors. Running out of placement attempts
//! or failing to route a corridor are ordinary outcomes and are reported as
//! [`GenerationWarning`](crate::report::GenerationWarning)s instead.

use thiserror::Error;

/// Invalid generator settings or theme assets, detected before a run mutates anything
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid must be at least 3x3 cells, got {width}x{height}")]
    GridTooSmall { width: i32, height: i32 },

    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("unit size must be a positive number, got {0}")]
    InvalidUnitSize(f32),

    #[error("max placement attempts must be at least 1")]
    ZeroPlacementAttempts,

    #[error("digging cost ({digging}) must be greater than existing path cost ({existing})")]
    CostOrdering { digging: u32, existing: u32 },

    #[error("room template '{name}' is invalid: {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("theme '{theme}' has no weighted room templates but {budget} random rooms were requested")]
    EmptyRoomPool { theme: String, budget: usize },
}

/// Failure of a whole generation run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("layer {0} is outside the supported range -1..=1")]
    UnsupportedLayer(i32),
}
