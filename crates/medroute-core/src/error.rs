//! Error types for the few core operations that reject their input.
//!
//! Planning itself never fails: infeasible work is left out of the result.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("step length must be a positive finite number, got {0}")]
    InvalidStepLength(f64),

    #[error("close tolerance must be a positive finite number, got {0}")]
    InvalidTolerance(f64),

    #[error("max_expansions must be greater than zero")]
    ZeroExpansionCap,

    #[error("max_move_cap must be greater than zero")]
    ZeroMoveCap,

    #[error("{field} of {value} exceeds the largest supported move budget {limit}")]
    MoveBudgetTooLarge {
        field: &'static str,
        value: u32,
        limit: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MovementError {
    /// Headings must be one of the 16 compass directions.
    #[error("heading {0} is not a multiple of 22.5 in [0, 360)")]
    InvalidHeading(f64),
}
