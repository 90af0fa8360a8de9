//! Movement and search constants for a planning run.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Length of one move in coordinate units.
pub const STEP_LENGTH: f64 = 0.00015;

/// Largest move budget a config may ask for. Summing three legs at this size
/// stays far below `u32::MAX`, so move arithmetic cannot wrap.
pub const MAX_MOVE_BUDGET: u32 = 1_000_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Distance covered by one move.
    pub step_length: f64,
    /// A leg is complete once the drone is within this distance of its target.
    pub close_tolerance: f64,
    /// Budget used for drones whose `maxMoves` is not positive.
    pub default_max_moves: u32,
    /// Hard ceiling on any resolved move budget.
    pub max_move_cap: u32,
    /// Node expansions allowed per A* search before giving up.
    pub max_expansions: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            step_length: STEP_LENGTH,
            close_tolerance: STEP_LENGTH,
            default_max_moves: 5000,
            max_move_cap: 20_000,
            max_expansions: 50_000,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.step_length.is_finite() || self.step_length <= 0.0 {
            return Err(ConfigError::InvalidStepLength(self.step_length));
        }
        if !self.close_tolerance.is_finite() || self.close_tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance(self.close_tolerance));
        }
        if self.max_expansions == 0 {
            return Err(ConfigError::ZeroExpansionCap);
        }
        if self.max_move_cap == 0 {
            return Err(ConfigError::ZeroMoveCap);
        }
        for (field, value) in [
            ("default_max_moves", self.default_max_moves),
            ("max_move_cap", self.max_move_cap),
        ] {
            if value > MAX_MOVE_BUDGET {
                return Err(ConfigError::MoveBudgetTooLarge {
                    field,
                    value,
                    limit: MAX_MOVE_BUDGET,
                });
            }
        }
        Ok(())
    }
}
