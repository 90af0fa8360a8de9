//! CLI configuration from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use medroute_client::DEFAULT_ILP_ENDPOINT;
use medroute_core::PlannerConfig;

use crate::input::read_planner_config;

#[derive(Debug, Clone)]
pub struct Config {
    pub ilp_endpoint: String,
    pub http_timeout: Duration,
    /// Optional JSON file overriding planner constants.
    pub planner_config_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            ilp_endpoint: lookup("ILP_ENDPOINT")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ILP_ENDPOINT.to_string()),
            http_timeout: Duration::from_secs(
                lookup("MEDROUTE_HTTP_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(10),
            ),
            planner_config_path: lookup("MEDROUTE_PLANNER_CONFIG")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Planner constants: defaults, or the override file when one is configured.
    pub fn planner_config(&self) -> Result<PlannerConfig> {
        match &self.planner_config_path {
            Some(path) => read_planner_config(path),
            None => Ok(PlannerConfig::default()),
        }
    }
}
