//! JSON input loading.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use medroute_core::{Dispatch, FleetSnapshot, PlannerConfig};
use serde_json::Value;

/// Read a file, or stdin when `path` is `-`.
fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn read_snapshot(path: &Path) -> Result<FleetSnapshot> {
    let raw = read_source(path)?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse fleet snapshot {}", path.display()))
}

/// A dispatch batch. `null` and an empty file both mean an empty batch.
pub fn read_dispatches(path: &Path) -> Result<Vec<Dispatch>> {
    let raw = read_source(path)?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let batch: Option<Vec<Dispatch>> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse dispatches {}", path.display()))?;
    Ok(batch.unwrap_or_default())
}

/// Planner overrides; unspecified fields keep their defaults.
pub fn read_planner_config(path: &Path) -> Result<PlannerConfig> {
    let raw = read_source(path)?;
    let config: PlannerConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse planner config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid planner config {}", path.display()))?;
    Ok(config)
}

pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    let encoded = serde_json::to_string_pretty(value)?;
    fs::write(path, encoded).with_context(|| format!("Failed to write {}", path.display()))
}
