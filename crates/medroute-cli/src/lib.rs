//! Medroute CLI - command line front end for the delivery planner.
//!
//! This crate provides the `plan_deliveries` binary plus the pieces it is
//! built from:
//! - config: environment-driven settings
//! - input: JSON loading for snapshots, dispatch batches and planner overrides
//! - output: rendering a plan, its GeoJSON line or the available drones

pub mod config;
pub mod input;
pub mod output;

pub use config::Config;
pub use output::{render_output, OutputFormat};
