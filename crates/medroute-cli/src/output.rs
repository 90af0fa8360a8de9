//! Result rendering for the `plan_deliveries` binary.

use anyhow::Result;
use clap::ValueEnum;
use medroute_core::{render_geojson, Dispatch, FleetPlanner};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full plan: routes, legs and totals.
    Plan,
    /// The first route as a GeoJSON LineString.
    Geojson,
    /// Ids of drones able to take the whole batch.
    Available,
}

pub fn render_output(
    format: OutputFormat,
    planner: &FleetPlanner<'_>,
    dispatches: &[Dispatch],
) -> Result<Value> {
    Ok(match format {
        OutputFormat::Plan => serde_json::to_value(planner.plan_deliveries(dispatches))?,
        OutputFormat::Geojson => render_geojson(&planner.plan_deliveries(dispatches)),
        OutputFormat::Available => {
            serde_json::to_value(planner.query_available_drones(dispatches))?
        }
    })
}
