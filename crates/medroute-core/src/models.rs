//! Core data models for delivery planning.
//!
//! Field names follow the ILP wire format (camelCase) so snapshots and
//! dispatch batches can be decoded straight from the external service.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{PlannerConfig, MAX_MOVE_BUDGET};

pub type DroneId = String;
pub type DispatchId = u32;
pub type ServicePointId = u32;

/// A planar position. `lng` is the x axis, `lat` the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lng: f64,
    pub lat: f64,
}

impl Point {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Per-drone capability attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    #[serde(default)]
    pub cooling: bool,
    #[serde(default)]
    pub heating: bool,
    #[serde(default)]
    pub capacity: f64,
    /// Movement budget for one route; `<= 0` means "use the configured default".
    #[serde(default)]
    pub max_moves: i64,
    #[serde(default)]
    pub cost_per_move: f64,
    #[serde(default)]
    pub cost_initial: f64,
    #[serde(default)]
    pub cost_final: f64,
}

impl Capability {
    /// Move budget after applying the configured default and hard cap.
    pub fn resolved_max_moves(&self, config: &PlannerConfig) -> u32 {
        resolve_max_moves(Some(self), config)
    }
}

/// Resolve the move budget for an optional capability.
///
/// Never exceeds [`MAX_MOVE_BUDGET`], even for a config that skipped validation.
pub fn resolve_max_moves(capability: Option<&Capability>, config: &PlannerConfig) -> u32 {
    let requested = match capability {
        Some(cap) if cap.max_moves > 0 => u32::try_from(cap.max_moves).unwrap_or(u32::MAX),
        _ => config.default_max_moves,
    };
    requested.min(config.max_move_cap).min(MAX_MOVE_BUDGET)
}

/// A drone record as served by the data provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    #[serde(deserialize_with = "deserialize_drone_id")]
    pub id: DroneId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capability: Option<Capability>,
}

/// Window during which a drone is available at its base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub day_of_week: Weekday,
    pub from: NaiveTime,
    pub until: NaiveTime,
}

impl AvailabilitySlot {
    /// Inclusive on both ends.
    pub fn covers(&self, day: Weekday, time: NaiveTime) -> bool {
        self.day_of_week == day && time >= self.from && time <= self.until
    }
}

/// Availability of one drone at one service point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneAvailability {
    #[serde(deserialize_with = "deserialize_drone_id")]
    pub id: DroneId,
    #[serde(default)]
    pub availability: Vec<AvailabilitySlot>,
}

/// The drones hosted by a service point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePointAvailability {
    pub service_point_id: ServicePointId,
    #[serde(default)]
    pub drones: Vec<DroneAvailability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePoint {
    pub id: ServicePointId,
    #[serde(default)]
    pub name: Option<String>,
    /// Records without a location cannot act as a base and are ignored.
    #[serde(default)]
    pub location: Option<Point>,
}

/// A named polygon drones must not enter. The ring may be open or closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictedArea {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vertices: Vec<Point>,
}

/// Requirements attached to a dispatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    #[serde(default)]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub cooling: Option<bool>,
    #[serde(default)]
    pub heating: Option<bool>,
    #[serde(default)]
    pub max_cost: Option<f64>,
}

impl Requirements {
    pub fn needs_cooling(&self) -> bool {
        self.cooling == Some(true)
    }

    pub fn needs_heating(&self) -> bool {
        self.heating == Some(true)
    }
}

/// One medical delivery request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispatch {
    pub id: DispatchId,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub requirements: Option<Requirements>,
    #[serde(default)]
    pub delivery: Option<Point>,
}

// ========== PLANNING INPUT ==========

/// Immutable view of the external data for one planning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSnapshot {
    #[serde(default)]
    pub drones: Vec<Drone>,
    #[serde(default)]
    pub service_points: Vec<ServicePoint>,
    #[serde(default)]
    pub availability: Vec<ServicePointAvailability>,
    #[serde(default)]
    pub restricted_areas: Vec<RestrictedArea>,
}

// ========== PLANNING OUTPUT ==========

/// One flight leg. `delivery_id` is `None` for the return-to-base leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryLeg {
    pub delivery_id: Option<DispatchId>,
    pub flight_path: Vec<Point>,
}

/// The tour flown by one drone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DronePath {
    pub drone_id: DroneId,
    pub deliveries: Vec<DeliveryLeg>,
    pub total_moves: u32,
    pub total_cost: f64,
}

impl DronePath {
    /// Dispatches served by this tour, in flight order.
    pub fn dispatch_ids(&self) -> impl Iterator<Item = DispatchId> + '_ {
        self.deliveries.iter().filter_map(|leg| leg.delivery_id)
    }
}

/// Outcome of one planning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub total_cost: f64,
    pub total_moves: u32,
    pub drone_paths: Vec<DronePath>,
    /// Input dispatches that no committed route serves.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unassigned_dispatch_ids: Vec<DispatchId>,
}

impl PlanResult {
    pub fn assigned_dispatch_ids(&self) -> impl Iterator<Item = DispatchId> + '_ {
        self.drone_paths.iter().flat_map(DronePath::dispatch_ids)
    }
}

/// The ILP feed serves drone ids as strings in some payloads and numbers in others.
fn deserialize_drone_id<'de, D>(deserializer: D) -> Result<DroneId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(value) => value.trim().to_string(),
        RawId::Number(value) => value.to_string(),
    })
}
