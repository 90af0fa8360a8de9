pub mod config;
pub mod error;
pub mod feasibility;
pub mod geometry;
pub mod models;
pub mod movement;
pub mod pathfinder;
pub mod planner;
pub mod restricted;
pub mod route_builder;

pub use config::{PlannerConfig, MAX_MOVE_BUDGET, STEP_LENGTH};
pub use error::{ConfigError, MovementError};
pub use feasibility::{estimate_cost, is_affordable, is_available, matches};
pub use geometry::{bearing, distance, is_close_to, point_in_polygon, step};
pub use models::{
    AvailabilitySlot, Capability, DeliveryLeg, Dispatch, DispatchId, Drone, DroneAvailability,
    DroneId, DronePath, FleetSnapshot, PlanResult, Point, Requirements, RestrictedArea,
    ServicePoint, ServicePointAvailability, ServicePointId,
};
pub use movement::{snap_angle, MovementModel, COMPASS_HEADINGS};
pub use pathfinder::{FlightPath, Pathfinder};
pub use planner::{plan_deliveries, render_geojson, render_line_coordinates, FleetPlanner};
pub use restricted::is_blocked;
pub use route_builder::RouteBuilder;
