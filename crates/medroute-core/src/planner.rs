//! Fleet-wide delivery planning.
//!
//! Dispatches are first assigned to the nearest service point hosting a
//! compatible drone, then each service point's group is carved into tours,
//! shortest tour first, until no drone there can build another.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde_json::{json, Value};

use crate::config::PlannerConfig;
use crate::feasibility::{is_affordable, matches};
use crate::geometry::distance;
use crate::models::{
    AvailabilitySlot, Dispatch, DispatchId, Drone, DroneId, DronePath, FleetSnapshot, PlanResult,
    Point, ServicePointId,
};
use crate::pathfinder::Pathfinder;
use crate::route_builder::RouteBuilder;

/// Lookup tables derived once from a snapshot.
#[derive(Debug, Default)]
struct FleetIndex<'s> {
    drones: HashMap<&'s str, &'s Drone>,
    locations: HashMap<ServicePointId, Point>,
    /// Slots per drone, merged across every service point that lists it.
    slots: HashMap<&'s str, Vec<AvailabilitySlot>>,
    /// The last located service point listing each drone.
    bases: HashMap<&'s str, Point>,
}

impl<'s> FleetIndex<'s> {
    fn build(snapshot: &'s FleetSnapshot) -> Self {
        let mut index = Self::default();

        for drone in &snapshot.drones {
            index.drones.entry(drone.id.as_str()).or_insert(drone);
        }
        for service_point in &snapshot.service_points {
            if let Some(location) = service_point.location {
                index.locations.entry(service_point.id).or_insert(location);
            }
        }
        for entry in &snapshot.availability {
            let location = index.locations.get(&entry.service_point_id).copied();
            for listed in &entry.drones {
                index
                    .slots
                    .entry(listed.id.as_str())
                    .or_default()
                    .extend(listed.availability.iter().cloned());
                if let Some(location) = location {
                    index.bases.insert(listed.id.as_str(), location);
                }
            }
        }

        index
    }

    fn slots_for(&self, drone_id: &str) -> &[AvailabilitySlot] {
        self.slots.get(drone_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Plans dispatch batches against one immutable fleet snapshot.
#[derive(Debug)]
pub struct FleetPlanner<'s> {
    snapshot: &'s FleetSnapshot,
    config: PlannerConfig,
    index: FleetIndex<'s>,
}

impl<'s> FleetPlanner<'s> {
    pub fn new(snapshot: &'s FleetSnapshot, config: PlannerConfig) -> Self {
        Self {
            snapshot,
            config,
            index: FleetIndex::build(snapshot),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Assign as many dispatches as possible to round-trip drone tours.
    ///
    /// Never fails. Dispatches that cannot be served are listed in
    /// `unassigned_dispatch_ids`.
    pub fn plan_deliveries(&self, dispatches: &[Dispatch]) -> PlanResult {
        if dispatches.is_empty() {
            return PlanResult::default();
        }

        let mut groups: BTreeMap<ServicePointId, Vec<&Dispatch>> = BTreeMap::new();
        for dispatch in dispatches {
            match self.select_service_point(dispatch) {
                Some(service_point_id) => {
                    groups.entry(service_point_id).or_default().push(dispatch)
                }
                None => tracing::debug!(
                    dispatch_id = dispatch.id,
                    "no service point can serve dispatch, dropping"
                ),
            }
        }

        let pathfinder = Pathfinder::new(&self.config, &self.snapshot.restricted_areas);
        let builder = RouteBuilder::new(pathfinder, &self.config);

        let mut result = PlanResult::default();
        for (service_point_id, group) in &groups {
            let Some(base) = self.index.locations.get(service_point_id) else {
                continue;
            };
            for route in self.plan_service_point(&builder, *service_point_id, base, group) {
                result.total_moves += route.total_moves;
                result.total_cost += route.total_cost;
                result.drone_paths.push(route);
            }
        }

        let assigned: HashSet<DispatchId> = result.assigned_dispatch_ids().collect();
        let mut reported = HashSet::new();
        result.unassigned_dispatch_ids = dispatches
            .iter()
            .map(|dispatch| dispatch.id)
            .filter(|id| !assigned.contains(id) && reported.insert(*id))
            .collect();

        tracing::debug!(
            routes = result.drone_paths.len(),
            total_moves = result.total_moves,
            total_cost = result.total_cost,
            unassigned = result.unassigned_dispatch_ids.len(),
            "planning complete"
        );
        result
    }

    /// Repeatedly commit the shortest tour any local drone can fly.
    fn plan_service_point(
        &self,
        builder: &RouteBuilder<'_>,
        service_point_id: ServicePointId,
        base: &Point,
        group: &[&Dispatch],
    ) -> Vec<DronePath> {
        let drones = self.drones_at(service_point_id);
        let mut pool: BTreeSet<DispatchId> = group.iter().map(|dispatch| dispatch.id).collect();
        let mut routes = Vec::new();

        while !pool.is_empty() {
            let mut best: Option<DronePath> = None;

            for drone in &drones {
                let mut scratch = pool.clone();
                let slots = self.index.slots_for(&drone.id);
                let Some(route) = builder.build(drone, base, slots, group, &mut scratch) else {
                    continue;
                };
                if best
                    .as_ref()
                    .map_or(true, |chosen| route.total_moves < chosen.total_moves)
                {
                    best = Some(route);
                }
            }

            let Some(route) = best else {
                break;
            };
            for id in route.dispatch_ids() {
                pool.remove(&id);
            }
            tracing::debug!(
                service_point_id,
                drone_id = %route.drone_id,
                deliveries = route.deliveries.len() - 1,
                moves = route.total_moves,
                cost = route.total_cost,
                "committed route"
            );
            routes.push(route);
        }

        if !pool.is_empty() {
            tracing::debug!(
                service_point_id,
                remaining = pool.len(),
                "no drone can take the remaining dispatches"
            );
        }
        routes
    }

    /// The located service point nearest the delivery that hosts at least one
    /// compatible drone. Cost is not considered here.
    pub fn select_service_point(&self, dispatch: &Dispatch) -> Option<ServicePointId> {
        let delivery = dispatch.delivery.as_ref()?;
        let mut best: Option<(ServicePointId, f64)> = None;

        for entry in &self.snapshot.availability {
            let Some(location) = self.index.locations.get(&entry.service_point_id) else {
                continue;
            };
            let hosts_match = entry.drones.iter().any(|listed| {
                self.index.drones.get(listed.id.as_str()).is_some_and(|drone| {
                    matches(drone, dispatch, self.index.slots_for(&listed.id))
                })
            });
            if !hosts_match {
                continue;
            }

            let dist = distance(location, delivery);
            if best.map_or(true, |(_, nearest)| dist < nearest) {
                best = Some((entry.service_point_id, dist));
            }
        }

        best.map(|(id, _)| id)
    }

    /// Known drones listed at a service point, in feed order.
    pub fn drones_at(&self, service_point_id: ServicePointId) -> Vec<&'s Drone> {
        self.snapshot
            .availability
            .iter()
            .filter(|entry| entry.service_point_id == service_point_id)
            .flat_map(|entry| entry.drones.iter())
            .filter_map(|listed| self.index.drones.get(listed.id.as_str()).copied())
            .collect()
    }

    /// Drones able to take every dispatch in the batch, each within its
    /// estimated cost limit from the drone's base. An empty batch returns every drone.
    pub fn query_available_drones(&self, dispatches: &[Dispatch]) -> Vec<DroneId> {
        if dispatches.is_empty() {
            return self.snapshot.drones.iter().map(|d| d.id.clone()).collect();
        }

        self.snapshot
            .drones
            .iter()
            .filter(|drone| self.can_handle_all(drone, dispatches))
            .map(|drone| drone.id.clone())
            .collect()
    }

    fn can_handle_all(&self, drone: &Drone, dispatches: &[Dispatch]) -> bool {
        let Some(base) = self.index.bases.get(drone.id.as_str()) else {
            return false;
        };
        let slots = self.index.slots_for(&drone.id);
        dispatches.iter().all(|dispatch| {
            matches(drone, dispatch, slots)
                && dispatch.delivery.is_some()
                && is_affordable(drone, dispatch, base, self.config.step_length)
        })
    }
}

/// Plan one batch against `snapshot`.
pub fn plan_deliveries(
    snapshot: &FleetSnapshot,
    dispatches: &[Dispatch],
    config: &PlannerConfig,
) -> PlanResult {
    FleetPlanner::new(snapshot, config.clone()).plan_deliveries(dispatches)
}

/// The first non-empty route's flight paths, concatenated as `[lng, lat]` pairs.
pub fn render_line_coordinates(result: &PlanResult) -> Vec<[f64; 2]> {
    result
        .drone_paths
        .iter()
        .find(|route| !route.deliveries.is_empty())
        .map(|route| {
            route
                .deliveries
                .iter()
                .flat_map(|leg| leg.flight_path.iter())
                .map(|point| [point.lng, point.lat])
                .collect()
        })
        .unwrap_or_default()
}

/// [`render_line_coordinates`] as a GeoJSON `LineString` geometry.
pub fn render_geojson(result: &PlanResult) -> Value {
    json!({
        "type": "LineString",
        "coordinates": render_line_coordinates(result),
    })
}
