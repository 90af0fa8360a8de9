//! Greedy nearest-by-moves chaining of dispatches into a single drone tour.

use std::collections::BTreeSet;

use crate::config::PlannerConfig;
use crate::feasibility::{matches, round_trip_cost};
use crate::models::{
    AvailabilitySlot, Capability, DeliveryLeg, Dispatch, DispatchId, Drone, DronePath, Point,
};
use crate::pathfinder::{FlightPath, Pathfinder};

/// Builds one drone's tour out of a service point's dispatch group.
#[derive(Debug, Clone)]
pub struct RouteBuilder<'a> {
    pathfinder: Pathfinder<'a>,
    config: &'a PlannerConfig,
}

/// Everything fixed for the duration of one tour.
struct Sortie<'d> {
    drone: &'d Drone,
    capability: &'d Capability,
    base: &'d Point,
    slots: &'d [AvailabilitySlot],
    budget: u32,
}

/// The dispatch picked for the next leg.
struct Candidate {
    dispatch_id: DispatchId,
    delivery: Point,
    outbound: FlightPath,
}

impl<'a> RouteBuilder<'a> {
    pub fn new(pathfinder: Pathfinder<'a>, config: &'a PlannerConfig) -> Self {
        Self { pathfinder, config }
    }

    /// Chain as many dispatches from `group` as the drone can fly, then return to base.
    ///
    /// Only dispatches still in `pool` are considered. Each committed dispatch is
    /// removed from `pool`, including when the tour is later discarded because
    /// the drone cannot get home; callers that need to retry pass a scratch copy.
    /// Returns `None` when nothing could be chained or the return leg does not fit.
    pub fn build(
        &self,
        drone: &Drone,
        base: &Point,
        slots: &[AvailabilitySlot],
        group: &[&Dispatch],
        pool: &mut BTreeSet<DispatchId>,
    ) -> Option<DronePath> {
        let capability = drone.capability.as_ref()?;
        let sortie = Sortie {
            drone,
            capability,
            base,
            slots,
            budget: capability.resolved_max_moves(self.config),
        };

        let mut current = *base;
        let mut moves_used = 0u32;
        let mut variable_cost = 0.0;
        let mut deliveries = Vec::new();

        while let Some(next) = self.next_candidate(&sortie, &current, group, pool, moves_used) {
            let mut flight_path = next.outbound.path;
            // Hover over the drop-off.
            if let Some(last) = flight_path.last().copied() {
                flight_path.push(last);
            }
            current = flight_path.last().copied().unwrap_or(next.delivery);

            pool.remove(&next.dispatch_id);
            moves_used += next.outbound.moves;
            variable_cost += f64::from(next.outbound.moves) * capability.cost_per_move;

            tracing::trace!(
                drone_id = %drone.id,
                dispatch_id = next.dispatch_id,
                moves = next.outbound.moves,
                "chained delivery"
            );
            deliveries.push(DeliveryLeg {
                delivery_id: Some(next.dispatch_id),
                flight_path,
            });
        }

        if deliveries.is_empty() {
            return None;
        }

        let home = self.pathfinder.plan_leg(&current, base, sortie.budget);
        if !home.fits_budget(sortie.budget) || moves_used + home.moves > sortie.budget {
            tracing::debug!(
                drone_id = %drone.id,
                legs = deliveries.len(),
                moves_used,
                return_moves = home.moves,
                budget = sortie.budget,
                "discarding tour: drone cannot return to base"
            );
            return None;
        }
        moves_used += home.moves;
        variable_cost += f64::from(home.moves) * capability.cost_per_move;

        deliveries.push(DeliveryLeg {
            delivery_id: None,
            flight_path: home.path,
        });

        Some(DronePath {
            drone_id: drone.id.clone(),
            deliveries,
            total_moves: moves_used,
            total_cost: round_trip_cost(capability, 0.0) + variable_cost,
        })
    }

    /// Nearest qualifying dispatch by outbound move count; the first seen wins ties.
    fn next_candidate(
        &self,
        sortie: &Sortie<'_>,
        current: &Point,
        group: &[&Dispatch],
        pool: &BTreeSet<DispatchId>,
        moves_used: u32,
    ) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;

        for dispatch in group {
            let Some(delivery) = dispatch.delivery.as_ref() else {
                continue;
            };
            if !pool.contains(&dispatch.id) {
                continue;
            }
            if !matches(sortie.drone, dispatch, sortie.slots) {
                continue;
            }

            let outbound = self.pathfinder.plan_leg(current, delivery, sortie.budget);
            if !outbound.fits_budget(sortie.budget) {
                continue;
            }

            // Measured from the drop-off itself, not from where the outbound leg stops.
            let back = self.pathfinder.plan_leg(delivery, sortie.base, sortie.budget);

            if let Some(max_cost) = dispatch.requirements.as_ref().and_then(|r| r.max_cost) {
                let leg_cost =
                    round_trip_cost(sortie.capability, f64::from(outbound.moves + back.moves));
                if leg_cost > max_cost {
                    continue;
                }
            }

            if moves_used + outbound.moves + back.moves > sortie.budget {
                continue;
            }

            if best
                .as_ref()
                .map_or(true, |chosen| outbound.moves < chosen.outbound.moves)
            {
                best = Some(Candidate {
                    dispatch_id: dispatch.id,
                    delivery: *delivery,
                    outbound,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Requirements, RestrictedArea};
    use chrono::{NaiveDate, NaiveTime, Weekday};

    fn drone(max_moves: i64, cost_per_move: f64) -> Drone {
        Drone {
            id: "7".to_string(),
            name: None,
            capability: Some(Capability {
                cooling: false,
                heating: false,
                capacity: 1.0,
                max_moves,
                cost_per_move,
                cost_initial: 1.0,
                cost_final: 2.0,
            }),
        }
    }

    fn slots() -> Vec<AvailabilitySlot> {
        vec![AvailabilitySlot {
            day_of_week: Weekday::Mon,
            from: NaiveTime::MIN,
            until: NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
        }]
    }

    fn dispatch(id: DispatchId, lng: f64, lat: f64) -> Dispatch {
        Dispatch {
            id,
            date: NaiveDate::from_ymd_opt(2025, 1, 6),
            time: NaiveTime::from_hms_opt(12, 0, 0),
            requirements: Some(Requirements {
                capacity: Some(0.5),
                ..Requirements::default()
            }),
            delivery: Some(Point::new(lng, lat)),
        }
    }

    fn build(
        drone: &Drone,
        group: &[Dispatch],
        pool: &mut BTreeSet<DispatchId>,
    ) -> Option<DronePath> {
        build_among(drone, &[], group, pool)
    }

    fn build_among(
        drone: &Drone,
        areas: &[RestrictedArea],
        group: &[Dispatch],
        pool: &mut BTreeSet<DispatchId>,
    ) -> Option<DronePath> {
        let config = PlannerConfig::default();
        let builder = RouteBuilder::new(Pathfinder::new(&config, areas), &config);
        let refs: Vec<&Dispatch> = group.iter().collect();
        builder.build(drone, &Point::new(0.0, 0.0), &slots(), &refs, pool)
    }

    fn wall() -> RestrictedArea {
        RestrictedArea {
            id: None,
            name: Some("wall".to_string()),
            vertices: vec![
                Point::new(0.0008, -0.0003),
                Point::new(0.0009, -0.0003),
                Point::new(0.0009, 0.0006),
                Point::new(0.0008, 0.0006),
            ],
        }
    }

    #[test]
    fn single_delivery_round_trip() {
        let group = vec![dispatch(1, 0.003, 0.0)];
        let mut pool = BTreeSet::from([1]);
        let route = build(&drone(1000, 1.0), &group, &mut pool).expect("route");

        assert!(pool.is_empty());
        assert_eq!(route.deliveries.len(), 2);
        assert_eq!(route.deliveries[0].delivery_id, Some(1));
        assert_eq!(route.deliveries[1].delivery_id, None);
        assert_eq!(route.total_moves, 40);
        assert!((route.total_cost - 43.0).abs() < 1e-9);

        let outbound = &route.deliveries[0].flight_path;
        assert_eq!(outbound.len(), 22);
        assert_eq!(outbound[20], outbound[21]);
        assert_eq!(route.deliveries[1].flight_path.first(), outbound.last());
    }

    #[test]
    fn chains_nearest_first() {
        let group = vec![dispatch(1, 0.003, 0.0), dispatch(2, 0.0015, 0.0)];
        let mut pool = BTreeSet::from([1, 2]);
        let route = build(&drone(1000, 1.0), &group, &mut pool).expect("route");

        let order: Vec<DispatchId> = route.dispatch_ids().collect();
        assert_eq!(order, vec![2, 1]);
        assert_eq!(route.deliveries.len(), 3);
        assert!(pool.is_empty());
    }

    #[test]
    fn skips_dispatches_outside_the_pool() {
        let group = vec![dispatch(1, 0.003, 0.0), dispatch(2, 0.0015, 0.0)];
        let mut pool = BTreeSet::from([1]);
        let route = build(&drone(1000, 1.0), &group, &mut pool).expect("route");
        assert_eq!(route.dispatch_ids().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn budget_limits_the_chain() {
        // Near drop-off first (10 out); reaching the far one from there plus
        // the trip home needs 60.
        let group = vec![dispatch(1, 0.0015, 0.0), dispatch(2, -0.003, 0.0)];
        let mut pool = BTreeSet::from([1, 2]);
        let route = build(&drone(50, 1.0), &group, &mut pool).expect("route");
        assert_eq!(route.dispatch_ids().collect::<Vec<_>>(), vec![1]);
        assert!(route.total_moves <= 50);
        assert_eq!(pool, BTreeSet::from([2]));
    }

    #[test]
    fn nothing_within_budget_yields_no_route() {
        let group = vec![dispatch(1, 0.003, 0.0)];
        let mut pool = BTreeSet::from([1]);
        assert!(build(&drone(30, 1.0), &group, &mut pool).is_none());
        assert_eq!(pool, BTreeSet::from([1]));
    }

    #[test]
    fn tour_is_discarded_when_hover_point_cannot_get_home() {
        // Around the wall's corner the drone stops short on the far side:
        // 8 moves out and 7 back from the drop-off, but 8 back from the hover point.
        let group = vec![dispatch(1, 0.00113, -0.00031)];

        let mut pool = BTreeSet::from([1]);
        assert!(build_among(&drone(15, 1.0), &[wall()], &group, &mut pool).is_none());
        // The candidate was committed before the return leg was checked.
        assert!(pool.is_empty());

        let mut pool = BTreeSet::from([1]);
        let route = build_among(&drone(16, 1.0), &[wall()], &group, &mut pool).expect("route");
        assert_eq!(route.total_moves, 16);
        assert_eq!(route.deliveries.len(), 2);
    }

    #[test]
    fn max_cost_uses_routed_leg_cost() {
        let mut priced = dispatch(1, 0.003, 0.0);
        if let Some(requirements) = priced.requirements.as_mut() {
            // 1 + 2 + 40 moves at 1.0.
            requirements.max_cost = Some(42.0);
        }
        let mut pool = BTreeSet::from([1]);
        assert!(build(&drone(1000, 1.0), &[priced.clone()], &mut pool).is_none());

        if let Some(requirements) = priced.requirements.as_mut() {
            requirements.max_cost = Some(43.0);
        }
        let mut pool = BTreeSet::from([1]);
        assert!(build(&drone(1000, 1.0), &[priced], &mut pool).is_some());
    }

    #[test]
    fn drone_without_capability_builds_nothing() {
        let mut bare = drone(1000, 1.0);
        bare.capability = None;
        let mut pool = BTreeSet::from([1]);
        assert!(build(&bare, &[dispatch(1, 0.003, 0.0)], &mut pool).is_none());
    }
}
