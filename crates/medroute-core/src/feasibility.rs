//! Drone/dispatch compatibility checks.
//!
//! Feasibility covers capability and availability only. Reachability and the
//! real routed cost are decided later by the route builder.

use chrono::Datelike;

use crate::geometry::distance;
use crate::models::{AvailabilitySlot, Capability, Dispatch, Drone, Point};

/// `true` when `drone` may service `dispatch` given its availability `slots`.
pub fn matches(drone: &Drone, dispatch: &Dispatch, slots: &[AvailabilitySlot]) -> bool {
    let Some(capability) = drone.capability.as_ref() else {
        return false;
    };

    let Some(requirements) = dispatch.requirements.as_ref() else {
        return is_available(dispatch, slots);
    };

    if let Some(required) = requirements.capacity {
        if capability.capacity < required {
            return false;
        }
    }
    if requirements.needs_cooling() && !capability.cooling {
        return false;
    }
    if requirements.needs_heating() && !capability.heating {
        return false;
    }
    // Mixed-temperature loads need both.
    if requirements.needs_cooling()
        && requirements.needs_heating()
        && !(capability.cooling && capability.heating)
    {
        return false;
    }

    is_available(dispatch, slots)
}

/// `true` when some slot covers the dispatch's weekday and time, inclusive.
/// A dispatch without a date or time is never available.
pub fn is_available(dispatch: &Dispatch, slots: &[AvailabilitySlot]) -> bool {
    let (Some(date), Some(time)) = (dispatch.date, dispatch.time) else {
        return false;
    };
    let day = date.weekday();
    slots.iter().any(|slot| slot.covers(day, time))
}

/// Straight-line round-trip estimate: `2 * distance / step_length` moves plus
/// the fixed per-flight charges.
///
/// `None` when the dispatch has no delivery point or the drone no capability.
pub fn estimate_cost(
    drone: &Drone,
    dispatch: &Dispatch,
    base: &Point,
    step_length: f64,
) -> Option<f64> {
    let capability = drone.capability.as_ref()?;
    let delivery = dispatch.delivery.as_ref()?;
    let moves = 2.0 * distance(base, delivery) / step_length;
    Some(round_trip_cost(capability, moves))
}

/// Whether the estimated cost stays within the dispatch's `maxCost`.
///
/// A dispatch without `maxCost` is always affordable. One with a limit but no
/// computable estimate is not.
pub fn is_affordable(drone: &Drone, dispatch: &Dispatch, base: &Point, step_length: f64) -> bool {
    let Some(max_cost) = dispatch.requirements.as_ref().and_then(|r| r.max_cost) else {
        return true;
    };
    estimate_cost(drone, dispatch, base, step_length).is_some_and(|cost| cost <= max_cost)
}

/// Fixed charges plus `moves` at the per-move rate.
pub fn round_trip_cost(capability: &Capability, moves: f64) -> f64 {
    moves * capability.cost_per_move + capability.cost_initial + capability.cost_final
}
