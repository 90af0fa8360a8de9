//! Discrete movement model: fixed-length steps along 16 compass headings.

use crate::config::PlannerConfig;
use crate::error::MovementError;
use crate::geometry::{distance, normalize_angle, step};
use crate::models::{Point, RestrictedArea};
use crate::restricted::is_blocked;

/// Angular spacing between legal headings.
pub const HEADING_INCREMENT_DEG: f64 = 22.5;

/// The 16 legal headings, counter-clockwise from east.
pub const COMPASS_HEADINGS: [f64; 16] = [
    0.0, 22.5, 45.0, 67.5, 90.0, 112.5, 135.0, 157.5, 180.0, 202.5, 225.0, 247.5, 270.0, 292.5,
    315.0, 337.5,
];

/// Offsets from the target bearing tried by [`MovementModel::local_escape`], nearest first.
const ESCAPE_OFFSETS: [f64; 16] = [
    0.0, 22.5, -22.5, 45.0, -45.0, 67.5, -67.5, 90.0, -90.0, 112.5, -112.5, 135.0, -135.0, 157.5,
    -157.5, 180.0,
];

/// Below this distance two points are treated as coincident.
const COINCIDENT_EPS: f64 = 1e-12;

/// Round a bearing to the nearest legal heading, halves rounding up.
pub fn snap_angle(angle_deg: f64) -> f64 {
    let slots = (angle_deg / HEADING_INCREMENT_DEG + 0.5).floor();
    normalize_angle(slots * HEADING_INCREMENT_DEG)
}

/// `true` when `heading` is one of [`COMPASS_HEADINGS`].
pub fn is_compass_heading(heading: f64) -> bool {
    (0.0..360.0).contains(&heading) && heading % HEADING_INCREMENT_DEG == 0.0
}

#[derive(Debug, Clone, Copy)]
pub struct MovementModel {
    step_length: f64,
}

impl MovementModel {
    pub fn new(step_length: f64) -> Self {
        Self { step_length }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.step_length)
    }

    pub fn step_length(&self) -> f64 {
        self.step_length
    }

    /// One step along a validated compass heading.
    pub fn next_position(&self, start: &Point, heading: f64) -> Result<Point, MovementError> {
        if !is_compass_heading(heading) {
            return Err(MovementError::InvalidHeading(heading));
        }
        Ok(step(start, heading, self.step_length))
    }

    /// Every point one legal step from `point` that is not inside a restricted area,
    /// in heading order.
    pub fn neighbors(&self, point: &Point, areas: &[RestrictedArea]) -> Vec<Point> {
        COMPASS_HEADINGS
            .iter()
            .map(|heading| step(point, *heading, self.step_length))
            .filter(|candidate| !is_blocked(candidate, areas))
            .collect()
    }

    /// A single straight-line step toward `to`, or `to` itself when already there.
    pub fn step_toward(&self, from: &Point, to: &Point) -> Point {
        let dist = distance(from, to);
        if dist < COINCIDENT_EPS {
            return *to;
        }
        let scale = self.step_length / dist;
        Point::new(
            from.lng + (to.lng - from.lng) * scale,
            from.lat + (to.lat - from.lat) * scale,
        )
    }

    /// Detour used when the direct step is blocked.
    ///
    /// Scans headings outward from the target bearing and returns the first
    /// unblocked step that gets strictly closer to `target`. Failing that, the
    /// unblocked step that ends nearest to it. `None` when every heading is blocked.
    pub fn local_escape(
        &self,
        current: &Point,
        bearing_to_target: f64,
        target: &Point,
        areas: &[RestrictedArea],
    ) -> Option<Point> {
        let current_dist = distance(current, target);
        let mut fallback: Option<(Point, f64)> = None;

        for offset in ESCAPE_OFFSETS {
            let heading = snap_angle(bearing_to_target + offset);
            let candidate = step(current, heading, self.step_length);
            if is_blocked(&candidate, areas) {
                continue;
            }

            let candidate_dist = distance(&candidate, target);
            if candidate_dist < current_dist - COINCIDENT_EPS {
                return Some(candidate);
            }

            match fallback {
                Some((_, best)) if candidate_dist >= best => {}
                _ => fallback = Some((candidate, candidate_dist)),
            }
        }

        fallback.map(|(point, _)| point)
    }
}
