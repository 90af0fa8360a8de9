//! Membership tests against the restricted-area set.

use crate::geometry::point_in_polygon;
use crate::models::{Point, RestrictedArea};

/// Polygons with fewer vertices than this are degenerate and never block.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// `true` iff `point` lies inside any non-degenerate restricted area.
pub fn is_blocked(point: &Point, areas: &[RestrictedArea]) -> bool {
    areas.iter().any(|area| area_contains(area, point))
}

/// Containment test for a single area; degenerate polygons contain nothing.
pub fn area_contains(area: &RestrictedArea, point: &Point) -> bool {
    area.vertices.len() >= MIN_POLYGON_VERTICES && point_in_polygon(point, &area.vertices)
}
