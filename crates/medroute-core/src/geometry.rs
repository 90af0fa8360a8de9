//! Planar geometry for the delivery grid.
//!
//! Coordinates are treated as a flat Euclidean plane; no geodesy is applied.
//! Every function here is pure.

use crate::models::Point;

/// Euclidean distance between two points.
pub fn distance(a: &Point, b: &Point) -> f64 {
    let dx = a.lng - b.lng;
    let dy = a.lat - b.lat;
    (dx * dx + dy * dy).sqrt()
}

/// `true` when `a` lies strictly within `tolerance` of `b`.
pub fn is_close_to(a: &Point, b: &Point, tolerance: f64) -> bool {
    distance(a, b) < tolerance
}

/// Angle of the vector `from -> to` in degrees, counter-clockwise from the
/// positive x axis, normalized into `[0, 360)`.
pub fn bearing(from: &Point, to: &Point) -> f64 {
    let dx = to.lng - from.lng;
    let dy = to.lat - from.lat;
    normalize_angle(dy.atan2(dx).to_degrees())
}

/// Fold any angle in degrees into `[0, 360)`.
pub fn normalize_angle(angle_deg: f64) -> f64 {
    let a = angle_deg % 360.0;
    if a < 0.0 {
        a + 360.0
    } else {
        a
    }
}

/// Move `point` by `length` along `heading_deg`.
pub fn step(point: &Point, heading_deg: f64, length: f64) -> Point {
    let rad = heading_deg.to_radians();
    Point::new(
        point.lng + length * rad.cos(),
        point.lat + length * rad.sin(),
    )
}

/// Ray-casting containment test.
///
/// `vertices` is treated as a closed ring whether or not the last vertex
/// repeats the first. Points exactly on an edge get whatever the crossing
/// rule yields: bottom and left edges of an axis-aligned square count as
/// inside, top and right edges as outside.
pub fn point_in_polygon(p: &Point, vertices: &[Point]) -> bool {
    let n = vertices.len();
    if n == 0 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = &vertices[i];
        let vj = &vertices[j];

        if ((vi.lat > p.lat) != (vj.lat > p.lat))
            && (p.lng < (vj.lng - vi.lng) * (p.lat - vi.lat) / (vj.lat - vi.lat) + vi.lng)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}
