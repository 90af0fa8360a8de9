//! Minimum-move pathfinding over the discrete movement model.
//!
//! A* runs over the implicit graph of points reachable by legal steps. When it
//! cannot reach the target inside the move budget or expansion cap, a greedy
//! stepper takes over. A leg that still ends outside tolerance is reported with
//! `moves = budget + 1`; callers must treat `moves > budget` as "cannot be flown".

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::config::PlannerConfig;
use crate::geometry::{bearing, distance};
use crate::models::{Point, RestrictedArea};
use crate::movement::MovementModel;
use crate::restricted::is_blocked;

/// Coordinates are quantized to this many units per degree to form node keys.
const KEY_SCALE: f64 = 1e12;

/// A computed flight leg.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPath {
    /// Points from start to the first point within tolerance of the target.
    pub path: Vec<Point>,
    pub moves: u32,
    pub total_distance: f64,
}

impl FlightPath {
    pub fn empty() -> Self {
        Self {
            path: Vec::new(),
            moves: 0,
            total_distance: 0.0,
        }
    }

    pub fn fits_budget(&self, budget: u32) -> bool {
        self.moves <= budget
    }

    pub fn end(&self) -> Option<&Point> {
        self.path.last()
    }

    fn from_points(path: Vec<Point>) -> Self {
        let total_distance = path.windows(2).map(|pair| distance(&pair[0], &pair[1])).sum();
        let moves = u32::try_from(path.len().saturating_sub(1)).unwrap_or(u32::MAX);
        Self {
            path,
            moves,
            total_distance,
        }
    }
}

/// Hashable identity of a search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PointKey {
    lng: i64,
    lat: i64,
}

impl PointKey {
    fn of(point: &Point) -> Self {
        Self {
            lng: (point.lng * KEY_SCALE).round() as i64,
            lat: (point.lat * KEY_SCALE).round() as i64,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    point: Point,
    g_score: u32,
}

/// Entry in the open set. Lower f wins; equal f falls back to insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f_score: FloatOrd,
    seq: u64,
    g_score: u32,
    key: PointKey,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Pathfinder bound to one restricted-area set for the duration of a planning run.
#[derive(Debug, Clone)]
pub struct Pathfinder<'a> {
    movement: MovementModel,
    close_tolerance: f64,
    max_expansions: usize,
    areas: &'a [RestrictedArea],
}

impl<'a> Pathfinder<'a> {
    pub fn new(config: &PlannerConfig, areas: &'a [RestrictedArea]) -> Self {
        Self {
            movement: MovementModel::from_config(config),
            close_tolerance: config.close_tolerance,
            max_expansions: config.max_expansions,
            areas,
        }
    }

    pub fn movement(&self) -> &MovementModel {
        &self.movement
    }

    /// Path between two optional points. A missing endpoint yields an empty leg.
    pub fn find_path(
        &self,
        start: Option<&Point>,
        end: Option<&Point>,
        max_moves: u32,
    ) -> FlightPath {
        match (start, end) {
            (Some(start), Some(end)) => self.plan_leg(start, end, max_moves),
            _ => FlightPath::empty(),
        }
    }

    /// Minimum-move path from `start` to within tolerance of `end`.
    pub fn plan_leg(&self, start: &Point, end: &Point, max_moves: u32) -> FlightPath {
        if let Some(found) = self.search(start, end, max_moves) {
            return found;
        }
        tracing::trace!(
            ?start,
            ?end,
            max_moves,
            "A* found no path, falling back to greedy stepping"
        );
        self.greedy_walk(start, end, max_moves)
    }

    fn within_tolerance(&self, point: &Point, target: &Point) -> bool {
        distance(point, target) <= self.close_tolerance
    }

    fn heuristic(&self, from: &Point, to: &Point) -> f64 {
        distance(from, to) / self.movement.step_length()
    }

    fn search(&self, start: &Point, end: &Point, max_moves: u32) -> Option<FlightPath> {
        let start_key = PointKey::of(start);

        let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();
        let mut closed_set: HashSet<PointKey> = HashSet::new();
        let mut nodes: HashMap<PointKey, SearchNode> = HashMap::new();
        let mut came_from: HashMap<PointKey, PointKey> = HashMap::new();
        let mut seq = 0u64;

        nodes.insert(
            start_key,
            SearchNode {
                point: *start,
                g_score: 0,
            },
        );
        open_set.push(Reverse(OpenNode {
            f_score: FloatOrd(self.heuristic(start, end)),
            seq,
            g_score: 0,
            key: start_key,
        }));

        let mut expansions = 0usize;
        while expansions < self.max_expansions {
            let Some(Reverse(current)) = open_set.pop() else {
                return None;
            };
            if !closed_set.insert(current.key) {
                continue;
            }
            let current_point = nodes.get(&current.key)?.point;

            if self.within_tolerance(&current_point, end) {
                return Some(reconstruct_path(&nodes, &came_from, current.key));
            }

            expansions += 1;

            let tentative_g = current.g_score + 1;
            if tentative_g > max_moves {
                continue;
            }

            for neighbor in self.movement.neighbors(&current_point, self.areas) {
                let key = PointKey::of(&neighbor);
                if closed_set.contains(&key) {
                    continue;
                }

                let improves = nodes
                    .get(&key)
                    .map_or(true, |existing| tentative_g < existing.g_score);
                if !improves {
                    continue;
                }

                nodes.insert(
                    key,
                    SearchNode {
                        point: neighbor,
                        g_score: tentative_g,
                    },
                );
                came_from.insert(key, current.key);
                seq += 1;
                open_set.push(Reverse(OpenNode {
                    f_score: FloatOrd(tentative_g as f64 + self.heuristic(&neighbor, end)),
                    seq,
                    g_score: tentative_g,
                    key,
                }));
            }
        }

        tracing::debug!(expansions, ?start, ?end, "A* expansion cap reached");
        None
    }

    /// Straight-line stepping with local detours around restricted areas.
    fn greedy_walk(&self, start: &Point, end: &Point, max_moves: u32) -> FlightPath {
        let mut current = *start;
        let mut path = vec![current];
        let mut moves = 0u32;
        let mut total_distance = 0.0;

        while !self.within_tolerance(&current, end) && moves < max_moves {
            let mut next = self.movement.step_toward(&current, end);
            if is_blocked(&next, self.areas) {
                match self
                    .movement
                    .local_escape(&current, bearing(&current, end), end, self.areas)
                {
                    Some(detour) if detour != current => next = detour,
                    _ => break,
                }
            }

            total_distance += distance(&current, &next);
            path.push(next);
            current = next;
            moves += 1;
        }

        if !self.within_tolerance(&current, end) {
            moves = max_moves.saturating_add(1);
        }

        FlightPath {
            path,
            moves,
            total_distance,
        }
    }
}

fn reconstruct_path(
    nodes: &HashMap<PointKey, SearchNode>,
    came_from: &HashMap<PointKey, PointKey>,
    goal: PointKey,
) -> FlightPath {
    let mut points = Vec::new();
    let mut current = Some(goal);
    while let Some(key) = current {
        if let Some(node) = nodes.get(&key) {
            points.push(node.point);
        }
        current = came_from.get(&key).copied();
    }
    points.reverse();
    FlightPath::from_points(points)
}
