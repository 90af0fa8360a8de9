//! End-to-end planning scenarios through the public API.
//!
//! Snapshots are written in the ILP wire format so decoding is exercised too.

use std::collections::HashSet;

use medroute_core::{
    is_blocked, plan_deliveries, render_geojson, Dispatch, FleetPlanner, FleetSnapshot,
    PlannerConfig, Point,
};
use serde_json::{json, Value};

const DAYS: [&str; 7] = [
    "MONDAY",
    "TUESDAY",
    "WEDNESDAY",
    "THURSDAY",
    "FRIDAY",
    "SATURDAY",
    "SUNDAY",
];

fn all_week() -> Value {
    Value::Array(
        DAYS.iter()
            .map(|day| json!({"dayOfWeek": day, "from": "00:00:00", "until": "23:59:59"}))
            .collect(),
    )
}

fn drone(id: &str, max_moves: i64, cooling: bool) -> Value {
    json!({
        "id": id,
        "name": format!("Drone {id}"),
        "capability": {
            "cooling": cooling,
            "heating": false,
            "capacity": 1.0,
            "maxMoves": max_moves,
            "costPerMove": 1.0,
            "costInitial": 0.0,
            "costFinal": 0.0
        }
    })
}

fn snapshot(drones: Vec<Value>, restricted_areas: Value) -> FleetSnapshot {
    let listed: Vec<Value> = drones
        .iter()
        .map(|d| json!({"id": d["id"], "availability": all_week()}))
        .collect();
    serde_json::from_value(json!({
        "drones": drones,
        "servicePoints": [
            {"id": 1, "name": "Base", "location": {"lng": 0.0, "lat": 0.0}}
        ],
        "availability": [
            {"servicePointId": 1, "drones": listed}
        ],
        "restrictedAreas": restricted_areas
    }))
    .expect("snapshot decodes")
}

fn dispatch(id: u32, lng: f64, lat: f64, cooling: bool) -> Dispatch {
    serde_json::from_value(json!({
        "id": id,
        "date": "2025-01-22",
        "time": "14:30:00",
        "requirements": {"capacity": 0.5, "cooling": cooling},
        "delivery": {"lng": lng, "lat": lat}
    }))
    .expect("dispatch decodes")
}

fn rectangle(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Value {
    json!([{
        "id": 9,
        "name": "No-fly",
        "vertices": [
            {"lng": min_lng, "lat": min_lat},
            {"lng": max_lng, "lat": min_lat},
            {"lng": max_lng, "lat": max_lat},
            {"lng": min_lng, "lat": max_lat},
            {"lng": min_lng, "lat": min_lat}
        ]
    }])
}

#[test]
fn test_single_delivery_round_trip() {
    let snapshot = snapshot(vec![drone("1", 10_000, false)], json!([]));
    let result = plan_deliveries(
        &snapshot,
        &[dispatch(1, 0.003, 0.0, false)],
        &PlannerConfig::default(),
    );

    assert_eq!(result.drone_paths.len(), 1);
    let route = &result.drone_paths[0];
    assert_eq!(route.drone_id, "1");
    assert_eq!(route.deliveries.len(), 2);
    assert_eq!(route.deliveries[0].delivery_id, Some(1));
    assert_eq!(route.deliveries[1].delivery_id, None);

    assert_eq!(result.total_moves, 40);
    assert!((result.total_cost - 40.0).abs() < 1e-9);
    assert!(result.unassigned_dispatch_ids.is_empty());

    let geojson = render_geojson(&result);
    let coords = geojson["coordinates"].as_array().expect("coordinates");
    // 21 outbound points plus hover, then 21 points home.
    assert_eq!(coords.len(), 43);
    assert_eq!(coords[0], json!([0.0, 0.0]));
}

#[test]
fn test_enclosed_service_point_drops_dispatch() {
    let snapshot = snapshot(
        vec![drone("1", 10_000, false)],
        rectangle(-0.001, -0.001, 0.005, 0.001),
    );
    let result = plan_deliveries(
        &snapshot,
        &[dispatch(1, 0.003, 0.0, false)],
        &PlannerConfig::default(),
    );

    assert!(result.drone_paths.is_empty());
    assert_eq!(result.total_moves, 0);
    assert_eq!(result.unassigned_dispatch_ids, vec![1]);
}

#[test]
fn test_tour_without_return_leg_leaves_dispatch_unassigned() {
    // The hover point past the wall's corner is one move farther from base
    // than the drop-off: 8 out, then 8 home where 7 was expected.
    let wall = rectangle(0.0008, -0.0003, 0.0009, 0.0006);
    let batch = [dispatch(1, 0.00113, -0.00031, false)];

    let short = snapshot(vec![drone("1", 15, false)], wall.clone());
    let result = plan_deliveries(&short, &batch, &PlannerConfig::default());
    assert!(result.drone_paths.is_empty());
    assert_eq!(result.total_moves, 0);
    assert_eq!(result.unassigned_dispatch_ids, vec![1]);

    // A failed trial leaves the dispatch free for the next drone.
    let mixed = snapshot(vec![drone("1", 15, false), drone("2", 16, false)], wall);
    let result = plan_deliveries(&mixed, &batch, &PlannerConfig::default());
    assert_eq!(result.drone_paths.len(), 1);
    assert_eq!(result.drone_paths[0].drone_id, "2");
    assert_eq!(result.total_moves, 16);
    assert!(result.unassigned_dispatch_ids.is_empty());
}

#[test]
fn test_route_detours_around_restricted_area() {
    let snapshot = snapshot(
        vec![drone("1", 10_000, false)],
        rectangle(0.0012, -0.0006, 0.0015, 0.0006),
    );
    let result = plan_deliveries(
        &snapshot,
        &[dispatch(1, 0.003, 0.0, false)],
        &PlannerConfig::default(),
    );

    assert_eq!(result.drone_paths.len(), 1);
    assert!(result.total_moves > 40);
    for leg in &result.drone_paths[0].deliveries {
        for point in &leg.flight_path {
            assert!(!is_blocked(point, &snapshot.restricted_areas));
        }
    }
}

#[test]
fn test_shortest_tour_is_committed_first() {
    // Drone A cannot carry cooled goods; drone B can carry both.
    let snapshot = snapshot(
        vec![drone("A", 10_000, false), drone("B", 10_000, true)],
        json!([]),
    );
    let batch = vec![
        dispatch(1, 0.003, 0.0, false),
        dispatch(2, 0.0, 0.003, true),
    ];
    let result = plan_deliveries(&snapshot, &batch, &PlannerConfig::default());

    // B's tour covering both is longer than A's single delivery.
    assert_eq!(result.drone_paths.len(), 2);
    assert_eq!(result.drone_paths[0].drone_id, "A");
    assert_eq!(
        result.drone_paths[0].dispatch_ids().collect::<Vec<_>>(),
        vec![1]
    );
    assert_eq!(result.drone_paths[1].drone_id, "B");
    assert_eq!(
        result.drone_paths[1].dispatch_ids().collect::<Vec<_>>(),
        vec![2]
    );
    assert_eq!(result.total_moves, 80);
}

#[test]
fn test_each_dispatch_assigned_at_most_once() {
    let snapshot = snapshot(
        vec![drone("1", 120, false), drone("2", 120, false)],
        json!([]),
    );
    let batch = vec![
        dispatch(1, 0.003, 0.0, false),
        dispatch(2, -0.003, 0.0, false),
        dispatch(3, 0.0, 0.003, false),
        dispatch(4, 0.0, -0.003, false),
        dispatch(5, 0.0015, 0.0015, false),
        // Neither drone can cool.
        dispatch(6, 0.001, 0.001, true),
    ];
    let result = plan_deliveries(&snapshot, &batch, &PlannerConfig::default());

    let mut seen = HashSet::new();
    for id in result.assigned_dispatch_ids() {
        assert!(seen.insert(id), "dispatch {id} assigned twice");
    }
    for id in &result.unassigned_dispatch_ids {
        assert!(!seen.contains(id));
    }
    assert_eq!(seen.len() + result.unassigned_dispatch_ids.len(), batch.len());
    assert!(result.unassigned_dispatch_ids.contains(&6));

    for route in &result.drone_paths {
        assert!(route.total_moves <= 120);
        let last = route.deliveries.last().expect("return leg");
        assert_eq!(last.delivery_id, None);
    }
}

#[test]
fn test_empty_batch_and_empty_fleet() {
    let snapshot = snapshot(vec![drone("1", 10_000, false)], json!([]));
    let result = plan_deliveries(&snapshot, &[], &PlannerConfig::default());
    assert!(result.drone_paths.is_empty());
    assert_eq!(result.total_cost, 0.0);

    let empty = FleetSnapshot::default();
    let result = plan_deliveries(
        &empty,
        &[dispatch(1, 0.003, 0.0, false)],
        &PlannerConfig::default(),
    );
    assert!(result.drone_paths.is_empty());
    assert_eq!(result.unassigned_dispatch_ids, vec![1]);
}

#[test]
fn test_available_drones_for_batch() {
    let snapshot = snapshot(
        vec![drone("A", 10_000, false), drone("B", 10_000, true)],
        json!([]),
    );
    let planner = FleetPlanner::new(&snapshot, PlannerConfig::default());

    assert_eq!(planner.query_available_drones(&[]), vec!["A", "B"]);
    assert_eq!(
        planner.query_available_drones(&[
            dispatch(1, 0.003, 0.0, false),
            dispatch(2, 0.0, 0.003, true),
        ]),
        vec!["B"]
    );

    let mut unreachable_day = dispatch(3, 0.003, 0.0, false);
    unreachable_day.time = None;
    assert!(planner.query_available_drones(&[unreachable_day]).is_empty());
}

#[test]
fn test_result_serializes_in_wire_format() {
    let snapshot = snapshot(vec![drone("1", 10_000, false)], json!([]));
    let result = plan_deliveries(
        &snapshot,
        &[dispatch(7, 0.003, 0.0, false)],
        &PlannerConfig::default(),
    );
    let encoded = serde_json::to_value(&result).expect("encodes");

    assert_eq!(encoded["totalMoves"], 40);
    assert_eq!(encoded["dronePaths"][0]["droneId"], "1");
    assert_eq!(encoded["dronePaths"][0]["deliveries"][0]["deliveryId"], 7);
    assert!(encoded["dronePaths"][0]["deliveries"][1]["deliveryId"].is_null());
    assert!(encoded.get("unassignedDispatchIds").is_none());

    let start: Point = serde_json::from_value(
        encoded["dronePaths"][0]["deliveries"][0]["flightPath"][0].clone(),
    )
    .expect("point decodes");
    assert_eq!(start, Point::new(0.0, 0.0));
}
