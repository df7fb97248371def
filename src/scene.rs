//! Batch JSON front end: load a diagram, route requested links, validate connections.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::geometry::Point;
use crate::registry::{ConnectionPoint, Obstacle};
use crate::routing::{ConnectionRouter, PathReport, RouteError, RouteOptions, RoutingResult};
use crate::validation::{BatchSummary, ConnectionData, ConnectionValidator};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown connection point: {0}")]
    UnknownPoint(String),
    #[error("No free compatible connection points between nodes {from_node} and {to_node}")]
    NoPointPair { from_node: String, to_node: String },
    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Which two places a route request joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum RouteEnds {
    Points { from: Point, to: Point },
    ConnectionPoints { source_point_id: String, target_point_id: String },
    Nodes { source_node_id: String, target_node_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub ends: RouteEnds,
    /// Overrides the scene options for this route only.
    #[serde(default)]
    pub options: Option<RouteOptions>,
}

/// A whole diagram as submitted by the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scene {
    pub options: RouteOptions,
    pub obstacles: Vec<Obstacle>,
    pub connection_points: Vec<ConnectionPoint>,
    pub routes: Vec<RouteRequest>,
    pub connections: Vec<ConnectionData>,
}

/// Routed, smoothed and checked path for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteReport {
    pub id: Option<String>,
    pub source_point_id: Option<String>,
    pub target_point_id: Option<String>,
    #[serde(flatten)]
    pub routing: RoutingResult,
    pub check: PathReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneReport {
    pub routes: Vec<RouteReport>,
    pub connections: BatchSummary,
}

impl SceneReport {
    pub fn to_json(&self, pretty: bool) -> Result<String, SceneError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Router pre-loaded with this scene's obstacles and points.
    pub fn router(&self) -> ConnectionRouter {
        let mut router = ConnectionRouter::with_options(self.options.clone());
        for obstacle in &self.obstacles {
            router.register_obstacle(obstacle.clone());
        }
        for point in &self.connection_points {
            router.register_connection_point(point.clone());
        }
        router
    }

    pub fn run(&self) -> Result<SceneReport, SceneError> {
        self.run_with(&ConnectionValidator::new())
    }

    pub fn run_with(&self, validator: &ConnectionValidator) -> Result<SceneReport, SceneError> {
        info!(
            obstacles = self.obstacles.len(),
            points = self.connection_points.len(),
            routes = self.routes.len(),
            connections = self.connections.len(),
            "running scene"
        );
        let mut router = self.router();
        let mut routes = Vec::with_capacity(self.routes.len());
        for request in &self.routes {
            let report = route_request(&router, request)?;
            // later node-to-node requests pick other points
            for id in [&report.source_point_id, &report.target_point_id].into_iter().flatten() {
                router.registry_mut().set_occupied(id, true);
            }
            routes.push(report);
        }
        let connections = validator.validate_connections(&self.connections);
        Ok(SceneReport { routes, connections })
    }
}

/// Parse, route and validate a scene in one go.
pub fn run_scene(json: &str) -> Result<SceneReport, SceneError> {
    Scene::from_json(json)?.run()
}

/// Route one request against `router`, then smooth and check the path.
///
/// Occupancy is left untouched; committing the link is the caller's call.
pub fn route_request(
    router: &ConnectionRouter,
    request: &RouteRequest,
) -> Result<RouteReport, SceneError> {
    let options = request
        .options
        .clone()
        .unwrap_or_else(|| router.options().clone());

    let (raw, endpoints) = match &request.ends {
        RouteEnds::Points { from, to } => (router.route_connection_with(*from, *to, &options)?, None),
        RouteEnds::ConnectionPoints {
            source_point_id,
            target_point_id,
        } => {
            let source = lookup_point(router, source_point_id)?;
            let target = lookup_point(router, target_point_id)?;
            let raw = router.route_connection_points_with(&source, &target, &options)?;
            (raw, Some((source.id, target.id)))
        }
        RouteEnds::Nodes {
            source_node_id,
            target_node_id,
        } => {
            let pair = router
                .find_optimal_connection_points(source_node_id, target_node_id)
                .ok_or_else(|| SceneError::NoPointPair {
                    from_node: source_node_id.clone(),
                    to_node: target_node_id.clone(),
                })?;
            let raw = router.route_connection_points_with(&pair.source, &pair.target, &options)?;
            (raw, Some((pair.source.id, pair.target.id)))
        }
    };

    let smoothed = router.optimize_path_with(&raw.path, &options);
    let check = router.validate_path_with(&smoothed, &options)?;
    let mut routing = RoutingResult::from_path(smoothed);
    routing.fell_back = raw.fell_back;
    routing.blocking_obstacle_ids = raw.blocking_obstacle_ids;

    debug!(
        id = request.id.as_deref().unwrap_or("-"),
        points = routing.path.len(),
        distance = routing.distance,
        clean = check.valid,
        "route finished"
    );

    let (source_point_id, target_point_id) = endpoints.unzip();
    Ok(RouteReport {
        id: request.id.clone(),
        source_point_id,
        target_point_id,
        routing,
        check,
    })
}

fn lookup_point(router: &ConnectionRouter, id: &str) -> Result<ConnectionPoint, SceneError> {
    router
        .registry()
        .connection_point(id)
        .cloned()
        .ok_or_else(|| SceneError::UnknownPoint(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "options": {"gridSize": 10},
        "obstacles": [
            {"id": "P-101", "bounds": {"x": 0, "y": 0, "width": 40, "height": 40}},
            {"id": "wall", "bounds": {"x": 100, "y": -100, "width": 10, "height": 260}, "kind": "boundary"},
            {"id": "V-201", "bounds": {"x": 200, "y": 0, "width": 40, "height": 40}}
        ],
        "connectionPoints": [
            {"id": "p-out", "ownerNodeId": "P-101", "position": {"x": 40, "y": 20}, "direction": "east", "role": "output"},
            {"id": "p-top", "ownerNodeId": "P-101", "position": {"x": 20, "y": 0}, "direction": "north", "role": "output"},
            {"id": "v-in", "ownerNodeId": "V-201", "position": {"x": 200, "y": 20}, "direction": "west", "role": "input"},
            {"id": "v-top", "ownerNodeId": "V-201", "position": {"x": 220, "y": 0}, "direction": "north", "role": "input"}
        ],
        "routes": [
            {"id": "r1", "sourceNodeId": "P-101", "targetNodeId": "V-201"},
            {"id": "r2", "sourceNodeId": "P-101", "targetNodeId": "V-201"},
            {"id": "r3", "from": {"x": 0, "y": 300}, "to": {"x": 200, "y": 300}}
        ],
        "connections": [{
            "id": "c1",
            "source": {"nodeId": "P-101", "nodeType": "pump"},
            "target": {"nodeId": "V-201", "nodeType": "vessel"},
            "connectionType": {"name": "process"},
            "properties": {"lineType": "process", "fluid": "water", "pipeSize": "4in"}
        }]
    }"#;

    #[test]
    fn test_request_shapes() {
        let r: RouteRequest = serde_json::from_str(r#"{"from": {"x": 1, "y": 2}, "to": {"x": 3, "y": 4}}"#).unwrap();
        assert!(matches!(r.ends, RouteEnds::Points { .. }));
        let r: RouteRequest =
            serde_json::from_str(r#"{"id": "a", "sourcePointId": "p", "targetPointId": "q"}"#).unwrap();
        assert!(matches!(r.ends, RouteEnds::ConnectionPoints { .. }));
        let r: RouteRequest = serde_json::from_str(
            r#"{"sourceNodeId": "n1", "targetNodeId": "n2", "options": {"avoidObstacles": false}}"#,
        )
        .unwrap();
        assert!(matches!(r.ends, RouteEnds::Nodes { .. }));
        assert!(!r.options.unwrap().avoid_obstacles);
    }

    #[test]
    fn test_run_scene() {
        let report = run_scene(SCENE).unwrap();
        assert_eq!(report.routes.len(), 3);

        let first = &report.routes[0];
        assert_eq!(first.source_point_id.as_deref(), Some("p-out"));
        assert_eq!(first.target_point_id.as_deref(), Some("v-in"));
        assert!(!first.routing.fell_back);
        assert!(first.routing.path.len() > 2);
        assert!(!first.check.issues.iter().any(|i| i.contains("intersects")));

        // first pair is now occupied
        let second = &report.routes[1];
        assert_eq!(second.source_point_id.as_deref(), Some("p-top"));
        assert_eq!(second.target_point_id.as_deref(), Some("v-top"));

        let third = &report.routes[2];
        assert_eq!(third.routing.path.len(), 2);
        assert!(third.source_point_id.is_none());
        assert!(third.check.valid);

        assert_eq!(report.connections.total, 1);
        assert_eq!(report.connections.valid, 1);
        assert_eq!(report.connections.average_score, 100.0);
    }

    #[test]
    fn test_report_json() {
        let json = run_scene(SCENE).unwrap().to_json(false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["routes"][0]["id"], "r1");
        assert!(value["routes"][0]["segmentCount"].is_u64());
        assert!(value["routes"][0]["check"]["valid"].is_boolean());
        assert_eq!(value["connections"]["averageScore"], 100.0);
    }

    #[test]
    fn test_pairs_run_out() {
        let mut scene = Scene::from_json(SCENE).unwrap();
        scene.routes.truncate(2);
        scene.routes.push(scene.routes[0].clone());
        let err = scene.run().unwrap_err();
        assert!(matches!(err, SceneError::NoPointPair { .. }));
    }

    #[test]
    fn test_single_request_leaves_points_free() {
        let router = Scene::from_json(SCENE).unwrap().router();
        let request: RouteRequest =
            serde_json::from_str(r#"{"sourceNodeId": "P-101", "targetNodeId": "V-201"}"#).unwrap();
        let first = route_request(&router, &request).unwrap();
        let second = route_request(&router, &request).unwrap();
        assert_eq!(first.source_point_id, second.source_point_id);
        assert_eq!(first.target_point_id, second.target_point_id);
        assert_eq!(router.available_connection_points("P-101").len(), 2);
        assert_eq!(router.available_connection_points("V-201").len(), 2);
    }

    #[test]
    fn test_unknown_point() {
        let json = r#"{"routes": [{"sourcePointId": "nope", "targetPointId": "nada"}]}"#;
        match run_scene(json) {
            Err(SceneError::UnknownPoint(id)) => assert_eq!(id, "nope"),
            other => panic!("expected unknown point, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_input() {
        assert!(matches!(run_scene("{"), Err(SceneError::Json(_))));
        let json = r#"{"options": {"gridSize": -1}, "routes": [{"from": {"x": 0, "y": 0}, "to": {"x": 10, "y": 0}}]}"#;
        assert!(matches!(
            run_scene(json),
            Err(SceneError::Route(RouteError::InvalidGridSize(_)))
        ));
    }

    #[test]
    fn test_empty_scene() {
        let report = run_scene("{}").unwrap();
        assert!(report.routes.is_empty());
        assert_eq!(report.connections.total, 0);
        assert_eq!(report.connections.average_score, 0.0);
    }
}
