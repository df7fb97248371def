//! Router facade owning one diagram's registry.

use crate::geometry::Point;
use crate::registry::{ConnectionPoint, Obstacle, Registry};

use super::options::{RouteError, RouteOptions, RoutingResult};
use super::pairing::{ConnectionPair, find_optimal_connection_points};
use super::path_check::{PathReport, validate_path};
use super::planner::{route_connection, route_connection_points};
use super::smoothing::optimize_path;

/// Routing entry point for one diagram.
///
/// Independent instances share nothing, so each diagram (or test) gets its
/// own. The stored options apply to every call that does not pass its own.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRouter {
    registry: Registry,
    options: RouteOptions,
}

impl ConnectionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RouteOptions) -> Self {
        Self {
            registry: Registry::new(),
            options,
        }
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RouteOptions) {
        self.options = options;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn register_obstacle(&mut self, obstacle: Obstacle) {
        self.registry.register_obstacle(obstacle);
    }

    pub fn remove_obstacle(&mut self, id: &str) -> Option<Obstacle> {
        self.registry.remove_obstacle(id)
    }

    pub fn register_connection_point(&mut self, point: ConnectionPoint) {
        self.registry.register_connection_point(point);
    }

    pub fn remove_connection_point(&mut self, id: &str) -> Option<ConnectionPoint> {
        self.registry.remove_connection_point(id)
    }

    pub fn obstacles(&self) -> Vec<&Obstacle> {
        self.registry.obstacles().collect()
    }

    pub fn connection_points(&self) -> Vec<&ConnectionPoint> {
        self.registry.connection_points().collect()
    }

    pub fn available_connection_points<'a>(&'a self, node_id: &'a str) -> Vec<&'a ConnectionPoint> {
        self.registry.available_connection_points(node_id).collect()
    }

    pub fn clear(&mut self) {
        self.registry.clear();
    }

    pub fn find_optimal_connection_points(
        &self,
        source_node_id: &str,
        target_node_id: &str,
    ) -> Option<ConnectionPair> {
        find_optimal_connection_points(&self.registry, source_node_id, target_node_id)
    }

    pub fn route_connection(&self, start: Point, end: Point) -> Result<RoutingResult, RouteError> {
        self.route_connection_with(start, end, &self.options)
    }

    pub fn route_connection_with(
        &self,
        start: Point,
        end: Point,
        options: &RouteOptions,
    ) -> Result<RoutingResult, RouteError> {
        route_connection(&self.registry, start, end, options)
    }

    pub fn route_connection_points(
        &self,
        source: &ConnectionPoint,
        target: &ConnectionPoint,
    ) -> Result<RoutingResult, RouteError> {
        self.route_connection_points_with(source, target, &self.options)
    }

    pub fn route_connection_points_with(
        &self,
        source: &ConnectionPoint,
        target: &ConnectionPoint,
        options: &RouteOptions,
    ) -> Result<RoutingResult, RouteError> {
        route_connection_points(&self.registry, source, target, options)
    }

    pub fn optimize_path(&self, path: &[Point]) -> Vec<Point> {
        self.optimize_path_with(path, &self.options)
    }

    pub fn optimize_path_with(&self, path: &[Point], options: &RouteOptions) -> Vec<Point> {
        optimize_path(&self.registry, path, options)
    }

    pub fn validate_path(&self, path: &[Point]) -> Result<PathReport, RouteError> {
        self.validate_path_with(path, &self.options)
    }

    pub fn validate_path_with(
        &self,
        path: &[Point],
        options: &RouteOptions,
    ) -> Result<PathReport, RouteError> {
        validate_path(&self.registry, path, options)
    }
}
