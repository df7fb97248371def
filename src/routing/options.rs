//! Per-call routing configuration and results.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Routing knobs. Every field has a default so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteOptions {
    /// Run obstacle checks at all.
    pub avoid_obstacles: bool,
    /// Restrict the grid search to the four cardinal moves.
    pub prefer_straight_lines: bool,
    /// Shortest segment the path validator accepts.
    pub minimum_segment_length: f64,
    /// Snap granularity and search step.
    pub grid_size: f64,
    /// Fillet radius applied by the smoother; 0 keeps sharp corners.
    pub corner_radius: f64,
    /// Clearance added around every obstacle before intersection tests.
    pub obstacle_margin: f64,
    /// Cell expansions the grid search may perform before giving up.
    pub max_search_nodes: usize,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            avoid_obstacles: true,
            prefer_straight_lines: true,
            minimum_segment_length: 20.0,
            grid_size: 10.0,
            corner_radius: 0.0,
            obstacle_margin: 10.0,
            max_search_nodes: 100_000,
        }
    }
}

/// Output of a routing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingResult {
    pub path: Vec<Point>,
    pub distance: f64,
    pub segment_count: usize,
    pub valid: bool,
    /// Obstacles crossed by the returned path (only non-empty after a fallback).
    pub blocking_obstacle_ids: Vec<String>,
    /// The grid search failed and the straight route was returned instead.
    pub fell_back: bool,
}

impl RoutingResult {
    pub(crate) fn from_path(path: Vec<Point>) -> Self {
        let distance = crate::geometry::path_length(&path);
        Self {
            segment_count: path.len().saturating_sub(1),
            valid: path.len() >= 2,
            distance,
            path,
            blocking_obstacle_ids: Vec::new(),
            fell_back: false,
        }
    }
}

/// Largest grid cell index routed exactly (2^53).
const MAX_CELL_INDEX: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("Invalid coordinate in {context}: ({x}, {y})")]
    InvalidGeometry { context: String, x: f64, y: f64 },
    #[error("Grid size must be positive and finite, got {0}")]
    InvalidGridSize(f64),
}

impl RouteError {
    pub(crate) fn check_point(p: &Point, context: impl Into<String>) -> Result<(), RouteError> {
        if p.is_finite() {
            Ok(())
        } else {
            Err(RouteError::InvalidGeometry {
                context: context.into(),
                x: p.x,
                y: p.y,
            })
        }
    }

    /// Finite, and on a grid cell index that `i64` and `f64` both hold exactly.
    pub(crate) fn check_in_grid(
        p: &Point,
        grid_size: f64,
        context: impl Into<String>,
    ) -> Result<(), RouteError> {
        let in_range = |v: f64| (v / grid_size).abs() <= MAX_CELL_INDEX;
        if p.is_finite() && in_range(p.x) && in_range(p.y) {
            Ok(())
        } else {
            Err(RouteError::InvalidGeometry {
                context: context.into(),
                x: p.x,
                y: p.y,
            })
        }
    }

    pub(crate) fn check_grid(grid_size: f64) -> Result<(), RouteError> {
        if grid_size.is_finite() && grid_size > 0.0 {
            Ok(())
        } else {
            Err(RouteError::InvalidGridSize(grid_size))
        }
    }
}
