//! Structural checks on a computed path.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::registry::Registry;

use super::clearance::ObstacleField;
use super::options::{RouteError, RouteOptions};

/// Outcome of [`validate_path`]; `valid` iff `issues` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathReport {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Check segment lengths and obstacle clearance.
///
/// Non-finite coordinates are rejected up front; every other problem is
/// reported as an issue string.
pub fn validate_path(
    registry: &Registry,
    path: &[Point],
    options: &RouteOptions,
) -> Result<PathReport, RouteError> {
    for (i, p) in path.iter().enumerate() {
        RouteError::check_point(p, format!("path point {i}"))?;
    }

    if path.len() < 2 {
        return Ok(PathReport {
            valid: false,
            issues: vec!["Path must have at least 2 points".to_string()],
        });
    }

    let field = options
        .avoid_obstacles
        .then(|| ObstacleField::new(registry.obstacles(), options.obstacle_margin));

    let mut issues = Vec::new();
    for (i, seg) in path.windows(2).enumerate() {
        let distance = seg[0].distance(&seg[1]);
        if distance < options.minimum_segment_length {
            issues.push(format!("Segment {i} is too short: {distance}px"));
        }
        if let Some(field) = &field {
            let hits = field.blocking(&seg[0], &seg[1]);
            if !hits.is_empty() {
                issues.push(format!("Segment {i} intersects obstacles: {}", hits.join(", ")));
            }
        }
    }

    Ok(PathReport {
        valid: issues.is_empty(),
        issues,
    })
}
