//! Point-to-point route planning: direct shortcut, then grid search.

use tracing::{debug, warn};

use crate::geometry::Point;
use crate::registry::{ConnectionPoint, Registry};

use super::clearance::ObstacleField;
use super::options::{RouteError, RouteOptions, RoutingResult};
use super::search::{GridSearch, SearchOutcome};

/// Launch points sit this many grid cells out from their connection point.
const LAUNCH_CELLS: f64 = 2.0;

/// Route between two free points.
///
/// Endpoints are snapped to the grid first. The straight segment is returned
/// when obstacle avoidance is off or nothing blocks it; otherwise an A*
/// search runs and, if it fails, the straight segment comes back flagged
/// with `fell_back`.
pub fn route_connection(
    registry: &Registry,
    start: Point,
    end: Point,
    options: &RouteOptions,
) -> Result<RoutingResult, RouteError> {
    RouteError::check_grid(options.grid_size)?;
    RouteError::check_in_grid(&start, options.grid_size, "route start")?;
    RouteError::check_in_grid(&end, options.grid_size, "route end")?;

    let start = start.snap(options.grid_size);
    let end = end.snap(options.grid_size);
    let direct = vec![start, end];

    if !options.avoid_obstacles {
        return Ok(RoutingResult::from_path(direct));
    }

    let field = ObstacleField::new(registry.obstacles(), options.obstacle_margin);
    let blocking = field.blocking(&start, &end);
    if blocking.is_empty() {
        debug!(?start, ?end, "direct route is clear");
        return Ok(RoutingResult::from_path(direct));
    }

    let search_field = field.excluding_containing(&[start, end]);
    let search = GridSearch {
        field: &search_field,
        grid_size: options.grid_size,
        diagonal: !options.prefer_straight_lines,
        max_expansions: options.max_search_nodes,
    };

    match search.run(start, end) {
        SearchOutcome::Found(path) => {
            debug!(points = path.len(), blocked_by = ?blocking, "grid search found a detour");
            Ok(RoutingResult::from_path(path))
        }
        outcome => {
            warn!(
                ?start,
                ?end,
                ?outcome,
                "grid search failed, falling back to direct route"
            );
            let mut result = RoutingResult::from_path(direct);
            result.fell_back = true;
            result.blocking_obstacle_ids = blocking.into_iter().map(String::from).collect();
            Ok(result)
        }
    }
}

/// Route between two connection points via their launch points.
///
/// Each point is pushed `2 × grid_size` outward along its direction so the
/// route leaves the node body cleanly; the returned path runs between those
/// launch points.
pub fn route_connection_points(
    registry: &Registry,
    source: &ConnectionPoint,
    target: &ConnectionPoint,
    options: &RouteOptions,
) -> Result<RoutingResult, RouteError> {
    RouteError::check_grid(options.grid_size)?;
    RouteError::check_point(&source.position, format!("connection point {}", source.id))?;
    RouteError::check_point(&target.position, format!("connection point {}", target.id))?;

    let clearance = LAUNCH_CELLS * options.grid_size;
    route_connection(
        registry,
        source.launch_point(clearance),
        target.launch_point(clearance),
        options,
    )
}
