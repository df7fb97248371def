//! Waypoint collapsing and corner fillets.

use crate::geometry::Point;
use crate::registry::Registry;

use super::clearance::ObstacleField;
use super::options::RouteOptions;

/// Collapse redundant waypoints, then fillet corners when `corner_radius > 0`.
///
/// Single left-to-right pass: an interior point is dropped when the segment
/// from the last kept point to the next original point is obstacle-clear.
/// Endpoints never move. Obstacles containing an endpoint are ignored, as
/// in the planner, so a path leaving a node body still collapses.
pub fn optimize_path(registry: &Registry, path: &[Point], options: &RouteOptions) -> Vec<Point> {
    if path.len() < 3 {
        return path.to_vec();
    }
    let last = path[path.len() - 1];
    let field = ObstacleField::new(registry.obstacles(), options.obstacle_margin)
        .excluding_containing(&[path[0], last]);

    let mut kept = Vec::with_capacity(path.len());
    kept.push(path[0]);
    for window in path.windows(3) {
        let (current, next) = (window[1], window[2]);
        let anchor = kept[kept.len() - 1];
        if !field.is_clear(&anchor, &next) {
            kept.push(current);
        }
    }
    kept.push(last);

    if options.corner_radius > 0.0 {
        round_corners(&kept, options.corner_radius, &field)
    } else {
        kept
    }
}

/// Replace each interior corner with entry tangent, curve midpoint, exit tangent.
///
/// The radius is clamped to half of each adjacent segment so neighbouring
/// fillets never overlap. A fillet whose new segments hit an obstacle is
/// dropped and the sharp corner kept.
fn round_corners(path: &[Point], radius: f64, field: &ObstacleField<'_>) -> Vec<Point> {
    let mut out = Vec::with_capacity(path.len() * 3);
    out.push(path[0]);
    for window in path.windows(3) {
        let (prev, corner, next) = (window[0], window[1], window[2]);
        match fillet(&prev, &corner, &next, radius) {
            Some([entry, mid, exit])
                if field.is_clear(&entry, &mid) && field.is_clear(&mid, &exit) =>
            {
                out.extend([entry, mid, exit]);
            }
            _ => out.push(corner),
        }
    }
    out.push(path[path.len() - 1]);
    out
}

fn fillet(prev: &Point, corner: &Point, next: &Point, radius: f64) -> Option<[Point; 3]> {
    let len_in = corner.distance(prev);
    let len_out = corner.distance(next);
    if len_in == 0.0 || len_out == 0.0 {
        return None;
    }
    // straight through: nothing to round
    let cross = (corner.x - prev.x) * (next.y - corner.y) - (corner.y - prev.y) * (next.x - corner.x);
    if cross.abs() <= f64::EPSILON * len_in * len_out {
        return None;
    }
    let r = radius.min(len_in / 2.0).min(len_out / 2.0);
    if r <= 0.0 {
        return None;
    }
    let entry = corner.lerp(prev, r / len_in);
    let exit = corner.lerp(next, r / len_out);
    // midpoint of the quadratic curve entry -> corner -> exit
    let mid = Point::new(
        0.25 * entry.x + 0.5 * corner.x + 0.25 * exit.x,
        0.25 * entry.y + 0.5 * corner.y + 0.25 * exit.y,
    );
    Some([entry, mid, exit])
}
