//! Connection-point pair selection between two nodes.

use serde::{Deserialize, Serialize};

use crate::registry::{ConnectionPoint, Registry};

/// Bonus subtracted from the distance for each endpoint facing the other.
const DIRECTION_BONUS: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPair {
    pub source: ConnectionPoint,
    pub target: ConnectionPoint,
}

/// Pick the best free, role-compatible pair of points on two nodes.
///
/// Candidates are ranked by Euclidean distance minus a bonus for each point
/// whose direction faces the other one. Ties keep the first pair seen in
/// registration order.
pub fn find_optimal_connection_points(
    registry: &Registry,
    source_node_id: &str,
    target_node_id: &str,
) -> Option<ConnectionPair> {
    let sources: Vec<&ConnectionPoint> = registry.available_connection_points(source_node_id).collect();
    let targets: Vec<&ConnectionPoint> = registry.available_connection_points(target_node_id).collect();

    let mut best: Option<(f64, &ConnectionPoint, &ConnectionPoint)> = None;
    for &source in &sources {
        for &target in &targets {
            if !source.role.compatible_with(target.role) {
                continue;
            }
            let score = source.position.distance(&target.position) - direction_bonus(source, target);
            if best.is_none_or(|(best_score, _, _)| score < best_score) {
                best = Some((score, source, target));
            }
        }
    }

    best.map(|(_, source, target)| ConnectionPair {
        source: source.clone(),
        target: target.clone(),
    })
}

fn direction_bonus(source: &ConnectionPoint, target: &ConnectionPoint) -> f64 {
    let dx = target.position.x - source.position.x;
    let dy = target.position.y - source.position.y;
    let mut bonus = 0.0;
    if source.direction.faces(dx, dy) {
        bonus += DIRECTION_BONUS;
    }
    if target.direction.faces(-dx, -dy) {
        bonus += DIRECTION_BONUS;
    }
    bonus
}
