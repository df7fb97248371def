//! Obstacle and connection-point catalogs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::geometry::{Point, Rect};

/// What an obstacle stands for. Geometry handling is identical for all kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    #[default]
    Node,
    Label,
    Boundary,
    #[serde(other)]
    Other,
}

/// A rectangle routed paths must keep clear of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obstacle {
    pub id: String,
    pub bounds: Rect,
    #[serde(default)]
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn new(id: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            bounds,
            kind: ObstacleKind::Node,
        }
    }

    pub fn with_kind(mut self, kind: ObstacleKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Outward-facing side of a connection point (screen coordinates, y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Unit vector pointing away from the node.
    pub fn unit(self) -> (f64, f64) {
        match self {
            Self::North => (0.0, -1.0),
            Self::South => (0.0, 1.0),
            Self::East => (1.0, 0.0),
            Self::West => (-1.0, 0.0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// Whether leaving in this direction moves along `(dx, dy)`.
    pub fn faces(self, dx: f64, dy: f64) -> bool {
        match self {
            Self::East => dx > 0.0,
            Self::West => dx < 0.0,
            Self::North => dy < 0.0,
            Self::South => dy > 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointRole {
    Input,
    Output,
    Bidirectional,
}

impl PointRole {
    /// Two inputs or two outputs never pair; bidirectional pairs with anything.
    pub fn compatible_with(self, other: PointRole) -> bool {
        !matches!(
            (self, other),
            (Self::Input, Self::Input) | (Self::Output, Self::Output)
        )
    }
}

/// Directional attachment point on a node's boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPoint {
    pub id: String,
    pub position: Point,
    pub direction: Direction,
    pub role: PointRole,
    #[serde(default)]
    pub occupied: bool,
    pub owner_node_id: String,
}

impl ConnectionPoint {
    pub fn new(
        id: impl Into<String>,
        owner_node_id: impl Into<String>,
        position: Point,
        direction: Direction,
        role: PointRole,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            direction,
            role,
            occupied: false,
            owner_node_id: owner_node_id.into(),
        }
    }

    /// Launch point `distance` units out from the node along `direction`.
    pub fn launch_point(&self, distance: f64) -> Point {
        let (dx, dy) = self.direction.unit();
        self.position.offset(dx, dy, distance)
    }
}

/// Id-keyed slot arena that keeps registration order.
///
/// Re-registering an id overwrites its slot in place; removal leaves a
/// tombstone that is compacted away once tombstones dominate.
#[derive(Debug, Clone)]
struct Catalog<T> {
    slots: Vec<Option<(String, T)>>,
    index: HashMap<String, usize>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Catalog<T> {
    fn insert(&mut self, id: String, value: T) {
        if let Some(&slot) = self.index.get(&id) {
            self.slots[slot] = Some((id, value));
            return;
        }
        self.index.insert(id.clone(), self.slots.len());
        self.slots.push(Some((id, value)));
    }

    fn remove(&mut self, id: &str) -> Option<T> {
        let slot = self.index.remove(id)?;
        let removed = self.slots[slot].take().map(|(_, v)| v);
        if self.slots.len() > 32 && self.index.len() * 2 < self.slots.len() {
            self.compact();
        }
        removed
    }

    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        self.index = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|(id, _)| (id.clone(), i)))
            .collect();
    }

    fn get(&self, id: &str) -> Option<&T> {
        let slot = *self.index.get(id)?;
        self.slots[slot].as_ref().map(|(_, v)| v)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        let slot = *self.index.get(id)?;
        self.slots[slot].as_mut().map(|(_, v)| v)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|s| s.as_ref().map(|(_, v)| v))
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }
}

/// Mutable catalog of obstacles and connection points for one diagram.
///
/// No validation happens on registration; malformed bounds are stored as-is.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    obstacles: Catalog<Obstacle>,
    points: Catalog<ConnectionPoint>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.insert(obstacle.id.clone(), obstacle);
    }

    pub fn remove_obstacle(&mut self, id: &str) -> Option<Obstacle> {
        self.obstacles.remove(id)
    }

    pub fn register_connection_point(&mut self, point: ConnectionPoint) {
        self.points.insert(point.id.clone(), point);
    }

    pub fn remove_connection_point(&mut self, id: &str) -> Option<ConnectionPoint> {
        self.points.remove(id)
    }

    /// Obstacles in registration order.
    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    /// Connection points in registration order.
    pub fn connection_points(&self) -> impl Iterator<Item = &ConnectionPoint> {
        self.points.iter()
    }

    pub fn obstacle(&self, id: &str) -> Option<&Obstacle> {
        self.obstacles.get(id)
    }

    pub fn connection_point(&self, id: &str) -> Option<&ConnectionPoint> {
        self.points.get(id)
    }

    /// Flip the occupancy flag of a point; returns false if the id is unknown.
    pub fn set_occupied(&mut self, id: &str, occupied: bool) -> bool {
        match self.points.get_mut(id) {
            Some(point) => {
                point.occupied = occupied;
                true
            }
            None => false,
        }
    }

    /// Unoccupied points owned by `node_id`, in registration order.
    pub fn available_connection_points<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = &'a ConnectionPoint> + 'a {
        self.points
            .iter()
            .filter(move |p| p.owner_node_id == node_id && !p.occupied)
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn connection_point_count(&self) -> usize {
        self.points.len()
    }

    /// Drop everything; used when a diagram is (re)loaded.
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.points.clear();
    }
}
