//! Grid-restricted A* search.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::geometry::Point;

use super::clearance::ObstacleField;

/// Extra cells around the obstacle/endpoint extent the search may use.
const BOUNDS_PADDING: i64 = 2;

/// Cardinal moves first; the diagonals are only used when enabled.
const MOVES: [(i64, i64); 8] = [
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

type Cell = (i64, i64);

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Vec<Point>),
    /// Every reachable cell was expanded without reaching the goal.
    Exhausted,
    /// Expansion cap hit first.
    LimitReached,
}

/// Open-set entry: lowest `f` first, then first-inserted first.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    seq: u64,
    cell: Cell,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

/// Inclusive cell window the search stays inside.
#[derive(Debug, Clone, Copy)]
struct CellBounds {
    min_x: i64,
    min_y: i64,
    max_x: i64,
    max_y: i64,
}

impl CellBounds {
    fn contains(&self, (x, y): Cell) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Search parameters.
pub struct GridSearch<'f, 'a> {
    pub field: &'f ObstacleField<'a>,
    pub grid_size: f64,
    pub diagonal: bool,
    pub max_expansions: usize,
}

impl GridSearch<'_, '_> {
    fn cell_of(&self, p: &Point) -> Cell {
        (
            (p.x / self.grid_size).round() as i64,
            (p.y / self.grid_size).round() as i64,
        )
    }

    fn point_of(&self, (x, y): Cell) -> Point {
        Point::new(x as f64 * self.grid_size, y as f64 * self.grid_size)
    }

    fn bounds(&self, start: &Point, goal: &Point) -> CellBounds {
        let g = self.grid_size;
        match self.field.extent(&[*start, *goal]) {
            Some(r) => CellBounds {
                min_x: ((r.x / g).floor() as i64).saturating_sub(BOUNDS_PADDING),
                min_y: ((r.y / g).floor() as i64).saturating_sub(BOUNDS_PADDING),
                max_x: ((r.right() / g).ceil() as i64).saturating_add(BOUNDS_PADDING),
                max_y: ((r.bottom() / g).ceil() as i64).saturating_add(BOUNDS_PADDING),
            },
            None => {
                let (sx, sy) = self.cell_of(start);
                CellBounds {
                    min_x: sx,
                    min_y: sy,
                    max_x: sx,
                    max_y: sy,
                }
            }
        }
    }

    /// Find a cell path from `start` to `goal`; both must be grid-snapped.
    ///
    /// Steps cost their Euclidean length; the heuristic is Manhattan
    /// distance. A cell is enterable when it lies outside every obstacle and
    /// the step onto it crosses none.
    pub fn run(&self, start: Point, goal: Point) -> SearchOutcome {
        let bounds = self.bounds(&start, &goal);
        let start_cell = self.cell_of(&start);
        let moves = if self.diagonal { &MOVES[..] } else { &MOVES[..4] };

        let mut open = BinaryHeap::new();
        let mut g_score: HashMap<Cell, f64> = HashMap::new();
        let mut parent: HashMap<Cell, Cell> = HashMap::new();
        let mut closed: HashSet<Cell> = HashSet::new();
        let mut seq = 0u64;
        let mut expansions = 0usize;

        g_score.insert(start_cell, 0.0);
        open.push(OpenEntry {
            f: start.manhattan(&goal),
            seq,
            cell: start_cell,
        });

        while let Some(OpenEntry { cell, .. }) = open.pop() {
            if !closed.insert(cell) {
                continue;
            }
            expansions += 1;
            if expansions > self.max_expansions {
                return SearchOutcome::LimitReached;
            }

            let current = self.point_of(cell);
            if current.distance(&goal) < self.grid_size {
                return SearchOutcome::Found(self.reconstruct(cell, &parent, start, goal));
            }

            let cost = g_score.get(&cell).copied().unwrap_or(f64::INFINITY);
            for &(dx, dy) in moves {
                let (Some(nx), Some(ny)) = (cell.0.checked_add(dx), cell.1.checked_add(dy)) else {
                    continue;
                };
                let next = (nx, ny);
                if !bounds.contains(next) || closed.contains(&next) {
                    continue;
                }
                let next_point = self.point_of(next);
                if self.field.contains(&next_point) || !self.field.is_clear(&current, &next_point) {
                    continue;
                }
                let tentative = cost + current.distance(&next_point);
                if tentative < g_score.get(&next).copied().unwrap_or(f64::INFINITY) {
                    g_score.insert(next, tentative);
                    parent.insert(next, cell);
                    seq += 1;
                    open.push(OpenEntry {
                        f: tentative + next_point.manhattan(&goal),
                        seq,
                        cell: next,
                    });
                }
            }
        }

        SearchOutcome::Exhausted
    }

    fn reconstruct(
        &self,
        end: Cell,
        parent: &HashMap<Cell, Cell>,
        start: Point,
        goal: Point,
    ) -> Vec<Point> {
        let mut cells = vec![end];
        let mut cur = end;
        while let Some(&prev) = parent.get(&cur) {
            cells.push(prev);
            cur = prev;
        }
        cells.reverse();

        let mut path: Vec<Point> = cells.into_iter().map(|c| self.point_of(c)).collect();
        path[0] = start;
        let last = path.len() - 1;
        if last > 0 && path[last].distance(&goal) <= 1.0 {
            path[last] = goal;
        } else {
            path.push(goal);
        }
        path
    }
}
