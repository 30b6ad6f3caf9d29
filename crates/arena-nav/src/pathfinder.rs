use arena_core::Vec3;
use thiserror::Error;
use tracing::{debug, error, trace};

use crate::pool::{ClosedStack, NodeId, NodePool, OpenList, SearchNode};
use crate::{Direction, NavGrid};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    /// More distinct positions were touched than the pool holds. The pool is
    /// sized at twice the cell count, so this points at a bug.
    #[error("search node pool exhausted ({capacity} nodes)")]
    PoolExhausted { capacity: usize },

    /// Every reachable cell was expanded without getting near the goal.
    #[error("goal is unreachable")]
    Blocked,
}

/// A* over a `NavGrid` using preallocated working memory.
///
/// The pool, open list and closed stack are sized at `rows * cols * 2` on the
/// first search (or when a larger grid shows up) and only rewound afterwards,
/// so repeated searches on one grid do not allocate.
#[derive(Debug, Clone, Default)]
pub struct PathFinder {
    moving_in_diagonals: bool,
    pool: NodePool,
    open: OpenList,
    closed: ClosedStack,
    solution: Option<NodeId>,
    cursor: Option<NodeId>,
    solution_len: usize,
    reallocations: usize,
}

impl PathFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagonals(mut self, enabled: bool) -> Self {
        self.moving_in_diagonals = enabled;
        self
    }

    pub fn moving_in_diagonals(&self) -> bool {
        self.moving_in_diagonals
    }

    pub fn set_moving_in_diagonals(&mut self, enabled: bool) {
        self.moving_in_diagonals = enabled;
    }

    pub fn pool_capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// How many times the working memory had to grow.
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    /// Search for a path; failures are logged and reported as `false`.
    pub fn resolve(&mut self, grid: &NavGrid, start: Vec3, goal: Vec3) -> bool {
        self.try_resolve(grid, start, goal).is_ok()
    }

    /// Search for a path and return the number of waypoints found.
    pub fn try_resolve(
        &mut self,
        grid: &NavGrid,
        start: Vec3,
        goal: Vec3,
    ) -> Result<usize, SearchError> {
        self.prepare(grid.rows() * grid.cols() * 2);

        let result = self.search(grid, start, goal);
        match &result {
            Ok(steps) => trace!(
                steps,
                nodes = self.pool.used(),
                open = self.open.len(),
                "path resolved"
            ),
            Err(SearchError::Blocked) => debug!(
                ?start,
                ?goal,
                expanded = self.closed.len(),
                "no path to goal"
            ),
            Err(err) => error!(%err, ?start, ?goal, "path search aborted"),
        }
        result
    }

    fn prepare(&mut self, count: usize) {
        if self.pool.capacity() < count {
            self.pool = NodePool::with_capacity(count);
            self.open = OpenList::with_capacity(count);
            self.closed = ClosedStack::with_capacity(count);
            self.reallocations += 1;
            debug!(capacity = count, "path finder pool reallocated");
        } else {
            self.pool.rewind();
            self.open.clear();
            self.closed.clear();
        }

        self.solution = None;
        self.cursor = None;
        self.solution_len = 0;
    }

    fn search(&mut self, grid: &NavGrid, start: Vec3, goal: Vec3) -> Result<usize, SearchError> {
        let exhausted = SearchError::PoolExhausted {
            capacity: self.pool.capacity(),
        };
        let tolerance = grid.max_distance_to_goal();

        let mut current = self
            .pool
            .alloc(SearchNode {
                position: start,
                cost: 0.0,
                prev: None,
                next: None,
            })
            .ok_or(exhausted)?;

        if grid.row_col_at(start) == grid.row_col_at(goal) || start.distance_xz(goal) <= tolerance {
            return Ok(self.link_solution(current));
        }

        let moves: &[Direction] = if self.moving_in_diagonals {
            &Direction::ALL
        } else {
            &Direction::ORTHOGONAL
        };

        // Accumulated block cost along the expansion sequence.
        let mut g = 0.0;
        loop {
            let from = self.pool.get(current).position;

            for &dir in moves {
                let Some(pos) = grid.get_move(dir, from) else {
                    continue;
                };
                if self.closed.contains(&self.pool, pos) || grid.is_obstacle_at(pos) {
                    continue;
                }

                let cost = g + self.calculate_fn(pos, goal);
                let id = match self.open.find(&self.pool, pos) {
                    Some(id) => {
                        let node = self.pool.get_mut(id);
                        if node.cost > cost {
                            node.cost = cost;
                            node.prev = Some(current);
                        }
                        id
                    }
                    None => {
                        let id = self
                            .pool
                            .alloc(SearchNode {
                                position: pos,
                                cost,
                                prev: Some(current),
                                next: None,
                            })
                            .ok_or(exhausted)?;
                        self.open.push(id);
                        id
                    }
                };

                // Greedy: the first candidate close enough to the goal ends it.
                if pos.distance_xz(goal) <= tolerance {
                    self.pool.get_mut(id).prev = Some(current);
                    return Ok(self.link_solution(id));
                }
            }

            let best = self
                .open
                .take_cheapest(&self.pool)
                .ok_or(SearchError::Blocked)?;
            if !self.closed.push(current) {
                return Err(exhausted);
            }
            g += grid.block_cost(self.pool.get(best).position);
            current = best;
        }
    }

    /// Walk predecessor links back from `last`, wiring successor links so the
    /// solution can be read front to back.
    fn link_solution(&mut self, last: NodeId) -> usize {
        let mut len = 1;
        let mut cur = last;
        self.pool.get_mut(cur).next = None;

        while let Some(prev) = self.pool.get(cur).prev {
            self.pool.get_mut(prev).next = Some(cur);
            cur = prev;
            len += 1;
        }

        self.solution = Some(cur);
        self.solution_len = len;
        len
    }

    /// Number of waypoints in the last solution (0 after a failed search).
    pub fn solution_step_count(&self) -> usize {
        self.solution_len
    }

    /// Rewind the solution cursor and return the first waypoint.
    pub fn first_solution_pos(&mut self) -> Option<Vec3> {
        self.cursor = self.solution;
        self.next_solution_pos()
    }

    pub fn next_solution_pos(&mut self) -> Option<Vec3> {
        let node = self.pool.get(self.cursor?);
        self.cursor = node.next;
        Some(node.position)
    }

    /// Waypoints of the last solution, start first. Independent of the cursor.
    pub fn waypoints(&self) -> Waypoints<'_> {
        Waypoints {
            pool: &self.pool,
            cursor: self.solution,
            remaining: self.solution_len,
        }
    }

    pub fn solution(&self) -> Vec<Vec3> {
        self.waypoints().collect()
    }

    /// Heuristic over the XZ plane: Manhattan for 4-way moves, Euclidean when
    /// diagonals are allowed.
    pub fn calculate_fn(&self, p1: Vec3, p2: Vec3) -> f32 {
        let dx = p2.x - p1.x;
        let dz = p2.z - p1.z;
        if self.moving_in_diagonals {
            (dx * dx + dz * dz).sqrt()
        } else {
            dx.abs() + dz.abs()
        }
    }
}

/// Iterator over a `PathFinder` solution.
#[derive(Debug, Clone)]
pub struct Waypoints<'a> {
    pool: &'a NodePool,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl Iterator for Waypoints<'_> {
    type Item = Vec3;

    fn next(&mut self) -> Option<Vec3> {
        let node = self.pool.get(self.cursor?);
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(node.position)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Waypoints<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NavGridConfig;
    use arena_core::TileLayout;

    fn corridor(len: usize) -> NavGrid {
        let layout = TileLayout::flat(len, 1, 10.0, 0.0).expect("layout");
        NavGrid::from_area(NavGridConfig::new(10.0, 10.0), &layout).expect("grid")
    }

    #[test]
    fn heuristic_switches_with_diagonals() {
        let a = Vec3::new(0.0, 50.0, 0.0);
        let b = Vec3::new(3.0, -7.0, 4.0);

        let finder = PathFinder::new();
        assert_eq!(finder.calculate_fn(a, b), 7.0);

        let finder = PathFinder::new().with_diagonals(true);
        assert_eq!(finder.calculate_fn(a, b), 5.0);
    }

    #[test]
    fn undersized_pool_reports_exhaustion() {
        let grid = corridor(10);
        let mut finder = PathFinder::new();
        finder.prepare(3);

        let result = finder.search(&grid, Vec3::new(5.0, 0.0, 5.0), Vec3::new(95.0, 0.0, 5.0));
        assert_eq!(result, Err(SearchError::PoolExhausted { capacity: 3 }));
        assert_eq!(finder.solution_step_count(), 0);
    }

    #[test]
    fn impassable_cell_blocks_the_corridor() {
        let mut grid = corridor(5);
        assert!(grid.set_cell_cost(1, 0, f32::INFINITY));

        let mut finder = PathFinder::new();
        let result = finder.try_resolve(&grid, Vec3::new(5.0, 0.0, 5.0), Vec3::new(45.0, 0.0, 5.0));
        assert_eq!(result, Err(SearchError::Blocked));
        assert!(finder.solution().is_empty());
    }

    #[test]
    fn try_resolve_sizes_the_pool_from_the_grid() {
        let grid = corridor(10);
        let mut finder = PathFinder::new();
        let steps = finder
            .try_resolve(&grid, Vec3::new(5.0, 0.0, 5.0), Vec3::new(95.0, 0.0, 5.0))
            .expect("path");

        assert_eq!(steps, 10);
        assert_eq!(finder.pool_capacity(), 20);
        assert_eq!(finder.waypoints().len(), 10);
    }

    #[test]
    fn failed_search_clears_previous_solution() {
        let grid = corridor(3);
        let mut finder = PathFinder::new();
        assert!(finder.resolve(&grid, Vec3::new(5.0, 0.0, 5.0), Vec3::new(25.0, 0.0, 5.0)));
        assert_eq!(finder.solution_step_count(), 3);

        let outside = Vec3::new(500.0, 0.0, 5.0);
        assert!(!finder.resolve(&grid, Vec3::new(5.0, 0.0, 5.0), outside));
        assert_eq!(finder.solution(), Vec::<Vec3>::new());
        assert_eq!(finder.first_solution_pos(), None);
    }
}
