use arena_core::{SurfaceProbe, Vec3};

use crate::{NavGrid, PathFinder, SearchError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavPath {
    pub points: Vec<Vec3>,
}

impl NavPath {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of planar segment lengths.
    pub fn length_xz(&self) -> f32 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_xz(w[1]))
            .sum()
    }
}

pub trait Navigator {
    fn find_path(&mut self, start: Vec3, goal: Vec3) -> Option<NavPath>;
}

/// A grid together with the path finder that searches it.
///
/// Owning both keeps searches serialized and guarantees the grid cannot
/// change while a search borrows it.
#[derive(Debug, Clone)]
pub struct GridNavigator {
    grid: NavGrid,
    finder: PathFinder,
}

impl GridNavigator {
    pub fn new(grid: NavGrid) -> Self {
        Self {
            grid,
            finder: PathFinder::new(),
        }
    }

    pub fn with_diagonals(mut self, enabled: bool) -> Self {
        self.finder.set_moving_in_diagonals(enabled);
        self
    }

    pub fn set_moving_in_diagonals(&mut self, enabled: bool) {
        self.finder.set_moving_in_diagonals(enabled);
    }

    pub fn grid(&self) -> &NavGrid {
        &self.grid
    }

    pub fn finder(&self) -> &PathFinder {
        &self.finder
    }

    pub fn rebuild<P: SurfaceProbe + ?Sized>(&mut self, probe: &P) {
        self.grid.rebuild(probe);
    }

    pub fn refresh_cell<P: SurfaceProbe + ?Sized>(&mut self, probe: &P, row: i32, col: i32) {
        self.grid.refresh_cell(probe, row, col);
    }

    /// Like `find_path`, but reuses `out` and reports why a search failed.
    pub fn find_path_into(
        &mut self,
        start: Vec3,
        goal: Vec3,
        out: &mut NavPath,
    ) -> Result<usize, SearchError> {
        out.points.clear();
        let steps = self.finder.try_resolve(&self.grid, start, goal)?;
        out.points.extend(self.finder.waypoints());
        Ok(steps)
    }
}

impl Navigator for GridNavigator {
    fn find_path(&mut self, start: Vec3, goal: Vec3) -> Option<NavPath> {
        if !self.finder.resolve(&self.grid, start, goal) {
            return None;
        }
        Some(NavPath::new(self.finder.solution()))
    }
}
