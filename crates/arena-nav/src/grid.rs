use arena_core::{Bounds, Layer, LayerMask, NavigableArea, SurfaceProbe, Vec3};
use tracing::{debug, trace};

use crate::{Cell, Direction, GridError, MoveMask, NavGridConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Height reported for cells whose surface is unknown (holes, out of range).
pub const UNKNOWN_HEIGHT: f32 = 10_000.0;

const SURFACE_LAYERS: LayerMask =
    LayerMask(LayerMask::FLOOR.0 | LayerMask::PROPS.0 | LayerMask::DOORS.0);

/// Props are obstacles unless the `climb-props` feature turns them into
/// ordinary (slope-limited) surfaces.
const PROPS_BLOCK: bool = !cfg!(feature = "climb-props");

/// Regular grid of cells laid over a rectangular world region.
///
/// Rows run along +X and cols along +Z. Cell `(row, col)` is centered at
/// `(min.x + w * (row + 0.5), min.z + h * (col + 0.5))` whatever its
/// obstacle state.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavGrid {
    config: NavGridConfig,
    bounds: Bounds,
    rows: usize,
    cols: usize,
    max_distance_to_goal: f32,
    /// Row-major: `cells[row * cols + col]`.
    cells: Vec<Cell>,
    /// What each cell's probe hit first; `None` means nothing (a hole).
    surfaces: Vec<Option<Layer>>,
}

impl NavGrid {
    /// Lay a grid over `bounds` and probe every cell.
    ///
    /// This sweeps all `rows * cols` cells with up to two probes each. Run it
    /// on level load or when geometry changes, not per frame.
    pub fn build<P>(config: NavGridConfig, bounds: Bounds, probe: &P) -> Result<Self, GridError>
    where
        P: SurfaceProbe + ?Sized,
    {
        config.validate()?;

        let width = bounds.width();
        let depth = bounds.depth();
        if !(width.is_finite() && depth.is_finite()) {
            return Err(GridError::NonFiniteRegion { width, depth });
        }
        if !(width > 0.0 && depth > 0.0) {
            return Err(GridError::EmptyRegion { width, depth });
        }

        // Rows and cols are addressed as i32 everywhere else.
        let rows_f = (width / config.cell_width).ceil();
        let cols_f = (depth / config.cell_height).ceil();
        let too_many = GridError::TooManyCells {
            rows: rows_f,
            cols: cols_f,
        };
        if !(rows_f < i32::MAX as f32 && cols_f < i32::MAX as f32) {
            return Err(too_many);
        }
        let rows = rows_f as usize;
        let cols = cols_f as usize;
        rows.checked_mul(cols).ok_or(too_many)?;
        let max_distance_to_goal =
            (config.cell_width * config.cell_width + config.cell_height * config.cell_height).sqrt()
                / 2.0;

        let mut grid = Self {
            config,
            bounds,
            rows,
            cols,
            max_distance_to_goal,
            cells: Vec::new(),
            surfaces: Vec::new(),
        };
        grid.rebuild(probe);
        Ok(grid)
    }

    /// Build over the area's own bounds.
    pub fn from_area<A>(config: NavGridConfig, area: &A) -> Result<Self, GridError>
    where
        A: SurfaceProbe + NavigableArea,
    {
        Self::build(config, area.bounds(), area)
    }

    /// Recreate every cell and recompute connectivity from fresh probes.
    pub fn rebuild<P: SurfaceProbe + ?Sized>(&mut self, probe: &P) {
        self.create_cells();
        for idx in 0..self.cells.len() {
            self.probe_cell(probe, idx);
        }
        self.compute_connectivity();

        debug!(
            rows = self.rows,
            cols = self.cols,
            obstacles = self.obstacle_count(),
            "nav grid rebuilt"
        );
    }

    fn create_cells(&mut self) {
        let count = self.rows * self.cols;
        self.cells.clear();
        self.cells.reserve(count);
        self.surfaces.clear();
        self.surfaces.resize(count, None);

        for row in 0..self.rows {
            for col in 0..self.cols {
                let center = self.cell_center(row, col).with_y(self.bounds.min.y);
                self.cells.push(Cell::new(center, row, col));
            }
        }
    }

    fn probe_cell<P: SurfaceProbe + ?Sized>(&mut self, probe: &P, idx: usize) {
        let probe_y = self.bounds.max.y + self.config.probe_height;
        let length = self.config.probe_length;
        let cell = &mut self.cells[idx];
        let origin = cell.position.with_y(probe_y);

        let Some(hit) = probe.cast_down(origin, length, SURFACE_LAYERS) else {
            cell.position.y = self.bounds.min.y;
            cell.moves.clear();
            cell.occupant = None;
            cell.tile = None;
            cell.floor_height = None;
            self.surfaces[idx] = None;
            return;
        };

        cell.position.y = hit.point.y;
        cell.occupant = hit.object;
        self.surfaces[idx] = Some(hit.layer);

        if hit.layer == Layer::Floor {
            cell.moves.clear();
            cell.tile = hit.object;
            cell.floor_height = Some(hit.point.y);
            return;
        }

        if hit.layer == Layer::Prop {
            cell.moves.set_obstacle();
        } else {
            cell.moves.clear();
        }

        // Whatever stands here, find the floor tile underneath it.
        let floor = probe.cast_down(cell.position, length, LayerMask::FLOOR);
        cell.tile = floor.and_then(|f| f.object);
        cell.floor_height = floor.map(|f| f.point.y);
    }

    /// Recompute the direction mask of every walkable cell.
    ///
    /// A bit is stored on the *source* cell only: `from -> to` is allowed when
    /// both cells have a surface, neither is an obstacle, and their heights
    /// differ by less than `max_slope`.
    pub fn compute_connectivity(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let idx = row * self.cols + col;
                if PROPS_BLOCK && self.cells[idx].is_obstacle() {
                    continue;
                }

                let mut moves = MoveMask::EMPTY;
                for dir in Direction::ALL {
                    if let Some(n) = self.neighbor_index(row, col, dir) {
                        moves.set(dir, self.can_walk(idx, n));
                    }
                }
                self.cells[idx].moves = moves;
            }
        }
    }

    fn can_walk(&self, from: usize, to: usize) -> bool {
        if self.surfaces[from].is_none() || self.surfaces[to].is_none() {
            return false;
        }
        let (a, b) = (&self.cells[from], &self.cells[to]);
        if PROPS_BLOCK && (a.is_obstacle() || b.is_obstacle()) {
            return false;
        }
        (a.position.y - b.position.y).abs() < self.config.max_slope
    }

    /// Recompute one cell's mask and the reciprocal bit on each neighbour.
    ///
    /// Used after a dynamic change (a door opening or closing) so that the
    /// grid stays consistent without a full rebuild. Out-of-range cells are
    /// ignored.
    pub fn update_neighbor_connectivity(&mut self, row: i32, col: i32) {
        let Some(idx) = self.index(row, col) else {
            return;
        };
        let (row, col) = (row as usize, col as usize);
        let center_fixed = PROPS_BLOCK && self.cells[idx].is_obstacle();

        for dir in Direction::ALL {
            match self.neighbor_index(row, col, dir) {
                Some(n) => {
                    let there = self.can_walk(idx, n);
                    let back = self.can_walk(n, idx);
                    if !center_fixed {
                        self.cells[idx].moves.set(dir, there);
                    }
                    if !(PROPS_BLOCK && self.cells[n].is_obstacle()) {
                        self.cells[n].moves.set(dir.opposite(), back);
                    }
                }
                None if !center_fixed => self.cells[idx].moves.remove(dir),
                None => {}
            }
        }

        trace!(row, col, moves = self.cells[idx].moves.bits(), "cell connectivity updated");
    }

    /// Re-probe a single cell and patch connectivity around it.
    pub fn refresh_cell<P: SurfaceProbe + ?Sized>(&mut self, probe: &P, row: i32, col: i32) {
        let Some(idx) = self.index(row, col) else {
            return;
        };
        self.probe_cell(probe, idx);
        // Climbable props carry no obstacle flag once connectivity is known.
        if !PROPS_BLOCK || !self.cells[idx].is_obstacle() {
            self.cells[idx].moves.clear();
        }
        self.update_neighbor_connectivity(row, col);
    }

    pub fn config(&self) -> &NavGridConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_width(&self) -> f32 {
        self.config.cell_width
    }

    pub fn cell_height(&self) -> f32 {
        self.config.cell_height
    }

    /// Half the cell diagonal: the farthest any point can be from the center
    /// of the cell containing it.
    pub fn max_distance_to_goal(&self) -> f32 {
        self.max_distance_to_goal
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, row: i32, col: i32) -> Option<&Cell> {
        self.index(row, col).map(|idx| &self.cells[idx])
    }

    /// Layer the cell's probe hit, or `None` for a hole / out of range.
    pub fn surface(&self, row: i32, col: i32) -> Option<Layer> {
        self.index(row, col).and_then(|idx| self.surfaces[idx])
    }

    pub fn set_cell_cost(&mut self, row: i32, col: i32, cost: f32) -> bool {
        match self.index(row, col) {
            Some(idx) => {
                self.cells[idx].cost = cost;
                true
            }
            None => false,
        }
    }

    pub fn obstacle_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_obstacle()).count()
    }

    pub fn is_valid_row(&self, row: i32) -> bool {
        row >= 0 && (row as usize) < self.rows
    }

    pub fn is_valid_col(&self, col: i32) -> bool {
        col >= 0 && (col as usize) < self.cols
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if self.is_valid_row(row) && self.is_valid_col(col) {
            Some(row as usize * self.cols + col as usize)
        } else {
            None
        }
    }

    fn neighbor_index(&self, row: usize, col: usize, dir: Direction) -> Option<usize> {
        let (dr, dc) = dir.offset();
        self.index(row as i32 + dr, col as i32 + dc)
    }

    fn cell_center(&self, row: usize, col: usize) -> Vec3 {
        self.world_pos_at_row_col(row as i32, col as i32)
    }

    /// Row/col containing `pos`, by floor division. May be out of range;
    /// non-finite coordinates map to -1.
    pub fn row_col_at(&self, pos: Vec3) -> (i32, i32) {
        fn axis(v: f32, min: f32, size: f32) -> i32 {
            let i = ((v - min) / size).floor();
            if i.is_finite() {
                i as i32
            } else {
                -1
            }
        }

        (
            axis(pos.x, self.bounds.min.x, self.config.cell_width),
            axis(pos.z, self.bounds.min.z, self.config.cell_height),
        )
    }

    pub fn cell_at(&self, pos: Vec3) -> Option<&Cell> {
        let (row, col) = self.row_col_at(pos);
        self.cell(row, col)
    }

    /// `true` for obstacles and for anything out of range.
    pub fn is_obstacle(&self, row: i32, col: i32) -> bool {
        self.cell(row, col).map_or(true, Cell::is_obstacle)
    }

    pub fn is_obstacle_at(&self, pos: Vec3) -> bool {
        let (row, col) = self.row_col_at(pos);
        self.is_obstacle(row, col)
    }

    /// Resolved top height of the obstacle at `(row, col)`.
    ///
    /// `None` when the cell is not an obstacle; out-of-range cells count as
    /// obstacles of `UNKNOWN_HEIGHT`.
    pub fn obstacle_height(&self, row: i32, col: i32) -> Option<f32> {
        match self.cell(row, col) {
            Some(cell) if cell.is_obstacle() => Some(cell.position.y),
            Some(_) => None,
            None => Some(UNKNOWN_HEIGHT),
        }
    }

    /// Floor height under the cell, ignoring whatever stands on it.
    pub fn floor_height(&self, row: i32, col: i32) -> f32 {
        self.cell(row, col)
            .and_then(|c| c.floor_height)
            .unwrap_or(UNKNOWN_HEIGHT)
    }

    /// Height of the top surface of the cell, obstacles included.
    pub fn height(&self, row: i32, col: i32) -> f32 {
        match self.index(row, col) {
            Some(idx) if self.surfaces[idx].is_some() => self.cells[idx].position.y,
            _ => UNKNOWN_HEIGHT,
        }
    }

    /// Movement cost of the cell under `pos`; `f32::MAX` out of range.
    pub fn block_cost(&self, pos: Vec3) -> f32 {
        self.cell_at(pos).map_or(f32::MAX, |c| c.cost)
    }

    /// Planar center of `(row, col)` at height 0.
    ///
    /// Computed from the origin alone, so it is defined for any row/col.
    pub fn world_pos_at_row_col(&self, row: i32, col: i32) -> Vec3 {
        Vec3::new(
            self.bounds.min.x + self.config.cell_width * (row as f32 + 0.5),
            0.0,
            self.bounds.min.z + self.config.cell_height * (col as f32 + 0.5),
        )
    }

    /// Round `pos` to the nearest cell center on each planar axis.
    ///
    /// Each coordinate moves to the closer of the two cell centers bracketing
    /// it; exact midpoints round away from the origin. `y` is kept.
    pub fn snap_to_cell_center(&self, pos: Vec3) -> Vec3 {
        fn snap(v: f32, min: f32, size: f32) -> f32 {
            let k = ((v - min) / size - 0.5).round();
            min + size * (k + 0.5)
        }

        Vec3::new(
            snap(pos.x, self.bounds.min.x, self.config.cell_width),
            pos.y,
            snap(pos.z, self.bounds.min.z, self.config.cell_height),
        )
    }

    /// Center of the neighbour of the cell under `from` in direction `dir`.
    ///
    /// Returns `Some` only when that neighbour exists, is not an obstacle,
    /// and the *source* cell's mask allows the move. This is the only
    /// movement rule the path finder trusts.
    pub fn get_move(&self, dir: Direction, from: Vec3) -> Option<Vec3> {
        let (row, col) = self.row_col_at(from);
        let source = self.cell(row, col)?;
        if !source.moves.contains(dir) {
            return None;
        }

        let (dr, dc) = dir.offset();
        let target = self.cell(row + dr, col + dc)?;
        if target.is_obstacle() {
            return None;
        }
        Some(target.position)
    }
}
