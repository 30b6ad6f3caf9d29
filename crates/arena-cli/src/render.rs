//! Text rendering of grids and paths.

use std::collections::HashSet;

use arena_core::{Layer, Vec3};
use arena_nav::NavGrid;

/// One line per column of cells (Z), one character per row (X), so the output
/// reads like the layout it was built from.
///
/// `#` obstacle, ` ` hole, `D`/`d` closed/open door, `x` walkable surface with
/// no exits, `.` walkable, `*` path waypoint.
pub fn render_grid(grid: &NavGrid, path: &[Vec3]) -> String {
    let on_path: HashSet<(i32, i32)> = path.iter().map(|p| grid.row_col_at(*p)).collect();

    let mut out = String::with_capacity((grid.rows() + 1) * grid.cols());
    for col in 0..grid.cols() as i32 {
        for row in 0..grid.rows() as i32 {
            out.push(glyph(grid, row, col, on_path.contains(&(row, col))));
        }
        out.push('\n');
    }
    out
}

fn glyph(grid: &NavGrid, row: i32, col: i32, on_path: bool) -> char {
    let Some(cell) = grid.cell(row, col) else {
        return '?';
    };
    if on_path {
        return '*';
    }
    if cell.is_obstacle() {
        return '#';
    }
    let stuck = cell.moves.iter().next().is_none();
    match grid.surface(row, col) {
        None => ' ',
        Some(Layer::Door) if stuck => 'D',
        Some(Layer::Door) => 'd',
        Some(_) if stuck => 'x',
        Some(_) => '.',
    }
}

pub fn summary(grid: &NavGrid) -> String {
    let walkable = grid
        .cells()
        .iter()
        .filter(|c| !c.is_obstacle() && c.moves.iter().next().is_some())
        .count();
    format!(
        "{} x {} cells ({} x {} units each), {} obstacles, {} walkable",
        grid.rows(),
        grid.cols(),
        grid.cell_width(),
        grid.cell_height(),
        grid.obstacle_count(),
        walkable,
    )
}
