use arena_core::{AsciiPalette, TileLayout, Vec3};
use arena_nav::{NavGrid, NavGridConfig, PathFinder, SearchError};

fn flat(width: usize, depth: usize) -> NavGrid {
    let layout = TileLayout::flat(width, depth, 10.0, 0.0).expect("layout");
    NavGrid::from_area(NavGridConfig::new(10.0, 10.0), &layout).expect("grid")
}

fn ascii(text: &str) -> NavGrid {
    let layout = TileLayout::from_ascii(text, 10.0, AsciiPalette::default()).expect("layout");
    NavGrid::from_area(NavGridConfig::new(10.0, 10.0), &layout).expect("grid")
}

/// Waypoints after the start are unblocked cell centers, each a grid
/// neighbour of the one before.
fn assert_walkable(grid: &NavGrid, path: &[Vec3], diagonals: bool) {
    let max_step = if diagonals { 10.0 * 2f32.sqrt() } else { 10.0 };
    for pair in path[1..].windows(2) {
        let step = pair[0].distance_xz(pair[1]);
        assert!(step > 0.0 && step <= max_step + 1e-3, "{:?} -> {:?}", pair[0], pair[1]);
    }
    for point in &path[1..] {
        assert!(!grid.is_obstacle_at(*point), "{point:?}");
        assert_eq!(grid.snap_to_cell_center(*point), *point);
    }
}

#[test]
fn straight_path_on_open_grid() {
    let grid = flat(10, 10);
    let mut finder = PathFinder::new();
    let start = Vec3::new(5.0, 0.0, 5.0);
    let goal = Vec3::new(95.0, 0.0, 5.0);

    assert!(finder.resolve(&grid, start, goal));
    let path = finder.solution();

    // One waypoint per cell crossed, plus the start.
    assert_eq!(path.len(), 10);
    assert_eq!(finder.solution_step_count(), 10);
    assert_eq!(path[0], start);
    for (i, point) in path.iter().enumerate() {
        assert_eq!(*point, Vec3::new(5.0 + 10.0 * i as f32, 0.0, 5.0));
    }
}

#[test]
fn path_ends_within_tolerance_of_goal() {
    let grid = flat(10, 10);
    let mut finder = PathFinder::new();
    let start = Vec3::new(12.0, 0.0, 7.0);
    let goal = Vec3::new(71.0, 0.0, 88.0);

    assert!(finder.resolve(&grid, start, goal));
    let path = finder.solution();
    assert_eq!(path.first().copied(), Some(start));
    let last = path.last().copied().expect("waypoint");
    assert!(last.distance_xz(goal) <= grid.max_distance_to_goal());
    assert_walkable(&grid, &path, false);
}

#[test]
fn four_way_search_takes_manhattan_steps() {
    let grid = flat(10, 10);
    let mut finder = PathFinder::new();
    let start = Vec3::new(5.0, 0.0, 5.0);
    let goal = Vec3::new(95.0, 0.0, 95.0);

    assert_eq!(finder.try_resolve(&grid, start, goal), Ok(19));
    assert_walkable(&grid, &finder.solution(), false);
}

#[test]
fn diagonal_search_cuts_corners() {
    let grid = flat(10, 10);
    let mut finder = PathFinder::new().with_diagonals(true);
    let start = Vec3::new(5.0, 0.0, 5.0);
    let goal = Vec3::new(95.0, 0.0, 95.0);

    assert_eq!(finder.try_resolve(&grid, start, goal), Ok(10));
    let path = finder.solution();
    assert_walkable(&grid, &path, true);
    for (i, point) in path.iter().enumerate() {
        let c = 5.0 + 10.0 * i as f32;
        assert_eq!(*point, Vec3::new(c, 0.0, c));
    }
}

#[test]
fn routes_around_a_blocked_lane() {
    // Three lanes along X; the middle lane is blocked halfway.
    let grid = ascii(
        "\
..........
.....#....
..........",
    );
    let start = Vec3::new(5.0, 0.0, 15.0);
    let goal = Vec3::new(95.0, 0.0, 15.0);

    for diagonals in [false, true] {
        let mut finder = PathFinder::new().with_diagonals(diagonals);
        assert!(finder.resolve(&grid, start, goal), "diagonals: {diagonals}");
        let path = finder.solution();
        assert_walkable(&grid, &path, diagonals);
        assert!(!path.contains(&Vec3::new(55.0, 0.0, 15.0)));
        assert!(path.last().expect("waypoint").distance_xz(goal) <= grid.max_distance_to_goal());
    }
}

#[test]
fn single_lane_blocked_fails() {
    let grid = ascii(".....#....");
    let mut finder = PathFinder::new().with_diagonals(true);
    let start = Vec3::new(5.0, 0.0, 5.0);
    let goal = Vec3::new(95.0, 0.0, 5.0);

    assert_eq!(finder.try_resolve(&grid, start, goal), Err(SearchError::Blocked));
    assert!(!finder.resolve(&grid, start, goal));
    assert_eq!(finder.solution_step_count(), 0);
    assert!(finder.solution().is_empty());
}

#[test]
fn ledges_block_like_walls() {
    let grid = ascii(
        "\
..^..
..^..
..^..",
    );
    let mut finder = PathFinder::new();
    assert!(!finder.resolve(&grid, Vec3::new(5.0, 0.0, 5.0), Vec3::new(45.0, 0.0, 5.0)));
    // Walking along the ledge top is fine.
    assert!(finder.resolve(&grid, Vec3::new(25.0, 20.0, 5.0), Vec3::new(25.0, 20.0, 25.0)));
}

#[test]
fn same_cell_is_a_single_waypoint() {
    let grid = flat(10, 10);
    let mut finder = PathFinder::new();
    let start = Vec3::new(12.0, 0.0, 13.0);

    assert_eq!(finder.try_resolve(&grid, start, Vec3::new(17.0, 0.0, 18.0)), Ok(1));
    assert_eq!(finder.solution(), vec![start]);

    // Different cells, but already within reach of the goal.
    let start = Vec3::new(9.0, 0.0, 5.0);
    assert_eq!(finder.try_resolve(&grid, start, Vec3::new(11.0, 0.0, 5.0)), Ok(1));
    assert_eq!(finder.solution(), vec![start]);
}

#[test]
fn resolves_are_idempotent() {
    let grid = ascii(
        "\
..........
..####....
.....#....
.....#.#..
.......#..",
    );
    let mut finder = PathFinder::new();
    let start = Vec3::new(5.0, 0.0, 5.0);
    let goal = Vec3::new(95.0, 0.0, 45.0);

    assert!(finder.resolve(&grid, start, goal));
    let first = finder.solution();

    assert!(finder.resolve(&grid, Vec3::new(95.0, 0.0, 5.0), Vec3::new(5.0, 0.0, 45.0)));
    assert!(finder.resolve(&grid, start, goal));
    assert_eq!(finder.solution(), first);

    let mut other = PathFinder::new();
    assert!(other.resolve(&grid, start, goal));
    assert_eq!(other.solution(), first);
}

#[test]
fn pool_is_reused_on_fixed_grid() {
    let grid = flat(10, 10);
    let mut finder = PathFinder::new();
    assert_eq!(finder.pool_capacity(), 0);

    for i in 0..20 {
        let goal = Vec3::new(5.0 + (i % 10) as f32 * 10.0, 0.0, 95.0);
        assert!(finder.resolve(&grid, Vec3::new(5.0, 0.0, 5.0), goal));
    }
    assert_eq!(finder.reallocations(), 1);
    assert_eq!(finder.pool_capacity(), 200);
}

#[test]
fn pool_grows_only_for_larger_grids() {
    let small = flat(5, 5);
    let large = flat(10, 10);
    let mut finder = PathFinder::new();
    let start = Vec3::new(5.0, 0.0, 5.0);

    assert!(finder.resolve(&small, start, Vec3::new(45.0, 0.0, 45.0)));
    assert_eq!(finder.pool_capacity(), 50);
    assert!(finder.resolve(&large, start, Vec3::new(95.0, 0.0, 95.0)));
    assert_eq!(finder.pool_capacity(), 200);
    assert!(finder.resolve(&small, start, Vec3::new(45.0, 0.0, 45.0)));
    assert_eq!(finder.pool_capacity(), 200);
    assert_eq!(finder.reallocations(), 2);
}

#[test]
fn exhausting_the_grid_is_blocked_not_pool_exhaustion() {
    // A full wall splits the grid; everything left of it gets expanded.
    let grid = ascii(
        "\
.....#....
.....#....
.....#....
.....#....
.....#....
.....#....
.....#....
.....#....
.....#....
.....#....",
    );
    let goal = Vec3::new(95.0, 0.0, 95.0);

    for diagonals in [false, true] {
        let mut finder = PathFinder::new().with_diagonals(diagonals);
        assert_eq!(
            finder.try_resolve(&grid, Vec3::new(5.0, 0.0, 5.0), goal),
            Err(SearchError::Blocked)
        );
    }

    // A goal outside the grid can never be reached either.
    let mut finder = PathFinder::new();
    assert_eq!(
        finder.try_resolve(&flat(10, 10), Vec3::new(5.0, 0.0, 5.0), Vec3::new(500.0, 0.0, 5.0)),
        Err(SearchError::Blocked)
    );
}

#[test]
fn cursor_walks_the_solution() {
    let grid = flat(4, 1);
    let mut finder = PathFinder::new();
    assert_eq!(finder.first_solution_pos(), None);
    assert!(finder.resolve(&grid, Vec3::new(5.0, 0.0, 5.0), Vec3::new(35.0, 0.0, 5.0)));

    let mut walked = Vec::new();
    let mut next = finder.first_solution_pos();
    while let Some(pos) = next {
        walked.push(pos);
        next = finder.next_solution_pos();
    }
    assert_eq!(walked, finder.solution());
    assert_eq!(finder.next_solution_pos(), None);

    // Rewinding starts over.
    assert_eq!(finder.first_solution_pos(), Some(Vec3::new(5.0, 0.0, 5.0)));
    assert_eq!(finder.next_solution_pos(), Some(Vec3::new(15.0, 0.0, 5.0)));
    assert_eq!(finder.waypoints().count(), 4);
}

#[test]
fn start_point_is_kept_verbatim() {
    let grid = flat(10, 1);
    let mut finder = PathFinder::new();
    let start = Vec3::new(3.0, 7.5, 8.0);

    assert!(finder.resolve(&grid, start, Vec3::new(95.0, 0.0, 5.0)));
    let path = finder.solution();
    assert_eq!(path[0], start);
    assert_eq!(path[1], Vec3::new(15.0, 0.0, 5.0));
}
