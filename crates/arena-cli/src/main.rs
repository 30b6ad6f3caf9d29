//! Arena CLI - navigation grid and path finding playground.
//!
//! - `arena grid` - build the grid for an arena and print it
//! - `arena path` - resolve a path between two cells
//! - `arena door` - open or close a door and show the effect on a path

mod config;
mod render;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use arena_core::{TileLayout, Vec3};
use arena_nav::{GridNavigator, NavGrid, NavPath};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use config::ArenaConfig;

#[derive(Parser)]
#[command(name = "arena")]
#[command(about = "Arena navigation grid and path finder", version)]
struct Cli {
    /// Arena description (YAML)
    #[arg(short, long, global = true, default_value = "arena.yaml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the navigation grid and print it
    Grid,

    /// Resolve a path between two cells
    Path {
        /// Start cell as ROW,COL
        #[arg(long)]
        from: CellArg,

        /// Goal cell as ROW,COL
        #[arg(long)]
        to: CellArg,

        /// Allow diagonal moves (overrides the arena setting)
        #[arg(long)]
        diagonals: bool,

        /// Print waypoints as JSON instead of a map
        #[arg(long)]
        json: bool,
    },

    /// Open or close a door tile and re-resolve
    Door {
        /// Door tile as X,Z
        #[arg(long)]
        at: CellArg,

        /// Open the door (closes it otherwise)
        #[arg(long)]
        open: bool,

        /// Start cell as ROW,COL
        #[arg(long, requires = "to")]
        from: Option<CellArg>,

        /// Goal cell as ROW,COL
        #[arg(long, requires = "from")]
        to: Option<CellArg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellArg {
    row: i32,
    col: i32,
}

impl FromStr for CellArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once(',')
            .ok_or_else(|| format!("expected ROW,COL, got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<i32>()
                .map_err(|e| format!("invalid coordinate '{v}': {e}"))
        };
        Ok(Self {
            row: parse(row)?,
            col: parse(col)?,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let arena = ArenaConfig::load(&cli.config)?;
    let mut layout = arena.build_layout()?;
    let grid = NavGrid::from_area(arena.grid_config(), &layout).context("Failed to build grid")?;
    tracing::info!(
        arena = %cli.config.display(),
        rows = grid.rows(),
        cols = grid.cols(),
        "grid built"
    );

    match cli.command {
        Commands::Grid => {
            println!("{}", render::summary(&grid));
            print!("{}", render::render_grid(&grid, &[]));
            Ok(())
        }
        Commands::Path {
            from,
            to,
            diagonals,
            json,
        } => {
            let mut nav = GridNavigator::new(grid).with_diagonals(arena.diagonals || diagonals);
            let path = resolve(&mut nav, from, to)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&path)?);
            } else {
                print_path(&nav, &path);
            }
            Ok(())
        }
        Commands::Door { at, open, from, to } => {
            let mut nav = GridNavigator::new(grid).with_diagonals(arena.diagonals);
            let route = from.zip(to);

            if let Some((from, to)) = route {
                report_route(&mut nav, from, to, "before");
            }

            toggle_door(&mut layout, &mut nav, at, open)?;

            if let Some((from, to)) = route {
                report_route(&mut nav, from, to, "after");
            }
            print!("{}", render::render_grid(nav.grid(), &[]));
            Ok(())
        }
    }
}

/// World position of a cell center, at the cell's surface height.
fn cell_pos(grid: &NavGrid, cell: CellArg) -> Vec3 {
    grid.world_pos_at_row_col(cell.row, cell.col)
        .with_y(grid.height(cell.row, cell.col))
}

fn resolve(nav: &mut GridNavigator, from: CellArg, to: CellArg) -> Result<NavPath> {
    let start = cell_pos(nav.grid(), from);
    let goal = cell_pos(nav.grid(), to);

    let mut path = NavPath::default();
    nav.find_path_into(start, goal, &mut path).with_context(|| {
        format!(
            "No path from {},{} to {},{}",
            from.row, from.col, to.row, to.col
        )
    })?;
    Ok(path)
}

fn report_route(nav: &mut GridNavigator, from: CellArg, to: CellArg, label: &str) {
    match resolve(nav, from, to) {
        Ok(path) => println!(
            "{label}: {} waypoints, {:.1} units",
            path.len(),
            path.length_xz()
        ),
        Err(err) => println!("{label}: {err:#}"),
    }
}

fn toggle_door(
    layout: &mut TileLayout,
    nav: &mut GridNavigator,
    at: CellArg,
    open: bool,
) -> Result<()> {
    let x = usize::try_from(at.row).context("Door X must not be negative")?;
    let z = usize::try_from(at.col).context("Door Z must not be negative")?;
    layout
        .set_door_open(x, z, open)
        .with_context(|| format!("No door at {x},{z}"))?;

    // Door tiles line up with cells only when both use the same size.
    let center = layout.tile_center(x, z);
    let (row, col) = nav.grid().row_col_at(center);
    nav.refresh_cell(&*layout, row, col);

    tracing::info!(x, z, open, row, col, "door toggled");
    Ok(())
}

fn print_path(nav: &GridNavigator, path: &NavPath) {
    println!(
        "{} waypoints, {:.1} units{}",
        path.len(),
        path.length_xz(),
        if nav.finder().moving_in_diagonals() {
            " (diagonals)"
        } else {
            ""
        }
    );
    for (i, p) in path.points.iter().enumerate() {
        let (row, col) = nav.grid().row_col_at(*p);
        println!("  {i:>3}: ({:.1}, {:.1}, {:.1}) cell {row},{col}", p.x, p.y, p.z);
    }
    print!("{}", render::render_grid(nav.grid(), &path.points));
}
