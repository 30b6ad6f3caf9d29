use arena_core::{ObjectId, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Compass direction between adjacent cells.
///
/// Rows grow along +X (east), cols along +Z (north).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    N = 0,
    S = 1,
    E = 2,
    W = 3,
    NE = 4,
    NW = 5,
    SE = 6,
    SW = 7,
}

impl Direction {
    /// Search order: the orthogonal moves come first so that
    /// `ALL[..4]` is the 4-connected move set.
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::S,
        Direction::E,
        Direction::W,
        Direction::NE,
        Direction::NW,
        Direction::SE,
        Direction::SW,
    ];

    pub const ORTHOGONAL: [Direction; 4] =
        [Direction::N, Direction::S, Direction::E, Direction::W];

    /// `(d_row, d_col)` to the neighbour in this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::N => (0, 1),
            Direction::S => (0, -1),
            Direction::E => (1, 0),
            Direction::W => (-1, 0),
            Direction::NE => (1, 1),
            Direction::NW => (-1, 1),
            Direction::SE => (1, -1),
            Direction::SW => (-1, -1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::N => Direction::S,
            Direction::S => Direction::N,
            Direction::E => Direction::W,
            Direction::W => Direction::E,
            Direction::NE => Direction::SW,
            Direction::NW => Direction::SE,
            Direction::SE => Direction::NW,
            Direction::SW => Direction::NE,
        }
    }

    pub const fn is_diagonal(self) -> bool {
        (self as u8) >= 4
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Directions a unit may leave a cell by, plus an obstacle flag.
///
/// The obstacle flag lives above the eight direction bits, so a walkable cell
/// connected in every direction stays distinguishable from an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoveMask(u16);

impl MoveMask {
    pub const EMPTY: Self = Self(0);
    pub const OBSTACLE: Self = Self(1 << 8);

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub fn add(&mut self, dir: Direction) {
        self.0 |= dir.bit();
    }

    pub fn remove(&mut self, dir: Direction) {
        self.0 &= !dir.bit();
    }

    pub fn set(&mut self, dir: Direction, allowed: bool) {
        if allowed {
            self.add(dir);
        } else {
            self.remove(dir);
        }
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn set_obstacle(&mut self) {
        *self = Self::OBSTACLE;
    }

    pub const fn is_obstacle(self) -> bool {
        self.0 & Self::OBSTACLE.0 != 0
    }

    pub const fn contains(self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

/// One grid square of the navigable surface.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    /// Center of the cell; `y` is the resolved surface height.
    pub position: Vec3,
    pub moves: MoveMask,
    pub cost: f32,
    pub row: usize,
    pub col: usize,
    /// Engine object the probe hit first (floor tile, prop, door).
    pub occupant: Option<ObjectId>,
    /// Floor tile underneath, found by the floor-only probe.
    pub tile: Option<ObjectId>,
    pub floor_height: Option<f32>,
}

impl Cell {
    pub const DEFAULT_COST: f32 = 1.0;

    pub fn new(position: Vec3, row: usize, col: usize) -> Self {
        Self {
            position,
            moves: MoveMask::EMPTY,
            cost: Self::DEFAULT_COST,
            row,
            col,
            occupant: None,
            tile: None,
            floor_height: None,
        }
    }

    pub fn is_obstacle(&self) -> bool {
        self.moves.is_obstacle()
    }
}
