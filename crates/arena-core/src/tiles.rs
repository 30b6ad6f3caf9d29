//! Tile-based reference arena.
//!
//! A `TileLayout` is the smallest world that can answer downward probes: a
//! rectangle of square tiles, each with an optional floor, prop (crate) and
//! door. Hosts with real geometry implement `SurfaceProbe` themselves; this
//! type backs the CLI, the tests and the benches.

use thiserror::Error;

use crate::{
    Bounds, DeterministicRng, Layer, LayerMask, NavigableArea, ObjectId, ProbeHit, SurfaceProbe,
    Vec3,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("layout has no tiles")]
    Empty,

    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),

    #[error("line {line} has {found} tiles, expected {expected}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile glyph {glyph:?} at line {line}, column {column}")]
    UnknownGlyph {
        glyph: char,
        line: usize,
        column: usize,
    },

    #[error("tile ({x}, {z}) is outside the layout")]
    OutOfRange { x: usize, z: usize },

    #[error("tile ({x}, {z}) has no floor")]
    NoFloor { x: usize, z: usize },

    #[error("tile ({x}, {z}) has no door")]
    NoDoor { x: usize, z: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Door {
    /// Height of the closed door leaf above the floor.
    pub height: f32,
    pub open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tile {
    /// Floor height relative to the layout origin; `None` is a hole.
    pub floor: Option<f32>,
    /// Height of a prop standing on the floor.
    pub prop: Option<f32>,
    pub door: Option<Door>,
}

impl Tile {
    pub fn floor(height: f32) -> Self {
        Self {
            floor: Some(height),
            prop: None,
            door: None,
        }
    }
}

/// Heights used when turning ASCII glyphs into tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AsciiPalette {
    pub floor_height: f32,
    pub ledge_height: f32,
    pub prop_height: f32,
    pub door_height: f32,
}

impl Default for AsciiPalette {
    fn default() -> Self {
        Self {
            floor_height: 0.0,
            ledge_height: 20.0,
            prop_height: 40.0,
            door_height: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileLayout {
    origin: Vec3,
    tile_size: f32,
    width: usize,
    depth: usize,
    tiles: Vec<Tile>,
}

impl TileLayout {
    /// A `width` x `depth` layout of plain floor at `floor_height`.
    pub fn flat(
        width: usize,
        depth: usize,
        tile_size: f32,
        floor_height: f32,
    ) -> Result<Self, LayoutError> {
        if width == 0 || depth == 0 {
            return Err(LayoutError::Empty);
        }
        if !(tile_size > 0.0) {
            return Err(LayoutError::InvalidTileSize(tile_size));
        }
        Ok(Self {
            origin: Vec3::ZERO,
            tile_size,
            width,
            depth,
            tiles: vec![Tile::floor(floor_height); width * depth],
        })
    }

    /// Parse a layout from ASCII art.
    ///
    /// Line `k` is the tile row at `z = k`, character `j` the tile at `x = j`.
    /// Glyphs: `.` floor, `^` raised ledge, `#` prop, `D` closed door,
    /// `d` open door, space or `_` hole. Blank lines are skipped.
    pub fn from_ascii(
        text: &str,
        tile_size: f32,
        palette: AsciiPalette,
    ) -> Result<Self, LayoutError> {
        if !(tile_size > 0.0) {
            return Err(LayoutError::InvalidTileSize(tile_size));
        }

        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(LayoutError::Empty);
        };
        let width = first.chars().count();
        let depth = lines.len();

        let mut grid = vec![Tile::default(); width * depth];
        for (z, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(LayoutError::Ragged {
                    line: z,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in line.chars().enumerate() {
                let floor = palette.floor_height;
                let tile = match glyph {
                    '.' => Tile::floor(floor),
                    '^' => Tile::floor(floor + palette.ledge_height),
                    '#' => Tile {
                        prop: Some(palette.prop_height),
                        ..Tile::floor(floor)
                    },
                    'D' | 'd' => Tile {
                        door: Some(Door {
                            height: palette.door_height,
                            open: glyph == 'd',
                        }),
                        ..Tile::floor(floor)
                    },
                    ' ' | '_' => Tile::default(),
                    _ => {
                        return Err(LayoutError::UnknownGlyph {
                            glyph,
                            line: z,
                            column: x,
                        })
                    }
                };
                grid[x * depth + z] = tile;
            }
        }

        Ok(Self {
            origin: Vec3::ZERO,
            tile_size,
            width,
            depth,
            tiles: grid,
        })
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Tiles along +X.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Tiles along +Z.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn index(&self, x: usize, z: usize) -> Result<usize, LayoutError> {
        if x < self.width && z < self.depth {
            Ok(x * self.depth + z)
        } else {
            Err(LayoutError::OutOfRange { x, z })
        }
    }

    pub fn tile(&self, x: usize, z: usize) -> Option<&Tile> {
        self.index(x, z).ok().map(|i| &self.tiles[i])
    }

    /// Tile coordinates under a world position.
    pub fn tile_at(&self, pos: Vec3) -> Option<(usize, usize)> {
        let fx = ((pos.x - self.origin.x) / self.tile_size).floor();
        let fz = ((pos.z - self.origin.z) / self.tile_size).floor();
        if fx < 0.0 || fz < 0.0 {
            return None;
        }
        let (x, z) = (fx as usize, fz as usize);
        (x < self.width && z < self.depth).then_some((x, z))
    }

    /// World position of a tile's center, at its floor height (or the origin
    /// height for holes).
    pub fn tile_center(&self, x: usize, z: usize) -> Vec3 {
        let floor = self.tile(x, z).and_then(|t| t.floor).unwrap_or(0.0);
        Vec3::new(
            self.origin.x + (x as f32 + 0.5) * self.tile_size,
            self.origin.y + floor,
            self.origin.z + (z as f32 + 0.5) * self.tile_size,
        )
    }

    /// Stable object handle for the geometry of one tile on one layer.
    pub fn object_id(&self, x: usize, z: usize, layer: Layer) -> ObjectId {
        let slot = match layer {
            Layer::Floor => 0,
            Layer::Prop => 1,
            Layer::Door => 2,
        };
        ObjectId(((x * self.depth + z) * 3 + slot) as u32)
    }

    pub fn set_floor(&mut self, x: usize, z: usize, height: Option<f32>) -> Result<(), LayoutError> {
        let i = self.index(x, z)?;
        self.tiles[i].floor = height;
        Ok(())
    }

    pub fn place_prop(&mut self, x: usize, z: usize, height: f32) -> Result<(), LayoutError> {
        let i = self.index(x, z)?;
        if self.tiles[i].floor.is_none() {
            return Err(LayoutError::NoFloor { x, z });
        }
        self.tiles[i].prop = Some(height);
        Ok(())
    }

    pub fn clear_prop(&mut self, x: usize, z: usize) -> Result<(), LayoutError> {
        let i = self.index(x, z)?;
        self.tiles[i].prop = None;
        Ok(())
    }

    pub fn place_door(
        &mut self,
        x: usize,
        z: usize,
        height: f32,
        open: bool,
    ) -> Result<(), LayoutError> {
        let i = self.index(x, z)?;
        if self.tiles[i].floor.is_none() {
            return Err(LayoutError::NoFloor { x, z });
        }
        self.tiles[i].door = Some(Door { height, open });
        Ok(())
    }

    pub fn set_door_open(&mut self, x: usize, z: usize, open: bool) -> Result<(), LayoutError> {
        let i = self.index(x, z)?;
        match self.tiles[i].door.as_mut() {
            Some(door) => {
                door.open = open;
                Ok(())
            }
            None => Err(LayoutError::NoDoor { x, z }),
        }
    }

    /// Drop up to `count` props of `height` on free floor tiles.
    ///
    /// Returns how many were placed; crowded layouts may yield fewer.
    pub fn scatter_props<R: DeterministicRng>(
        &mut self,
        rng: &mut R,
        count: usize,
        height: f32,
    ) -> usize {
        let mut placed = 0;
        let mut attempts = count.saturating_mul(8);
        while placed < count && attempts > 0 {
            attempts -= 1;
            let x = rng.next_below(self.width as u32) as usize;
            let z = rng.next_below(self.depth as u32) as usize;
            let i = x * self.depth + z;
            let tile = &mut self.tiles[i];
            if tile.floor.is_some() && tile.prop.is_none() && tile.door.is_none() {
                tile.prop = Some(height);
                placed += 1;
            }
        }
        placed
    }
}

impl SurfaceProbe for TileLayout {
    fn cast_down(&self, origin: Vec3, max_distance: f32, mask: LayerMask) -> Option<ProbeHit> {
        let (x, z) = self.tile_at(origin)?;
        let tile = self.tiles[x * self.depth + z];
        let floor = self.origin.y + tile.floor?;

        // Highest surface wins; on equal heights the earlier candidate is kept.
        let candidates = [
            tile.prop.map(|h| (floor + h, Layer::Prop)),
            tile.door
                .map(|d| (if d.open { floor } else { floor + d.height }, Layer::Door)),
            Some((floor, Layer::Floor)),
        ];

        let mut best: Option<(f32, Layer)> = None;
        for (y, layer) in candidates.into_iter().flatten() {
            if !mask.contains(layer) || y > origin.y || origin.y - y > max_distance {
                continue;
            }
            match best {
                Some((best_y, _)) if y <= best_y => {}
                _ => best = Some((y, layer)),
            }
        }

        best.map(|(y, layer)| ProbeHit {
            point: Vec3::new(origin.x, y, origin.z),
            normal: Vec3::UP,
            layer,
            object: Some(self.object_id(x, z, layer)),
        })
    }
}

impl NavigableArea for TileLayout {
    fn bounds(&self) -> Bounds {
        let extent = Vec3::new(
            self.width as f32 * self.tile_size,
            0.0,
            self.depth as f32 * self.tile_size,
        );
        Bounds::from_corners(self.origin, self.origin + extent)
    }
}
