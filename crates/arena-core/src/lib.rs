//! Engine-agnostic arena primitives: math, deterministic RNG, surface probes
//! and a tile-based reference world.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod math;
pub mod probe;
pub mod rng;
pub mod tiles;

pub use math::{Bounds, Vec3};
pub use probe::{Layer, LayerMask, NavigableArea, ObjectId, ProbeHit, SurfaceProbe};
pub use rng::{DeterministicRng, SplitMix64};
pub use tiles::{AsciiPalette, Door, LayoutError, Tile, TileLayout};
