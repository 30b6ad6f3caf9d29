use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("cell size must be positive, got {width} x {height}")]
    InvalidCellSize { width: f32, height: f32 },

    #[error("navigable region is empty ({width} x {depth})")]
    EmptyRegion { width: f32, depth: f32 },

    #[error("navigable region is not finite ({width} x {depth})")]
    NonFiniteRegion { width: f32, depth: f32 },

    #[error("grid of {rows} x {cols} cells is too large")]
    TooManyCells { rows: f32, cols: f32 },
}

/// Parameters for `NavGrid::build`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavGridConfig {
    /// Cell extent along X.
    pub cell_width: f32,
    /// Cell extent along Z.
    pub cell_height: f32,
    /// Largest height step two neighbouring cells may differ by and still
    /// be connected (exclusive).
    pub max_slope: f32,
    /// Height above the top of the bounds that downward probes start from.
    pub probe_height: f32,
    /// Maximum probe travel.
    pub probe_length: f32,
}

impl NavGridConfig {
    pub const DEFAULT_MAX_SLOPE: f32 = 10.0;
    pub const DEFAULT_PROBE_HEIGHT: f32 = 1000.0;
    pub const DEFAULT_PROBE_LENGTH: f32 = 2000.0;

    pub fn new(cell_width: f32, cell_height: f32) -> Self {
        Self {
            cell_width,
            cell_height,
            ..Self::default()
        }
    }

    pub fn with_max_slope(mut self, max_slope: f32) -> Self {
        self.max_slope = max_slope;
        self
    }

    pub fn validate(&self) -> Result<(), GridError> {
        let valid = |size: f32| size > 0.0 && size.is_finite();
        if !(valid(self.cell_width) && valid(self.cell_height)) {
            return Err(GridError::InvalidCellSize {
                width: self.cell_width,
                height: self.cell_height,
            });
        }
        Ok(())
    }
}

impl Default for NavGridConfig {
    fn default() -> Self {
        Self {
            cell_width: 1.0,
            cell_height: 1.0,
            max_slope: Self::DEFAULT_MAX_SLOPE,
            probe_height: Self::DEFAULT_PROBE_HEIGHT,
            probe_length: Self::DEFAULT_PROBE_LENGTH,
        }
    }
}
