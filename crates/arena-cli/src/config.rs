//! Arena description loading.

use std::path::Path;

use anyhow::{Context, Result};
use arena_core::{AsciiPalette, SplitMix64, TileLayout, Vec3};
use arena_nav::NavGridConfig;
use serde::{Deserialize, Serialize};

/// An arena, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// World units per layout tile
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,

    /// World position of the layout's min corner
    pub origin: Vec3,

    /// Heights used for layout glyphs
    pub palette: AsciiPalette,

    /// Grid parameters; cells default to one per tile
    pub grid: Option<NavGridConfig>,

    /// Allow diagonal moves when searching
    pub diagonals: bool,

    /// ASCII layout, one line per Z row
    pub layout: String,

    /// Random props scattered over free floor
    pub props: Option<ScatterConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterConfig {
    pub count: usize,

    #[serde(default = "default_prop_height")]
    pub height: f32,

    #[serde(default)]
    pub seed: u64,
}

fn default_tile_size() -> f32 {
    10.0
}
fn default_prop_height() -> f32 {
    AsciiPalette::default().prop_height
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            tile_size: default_tile_size(),
            origin: Vec3::ZERO,
            palette: AsciiPalette::default(),
            grid: None,
            diagonals: false,
            layout: String::new(),
            props: None,
        }
    }
}

impl ArenaConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read arena from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse arena from {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn grid_config(&self) -> NavGridConfig {
        self.grid
            .unwrap_or_else(|| NavGridConfig::new(self.tile_size, self.tile_size))
    }

    /// Parse the layout and scatter any configured props.
    pub fn build_layout(&self) -> Result<TileLayout> {
        let mut layout = TileLayout::from_ascii(&self.layout, self.tile_size, self.palette)
            .context("Invalid arena layout")?
            .with_origin(self.origin);

        if let Some(props) = &self.props {
            let mut rng = SplitMix64::new(props.seed);
            let placed = layout.scatter_props(&mut rng, props.count, props.height);
            tracing::debug!(requested = props.count, placed, seed = props.seed, "scattered props");
        }

        Ok(layout)
    }
}
