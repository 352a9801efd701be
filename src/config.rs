//! Optional YAML configuration for dashboard defaults.
//!
//! ```yaml
//! dataset: data/chicago_crimes.csv
//! delimiter: ","
//! top_n: 15
//! map:
//!   default_points: 500
//!   width: 72
//!   height: 24
//! ```
//!
//! Command-line flags take precedence over values loaded here; anything left
//! unset falls back to the built-in defaults.

use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{aggregate::DEFAULT_TOP_N, map};

pub const DEFAULT_DATASET: &str = "dataset.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub dataset: PathBuf,
    pub delimiter: Option<String>,
    pub input_encoding: Option<String>,
    pub top_n: usize,
    pub map: MapConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DEFAULT_DATASET),
            delimiter: None,
            input_encoding: None,
            top_n: DEFAULT_TOP_N,
            map: MapConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    pub default_points: usize,
    pub width: usize,
    pub height: usize,
    /// Colour glyphs with ANSI escapes; unset means "when stdout is a terminal".
    pub color: Option<bool>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_points: map::DEFAULT_POINTS,
            width: map::DEFAULT_GRID_WIDTH,
            height: map::DEFAULT_GRID_HEIGHT,
            color: None,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config file {path:?}"))?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn grid(&self) -> map::GridSize {
        map::GridSize {
            width: self.map.width,
            height: self.map.height,
        }
    }
}
