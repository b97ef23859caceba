//! `mallnav.toml` loader.
//!
//! Every key has a default, so a missing file or a partial one still yields a
//! usable config. Lookup order: the `--config` path, the platform config
//! directory, then the working directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use mallnav_core::content::{DEFAULT_COLS, DEFAULT_FLOOR_LABELS, DEFAULT_ROWS};
use mallnav_core::{GridDims, Pace};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "mallnav.toml";
pub const LAYOUT_FILE_NAME: &str = "layout.json";

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub venue: VenueConfig,
    #[serde(default)]
    pub traversal: TraversalConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VenueConfig {
    #[serde(default = "default_cols")]
    pub cols: usize,
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_floors")]
    pub floors: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TraversalConfig {
    #[serde(default = "default_speed")]
    pub speed: u32,
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    #[serde(default = "default_per_speed")]
    pub per_speed_ms: u64,
    #[serde(default = "default_min_delay")]
    pub min_delay_ms: u64,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default)]
    pub seed: u64,
}

fn default_cols() -> usize {
    DEFAULT_COLS
}

fn default_rows() -> usize {
    DEFAULT_ROWS
}

fn default_floors() -> Vec<String> {
    DEFAULT_FLOOR_LABELS.iter().map(|label| label.to_string()).collect()
}

fn default_speed() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    700
}

fn default_per_speed() -> u64 {
    100
}

fn default_min_delay() -> u64 {
    120
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self { cols: default_cols(), rows: default_rows(), floors: default_floors() }
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            base_delay_ms: default_base_delay(),
            per_speed_ms: default_per_speed(),
            min_delay_ms: default_min_delay(),
        }
    }
}

impl VenueConfig {
    pub fn dims(&self) -> Result<GridDims> {
        GridDims::new(self.cols, self.rows).context("invalid [venue] grid size")
    }
}

impl TraversalConfig {
    pub fn pace(&self) -> Pace {
        Pace {
            base_delay: Duration::from_millis(self.base_delay_ms),
            per_speed: Duration::from_millis(self.per_speed_ms),
            min_delay: Duration::from_millis(self.min_delay_ms),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse config TOML")
    }

    /// An explicit path must exist and parse. Otherwise the first file found
    /// in the search directories is used; a broken one is skipped with a
    /// warning and defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            return Self::from_toml(&text);
        }

        let Some(path) = candidate_paths().into_iter().find(|path| path.is_file()) else {
            log::debug!("no {CONFIG_FILE_NAME} found, using defaults");
            return Ok(Self::default());
        };
        let parsed = fs::read_to_string(&path)
            .context("failed to read config")
            .and_then(|text| Self::from_toml(&text));
        match parsed {
            Ok(config) => {
                log::debug!("loaded config from {}", path.display());
                Ok(config)
            }
            Err(err) => {
                log::warn!("ignoring {}: {err:#}", path.display());
                Ok(Self::default())
            }
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "mallnav")
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dirs) = project_dirs() {
        paths.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// Platform data directory location of the saved layout.
pub fn default_layout_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join(LAYOUT_FILE_NAME))
}
