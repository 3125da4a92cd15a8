//! Dashboard configuration.
//!
//! Read from `dashboard.toml` in the working directory when it exists;
//! every field falls back to a default otherwise.

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Input data and static assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Registry CSV.
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Banner image shown above the charts.
    #[serde(default = "default_banner_path")]
    pub banner_path: PathBuf,

    /// Banner display width in pixels.
    #[serde(default = "default_banner_width")]
    pub banner_width: u32,

    /// Place name used in the text summaries.
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            banner_path: default_banner_path(),
            banner_width: default_banner_width(),
            region: default_region(),
        }
    }
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("Cannabis_Registry.csv")
}

fn default_banner_path() -> PathBuf {
    PathBuf::from("projects/maweed.jpeg")
}

fn default_banner_width() -> u32 {
    500
}

fn default_region() -> String {
    "Boston".to_string()
}

/// Scatter layer styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_zoom")]
    pub zoom: f64,

    #[serde(default)]
    pub pitch: f64,

    /// Point radius in meters.
    #[serde(default = "default_radius")]
    pub radius: u32,

    /// RGB point colour.
    #[serde(default = "default_color")]
    pub color: [u8; 3],
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            pitch: 0.0,
            radius: default_radius(),
            color: default_color(),
        }
    }
}

fn default_zoom() -> f64 {
    11.0
}

fn default_radius() -> u32 {
    75
}

fn default_color() -> [u8; 3] {
    [0, 153, 0]
}

/// HTTP front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("web")
}

impl DashboardConfig {
    /// Load `dashboard.toml` from the working directory, or defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from `path`. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content).map_err(|source| DashboardError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.data.csv_path, PathBuf::from("Cannabis_Registry.csv"));
        assert_eq!(config.data.banner_width, 500);
        assert_eq!(config.map.zoom, 11.0);
        assert_eq!(config.map.color, [0, 153, 0]);
        assert_eq!(config.server.bind, "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = DashboardConfig::parse(
            r#"
            [data]
            csv_path = "data/registry.csv"

            [map]
            radius = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.data.csv_path, PathBuf::from("data/registry.csv"));
        assert_eq!(config.data.region, "Boston");
        assert_eq!(config.map.radius, 120);
        assert_eq!(config.map.zoom, 11.0);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = DashboardConfig::load_from(Path::new("/no/such/dashboard.toml")).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[map]\nzoom = \"close\"").unwrap();

        let err = DashboardConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, DashboardError::Config { .. }));
    }
}
