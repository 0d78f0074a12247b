//! Viewer configuration.
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File looked up in the working directory by [`ViewerConfig::load_default`].
pub const DEFAULT_CONFIG_FILE: &str = "corrview.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Dataset opened at startup, if it exists.
    pub data_path: PathBuf,
    pub date_column: String,
    /// Rolling correlation window, in rows.
    pub window_size: usize,
    /// Minimum |r| reported by the scan tool.
    pub correlation_threshold: f64,
    /// Metric the scan tool correlates everything else against.
    pub base_metric: String,
    pub title: String,
    pub colors: ColorConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/platodb.csv"),
            date_column: "Date".to_string(),
            window_size: 30,
            correlation_threshold: 0.80,
            base_metric: "USDJPYEXClose".to_string(),
            title: "Time Series Data".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

/// Hex colours (`#RRGGBB`) for the three chart axes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub metric_a: String,
    pub metric_b: String,
    pub correlation: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            metric_a: "#17BECF".to_string(),
            metric_b: "#B22222".to_string(),
            correlation: "#2CA02C".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load `./corrview.json`, or the defaults if it is absent or invalid.
    pub fn load_default() -> Self {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring {}: {e}", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ViewerConfig::from_json(
            r##"{ "window_size": 10, "colors": { "metric_b": "#000000" } }"##,
        )
        .unwrap();
        assert_eq!(config.window_size, 10);
        assert_eq!(config.date_column, "Date");
        assert_eq!(config.colors.metric_a, "#17BECF");
        assert_eq!(config.colors.metric_b, "#000000");
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(ViewerConfig::from_json("{}").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = ViewerConfig::from_json("{ window_size: 10 ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = ViewerConfig::load("/nonexistent/corrview.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }
}
