//! Configuration management for `hourcast`
//!
//! Handles loading configuration from files and environment variables and
//! validates every setting before the application starts.

use crate::HourcastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "HOURCAST_CONFIG";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HourcastConfig {
    /// Geocoding and forecast endpoints
    pub api: ApiConfig,
    /// Suggestion list behavior
    pub search: SearchConfig,
    /// Chart layout
    pub chart: ChartConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Geocoding and forecast API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Geocoding search endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Hourly forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Language of place names returned by the geocoder
    #[serde(default = "default_language")]
    pub language: String,
    /// Timezone the forecast timestamps are expressed in
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Search box settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of suggestions shown under the search box
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

/// Chart canvas size and margins, in chart pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: f64,
    #[serde(default = "default_chart_height")]
    pub height: f64,
    #[serde(default)]
    pub margin: Margins,
    /// Desired number of ticks per axis
    #[serde(default = "default_tick_count")]
    pub tick_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Log file path; the terminal UI owns stdout
    #[serde(default = "default_log_file_path")]
    pub file_path: String,
}

// Default value functions
fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timezone() -> String {
    "auto".to_string()
}

fn default_max_suggestions() -> usize {
    5
}

fn default_chart_width() -> f64 {
    960.0
}

fn default_chart_height() -> f64 {
    400.0
}

fn default_tick_count() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_file_path() -> String {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hourcast")
        .join("hourcast.log")
        .to_string_lossy()
        .into_owned()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            timeout_seconds: default_timeout(),
            language: default_language(),
            timezone: default_timezone(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
            margin: Margins::default(),
            tick_count: default_tick_count(),
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 120.0,
            right: 120.0,
            top: 60.0,
            bottom: 30.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file_path: default_log_file_path(),
        }
    }
}

impl HourcastConfig {
    /// Load configuration from the default file location and environment variables
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from_path(explicit)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("hourcast.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // HOURCAST_API__TIMEOUT_SECONDS=10 overrides api.timeout_seconds
        builder = builder.add_source(
            Environment::with_prefix("HOURCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: HourcastConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize configuration from {}", config_file.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hourcast").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.api.timeout_seconds == 0 || self.api.timeout_seconds > 300 {
            return Err(HourcastError::config(
                "API timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.search.max_suggestions == 0 || self.search.max_suggestions > 100 {
            return Err(HourcastError::config(
                "Maximum suggestions must be between 1 and 100",
            )
            .into());
        }

        if self.chart.tick_count == 0 {
            return Err(HourcastError::config("Tick count must be at least 1").into());
        }

        let margin = &self.chart.margin;
        if [margin.left, margin.right, margin.top, margin.bottom]
            .iter()
            .any(|m| !m.is_finite() || *m < 0.0)
        {
            return Err(HourcastError::config("Chart margins must be non-negative").into());
        }

        if self.chart.width <= margin.left + margin.right {
            return Err(HourcastError::config(
                "Chart width must exceed the left and right margins",
            )
            .into());
        }

        // The value axis spans height - bottom - top down to top.
        if self.chart.height - margin.bottom - margin.top <= margin.top {
            return Err(HourcastError::config(
                "Chart height leaves no room for the value axis",
            )
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(HourcastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(HourcastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("geocoding", &self.api.geocoding_url),
            ("forecast", &self.api.forecast_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(HourcastError::config(format!(
                    "The {name} URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = HourcastConfig::default();
        assert_eq!(
            config.api.geocoding_url,
            "https://geocoding-api.open-meteo.com/v1/search"
        );
        assert_eq!(config.api.forecast_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.search.max_suggestions, 5);
        assert_eq!(config.chart.margin, Margins::default());
        assert_eq!(config.chart.tick_count, 5);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = HourcastConfig::default();
        config.logging.level = "loud".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = HourcastConfig::default();
        config.api.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout"));

        let mut config = HourcastConfig::default();
        config.chart.width = 200.0;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("width"));
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = HourcastConfig::default();
        config.api.forecast_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("forecast URL"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
geocoding_url = "http://localhost:9000/search"

[chart]
width = 640.0
tick_count = 8

[chart.margin]
left = 40.0
right = 40.0
top = 20.0
bottom = 20.0
"#
        )
        .unwrap();

        let config = HourcastConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.api.geocoding_url, "http://localhost:9000/search");
        assert_eq!(config.api.forecast_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(config.chart.width, 640.0);
        assert_eq!(config.chart.height, 400.0);
        assert_eq!(config.chart.tick_count, 8);
        assert_eq!(config.chart.margin.left, 40.0);
        assert_eq!(config.search.max_suggestions, 5);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            HourcastConfig::load_from_path(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.chart.width, 960.0);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = HourcastConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("hourcast"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
