//! Application configuration.
//!
//! Read from a TOML file with three optional sections:
//!
//! ```toml
//! [source]          # which dataset to load (see the source registry)
//! [dashboard]       # sampling, default region, outlier rules, rounding
//! [server]          # bind address and port
//! ```
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.

use std::path::{Path, PathBuf};

use accident_dash_analytics_models::DashboardConfig;
use accident_dash_source::registry::default_source;
use accident_dash_source::source_def::SourceDefinition;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "ACCIDENT_DASH_CONFIG";

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "accident_dash.toml";

/// Errors reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AppConfig {
    /// The dataset to load.
    pub source: SourceDefinition,
    /// Tunables for the dashboard aggregations.
    pub dashboard: DashboardConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            dashboard: DashboardConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed or a value
    /// has the wrong type.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(text)?)
    }

    /// Reads the configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Self::from_toml(&text)
    }

    /// Finds and reads the configuration, then applies environment
    /// overrides.
    ///
    /// Lookup order: `explicit`, then the file named by
    /// [`CONFIG_ENV_VAR`], then [`DEFAULT_CONFIG_FILE`] if it exists, then
    /// the built-in defaults. `BIND_ADDR` and `PORT` override the server
    /// section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a named file cannot be read or parsed.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        let path = explicit.map(Path::to_path_buf).or(from_env).or_else(|| {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.is_file().then_some(local)
        });

        let mut config = match path {
            Some(path) => Self::load(&path)?,
            None => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_server_overrides(
            std::env::var("BIND_ADDR").ok(),
            std::env::var("PORT").ok(),
        );
        Ok(config)
    }

    /// Overrides the server section with the given values when set.
    ///
    /// An unparseable port is ignored.
    pub fn apply_server_overrides(&mut self, bind_addr: Option<String>, port: Option<String>) {
        if let Some(bind_addr) = bind_addr {
            self.server.bind_addr = bind_addr;
        }
        if let Some(port) = port {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => log::warn!("Ignoring invalid PORT '{port}': {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use accident_dash_analytics_models::{OutlierRule, RoundingMode};
    use accident_dash_source::source_def::FetcherConfig;

    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.source.id, "us_accidents");
        assert_eq!(config.dashboard.map_sample_cap, 10_000);
        assert_eq!(config.dashboard.default_region, "CA");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [dashboard]
            default_region = "TX"
            rounding = "half_up"

            [dashboard.thresholds]
            temperature_f = { max = 130.0, inclusive = true }

            [server]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.dashboard.default_region, "TX");
        assert_eq!(config.dashboard.rounding, RoundingMode::HalfUp);
        assert_eq!(config.dashboard.map_sample_cap, 10_000);
        assert_eq!(
            config.dashboard.thresholds.temperature_f,
            Some(OutlierRule {
                max: 130.0,
                inclusive: true
            })
        );
        assert_eq!(
            config.dashboard.thresholds.wind_speed_mph,
            Some(OutlierRule {
                max: 100.0,
                inclusive: false
            })
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
    }

    #[test]
    fn custom_source() {
        let config = AppConfig::from_toml(
            r#"
            [source]
            id = "sample"
            name = "Sample extract"
            version = "2024-01"

            [source.fetcher]
            type = "csv_download"
            url = "https://example.com/accidents.csv.gz"
            compressed = "gzip"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.id, "sample");
        assert_eq!(config.source.row_limit, None);
        assert!(matches!(
            config.source.fetcher,
            FetcherConfig::CsvDownload { ref url, .. } if url.ends_with(".csv.gz")
        ));
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(matches!(
            AppConfig::from_toml("[server]\nport = \"eighty\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Path::new("/nonexistent/accident_dash.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn server_overrides() {
        let mut config = AppConfig::default();
        config.apply_server_overrides(Some("0.0.0.0".to_string()), Some("3000".to_string()));
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.server.port, 3000);

        config.apply_server_overrides(None, Some("not a port".to_string()));
        assert_eq!(config.server.port, 3000);
    }
}
