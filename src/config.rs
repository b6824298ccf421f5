// Session configuration loading and parsing (draftroom.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::clock;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

/// Everything the client needs to join one draft session.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub clock: ClockConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// WebSocket endpoint of the draft server, e.g. `ws://host:8082/ws/5`.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    #[serde(default = "default_countdown_refresh_ms")]
    pub countdown_refresh_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            sync_interval_secs: default_sync_interval_secs(),
            countdown_refresh_ms: default_countdown_refresh_ms(),
        }
    }
}

fn default_sync_interval_secs() -> u64 {
    clock::SYNC_INTERVAL.as_secs()
}

fn default_countdown_refresh_ms() -> u64 {
    clock::COUNTDOWN_REFRESH.as_millis() as u64
}

impl ClockConfig {
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn countdown_refresh(&self) -> Duration {
        Duration::from_millis(self.countdown_refresh_ms)
    }
}

/// Load and validate the configuration file at `path`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    parse(&raw, path)
}

/// Parse and validate configuration text. Split out from [`load`] so tests
/// don't need files on disk.
pub fn parse(raw: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(raw).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = &config.connection.url;
    if !url.starts_with("ws://") && !url.starts_with("wss://") {
        return Err(ConfigError::ValidationError {
            field: "connection.url".into(),
            message: format!("`{url}` is not a ws:// or wss:// endpoint"),
        });
    }
    if config.clock.sync_interval_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "clock.sync_interval_secs".into(),
            message: "must be at least 1".into(),
        });
    }
    if config.clock.countdown_refresh_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "clock.countdown_refresh_ms".into(),
            message: "must be at least 1".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(raw: &str) -> Result<Config, ConfigError> {
        parse(raw, Path::new("test.toml"))
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse_str(
            r#"
            [connection]
            url = "ws://draft.example.net:8082/ws/5"
            "#,
        )
        .unwrap();
        assert_eq!(config.connection.url, "ws://draft.example.net:8082/ws/5");
        assert_eq!(config.clock.sync_interval(), Duration::from_secs(5));
        assert_eq!(config.clock.countdown_refresh(), Duration::from_millis(200));
    }

    #[test]
    fn explicit_clock_settings_override_defaults() {
        let config = parse_str(
            r#"
            [connection]
            url = "wss://draft.example.net/ws/5"

            [clock]
            sync_interval_secs = 10
            countdown_refresh_ms = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.clock.sync_interval(), Duration::from_secs(10));
        assert_eq!(config.clock.countdown_refresh(), Duration::from_millis(100));
    }

    #[test]
    fn non_websocket_url_fails_validation() {
        let err = parse_str(
            r#"
            [connection]
            url = "http://draft.example.net/ws/5"
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { field, .. } if field == "connection.url"
        ));
    }

    #[test]
    fn zero_sync_interval_fails_validation() {
        let err = parse_str(
            r#"
            [connection]
            url = "ws://draft.example.net/ws/5"

            [clock]
            sync_interval_secs = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = parse_str("not toml [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load(Path::new("/nonexistent/draftroom.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
