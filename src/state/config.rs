/// Application settings
///
/// Settings are read once at startup from a TOML file. Every field has a
/// default, so a missing file or a partial file both work.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::data::Coordinates;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("page_size must be at least 1")]
    ZeroPageSize,
}

/// Color scheme of the window
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Light,
    Dark,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Photos revealed per batch in grid mode
    pub page_size: usize,
    /// Delay before the one-shot automatic reveal after a feed change
    pub reveal_delay_ms: u64,
    /// Relative scroll offset (0.0 to 1.0) at which the trailing sentinel
    /// counts as visible
    pub sentinel_threshold: f32,
    pub theme: ThemeChoice,
    /// Tab shown at startup; unknown names fall back to "newest"
    pub default_tab: String,
    /// Photo catalog (JSON). Falls back to the built-in demo collection
    /// when unset or unreadable.
    pub catalog: Option<PathBuf>,
    pub geolocation: GeolocationConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Upper bound on a single location request
    pub timeout_ms: u64,
    /// How long a previous fix may be reused by the provider
    pub max_age_ms: u64,
    /// Whether the user allows the app to read their location
    pub permission_granted: bool,
    /// Home position reported by the configured provider
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 9,
            reveal_delay_ms: 3000,
            sentinel_threshold: 0.95,
            theme: ThemeChoice::Light,
            default_tab: "newest".to_string(),
            catalog: None,
            geolocation: GeolocationConfig::default(),
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_age_ms: 60_000,
            permission_granted: true,
            latitude: None,
            longitude: None,
        }
    }
}

impl Config {
    /// Get the path where settings are stored
    ///
    /// - Linux: ~/.config/lumina/config.toml
    /// - macOS: ~/Library/Application Support/lumina/config.toml
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("lumina");
        path.push("config.toml");
        Some(path)
    }

    /// Read settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

impl GeolocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }

    /// Configured home position, if both halves are set
    pub fn home(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.page_size, 9);
        assert_eq!(config.default_tab, "newest");
        assert_eq!(config.reveal_delay(), Duration::from_secs(3));
        assert_eq!(config.geolocation.timeout(), Duration::from_secs(5));
        assert_eq!(config.geolocation.max_age(), Duration::from_secs(60));
        assert!(config.geolocation.home().is_none());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml(
            r#"
            page_size = 12
            theme = "dark"

            [geolocation]
            latitude = 48.85
            longitude = 2.35
            "#,
        )
        .unwrap();

        assert_eq!(config.page_size, 12);
        assert_eq!(config.theme, ThemeChoice::Dark);
        assert_eq!(config.reveal_delay_ms, 3000);
        assert_eq!(config.geolocation.home(), Some(Coordinates::new(48.85, 2.35)));
        assert!(config.geolocation.permission_granted);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let path = std::env::temp_dir().join(format!("lumina-config-{}.toml", std::process::id()));
        std::fs::write(&path, "page_size = 0\n").unwrap();

        let result = Config::load(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::ZeroPageSize)));
    }

    #[test]
    fn test_unknown_theme_rejected() {
        assert!(Config::from_toml(r#"theme = "sepia""#).is_err());
    }
}
