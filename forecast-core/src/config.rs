use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::units::TemperatureUnit;

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "FORECAST_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_ICON_BASE_URL: &str = "https://openweathermap.org/img/wn/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// HTTP settings for the weather client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix for condition icons; the icon code and `@2x.png` are appended.
    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_icon_base_url() -> String {
    DEFAULT_ICON_BASE_URL.to_string()
}

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            icon_base_url: default_icon_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ClientSettings {
    /// Icon URL under the configured `icon_base_url`.
    pub fn icon_url(&self, icon_code: &str) -> String {
        crate::provider::openweather::icon_url_with_base(&self.icon_base_url, icon_code)
    }
}

/// Where the forecast history lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Overrides the platform data directory.
    pub database_path: Option<PathBuf>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// unit = "fahrenheit"
///
/// [client]
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,

    #[serde(default)]
    pub unit: TemperatureUnit,

    #[serde(default)]
    pub client: ClientSettings,

    #[serde(default)]
    pub history: HistorySettings,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "forecast", "forecast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// History database path: the configured override or the platform data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.history.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("history.sqlite3")),
        }
    }

    /// Replace the stored API key.
    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// API key from the environment, falling back to the stored one. Blank keys count as absent.
    pub fn api_key(&self) -> Option<String> {
        Self::resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    fn resolve_api_key(env: Option<String>, stored: Option<&str>) -> Option<String> {
        env.filter(|k| !k.trim().is_empty())
            .or_else(|| stored.filter(|k| !k.trim().is_empty()).map(str::to_owned))
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = Config::from_toml("").expect("empty config must parse");

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.client.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.client.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.unit, TemperatureUnit::Celsius);
    }

    #[test]
    fn partial_client_section_keeps_other_defaults() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"
            unit = "fahrenheit"

            [client]
            timeout_secs = 3
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.unit, TemperatureUnit::Fahrenheit);
        assert_eq!(cfg.client.timeout_secs, 3);
        assert_eq!(cfg.client.icon_base_url, DEFAULT_ICON_BASE_URL);
    }

    #[test]
    fn icon_url_uses_configured_base() {
        assert_eq!(
            ClientSettings::default().icon_url("10d"),
            "https://openweathermap.org/img/wn/10d@2x.png"
        );

        let settings = ClientSettings { icon_base_url: "http://127.0.0.1:9/img/".into(), ..Default::default() };
        assert_eq!(settings.icon_url("01n"), "http://127.0.0.1:9/img/01n@2x.png");
    }

    #[test]
    fn toml_roundtrip_preserves_settings() {
        let mut cfg = Config::default();
        cfg.set_api_key("  OPEN_KEY ".into());
        cfg.history.database_path = Some(PathBuf::from("/tmp/history.sqlite3"));

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let back = Config::from_toml(&text).expect("parse");

        assert_eq!(back, cfg);
        assert_eq!(back.api_key.as_deref(), Some("OPEN_KEY"));
    }

    #[test]
    fn env_key_takes_precedence() {
        let key = Config::resolve_api_key(Some("ENV".into()), Some("STORED"));
        assert_eq!(key.as_deref(), Some("ENV"));
    }

    #[test]
    fn blank_keys_are_ignored() {
        assert_eq!(Config::resolve_api_key(Some("  ".into()), Some("STORED")).as_deref(), Some("STORED"));
        assert_eq!(Config::resolve_api_key(None, Some("")), None);
        assert_eq!(Config::resolve_api_key(None, None), None);
    }

    #[test]
    fn database_path_override_wins() {
        let mut cfg = Config::default();
        cfg.history.database_path = Some(PathBuf::from("/data/h.sqlite3"));

        assert_eq!(cfg.database_path().expect("path"), PathBuf::from("/data/h.sqlite3"));
    }
}
