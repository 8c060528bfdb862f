use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Environment variable that overrides the stored app id.
pub const APP_ID_ENV: &str = "WEATHER_APP_ID";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// When the widget drops its loading indicator after issuing a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadingRelease {
    /// Once the newest request has settled.
    #[default]
    OnSettle,
    /// Immediately after the request is issued, while it is still in flight.
    OnIssue,
}

/// Widget configuration, read once at startup and handed to the widget.
///
/// Example TOML:
/// ```toml
/// app_id = "..."
/// base_url = "https://api.openweathermap.org/data/2.5"
/// loading_release = "on-settle"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather application identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub loading_release: LoadingRelease,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: None,
            base_url: default_base_url(),
            loading_release: LoadingRelease::default(),
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = Self::load_from(&path)?;
        Ok(cfg.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Replace file values with any set in the environment.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(app_id) = lookup(APP_ID_ENV).filter(|v| !v.trim().is_empty()) {
            self.app_id = Some(app_id);
        }
        self
    }

    /// Save config to the platform config directory.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-widget", "weather-widget")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The configured app id, or an error hinting how to set one.
    pub fn app_id(&self) -> Result<&str> {
        self.app_id.as_deref().ok_or_else(|| {
            anyhow!(
                "No OpenWeather app id configured.\n\
                 Hint: run `weather-widget configure` or set {APP_ID_ENV}."
            )
        })
    }

    pub fn set_app_id(&mut self, app_id: String) {
        self.app_id = Some(app_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_id_errors_with_hint_when_missing() {
        let cfg = Config::default();
        let msg = cfg.app_id().unwrap_err().to_string();

        assert!(msg.contains("No OpenWeather app id configured"));
        assert!(msg.contains("weather-widget configure"));
        assert!(msg.contains(APP_ID_ENV));
    }

    #[test]
    fn env_override_beats_file_value() {
        let mut cfg = Config::default();
        cfg.set_app_id("FROM_FILE".into());

        let cfg = cfg.with_env_overrides(|key| {
            (key == APP_ID_ENV).then(|| "FROM_ENV".to_string())
        });

        assert_eq!(cfg.app_id().expect("app id must exist"), "FROM_ENV");
    }

    #[test]
    fn blank_env_value_is_ignored() {
        let mut cfg = Config::default();
        cfg.set_app_id("FROM_FILE".into());

        let cfg = cfg.with_env_overrides(|_| Some("  ".to_string()));

        assert_eq!(cfg.app_id().expect("app id must exist"), "FROM_FILE");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("defaults");

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.loading_release, LoadingRelease::OnSettle);
    }

    #[test]
    fn save_then_load_from_same_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_app_id("KEY".into());
        cfg.loading_release = LoadingRelease::OnIssue;
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "loading_release = \"on-issue\"\n").expect("write");

        let cfg = Config::load_from(&path).expect("load");
        assert_eq!(cfg.app_id, None);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.loading_release, LoadingRelease::OnIssue);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "app_id = [").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
