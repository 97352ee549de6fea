use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::forecast::{DEFAULT_OFFSET_MINUTES, ForecastAggregator};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REFRESH_SECS: u64 = 5 * 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const DEFAULT_CITIES: &[&str] = &["Dehradun", "Jaipur", "Mumbai", "Kolkata", "Chennai", "Delhi"];

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "http://127.0.0.1:5000"
/// default_city = "Jaipur"
/// cities = ["Jaipur", "Delhi"]
/// refresh_interval_secs = 300
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root URL of the dashboard backend.
    pub base_url: String,

    /// City selected at startup; the first entry of `cities` when absent.
    pub default_city: Option<String>,

    pub cities: Vec<String>,

    pub refresh_interval_secs: u64,

    pub request_timeout_secs: u64,

    /// Offset from UTC, in minutes, used to split the forecast into days.
    pub display_offset_minutes: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_city: None,
            cities: DEFAULT_CITIES.iter().map(|c| c.to_string()).collect(),
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            display_offset_minutes: DEFAULT_OFFSET_MINUTES,
        }
    }
}

impl Config {
    /// Match `name` against the configured cities, ignoring case.
    /// Returns the configured spelling.
    pub fn resolve_city(&self, name: &str) -> Result<String> {
        let wanted = name.trim().to_lowercase();

        self.cities
            .iter()
            .find(|c| c.to_lowercase() == wanted)
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "Unknown city '{}'. Configured cities: {}.\n\
                     Hint: add it to `cities` in {}.",
                    name.trim(),
                    self.cities.join(", "),
                    Self::config_file_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "the config file".to_string()),
                )
            })
    }

    /// City to start with: an explicit override, else `default_city`, else the first city.
    pub fn selected_city(&self, requested: Option<&str>) -> Result<String> {
        if let Some(name) = requested.or(self.default_city.as_deref()) {
            return self.resolve_city(name);
        }

        self.cities.first().cloned().ok_or_else(|| {
            anyhow!(
                "No cities configured.\n\
                 Hint: run `weather-dashboard configure` or add `cities` to the config file."
            )
        })
    }

    pub fn set_default_city(&mut self, name: &str) -> Result<()> {
        self.default_city = Some(self.resolve_city(name)?);
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn aggregator(&self) -> Result<ForecastAggregator> {
        ForecastAggregator::from_offset_minutes(self.display_offset_minutes).ok_or_else(|| {
            anyhow!(
                "display_offset_minutes = {} is out of range (must be within ±1439).",
                self.display_offset_minutes
            )
        })
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

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

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the preferences file (theme).
    pub fn preferences_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("preferences.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_backend() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.cities.len(), 6);
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(300));
        assert_eq!(cfg.aggregator().unwrap().zone_label(), "IST");
    }

    #[test]
    fn resolve_city_ignores_case() {
        let cfg = Config::default();
        assert_eq!(cfg.resolve_city("mumbai").unwrap(), "Mumbai");
        assert_eq!(cfg.resolve_city("  DELHI ").unwrap(), "Delhi");
    }

    #[test]
    fn unknown_city_error() {
        let err = Config::default().resolve_city("Atlantis").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown city 'Atlantis'"));
        assert!(msg.contains("Jaipur"));
    }

    #[test]
    fn selected_city_prefers_override_then_default_then_first() {
        let mut cfg = Config::default();
        assert_eq!(cfg.selected_city(None).unwrap(), "Dehradun");

        cfg.set_default_city("chennai").unwrap();
        assert_eq!(cfg.default_city.as_deref(), Some("Chennai"));
        assert_eq!(cfg.selected_city(None).unwrap(), "Chennai");
        assert_eq!(cfg.selected_city(Some("kolkata")).unwrap(), "Kolkata");
    }

    #[test]
    fn selected_city_errors_when_no_cities() {
        let cfg = Config { cities: Vec::new(), ..Config::default() };
        let err = cfg.selected_city(None).unwrap_err();
        assert!(err.to_string().contains("No cities configured"));
    }

    #[test]
    fn set_default_city_rejects_unknown() {
        let mut cfg = Config::default();
        assert!(cfg.set_default_city("Gotham").is_err());
        assert!(cfg.default_city.is_none());
    }

    #[test]
    fn bad_offset_is_reported() {
        let cfg = Config { display_offset_minutes: 2000, ..Config::default() };
        assert!(cfg.aggregator().unwrap_err().to_string().contains("display_offset_minutes"));
    }

    #[test]
    fn overflowing_offset_is_reported() {
        let cfg = Config { display_offset_minutes: 100_000_000, ..Config::default() };
        let err = cfg.aggregator().unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = \"http://weather.local:8080\"\ndefault_city = \"Jaipur\"\n")
            .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.base_url, "http://weather.local:8080");
        assert_eq!(cfg.default_city.as_deref(), Some("Jaipur"));
        assert_eq!(cfg.refresh_interval_secs, DEFAULT_REFRESH_SECS);
        assert_eq!(cfg.cities.len(), 6);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_default_city("Delhi").unwrap();
        cfg.refresh_interval_secs = 60;
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
