use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::{Path, PathBuf}};

use crate::alert::{AlertSettings, DEFAULT_THRESHOLD_C};

pub const DEFAULT_CITIES: &[&str] = &["Delhi", "Mumbai", "Chennai", "Bangalore", "Kolkata", "Hyderabad"];

pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// cities = ["Delhi", "Mumbai"]
/// timezone = "Asia/Kolkata"
/// default_threshold = 35.0
///
/// [thresholds]
/// Delhi = 40.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    pub cities: Vec<String>,

    /// IANA zone name used for day boundaries, e.g. "Asia/Kolkata".
    pub timezone: String,

    pub default_threshold: f64,

    /// Overrides the platform data directory location of the SQLite file.
    pub database_path: Option<PathBuf>,

    /// Per-city overrides of `default_threshold`.
    pub thresholds: HashMap<String, f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            cities: DEFAULT_CITIES.iter().map(|c| c.to_string()).collect(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            default_threshold: DEFAULT_THRESHOLD_C,
            database_path: None,
            thresholds: HashMap::new(),
        }
    }
}

impl Config {
    /// Returns the API key, or an error with a hint on how to set it.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weather-monitor configure` and enter your API key."
            )
        })
    }

    /// Parses the configured timezone name.
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            anyhow!(
                "Unknown timezone '{}' in configuration.\n\
                 Hint: use an IANA name such as \"Asia/Kolkata\" or \"UTC\".",
                self.timezone
            )
        })
    }

    pub fn threshold_for(&self, city: &str) -> f64 {
        self.thresholds
            .get(city)
            .copied()
            .unwrap_or(self.default_threshold)
    }

    pub fn set_threshold(&mut self, city: impl Into<String>, threshold: f64) {
        self.thresholds.insert(city.into(), threshold);
    }

    pub fn alert_settings(&self) -> AlertSettings {
        AlertSettings {
            cities: self.cities.clone(),
            default_threshold: self.default_threshold,
            thresholds: self.thresholds.clone(),
        }
    }

    /// Checks values that serde cannot: known timezone, sane thresholds, no empty city names.
    pub fn validate(&self) -> Result<()> {
        self.timezone()?;

        if self.cities.iter().any(|c| c.trim().is_empty()) {
            return Err(anyhow!("Configured city list contains an empty name"));
        }
        if !self.default_threshold.is_finite() {
            return Err(anyhow!("default_threshold must be a finite number"));
        }
        if let Some((city, t)) = self.thresholds.iter().find(|(_, t)| !t.is_finite()) {
            return Err(anyhow!("Threshold for '{city}' must be a finite number, got {t}"));
        }

        Ok(())
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

        cfg.validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

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

        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the observation database, honouring `database_path`.
    pub fn database_file_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join("observations.db")),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-monitor", "weather-monitor")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
