//! File locations used by the CLI.
//!
//! Resolution order, last wins: built-in defaults, YAML config file
//! (`--config` / `PFA_CONFIG`), then `--catalog` / `--people` flags or their
//! environment variables.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Asset catalog (risk scores, scenario returns).
    pub catalog: PathBuf,
    /// People file: JSON array of person records.
    pub people: PathBuf,
    /// Sector breakdown for the sector fan-out.
    pub sector_config: PathBuf,
    /// Risk profile survey questions.
    pub survey: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("data/asset_info.json"),
            people: PathBuf::from("data/people.json"),
            sector_config: PathBuf::from("data/us_sector_config.json"),
            survey: PathBuf::from("data/risk_survey.json"),
        }
    }
}

impl Settings {
    /// Load settings from an optional YAML file; missing keys keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
        let settings: Settings = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config '{}': {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), ?settings, "loaded config");
        Ok(settings)
    }

    pub fn with_overrides(mut self, catalog: Option<PathBuf>, people: Option<PathBuf>) -> Self {
        if let Some(catalog) = catalog {
            self.catalog = catalog;
        }
        if let Some(people) = people {
            self.people = people;
        }
        self
    }
}
