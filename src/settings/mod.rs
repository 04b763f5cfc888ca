use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::mutate::{MutationError, Weights};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON file with the unit's parameter tables
    pub tables_path: String,
    /// Relative weights as "enable,reorder,value,assign"
    pub weights: String,
    /// Mutations applied per patch
    pub mutations: usize,
    /// Patches generated by one `rand` run
    pub count: usize,
    /// Effects never touched unless named explicitly
    pub fx_ignore: Vec<String>,
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "------------------------------")?;
        writeln!(f, "Tables: {}", self.tables_path)?;
        writeln!(f, "Weights: {}", self.weights)?;
        writeln!(f, "Mutations: {}", self.mutations)?;
        writeln!(f, "Count: {}", self.count)?;
        writeln!(f, "Ignored FX: {}", self.fx_ignore.join(","))?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tables_path: "./tables.json".to_string(),
            weights: Weights::default().to_string(),
            mutations: 10,
            count: 64,
            fx_ignore: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path();

        if settings_path.exists() {
            let contents =
                fs::read_to_string(&settings_path).context("Failed to read settings file")?;
            let settings: Settings =
                serde_json::from_str(&contents).context("Failed to parse settings")?;
            debug!("Loaded settings from {:?}", settings_path);
            Ok(settings)
        } else {
            info!("No settings file found, using defaults");
            let settings = Settings::default();
            // Try to save defaults, but don't fail if we can't
            let _ = settings.save();
            Ok(settings)
        }
    }

    pub fn save(&self) -> Result<()> {
        let settings_path = Self::get_settings_path();

        if let Some(parent) = settings_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(&settings_path, json).context("Failed to write settings file")?;

        debug!("Saved settings to {:?}", settings_path);
        Ok(())
    }

    pub fn weights(&self) -> Result<Weights, MutationError> {
        self.weights.parse()
    }

    fn get_settings_path() -> PathBuf {
        const SETTINGS_FILENAME: &str = "settings.json";

        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(config_dir)
                .join("patch-rando")
                .join(SETTINGS_FILENAME)
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("patch-rando")
                .join(SETTINGS_FILENAME)
        } else {
            PathBuf::from(".").join(SETTINGS_FILENAME)
        }
    }
}
