//! Application configuration
//!
//! JSON file under the user config dir. Missing file → defaults are written
//! out; missing keys → per-field defaults; out-of-range values are clamped.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::Preferences;
use crate::constants;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Desktop build: lifts project/template ceilings
    #[serde(default)]
    pub privileged: bool,
    #[serde(default = "default_project_sync_ms")]
    pub project_sync_ms: u64,
    #[serde(default = "default_tab_order_sync_ms")]
    pub tab_order_sync_ms: u64,
    #[serde(default = "default_max_projects")]
    pub max_projects: usize,
    #[serde(default = "default_max_templates")]
    pub max_templates: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub preferences: Preferences,
}

fn default_project_sync_ms() -> u64 {
    constants::debounce::PROJECT_SYNC_MS
}

fn default_tab_order_sync_ms() -> u64 {
    constants::debounce::TAB_ORDER_SYNC_MS
}

fn default_max_projects() -> usize {
    constants::limits::MAX_PROJECTS
}

fn default_max_templates() -> usize {
    constants::limits::MAX_TEMPLATES
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            privileged: false,
            project_sync_ms: default_project_sync_ms(),
            tab_order_sync_ms: default_tab_order_sync_ms(),
            max_projects: default_max_projects(),
            max_templates: default_max_templates(),
            log_level: default_log_level(),
            preferences: Preferences::default(),
        }
    }
}

impl AppConfig {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(constants::config::APP_DIR);
        path.push(constants::config::FILENAME);
        path
    }

    /// Load from the default location, creating it when absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, creating default config");
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let mut config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?;

        config.validate_and_clamp();
        info!(path = %path.display(), privileged = config.privileged, "Loaded config");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        fs::write(path, json).with_context(|| format!("Failed to write config to {:?}", path))?;

        info!(path = %path.display(), "Saved config");
        Ok(())
    }

    pub fn project_sync_window(&self) -> Duration {
        Duration::from_millis(self.project_sync_ms)
    }

    pub fn tab_order_sync_window(&self) -> Duration {
        Duration::from_millis(self.tab_order_sync_ms)
    }

    /// Clamp values to safe ranges after loading
    fn validate_and_clamp(&mut self) {
        use constants::validation::*;

        for (name, value, fallback) in [
            ("project_sync_ms", &mut self.project_sync_ms, default_project_sync_ms()),
            ("tab_order_sync_ms", &mut self.tab_order_sync_ms, default_tab_order_sync_ms()),
        ] {
            if *value < MIN_DEBOUNCE_MS {
                warn!(field = name, value = *value, using = fallback, "Debounce window below minimum, using default");
                *value = fallback;
            } else if *value > MAX_DEBOUNCE_MS {
                warn!(field = name, value = *value, max = MAX_DEBOUNCE_MS, "Debounce window exceeds maximum, clamping");
                *value = MAX_DEBOUNCE_MS;
            }
        }

        let font_size = &mut self.preferences.preview_font_size;
        if *font_size < MIN_FONT_SIZE || *font_size > MAX_FONT_SIZE {
            let clamped = (*font_size).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
            warn!(preview_font_size = *font_size, clamped, "preview_font_size out of range, clamping");
            *font_size = clamped;
        }
    }
}
