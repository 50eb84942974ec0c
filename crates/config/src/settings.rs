// Application settings
// Loaded from ~/.config/tabletalk/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default service origin when nothing is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Environment variable that overrides the configured service origin.
pub const API_BASE_ENV: &str = "TABLETALK_API_BASE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Query-service origin, e.g. "http://localhost:8000"
    pub api_base: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Settings {
    /// Path to the settings file.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|c| c.join("tabletalk/settings.json"))
    }

    /// Load settings from disk, falling back to defaults on any problem.
    /// Unknown or missing fields do not fail the load.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk, creating the parent directory if needed.
    pub fn save(&self) -> Result<(), String> {
        let path = Self::path().ok_or("Could not determine config directory")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        fs::write(&path, contents).map_err(|e| format!("Failed to write settings: {}", e))
    }

    /// Effective service origin: env override wins over the settings file.
    pub fn effective_api_base(&self) -> String {
        match std::env::var(API_BASE_ENV) {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => self.api_base.clone(),
        }
    }
}
