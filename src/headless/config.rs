//! JSON configuration parsing for headless mode

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::battle::skills::catalog::CHARACTERS_CONFIG_PATH;
use crate::settings::TurnCompletionRule;

/// Headless battle configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessBattleConfig {
    /// Level file to fight on
    pub level: String,
    /// Save file whose skill levels apply to the players
    #[serde(default)]
    pub save: Option<String>,
    /// Character catalog (default: assets/config/characters.ron)
    #[serde(default = "default_characters")]
    pub characters: String,
    /// Random seed for deterministic battle reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Maximum battle duration in seconds (default: 600)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Custom output path for the battle log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Write the battle log when the battle ends (default: true)
    #[serde(default = "default_true")]
    pub write_log: bool,
    /// Overrides the turn completion rule from the settings file
    #[serde(default)]
    pub turn_completion: Option<TurnCompletionRule>,
    /// Players pick their own actions (default: true)
    #[serde(default = "default_true")]
    pub autopilot: bool,
}

fn default_characters() -> String {
    CHARACTERS_CONFIG_PATH.to_string()
}

fn default_max_duration() -> f32 {
    600.0
}

fn default_true() -> bool {
    true
}

impl HeadlessBattleConfig {
    /// Config for `level` with every other option at its default
    pub fn for_level(level: &str) -> Self {
        Self {
            level: level.to_string(),
            save: None,
            characters: default_characters(),
            random_seed: None,
            max_duration_secs: default_max_duration(),
            output_path: None,
            write_log: true,
            turn_completion: None,
            autopilot: true,
        }
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: HeadlessBattleConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.level.is_empty() {
            return Err("level must name a level file".to_string());
        }
        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }
        Ok(())
    }
}
