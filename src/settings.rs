//! Simulation settings
//!
//! Timing and rules knobs for the battle simulation, persisted as RON.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::battle::turn::TurnComponent;

/// Default location of the settings file
pub const SETTINGS_PATH: &str = "settings.ron";

/// What a combatant must have done before its turn can end
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnCompletionRule {
    /// Moving ends the turn; using a skill is optional
    #[default]
    MoveOnly,
    /// Both a move and a skill are required
    MoveAndSkill,
}

impl TurnCompletionRule {
    pub fn is_complete(&self, turn: &TurnComponent) -> bool {
        match self {
            TurnCompletionRule::MoveOnly => turn.has_moved,
            TurnCompletionRule::MoveAndSkill => turn.has_moved && turn.has_used_skill,
        }
    }
}

/// Battle simulation settings
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Longest slice of simulated time a single battle step may cover
    pub dt_max: f32,
    /// Pause after a walk or skill finishes before the turn may advance
    pub turn_transition_delay: f32,
    /// Seconds a defeated combatant stays on the field
    pub death_timer: f32,
    /// Walking speed in world units per second
    pub move_speed: f32,
    /// Longest walk a mob takes in one turn, in tiles
    pub mob_move_tiles: usize,
    pub turn_completion: TurnCompletionRule,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            dt_max: 1.0 / 60.0,
            turn_transition_delay: 1.2,
            death_timer: 1.5,
            move_speed: 300.0,
            mob_move_tiles: 6,
            turn_completion: TurnCompletionRule::MoveOnly,
        }
    }
}

impl SimulationSettings {
    /// Load settings from `path`, or return defaults if the file doesn't exist
    /// or can't be used
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }

        let settings = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file: {}", e))
            .and_then(|contents| {
                ron::from_str::<SimulationSettings>(&contents)
                    .map_err(|e| format!("Failed to parse settings file: {}", e))
            })
            .and_then(|settings| settings.validate().map(|_| settings));

        match settings {
            Ok(settings) => {
                info!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, contents)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.dt_max <= 0.0 {
            return Err(format!("dt_max must be positive, got {}", self.dt_max));
        }
        if self.move_speed <= 0.0 {
            return Err(format!("move_speed must be positive, got {}", self.move_speed));
        }
        if self.turn_transition_delay < 0.0 || self.death_timer < 0.0 {
            return Err("delays cannot be negative".to_string());
        }
        Ok(())
    }
}
