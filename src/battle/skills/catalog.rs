//! Data-driven character definitions
//!
//! Base stats, body size and skills of every character are defined in
//! `assets/config/characters.ron` rather than in code, so balance changes
//! don't require recompilation.
//!
//! ```ignore
//! fn my_system(characters: Res<CharacterDefinitions>) {
//!     let egg = characters.get_unchecked(&CharacterKind::Egg);
//!     println!("Egg starts with {} HP", egg.hp);
//! }
//! ```

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::skill::Skill;
use super::SkillType;
use crate::battle::components::{CharacterKind, CollisionGroup};

/// Default location of the character catalog
pub const CHARACTERS_CONFIG_PATH: &str = "assets/config/characters.ron";

fn default_strength() -> f32 {
    1.0
}

/// A skill slot and its upgrade levels, lowest first
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillSlot {
    pub slot: SkillType,
    pub levels: Vec<Skill>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CharacterDefinition {
    pub hp: f32,
    #[serde(default = "default_strength")]
    pub strength: f32,
    /// Ambrosia dropped on defeat (mobs) or carried (players)
    #[serde(default)]
    pub ambrosia: f32,
    /// Body width and height in world units
    pub size: (f32, f32),
    pub group: CollisionGroup,
    /// Immune to stuns
    #[serde(default)]
    pub cc_immune: bool,
    pub skills: Vec<SkillSlot>,
}

impl CharacterDefinition {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.size.0, self.size.1)
    }

    fn validate(&self) -> Result<(), String> {
        if self.hp <= 0.0 {
            return Err(format!("hp must be positive, got {}", self.hp));
        }
        if self.size.0 <= 0.0 || self.size.1 <= 0.0 {
            return Err(format!("size must be positive, got {:?}", self.size));
        }
        for slot in &self.skills {
            if slot.slot == SkillType::None {
                return Err("skill in the None slot".to_string());
            }
            if slot.levels.is_empty() {
                return Err(format!("{:?} has no levels", slot.slot));
            }
            for (i, skill) in slot.levels.iter().enumerate() {
                skill
                    .validate()
                    .map_err(|e| format!("{:?} level {}: {}", slot.slot, i + 1, e))?;
            }
        }
        Ok(())
    }
}

/// Root structure for the characters.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct CharactersConfig {
    pub characters: HashMap<CharacterKind, CharacterDefinition>,
}

/// Resource holding every character definition.
///
/// Loaded at startup; access via `Res<CharacterDefinitions>`.
#[derive(Resource, Debug)]
pub struct CharacterDefinitions {
    definitions: HashMap<CharacterKind, CharacterDefinition>,
}

impl CharacterDefinitions {
    pub fn new(config: CharactersConfig) -> Self {
        Self {
            definitions: config.characters,
        }
    }

    pub fn get(&self, kind: &CharacterKind) -> Option<&CharacterDefinition> {
        self.definitions.get(kind)
    }

    /// Get the definition for a character, panicking if not found.
    /// Use this when the kind must exist (validated at startup).
    pub fn get_unchecked(&self, kind: &CharacterKind) -> &CharacterDefinition {
        self.definitions
            .get(kind)
            .unwrap_or_else(|| panic!("Character {:?} not found in definitions", kind))
    }

    /// Check that every character is defined and every definition is sane
    pub fn validate(&self) -> Result<(), String> {
        let missing: Vec<CharacterKind> = CharacterKind::PLAYERS
            .into_iter()
            .chain(CharacterKind::MOBS)
            .filter(|kind| !self.definitions.contains_key(kind))
            .collect();
        if !missing.is_empty() {
            return Err(format!("Missing character definitions: {:?}", missing));
        }

        for (kind, definition) in &self.definitions {
            definition
                .validate()
                .map_err(|e| format!("{}: {}", kind.name(), e))?;
        }
        Ok(())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &CharacterKind> {
        self.definitions.keys()
    }
}

/// Parse and validate a character catalog
pub fn parse_character_definitions(contents: &str) -> Result<CharacterDefinitions, String> {
    let config: CharactersConfig =
        ron::from_str(contents).map_err(|e| format!("Failed to parse characters: {}", e))?;
    let definitions = CharacterDefinitions::new(config);
    definitions.validate()?;
    Ok(definitions)
}

/// Load character definitions from a RON file
pub fn load_character_definitions(path: &str) -> Result<CharacterDefinitions, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let definitions =
        parse_character_definitions(&contents).map_err(|e| format!("{}: {}", path, e))?;

    info!(
        "Loaded {} character definitions from {}",
        definitions.definitions.len(),
        path
    );
    Ok(definitions)
}
