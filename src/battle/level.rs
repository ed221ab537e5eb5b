//! Level and save files
//!
//! Both are JSON. A level holds the walkability grid and the spawn list; a
//! save holds campaign progress, of which the battle only reads skill levels.
//!
//! ## Level format
//!
//! ```json
//! {
//!   "name": "kitchen",
//!   "map": { "tile_size": 64.0, "grid": [[3, 3, 0], [3, 3, 3]] },
//!   "players": [{ "kind": "Raoul", "position": [64.0, 64.0] }],
//!   "mobs": [{ "kind": "Egg", "position": [128.0, 0.0], "hp": 40.0 }]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::components::{
    ActiveFx, Animated, CcImmunity, CharacterKind, Collider, MapGrid, MobComponent, Motion,
    PlayerComponent,
};
use super::skills::{CharacterDefinitions, SkillComponent, SkillType};
use super::stats::{StatType, StatsComponent};
use super::turn::TurnComponent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub tile_size: f32,
    /// Row-major cell values; 3 is walkable
    pub grid: Vec<Vec<i32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSpawn {
    pub kind: CharacterKind,
    pub position: [f32; 2],
}

/// A mob and its per-level stat overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobSpawn {
    pub kind: CharacterKind,
    pub position: [f32; 2],
    #[serde(default)]
    pub hp: Option<f32>,
    #[serde(default)]
    pub strength: Option<f32>,
    #[serde(default)]
    pub ambrosia: Option<f32>,
    #[serde(default)]
    pub max_num_ult: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    pub map: MapConfig,
    pub players: Vec<PlayerSpawn>,
    pub mobs: Vec<MobSpawn>,
}

impl LevelConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read level file {:?}: {}", path, e))?;
        Self::from_json(&contents).map_err(|e| format!("{:?}: {}", path, e))
    }

    pub fn from_json(contents: &str) -> Result<Self, String> {
        let level: LevelConfig =
            serde_json::from_str(contents).map_err(|e| format!("Failed to parse level: {}", e))?;
        level.validate()?;
        Ok(level)
    }

    pub fn map_grid(&self) -> Result<MapGrid, String> {
        MapGrid::new(self.map.tile_size, self.map.grid.clone())
    }

    fn validate(&self) -> Result<(), String> {
        let map = self.map_grid()?;

        if self.players.is_empty() {
            return Err("level has no players".to_string());
        }
        for player in &self.players {
            if !player.kind.is_player() {
                return Err(format!("{:?} is not a player character", player.kind));
            }
        }
        for mob in &self.mobs {
            if mob.kind.is_player() {
                return Err(format!("{:?} cannot spawn as a mob", mob.kind));
            }
            if mob.hp.is_some_and(|hp| hp <= 0.0) {
                return Err(format!("{:?} must spawn with positive hp", mob.kind));
            }
        }

        let spawns = self
            .players
            .iter()
            .map(|p| (p.kind, p.position))
            .chain(self.mobs.iter().map(|m| (m.kind, m.position)));
        for (kind, position) in spawns {
            let cell = map.world_to_cell(Vec2::from_array(position));
            if !map.is_walkable_tile(cell) {
                return Err(format!(
                    "{:?} spawns on unwalkable cell {:?}",
                    kind, cell
                ));
            }
        }
        Ok(())
    }
}

/// Saved progress of one player character
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterProgress {
    pub level: u32,
    /// Current level of each skill slot
    #[serde(default)]
    pub skills: BTreeMap<SkillType, u32>,
}

/// Campaign save. Battles always start fresh; nothing mid-battle is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub recipe: String,
    pub level: u32,
    #[serde(default)]
    pub ambrosia: f32,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub skill_levels: BTreeMap<CharacterKind, CharacterProgress>,
}

impl SaveData {
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read save file {:?}: {}", path, e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse save file: {}", e))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize save: {}", e))?;
        std::fs::write(path, contents).map_err(|e| format!("Failed to write {:?}: {}", path, e))
    }
}

/// Build a combatant's skill catalog from its definition
fn skills_for(
    entity: Entity,
    kind: CharacterKind,
    definitions: &CharacterDefinitions,
) -> Result<SkillComponent, String> {
    let definition = definitions
        .get(&kind)
        .ok_or_else(|| format!("No definition for {:?}", kind))?;
    let mut skills = SkillComponent::new();
    for slot in &definition.skills {
        skills.add_skill(slot.slot, entity, &slot.levels)?;
    }
    Ok(skills)
}

/// Spawn the level's map and combatants into `world`.
///
/// Spawn positions snap to the centre of their cell. Returns the spawned
/// players followed by the spawned mobs.
pub fn spawn_level(
    world: &mut World,
    level: &LevelConfig,
    definitions: &CharacterDefinitions,
    save: Option<&SaveData>,
) -> Result<Vec<Entity>, String> {
    let map = level.map_grid()?;
    let snap = |position: [f32; 2]| map.cell_to_world(map.world_to_cell(Vec2::from_array(position)));

    let spawns = level
        .players
        .iter()
        .map(|p| (p.kind, p.position, None))
        .chain(level.mobs.iter().map(|m| (m.kind, m.position, Some(m))));

    let mut spawned = Vec::new();
    for (kind, position, mob) in spawns {
        let definition = definitions
            .get(&kind)
            .ok_or_else(|| format!("No definition for {:?}", kind))?;

        let mut stats = StatsComponent::for_combatant(
            mob.and_then(|m| m.hp).unwrap_or(definition.hp),
            mob.and_then(|m| m.strength).unwrap_or(definition.strength),
        );
        stats.set_base_value(
            StatType::Ambrosia,
            mob.and_then(|m| m.ambrosia).unwrap_or(definition.ambrosia),
        );
        if let Some(max_num_ult) = mob.and_then(|m| m.max_num_ult) {
            stats.set_base_value(StatType::NumUltLeft, max_num_ult);
        }

        let entity = world
            .spawn((
                Name::new(kind.name()),
                Motion::new(snap(position), definition.size()),
                Collider(definition.group),
                stats,
                TurnComponent::default(),
                Animated::default(),
                ActiveFx::default(),
            ))
            .id();

        let mut skills = skills_for(entity, kind, definitions)?;
        let progress = save.and_then(|save| save.skill_levels.get(&kind));
        if let Some(progress) = progress {
            skills.set_skill_levels(&progress.skills);
        }

        let mut entity_mut = world.entity_mut(entity);
        entity_mut.insert(skills);
        if definition.cc_immune {
            entity_mut.insert(CcImmunity);
        }
        if kind.is_player() {
            entity_mut.insert(PlayerComponent { kind });
            if let Some(progress) = progress {
                if let Some(mut stats) = entity_mut.get_mut::<StatsComponent>() {
                    stats.set_base_value(StatType::Level, progress.level.max(1) as f32);
                }
            }
        } else {
            entity_mut.insert(MobComponent { kind });
        }
        spawned.push(entity);
    }

    info!(
        "Spawned level '{}': {} player(s), {} mob(s)",
        level.name,
        level.players.len(),
        level.mobs.len()
    );
    world.insert_resource(map);
    Ok(spawned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"{
        "name": "test",
        "map": { "tile_size": 10.0, "grid": [[3, 3, 3], [3, 0, 3]] },
        "players": [{ "kind": "Raoul", "position": [0.0, 0.0] }],
        "mobs": [{ "kind": "Egg", "position": [20.0, 10.0], "hp": 12.0 }]
    }"#;

    #[test]
    fn test_level_parses() {
        let level = LevelConfig::from_json(LEVEL).unwrap();
        assert_eq!(level.mobs[0].hp, Some(12.0));
        assert_eq!(level.mobs[0].strength, None);
    }

    #[test]
    fn test_spawn_on_wall_is_rejected() {
        let level = LEVEL.replace("[20.0, 10.0]", "[10.0, 10.0]");
        let err = LevelConfig::from_json(&level).unwrap_err();
        assert!(err.contains("unwalkable"), "{}", err);
    }

    #[test]
    fn test_player_kind_as_mob_is_rejected() {
        let level = LEVEL.replace("\"Egg\"", "\"Chia\"");
        assert!(LevelConfig::from_json(&level).is_err());
    }

    #[test]
    fn test_save_keys_are_character_names() {
        let mut save = SaveData {
            recipe: "omelette".to_string(),
            level: 2,
            ..default()
        };
        let mut skills = BTreeMap::new();
        skills.insert(SkillType::Skill1, 2);
        save.skill_levels.insert(
            CharacterKind::Taji,
            CharacterProgress { level: 3, skills },
        );

        let json = serde_json::to_string(&save).unwrap();
        assert!(json.contains("\"Taji\""), "{}", json);
        let parsed: SaveData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, save);
    }
}
