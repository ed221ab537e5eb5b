//! Battle simulation
//!
//! Everything that happens on the battlefield:
//! - [`turn`]: whose turn it is and when it ends
//! - [`skills`]: skill catalogs, targeting and delayed resolution
//! - [`stats`]: HP, shields and temporary modifiers
//! - [`pathfinding`]: grid walks around other combatants
//! - [`movement`], [`physics`], [`projectiles`]: things moving about
//! - [`ai`]: mob turns and player autopilot
//! - [`level`]: level and save files
//!
//! [`systems`] wires them into an app.

use bevy::prelude::*;

pub mod ai;
pub mod animation;
pub mod components;
pub mod level;
pub mod movement;
pub mod pathfinding;
pub mod physics;
pub mod projectiles;
pub mod skills;
pub mod stats;
pub mod systems;
pub mod turn;
pub mod world;

use components::GameRng;
use skills::SkillQueue;
use turn::TurnClock;
use world::BattleOutcome;

use crate::settings::SimulationSettings;

/// Plugin for the battle simulation.
///
/// Expects [`crate::combat::CombatPlugin`] for the event bus. Spawning the
/// level is left to the caller (see [`level::spawn_level`]).
pub struct BattlePlugin;

impl Plugin for BattlePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationSettings>()
            .init_resource::<SkillQueue>()
            .init_resource::<TurnClock>()
            .init_resource::<BattleOutcome>()
            .init_resource::<GameRng>();

        systems::configure_battle_system_ordering(app);
        systems::add_core_battle_systems(app, || true);
    }
}
