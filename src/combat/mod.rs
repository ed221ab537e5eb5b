//! Combat notifications and logging
//!
//! Owns the event bus shared by every battle system:
//! - Turn flow (active combatant changes, rounds, mob turn requests)
//! - Input (world clicks, player buttons, skill arming)
//! - Stats side effects (hits, heals, buffs, deaths)
//! - Presentation requests (animation, FX, sound)
//!
//! and the [`log::CombatLog`] that records them.

use bevy::prelude::*;

pub mod events;
pub mod log;
pub mod systems;

use events::*;
use systems::*;

use crate::battle::systems::{BattlePhase, BattleStep};

/// Plugin for combat events and logging
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Turn flow
            .add_event::<PlayerChangeEvent>()
            .add_event::<RoundStartedEvent>()
            .add_event::<StartMobMoveEvent>()
            .add_event::<StartMobSkillEvent>()
            .add_event::<FinishedMovementEvent>()
            .add_event::<FinishedSkillEvent>()
            // Input
            .add_event::<WorldClickedEvent>()
            .add_event::<PlayerButtonEvent>()
            .add_event::<SetActiveSkillEvent>()
            .add_event::<PerformActiveSkillEvent>()
            .add_event::<SkillActivatedEvent>()
            // Stats
            .add_event::<HitEvent>()
            .add_event::<HealEvent>()
            .add_event::<BuffEvent>()
            .add_event::<CombatantDeathEvent>()
            // Presentation
            .add_event::<StartFxEvent>()
            .add_event::<StopFxEvent>()
            .add_event::<AnimationChangeEvent>()
            .add_event::<PlaySoundEvent>()
            // Physics
            .add_event::<CollisionEvent>()
            // Resources
            .init_resource::<log::CombatLog>()
            // Runs once per sub-step, after the turn system has seen everything
            .add_systems(BattleStep, record_combat_log.after(BattlePhase::Turn));
    }
}
