//! Combat events
//!
//! Every notification exchanged between the battle systems. Systems never call
//! each other directly; they publish one of these and whoever cares reads it.

use bevy::prelude::*;

use crate::battle::components::{AnimationType, CharacterKind, FxType, SoundEffect};
use crate::battle::skills::SkillType;
use crate::battle::stats::StatModifier;

// ============================================================================
// Turn flow
// ============================================================================

/// Fired when a new entity becomes the active combatant
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerChangeEvent {
    /// The entity whose turn just started
    pub entity: Entity,
}

/// Fired by the turn system when a round begins: at the first activation of
/// the battle, then each time every combatant has acted
#[derive(Event, Debug, Clone, Copy)]
pub struct RoundStartedEvent {
    /// 1-based round number
    pub round: u32,
}

/// Asks the AI to walk the active mob toward its prey
#[derive(Event, Debug, Clone, Copy)]
pub struct StartMobMoveEvent {
    /// The mob whose turn it is
    pub entity: Entity,
    /// Maximum number of tiles the mob may walk this turn
    pub max_tiles: usize,
}

/// Asks the AI to pick and perform a skill for the active mob
#[derive(Event, Debug, Clone, Copy)]
pub struct StartMobSkillEvent {
    /// The mob whose turn it is
    pub entity: Entity,
}

/// Fired when an entity reaches the end of its path (or had nowhere to go)
#[derive(Event, Debug, Clone, Copy)]
pub struct FinishedMovementEvent {
    pub entity: Entity,
}

/// Fired when a skill has fully resolved, including projectile flight
#[derive(Event, Debug, Clone, Copy)]
pub struct FinishedSkillEvent {
    pub entity: Entity,
}

// ============================================================================
// Input surface
// ============================================================================

/// A click on the battlefield, in world coordinates
#[derive(Event, Debug, Clone, Copy)]
pub struct WorldClickedEvent {
    pub position: Vec2,
}

/// A click on one of the player portrait buttons
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerButtonEvent {
    pub kind: CharacterKind,
}

/// Arms a skill on an entity, pending a target
#[derive(Event, Debug, Clone, Copy)]
pub struct SetActiveSkillEvent {
    pub entity: Entity,
    pub skill: SkillType,
}

/// Performs the entity's armed skill toward a target position
#[derive(Event, Debug, Clone, Copy)]
pub struct PerformActiveSkillEvent {
    pub entity: Entity,
    pub target: Vec2,
}

/// A skill request was accepted and its skill queued for resolution
#[derive(Event, Debug, Clone, Copy)]
pub struct SkillActivatedEvent {
    pub entity: Entity,
    pub skill: SkillType,
    pub target: Vec2,
}

// ============================================================================
// Stats side effects
// ============================================================================

/// Raw damage dealt by a skill, before strength scaling and shields
#[derive(Event, Debug, Clone, Copy)]
pub struct HitEvent {
    /// Entity whose skill caused the hit
    pub instigator: Entity,
    /// Entity being hit
    pub target: Entity,
    /// Damage before the instigator's strength multiplier
    pub damage: f32,
}

/// Healing applied to an entity
#[derive(Event, Debug, Clone, Copy)]
pub struct HealEvent {
    pub entity: Entity,
    pub amount: f32,
}

/// A buff or debuff applied to an entity
#[derive(Event, Debug, Clone, Copy)]
pub struct BuffEvent {
    pub entity: Entity,
    pub modifier: StatModifier,
}

/// Fired when a combatant's effective HP reaches zero
#[derive(Event, Debug, Clone, Copy)]
pub struct CombatantDeathEvent {
    /// Entity that died
    pub victim: Entity,
    /// Entity whose hit dealt the killing blow
    pub killer: Entity,
}

// ============================================================================
// Presentation requests
// ============================================================================

/// Starts a visual effect attached to an entity
#[derive(Event, Debug, Clone, Copy)]
pub struct StartFxEvent {
    pub entity: Entity,
    pub fx: FxType,
}

/// Stops a visual effect attached to an entity
#[derive(Event, Debug, Clone, Copy)]
pub struct StopFxEvent {
    pub entity: Entity,
    pub fx: FxType,
}

/// Requests a change of the entity's current animation
#[derive(Event, Debug, Clone, Copy)]
pub struct AnimationChangeEvent {
    pub entity: Entity,
    pub animation: AnimationType,
}

/// Requests a one-shot sound effect
#[derive(Event, Debug, Clone, Copy)]
pub struct PlaySoundEvent {
    pub sound: SoundEffect,
}

// ============================================================================
// Physics
// ============================================================================

/// Two overlapping bodies, reported by the physics pass.
///
/// `projectile` is always the projectile entity; `other` is a combatant.
#[derive(Event, Debug, Clone, Copy)]
pub struct CollisionEvent {
    pub projectile: Entity,
    pub other: Entity,
}
