//! Skills and their targeting pipeline
//!
//! A skill resolves in three stages:
//! 1. an [`EntityProvider`] gathers candidates around a reference point,
//!    sorted nearest first
//! 2. [`EntityFilter`]s narrow them down, in the order the skill lists them
//! 3. an [`EntityHandler`] turns each survivor into hit/heal/buff effects
//!
//! [`SkillComponent`] is the per-character catalog, and the systems in
//! [`system`] queue activations until their animation reaches impact.

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod component;
pub mod filter;
pub mod handler;
pub mod provider;
pub mod skill;
pub mod system;

pub use catalog::{
    load_character_definitions, CharacterDefinition, CharacterDefinitions, SkillSlot,
};
pub use component::{SkillComponent, SkillEntry};
pub use filter::{apply_filters, EntityFilter};
pub use handler::{EntityHandler, SkillEffect};
pub use provider::{EntityProvider, TargetInfo};
pub use skill::{ProjectileSpec, Skill, SkillKind, SkillParams, SkillResolution, Trajectory};
pub use system::{QueuedSkill, SkillQueue};

/// Slots a character's skills are armed by
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum SkillType {
    /// Nothing armed
    #[default]
    None,
    Move,
    Skill1,
    Skill2,
    Skill3,
}
