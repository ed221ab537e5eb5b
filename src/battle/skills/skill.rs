//! Skills
//!
//! A skill bundles its targeting pipeline (provider, filters, handler) with
//! presentation data (animation, sound) and an activation delay that lets
//! the animation reach its impact frame before anything happens.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::filter::apply_filters;
use super::handler::{EntityHandler, SkillEffect};
use super::provider::{EntityProvider, TargetInfo};
use super::EntityFilter;
use crate::battle::components::{AnimationType, FxType, SoundEffect};

fn unbound_instigator() -> Entity {
    Entity::PLACEHOLDER
}

fn default_true() -> bool {
    true
}

/// Data shared by every skill kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillParams {
    /// Owner of the skill, bound when the skill is given to a combatant
    #[serde(skip, default = "unbound_instigator")]
    pub instigator: Entity,
    /// Seconds between activation and resolution
    pub delay: f32,
    #[serde(default)]
    pub animation: AnimationType,
    #[serde(default)]
    pub sound: SoundEffect,
    /// Set at activation
    #[serde(skip)]
    pub target_position: Vec2,
    #[serde(default)]
    pub filters: Vec<EntityFilter>,
    pub handler: EntityHandler,
    /// Effect started on every target the handler touches
    #[serde(default)]
    pub fx: Option<FxType>,
    /// When false only the first surviving target is affected
    #[serde(default = "default_true")]
    pub collide_with_multiple: bool,
}

/// How a projectile travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trajectory {
    /// Straight to the target, then gone
    Linear,
    /// Curves out to the target and back to the launcher
    Boomerang,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpec {
    pub trajectory: Trajectory,
    /// World units per second
    pub launch_speed: f32,
    /// Width and height of the projectile body
    pub size: (f32, f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkillKind {
    /// Strikes the single nearest target the pipeline keeps
    Melee { provider: EntityProvider },
    AreaOfEffect { provider: EntityProvider },
    Buff { provider: EntityProvider },
    /// Launches a projectile; its collisions drive the filters and handler
    Projectile(ProjectileSpec),
}

/// Targets and effects of one activation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillResolution {
    pub targets: Vec<Entity>,
    pub effects: Vec<SkillEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub kind: SkillKind,
    pub params: SkillParams,
}

impl Skill {
    pub fn new(kind: SkillKind, params: SkillParams) -> Self {
        Self { kind, params }
    }

    /// Copy of this skill owned by `instigator`
    pub fn bound_to(&self, instigator: Entity) -> Self {
        let mut skill = self.clone();
        skill.params.instigator = instigator;
        skill
    }

    pub fn instigator(&self) -> Entity {
        self.params.instigator
    }

    pub fn delay(&self) -> f32 {
        self.params.delay
    }

    pub fn animation(&self) -> AnimationType {
        self.params.animation
    }

    pub fn provider(&self) -> Option<&EntityProvider> {
        match &self.kind {
            SkillKind::Melee { provider }
            | SkillKind::AreaOfEffect { provider }
            | SkillKind::Buff { provider } => Some(provider),
            SkillKind::Projectile(_) => None,
        }
    }

    /// Radius shown by range indicators, zero when unbounded
    pub fn range(&self) -> f32 {
        self.provider().map(EntityProvider::radius).unwrap_or(0.0)
    }

    /// Whether a target standing at `target` can be affected from `origin`
    /// (the instigator's centre)
    pub fn reaches(&self, origin: Vec2, target: Vec2) -> bool {
        match self.provider() {
            Some(EntityProvider::Circular { radius }) => origin.distance(target) <= *radius,
            _ => true,
        }
    }

    fn single_target(&self) -> bool {
        matches!(self.kind, SkillKind::Melee { .. }) || !self.params.collide_with_multiple
    }

    /// Run the provider → filters → handler pipeline over a snapshot of the
    /// field. Projectile skills resolve per collision instead and yield
    /// nothing here.
    pub fn resolve(&self, candidates: &[TargetInfo]) -> SkillResolution {
        let Some(provider) = self.provider() else {
            return SkillResolution::default();
        };

        let mut found =
            provider.get_entities(self.params.instigator, self.params.target_position, candidates);
        found.retain(|t| !t.dead);
        let mut survivors = apply_filters(&self.params.filters, self.params.instigator, found);
        if self.single_target() {
            survivors.truncate(1);
        }

        self.apply_handler(&survivors)
    }

    /// The filters and handler for a single projectile collision
    pub fn resolve_collision(&self, target: &TargetInfo) -> SkillResolution {
        if target.dead {
            return SkillResolution::default();
        }
        let survivors = apply_filters(&self.params.filters, self.params.instigator, vec![*target]);
        self.apply_handler(&survivors)
    }

    fn apply_handler(&self, targets: &[TargetInfo]) -> SkillResolution {
        let mut resolution = SkillResolution::default();
        for target in targets {
            self.params.handler.process(target, &mut resolution.effects);
            if let Some(fx) = self.params.fx {
                resolution.effects.push(SkillEffect::Fx {
                    target: target.entity,
                    fx,
                });
            }
            resolution.targets.push(target.entity);
        }
        resolution
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.params.delay < 0.0 {
            return Err(format!("negative delay {}", self.params.delay));
        }
        if let SkillKind::Projectile(spec) = &self.kind {
            if spec.launch_speed <= 0.0 {
                return Err(format!("projectile speed must be positive, got {}", spec.launch_speed));
            }
        }
        self.params.handler.validate()
    }
}
