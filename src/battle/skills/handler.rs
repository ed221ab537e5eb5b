//! Entity handlers
//!
//! The last stage of targeting: turn each surviving target into stats
//! requests. Targets are handled independently; nothing is rolled back if a
//! later target fails.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::provider::TargetInfo;
use crate::battle::components::{CollisionGroup, FxType};
use crate::battle::stats::{StatModifier, StatType};

/// A stats request produced by a handler
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkillEffect {
    Hit { target: Entity, damage: f32 },
    Heal { target: Entity, amount: f32 },
    Buff { target: Entity, modifier: StatModifier },
    Fx { target: Entity, fx: FxType },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityHandler {
    Damage {
        amount: f32,
    },
    Heal {
        amount: f32,
    },
    Buff {
        stat: StatType,
        value: f32,
        turns: i32,
    },
    /// Heals targets in one group and damages targets in the other
    HealAndDamage {
        heal_group: CollisionGroup,
        heal: f32,
        damage_group: CollisionGroup,
        damage: f32,
    },
    DebuffAndDamage {
        stat: StatType,
        value: f32,
        turns: i32,
        damage: f32,
    },
}

impl EntityHandler {
    pub fn process(&self, target: &TargetInfo, effects: &mut Vec<SkillEffect>) {
        let entity = target.entity;
        match *self {
            EntityHandler::Damage { amount } => effects.push(SkillEffect::Hit {
                target: entity,
                damage: amount,
            }),
            EntityHandler::Heal { amount } => effects.push(SkillEffect::Heal {
                target: entity,
                amount,
            }),
            EntityHandler::Buff { stat, value, turns } => effects.push(SkillEffect::Buff {
                target: entity,
                modifier: StatModifier::new(stat, value, turns),
            }),
            EntityHandler::HealAndDamage {
                heal_group,
                heal,
                damage_group,
                damage,
            } => {
                if target.group.intersects(heal_group) {
                    effects.push(SkillEffect::Heal {
                        target: entity,
                        amount: heal,
                    });
                } else if target.group.intersects(damage_group) {
                    effects.push(SkillEffect::Hit {
                        target: entity,
                        damage,
                    });
                }
            }
            EntityHandler::DebuffAndDamage {
                stat,
                value,
                turns,
                damage,
            } => {
                effects.push(SkillEffect::Buff {
                    target: entity,
                    modifier: StatModifier::new(stat, value, turns),
                });
                effects.push(SkillEffect::Hit {
                    target: entity,
                    damage,
                });
            }
        }
    }

    /// Amounts must be non-negative
    pub fn validate(&self) -> Result<(), String> {
        let amounts = match *self {
            EntityHandler::Damage { amount } | EntityHandler::Heal { amount } => vec![amount],
            EntityHandler::Buff { .. } => vec![],
            EntityHandler::HealAndDamage { heal, damage, .. } => vec![heal, damage],
            EntityHandler::DebuffAndDamage { damage, .. } => vec![damage],
        };
        match amounts.iter().find(|a| **a < 0.0) {
            Some(amount) => Err(format!("{:?} has negative amount {}", self, amount)),
            None => Ok(()),
        }
    }
}
