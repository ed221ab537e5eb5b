//! Entity filters
//!
//! Narrow a provider's candidates. Filters chain left to right in the order
//! the skill lists them.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::provider::TargetInfo;
use crate::battle::components::CollisionGroup;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityFilter {
    /// Drops the instigator
    Instigator,
    /// Keeps bodies whose collision group intersects the mask
    Collision(CollisionGroup),
    /// Keeps the first `n` bodies
    MaxTargets(usize),
}

impl EntityFilter {
    pub fn process(&self, instigator: Entity, mut entities: Vec<TargetInfo>) -> Vec<TargetInfo> {
        match *self {
            EntityFilter::Instigator => entities.retain(|t| t.entity != instigator),
            EntityFilter::Collision(mask) => entities.retain(|t| t.group.intersects(mask)),
            EntityFilter::MaxTargets(max) => entities.truncate(max),
        }
        entities
    }
}

/// Run `entities` through every filter in order
pub fn apply_filters(
    filters: &[EntityFilter],
    instigator: Entity,
    entities: Vec<TargetInfo>,
) -> Vec<TargetInfo> {
    filters
        .iter()
        .fold(entities, |remaining, filter| filter.process(instigator, remaining))
}
