//! Entity providers
//!
//! The first stage of targeting: gather candidate entities around the
//! instigator or the clicked point, nearest first.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::battle::components::{CollisionGroup, Motion};

/// What the targeting pipeline knows about one entity on the field.
///
/// A snapshot taken before any handler runs, so deaths caused by the skill
/// cannot disturb the iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub entity: Entity,
    /// Feet position
    pub position: Vec2,
    /// Centre of the body
    pub center: Vec2,
    /// Axis-aligned body bounds
    pub bounds: Rect,
    /// Empty for bodies that do not collide (projectiles)
    pub group: CollisionGroup,
    /// Carries a death timer
    pub dead: bool,
}

impl TargetInfo {
    pub fn from_motion(
        entity: Entity,
        motion: &Motion,
        group: Option<CollisionGroup>,
        dead: bool,
    ) -> Self {
        Self {
            entity,
            position: motion.position,
            center: motion.center(),
            bounds: motion.bounds(),
            group: group.unwrap_or(CollisionGroup::empty()),
            dead,
        }
    }

    /// Point of the body nearest to `point`
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.bounds.min, self.bounds.max)
    }
}

/// How a skill gathers its candidate targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityProvider {
    /// Bodies touching a circle around the instigator's centre, sorted by
    /// feet-to-feet distance
    Circular { radius: f32 },
    /// Bodies within `angle` radians of the instigator→target direction,
    /// sorted by angular distance
    Conical { angle: f32 },
    /// Bodies touching a circle around the target point, sorted by distance
    /// from their centre to the point
    MouseClick { radius: f32 },
    /// Everything on the field, in storage order
    AllEntities,
}

impl EntityProvider {
    /// Radius shown by range indicators, zero when unbounded
    pub fn radius(&self) -> f32 {
        match self {
            EntityProvider::Circular { radius } | EntityProvider::MouseClick { radius } => *radius,
            EntityProvider::Conical { .. } | EntityProvider::AllEntities => 0.0,
        }
    }

    /// Candidate targets, nearest first.
    ///
    /// `candidates` is every body on the field. Providers anchored on the
    /// instigator yield nothing if the instigator is not among them.
    pub fn get_entities(
        &self,
        instigator: Entity,
        target_position: Vec2,
        candidates: &[TargetInfo],
    ) -> Vec<TargetInfo> {
        let origin = || candidates.iter().find(|c| c.entity == instigator);

        let mut scored: Vec<(TargetInfo, f32)> = match *self {
            EntityProvider::Circular { radius } => {
                let Some(origin) = origin() else {
                    return Vec::new();
                };
                candidates
                    .iter()
                    .filter(|c| c.closest_point(origin.center).distance(origin.center) <= radius)
                    .map(|c| (*c, origin.position.distance(c.position)))
                    .collect()
            }
            EntityProvider::Conical { angle } => {
                let Some(origin) = origin() else {
                    return Vec::new();
                };
                let aim = (target_position - origin.center).normalize_or_zero();
                candidates
                    .iter()
                    .filter_map(|c| {
                        let to_entity = (c.position - origin.center).normalize_or_zero();
                        let entity_angle = aim.dot(to_entity).clamp(-1.0, 1.0).acos();
                        (entity_angle <= angle).then_some((*c, entity_angle))
                    })
                    .collect()
            }
            EntityProvider::MouseClick { radius } => candidates
                .iter()
                .filter(|c| c.closest_point(target_position).distance(target_position) <= radius)
                .map(|c| (*c, target_position.distance(c.center)))
                .collect(),
            EntityProvider::AllEntities => return candidates.to_vec(),
        };

        // Stable, so equal distances keep storage order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.into_iter().map(|(info, _)| info).collect()
    }
}
