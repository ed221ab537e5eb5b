//! Walking along pathfinder waypoints
//!
//! Walkers are steered by velocity; the physics pass does the integration.

use bevy::prelude::*;

use super::components::{Animated, AnimationType, DeathTimer, Motion};
use super::turn::TurnComponent;
use crate::combat::events::{AnimationChangeEvent, FinishedMovementEvent};
use crate::settings::SimulationSettings;

/// Distance at which a waypoint counts as reached
const ARRIVAL_EPSILON: f32 = 0.5;

/// Steer walking combatants toward their next waypoint.
///
/// When the path runs out the walker stops and
/// [`FinishedMovementEvent`] is sent.
pub fn follow_paths(
    time: Res<Time>,
    settings: Res<SimulationSettings>,
    mut walkers: Query<(Entity, &mut Motion, &TurnComponent, Option<&Animated>, Has<DeathTimer>)>,
    mut finished: EventWriter<FinishedMovementEvent>,
    mut animations: EventWriter<AnimationChangeEvent>,
) {
    let dt = time.delta_secs();

    for (entity, mut motion, turn, animated, dead) in walkers.iter_mut() {
        if !turn.is_moving {
            continue;
        }
        let animation = animated.map(|a| a.current);

        while let Some(waypoint) = motion.path.front().copied() {
            if motion.position.distance(waypoint) > ARRIVAL_EPSILON {
                break;
            }
            motion.position = waypoint;
            motion.path.pop_front();
        }

        let next = if dead { None } else { motion.path.front().copied() };
        match next {
            Some(waypoint) if dt > 0.0 => {
                let offset = waypoint - motion.position;
                let speed = settings.move_speed.min(offset.length() / dt);
                motion.velocity = offset.normalize_or_zero() * speed;
                if animation.is_some_and(|a| a != AnimationType::Move) {
                    animations.send(AnimationChangeEvent {
                        entity,
                        animation: AnimationType::Move,
                    });
                }
            }
            Some(_) => {}
            None => {
                motion.velocity = Vec2::ZERO;
                motion.path.clear();
                finished.send(FinishedMovementEvent { entity });
                if animation == Some(AnimationType::Move) {
                    animations.send(AnimationChangeEvent {
                        entity,
                        animation: AnimationType::Idle,
                    });
                }
            }
        }
    }
}
