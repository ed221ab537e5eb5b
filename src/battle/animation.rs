//! Animation and FX bookkeeping
//!
//! Playback itself lives outside the battle core; this module only tracks
//! what each combatant should be showing.

use bevy::prelude::*;

use super::components::{ActiveFx, Animated, AnimationType};
use crate::combat::events::*;

/// Follow animation requests. DEFEAT is final.
pub fn apply_animation_changes(
    mut changes: EventReader<AnimationChangeEvent>,
    mut finished_skills: EventReader<FinishedSkillEvent>,
    mut animated: Query<&mut Animated>,
) {
    for event in changes.read() {
        let Ok(mut animated) = animated.get_mut(event.entity) else {
            continue;
        };
        if animated.current != AnimationType::Defeat {
            animated.current = event.animation;
        }
    }

    // Attacks play until their skill has fully resolved
    for event in finished_skills.read() {
        let Ok(mut animated) = animated.get_mut(event.entity) else {
            continue;
        };
        if matches!(
            animated.current,
            AnimationType::Attack1 | AnimationType::Attack2 | AnimationType::Attack3
        ) {
            animated.current = AnimationType::Idle;
        }
    }
}

/// Keep [`ActiveFx`] in sync with persistent FX requests.
///
/// Stops are applied before starts. A stop always refers to an FX that was
/// already showing, so a stop and a restart landing in the same step leave
/// the FX on.
pub fn track_fx(
    mut started: EventReader<StartFxEvent>,
    mut stopped: EventReader<StopFxEvent>,
    mut active: Query<&mut ActiveFx>,
) {
    for event in stopped.read() {
        if let Ok(mut fx) = active.get_mut(event.entity) {
            fx.0.retain(|current| *current != event.fx);
        }
    }

    for event in started.read() {
        if event.fx.is_transient() {
            continue;
        }
        if let Ok(mut fx) = active.get_mut(event.entity) {
            if !fx.contains(event.fx) {
                fx.0.push(event.fx);
            }
        }
    }
}
