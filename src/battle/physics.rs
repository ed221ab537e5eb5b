//! Motion integration and projectile overlap detection

use bevy::prelude::*;

use super::components::Motion;
use super::projectiles::Projectile;
use super::stats::StatsComponent;
use crate::combat::events::CollisionEvent;

/// Move every body by its velocity
pub fn integrate_motion(time: Res<Time>, mut bodies: Query<&mut Motion>) {
    let dt = time.delta_secs();
    for mut motion in bodies.iter_mut() {
        if motion.velocity != Vec2::ZERO {
            let velocity = motion.velocity;
            motion.position += velocity * dt;
        }
    }
}

/// Report every projectile overlapping a combatant's bounds
pub fn detect_collisions(
    projectiles: Query<(Entity, &Motion), With<Projectile>>,
    combatants: Query<(Entity, &Motion), (With<StatsComponent>, Without<Projectile>)>,
    mut collisions: EventWriter<CollisionEvent>,
) {
    let mut targets: Vec<(Entity, Rect)> = combatants
        .iter()
        .map(|(entity, motion)| (entity, motion.bounds()))
        .collect();
    targets.sort_by_key(|(entity, _)| *entity);

    for (projectile, motion) in projectiles.iter() {
        let bounds = motion.bounds();
        for (other, other_bounds) in &targets {
            if !bounds.intersect(*other_bounds).is_empty() {
                collisions.send(CollisionEvent {
                    projectile,
                    other: *other,
                });
            }
        }
    }
}
