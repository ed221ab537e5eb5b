//! Projectiles
//!
//! A projectile skill resolves when its projectile touches something: each
//! collision runs the skill's filters on that one body and then its handler.
//! A flight never hits the same body twice.

use std::collections::HashSet;
use std::f32::consts::PI;

use bevy::prelude::*;

use super::components::{Collider, DeathTimer, Motion};
use super::skills::system::SkillEffectWriters;
use super::skills::{ProjectileSpec, Skill, TargetInfo, Trajectory};
use crate::combat::events::{CollisionEvent, FinishedSkillEvent};

/// A linear flight ends this close to its target
pub const LINEAR_END_DISTANCE: f32 = 5.0;

/// Peak sideways offset of a boomerang flight
pub const BOOMERANG_OFFSET: f32 = 200.0;

#[derive(Component, Debug)]
pub struct Projectile {
    skill: Skill,
    spec: ProjectileSpec,
    /// Start of the current leg
    source: Vec2,
    /// End of the current leg
    target: Vec2,
    /// Fraction of the current leg flown (boomerang only)
    progress: f32,
    /// On the way back to the launcher
    returning: bool,
    /// Bodies this flight has already dealt with
    ignored: HashSet<Entity>,
    done: bool,
}

impl Projectile {
    pub fn new(skill: Skill, spec: ProjectileSpec, origin: Vec2) -> Self {
        let target = skill.params.target_position;
        Self {
            skill,
            spec,
            source: origin,
            target,
            progress: 0.0,
            returning: false,
            ignored: HashSet::new(),
            done: false,
        }
    }

    pub fn launcher(&self) -> Entity {
        self.skill.instigator()
    }

    pub fn is_returning(&self) -> bool {
        self.returning
    }

    pub fn has_hit(&self, entity: Entity) -> bool {
        self.ignored.contains(&entity)
    }
}

/// Point along a boomerang leg: straight from `source` to `target`, pushed
/// sideways by a half sine wave
pub fn boomerang_point(source: Vec2, target: Vec2, progress: f32) -> Vec2 {
    let side = (target - source).perp().normalize_or_zero();
    source.lerp(target, progress) + side * (progress * PI).sin() * BOOMERANG_OFFSET
}

/// Feet position of a body whose centre is `center`
fn feet(center: Vec2, motion: &Motion) -> Vec2 {
    center + Vec2::new(0.0, motion.bounding_box.y.abs() / 2.0)
}

/// Launch a projectile from `origin` (the launcher's centre) toward the
/// skill's target position
pub fn spawn_projectile(commands: &mut Commands, skill: Skill, spec: ProjectileSpec, origin: Vec2) {
    let mut motion = Motion::new(Vec2::ZERO, Vec2::new(spec.size.0, spec.size.1));
    motion.position = feet(origin, &motion);
    debug!(
        "{:?} launches a {:?} projectile toward {:?}",
        skill.instigator(),
        spec.trajectory,
        skill.params.target_position
    );
    commands.spawn((
        Name::new("Projectile"),
        Projectile::new(skill, spec, origin),
        motion,
    ));
}

fn end_flight(
    commands: &mut Commands,
    entity: Entity,
    projectile: &mut Projectile,
    finished: &mut EventWriter<FinishedSkillEvent>,
) {
    if projectile.done {
        return;
    }
    projectile.done = true;
    commands.entity(entity).despawn();
    finished.send(FinishedSkillEvent {
        entity: projectile.launcher(),
    });
}

/// Steer projectiles along their trajectory and end finished flights
pub fn steer_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Motion)>,
    bodies: Query<&Motion, Without<Projectile>>,
    mut finished: EventWriter<FinishedSkillEvent>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (entity, mut projectile, mut motion) in projectiles.iter_mut() {
        if projectile.done {
            continue;
        }
        let center = motion.center();

        let next = match projectile.spec.trajectory {
            Trajectory::Linear => {
                let remaining = projectile.target - center;
                if remaining.length() <= LINEAR_END_DISTANCE {
                    motion.velocity = Vec2::ZERO;
                    end_flight(&mut commands, entity, &mut projectile, &mut finished);
                    continue;
                }
                let step = (projectile.spec.launch_speed * dt).min(remaining.length());
                center + remaining.normalize_or_zero() * step
            }
            Trajectory::Boomerang => {
                let leg = projectile.source.distance(projectile.target).max(1.0);
                projectile.progress += projectile.spec.launch_speed * dt / leg;
                if projectile.progress >= 1.0 {
                    if projectile.returning {
                        motion.velocity = Vec2::ZERO;
                        end_flight(&mut commands, entity, &mut projectile, &mut finished);
                        continue;
                    }
                    // Swap ends and head home
                    let home = bodies
                        .get(projectile.launcher())
                        .map(Motion::center)
                        .unwrap_or(projectile.source);
                    projectile.returning = true;
                    projectile.source = projectile.target;
                    projectile.target = home;
                    projectile.progress = 0.0;
                }
                boomerang_point(projectile.source, projectile.target, projectile.progress)
            }
        };

        motion.velocity = (next - center) / dt;
    }
}

/// Run the skill's filters and handler for each new projectile contact
pub fn process_projectile_hits(
    mut commands: Commands,
    mut collisions: EventReader<CollisionEvent>,
    mut projectiles: Query<&mut Projectile>,
    bodies: Query<(&Motion, Option<&Collider>, Has<DeathTimer>), Without<Projectile>>,
    mut effects: SkillEffectWriters,
    mut finished: EventWriter<FinishedSkillEvent>,
) {
    for event in collisions.read() {
        let Ok(mut projectile) = projectiles.get_mut(event.projectile) else {
            continue;
        };
        if projectile.done || !projectile.ignored.insert(event.other) {
            continue;
        }
        let Ok((motion, collider, dead)) = bodies.get(event.other) else {
            continue;
        };

        let target = TargetInfo::from_motion(event.other, motion, collider.map(|c| c.0), dead);
        let resolution = projectile.skill.resolve_collision(&target);
        if resolution.targets.is_empty() {
            continue;
        }

        let launcher = projectile.launcher();
        for effect in resolution.effects {
            effects.send(launcher, effect);
        }
        if !projectile.skill.params.collide_with_multiple {
            end_flight(&mut commands, event.projectile, &mut projectile, &mut finished);
        }
    }
}
