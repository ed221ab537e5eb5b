//! AI decision-making
//!
//! - Mobs walk toward the nearest standing player, then use the first skill
//!   that reaches it, or pass
//! - Players on autopilot use a random skill that reaches the nearest mob,
//!   otherwise walk toward it, otherwise pass
//!
//! Autopilot drives players through the same click and skill events a human
//! would produce.

use bevy::prelude::*;

use super::components::{
    Autopilot, DeathTimer, GameRng, MapGrid, MobComponent, Motion, PlayerComponent,
};
use super::pathfinding::path_for;
use super::skills::{SkillComponent, SkillType};
use super::turn::{TurnClock, TurnComponent, TurnComponentIsActive};
use super::world::BattleOutcome;
use crate::combat::events::*;

/// Nearest candidate to `from`; ties go to the lower entity
fn nearest(candidates: impl Iterator<Item = (Entity, Vec2)>, from: Vec2) -> Option<(Entity, Vec2)> {
    candidates.min_by(|(a, a_pos), (b, b_pos)| {
        a_pos
            .distance(from)
            .total_cmp(&b_pos.distance(from))
            .then(a.cmp(b))
    })
}

/// Slots whose current skill reaches `target` from `origin`, in slot order
fn reaching_skills(skills: &SkillComponent, origin: Vec2, target: Vec2) -> Vec<SkillType> {
    skills
        .skill_types()
        .filter(|slot| *slot != SkillType::Move)
        .filter(|slot| {
            skills
                .skill(*slot)
                .is_some_and(|skill| skill.reaches(origin, target))
        })
        .collect()
}

/// Plan a mob's walk toward the nearest standing player
pub fn plan_mob_moves(
    map: Option<Res<MapGrid>>,
    mut requests: EventReader<StartMobMoveEvent>,
    mut bodies: Query<
        (Entity, &mut Motion, Has<DeathTimer>, Has<PlayerComponent>),
        With<TurnComponent>,
    >,
) {
    for event in requests.read() {
        let Ok((_, motion, _, _)) = bodies.get(event.entity) else {
            continue;
        };
        let origin = motion.position;

        let prey = nearest(
            bodies
                .iter()
                .filter(|(_, _, dead, is_player)| *is_player && !dead)
                .map(|(entity, motion, _, _)| (entity, motion.position)),
            origin,
        );

        let mut path = match (map.as_deref(), prey) {
            (Some(map), Some((_, destination))) => path_for(
                map,
                event.entity,
                destination,
                bodies
                    .iter()
                    .filter(|(_, _, dead, _)| !dead)
                    .map(|(entity, motion, _, _)| (entity, motion)),
            ),
            _ => Vec::new(),
        };
        path.truncate(event.max_tiles);
        debug!("{:?} walks {} tile(s)", event.entity, path.len());

        // An empty path still finishes the walk through the movement pass
        if let Ok((_, mut motion, _, _)) = bodies.get_mut(event.entity) {
            motion.path = path.into();
        }
    }
}

/// Pick a skill for a mob that has finished walking
pub fn plan_mob_skills(
    mut requests: EventReader<StartMobSkillEvent>,
    bodies: Query<(Entity, &Motion, Has<DeathTimer>, Has<PlayerComponent>), With<TurnComponent>>,
    skills: Query<&SkillComponent>,
    mut arm: EventWriter<SetActiveSkillEvent>,
    mut perform: EventWriter<PerformActiveSkillEvent>,
    mut finished: EventWriter<FinishedSkillEvent>,
) {
    for event in requests.read() {
        let entity = event.entity;
        let choice = bodies.get(entity).ok().and_then(|(_, motion, dead, _)| {
            if dead {
                return None;
            }
            let origin = motion.center();
            let (_, target) = nearest(
                bodies
                    .iter()
                    .filter(|(_, _, dead, is_player)| *is_player && !dead)
                    .map(|(entity, motion, _, _)| (entity, motion.center())),
                origin,
            )?;
            let skills = skills.get(entity).ok()?;
            let slot = reaching_skills(skills, origin, target).into_iter().next()?;
            Some((slot, target))
        });

        match choice {
            Some((skill, target)) => {
                arm.send(SetActiveSkillEvent { entity, skill });
                perform.send(PerformActiveSkillEvent { entity, target });
            }
            None => {
                debug!("{:?} has nothing in reach and passes", entity);
                finished.send(FinishedSkillEvent { entity });
            }
        }
    }
}

/// Act for the active player when it is on autopilot
#[allow(clippy::too_many_arguments)]
pub fn drive_autopilot(
    map: Option<Res<MapGrid>>,
    clock: Res<TurnClock>,
    outcome: Res<BattleOutcome>,
    mut rng: ResMut<GameRng>,
    active: Query<
        (Entity, &TurnComponent, Option<&SkillComponent>),
        (
            With<TurnComponentIsActive>,
            With<Autopilot>,
            With<PlayerComponent>,
            Without<DeathTimer>,
        ),
    >,
    bodies: Query<(Entity, &Motion, Has<DeathTimer>, Has<MobComponent>), With<TurnComponent>>,
    mut clicks: EventWriter<WorldClickedEvent>,
    mut arm: EventWriter<SetActiveSkillEvent>,
    mut perform: EventWriter<PerformActiveSkillEvent>,
    mut finished_moves: EventWriter<FinishedMovementEvent>,
    mut finished_skills: EventWriter<FinishedSkillEvent>,
) {
    if outcome.is_decided() || clock.transition_timer > 0.0 {
        return;
    }
    let Ok((entity, turn, skills)) = active.get_single() else {
        return;
    };
    if turn.is_acting() {
        return;
    }
    let Ok((_, motion, _, _)) = bodies.get(entity) else {
        return;
    };

    let Some((prey, prey_position)) = nearest(
        bodies
            .iter()
            .filter(|(_, _, dead, is_mob)| *is_mob && !dead)
            .map(|(e, m, _, _)| (e, m.position)),
        motion.position,
    ) else {
        return;
    };
    let prey_center = bodies
        .get(prey)
        .map(|(_, m, _, _)| m.center())
        .unwrap_or(prey_position);

    if turn.can_start_skill() {
        let options = skills
            .map(|skills| reaching_skills(skills, motion.center(), prey_center))
            .unwrap_or_default();
        if let Some(index) = rng.random_index(options.len()) {
            arm.send(SetActiveSkillEvent {
                entity,
                skill: options[index],
            });
            perform.send(PerformActiveSkillEvent {
                entity,
                target: prey_center,
            });
            return;
        }
    }

    if turn.can_start_moving() {
        let path = map
            .as_deref()
            .map(|map| {
                path_for(
                    map,
                    entity,
                    prey_position,
                    bodies
                        .iter()
                        .filter(|(_, _, dead, _)| !dead)
                        .map(|(e, m, _, _)| (e, m)),
                )
            })
            .unwrap_or_default();

        if path.is_empty() {
            finished_moves.send(FinishedMovementEvent { entity });
        } else {
            clicks.send(WorldClickedEvent {
                position: prey_position,
            });
        }
        return;
    }

    if turn.can_start_skill() {
        finished_skills.send(FinishedSkillEvent { entity });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_breaks_ties_by_entity() {
        let candidates = vec![
            (Entity::from_raw(5), Vec2::new(10.0, 0.0)),
            (Entity::from_raw(2), Vec2::new(-10.0, 0.0)),
            (Entity::from_raw(9), Vec2::new(30.0, 0.0)),
        ];
        let found = nearest(candidates.into_iter(), Vec2::ZERO);
        assert_eq!(found.map(|(e, _)| e), Some(Entity::from_raw(2)));
    }

    #[test]
    fn test_nearest_of_nothing() {
        assert!(nearest(std::iter::empty(), Vec2::ZERO).is_none());
    }
}
