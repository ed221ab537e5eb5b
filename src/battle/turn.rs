//! Turn state machine
//!
//! Exactly one combatant is active at a time. Players act first, in storage
//! order, then mobs; once everyone is done a new round starts. A turn ends
//! when the combatant's [`TurnComponent`] is complete under the configured
//! [`TurnCompletionRule`], no action is still in flight, and the transition
//! delay has elapsed.
//!
//! A player click with nowhere to walk turns into a ranged attack toward the
//! click: the character's first projectile skill, or SKILL1 when it has no
//! projectile.
//!
//! The transition functions take `&mut World` so they can be called from
//! exclusive systems and from queued commands alike.

use bevy::prelude::*;

use super::components::{
    DeathTimer, FxType, MapGrid, MobComponent, Motion, PlayerComponent,
};
use super::pathfinding::path_for;
use super::skills::{SkillComponent, SkillKind, SkillType};
use super::world::BattleOutcome;
use crate::combat::events::*;
use crate::settings::{SimulationSettings, TurnCompletionRule};

/// Per-combatant progress through the current round
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnComponent {
    pub has_moved: bool,
    pub has_used_skill: bool,
    /// A walk is in progress
    pub is_moving: bool,
    /// A skill has been activated and has not finished resolving
    pub is_using_skill: bool,
    /// Turns left to skip
    pub stun_duration: u32,
}

impl TurnComponent {
    pub fn can_start_moving(&self) -> bool {
        !self.has_moved && !self.is_moving && !self.is_using_skill
    }

    pub fn can_start_skill(&self) -> bool {
        !self.is_moving && !self.has_used_skill && !self.is_using_skill
    }

    /// Some action started this turn has not finished yet
    pub fn is_acting(&self) -> bool {
        self.is_moving || self.is_using_skill
    }

    /// Forget this round's progress. Stuns carry over.
    pub fn reset_round(&mut self) {
        self.has_moved = false;
        self.has_used_skill = false;
        self.is_moving = false;
        self.is_using_skill = false;
    }

    /// Lose the turn without acting
    fn forfeit(&mut self) {
        self.has_moved = true;
        self.has_used_skill = true;
    }
}

/// Tag of the combatant whose turn it is
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TurnComponentIsActive;

/// Round counter and the pause between actions
#[derive(Resource, Debug, Clone, Default)]
pub struct TurnClock {
    /// 1-based; the first activation of the battle starts round 1
    pub round: u32,
    /// Seconds before the turn system may advance again
    pub transition_timer: f32,
}

fn completion_rule(world: &World) -> TurnCompletionRule {
    world
        .get_resource::<SimulationSettings>()
        .map(|settings| settings.turn_completion)
        .unwrap_or_default()
}

/// Turn candidates: living-or-dead players then mobs, each in storage order
fn turn_order(world: &mut World) -> Vec<Entity> {
    let mut players: Vec<Entity> = world
        .query_filtered::<Entity, (With<PlayerComponent>, With<TurnComponent>)>()
        .iter(world)
        .collect();
    let mut mobs: Vec<Entity> = world
        .query_filtered::<Entity, (With<MobComponent>, With<TurnComponent>)>()
        .iter(world)
        .collect();
    players.sort();
    mobs.sort();
    players.extend(mobs);
    players
}

/// The active combatant, if any
pub fn active_entity(world: &mut World) -> Option<Entity> {
    let active: Vec<Entity> = world
        .query_filtered::<Entity, With<TurnComponentIsActive>>()
        .iter(world)
        .collect();
    debug_assert!(active.len() <= 1, "more than one active combatant: {:?}", active);
    if active.len() > 1 {
        error!("More than one active combatant: {:?}", active);
    }
    active.iter().min().copied()
}

fn clear_active(world: &mut World) {
    let active: Vec<Entity> = world
        .query_filtered::<Entity, With<TurnComponentIsActive>>()
        .iter(world)
        .collect();
    for entity in active {
        world.entity_mut(entity).remove::<TurnComponentIsActive>();
    }
}

fn activate(world: &mut World, entity: Entity) {
    world.entity_mut(entity).insert(TurnComponentIsActive);
    world.send_event(PlayerChangeEvent { entity });

    let name = world
        .get::<Name>(entity)
        .map(|name| name.as_str().to_string())
        .unwrap_or_else(|| format!("{:?}", entity));
    info!("{}'s turn", name);
}

/// First combatant that still has something to do this round.
///
/// Stunned combatants met on the way lose their turn: it is marked complete,
/// the stun counter goes down, and the stun FX stops once it runs out.
fn pick_next(world: &mut World) -> Option<Entity> {
    let rule = completion_rule(world);

    for entity in turn_order(world) {
        if world.get::<DeathTimer>(entity).is_some() {
            continue;
        }
        let Some(mut turn) = world.get_mut::<TurnComponent>(entity) else {
            continue;
        };
        if rule.is_complete(&turn) {
            continue;
        }
        if turn.stun_duration == 0 {
            return Some(entity);
        }

        turn.forfeit();
        turn.stun_duration -= 1;
        let recovered = turn.stun_duration == 0;
        info!("{:?} is stunned and skips its turn", entity);
        if recovered {
            world.send_event(StopFxEvent {
                entity,
                fx: FxType::Stunned,
            });
        }
    }
    None
}

/// Bump the round counter and announce the new round
fn begin_round(world: &mut World) -> u32 {
    let round = {
        let mut clock = world.resource_mut::<TurnClock>();
        clock.round += 1;
        clock.round
    };
    info!("Round {} begins", round);
    world.send_event(RoundStartedEvent { round });
    round
}

/// Hand the turn to the next combatant that still has to act, starting a new
/// round when nobody does. The very first call opens round 1.
pub fn next_active_entity(world: &mut World) {
    clear_active(world);
    if world.resource::<TurnClock>().round == 0 {
        begin_round(world);
    }
    match pick_next(world) {
        Some(entity) => activate(world, entity),
        None => next_turn(world),
    }
}

/// Start a new round: reset everyone's progress and pick the first combatant
pub fn next_turn(world: &mut World) {
    let mut turns = world.query::<&mut TurnComponent>();
    for mut turn in turns.iter_mut(world) {
        turn.reset_round();
    }

    let round = begin_round(world);

    clear_active(world);
    match pick_next(world) {
        Some(entity) => activate(world, entity),
        // Everyone was stunned; the next step starts another round
        None => debug!("Nobody can act in round {}", round),
    }
}

/// Make `target` the active combatant without touching anyone else's
/// progress. Rejected when `target` is already active or has already acted,
/// or while the current combatant is mid-action.
pub fn change_active_entity(world: &mut World, target: Entity) -> bool {
    let Some(turn) = world.get::<TurnComponent>(target).copied() else {
        debug_assert!(false, "{:?} has no TurnComponent", target);
        error!("Cannot activate {:?}: it has no TurnComponent", target);
        return false;
    };

    let current = active_entity(world);
    if current == Some(target) {
        info!("{:?} is already active", target);
        return false;
    }
    if completion_rule(world).is_complete(&turn) || world.get::<DeathTimer>(target).is_some() {
        info!("{:?} has already acted this round", target);
        return false;
    }
    if let Some(current) = current {
        if world
            .get::<TurnComponent>(current)
            .is_some_and(TurnComponent::is_acting)
        {
            info!("{:?} is still acting, cannot switch to {:?}", current, target);
            return false;
        }
    }

    clear_active(world);
    activate(world, target);
    true
}

/// Skill used when a click has nowhere to walk
pub fn fallback_skill(skills: Option<&SkillComponent>) -> SkillType {
    skills
        .and_then(|skills| {
            skills.skill_types().find(|slot| {
                skills
                    .skill(*slot)
                    .is_some_and(|skill| matches!(skill.kind, SkillKind::Projectile(_)))
            })
        })
        .unwrap_or(SkillType::Skill1)
}

// ============================================================================
// Systems
// ============================================================================

/// Record finished walks and skills on the turn components.
///
/// A mob that finishes walking goes straight on to its skill.
pub fn track_action_completion(
    settings: Res<SimulationSettings>,
    mut clock: ResMut<TurnClock>,
    mut finished_moves: EventReader<FinishedMovementEvent>,
    mut finished_skills: EventReader<FinishedSkillEvent>,
    mut turns: Query<(&mut TurnComponent, Has<MobComponent>, Has<TurnComponentIsActive>)>,
    mut mob_skills: EventWriter<StartMobSkillEvent>,
) {
    for event in finished_moves.read() {
        let Ok((mut turn, is_mob, is_active)) = turns.get_mut(event.entity) else {
            continue;
        };
        turn.is_moving = false;
        turn.has_moved = true;
        clock.transition_timer = settings.turn_transition_delay;

        if is_mob && is_active && turn.can_start_skill() {
            turn.is_using_skill = true;
            mob_skills.send(StartMobSkillEvent {
                entity: event.entity,
            });
        }
    }

    for event in finished_skills.read() {
        let Ok((mut turn, _, _)) = turns.get_mut(event.entity) else {
            continue;
        };
        turn.is_using_skill = false;
        turn.has_used_skill = true;
        clock.transition_timer = settings.turn_transition_delay;
    }
}

/// Turn world clicks and player buttons into actions for the active player.
///
/// A click performs the armed skill when one is armed and allowed, otherwise
/// walks toward the click. When there is nowhere to walk, the click falls
/// back to [`fallback_skill`] aimed at the click point.
#[allow(clippy::too_many_arguments)]
pub fn handle_player_input(
    mut commands: Commands,
    map: Option<Res<MapGrid>>,
    mut clicks: EventReader<WorldClickedEvent>,
    mut buttons: EventReader<PlayerButtonEvent>,
    active: Query<Entity, With<TurnComponentIsActive>>,
    players: Query<(Entity, &PlayerComponent), Without<DeathTimer>>,
    mut turns: Query<&mut TurnComponent>,
    mut bodies: Query<(Entity, &mut Motion, Has<DeathTimer>), With<TurnComponent>>,
    skills: Query<&SkillComponent>,
    mut arm: EventWriter<SetActiveSkillEvent>,
    mut perform: EventWriter<PerformActiveSkillEvent>,
) {
    for event in buttons.read() {
        let Some((entity, _)) = players.iter().find(|(_, player)| player.kind == event.kind) else {
            debug!("No living {:?} to activate", event.kind);
            continue;
        };
        commands.queue(move |world: &mut World| {
            change_active_entity(world, entity);
        });
    }

    for event in clicks.read() {
        let Ok(entity) = active.get_single() else {
            continue;
        };
        if !players.contains(entity) {
            continue;
        }
        let Ok(mut turn) = turns.get_mut(entity) else {
            continue;
        };

        let armed = skills
            .get(entity)
            .map(SkillComponent::active_skill)
            .unwrap_or_default();
        if !matches!(armed, SkillType::None | SkillType::Move) && turn.can_start_skill() {
            perform.send(PerformActiveSkillEvent {
                entity,
                target: event.position,
            });
            continue;
        }

        if !turn.can_start_moving() {
            continue;
        }
        let walking = bodies
            .get(entity)
            .is_ok_and(|(_, motion, _)| !motion.path.is_empty());
        if walking {
            continue;
        }

        let path = match map.as_deref() {
            Some(map) => path_for(
                map,
                entity,
                event.position,
                bodies
                    .iter()
                    .filter(|(_, _, dead)| !dead)
                    .map(|(e, motion, _)| (e, motion)),
            ),
            None => Vec::new(),
        };

        if !path.is_empty() {
            if let Ok((_, mut motion, _)) = bodies.get_mut(entity) {
                motion.path = path.into();
                turn.is_moving = true;
            }
        } else if turn.can_start_skill() {
            let skill = fallback_skill(skills.get(entity).ok());
            debug!("{:?} has nowhere to walk, using {:?} instead", entity, skill);
            arm.send(SetActiveSkillEvent { entity, skill });
            perform.send(PerformActiveSkillEvent {
                entity,
                target: event.position,
            });
        }
    }
}

/// Advance the turn when the active combatant is done, and start mob turns
pub fn advance_turns(world: &mut World) {
    if world
        .get_resource::<BattleOutcome>()
        .is_some_and(|outcome| outcome.is_decided())
    {
        return;
    }

    let dt = world.resource::<Time>().delta_secs();
    {
        let mut clock = world.resource_mut::<TurnClock>();
        if clock.transition_timer > 0.0 {
            clock.transition_timer -= dt;
            return;
        }
    }

    let Some(active) = active_entity(world) else {
        next_active_entity(world);
        return;
    };

    let Some(turn) = world.get::<TurnComponent>(active).copied() else {
        debug_assert!(false, "active {:?} has no TurnComponent", active);
        error!("Active {:?} has no TurnComponent", active);
        next_active_entity(world);
        return;
    };

    let dead = world.get::<DeathTimer>(active).is_some();
    let done = completion_rule(world).is_complete(&turn) && !turn.is_acting();
    if dead || done {
        next_active_entity(world);
        return;
    }

    if world.get::<MobComponent>(active).is_some() && turn.can_start_moving() {
        let max_tiles = world
            .get_resource::<SimulationSettings>()
            .map(|settings| settings.mob_move_tiles)
            .unwrap_or_default();
        if let Some(mut turn) = world.get_mut::<TurnComponent>(active) {
            turn.is_moving = true;
        }
        world.send_event(StartMobMoveEvent {
            entity: active,
            max_tiles,
        });
    }
}
