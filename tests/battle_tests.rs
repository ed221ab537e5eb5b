//! Integration tests for the battle simulation
//!
//! These tests drive a bare app (combat and battle plugins, manual time)
//! through whole frames and verify that:
//! - Hits, heals and buffs land on the stats correctly
//! - Modifiers expire with the rounds
//! - Turns cycle through every combatant and back
//! - Skills resolve after their delay, and only for living instigators
//! - Projectiles fly, hit and finish their skill

use std::time::Duration;

use ambrosia::battle::components::{
    ActiveFx, Animated, CharacterKind, Collider, CollisionGroup, DeathTimer, FxType, MapGrid,
    MobComponent, Motion, PlayerComponent,
};
use ambrosia::battle::projectiles::Projectile;
use ambrosia::battle::skills::{
    EntityFilter, EntityHandler, EntityProvider, ProjectileSpec, Skill, SkillComponent,
    SkillKind, SkillParams, SkillType, Trajectory,
};
use ambrosia::battle::stats::{StatModifier, StatType, StatsComponent};
use ambrosia::battle::turn::{active_entity, fallback_skill, TurnClock, TurnComponent};
use ambrosia::battle::world::BattleOutcome;
use ambrosia::combat::events::*;
use ambrosia::combat::log::{CombatLog, CombatLogEventType};
use ambrosia::{BattlePlugin, CombatPlugin};
use bevy::prelude::*;

const BODY: Vec2 = Vec2::new(40.0, 56.0);

// =============================================================================
// Harness
// =============================================================================

fn battle_app() -> App {
    let mut app = App::new();
    app.add_plugins((CombatPlugin, BattlePlugin))
        .init_resource::<Time>();
    app
}

/// Advance simulated time by `secs` and run one frame
fn step(app: &mut App, secs: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(secs));
    app.update();
}

fn spawn_combatant(app: &mut App, position: Vec2, hp: f32, group: CollisionGroup) -> Entity {
    app.world_mut()
        .spawn((
            Motion::new(position, BODY),
            Collider(group),
            StatsComponent::for_combatant(hp, 1.0),
            TurnComponent::default(),
            Animated::default(),
            ActiveFx::default(),
        ))
        .id()
}

fn spawn_player(app: &mut App, kind: CharacterKind, position: Vec2) -> Entity {
    let entity = spawn_combatant(app, position, 100.0, CollisionGroup::PLAYER);
    app.world_mut()
        .entity_mut(entity)
        .insert((Name::new(kind.name()), PlayerComponent { kind }));
    entity
}

fn spawn_mob(app: &mut App, kind: CharacterKind, position: Vec2, hp: f32) -> Entity {
    let entity = spawn_combatant(app, position, hp, CollisionGroup::MOB);
    app.world_mut()
        .entity_mut(entity)
        .insert((Name::new(kind.name()), MobComponent { kind }));
    entity
}

fn give_skill(app: &mut App, owner: Entity, slot: SkillType, skill: Skill) {
    let mut skills = SkillComponent::new();
    skills.add_skill(slot, owner, &[skill]).unwrap();
    app.world_mut().entity_mut(owner).insert(skills);
}

fn params(delay: f32, filters: Vec<EntityFilter>, handler: EntityHandler) -> SkillParams {
    SkillParams {
        instigator: Entity::PLACEHOLDER,
        delay,
        animation: Default::default(),
        sound: Default::default(),
        target_position: Vec2::ZERO,
        filters,
        handler,
        fx: None,
        collide_with_multiple: true,
    }
}

fn hp(app: &App, entity: Entity) -> f32 {
    app.world()
        .get::<StatsComponent>(entity)
        .unwrap()
        .stat_value(StatType::Hp)
}

fn use_skill(app: &mut App, entity: Entity, skill: SkillType, target: Vec2) {
    app.world_mut()
        .send_event(SetActiveSkillEvent { entity, skill });
    app.world_mut()
        .send_event(PerformActiveSkillEvent { entity, target });
}

// =============================================================================
// Stats Tests
// =============================================================================

#[test]
fn test_shield_absorbs_damage_before_hp() {
    let mut app = battle_app();
    let attacker = spawn_combatant(&mut app, Vec2::ZERO, 100.0, CollisionGroup::PLAYER);
    let target = spawn_combatant(&mut app, Vec2::new(64.0, 0.0), 100.0, CollisionGroup::MOB);

    app.world_mut().send_event(BuffEvent {
        entity: target,
        modifier: StatModifier::new(StatType::HpShield, 30.0, 2),
    });
    step(&mut app, 0.01);
    assert!(
        app.world().get::<ActiveFx>(target).unwrap().contains(FxType::Shielded),
        "Shield should show its FX"
    );

    app.world_mut().send_event(HitEvent {
        instigator: attacker,
        target,
        damage: 50.0,
    });
    step(&mut app, 0.01);

    assert_eq!(hp(&app, target), 80.0, "Shield should soak the first 30");
    let stats = app.world().get::<StatsComponent>(target).unwrap();
    assert!(stats.modifier(StatType::HpShield).is_none(), "Broken shield is removed");
    assert!(
        !app.world().get::<ActiveFx>(target).unwrap().contains(FxType::Shielded),
        "Broken shield stops its FX"
    );
}

#[test]
fn test_damage_scales_with_instigator_strength() {
    let mut app = battle_app();
    let attacker = spawn_combatant(&mut app, Vec2::ZERO, 100.0, CollisionGroup::PLAYER);
    let target = spawn_combatant(&mut app, Vec2::new(64.0, 0.0), 100.0, CollisionGroup::MOB);

    app.world_mut().send_event(BuffEvent {
        entity: attacker,
        modifier: StatModifier::new(StatType::Strength, 0.5, 2),
    });
    step(&mut app, 0.01);
    app.world_mut().send_event(HitEvent {
        instigator: attacker,
        target,
        damage: 20.0,
    });
    step(&mut app, 0.01);

    assert_eq!(hp(&app, target), 70.0, "20 damage at strength 1.5");
}

#[test]
fn test_heal_is_clamped_to_max_hp() {
    let mut app = battle_app();
    let attacker = spawn_combatant(&mut app, Vec2::ZERO, 100.0, CollisionGroup::MOB);
    let target = spawn_combatant(&mut app, Vec2::new(64.0, 0.0), 100.0, CollisionGroup::PLAYER);

    app.world_mut().send_event(HitEvent {
        instigator: attacker,
        target,
        damage: 25.0,
    });
    step(&mut app, 0.01);
    app.world_mut().send_event(HealEvent {
        entity: target,
        amount: 60.0,
    });
    step(&mut app, 0.01);

    assert_eq!(hp(&app, target), 100.0, "Heal should stop at MAX_HP");
}

#[test]
fn test_lethal_hit_starts_death_timer_once() {
    let mut app = battle_app();
    let attacker = spawn_combatant(&mut app, Vec2::ZERO, 100.0, CollisionGroup::PLAYER);
    let target = spawn_combatant(&mut app, Vec2::new(64.0, 0.0), 10.0, CollisionGroup::MOB);

    for _ in 0..2 {
        app.world_mut().send_event(HitEvent {
            instigator: attacker,
            target,
            damage: 15.0,
        });
    }
    step(&mut app, 0.01);

    assert_eq!(hp(&app, target), 0.0);
    assert!(app.world().get::<DeathTimer>(target).is_some());
    let deaths = app.world().resource::<Events<CombatantDeathEvent>>();
    assert_eq!(deaths.len(), 1, "Only one death per combatant");
}

#[test]
fn test_modifiers_expire_with_rounds() {
    let mut app = battle_app();
    let target = spawn_combatant(&mut app, Vec2::ZERO, 100.0, CollisionGroup::PLAYER);

    app.world_mut().send_event(BuffEvent {
        entity: target,
        modifier: StatModifier::new(StatType::Strength, 0.5, 2),
    });
    step(&mut app, 0.01);

    app.world_mut().send_event(RoundStartedEvent { round: 2 });
    step(&mut app, 0.01);
    let stats = app.world().get::<StatsComponent>(target).unwrap();
    assert_eq!(stats.modifier(StatType::Strength).map(|m| m.num_turns), Some(1));
    assert!(app.world().get::<ActiveFx>(target).unwrap().contains(FxType::Buffed));

    app.world_mut().send_event(RoundStartedEvent { round: 3 });
    step(&mut app, 0.01);
    let stats = app.world().get::<StatsComponent>(target).unwrap();
    assert!(stats.modifier(StatType::Strength).is_none(), "Expired after two rounds");
    assert_eq!(stats.stat_value(StatType::Strength), 1.0);
    assert!(!app.world().get::<ActiveFx>(target).unwrap().contains(FxType::Buffed));
}

#[test]
fn test_cc_immune_combatant_ignores_stun() {
    let mut app = battle_app();
    let target = spawn_combatant(&mut app, Vec2::ZERO, 100.0, CollisionGroup::MOB);
    app.world_mut()
        .entity_mut(target)
        .insert(ambrosia::battle::components::CcImmunity);

    app.world_mut().send_event(BuffEvent {
        entity: target,
        modifier: StatModifier::new(StatType::Stunned, 1.0, 2),
    });
    step(&mut app, 0.01);

    assert_eq!(app.world().get::<TurnComponent>(target).unwrap().stun_duration, 0);
}

// =============================================================================
// Turn Tests
// =============================================================================

#[test]
fn test_players_act_before_mobs() {
    let mut app = battle_app();
    let mob = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(256.0, 0.0), 40.0);
    let player = spawn_player(&mut app, CharacterKind::Raoul, Vec2::ZERO);

    step(&mut app, 0.05);

    assert_eq!(active_entity(app.world_mut()), Some(player));
    assert_ne!(active_entity(app.world_mut()), Some(mob));
}

#[test]
fn test_first_activation_opens_round_one() {
    let mut app = battle_app();
    let first = spawn_player(&mut app, CharacterKind::Raoul, Vec2::ZERO);
    spawn_player(&mut app, CharacterKind::Chia, Vec2::new(0.0, 128.0));
    spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(448.0, 0.0), 40.0);
    app.world_mut().send_event(BuffEvent {
        entity: first,
        modifier: StatModifier::new(StatType::Strength, 0.5, 2),
    });

    step(&mut app, 0.05);

    assert_eq!(active_entity(app.world_mut()), Some(first));
    assert_eq!(
        app.world().resource::<TurnClock>().round,
        1,
        "The first player acts in round 1"
    );
    let stats = app.world().get::<StatsComponent>(first).unwrap();
    assert_eq!(
        stats.modifier(StatType::Strength).map(|m| m.num_turns),
        Some(2),
        "Opening round 1 does not count modifiers down"
    );
    let log = app.world().resource::<CombatLog>();
    assert!(
        log.filter_by_type(CombatLogEventType::Turn)
            .iter()
            .any(|entry| entry.message == "Round 1 begins"),
        "Round 1 is announced"
    );
}

#[test]
fn test_round_trip_returns_to_first_player() {
    let mut app = battle_app();
    app.insert_resource(MapGrid::new(64.0, vec![vec![3; 8]; 3]).unwrap());
    let first = spawn_player(&mut app, CharacterKind::Raoul, Vec2::ZERO);
    let second = spawn_player(&mut app, CharacterKind::Chia, Vec2::new(0.0, 128.0));
    let mob = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(448.0, 128.0), 40.0);

    // Each player passes its walk as soon as it becomes active; the mob walks
    // and then passes its skill
    let mut order = Vec::new();
    for _ in 0..400 {
        step(&mut app, 0.05);
        if let Some(active) = active_entity(app.world_mut()) {
            if order.last() != Some(&active) {
                order.push(active);
                if active != mob && app.world().resource::<TurnClock>().round == 1 {
                    app.world_mut()
                        .send_event(FinishedMovementEvent { entity: active });
                }
            }
        }
        if app.world().resource::<TurnClock>().round >= 2 {
            break;
        }
    }

    assert_eq!(
        order,
        vec![first, second, mob, first],
        "Players in order, then the mob, then the first player again"
    );
    assert_eq!(app.world().resource::<TurnClock>().round, 2, "A new round started");
    assert_eq!(active_entity(app.world_mut()), Some(first));
    for entity in [first, second, mob] {
        assert_eq!(
            *app.world().get::<TurnComponent>(entity).unwrap(),
            TurnComponent::default(),
            "Round start resets {:?}",
            entity
        );
    }
    let mob_position = app.world().get::<Motion>(mob).unwrap().position;
    assert!(mob_position.x < 448.0, "The mob walked toward the players");
}

#[test]
fn test_stunned_player_loses_its_turn() {
    let mut app = battle_app();
    let stunned = spawn_player(&mut app, CharacterKind::Raoul, Vec2::ZERO);
    let other = spawn_player(&mut app, CharacterKind::Chia, Vec2::new(0.0, 128.0));
    spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(448.0, 0.0), 40.0);
    app.world_mut()
        .get_mut::<TurnComponent>(stunned)
        .unwrap()
        .stun_duration = 1;

    step(&mut app, 0.05);

    assert_eq!(active_entity(app.world_mut()), Some(other));
    let turn = app.world().get::<TurnComponent>(stunned).unwrap();
    assert_eq!(turn.stun_duration, 0);
    assert!(turn.has_moved && turn.has_used_skill, "Forfeited turn is complete");
}

#[test]
fn test_player_button_switches_active_player() {
    let mut app = battle_app();
    let raoul = spawn_player(&mut app, CharacterKind::Raoul, Vec2::ZERO);
    let chia = spawn_player(&mut app, CharacterKind::Chia, Vec2::new(0.0, 128.0));
    spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(448.0, 0.0), 40.0);

    step(&mut app, 0.05);
    assert_eq!(active_entity(app.world_mut()), Some(raoul));

    app.world_mut().send_event(PlayerButtonEvent {
        kind: CharacterKind::Chia,
    });
    step(&mut app, 0.05);

    assert_eq!(active_entity(app.world_mut()), Some(chia));
}

// =============================================================================
// Skill Tests
// =============================================================================

fn melee(delay: f32, damage: f32) -> Skill {
    Skill::new(
        SkillKind::Melee {
            provider: EntityProvider::Circular { radius: 100.0 },
        },
        params(
            delay,
            vec![EntityFilter::Instigator, EntityFilter::Collision(CollisionGroup::MOB)],
            EntityHandler::Damage { amount: damage },
        ),
    )
}

#[test]
fn test_skill_resolves_after_its_delay() {
    let mut app = battle_app();
    let player = spawn_player(&mut app, CharacterKind::Raoul, Vec2::ZERO);
    let mob = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(64.0, 0.0), 100.0);
    give_skill(&mut app, player, SkillType::Skill1, melee(1.0, 30.0));

    step(&mut app, 0.05);
    use_skill(&mut app, player, SkillType::Skill1, Vec2::new(64.0, -28.0));

    step(&mut app, 0.4);
    assert_eq!(hp(&app, mob), 100.0, "Nothing after 0.4s");
    assert!(app.world().get::<TurnComponent>(player).unwrap().is_using_skill);
    step(&mut app, 0.4);
    assert_eq!(hp(&app, mob), 100.0, "Nothing after 0.8s");
    step(&mut app, 0.4);
    assert_eq!(hp(&app, mob), 70.0, "Resolved by 1.2s");

    let turn = app.world().get::<TurnComponent>(player).unwrap();
    assert!(turn.has_used_skill);
    assert!(!turn.is_using_skill);
}

#[test]
fn test_second_skill_in_a_turn_is_rejected() {
    let mut app = battle_app();
    let player = spawn_player(&mut app, CharacterKind::Raoul, Vec2::ZERO);
    let mob = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(64.0, 0.0), 100.0);
    give_skill(&mut app, player, SkillType::Skill1, melee(0.0, 10.0));

    step(&mut app, 0.05);
    use_skill(&mut app, player, SkillType::Skill1, Vec2::new(64.0, -28.0));
    step(&mut app, 0.1);
    use_skill(&mut app, player, SkillType::Skill1, Vec2::new(64.0, -28.0));
    step(&mut app, 0.1);

    assert_eq!(hp(&app, mob), 90.0, "Only the first activation lands");
}

#[test]
fn test_melee_hits_only_the_nearest_mob() {
    let mut app = battle_app();
    let player = spawn_player(&mut app, CharacterKind::Raoul, Vec2::ZERO);
    let near = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(64.0, 0.0), 100.0);
    let far = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(-80.0, 0.0), 100.0);
    give_skill(&mut app, player, SkillType::Skill1, melee(0.0, 10.0));

    step(&mut app, 0.05);
    use_skill(&mut app, player, SkillType::Skill1, Vec2::new(64.0, -28.0));
    step(&mut app, 0.1);

    assert_eq!(hp(&app, near), 90.0);
    assert_eq!(hp(&app, far), 100.0);
}

#[test]
fn test_defeated_instigator_drops_its_queued_skill() {
    let mut app = battle_app();
    let player = spawn_player(&mut app, CharacterKind::Raoul, Vec2::ZERO);
    let mob = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(64.0, 0.0), 100.0);
    give_skill(&mut app, player, SkillType::Skill1, melee(1.0, 30.0));

    step(&mut app, 0.05);
    use_skill(&mut app, player, SkillType::Skill1, Vec2::new(64.0, -28.0));
    step(&mut app, 0.2);

    app.world_mut().send_event(HitEvent {
        instigator: mob,
        target: player,
        damage: 1000.0,
    });
    step(&mut app, 0.2);
    assert!(app.world().get::<DeathTimer>(player).is_some());

    for _ in 0..3 {
        step(&mut app, 0.5);
    }
    assert_eq!(hp(&app, mob), 100.0, "A defeated combatant's skill never lands");
}

#[test]
fn test_only_accepted_skill_requests_are_logged() {
    let mut app = battle_app();
    let player = spawn_player(&mut app, CharacterKind::Raoul, Vec2::ZERO);
    spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(64.0, 0.0), 100.0);
    give_skill(&mut app, player, SkillType::Skill1, melee(0.0, 10.0));
    step(&mut app, 0.05);

    // Nothing armed, so the request is ignored
    app.world_mut().send_event(PerformActiveSkillEvent {
        entity: player,
        target: Vec2::new(64.0, -28.0),
    });
    step(&mut app, 0.05);
    let log = app.world().resource::<CombatLog>();
    assert!(log.filter_by_type(CombatLogEventType::Skill).is_empty());

    use_skill(&mut app, player, SkillType::Skill1, Vec2::new(64.0, -28.0));
    step(&mut app, 0.05);
    let log = app.world().resource::<CombatLog>();
    let skills = log.filter_by_type(CombatLogEventType::Skill);
    assert_eq!(skills.len(), 1);
    assert!(skills[0].message.starts_with("Raoul uses Skill1"), "{}", skills[0].message);
}

#[test]
fn test_last_mob_down_is_victory() {
    let mut app = battle_app();
    let player = spawn_player(&mut app, CharacterKind::Raoul, Vec2::ZERO);
    spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(64.0, 0.0), 10.0);
    give_skill(&mut app, player, SkillType::Skill1, melee(0.0, 30.0));

    step(&mut app, 0.05);
    use_skill(&mut app, player, SkillType::Skill1, Vec2::new(64.0, -28.0));
    step(&mut app, 0.1);

    assert_eq!(*app.world().resource::<BattleOutcome>(), BattleOutcome::Victory);
}

// =============================================================================
// Projectile Tests
// =============================================================================

fn projectile(trajectory: Trajectory, collide_with_multiple: bool) -> Skill {
    let mut params = params(
        0.0,
        vec![EntityFilter::Instigator, EntityFilter::Collision(CollisionGroup::MOB)],
        EntityHandler::Damage { amount: 20.0 },
    );
    params.collide_with_multiple = collide_with_multiple;
    Skill::new(
        SkillKind::Projectile(ProjectileSpec {
            trajectory,
            launch_speed: 600.0,
            size: (16.0, 16.0),
        }),
        params,
    )
}

fn projectile_count(app: &mut App) -> usize {
    app.world_mut()
        .query::<&Projectile>()
        .iter(app.world())
        .count()
}

#[test]
fn test_linear_projectile_hits_first_mob_and_finishes_skill() {
    let mut app = battle_app();
    let player = spawn_player(&mut app, CharacterKind::Taji, Vec2::ZERO);
    let first = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(192.0, 0.0), 100.0);
    let second = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(320.0, 0.0), 100.0);
    give_skill(&mut app, player, SkillType::Skill1, projectile(Trajectory::Linear, false));

    step(&mut app, 0.05);
    use_skill(&mut app, player, SkillType::Skill1, Vec2::new(320.0, -28.0));
    step(&mut app, 0.05);
    assert_eq!(projectile_count(&mut app), 1, "Projectile launched");

    for _ in 0..40 {
        step(&mut app, 0.05);
    }

    assert_eq!(hp(&app, first), 80.0);
    assert_eq!(hp(&app, second), 100.0, "Flight ends at the first hit");
    assert_eq!(projectile_count(&mut app), 0, "Projectile despawned");
    let turn = app.world().get::<TurnComponent>(player).unwrap();
    assert!(turn.has_used_skill && !turn.is_using_skill);
}

#[test]
fn test_piercing_projectile_hits_every_mob_once() {
    let mut app = battle_app();
    let player = spawn_player(&mut app, CharacterKind::Ember, Vec2::ZERO);
    let first = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(192.0, 0.0), 100.0);
    let second = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(320.0, 0.0), 100.0);
    give_skill(&mut app, player, SkillType::Skill1, projectile(Trajectory::Linear, true));

    step(&mut app, 0.05);
    use_skill(&mut app, player, SkillType::Skill1, Vec2::new(448.0, -28.0));
    for _ in 0..40 {
        step(&mut app, 0.05);
    }

    assert_eq!(hp(&app, first), 80.0);
    assert_eq!(hp(&app, second), 80.0);
    assert_eq!(hp(&app, player), 100.0, "Launcher is filtered out");
    assert_eq!(projectile_count(&mut app), 0);
}

#[test]
fn test_boomerang_returns_and_finishes() {
    let mut app = battle_app();
    let player = spawn_player(&mut app, CharacterKind::Ember, Vec2::ZERO);
    let mob = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(256.0, 0.0), 100.0);
    give_skill(&mut app, player, SkillType::Skill1, projectile(Trajectory::Boomerang, true));

    step(&mut app, 0.05);
    use_skill(&mut app, player, SkillType::Skill1, Vec2::new(256.0, -28.0));
    for _ in 0..60 {
        step(&mut app, 0.05);
    }

    assert_eq!(hp(&app, mob), 80.0, "Hit once across both legs");
    assert_eq!(projectile_count(&mut app), 0);
    assert!(app.world().get::<TurnComponent>(player).unwrap().has_used_skill);
}

// =============================================================================
// Click Fallback Tests
// =============================================================================

#[test]
fn test_fallback_prefers_a_projectile_skill() {
    let owner = Entity::PLACEHOLDER;
    let mut skills = SkillComponent::new();
    skills.add_skill(SkillType::Skill1, owner, &[melee(0.0, 10.0)]).unwrap();
    assert_eq!(fallback_skill(Some(&skills)), SkillType::Skill1, "Melee only");

    skills
        .add_skill(SkillType::Skill2, owner, &[projectile(Trajectory::Linear, false)])
        .unwrap();
    assert_eq!(fallback_skill(Some(&skills)), SkillType::Skill2);
    assert_eq!(fallback_skill(None), SkillType::Skill1);
}

#[test]
fn test_click_with_nowhere_to_walk_fires_ranged_skill() {
    let mut app = battle_app();
    let player = spawn_player(&mut app, CharacterKind::Taji, Vec2::ZERO);
    let mob = spawn_mob(&mut app, CharacterKind::Egg, Vec2::new(192.0, 0.0), 100.0);
    let mut skills = SkillComponent::new();
    skills.add_skill(SkillType::Skill1, player, &[melee(0.0, 10.0)]).unwrap();
    skills
        .add_skill(SkillType::Skill2, player, &[projectile(Trajectory::Linear, false)])
        .unwrap();
    app.world_mut().entity_mut(player).insert(skills);

    // No map is loaded, so there is never a path
    step(&mut app, 0.05);
    app.world_mut().send_event(WorldClickedEvent {
        position: Vec2::new(192.0, -28.0),
    });
    for _ in 0..20 {
        step(&mut app, 0.05);
    }

    assert_eq!(hp(&app, mob), 80.0, "The projectile reached the mob");
    assert!(app.world().get::<TurnComponent>(player).unwrap().has_used_skill);
}
