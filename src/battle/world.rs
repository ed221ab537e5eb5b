//! Corpse cleanup and battle outcome

use bevy::prelude::*;

use super::components::{DeathTimer, MobComponent, PlayerComponent};
use crate::combat::log::{CombatLog, CombatLogEventType};

/// How the battle stands
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BattleOutcome {
    #[default]
    InProgress,
    /// Every mob is down
    Victory,
    /// Every player is down
    Defeat,
}

impl BattleOutcome {
    pub fn is_decided(&self) -> bool {
        *self != BattleOutcome::InProgress
    }

    pub fn name(&self) -> &'static str {
        match self {
            BattleOutcome::InProgress => "In progress",
            BattleOutcome::Victory => "Victory",
            BattleOutcome::Defeat => "Defeat",
        }
    }
}

/// Count death timers down. Expired mobs are despawned; defeated players
/// stay on the field.
pub fn tick_death_timers(
    mut commands: Commands,
    time: Res<Time>,
    mut timers: Query<(Entity, &mut DeathTimer, Has<MobComponent>)>,
) {
    let dt = time.delta_secs();
    for (entity, mut timer, is_mob) in timers.iter_mut() {
        if timer.has_expired() {
            continue;
        }
        timer.remaining -= dt;
        if timer.has_expired() && is_mob {
            debug!("Despawning defeated {:?}", entity);
            commands.entity(entity).despawn();
        }
    }
}

/// Decide the battle once one side has nobody left standing
pub fn update_battle_outcome(
    mut outcome: ResMut<BattleOutcome>,
    mut combat_log: ResMut<CombatLog>,
    players: Query<Has<DeathTimer>, With<PlayerComponent>>,
    mobs: Query<Has<DeathTimer>, With<MobComponent>>,
) {
    if outcome.is_decided() {
        return;
    }

    let players_standing = players.iter().filter(|dead| !dead).count();
    let mobs_standing = mobs.iter().filter(|dead| !dead).count();

    let decided = if players_standing == 0 {
        BattleOutcome::Defeat
    } else if mobs_standing == 0 {
        BattleOutcome::Victory
    } else {
        return;
    };

    *outcome = decided;
    info!("Battle over: {}", decided.name());
    combat_log.log(
        CombatLogEventType::MatchEvent,
        format!("Battle over: {}", decided.name()),
    );
}
