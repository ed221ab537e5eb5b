//! Combat log recording
//!
//! Turns the battle's event traffic into human-readable log lines.

use bevy::prelude::*;

use super::events::*;
use super::log::{CombatLog, CombatLogEventType};
use crate::battle::stats::StatType;

fn display_name(names: &Query<&Name>, entity: Entity) -> String {
    names
        .get(entity)
        .map(|n| n.as_str().to_string())
        .unwrap_or_else(|_| format!("{:?}", entity))
}

/// Record events to the combat log
#[allow(clippy::too_many_arguments)]
pub fn record_combat_log(
    mut combat_log: ResMut<CombatLog>,
    time: Res<Time>,
    mut player_changes: EventReader<PlayerChangeEvent>,
    mut rounds: EventReader<RoundStartedEvent>,
    mut skills: EventReader<SkillActivatedEvent>,
    mut hits: EventReader<HitEvent>,
    mut heals: EventReader<HealEvent>,
    mut buffs: EventReader<BuffEvent>,
    mut deaths: EventReader<CombatantDeathEvent>,
    names: Query<&Name>,
) {
    // Update battle time
    combat_log.battle_time += time.delta_secs();

    for event in rounds.read() {
        combat_log.log(
            CombatLogEventType::Turn,
            format!("Round {} begins", event.round),
        );
    }

    for event in player_changes.read() {
        let name = display_name(&names, event.entity);
        combat_log.log(CombatLogEventType::Turn, format!("{}'s turn", name));
    }

    for event in skills.read() {
        let name = display_name(&names, event.entity);
        combat_log.log(
            CombatLogEventType::Skill,
            format!(
                "{} uses {:?} at ({:.0}, {:.0})",
                name, event.skill, event.target.x, event.target.y
            ),
        );
    }

    for event in hits.read() {
        let message = format!(
            "{} hits {} for {:.0} raw damage",
            display_name(&names, event.instigator),
            display_name(&names, event.target),
            event.damage
        );
        combat_log.log(CombatLogEventType::Damage, message);
    }

    for event in heals.read() {
        let message = format!(
            "{} is healed for {:.0}",
            display_name(&names, event.entity),
            event.amount
        );
        combat_log.log(CombatLogEventType::Healing, message);
    }

    for event in buffs.read() {
        let name = display_name(&names, event.entity);
        let modifier = &event.modifier;
        if modifier.stat_type == StatType::Stunned {
            combat_log.log(
                CombatLogEventType::CrowdControl,
                format!("{} is stunned for {} turn(s)", name, modifier.num_turns),
            );
        } else {
            combat_log.log(
                CombatLogEventType::Buff,
                format!(
                    "{} gains {:+.2} {:?} for {} turn(s)",
                    name, modifier.value, modifier.stat_type, modifier.num_turns
                ),
            );
        }
    }

    for event in deaths.read() {
        let message = format!(
            "{} has been defeated by {}",
            display_name(&names, event.victim),
            display_name(&names, event.killer)
        );
        combat_log.log(CombatLogEventType::Death, message);
    }
}
