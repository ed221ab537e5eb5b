//! Stats and modifiers
//!
//! Each combatant has base stats plus at most one temporary modifier per stat.
//! Hits, heals and buffs arrive as events; this module applies them and emits
//! the resulting death, animation and FX requests.
//!
//! ## Damage pipeline
//!
//! 1. Raw damage is scaled by the instigator's STRENGTH (1 if it has no stats)
//! 2. An active HP_SHIELD modifier absorbs first and is removed when depleted
//! 3. The rest comes off HP, clamped at zero
//! 4. Effective HP (HP + shield) at zero attaches a [`DeathTimer`]

use std::collections::{BTreeMap, HashSet};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::components::{AnimationType, CcImmunity, DeathTimer, FxType};
use super::turn::TurnComponent;
use crate::combat::events::{
    AnimationChangeEvent, BuffEvent, CombatantDeathEvent, HealEvent, HitEvent, RoundStartedEvent,
    StartFxEvent, StopFxEvent,
};
use crate::settings::SimulationSettings;

/// Number of ultimate charges a fresh combatant starts with
pub const MAX_NUM_ULT: f32 = 2.0;

/// Every stat a combatant can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatType {
    Invalid,
    Hp,
    MaxHp,
    HpShield,
    Ambrosia,
    Strength,
    Level,
    NumUltLeft,
    Stunned,
}

/// A temporary, turn-counted additive adjustment to one stat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat_type: StatType,
    pub value: f32,
    /// Rounds left before the modifier expires
    pub num_turns: i32,
}

impl StatModifier {
    pub fn new(stat_type: StatType, value: f32, num_turns: i32) -> Self {
        Self {
            stat_type,
            value,
            num_turns,
        }
    }

    /// The FX shown while this modifier is active
    pub fn fx(&self) -> FxType {
        match self.stat_type {
            StatType::Strength if self.value >= 0.0 => FxType::Buffed,
            StatType::Strength => FxType::Debuffed,
            StatType::Stunned => FxType::Stunned,
            _ => FxType::Shielded,
        }
    }
}

/// Result of pushing damage through shields and HP
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageOutcome {
    /// Damage soaked by the HP_SHIELD modifier
    pub absorbed: f32,
    /// Damage taken off HP
    pub hp_lost: f32,
    /// Whether the shield modifier was used up and removed
    pub shield_broken: bool,
}

/// Base stats and active modifiers of a combatant
#[derive(Component, Debug, Clone, Default)]
pub struct StatsComponent {
    stats: BTreeMap<StatType, f32>,
    modifiers: BTreeMap<StatType, StatModifier>,
}

impl StatsComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style base value setter
    pub fn with(mut self, stat_type: StatType, value: f32) -> Self {
        self.set_base_value(stat_type, value);
        self
    }

    /// Fresh combatant stats: full HP, strength 1, full ultimate charges
    pub fn for_combatant(hp: f32, strength: f32) -> Self {
        Self::new()
            .with(StatType::Hp, hp)
            .with(StatType::MaxHp, hp)
            .with(StatType::Strength, strength)
            .with(StatType::Level, 1.0)
            .with(StatType::NumUltLeft, MAX_NUM_ULT)
    }

    pub fn base_value(&self, stat_type: StatType) -> f32 {
        self.stats.get(&stat_type).copied().unwrap_or(0.0)
    }

    pub fn set_base_value(&mut self, stat_type: StatType, value: f32) {
        debug_assert!(stat_type != StatType::Invalid, "cannot set the Invalid stat");
        self.stats.insert(stat_type, value);
    }

    /// Base value plus the active modifier, if any
    pub fn stat_value(&self, stat_type: StatType) -> f32 {
        debug_assert!(stat_type != StatType::Invalid, "cannot read the Invalid stat");
        let modifier = self
            .modifiers
            .get(&stat_type)
            .map(|m| m.value)
            .unwrap_or(0.0);
        self.base_value(stat_type) + modifier
    }

    /// HP plus whatever the shield can still soak
    pub fn effective_hp(&self) -> f32 {
        self.stat_value(StatType::Hp) + self.stat_value(StatType::HpShield)
    }

    /// HP as a fraction of MAX_HP, for health bars
    pub fn hp_percent(&self) -> f32 {
        let max_hp = self.stat_value(StatType::MaxHp);
        if max_hp <= 0.0 {
            return 0.0;
        }
        (self.stat_value(StatType::Hp) / max_hp).clamp(0.0, 1.0)
    }

    pub fn modifier(&self, stat_type: StatType) -> Option<&StatModifier> {
        self.modifiers.get(&stat_type)
    }

    pub fn modifiers(&self) -> impl Iterator<Item = &StatModifier> {
        self.modifiers.values()
    }

    /// Install a modifier, returning the one it replaced
    pub fn install_modifier(&mut self, modifier: StatModifier) -> Option<StatModifier> {
        self.modifiers.insert(modifier.stat_type, modifier)
    }

    /// Apply already-scaled damage: shield first, then HP (never below zero)
    pub fn absorb_damage(&mut self, damage: f32) -> DamageOutcome {
        let mut remaining = damage.max(0.0);
        let mut outcome = DamageOutcome::default();

        if let Some(shield) = self.modifiers.get_mut(&StatType::HpShield) {
            let absorbed = remaining.min(shield.value.max(0.0));
            shield.value -= absorbed;
            remaining -= absorbed;
            outcome.absorbed = absorbed;
            if shield.value <= 0.0 {
                self.modifiers.remove(&StatType::HpShield);
                outcome.shield_broken = true;
            }
        }

        let hp = self.base_value(StatType::Hp);
        let new_hp = (hp - remaining).max(0.0);
        outcome.hp_lost = hp - new_hp;
        self.stats.insert(StatType::Hp, new_hp);
        outcome
    }

    /// Heal up to MAX_HP, returning the amount actually restored
    pub fn heal(&mut self, amount: f32) -> f32 {
        let hp = self.base_value(StatType::Hp);
        let max_hp = self.stat_value(StatType::MaxHp);
        let new_hp = (hp + amount.max(0.0)).min(max_hp).max(hp);
        self.stats.insert(StatType::Hp, new_hp);
        new_hp - hp
    }

    /// Count every modifier down by one round, returning those that expired
    pub fn tick_modifiers(&mut self) -> Vec<StatModifier> {
        for modifier in self.modifiers.values_mut() {
            modifier.num_turns -= 1;
        }
        let expired: Vec<StatModifier> = self
            .modifiers
            .values()
            .filter(|m| m.num_turns <= 0)
            .copied()
            .collect();
        for modifier in &expired {
            self.modifiers.remove(&modifier.stat_type);
        }
        expired
    }

    /// Drop every modifier, returning them
    pub fn clear_modifiers(&mut self) -> Vec<StatModifier> {
        std::mem::take(&mut self.modifiers).into_values().collect()
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Apply buffs and debuffs, replacing any modifier on the same stat.
///
/// STUNNED is special: it installs no modifier, it extends the turn
/// component's stun counter instead.
pub fn process_buff_events(
    mut buff_events: EventReader<BuffEvent>,
    mut targets: Query<(
        &mut StatsComponent,
        Option<&mut TurnComponent>,
        Has<DeathTimer>,
        Has<CcImmunity>,
    )>,
    mut start_fx: EventWriter<StartFxEvent>,
    mut stop_fx: EventWriter<StopFxEvent>,
) {
    for event in buff_events.read() {
        let Ok((mut stats, turn, dead, cc_immune)) = targets.get_mut(event.entity) else {
            continue;
        };
        if dead {
            continue;
        }
        let modifier = event.modifier;

        if modifier.stat_type == StatType::Stunned {
            if cc_immune {
                debug!("{:?} is immune to stuns", event.entity);
                continue;
            }
            let Some(mut turn) = turn else {
                continue;
            };
            let turns = modifier.num_turns.max(0) as u32;
            turn.stun_duration = turn.stun_duration.max(turns);
            start_fx.send(StartFxEvent {
                entity: event.entity,
                fx: FxType::Stunned,
            });
            continue;
        }

        if let Some(previous) = stats.install_modifier(modifier) {
            if previous.fx() != modifier.fx() {
                stop_fx.send(StopFxEvent {
                    entity: event.entity,
                    fx: previous.fx(),
                });
            }
        }
        start_fx.send(StartFxEvent {
            entity: event.entity,
            fx: modifier.fx(),
        });
    }
}

/// Apply heals, clamped to MAX_HP
pub fn process_heal_events(
    mut heal_events: EventReader<HealEvent>,
    mut targets: Query<(&mut StatsComponent, Has<DeathTimer>)>,
) {
    for event in heal_events.read() {
        let Ok((mut stats, dead)) = targets.get_mut(event.entity) else {
            continue;
        };
        if dead {
            continue;
        }
        if event.amount < 0.0 {
            warn!("Ignoring negative heal of {} on {:?}", event.amount, event.entity);
            continue;
        }
        stats.heal(event.amount);
    }
}

/// Apply hits: strength scaling, shield absorption, HP loss and death detection
#[allow(clippy::too_many_arguments)]
pub fn process_hit_events(
    mut commands: Commands,
    settings: Res<SimulationSettings>,
    mut hit_events: EventReader<HitEvent>,
    mut targets: Query<(&mut StatsComponent, Has<DeathTimer>)>,
    mut animation_events: EventWriter<AnimationChangeEvent>,
    mut stop_fx: EventWriter<StopFxEvent>,
    mut death_events: EventWriter<CombatantDeathEvent>,
) {
    // DeathTimer inserts are deferred, so remember this batch's kills
    let mut killed: HashSet<Entity> = HashSet::new();

    for event in hit_events.read() {
        let strength = targets
            .get(event.instigator)
            .map(|(stats, _)| stats.stat_value(StatType::Strength))
            .unwrap_or(1.0);

        let Ok((mut stats, dead)) = targets.get_mut(event.target) else {
            continue;
        };
        if dead || killed.contains(&event.target) {
            continue;
        }

        let outcome = stats.absorb_damage(event.damage * strength);
        if outcome.shield_broken {
            stop_fx.send(StopFxEvent {
                entity: event.target,
                fx: FxType::Shielded,
            });
        }

        if stats.effective_hp() <= 0.0 {
            killed.insert(event.target);
            commands
                .entity(event.target)
                .insert(DeathTimer::new(settings.death_timer));
            animation_events.send(AnimationChangeEvent {
                entity: event.target,
                animation: AnimationType::Defeat,
            });
            death_events.send(CombatantDeathEvent {
                victim: event.target,
                killer: event.instigator,
            });
            info!("{:?} was defeated by {:?}", event.target, event.instigator);
        } else {
            animation_events.send(AnimationChangeEvent {
                entity: event.target,
                animation: AnimationType::Hit,
            });
        }
    }
}

/// Count modifiers down once per finished round and strip them from the dead.
/// Round 1 closes no earlier round, so it does not count.
pub fn decay_stat_modifiers(
    mut round_events: EventReader<RoundStartedEvent>,
    mut combatants: Query<(Entity, &mut StatsComponent, Has<DeathTimer>)>,
    mut stop_fx: EventWriter<StopFxEvent>,
) {
    let rounds = round_events.read().filter(|event| event.round > 1).count();

    for (entity, mut stats, dead) in combatants.iter_mut() {
        let expired = if dead {
            stats.clear_modifiers()
        } else {
            let mut expired = Vec::new();
            for _ in 0..rounds {
                expired.extend(stats.tick_modifiers());
            }
            expired
        };

        for modifier in expired {
            stop_fx.send(StopFxEvent {
                entity,
                fx: modifier.fx(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combatant() -> StatsComponent {
        StatsComponent::for_combatant(100.0, 1.0)
    }

    #[test]
    fn test_stat_value_adds_modifier_to_base() {
        let mut stats = combatant();
        stats.install_modifier(StatModifier::new(StatType::Strength, 0.4, 1));
        assert!((stats.stat_value(StatType::Strength) - 1.4).abs() < 1e-6);
        assert_eq!(stats.base_value(StatType::Strength), 1.0);
    }

    #[test]
    fn test_shield_absorbs_before_hp() {
        let mut stats = combatant();
        stats.install_modifier(StatModifier::new(StatType::HpShield, 30.0, 2));

        let outcome = stats.absorb_damage(50.0);

        assert_eq!(outcome.absorbed, 30.0);
        assert_eq!(outcome.hp_lost, 20.0);
        assert!(outcome.shield_broken);
        assert!(stats.modifier(StatType::HpShield).is_none());
        assert_eq!(stats.stat_value(StatType::Hp), 80.0);
    }

    #[test]
    fn test_partial_shield_survives() {
        let mut stats = combatant();
        stats.install_modifier(StatModifier::new(StatType::HpShield, 30.0, 2));

        let outcome = stats.absorb_damage(10.0);

        assert!(!outcome.shield_broken);
        assert_eq!(stats.stat_value(StatType::HpShield), 20.0);
        assert_eq!(stats.stat_value(StatType::Hp), 100.0);
    }

    #[test]
    fn test_hp_never_goes_negative() {
        let mut stats = combatant();
        stats.absorb_damage(150.0);
        assert_eq!(stats.stat_value(StatType::Hp), 0.0);
        assert_eq!(stats.effective_hp(), 0.0);
    }

    #[test]
    fn test_heal_clamps_to_max_hp() {
        let mut stats = combatant().with(StatType::Hp, 90.0);
        let restored = stats.heal(50.0);
        assert_eq!(restored, 10.0);
        assert_eq!(stats.stat_value(StatType::Hp), 100.0);
    }

    #[test]
    fn test_modifier_replaces_instead_of_stacking() {
        let mut stats = combatant();
        stats.install_modifier(StatModifier::new(StatType::Strength, 0.1, 1));
        let replaced = stats.install_modifier(StatModifier::new(StatType::Strength, 0.1, 3));

        assert!(replaced.is_some());
        assert_eq!(stats.modifiers().count(), 1);
        assert!((stats.stat_value(StatType::Strength) - 1.1).abs() < 1e-6);
        assert_eq!(stats.modifier(StatType::Strength).map(|m| m.num_turns), Some(3));
    }

    #[test]
    fn test_tick_expires_at_zero_turns() {
        let mut stats = combatant();
        stats.install_modifier(StatModifier::new(StatType::Strength, 0.5, 1));
        stats.install_modifier(StatModifier::new(StatType::HpShield, 30.0, 2));

        let expired = stats.tick_modifiers();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].stat_type, StatType::Strength);
        assert!(stats.modifier(StatType::HpShield).is_some());

        let expired = stats.tick_modifiers();
        assert_eq!(expired.len(), 1);
        assert_eq!(stats.modifiers().count(), 0);
    }

    #[test]
    fn test_fx_follows_sign_of_strength() {
        assert_eq!(StatModifier::new(StatType::Strength, 0.0, 1).fx(), FxType::Buffed);
        assert_eq!(StatModifier::new(StatType::Strength, -0.4, 1).fx(), FxType::Debuffed);
        assert_eq!(StatModifier::new(StatType::HpShield, 30.0, 1).fx(), FxType::Shielded);
    }
}
