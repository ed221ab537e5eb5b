//! Skill activation and delayed resolution
//!
//! Activation plays the skill's animation right away; effects land once the
//! skill's delay has elapsed, which lines them up with the animation's impact
//! frame. The target position is captured at activation.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::component::SkillComponent;
use super::handler::SkillEffect;
use super::provider::TargetInfo;
use super::skill::{Skill, SkillKind};
use super::SkillType;
use crate::battle::components::{Collider, DeathTimer, Motion, SoundEffect};
use crate::battle::projectiles::spawn_projectile;
use crate::battle::stats::StatsComponent;
use crate::battle::turn::TurnComponent;
use crate::combat::events::*;

/// An activated skill waiting for its impact frame
#[derive(Debug, Clone)]
pub struct QueuedSkill {
    pub skill: Skill,
    /// Seconds until resolution
    pub remaining: f32,
}

/// Skills that have been activated but not yet resolved
#[derive(Resource, Debug, Default)]
pub struct SkillQueue {
    queued: Vec<QueuedSkill>,
}

impl SkillQueue {
    pub fn push(&mut self, skill: Skill) {
        let remaining = skill.delay();
        self.queued.push(QueuedSkill { skill, remaining });
    }

    /// Advance every delay by `dt` and take the skills that are due, in
    /// activation order
    pub fn tick(&mut self, dt: f32) -> Vec<Skill> {
        let mut due = Vec::new();
        let mut waiting = Vec::with_capacity(self.queued.len());
        for mut queued in self.queued.drain(..) {
            queued.remaining -= dt;
            if queued.remaining <= 0.0 {
                due.push(queued.skill);
            } else {
                waiting.push(queued);
            }
        }
        self.queued = waiting;
        due
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedSkill> {
        self.queued.iter()
    }
}

/// Writers for everything a resolved skill can request
#[derive(SystemParam)]
pub struct SkillEffectWriters<'w> {
    hits: EventWriter<'w, HitEvent>,
    heals: EventWriter<'w, HealEvent>,
    buffs: EventWriter<'w, BuffEvent>,
    fx: EventWriter<'w, StartFxEvent>,
}

impl SkillEffectWriters<'_> {
    pub fn send(&mut self, instigator: Entity, effect: SkillEffect) {
        match effect {
            SkillEffect::Hit { target, damage } => {
                self.hits.send(HitEvent {
                    instigator,
                    target,
                    damage,
                });
            }
            SkillEffect::Heal { target, amount } => {
                self.heals.send(HealEvent {
                    entity: target,
                    amount,
                });
            }
            SkillEffect::Buff { target, modifier } => {
                self.buffs.send(BuffEvent {
                    entity: target,
                    modifier,
                });
            }
            SkillEffect::Fx { target, fx } => {
                self.fx.send(StartFxEvent { entity: target, fx });
            }
        }
    }
}

/// Arm and activate skills.
///
/// A turn change disarms the new active combatant. Requests for combatants
/// without a [`SkillComponent`], or with nothing armed, are ignored.
pub fn queue_skill_requests(
    mut player_changes: EventReader<PlayerChangeEvent>,
    mut arm_requests: EventReader<SetActiveSkillEvent>,
    mut perform_requests: EventReader<PerformActiveSkillEvent>,
    mut combatants: Query<(&mut SkillComponent, Option<&mut TurnComponent>)>,
    mut queue: ResMut<SkillQueue>,
    mut animations: EventWriter<AnimationChangeEvent>,
    mut sounds: EventWriter<PlaySoundEvent>,
    mut activated: EventWriter<SkillActivatedEvent>,
) {
    for event in player_changes.read() {
        if let Ok((mut skills, _)) = combatants.get_mut(event.entity) {
            skills.set_active_skill(SkillType::None);
        }
    }

    for event in arm_requests.read() {
        let Ok((mut skills, _)) = combatants.get_mut(event.entity) else {
            continue;
        };
        if !skills.set_active_skill(event.skill) {
            debug!("{:?} has no {:?} to arm", event.entity, event.skill);
        }
    }

    for event in perform_requests.read() {
        let Ok((mut skills, turn)) = combatants.get_mut(event.entity) else {
            continue;
        };
        let Some(skill) = skills.active() else {
            debug!("{:?} has no armed skill", event.entity);
            continue;
        };

        // A mob's skill phase is opened by the turn system, which already
        // sets is_using_skill
        if let Some(mut turn) = turn {
            if turn.has_used_skill || turn.is_moving {
                debug!("{:?} cannot use a skill right now", event.entity);
                continue;
            }
            turn.is_using_skill = true;
        }

        let slot = skills.active_skill();
        let mut skill = skill.clone();
        skill.params.target_position = event.target;
        info!(
            "{:?} activates {:?} toward ({:.0}, {:.0})",
            event.entity, slot, event.target.x, event.target.y
        );
        activated.send(SkillActivatedEvent {
            entity: event.entity,
            skill: slot,
            target: event.target,
        });

        animations.send(AnimationChangeEvent {
            entity: event.entity,
            animation: skill.animation(),
        });
        if skill.params.sound != SoundEffect::None {
            sounds.send(PlaySoundEvent {
                sound: skill.params.sound,
            });
        }

        queue.push(skill);
        skills.set_active_skill(SkillType::None);
    }
}

/// Resolve every queued skill whose delay has run out.
///
/// Area skills resolve against a snapshot of the field taken before any
/// effect is sent, so a kill never changes who else is hit. Projectile
/// skills launch their projectile instead and finish when it lands.
pub fn resolve_queued_skills(
    mut commands: Commands,
    time: Res<Time>,
    mut queue: ResMut<SkillQueue>,
    bodies: Query<(Entity, &Motion, Option<&Collider>, Has<DeathTimer>), With<StatsComponent>>,
    mut effects: SkillEffectWriters,
    mut finished: EventWriter<FinishedSkillEvent>,
) {
    let due = queue.tick(time.delta_secs());
    if due.is_empty() {
        return;
    }

    let mut field: Vec<TargetInfo> = bodies
        .iter()
        .map(|(entity, motion, collider, dead)| {
            TargetInfo::from_motion(entity, motion, collider.map(|c| c.0), dead)
        })
        .collect();
    field.sort_by_key(|target| target.entity);

    for skill in due {
        let instigator = skill.instigator();
        let Some(origin) = field.iter().find(|t| t.entity == instigator) else {
            debug!("Dropping skill of despawned {:?}", instigator);
            continue;
        };
        if origin.dead {
            debug!("Dropping skill of defeated {:?}", instigator);
            continue;
        }

        if let SkillKind::Projectile(spec) = skill.kind {
            let launch_from = origin.center;
            spawn_projectile(&mut commands, skill, spec, launch_from);
            continue;
        }

        let resolution = skill.resolve(&field);
        debug!(
            "{:?} resolved a skill on {} target(s)",
            instigator,
            resolution.targets.len()
        );
        for effect in resolution.effects {
            effects.send(instigator, effect);
        }
        finished.send(FinishedSkillEvent { entity: instigator });
    }
}
