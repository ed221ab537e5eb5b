//! Per-character skill catalog

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::skill::Skill;
use super::SkillType;

/// One skill slot and its upgrade levels
#[derive(Debug, Clone, PartialEq)]
pub struct SkillEntry {
    /// 1-based index into `levels`
    curr_level: u32,
    /// `levels[0]` is the variant every character starts with
    levels: Vec<Skill>,
}

impl SkillEntry {
    pub fn new(levels: Vec<Skill>) -> Result<Self, String> {
        if levels.is_empty() {
            return Err("a skill entry needs at least one level".to_string());
        }
        Ok(Self {
            curr_level: 1,
            levels,
        })
    }

    pub fn curr_level(&self) -> u32 {
        self.curr_level
    }

    pub fn num_levels(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn current(&self) -> &Skill {
        &self.levels[self.curr_level as usize - 1]
    }

    /// Move to `level`, clamped to the levels that exist
    fn set_level(&mut self, level: u32) {
        self.curr_level = level.clamp(1, self.num_levels());
    }
}

/// The skills a combatant owns and the one currently armed
#[derive(Component, Debug, Clone, Default)]
pub struct SkillComponent {
    skills: BTreeMap<SkillType, SkillEntry>,
    active: SkillType,
}

impl SkillComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `levels` under `slot`, bound to `owner`
    pub fn add_skill(
        &mut self,
        slot: SkillType,
        owner: Entity,
        levels: &[Skill],
    ) -> Result<(), String> {
        if slot == SkillType::None {
            return Err("cannot register a skill in the None slot".to_string());
        }
        let bound = levels.iter().map(|skill| skill.bound_to(owner)).collect();
        let entry = SkillEntry::new(bound).map_err(|e| format!("{:?}: {}", slot, e))?;
        self.skills.insert(slot, entry);
        Ok(())
    }

    pub fn has_skill(&self, slot: SkillType) -> bool {
        self.skills.contains_key(&slot)
    }

    pub fn entry(&self, slot: SkillType) -> Option<&SkillEntry> {
        self.skills.get(&slot)
    }

    /// Current level variant of `slot`
    pub fn skill(&self, slot: SkillType) -> Option<&Skill> {
        self.skills.get(&slot).map(SkillEntry::current)
    }

    /// Slots this combatant owns, in slot order
    pub fn skill_types(&self) -> impl Iterator<Item = SkillType> + '_ {
        self.skills.keys().copied()
    }

    /// Arm `slot`. Arming a slot the combatant does not own is ignored.
    pub fn set_active_skill(&mut self, slot: SkillType) -> bool {
        if slot != SkillType::None && !self.skills.contains_key(&slot) {
            return false;
        }
        self.active = slot;
        true
    }

    pub fn active_skill(&self) -> SkillType {
        self.active
    }

    /// The armed skill, if any
    pub fn active(&self) -> Option<&Skill> {
        self.skill(self.active)
    }

    /// Raise `slot` by one level. Returns false at the last level.
    pub fn upgrade_skill_level(&mut self, slot: SkillType) -> bool {
        match self.skills.get_mut(&slot) {
            Some(entry) if entry.curr_level < entry.num_levels() => {
                entry.curr_level += 1;
                true
            }
            _ => false,
        }
    }

    /// Current level of every slot, as stored in save files
    pub fn skill_levels(&self) -> BTreeMap<SkillType, u32> {
        self.skills
            .iter()
            .map(|(slot, entry)| (*slot, entry.curr_level))
            .collect()
    }

    /// Restore levels from a save. Unknown slots are ignored and levels are
    /// clamped to what each entry offers.
    pub fn set_skill_levels(&mut self, levels: &BTreeMap<SkillType, u32>) {
        for (slot, level) in levels {
            if let Some(entry) = self.skills.get_mut(slot) {
                entry.set_level(*level);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::skills::{EntityHandler, EntityProvider, SkillKind, SkillParams};

    fn melee(damage: f32) -> Skill {
        Skill::new(
            SkillKind::Melee {
                provider: EntityProvider::Circular { radius: 100.0 },
            },
            SkillParams {
                instigator: Entity::PLACEHOLDER,
                delay: 0.5,
                animation: Default::default(),
                sound: Default::default(),
                target_position: Vec2::ZERO,
                filters: vec![],
                handler: EntityHandler::Damage { amount: damage },
                fx: None,
                collide_with_multiple: true,
            },
        )
    }

    fn component() -> SkillComponent {
        let mut skills = SkillComponent::new();
        skills
            .add_skill(
                SkillType::Skill1,
                Entity::from_raw(3),
                &[melee(10.0), melee(20.0), melee(30.0)],
            )
            .unwrap();
        skills
    }

    #[test]
    fn test_skills_are_bound_to_their_owner() {
        let skills = component();
        assert_eq!(
            skills.skill(SkillType::Skill1).unwrap().instigator(),
            Entity::from_raw(3)
        );
    }

    #[test]
    fn test_arming_unknown_slot_is_ignored() {
        let mut skills = component();
        assert!(!skills.set_active_skill(SkillType::Skill3));
        assert_eq!(skills.active_skill(), SkillType::None);
        assert!(skills.set_active_skill(SkillType::Skill1));
        assert!(skills.active().is_some());
    }

    #[test]
    fn test_upgrade_clamps_at_last_level() {
        let mut skills = component();
        assert!(skills.upgrade_skill_level(SkillType::Skill1));
        assert!(skills.upgrade_skill_level(SkillType::Skill1));
        assert!(!skills.upgrade_skill_level(SkillType::Skill1));
        assert_eq!(skills.entry(SkillType::Skill1).unwrap().curr_level(), 3);
        assert_eq!(
            skills.skill(SkillType::Skill1).unwrap().params.handler,
            EntityHandler::Damage { amount: 30.0 }
        );
    }

    #[test]
    fn test_skill_levels_round_trip() {
        let mut skills = component();
        skills.upgrade_skill_level(SkillType::Skill1);
        let saved = skills.skill_levels();

        let mut restored = component();
        restored.set_skill_levels(&saved);
        assert_eq!(restored.skill_levels(), saved);

        let mut too_high = BTreeMap::new();
        too_high.insert(SkillType::Skill1, 9);
        restored.set_skill_levels(&too_high);
        assert_eq!(restored.entry(SkillType::Skill1).unwrap().curr_level(), 3);
    }

    #[test]
    fn test_empty_entry_is_rejected() {
        let mut skills = SkillComponent::new();
        assert!(skills.add_skill(SkillType::Skill2, Entity::from_raw(1), &[]).is_err());
    }
}
