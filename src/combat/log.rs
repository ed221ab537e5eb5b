//! Combat logging
//!
//! Records battle events for display and post-battle analysis.

use bevy::prelude::*;
use std::fmt::Write as _;

/// A single entry in the combat log
#[derive(Debug, Clone)]
pub struct CombatLogEntry {
    /// Timestamp in battle time (seconds since battle start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatLogEventType {
    /// Damage dealt
    Damage,
    /// Healing done
    Healing,
    /// Buff/debuff applied
    Buff,
    /// Stun applied
    CrowdControl,
    /// Combatant died
    Death,
    /// Skill performed
    Skill,
    /// Active combatant or round changed
    Turn,
    /// Battle event (start, end, etc.)
    MatchEvent,
}

/// Summary written at the top of a saved log
#[derive(Debug, Clone)]
pub struct BattleLogHeader {
    pub level_name: String,
    pub outcome: String,
    pub rounds: u32,
}

/// The combat log resource storing all events
#[derive(Resource, Default)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current battle time
    pub battle_time: f32,
}

impl CombatLog {
    /// Clear the log for a new battle
    pub fn clear(&mut self) {
        self.entries.clear();
        self.battle_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.battle_time,
            event_type,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get only HP-changing events (damage and healing)
    pub fn hp_changes_only(&self) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.event_type,
                    CombatLogEventType::Damage | CombatLogEventType::Healing
                )
            })
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Render the log as a plain-text report
    pub fn to_report(&self, header: &BattleLogHeader) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "Level: {}", header.level_name);
        let _ = writeln!(report, "Outcome: {}", header.outcome);
        let _ = writeln!(report, "Rounds: {}", header.rounds);
        let _ = writeln!(report, "Duration: {:.1}s", self.battle_time);
        let _ = writeln!(report);
        for entry in &self.entries {
            let _ = writeln!(
                report,
                "[{:>7.2}] {:<12} {}",
                entry.timestamp,
                format!("{:?}", entry.event_type),
                entry.message
            );
        }
        report
    }

    /// Save the log to `path`, or to a timestamp-free default name.
    ///
    /// Returns the path written.
    pub fn save_to_file(
        &self,
        header: &BattleLogHeader,
        path: Option<&str>,
    ) -> Result<String, String> {
        let filename = path
            .map(str::to_string)
            .unwrap_or_else(|| format!("battle_log_{}.txt", header.level_name));

        std::fs::write(&filename, self.to_report(header))
            .map_err(|e| format!("Failed to write {}: {}", filename, e))?;

        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_keeps_chronological_order() {
        let mut log = CombatLog::default();
        for i in 0..5 {
            log.log(CombatLogEventType::Turn, format!("entry {}", i));
        }

        let recent: Vec<&str> = log.recent(2).iter().map(|e| e.message.as_str()).collect();
        assert_eq!(recent, vec!["entry 3", "entry 4"]);
    }

    #[test]
    fn test_report_contains_header_and_entries() {
        let mut log = CombatLog::default();
        log.battle_time = 3.5;
        log.log(CombatLogEventType::Damage, "Raoul hits Egg for 30".to_string());

        let report = log.to_report(&BattleLogHeader {
            level_name: "tutorial".to_string(),
            outcome: "Victory".to_string(),
            rounds: 2,
        });

        assert!(report.contains("Level: tutorial"));
        assert!(report.contains("Outcome: Victory"));
        assert!(report.contains("Raoul hits Egg for 30"));
    }
}
