//! Ambrosia - turn-based tactical battle core
//!
//! Players and mobs take turns on a tile grid: each may walk once and use
//! one skill per round. Skills pick their targets through providers and
//! filters, apply damage, heals and buffs through handlers, and resolve
//! after a delay or when a projectile lands.
//!
//! This library exposes the battle modules for testing and reuse.

pub mod battle;
pub mod cli;
pub mod combat;
pub mod headless;
pub mod settings;

// Re-export commonly used types
pub use battle::systems::{BattlePhase, BattleStep};
pub use battle::BattlePlugin;
pub use combat::log::{CombatLog, CombatLogEventType};
pub use combat::CombatPlugin;
pub use headless::{BattleResult, HeadlessBattleConfig};
pub use settings::SimulationSettings;
