//! Headless mode for agentic testing
//!
//! Runs a level from start to finish without any graphical output, with the
//! players on autopilot. Suitable for automated testing and balancing runs.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- --headless battle_config.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "level": "assets/levels/kitchen.json",
//!   "save": "assets/saves/campaign.json",
//!   "random_seed": 42,
//!   "max_duration_secs": 300
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::HeadlessBattleConfig;
pub use runner::{build_headless_app, run_headless_battle, BattleResult, CombatantResult};
