//! Headless battle execution
//!
//! Runs a level to completion without any graphical output, suitable for
//! automated testing. The app is stepped by hand at a fixed frame rate, so a
//! seeded battle replays identically.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::path::Path;
use std::time::Duration;

use crate::battle::components::{Autopilot, DeathTimer, GameRng, PlayerComponent};
use crate::battle::level::{spawn_level, LevelConfig, SaveData};
use crate::battle::skills::load_character_definitions;
use crate::battle::stats::{StatType, StatsComponent};
use crate::battle::systems::run_battle_substeps;
use crate::battle::turn::TurnClock;
use crate::battle::world::BattleOutcome;
use crate::battle::BattlePlugin;
use crate::combat::log::{BattleLogHeader, CombatLog, CombatLogEventType};
use crate::combat::CombatPlugin;
use crate::settings::SimulationSettings;

use super::config::HeadlessBattleConfig;

/// Frames per simulated second
const FRAME_RATE: f64 = 30.0;

/// Result of a completed headless battle
///
/// This struct provides programmatic access to battle results for testing and analysis.
#[derive(Debug, Clone)]
pub struct BattleResult {
    /// How the battle ended; `InProgress` means it timed out
    pub outcome: BattleOutcome,
    /// Rounds started before the battle ended
    pub rounds: u32,
    /// Simulated battle duration in seconds
    pub battle_time: f32,
    /// Combatants still on the field when the battle ended
    pub combatants: Vec<CombatantResult>,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// Statistics for a single combatant after the battle
#[derive(Debug, Clone, PartialEq)]
pub struct CombatantResult {
    pub name: String,
    pub is_player: bool,
    pub max_hp: f32,
    /// HP remaining at battle end
    pub final_hp: f32,
    pub survived: bool,
}

/// Resource to track headless battle state
#[derive(Resource)]
pub struct HeadlessBattleState {
    /// Maximum battle duration before giving up
    pub max_duration: f32,
    /// Elapsed battle time
    pub elapsed_time: f32,
    /// Custom output path for the battle log
    pub output_path: Option<String>,
    pub write_log: bool,
    pub level_name: String,
    /// Whether the battle has completed
    pub battle_complete: bool,
    /// Random seed for deterministic simulation (if provided)
    pub random_seed: Option<u64>,
    /// Battle result (populated when the battle completes)
    pub result: Option<BattleResult>,
}

/// Plugin for headless battle bookkeeping.
///
/// Adds timeout tracking and end-of-battle reporting on top of the battle
/// simulation; the battle itself comes from [`BattlePlugin`].
pub struct HeadlessPlugin {
    pub config: HeadlessBattleConfig,
    pub level_name: String,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(HeadlessBattleState {
            max_duration: self.config.max_duration_secs,
            elapsed_time: 0.0,
            output_path: self.config.output_path.clone(),
            write_log: self.config.write_log,
            level_name: self.level_name.clone(),
            battle_complete: false,
            random_seed: self.config.random_seed,
            result: None,
        });

        // Runs after the frame's battle steps
        app.add_systems(
            Update,
            (headless_track_time, headless_check_battle_end)
                .chain()
                .after(run_battle_substeps),
        );
    }
}

/// Track elapsed battle time for timeout detection
fn headless_track_time(time: Res<Time>, mut headless_state: ResMut<HeadlessBattleState>) {
    headless_state.elapsed_time += time.delta_secs();
}

/// Check if the battle has ended (one side down, or timeout)
fn headless_check_battle_end(
    combatants: Query<(&Name, &StatsComponent, Has<PlayerComponent>, Has<DeathTimer>)>,
    outcome: Res<BattleOutcome>,
    clock: Res<TurnClock>,
    combat_log: Res<CombatLog>,
    mut headless_state: ResMut<HeadlessBattleState>,
) {
    if headless_state.battle_complete {
        return;
    }

    if !outcome.is_decided() {
        if headless_state.elapsed_time < headless_state.max_duration {
            return;
        }
        info!(
            "Battle timed out after {:.1}s in round {}",
            headless_state.elapsed_time, clock.round
        );
    }

    let mut results: Vec<CombatantResult> = combatants
        .iter()
        .map(|(name, stats, is_player, dead)| CombatantResult {
            name: name.as_str().to_string(),
            is_player,
            max_hp: stats.stat_value(StatType::MaxHp),
            final_hp: stats.base_value(StatType::Hp),
            survived: !dead,
        })
        .collect();
    // Players first, each side by name
    results.sort_by(|a, b| b.is_player.cmp(&a.is_player).then(a.name.cmp(&b.name)));

    let result = BattleResult {
        outcome: *outcome,
        rounds: clock.round,
        battle_time: headless_state.elapsed_time,
        combatants: results,
        random_seed: headless_state.random_seed,
    };

    if headless_state.write_log {
        let header = BattleLogHeader {
            level_name: headless_state.level_name.clone(),
            outcome: outcome.name().to_string(),
            rounds: clock.round,
        };
        match combat_log.save_to_file(&header, headless_state.output_path.as_deref()) {
            Ok(filename) => println!("Battle complete. Log saved to: {}", filename),
            Err(e) => eprintln!("Failed to save combat log: {}", e),
        }
    }

    headless_state.result = Some(result);
    headless_state.battle_complete = true;
}

/// Build a ready-to-step headless app for `config`.
///
/// Loads the character catalog, level and optional save, and spawns the
/// level. Players are put on autopilot when the config asks for it.
pub fn build_headless_app(
    config: &HeadlessBattleConfig,
    mut settings: SimulationSettings,
) -> Result<App, String> {
    config.validate()?;
    let definitions = load_character_definitions(&config.characters)?;
    let level = LevelConfig::load_from_file(Path::new(&config.level))?;
    let save = config
        .save
        .as_ref()
        .map(|path| SaveData::load_from_file(Path::new(path)))
        .transpose()?;

    if let Some(rule) = config.turn_completion {
        settings.turn_completion = rule;
    }
    settings.validate()?;

    let game_rng = match config.random_seed {
        Some(seed) => {
            info!("Using deterministic RNG with seed: {}", seed);
            GameRng::from_seed(seed)
        }
        None => {
            info!("Using non-deterministic RNG (no seed provided)");
            GameRng::from_entropy()
        }
    };

    let mut app = App::new();
    app
        // Minimal plugins - no window, no rendering
        .add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / FRAME_RATE,
        )))
        .add_plugins((CombatPlugin, BattlePlugin))
        .insert_resource(settings)
        .insert_resource(game_rng)
        .add_plugins(HeadlessPlugin {
            config: config.clone(),
            level_name: level.name.clone(),
        });

    let world = app.world_mut();
    spawn_level(world, &level, &definitions, save.as_ref())?;

    if config.autopilot {
        let players: Vec<Entity> = world
            .query_filtered::<Entity, With<PlayerComponent>>()
            .iter(world)
            .collect();
        for player in players {
            world.entity_mut(player).insert(Autopilot);
        }
    }

    let mut combat_log = world.resource_mut::<CombatLog>();
    combat_log.clear();
    combat_log.log(
        CombatLogEventType::MatchEvent,
        format!("Battle started on '{}' (headless mode)", level.name),
    );

    Ok(app)
}

/// Run a headless battle with the given configuration
pub fn run_headless_battle(
    config: &HeadlessBattleConfig,
    settings: SimulationSettings,
) -> Result<BattleResult, String> {
    println!("Starting headless battle simulation...");
    println!("  Level: {}", config.level);
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    let mut app = build_headless_app(config, settings)?;
    app.finish();
    app.cleanup();

    // Generous cap in case simulated time stops advancing
    let max_frames = ((config.max_duration_secs as f64 + 2.0) * FRAME_RATE * 2.0) as u64;
    for _ in 0..max_frames {
        app.update();
        if let Some(result) = app.world_mut().resource_mut::<HeadlessBattleState>().result.take() {
            return Ok(result);
        }
    }

    Err(format!("Battle did not finish within {} frames", max_frames))
}
