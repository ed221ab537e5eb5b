//! Ambrosia - turn-based tactical battle simulator
//!
//! Runs battles headless from a JSON config; there is no interactive
//! front end in this binary.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::process::ExitCode;

use ambrosia::cli;
use ambrosia::headless::{run_headless_battle, HeadlessBattleConfig};
use ambrosia::settings::SimulationSettings;

/// Install the log subscriber without building a full app
fn init_logging() {
    let mut app = App::new();
    LogPlugin::default().build(&mut app);
}

fn main() -> ExitCode {
    let args = cli::parse_args();
    init_logging();

    if args.init_settings {
        return match SimulationSettings::default().save(&args.settings) {
            Ok(()) => {
                println!("Wrote default settings to {}", args.settings.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to write settings: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let Some(config_path) = args.headless else {
        eprintln!("Nothing to do: pass --headless <CONFIG_FILE> (see --help)");
        return ExitCode::FAILURE;
    };

    let mut config = match HeadlessBattleConfig::load_from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid headless config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(output) = args.output {
        config.output_path = Some(output.to_string_lossy().into_owned());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if args.seed.is_some() {
        config.random_seed = args.seed;
    }

    let settings = SimulationSettings::load(&args.settings);
    match run_headless_battle(&config, settings) {
        Ok(result) => {
            println!(
                "{} after {} round(s), {:.1}s",
                result.outcome.name(),
                result.rounds,
                result.battle_time
            );
            for combatant in &result.combatants {
                println!(
                    "  {:<10} {:>5.0}/{:<5.0} {}",
                    combatant.name,
                    combatant.final_hp,
                    combatant.max_hp,
                    if combatant.survived { "" } else { "(down)" }
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Headless battle failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
