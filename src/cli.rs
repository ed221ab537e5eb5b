//! Command-line interface for Ambrosia

use clap::Parser;
use std::path::PathBuf;

use crate::settings::SETTINGS_PATH;

/// Turn-based tactical battle simulator
#[derive(Parser, Debug)]
#[command(name = "ambrosia")]
#[command(about = "Turn-based tactical battle simulator")]
#[command(version)]
pub struct Args {
    /// Run a headless battle with the specified JSON config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Output path for the battle log (overrides the config file)
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum battle duration in seconds (overrides the config file)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulation settings file
    #[arg(long, value_name = "SETTINGS_FILE", default_value = SETTINGS_PATH)]
    pub settings: PathBuf,

    /// Write the default settings to the settings file and exit
    #[arg(long)]
    pub init_settings: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}
