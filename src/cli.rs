// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::scene::{DEFAULT_CITY_SIZE, MAX_CITY_SIZE};

/// Object list to open with
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartScene {
    /// Nothing in the scene
    Empty,
    /// A single spinning cube
    #[default]
    Cube,
    /// A grid of city blocks
    City,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "scene-animator")]
#[command(about = "Keyframe scene viewer", long_about = None)]
pub struct Cli {
    /// Disable the timeline overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// JSON viewer config (playback rate, window, camera)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON object list to load instead of a generated scene
    #[arg(long)]
    pub objects: Option<PathBuf>,

    /// Generated scene to start with
    #[arg(long, value_enum, default_value_t = StartScene::Cube)]
    pub scene: StartScene,

    /// Blocks per side for the city scene
    #[arg(
        long,
        default_value_t = DEFAULT_CITY_SIZE,
        value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_CITY_SIZE))
    )]
    pub city_size: u32,

    /// Timeline length in frames (overrides the config file)
    #[arg(long)]
    pub duration: Option<u32>,

    /// Start playing immediately
    #[arg(long, default_value = "false")]
    pub play: bool,

    /// Run without a window for this many seconds, then print a summary
    #[arg(long, value_name = "SECONDS")]
    pub headless: Option<f32>,
}
