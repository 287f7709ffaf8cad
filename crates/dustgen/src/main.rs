//! Dungeon layout generator
//!
//! Loads a theme catalog, generates one layer or a three-layer stack and
//! prints it as ASCII, JSON or a generation report.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use strum::Display;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use dg_assets::{RegistryError, ThemeRegistry, load_config_file};
use dg_core::{
    ConfigError, DungeonStack, GenerationError, GeneratorConfig, MultiLayerDungeon, RecordingScene,
    SpawnKind, StackThemes,
};

/// Procedural dungeon layout generator
#[derive(Parser, Debug)]
#[command(name = "dustgen")]
#[command(author, version, about = "Generate grid dungeon layouts from a theme catalog", long_about = None)]
struct Args {
    /// Theme catalog (JSON)
    #[arg(short = 'c', long = "catalog", default_value = "demos/catalog.json")]
    catalog: PathBuf,

    /// Theme of layer 0
    #[arg(short = 't', long = "theme")]
    theme: String,

    /// Generator settings (JSON); defaults are used when omitted
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Override the seed
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Draw a fresh seed from entropy
    #[arg(long = "random-seed")]
    random_seed: bool,

    /// Override the target room count
    #[arg(short = 'r', long = "rooms")]
    rooms: Option<usize>,

    /// Override the grid size, as WIDTHxHEIGHT
    #[arg(long = "size", value_parser = parse_size)]
    size: Option<(i32, i32)>,

    /// Also generate the layers above and below
    #[arg(short = 'l', long = "layers")]
    layers: bool,

    /// Theme of the neighbouring layers (defaults to --theme)
    #[arg(long = "neighbour-theme")]
    neighbour_theme: Option<String>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Ascii)]
    format: Format,

    /// Verbose output (repeat for more)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
enum Format {
    Ascii,
    Json,
    Report,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("invalid settings: {0}")]
    Config(#[from] ConfigError),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn parse_size(s: &str) -> Result<(i32, i32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width {w:?}: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height {h:?}: {e}"))?;
    Ok((w, h))
}

/// Log to stderr; `DUSTGEN_LOG` overrides the level picked by `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("DUSTGEN_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn build_config(args: &Args) -> Result<GeneratorConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
        config.use_random_seed = false;
    }
    if args.random_seed {
        config.use_random_seed = true;
    }
    if let Some(rooms) = args.rooms {
        config.target_room_count = rooms;
    }
    if let Some((width, height)) = args.size {
        config.grid_width = width;
        config.grid_height = height;
    }
    config.validate()?;
    Ok(config)
}

fn build_themes(args: &Args, registry: &ThemeRegistry) -> Result<StackThemes, CliError> {
    let base = registry.theme(&args.theme)?;
    if !args.layers {
        return Ok(StackThemes::base_only(base));
    }
    let neighbour = match &args.neighbour_theme {
        Some(name) => registry.theme(name)?,
        None => base.clone(),
    };
    Ok(StackThemes {
        base,
        above: Some(neighbour.clone()),
        below: Some(neighbour),
    })
}

fn print_stack(stack: &DungeonStack, scene: &RecordingScene, format: Format) -> Result<(), CliError> {
    match format {
        Format::Ascii => {
            for layout in &stack.layers {
                println!("layer {}", layout.layer);
                print!("{}", render::render_layer(layout));
                println!();
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(stack)?),
        Format::Report => {
            println!("base seed {}", stack.base_seed);
            for layout in &stack.layers {
                print!("{}", layout.report);
            }
            println!(
                "spawned: {} rooms, {} corridor tiles, {} seals",
                scene.count(SpawnKind::Room),
                scene.count(SpawnKind::Corridor),
                scene.count(SpawnKind::Seal)
            );
        }
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), CliError> {
    let registry = ThemeRegistry::load_from_file(&args.catalog)?;
    let config = build_config(args)?;
    let themes = build_themes(args, &registry)?;
    info!(
        catalog = %args.catalog.display(),
        theme = %args.theme,
        layers = args.layers,
        format = %args.format,
        "generating"
    );

    let mut dungeon = MultiLayerDungeon::new(config, themes);
    let mut scene = RecordingScene::new();
    let stack = dungeon.generate(&mut scene)?;
    print_stack(&stack, &scene, args.format)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dustgen: {e}");
            ExitCode::FAILURE
        }
    }
}
