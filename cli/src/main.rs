use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use minigames_core::catalog::{picture_or_default, DEFAULT_PICTURE};
use minigames_core::grid::{square_grid_for_count, DEFAULT_PIECE_COUNT, DIFFICULTY_DIM_BASE};
use minigames_core::{
    Gesture, GameContext, GestureConfig, PuzzleImage, PuzzleRules, PuzzleSession, PuzzleSnapshot,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod bot;
mod replay;

#[derive(Parser)]
#[command(name = "minigames-cli", version, about = "Headless tools for the brain minigames")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Puzzle {
        #[command(subcommand)]
        command: PuzzleCommand,
    },
    Gestures {
        #[command(subcommand)]
        command: GestureCommand,
    },
}

#[derive(Subcommand)]
enum PuzzleCommand {
    /// Sets up a puzzle and lets a bot solve it.
    Solve {
        #[arg(long, default_value_t = DEFAULT_PIECE_COUNT)]
        pieces: usize,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long, default_value = DEFAULT_PICTURE)]
        picture: String,
        #[arg(long, env = "MINIGAMES_CONFIG")]
        config: Option<PathBuf>,
        #[arg(long)]
        save: Option<PathBuf>,
        #[command(flatten)]
        bot: bot::BotArgs,
    },
    /// Prints the summary of a saved puzzle snapshot.
    Inspect { path: PathBuf },
}

#[derive(Subcommand)]
enum GestureCommand {
    /// Replays an NDJSON skeleton trace through the gesture tracker.
    Replay {
        path: PathBuf,
        #[arg(long = "gesture", required = true)]
        gestures: Vec<String>,
        #[arg(long, default_value_t = 1)]
        user: u32,
        #[arg(long, env = "MINIGAMES_CONFIG")]
        config: Option<PathBuf>,
    },
    List,
}

/// Optional TOML file; missing tables and keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CliConfig {
    puzzle: PuzzleRules,
    gestures: GestureConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Puzzle { command } => match command {
            PuzzleCommand::Solve {
                pieces,
                seed,
                picture,
                config,
                save,
                bot,
            } => {
                let entry = picture_or_default(&picture);
                if !entry.name.eq_ignore_ascii_case(picture.trim()) {
                    warn!("unknown picture {picture}, using {}", entry.name);
                }
                let config = load_config(config.as_deref())?;
                let grid = square_grid_for_count(pieces)?;
                let difficulty = (grid.dim - DIFFICULTY_DIM_BASE) as u32;
                let seed = match seed.as_deref() {
                    Some(raw) => parse_seed_arg(raw)?,
                    None => rand::rng().random(),
                };
                println!("seed: {seed:#x}");

                let mut ctx = GameContext::in_memory(difficulty);
                let image = PuzzleImage::from_picture(entry);
                let mut session =
                    PuzzleSession::start(&mut ctx, &image, config.puzzle, seed, 0.0)?;
                let mut rng = StdRng::seed_from_u64(u64::from(seed));
                let outcome = bot::run_solver(&mut session, &mut ctx, bot.config()?, &mut rng)?;

                let stats = session.stats();
                println!("picture: {}", stats.picture_name);
                println!("won: {}", outcome.won);
                println!("moves: {}", stats.total_moves());
                println!("connecting_moves: {}", stats.connecting_moves);
                println!("components: {}", session.assembly().component_count());
                println!("elapsed_s: {:.1}", stats.elapsed(outcome.finished_at));
                if let Some(camera) = session.camera() {
                    println!(
                        "camera: ({:.2}, {:.2}, {:.2}) size {:.2}",
                        camera.position.x,
                        camera.position.y,
                        camera.position.z,
                        camera.ortho_size
                    );
                }
                for scene in &ctx.scenes.loaded {
                    println!("scene: {scene:?}");
                }

                if let Some(path) = save {
                    let bytes = session.snapshot().to_bytes()?;
                    std::fs::write(&path, bytes)?;
                    info!("snapshot written to {}", path.display());
                }
            }
            PuzzleCommand::Inspect { path } => {
                let bytes = std::fs::read(&path)?;
                let snapshot = PuzzleSnapshot::from_bytes(&bytes)?;
                let session = PuzzleSession::resume(&snapshot, 0.0)?;
                println!("version: {}", snapshot.version);
                println!("grid: {0}x{0}", snapshot.dim);
                println!("pieces: {}", snapshot.piece_count());
                println!("components: {}", snapshot.components.len());
                println!("won: {}", session.is_won());
                println!("picture: {}", snapshot.stats.picture_name);
                println!(
                    "moves: {} ({} connecting)",
                    snapshot.stats.total_moves(),
                    snapshot.stats.connecting_moves
                );
            }
        },
        Commands::Gestures { command } => match command {
            GestureCommand::Replay {
                path,
                gestures,
                user,
                config,
            } => {
                let config = load_config(config.as_deref())?;
                let gestures = gestures
                    .iter()
                    .map(|name| name.parse::<Gesture>())
                    .collect::<Result<Vec<_>, _>>()?;
                let summary = replay::replay_file(&path, user, &gestures, config.gestures)?;
                println!(
                    "frames: {} completed: {} cancelled: {} keys: {}",
                    summary.frames, summary.completed, summary.cancelled, summary.keys
                );
            }
            GestureCommand::List => {
                for gesture in Gesture::ALL {
                    let kind = if gesture.is_continuous() { " (continuous)" } else { "" };
                    match gesture.navigation_key() {
                        Some(key) => println!("{}{kind} -> {}", gesture.as_str(), key.as_str()),
                        None => println!("{}{kind}", gesture.as_str()),
                    }
                }
            }
        },
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let raw = std::fs::read_to_string(path)?;
    let config = toml::from_str(&raw)?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

fn err_msg(message: impl Into<String>) -> Box<dyn std::error::Error> {
    let message: String = message.into();
    message.into()
}

fn parse_seed_arg(raw: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    let value = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)?
    } else {
        trimmed.parse::<u32>()?
    };
    Ok(value)
}
