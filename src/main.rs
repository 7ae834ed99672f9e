//! # Cairn Main Entry Point
//!
//! Starts or resumes a session and lets the autopilot play it headless.

use cairn::{Autopilot, CairnResult, ClassKind, GameState, GenerationConfig, Mode};
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Command line arguments for cairn.
#[derive(Parser, Debug)]
#[command(name = "cairn")]
#[command(about = "A procedural dungeon crawl with a turn-based party combat engine")]
#[command(version)]
struct Args {
    /// Random seed for the run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Hero class (warrior, mage, rogue, cleric, ranger)
    #[arg(short, long, default_value = "warrior")]
    class: ClassKind,

    /// Stop once the party goes below this floor
    #[arg(long, default_value_t = 3)]
    floors: u32,

    /// Maximum number of autopilot actions
    #[arg(long, default_value_t = 5_000)]
    max_steps: u64,

    /// Head straight for the stairs instead of exploring
    #[arg(long)]
    dive: bool,

    /// Generation settings as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resume from a saved session instead of starting a new one
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the session here when the run stops
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print the explored map at the end
    #[arg(long)]
    map: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> CairnResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting cairn v{}", cairn::VERSION);

    let mut game = match &args.load {
        Some(path) => {
            info!("Resuming session from {}", path.display());
            GameState::load_from_file(path)?
        }
        None => {
            let config = match &args.config {
                Some(path) => GenerationConfig::from_json_file(path)?,
                None => GenerationConfig::default(),
            };
            let seed = args.seed.unwrap_or_else(rand::random);
            GameState::with_config(args.class, seed, config)?
        }
    };

    let pilot = Autopilot {
        explore: !args.dive,
        ..Autopilot::default()
    };
    let summary = pilot.run(&mut game, args.max_steps, args.floors)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("seed:       {}", game.seed());
        println!("steps:      {}", summary.steps);
        println!("floor:      {}", summary.floor);
        println!("hero level: {}", summary.hero_level);
        println!("gold:       {}", summary.gold);
        println!("outcome:    {:?}", summary.mode);
        println!("enemies defeated: {}", game.statistics.enemies_defeated);
        println!("chests opened:    {}", game.statistics.chests_opened);
    }

    if args.map {
        println!("{}", game.dungeon().render_ascii(true));
    }

    if let Some(path) = &args.save {
        if game.mode() == Mode::Combat {
            log::warn!("not saving: the run stopped mid-encounter");
        } else {
            game.save_to_file(path)?;
            info!("Saved session to {}", path.display());
        }
    }

    Ok(())
}

/// Initializes env_logger, letting `RUST_LOG` override the command line.
fn initialize_logging(log_level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .try_init();
}
