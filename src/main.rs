//! # Wayfarer Main Entry Point
//!
//! Parses the command line, sets up logging and runs a line-oriented session
//! on stdin/stdout.

use clap::{Parser, Subcommand};
use log::{debug, error, info};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use wayfarer::{
    config, render_known_map, render_viewport, GameState, InputHandler, MessageLog, Reply,
    SystemClock, WayfarerError, WayfarerResult, WorldState,
};

/// Command line arguments for Wayfarer.
#[derive(Parser, Debug)]
#[command(name = "wayfarer")]
#[command(about = "Explore an endless generated world, trade in its towns and storm its strongholds")]
#[command(version)]
struct Args {
    /// World seed for new games (random when omitted)
    #[arg(short, long)]
    seed: Option<u32>,

    /// Save file used by `play`, `save` and `load`
    #[arg(long, default_value = config::DEFAULT_SAVE_FILE)]
    save_file: PathBuf,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Start a fresh game, ignoring any save file
    New,
    /// Continue the saved game, or start a new one when there is none
    Play,
    /// Print the map around the origin of a world and exit
    Map {
        /// Radius of the printed square
        #[arg(short, long, default_value_t = 10)]
        radius: i32,
        /// Print the tiles classified in the save file instead
        #[arg(long)]
        saved: bool,
    },
}

fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);
    info!("Starting Wayfarer v{}", wayfarer::VERSION);

    if let Err(e) = run(&args) {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes `env_logger` with `log_level` unless RUST_LOG is set.
fn initialize_logging(log_level: &str) {
    let env = env_logger::Env::default().default_filter_or(log_level);
    env_logger::Builder::from_env(env)
        .format_target(false)
        .init();
}

fn run(args: &Args) -> WayfarerResult<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    match args.command.as_ref().unwrap_or(&Mode::Play) {
        Mode::New => run_game(args, GameState::new(seed)),
        Mode::Play => {
            let game = match GameState::load(&args.save_file) {
                Ok(game) => {
                    info!("loaded {}", args.save_file.display());
                    game
                }
                Err(WayfarerError::SaveNotFound(_)) => {
                    info!("no save file, starting a new world with seed {seed}");
                    GameState::new(seed)
                }
                Err(e) => return Err(e),
            };
            run_game(args, game)
        }
        Mode::Map { radius, saved } => {
            let map = if *saved {
                let game = GameState::load(&args.save_file)?;
                render_known_map(&game.world, Some(game.position()))
            } else {
                let mut world = WorldState::new(seed);
                render_viewport(&mut world, wayfarer::Position::origin(), *radius)
            };
            println!("{map}");
            Ok(())
        }
    }
}

/// Main game loop: read a line, run it, print the reply.
fn run_game(args: &Args, mut game: GameState) -> WayfarerResult<()> {
    let handler = InputHandler::new(args.save_file.clone(), SystemClock::new());
    let mut messages = MessageLog::default();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let intro = game.current_terrain_description();
    writeln!(stdout, "Welcome, wayfarer! Type `help` for commands.")?;
    writeln!(stdout, "{intro}")?;
    messages.push(intro);

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match handler.handle_line(&line, &mut game) {
            Ok(Reply::Quit) => break,
            Ok(Reply::History) => {
                for message in messages.iter() {
                    writeln!(stdout, "  {message}")?;
                }
            }
            Ok(Reply::Text(text)) => {
                writeln!(stdout, "{text}")?;
                messages.push(text);
            }
            Err(e) => {
                debug!("command failed: {e}");
                writeln!(stdout, "{e}")?;
                messages.push(e.to_string());
            }
        }
    }

    info!("Game loop ended after {} steps", game.statistics.steps_taken);
    Ok(())
}
