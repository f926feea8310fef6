//! Connect6 against a Monte Carlo Tree Search engine.
//!
//! ## Usage
//!
//! - `connect6` - Play as Black with the default 4 second budget
//! - `connect6 play --color white --time 10` - Play as White, 10 s per engine move
//! - `connect6 demo` - Watch the engine play a few turns against itself

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use connect6::board::{Board, Color};
use connect6::config::SearchConfig;
use connect6::constants::{DEFAULT_ITERATIONS, DEFAULT_TIME_LIMIT_SECS};
use connect6::game::{GameSession, Outcome};
use connect6::mcts::{Mcts, budget_from_secs};

/// Connect6 against an MCTS engine
#[derive(Parser)]
#[command(name = "connect6")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the engine in the terminal
    Play(PlayArgs),
    /// Let the engine play a few turns against itself
    Demo {
        /// Number of turns to play
        #[arg(long, default_value_t = 6)]
        turns: usize,
        /// Seconds per move
        #[arg(long, default_value_t = 1.0)]
        time: f64,
    },
}

#[derive(Args)]
struct PlayArgs {
    /// Stones the human plays with (Black moves first)
    #[arg(long, value_enum, default_value_t = Side::Black)]
    color: Side,

    /// Engine time budget per move, in seconds
    #[arg(long, visible_alias = "tpj", default_value_t = DEFAULT_TIME_LIMIT_SECS)]
    time: u64,

    /// Maximum MCTS iterations per move
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Seed for the engine's random generator
    #[arg(long)]
    seed: Option<u64>,

    /// Share statistics between transposed positions
    #[arg(long)]
    transpositions: bool,
}

impl Default for PlayArgs {
    fn default() -> Self {
        Self {
            color: Side::Black,
            time: DEFAULT_TIME_LIMIT_SECS,
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            transpositions: false,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Side {
    #[value(alias = "negras")]
    Black,
    #[value(alias = "blancas")]
    White,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::Black => Color::Black,
            Side::White => Color::White,
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init()?;

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command.unwrap_or_else(|| Commands::Play(PlayArgs::default())) {
        Commands::Play(args) => run_game(args),
        Commands::Demo { turns, time } => run_demo(turns, time),
    }
}

fn run_game(args: PlayArgs) -> Result<()> {
    let config = SearchConfig::default()
        .with_iterations(args.iterations)
        .with_time_limit(Duration::from_secs(args.time))
        .with_transpositions(args.transpositions);
    config.validate()?;

    let human = Color::from(args.color);
    println!("You play {human}, the engine has {}s per move.", args.time);
    info!(%human, time = args.time, iterations = args.iterations, "starting game");

    let engine = match args.seed {
        Some(seed) => Mcts::with_seed(config, seed),
        None => Mcts::new(config),
    };
    let mut session = GameSession::new(engine, human);
    let outcome = session.play(&mut io::stdin().lock(), &mut io::stdout())?;

    match outcome {
        Outcome::Winner(winner) if winner == human => println!("You win!"),
        Outcome::Winner(_) => println!("The engine wins."),
        Outcome::Draw => println!("Draw."),
        Outcome::Abandoned => println!("Game abandoned."),
    }
    Ok(())
}

fn run_demo(turns: usize, time: f64) -> Result<()> {
    println!("Connect6: MCTS self-play demo\n");

    let config = SearchConfig::default().with_time_limit(budget_from_secs(time));
    let mut engine = Mcts::with_seed(config, 2024);
    let mut board = Board::new();

    for _ in 0..turns {
        let player = board.current_player();
        let report = engine.analyze(&board, player);
        let Some(mv) = report.best else {
            println!("{player} has no move");
            break;
        };
        board.apply_move(mv, player);
        println!(
            "{player} plays {mv} ({} iterations{})",
            report.iterations,
            if report.forced { ", forced" } else { "" }
        );
        if let Some(winner) = board.winner() {
            println!("{winner} wins");
            break;
        }
    }

    println!("\n{board}");
    Ok(())
}
