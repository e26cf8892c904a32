//! Hybrid UCI chess bot.
//!
//! Plays with iterative-deepening negamax or one of the Monte Carlo tree
//! search variants, chosen by configuration. Logs go to stderr; stdout
//! carries only the protocol.

mod config;
mod session;

use anyhow::Context;
use chess_engine::Position;
use chess_search::Strategy;
use clap::{Parser, Subcommand};
use config::EngineConfig;
use session::Session;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bot-hybrid", version)]
#[command(about = "UCI chess engine with negamax and MCTS search")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Search strategy, overriding the configuration file
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Attack table cache file, overriding the configuration file
    #[arg(long, global = true)]
    attack_cache: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "chess_search=trace" (default: $RUST_LOG, then "info")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Count leaf nodes of the legal move tree
    Perft {
        depth: u32,

        /// Root position (default: the start position)
        #[arg(long)]
        fen: Option<String>,

        /// Print the count below each root move
        #[arg(long)]
        divide: bool,
    },
}

fn init_logging(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).with_context(|| format!("invalid log filter '{}'", level))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn run_perft(depth: u32, fen: Option<&str>, divide: bool) -> anyhow::Result<()> {
    let position = match fen {
        Some(fen) => Position::from_fen(fen).with_context(|| format!("bad FEN '{}'", fen))?,
        None => Position::startpos(),
    };

    let start = Instant::now();
    let mut out = std::io::stdout().lock();
    let nodes = if divide {
        let mut total = 0;
        for (mv, count) in chess_engine::perft_divide(&position, depth) {
            writeln!(out, "{}: {}", mv, count)?;
            total += count;
        }
        writeln!(out)?;
        total
    } else {
        chess_engine::perft(&position, depth)
    };
    let elapsed = start.elapsed();
    writeln!(out, "Nodes searched: {}", nodes)?;
    tracing::info!(depth, nodes, elapsed_ms = elapsed.as_millis() as u64, "perft finished");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let mut config = EngineConfig::load_or_default(cli.config.as_deref())?;
    if let Some(strategy) = cli.strategy {
        config.search.strategy = strategy;
    }
    if let Some(path) = cli.attack_cache {
        config.attack_cache = Some(path);
    }

    match &config.attack_cache {
        Some(path) => {
            chess_engine::load_or_build(path);
        }
        None => {
            chess_engine::attack_tables();
        }
    }

    if let Some(Command::Perft { depth, fen, divide }) = cli.command {
        return run_perft(depth, fen.as_deref(), divide);
    }

    tracing::info!(name = %config.name, strategy = %config.search.strategy, "starting UCI session");
    let mut session = Session::new(uci::stdio_engine(), &config);
    session.run()
}
