//! The UCI command loop.

use anyhow::Context;
use chess_core::Color;
use chess_engine::Position;
use chess_search::{IterationInfo, SearchEngine, SearchLimits, SearchOutcome};
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing::{debug, info, warn};
use uci::{EngineInfo, GoOptions, GuiCommand, InfoBuilder, Score, UciEngine, UciError};

use crate::config::EngineConfig;

/// Moves the remaining clock is spread over when `go` gives no `movestogo`.
const CLOCK_FRACTION: u64 = 40;

/// One engine process talking to one GUI.
pub struct Session<R: BufRead, W: Write> {
    io: UciEngine<R, W>,
    search: SearchEngine,
    position: Position,
    name: String,
    author: String,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(io: UciEngine<R, W>, config: &EngineConfig) -> Self {
        Session {
            io,
            search: SearchEngine::new(config.search.clone()),
            position: Position::startpos(),
            name: config.name.clone(),
            author: config.author.clone(),
        }
    }

    /// Handles commands until `quit` or end of input.
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let cmd = match self.io.read_command() {
                Ok(cmd) => cmd,
                Err(UciError::IoError(err)) => return Err(err).context("failed to read from the GUI"),
                Err(err) => {
                    warn!(%err, "rejected command");
                    continue;
                }
            };
            if !self.handle(cmd)? {
                info!("quit");
                return Ok(());
            }
        }
    }

    /// Executes one command. Returns `false` once the session should end.
    pub fn handle(&mut self, cmd: GuiCommand) -> anyhow::Result<bool> {
        match cmd {
            GuiCommand::Uci => {
                self.io.send_id(&self.name, &self.author)?;
                self.io.send_uciok()?;
            }
            GuiCommand::IsReady => self.io.send_readyok()?,
            GuiCommand::UciNewGame => {
                self.position = Position::startpos();
                self.search.new_game();
                debug!("new game");
            }
            GuiCommand::Position { fen, moves } => match build_position(fen.as_deref(), &moves) {
                Ok(position) => {
                    debug!(fen = %position.to_fen(), "position set");
                    self.position = position;
                }
                Err(err) => warn!(error = %format!("{:#}", err), "rejected position, keeping the previous one"),
            },
            GuiCommand::Go(opts) => self.go(&opts)?,
            // Searches run to completion before the next command is read.
            GuiCommand::Stop => {}
            GuiCommand::Quit => return Ok(false),
            GuiCommand::Unknown(line) => {
                if !line.is_empty() {
                    debug!(%line, "ignoring unknown command");
                }
            }
        }
        Ok(true)
    }

    fn go(&mut self, opts: &GoOptions) -> anyhow::Result<()> {
        let limits = limits_for(opts, self.position.side_to_move());
        let io = &mut self.io;
        let mut send_error = None;
        let outcome = self
            .search
            .choose_best_move_with(&self.position, &limits, |iteration| {
                if send_error.is_none() {
                    send_error = io.send_info(iteration_info(iteration)).err();
                }
            });
        if let Some(err) = send_error {
            return Err(err).context("failed to report search progress");
        }

        if self.search.config().strategy.is_mcts() {
            self.io.send_info(mcts_info(&outcome, self.search.config().strategy.name()))?;
        }

        let best = outcome.best_move.map_or_else(|| "0000".to_string(), |mv| mv.to_uci());
        info!(bestmove = %best, nodes = outcome.nodes, elapsed_ms = outcome.elapsed.as_millis() as u64, "move chosen");
        self.io.send_bestmove(&best)?;
        Ok(())
    }
}

/// The start position or `fen`, with `moves` played on it.
fn build_position(fen: Option<&str>, moves: &[String]) -> anyhow::Result<Position> {
    let mut position = match fen {
        Some(fen) => Position::from_fen(fen).with_context(|| format!("bad FEN '{}'", fen))?,
        None => Position::startpos(),
    };
    position.apply_uci_moves(moves)?;
    Ok(position)
}

/// Search limits for `go`. An explicit movetime wins. Otherwise the mover's
/// clock is split over `movestogo` moves (default [`CLOCK_FRACTION`]) plus
/// its increment, never more than the clock itself. `infinite` leaves the
/// configured default budget in place.
fn limits_for(opts: &GoOptions, side: Color) -> SearchLimits {
    let (clock, increment) = match side {
        Color::White => (opts.wtime, opts.winc),
        Color::Black => (opts.btime, opts.binc),
    };
    let moves_left = opts.movestogo.map_or(CLOCK_FRACTION, u64::from).max(1);
    let from_clock = clock
        .filter(|_| !opts.infinite)
        .map(|ms| (ms / moves_left + increment.unwrap_or(0)).min(ms));
    SearchLimits {
        movetime: opts.movetime.or(from_clock).map(Duration::from_millis),
        depth: opts.depth,
    }
}

fn iteration_info(iteration: &IterationInfo) -> EngineInfo {
    let score = match iteration.mate_in() {
        Some(moves) => Score::Mate(moves),
        None => Score::Cp(iteration.score),
    };
    let millis = iteration.elapsed.as_millis() as u64;
    InfoBuilder::new()
        .depth(iteration.depth)
        .score(score)
        .nodes(iteration.nodes)
        .nps(iteration.nodes * 1000 / millis.max(1))
        .time(millis)
        .pv(iteration.pv.iter().map(|mv| mv.to_uci()).collect())
        .build()
}

fn mcts_info(outcome: &SearchOutcome, strategy: &str) -> EngineInfo {
    InfoBuilder::new()
        .nodes(outcome.nodes)
        .time(outcome.elapsed.as_millis() as u64)
        .string(&format!("{} iterations {}", strategy, outcome.nodes))
        .build()
}
