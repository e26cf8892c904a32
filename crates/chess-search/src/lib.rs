//! Move selection for chess-engine positions.
//!
//! [`SearchEngine`] owns the configuration and a transposition table that
//! persists across the moves of one game, and dispatches `go` requests to
//! either iterative-deepening negamax or one of the MCTS variants.
//!
//! ```
//! use chess_engine::Position;
//! use chess_search::{SearchConfig, SearchEngine, SearchLimits};
//!
//! let mut engine = SearchEngine::new(SearchConfig::default());
//! let position = Position::from_fen("6k1/8/6K1/8/8/8/8/7Q w - - 0 1").unwrap();
//! let outcome = engine.choose_best_move(&position, &SearchLimits::depth(3));
//! assert_eq!(outcome.best_move.unwrap().to_uci(), "h1a8");
//! ```

pub mod config;
pub mod mcts;
pub mod negamax;
pub mod ordering;
pub mod tt;

pub use config::{MctsConfig, SearchConfig, Strategy, StrategyParseError};
pub use negamax::{IterationInfo, Searcher};
pub use tt::TranspositionTable;

use chess_core::Move;
use chess_engine::Position;
use mcts::{Mcts, Rollout};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Limits for one `go`. Unset fields fall back to the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub movetime: Option<Duration>,
    pub depth: Option<u32>,
}

impl SearchLimits {
    pub fn movetime(duration: Duration) -> Self {
        SearchLimits {
            movetime: Some(duration),
            depth: None,
        }
    }

    pub fn depth(depth: u32) -> Self {
        SearchLimits {
            movetime: None,
            depth: Some(depth),
        }
    }
}

/// What a search decided.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// `None` when there is no legal move or the chosen move failed the
    /// final legality check.
    pub best_move: Option<Move>,
    /// Negamax score for the side to move, in centipawns.
    pub score: Option<i32>,
    /// Deepest completed negamax iteration; 0 for MCTS.
    pub depth: u32,
    /// Negamax nodes or MCTS iterations.
    pub nodes: u64,
    pub elapsed: Duration,
}

pub struct SearchEngine {
    config: SearchConfig,
    tt: TranspositionTable,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        let tt = TranspositionTable::new(config.tt_size_mb);
        SearchEngine { config, tt }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.config.strategy = strategy;
    }

    /// Forgets everything learned in the previous game.
    pub fn new_game(&mut self) {
        self.tt.clear();
    }

    pub fn hashfull(&self) -> u32 {
        self.tt.hashfull()
    }

    pub fn choose_best_move(&mut self, position: &Position, limits: &SearchLimits) -> SearchOutcome {
        self.choose_best_move_with(position, limits, |_| {})
    }

    /// Like [`SearchEngine::choose_best_move`], calling `on_iteration` after
    /// each completed negamax iteration.
    pub fn choose_best_move_with<F>(&mut self, position: &Position, limits: &SearchLimits, on_iteration: F) -> SearchOutcome
    where
        F: FnMut(&IterationInfo),
    {
        let start = Instant::now();
        let budget = limits
            .movetime
            .unwrap_or(Duration::from_millis(self.config.default_movetime_ms));
        let deadline = start + budget;
        info!(strategy = %self.config.strategy, budget_ms = budget.as_millis() as u64, "search started");

        let outcome = match Rollout::for_strategy(self.config.strategy) {
            None => self.run_negamax(position, limits, deadline, on_iteration),
            Some(rollout) => self.run_mcts(position, rollout, deadline),
        };
        debug!(best = ?outcome.best_move, score = ?outcome.score, nodes = outcome.nodes, "search finished");
        outcome
    }

    fn run_negamax<F>(&mut self, position: &Position, limits: &SearchLimits, deadline: Instant, on_iteration: F) -> SearchOutcome
    where
        F: FnMut(&IterationInfo),
    {
        let max_depth = limits.depth.unwrap_or(self.config.max_depth);
        let mut searcher = Searcher::new(&mut self.tt, Some(deadline));
        let result = searcher.iterative_deepening(position, max_depth, on_iteration);
        let nodes = searcher.nodes();

        match result {
            Some((mv, info)) => SearchOutcome {
                best_move: confirm_legal(position, mv),
                score: Some(info.score),
                depth: info.depth,
                nodes,
                elapsed: info.elapsed,
            },
            None => SearchOutcome {
                best_move: None,
                score: None,
                depth: 0,
                nodes,
                elapsed: Duration::ZERO,
            },
        }
    }

    fn run_mcts(&mut self, position: &Position, rollout: Rollout, deadline: Instant) -> SearchOutcome {
        let mut mcts = Mcts::new(position, rollout, &self.config.mcts);
        let outcome = mcts.run(deadline, self.config.mcts.max_iterations);
        SearchOutcome {
            best_move: outcome.best_move,
            score: None,
            depth: 0,
            nodes: outcome.iterations,
            elapsed: outcome.elapsed,
        }
    }
}

fn confirm_legal(position: &Position, mv: Move) -> Option<Move> {
    let legal = chess_engine::generate_legal(position).contains(mv);
    if !legal {
        tracing::warn!(%mv, "search produced an illegal move, reporting none");
    }
    legal.then_some(mv)
}

/// One-shot search with a fresh engine.
pub fn choose_best_move(position: &Position, config: &SearchConfig, limits: &SearchLimits) -> SearchOutcome {
    SearchEngine::new(config.clone()).choose_best_move(position, limits)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATE_IN_ONE: &str = "6k1/8/6K1/8/8/8/8/7Q w - - 0 1";

    fn seeded(strategy: Strategy, iterations: u64) -> SearchConfig {
        SearchConfig {
            strategy,
            tt_size_mb: 1,
            mcts: MctsConfig {
                seed: Some(17),
                max_iterations: Some(iterations),
                guided_plies: 1,
                greedy_plies: 2,
                ..MctsConfig::default()
            },
            ..SearchConfig::default()
        }
    }

    #[test]
    fn negamax_finds_the_queen_mate() {
        let position = Position::from_fen(MATE_IN_ONE).unwrap();
        let outcome = choose_best_move(&position, &seeded(Strategy::Negamax, 0), &SearchLimits::depth(4));
        assert_eq!(outcome.best_move.map(|m| m.to_uci()).as_deref(), Some("h1a8"));
        assert_eq!(outcome.score, Some(chess_engine::MATE_SCORE - 1));
    }

    #[test]
    fn every_strategy_finds_the_rook_mate() {
        let position = Position::from_fen("k7/8/1K6/8/8/8/8/7R w - - 0 1").unwrap();
        for strategy in Strategy::ALL {
            let limits = SearchLimits {
                movetime: Some(Duration::from_secs(600)),
                depth: Some(3),
            };
            let outcome = choose_best_move(&position, &seeded(strategy, 1500), &limits);
            assert_eq!(
                outcome.best_move.map(|m| m.to_uci()).as_deref(),
                Some("h1h8"),
                "{}",
                strategy
            );
        }
    }

    #[test]
    fn no_legal_move_means_no_best_move() {
        let mated = Position::from_fen("Q5k1/8/6K1/8/8/8/8/8 b - - 1 1").unwrap();
        for strategy in Strategy::ALL {
            let outcome = choose_best_move(&mated, &seeded(strategy, 10), &SearchLimits::depth(2));
            assert_eq!(outcome.best_move, None, "{}", strategy);
        }
    }

    #[test]
    fn exhausted_budget_still_moves() {
        let position = Position::startpos();
        for strategy in Strategy::ALL {
            let outcome = choose_best_move(&position, &seeded(strategy, 1000), &SearchLimits::movetime(Duration::ZERO));
            let mv = outcome.best_move.unwrap_or_else(|| panic!("{} gave no move", strategy));
            assert!(chess_engine::generate_legal(&position).contains(mv));
        }
    }

    #[test]
    fn engine_reports_iterations_and_keeps_table() {
        let mut engine = SearchEngine::new(seeded(Strategy::Negamax, 0));
        let position = Position::startpos();
        let mut seen = Vec::new();
        let outcome = engine.choose_best_move_with(&position, &SearchLimits::depth(3), |info| seen.push(info.depth));
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(outcome.depth, 3);
        assert!(engine.hashfull() > 0);

        engine.new_game();
        assert_eq!(engine.hashfull(), 0);
    }

    #[test]
    fn strategy_can_be_switched() {
        let mut engine = SearchEngine::new(seeded(Strategy::Negamax, 50));
        engine.set_strategy(Strategy::MctsCutoff);
        assert_eq!(engine.config().strategy, Strategy::MctsCutoff);
        let outcome = engine.choose_best_move(&Position::startpos(), &SearchLimits::default());
        assert_eq!(outcome.nodes, 50);
        assert!(outcome.best_move.is_some());
    }
}
