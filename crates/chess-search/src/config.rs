//! Search configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which search runs on `go`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Iterative-deepening alpha-beta negamax.
    #[default]
    Negamax,
    /// UCT with uniformly random rollouts.
    Mcts,
    /// UCT whose rollouts start with shallow minimax plies, then greedy plies.
    MctsMinimaxRollout,
    /// UCT with random play to a cutoff, then a depth-1 minimax evaluation.
    MctsCutoff,
    /// UCT with random rollouts and minimax-seeded node priors.
    MctsPrimed,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Negamax,
        Strategy::Mcts,
        Strategy::MctsMinimaxRollout,
        Strategy::MctsCutoff,
        Strategy::MctsPrimed,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Strategy::Negamax => "negamax",
            Strategy::Mcts => "mcts",
            Strategy::MctsMinimaxRollout => "mcts-minimax-rollout",
            Strategy::MctsCutoff => "mcts-cutoff",
            Strategy::MctsPrimed => "mcts-primed",
        }
    }

    pub const fn is_mcts(self) -> bool {
        !matches!(self, Strategy::Negamax)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown strategy '{0}' (expected one of negamax, mcts, mcts-minimax-rollout, mcts-cutoff, mcts-primed)")]
pub struct StrategyParseError(pub String);

impl FromStr for Strategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == wanted)
            .ok_or_else(|| StrategyParseError(s.to_string()))
    }
}

/// Tunables shared by every search strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub strategy: Strategy,
    /// Deepest negamax iteration.
    pub max_depth: u32,
    /// Budget for a `go` without `movetime`.
    pub default_movetime_ms: u64,
    pub tt_size_mb: usize,
    pub mcts: MctsConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            strategy: Strategy::Negamax,
            max_depth: 64,
            default_movetime_ms: 300_000,
            tt_size_mb: 16,
            mcts: MctsConfig::default(),
        }
    }
}

/// Monte Carlo tree search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// UCT exploration constant.
    pub exploration: f64,
    /// Random plies per rollout, and the cutoff for `mcts-cutoff`.
    pub rollout_depth: u32,
    /// Depth-1 minimax plies opening a `mcts-minimax-rollout` rollout.
    pub guided_plies: u32,
    /// Greedy plies after the guided ones.
    pub greedy_plies: u32,
    /// Pseudo-visits given to each node by `mcts-primed`.
    pub gamma: u32,
    /// RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Stop after this many iterations even if time remains.
    pub max_iterations: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            exploration: std::f64::consts::SQRT_2,
            rollout_depth: 10,
            guided_plies: 3,
            greedy_plies: 10,
            gamma: 100,
            seed: None,
            max_iterations: None,
        }
    }
}
