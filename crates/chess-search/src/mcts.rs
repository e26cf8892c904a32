//! Monte Carlo tree search.
//!
//! Nodes live in one `Vec` and refer to each other by index. Every node
//! stores visit counts and accumulated value from the point of view of the
//! player who made the move leading to it, so UCT maximisation at any node
//! picks the best reply for the side to move there.
//!
//! Four rollout policies share the same select, expand and backpropagate
//! loop; see [`Rollout`].

use crate::config::{MctsConfig, Strategy};
use chess_core::{Color, Move, Piece};
use chess_engine::{
    eval::square_bonus, evaluate_relative, generate_legal, piece_value, static_evaluate, MoveList,
    Position, MATE_SCORE,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::{Duration, Instant};
use tracing::debug;

pub type NodeId = usize;

/// Evaluations beyond this many centipawns count as certain.
const NORMALIZE_RANGE: f64 = 1000.0;

/// How a leaf is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollout {
    /// Uniformly random plies, then the normalised static evaluation.
    Random,
    /// Depth-1 minimax plies, then greedy heuristic plies.
    MinimaxGuided,
    /// Random plies to a cutoff, then a depth-1 minimax evaluation.
    Cutoff,
    /// Random rollouts over nodes seeded with minimax pseudo-visits.
    Primed,
}

impl Rollout {
    pub fn for_strategy(strategy: Strategy) -> Option<Self> {
        match strategy {
            Strategy::Negamax => None,
            Strategy::Mcts => Some(Rollout::Random),
            Strategy::MctsMinimaxRollout => Some(Rollout::MinimaxGuided),
            Strategy::MctsCutoff => Some(Rollout::Cutoff),
            Strategy::MctsPrimed => Some(Rollout::Primed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub position: Position,
    /// Move from the parent, `None` at the root.
    pub mv: Option<Move>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub untried: Vec<Move>,
    pub visits: u64,
    /// Sum of results in `[0, 1]`, for the player who moved into this node.
    pub value: f64,
}

impl Node {
    fn new(position: Position, mv: Option<Move>, parent: Option<NodeId>) -> Self {
        let untried = generate_legal(&position).into_iter().collect();
        Node {
            position,
            mv,
            parent,
            children: Vec::new(),
            untried,
            visits: 0,
            value: 0.0,
        }
    }

    /// The color that played `mv` into this node.
    pub fn mover(&self) -> Color {
        !self.position.side_to_move()
    }

    pub fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value / self.visits as f64
        }
    }

    fn is_terminal(&self) -> bool {
        self.untried.is_empty() && self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MctsOutcome {
    pub best_move: Option<Move>,
    pub iterations: u64,
    pub root_visits: u64,
    /// Mean value of the chosen child for the side to move at the root.
    pub win_rate: Option<f64>,
    pub elapsed: Duration,
}

/// Maps a white-positive centipawn score onto `[0, 1]`, clamped.
pub fn normalize(eval: i32) -> f64 {
    ((f64::from(eval) + NORMALIZE_RANGE) / (2.0 * NORMALIZE_RANGE)).clamp(0.0, 1.0)
}

/// Result of a finished game for White: 0, 0.5 or 1.
fn terminal_value(position: &Position) -> f64 {
    if !position.in_check() {
        0.5
    } else if position.side_to_move() == Color::White {
        0.0
    } else {
        1.0
    }
}

/// Heuristic used by greedy rollout plies: queen promotions first, then
/// piece weight plus the destination square bonus.
fn greedy_score(mv: Move, color: Color) -> i32 {
    let promotion = if mv.is_promotion() && mv.promotion == Piece::Queen {
        1000
    } else {
        0
    };
    promotion + piece_value(mv.piece) / 10 + square_bonus(mv.placed_piece(), color, mv.to.index())
}

/// Depth-1 minimax from the side to move: the best reply and its score.
fn minimax_reply(position: &Position, moves: &MoveList) -> Option<(Move, i32)> {
    let mut best: Option<(Move, i32)> = None;
    for &mv in moves {
        let child = position.make_move(mv);
        let replies = generate_legal(&child);
        let child_score = if replies.is_empty() {
            if child.in_check() {
                -MATE_SCORE
            } else {
                0
            }
        } else {
            evaluate_relative(&child)
        };
        let score = -child_score;
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((mv, score));
        }
    }
    best
}

/// White-positive depth-1 minimax value of `position`, normalised.
fn minimax_value(position: &Position) -> f64 {
    let moves = generate_legal(position);
    match minimax_reply(position, &moves) {
        None => terminal_value(position),
        Some((_, score)) => normalize(position.side_to_move().sign() * score),
    }
}

/// A UCT search over one root position.
pub struct Mcts<'c> {
    config: &'c MctsConfig,
    rollout: Rollout,
    rng: StdRng,
    nodes: Vec<Node>,
}

impl<'c> Mcts<'c> {
    pub fn new(root: &Position, rollout: Rollout, config: &'c MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut mcts = Mcts {
            config,
            rollout,
            rng,
            nodes: vec![Node::new(root.clone(), None, None)],
        };
        if rollout == Rollout::Primed {
            mcts.prime(0);
        }
        mcts
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn uct(&self, child: &Node, parent_visits: u64) -> f64 {
        if child.visits == 0 {
            return f64::INFINITY;
        }
        let visits = child.visits as f64;
        child.value / visits + self.config.exploration * ((parent_visits as f64).ln() / visits).sqrt()
    }

    fn select_child(&self, id: NodeId) -> Option<NodeId> {
        let parent = &self.nodes[id];
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &parent.children {
            let value = self.uct(&self.nodes[child], parent.visits);
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((child, value));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Walks down fully expanded nodes by UCT.
    fn select(&self) -> NodeId {
        let mut id = 0;
        while self.nodes[id].untried.is_empty() {
            match self.select_child(id) {
                Some(child) => id = child,
                None => break,
            }
        }
        id
    }

    /// Plays one untried move of `id`, returning the new child, or `id`
    /// itself when nothing is left to try.
    fn expand(&mut self, id: NodeId) -> NodeId {
        let Some(mv) = self.nodes[id].untried.pop() else {
            return id;
        };
        let position = self.nodes[id].position.make_move(mv);
        let child = self.nodes.len();
        self.nodes.push(Node::new(position, Some(mv), Some(id)));
        self.nodes[id].children.push(child);
        if self.rollout == Rollout::Primed {
            self.prime(child);
        }
        child
    }

    /// Seeds `id` with `gamma` pseudo-visits at its minimax value.
    fn prime(&mut self, id: NodeId) {
        let gamma = self.config.gamma;
        let node = &mut self.nodes[id];
        let white = minimax_value(&node.position);
        let value = if node.mover() == Color::White { white } else { 1.0 - white };
        node.visits += u64::from(gamma);
        node.value += f64::from(gamma) * value;
    }

    fn random_playout(&mut self, position: &mut Position, plies: u32) -> bool {
        for _ in 0..plies {
            let moves = generate_legal(position);
            let Some(&mv) = moves.as_slice().choose(&mut self.rng) else {
                return false;
            };
            position.apply_move(mv);
        }
        !generate_legal(position).is_empty()
    }

    fn greedy_move(&mut self, position: &Position, moves: &MoveList) -> Option<Move> {
        let color = position.side_to_move();
        let mut shuffled = moves.as_slice().to_vec();
        shuffled.shuffle(&mut self.rng);
        let mut best: Option<(Move, i32)> = None;
        for mv in shuffled {
            let score = greedy_score(mv, color);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((mv, score));
            }
        }
        best.map(|(mv, _)| mv)
    }

    /// White-positive result in `[0, 1]` of a rollout from `start`.
    fn simulate(&mut self, start: &Position) -> f64 {
        let mut position = start.clone();
        match self.rollout {
            Rollout::Random | Rollout::Primed => {
                if self.random_playout(&mut position, self.config.rollout_depth) {
                    normalize(static_evaluate(&position))
                } else {
                    terminal_value(&position)
                }
            }
            Rollout::MinimaxGuided => {
                for _ in 0..self.config.guided_plies {
                    let moves = generate_legal(&position);
                    let Some((mv, _)) = minimax_reply(&position, &moves) else {
                        return terminal_value(&position);
                    };
                    position.apply_move(mv);
                }
                for _ in 0..self.config.greedy_plies {
                    let moves = generate_legal(&position);
                    let Some(mv) = self.greedy_move(&position, &moves) else {
                        return terminal_value(&position);
                    };
                    position.apply_move(mv);
                }
                if generate_legal(&position).is_empty() {
                    terminal_value(&position)
                } else {
                    normalize(static_evaluate(&position))
                }
            }
            Rollout::Cutoff => {
                if self.random_playout(&mut position, self.config.rollout_depth) {
                    minimax_value(&position)
                } else {
                    terminal_value(&position)
                }
            }
        }
    }

    /// Adds one visit and `white_result` to every node from `id` up to the
    /// root, each in its own mover's perspective.
    fn backpropagate(&mut self, mut id: NodeId, white_result: f64) {
        loop {
            let node = &mut self.nodes[id];
            node.visits += 1;
            node.value += if node.mover() == Color::White {
                white_result
            } else {
                1.0 - white_result
            };
            match node.parent {
                Some(parent) => id = parent,
                None => break,
            }
        }
    }

    /// Runs one select, expand, simulate and backpropagate cycle.
    pub fn iterate(&mut self) {
        let leaf = self.select();
        let node = self.expand(leaf);
        let result = if self.nodes[node].is_terminal() {
            terminal_value(&self.nodes[node].position)
        } else {
            let position = self.nodes[node].position.clone();
            self.simulate(&position)
        };
        self.backpropagate(node, result);
    }

    /// Most visited root child, if any.
    pub fn best_child(&self) -> Option<&Node> {
        let mut best: Option<&Node> = None;
        for &child in &self.root().children {
            let node = &self.nodes[child];
            if best.map_or(true, |b| node.visits > b.visits) {
                best = Some(node);
            }
        }
        best
    }

    /// Iterates until `deadline` or `max_iterations`, whichever comes first.
    /// A root with legal moves always gets at least one iteration, so an
    /// exhausted budget still yields a move.
    ///
    /// The chosen move is checked against a fresh legal move list and
    /// dropped if it does not appear there.
    pub fn run(&mut self, deadline: Instant, max_iterations: Option<u64>) -> MctsOutcome {
        let start = Instant::now();
        let mut iterations = 0u64;

        if !self.root().untried.is_empty() || !self.root().children.is_empty() {
            loop {
                self.iterate();
                iterations += 1;
                if max_iterations.is_some_and(|cap| iterations >= cap) || Instant::now() >= deadline {
                    break;
                }
            }
        }

        let chosen = self.best_child().map(|node| (node.mv, node.mean()));
        let legal = generate_legal(&self.root().position);
        let best_move = chosen.and_then(|(mv, _)| mv).filter(|mv| legal.contains(*mv));
        let outcome = MctsOutcome {
            best_move,
            iterations,
            root_visits: self.root().visits,
            win_rate: chosen.filter(|_| best_move.is_some()).map(|(_, mean)| mean),
            elapsed: start.elapsed(),
        };
        debug!(
            rollout = ?self.rollout,
            iterations,
            nodes = self.nodes.len(),
            best = ?outcome.best_move,
            win_rate = ?outcome.win_rate,
            "mcts finished"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOK_MATE: &str = "k7/8/1K6/8/8/8/8/7R w - - 0 1";

    fn config(seed: u64) -> MctsConfig {
        MctsConfig {
            seed: Some(seed),
            guided_plies: 1,
            greedy_plies: 2,
            ..MctsConfig::default()
        }
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(3600)
    }

    fn run(fen: &str, rollout: Rollout, iterations: u64, config: &MctsConfig) -> (MctsOutcome, usize) {
        let position = Position::from_fen(fen).unwrap();
        let mut mcts = Mcts::new(&position, rollout, config);
        let outcome = mcts.run(far_deadline(), Some(iterations));
        (outcome, mcts.len())
    }

    #[test]
    fn normalization_is_clamped() {
        assert_eq!(normalize(0), 0.5);
        assert_eq!(normalize(1000), 1.0);
        assert_eq!(normalize(-MATE_SCORE), 0.0);
        assert_eq!(normalize(500), 0.75);
    }

    #[test]
    fn terminal_values() {
        let white_mated = Position::from_fen("6k1/8/8/8/8/8/5PPP/r5K1 w - - 0 1").unwrap();
        assert!(generate_legal(&white_mated).is_empty());
        assert_eq!(terminal_value(&white_mated), 0.0);

        let black_mated = Position::from_fen("Q5k1/8/6K1/8/8/8/8/8 b - - 1 1").unwrap();
        assert_eq!(terminal_value(&black_mated), 1.0);

        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(terminal_value(&stalemate), 0.5);
    }

    #[test]
    fn every_variant_finds_mate_in_one() {
        for rollout in [Rollout::Random, Rollout::MinimaxGuided, Rollout::Cutoff, Rollout::Primed] {
            let (outcome, _) = run(ROOK_MATE, rollout, 1500, &config(11));
            assert_eq!(
                outcome.best_move.map(|m| m.to_uci()).as_deref(),
                Some("h1h8"),
                "{:?}",
                rollout
            );
            assert!(outcome.win_rate.unwrap() > 0.9, "{:?}", rollout);
        }
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let a = run(chess_core::FenParser::STARTPOS, Rollout::Random, 200, &config(3));
        let b = run(chess_core::FenParser::STARTPOS, Rollout::Random, 200, &config(3));
        assert_eq!(a.0.best_move, b.0.best_move);
        assert_eq!(a.0.root_visits, b.0.root_visits);
        assert_eq!(a.1, b.1);
    }

    #[test]
    fn tree_shape_invariants() {
        let position = Position::startpos();
        let config = config(5);
        let mut mcts = Mcts::new(&position, Rollout::Random, &config);
        for _ in 0..300 {
            mcts.iterate();
        }
        assert_eq!(mcts.root().visits, 300);
        assert_eq!(mcts.len(), 301);
        for id in 1..mcts.len() {
            let node = mcts.node(id);
            let parent = mcts.node(node.parent.unwrap());
            assert!(parent.children.contains(&id));
            assert_eq!(parent.position.make_move(node.mv.unwrap()), node.position);
            assert!(node.value >= 0.0 && node.value <= node.visits as f64);
        }
        let child_visits: u64 = mcts.root().children.iter().map(|&c| mcts.node(c).visits).sum();
        assert_eq!(child_visits, 300);
    }

    #[test]
    fn primed_nodes_start_with_gamma_visits() {
        let position = Position::startpos();
        let config = config(9);
        let mut mcts = Mcts::new(&position, Rollout::Primed, &config);
        assert_eq!(mcts.root().visits, 100);
        mcts.iterate();
        let child = mcts.node(1);
        assert_eq!(child.visits, 101);
        assert_eq!(mcts.root().visits, 101);
    }

    #[test]
    fn terminal_root_reports_no_move() {
        let config = config(1);
        for rollout in [Rollout::Random, Rollout::Primed] {
            let (outcome, nodes) = run("Q5k1/8/6K1/8/8/8/8/8 b - - 1 1", rollout, 50, &config);
            assert_eq!(outcome.best_move, None);
            assert_eq!(outcome.iterations, 0);
            assert_eq!(nodes, 1);
        }
    }

    #[test]
    fn expired_deadline_still_expands_one_root_move() {
        let position = Position::startpos();
        let config = config(2);
        for rollout in [Rollout::Random, Rollout::MinimaxGuided, Rollout::Cutoff, Rollout::Primed] {
            let mut mcts = Mcts::new(&position, rollout, &config);
            let outcome = mcts.run(Instant::now(), None);
            assert_eq!(outcome.iterations, 1);
            let mv = outcome.best_move.unwrap();
            assert!(generate_legal(&position).contains(mv), "{:?}", rollout);
        }
    }

    #[test]
    fn same_seed_same_rollouts() {
        let position = Position::startpos();
        let config = config(42);
        let mut a = Mcts::new(&position, Rollout::Cutoff, &config);
        let mut b = Mcts::new(&position, Rollout::Cutoff, &config);
        for _ in 0..40 {
            a.iterate();
            b.iterate();
        }
        let values = |m: &Mcts| m.root().children.iter().map(|&c| m.node(c).value).collect::<Vec<_>>();
        assert_eq!(values(&a), values(&b));
    }
}
