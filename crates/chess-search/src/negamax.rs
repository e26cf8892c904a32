//! Alpha-beta negamax with iterative deepening.

use crate::ordering::{is_capture, MoveOrderer, MAX_PLY};
use crate::tt::{Bound, TranspositionTable};
use chess_core::Move;
use chess_engine::{evaluate_relative, generate_legal, Position, MATE_SCORE};
use std::time::{Duration, Instant};
use tracing::debug;

/// Wider than any reachable score.
pub const INFINITY: i32 = MATE_SCORE + 1;

const TIME_CHECK_INTERVAL: u64 = 2048;

/// Result of one completed iterative-deepening iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationInfo {
    pub depth: u32,
    /// Centipawns from the side to move's point of view.
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub pv: Vec<Move>,
}

impl IterationInfo {
    /// Moves to mate, positive when the side to move mates.
    pub fn mate_in(&self) -> Option<i32> {
        mate_distance(self.score)
    }
}

/// Plies to mate encoded in `score`, as full moves with sign.
pub fn mate_distance(score: i32) -> Option<i32> {
    if score.abs() < MATE_SCORE - MAX_PLY as i32 {
        return None;
    }
    let plies = MATE_SCORE - score.abs();
    let moves = (plies + 1) / 2;
    Some(if score > 0 { moves } else { -moves })
}

/// One negamax search. Borrows the engine's transposition table so it
/// survives between moves of a game.
pub struct Searcher<'tt> {
    tt: &'tt mut TranspositionTable,
    orderer: MoveOrderer,
    nodes: u64,
    start: Instant,
    deadline: Option<Instant>,
    stopped: bool,
    root_best: Option<Move>,
}

impl<'tt> Searcher<'tt> {
    pub fn new(tt: &'tt mut TranspositionTable, deadline: Option<Instant>) -> Self {
        Searcher {
            tt,
            orderer: MoveOrderer::new(),
            nodes: 0,
            start: Instant::now(),
            deadline,
            stopped: false,
            root_best: None,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    fn poll_time(&mut self) {
        if self.nodes % TIME_CHECK_INTERVAL == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.stopped = true;
                }
            }
        }
    }

    /// Score of `position` for the side to move, searched `depth` plies
    /// deep within `(alpha, beta)`.
    ///
    /// Returns 0 once the deadline has passed; callers must check
    /// [`Searcher::stopped`] before trusting the value.
    pub fn negamax(&mut self, position: &Position, depth: u32, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        self.nodes += 1;
        self.poll_time();
        if self.stopped {
            return 0;
        }

        let mut moves = generate_legal(position);
        if moves.is_empty() {
            return if position.in_check() {
                -MATE_SCORE + ply as i32
            } else {
                0
            };
        }
        if depth == 0 || ply >= MAX_PLY {
            return evaluate_relative(position);
        }

        let hash = position.hash();
        if ply > 0 {
            if let Some(score) = self.tt.probe(hash, depth, alpha, beta, ply) {
                return score;
            }
        }

        let tt_move = self.tt.best_move(hash).filter(|mv| moves.contains(*mv));
        self.orderer.order(position, &mut moves, ply, tt_move);

        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = None;

        for &mv in moves.as_slice() {
            let child = position.make_move(mv);
            let score = -self.negamax(&child, depth - 1, -beta, -alpha, ply + 1);
            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                if ply == 0 {
                    self.root_best = Some(mv);
                }
            }
            if score > alpha {
                alpha = score;
                let quiet = !is_capture(position, mv) && !mv.is_promotion();
                if quiet {
                    self.orderer.add_history(mv, depth);
                }
                if alpha >= beta {
                    if quiet && Some(mv) != tt_move {
                        self.orderer.record_killer(ply, mv);
                    }
                    break;
                }
            }
        }

        let bound = if best_score <= original_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(hash, depth, best_score, bound, best_move, ply);

        best_score
    }

    /// Follows best moves through the table from `position`, stopping at
    /// the first missing or illegal one.
    pub fn principal_variation(&self, position: &Position, max_len: usize) -> Vec<Move> {
        let mut pv = Vec::new();
        let mut current = position.clone();
        while pv.len() < max_len {
            let Some(mv) = self.tt.best_move(current.hash()) else {
                break;
            };
            if !generate_legal(&current).contains(mv) {
                break;
            }
            pv.push(mv);
            current.apply_move(mv);
        }
        pv
    }

    /// Searches depth 1, 2, ... up to `max_depth` until time runs out.
    ///
    /// Returns the best move of the deepest iteration that finished, or the
    /// first ordered legal move if even depth 1 was cut short. `None` only
    /// when the side to move has no legal move.
    pub fn iterative_deepening<F>(&mut self, position: &Position, max_depth: u32, mut on_iteration: F) -> Option<(Move, IterationInfo)>
    where
        F: FnMut(&IterationInfo),
    {
        let mut legal = generate_legal(position);
        if legal.is_empty() {
            return None;
        }
        let fallback_move = {
            self.orderer.order(position, &mut legal, 0, self.tt.best_move(position.hash()));
            legal[0]
        };

        let mut best: Option<(Move, IterationInfo)> = None;
        for depth in 1..=max_depth.clamp(1, MAX_PLY as u32) {
            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                break;
            }
            self.root_best = None;
            let score = self.negamax(position, depth, -INFINITY, INFINITY, 0);
            if self.stopped {
                debug!(depth, "iteration interrupted, keeping previous result");
                break;
            }
            let Some(mv) = self.root_best else {
                break;
            };

            let mut pv = self.principal_variation(position, depth as usize);
            if pv.first() != Some(&mv) {
                pv = vec![mv];
            }
            let info = IterationInfo {
                depth,
                score,
                nodes: self.nodes,
                elapsed: self.start.elapsed(),
                pv,
            };
            debug!(depth, score, nodes = self.nodes, best = %mv, "iteration complete");
            on_iteration(&info);

            let mate_found = info.mate_in().is_some();
            best = Some((mv, info));
            if mate_found {
                break;
            }
        }

        best.or_else(|| {
            let info = IterationInfo {
                depth: 0,
                score: evaluate_relative(position),
                nodes: self.nodes,
                elapsed: self.start.elapsed(),
                pv: vec![fallback_move],
            };
            Some((fallback_move, info))
        })
    }
}
