//! Move ordering for alpha-beta.
//!
//! Tries the transposition-table move first, then captures by MVV/LVA, then
//! the two killer moves of the ply, then quiet moves by history score.

use chess_core::{Move, Piece};
use chess_engine::{piece_value, MoveList, Position};
use std::cmp::Reverse;

/// Deepest ply with killer slots.
pub const MAX_PLY: usize = 64;

const HISTORY_MAX: i32 = 50_000;

const TT_MOVE_SCORE: i32 = 10_000_000;
const CAPTURE_BASE: i32 = 1_000_000;
const PROMOTION_SCORE: i32 = 900_000;
const KILLER_SCORES: [i32; 2] = [800_000, 790_000];

/// Killer and history tables for one search.
pub struct MoveOrderer {
    killers: [[Option<Move>; 2]; MAX_PLY],
    history: Box<[[i32; 64]; 64]>,
}

impl MoveOrderer {
    pub fn new() -> Self {
        MoveOrderer {
            killers: [[None; 2]; MAX_PLY],
            history: Box::new([[0; 64]; 64]),
        }
    }

    /// Remembers a quiet move that caused a beta cutoff at `ply`.
    pub fn record_killer(&mut self, ply: usize, mv: Move) {
        let Some(slots) = self.killers.get_mut(ply) else {
            return;
        };
        if slots[0] != Some(mv) {
            slots[1] = slots[0];
            slots[0] = Some(mv);
        }
    }

    pub fn killers(&self, ply: usize) -> [Option<Move>; 2] {
        self.killers.get(ply).copied().unwrap_or([None; 2])
    }

    /// Rewards a quiet move that raised alpha at remaining `depth`.
    pub fn add_history(&mut self, mv: Move, depth: u32) {
        let bonus = i32::try_from(depth.saturating_mul(depth)).unwrap_or(HISTORY_MAX);
        let slot = &mut self.history[mv.from.index() as usize][mv.to.index() as usize];
        *slot = slot.saturating_add(bonus).min(HISTORY_MAX);
    }

    pub fn history(&self, mv: Move) -> i32 {
        self.history[mv.from.index() as usize][mv.to.index() as usize]
    }

    /// Ordering score of `mv` at `ply`. Higher is tried first.
    pub fn score(&self, position: &Position, mv: Move, ply: usize, tt_move: Option<Move>) -> i32 {
        if Some(mv) == tt_move {
            return TT_MOVE_SCORE;
        }
        if let Some(gain) = mvv_lva(position, mv) {
            return CAPTURE_BASE + gain;
        }
        if mv.promotion == Piece::Queen && mv.is_promotion() {
            return PROMOTION_SCORE;
        }
        let killers = self.killers(ply);
        if let Some(slot) = killers.iter().position(|k| *k == Some(mv)) {
            return KILLER_SCORES[slot];
        }
        self.history(mv)
    }

    /// Sorts `moves` best first. Ties keep generation order.
    pub fn order(&self, position: &Position, moves: &mut MoveList, ply: usize, tt_move: Option<Move>) {
        moves
            .as_mut_slice()
            .sort_by_cached_key(|mv| Reverse(self.score(position, *mv, ply, tt_move)));
    }
}

impl Default for MoveOrderer {
    fn default() -> Self {
        Self::new()
    }
}

/// `victim * 100 - attacker` for captures, `None` for quiet moves.
/// En passant counts as capturing a pawn.
pub fn mvv_lva(position: &Position, mv: Move) -> Option<i32> {
    let victim = match position.piece_at(mv.to) {
        Some(piece) if piece.color != position.side_to_move() => piece.piece,
        Some(_) => return None,
        None if mv.piece == Piece::Pawn && Some(mv.to) == position.en_passant() => Piece::Pawn,
        None => return None,
    };
    Some(piece_value(victim) * 100 - piece_value(mv.piece))
}

pub fn is_capture(position: &Position, mv: Move) -> bool {
    mvv_lva(position, mv).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_engine::generate_legal;

    fn find(position: &Position, uci: &str) -> Move {
        position.parse_uci_move(uci).unwrap()
    }

    #[test]
    fn most_valuable_victim_first() {
        // Pawn and queen can both capture; pawn takes queen, queen takes pawn.
        let pos = Position::from_fen("4k3/8/8/3q4/3pP3/4Q3/8/4K3 w - - 0 1").unwrap();
        let pxq = find(&pos, "e4d5");
        let qxp = find(&pos, "e3d4");
        assert!(mvv_lva(&pos, pxq).unwrap() > mvv_lva(&pos, qxp).unwrap());

        let mut moves = generate_legal(&pos);
        MoveOrderer::new().order(&pos, &mut moves, 0, None);
        assert_eq!(moves[0], pxq);
    }

    #[test]
    fn en_passant_is_a_capture() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3").unwrap();
        let ep = find(&pos, "e5f6");
        assert_eq!(mvv_lva(&pos, ep), Some(100 * 100 - 100));
        assert!(!is_capture(&pos, find(&pos, "e5e6")));
    }

    #[test]
    fn tt_move_beats_everything() {
        let pos = Position::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let quiet = find(&pos, "e1f1");
        let mut moves = generate_legal(&pos);
        MoveOrderer::new().order(&pos, &mut moves, 0, Some(quiet));
        assert_eq!(moves[0], quiet);
        assert_eq!(moves[1], find(&pos, "e4d5"));
    }

    #[test]
    fn killers_shift_and_rank_above_history() {
        let pos = Position::startpos();
        let a = find(&pos, "g1f3");
        let b = find(&pos, "b1c3");
        let c = find(&pos, "e2e4");

        let mut orderer = MoveOrderer::new();
        orderer.add_history(c, 10);
        orderer.record_killer(3, a);
        orderer.record_killer(3, a);
        assert_eq!(orderer.killers(3), [Some(a), None]);
        orderer.record_killer(3, b);
        assert_eq!(orderer.killers(3), [Some(b), Some(a)]);

        let mut moves = generate_legal(&pos);
        orderer.order(&pos, &mut moves, 3, None);
        assert_eq!(&moves.as_slice()[..3], &[b, a, c]);

        orderer.record_killer(MAX_PLY + 5, c);
        assert_eq!(orderer.killers(MAX_PLY + 5), [None, None]);
    }

    #[test]
    fn history_is_capped() {
        let pos = Position::startpos();
        let mv = find(&pos, "d2d4");
        let mut orderer = MoveOrderer::new();
        for _ in 0..1000 {
            orderer.add_history(mv, 20);
        }
        assert_eq!(orderer.history(mv), HISTORY_MAX);
        assert!(orderer.score(&pos, mv, 0, None) < KILLER_SCORES[1]);
    }
}
