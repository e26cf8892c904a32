//! Move generation.
//!
//! Moves are produced pseudo-legally from bitboards and then filtered by
//! playing each one on a copy of the position and testing the mover's king.

pub mod perft;

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks};
use crate::{Bitboard, Position};
use chess_core::{CastlingRights, Color, Move, Piece, Rank, Square};

/// A list of moves with a fixed maximum capacity.
///
/// No chess position has more than 218 moves, so a fixed array avoids heap
/// allocation in the search hot path.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub const MAX_MOVES: usize = 256;

    const FILLER: Move = Move::new(Square::A1, Square::A1, Piece::Pawn);

    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Self::FILLER; Self::MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    /// Removes and returns the move at `index`, moving the last move into
    /// its place.
    pub fn swap_remove(&mut self, index: usize) -> Move {
        assert!(index < self.len, "swap_remove index {} out of {}", index, self.len);
        let m = self.moves[index];
        self.len -= 1;
        self.moves[index] = self.moves[self.len];
        m
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::iter::Take<std::array::IntoIter<Move, { MoveList::MAX_MOVES }>>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter().take(self.len)
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// All moves for the side to move, ignoring whether they leave its own king
/// attacked. Castling is only emitted when it is fully legal.
pub fn generate_pseudo_legal(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    generate_pawn_moves(position, &mut moves);
    generate_piece_moves(position, Piece::Knight, &mut moves);
    generate_piece_moves(position, Piece::Bishop, &mut moves);
    generate_piece_moves(position, Piece::Rook, &mut moves);
    generate_piece_moves(position, Piece::Queen, &mut moves);
    generate_piece_moves(position, Piece::King, &mut moves);
    generate_castling_moves(position, &mut moves);
    moves
}

/// Keeps the moves of `pseudo` that do not leave the mover's king attacked.
pub fn filter_legal(position: &Position, mut pseudo: MoveList) -> MoveList {
    let us = position.side_to_move();
    pseudo.retain(|m| !position.make_move(*m).is_king_in_check(us));
    pseudo
}

/// All legal moves for the side to move.
pub fn generate_legal(position: &Position) -> MoveList {
    filter_legal(position, generate_pseudo_legal(position))
}

fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, promotion_rank: Rank) {
    if to.rank() == promotion_rank {
        for promotion in Piece::PROMOTIONS {
            moves.push(Move::promoting(from, to, promotion));
        }
    } else {
        moves.push(Move::new(from, to, Piece::Pawn));
    }
}

fn generate_pawn_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let theirs = position.occupancy(!us);
    let empty = !position.occupied();
    let pawns = position.pieces_of(Piece::Pawn, us);

    let (push, start_rank, promotion_rank) = match us {
        Color::White => (8i8, Bitboard::RANK_2, Rank::R8),
        Color::Black => (-8i8, Bitboard::RANK_7, Rank::R1),
    };
    let origin = |to: Square, steps: i8| Square::from_index_masked((to.index() as i8 - steps * push) as u8);

    let single = pawns.forward(us) & empty;
    for to in single {
        push_pawn_move(moves, origin(to, 1), to, promotion_rank);
    }

    let double = (pawns & start_rank).forward(us).forward(us) & empty & single.forward(us);
    for to in double {
        moves.push(Move::new(origin(to, 2), to, Piece::Pawn));
    }

    for from in pawns {
        for to in pawn_attacks(from, us) & theirs {
            push_pawn_move(moves, from, to, promotion_rank);
        }
        if let Some(ep) = position.en_passant() {
            if pawn_attacks(from, us).contains(ep) {
                moves.push(Move::new(from, ep, Piece::Pawn));
            }
        }
    }
}

fn generate_piece_moves(position: &Position, piece: Piece, moves: &mut MoveList) {
    let us = position.side_to_move();
    let targets = !position.occupancy(us);
    let occupied = position.occupied();

    for from in position.pieces_of(piece, us) {
        let attacks = match piece {
            Piece::Knight => knight_attacks(from),
            Piece::Bishop => bishop_attacks(from, occupied),
            Piece::Rook => rook_attacks(from, occupied),
            Piece::Queen => queen_attacks(from, occupied),
            Piece::King => king_attacks(from),
            Piece::Pawn => Bitboard::EMPTY,
        };
        for to in attacks & targets {
            moves.push(Move::new(from, to, piece));
        }
    }
}

/// Squares strictly between two squares of the same rank.
fn between_on_rank(a: Square, b: Square) -> Bitboard {
    let (lo, hi) = if a.index() < b.index() { (a.index(), b.index()) } else { (b.index(), a.index()) };
    (lo + 1..hi).map(Square::from_index_masked).collect()
}

fn generate_castling_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let attacked = position.attack_mask();
    let occupied = position.occupied();

    for right in [CastlingRights::kingside(us), CastlingRights::queenside(us)] {
        if !position.castling().contains(right) {
            continue;
        }
        let (Some(squares), Some(mv)) = (right.squares(), Move::castling(right)) else {
            continue;
        };
        if position.king_square(us) != squares.king_from
            || !position.pieces_of(Piece::Rook, us).contains(squares.rook_from)
        {
            continue;
        }

        let path = between_on_rank(squares.king_from, squares.rook_from);
        let king_walk = between_on_rank(squares.king_from, squares.king_to)
            | Bitboard::from_square(squares.king_from)
            | Bitboard::from_square(squares.king_to);
        if !path.intersects(occupied) && !king_walk.intersects(attacked) {
            moves.push(mv);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legal_uci(fen: &str) -> Vec<String> {
        let pos = Position::from_fen(fen).unwrap();
        let mut moves: Vec<String> = generate_legal(&pos).into_iter().map(|m| m.to_uci()).collect();
        moves.sort();
        moves
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let pos = Position::startpos();
        assert_eq!(generate_legal(&pos).len(), 20);
        assert_eq!(generate_pseudo_legal(&pos).len(), 20);
    }

    #[test]
    fn move_list_basics() {
        let mut list = MoveList::new();
        assert!(list.is_empty());
        let a = Move::new(Square::E1, Square::F1, Piece::King);
        let b = Move::new(Square::E1, Square::D1, Piece::King);
        list.push(a);
        list.push(b);
        assert_eq!(list.len(), 2);
        assert!(list.contains(b));
        assert_eq!(list.swap_remove(0), a);
        assert_eq!(list.as_slice(), &[b]);
        list.retain(|m| m.to != Square::D1);
        assert!(list.is_empty());
    }

    #[test]
    fn promotions_come_in_fours() {
        let moves = legal_uci("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        for promo in ["a7a8q", "a7a8r", "a7a8b", "a7a8n"] {
            assert!(moves.contains(&promo.to_string()), "{}", promo);
        }
        assert!(!moves.contains(&"a7a8".to_string()));
    }

    #[test]
    fn en_passant_is_generated() {
        let moves = legal_uci("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        assert!(moves.contains(&"e5f6".to_string()));
        assert!(!moves.contains(&"e5d6".to_string()));
    }

    #[test]
    fn both_castles_when_clear() {
        let moves = legal_uci("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn no_castling_through_attacked_square() {
        // Black rook on f8 covers f1.
        let moves = legal_uci("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn no_castling_out_of_check() {
        let moves = legal_uci("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn queenside_needs_empty_b_file() {
        let moves = legal_uci("4k3/8/8/8/8/8/8/RN2K3 w Q - 0 1");
        assert!(!moves.contains(&"e1c1".to_string()));
        // An attacked b1 does not matter, only the king's squares do.
        let moves = legal_uci("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn rights_without_rook_are_ignored() {
        let moves = legal_uci("4k3/8/8/8/8/8/8/4K3 w KQ - 0 1");
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        let pos = Position::from_fen("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let pseudo = generate_pseudo_legal(&pos);
        let legal = filter_legal(&pos, pseudo.clone());
        assert!(pseudo.as_slice().iter().any(|m| m.piece == Piece::Knight));
        assert!(legal.as_slice().iter().all(|m| m.piece == Piece::King));
    }

    #[test]
    fn checkmate_and_stalemate_have_no_moves() {
        assert!(legal_uci("Q5k1/8/6K1/8/8/8/8/8 b - - 1 1").is_empty());
        assert!(legal_uci("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").is_empty());
    }
}
