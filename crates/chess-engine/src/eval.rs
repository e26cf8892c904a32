//! Static evaluation in centipawns.
//!
//! Material plus piece-square tables, a king-safety penalty and a small
//! development bonus. Tables are written from White's point of view with a1
//! as the first entry; Black reads them at the reversed square index.

use crate::movegen::MoveList;
use crate::Position;
use chess_core::{Color, Piece};

/// Score of a side that has been checkmated, negated.
pub const MATE_SCORE: i32 = 100_000;

const KING_ATTACKED_PENALTY: i32 = 50;
const DEVELOPMENT_BONUS: i32 = 5;

/// Material value of a piece. Kings are worth nothing on this scale.
#[inline]
pub const fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 320,
        Piece::Bishop => 330,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 0,
    }
}

#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10,-20,-20, 10, 10,  5,
     5, -5,-10,  0,  0,-10, -5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5,  5, 10, 25, 25, 10,  5,  5,
    10, 10, 20, 30, 30, 20, 10, 10,
    50, 50, 50, 50, 50, 50, 50, 50,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
     0,  0,  5, 10, 10,  5,  0,  0,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     5, 10, 10, 10, 10, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -10,  5,  5,  5,  5,  5,  0,-10,
      0,  0,  5,  5,  5,  5,  0, -5,
     -5,  0,  5,  5,  5,  5,  0, -5,
    -10,  0,  5,  5,  5,  5,  0,-10,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_TABLE: [i32; 64] = [
     20, 30, 10,  0,  0, 10, 30, 20,
     20, 20,  0,  0,  0,  0, 20, 20,
    -10,-20,-20,-20,-20,-20,-20,-10,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
];

const fn table(piece: Piece) -> &'static [i32; 64] {
    match piece {
        Piece::Pawn => &PAWN_TABLE,
        Piece::Knight => &KNIGHT_TABLE,
        Piece::Bishop => &BISHOP_TABLE,
        Piece::Rook => &ROOK_TABLE,
        Piece::Queen => &QUEEN_TABLE,
        Piece::King => &KING_TABLE,
    }
}

/// Piece-square bonus for `piece` of `color` standing on square `index`.
#[inline]
pub fn square_bonus(piece: Piece, color: Color, index: u8) -> i32 {
    let index = match color {
        Color::White => index as usize,
        Color::Black => 63 - index as usize,
    };
    table(piece)[index]
}

/// White-positive static score of `position`.
pub fn static_evaluate(position: &Position) -> i32 {
    let mut score = 0;

    for color in Color::BOTH {
        let mut side = 0;
        for piece in Piece::ALL {
            for sq in position.pieces_of(piece, color) {
                side += piece_value(piece) + square_bonus(piece, color, sq.index());
                if piece != Piece::Pawn && piece != Piece::King && sq.rank().index() != color.back_rank() {
                    side += DEVELOPMENT_BONUS;
                }
            }
        }
        if position.is_king_in_check(color) {
            side -= KING_ATTACKED_PENALTY;
        }
        score += color.sign() * side;
    }

    score
}

/// Static score from the side to move's point of view.
#[inline]
pub fn evaluate_relative(position: &Position) -> i32 {
    position.side_to_move().sign() * static_evaluate(position)
}

/// Score of `position` for the side to move, given its legal moves.
///
/// With no legal moves this is `-MATE_SCORE` when in check and `0` for
/// stalemate; otherwise the relative static evaluation.
pub fn terminal_result(position: &Position, legal_moves: &MoveList) -> i32 {
    if !legal_moves.is_empty() {
        evaluate_relative(position)
    } else if position.in_check() {
        -MATE_SCORE
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::generate_legal;

    #[test]
    fn startpos_is_balanced() {
        let pos = Position::startpos();
        assert_eq!(static_evaluate(&pos), 0);
        assert_eq!(evaluate_relative(&pos), 0);
    }

    #[test]
    fn material_counts() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let score = static_evaluate(&pos);
        assert!(score > 800, "{}", score);

        let black_to_move = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        assert_eq!(evaluate_relative(&black_to_move), -static_evaluate(&black_to_move));
    }

    #[test]
    fn colors_are_symmetric() {
        let white = Position::from_fen("4k3/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap();
        let black = Position::from_fen("4k3/8/8/4n3/8/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(static_evaluate(&white), -static_evaluate(&black));
        assert_eq!(evaluate_relative(&white), evaluate_relative(&black));
    }

    #[test]
    fn development_is_rewarded() {
        let home = Position::from_fen("4k3/8/8/8/8/8/8/1N2K3 w - - 0 1").unwrap();
        let out = Position::from_fen("4k3/8/8/8/8/2N5/8/4K3 w - - 0 1").unwrap();
        let home_bonus = square_bonus(Piece::Knight, Color::White, 1);
        let out_bonus = square_bonus(Piece::Knight, Color::White, 18);
        assert_eq!(
            static_evaluate(&out) - static_evaluate(&home),
            out_bonus - home_bonus + DEVELOPMENT_BONUS
        );
    }

    #[test]
    fn attacked_king_is_penalised() {
        let quiet = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 1").unwrap();
        let check = Position::from_fen("4k3/8/8/8/8/8/8/4K2R b - - 0 1").unwrap();
        let rook_delta = square_bonus(Piece::Rook, Color::White, 7) - square_bonus(Piece::Rook, Color::White, 0);
        assert_eq!(
            static_evaluate(&check) - static_evaluate(&quiet),
            rook_delta
        );
        let checked = Position::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1").unwrap();
        let unchecked = Position::from_fen("4k3/8/8/8/8/8/8/3R2K1 b - - 0 1").unwrap();
        let delta = square_bonus(Piece::Rook, Color::White, 4) - square_bonus(Piece::Rook, Color::White, 3);
        assert_eq!(
            static_evaluate(&checked) - static_evaluate(&unchecked),
            delta + KING_ATTACKED_PENALTY
        );
    }

    #[test]
    fn terminal_scores() {
        let mated = Position::from_fen("Q5k1/8/6K1/8/8/8/8/8 b - - 1 1").unwrap();
        assert_eq!(terminal_result(&mated, &generate_legal(&mated)), -MATE_SCORE);

        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(terminal_result(&stalemate, &generate_legal(&stalemate)), 0);

        let pos = Position::startpos();
        assert_eq!(terminal_result(&pos, &generate_legal(&pos)), 0);
    }

    #[test]
    fn mating_move_reaches_terminal_position() {
        let pos = Position::from_fen("6k1/8/6K1/8/8/8/8/7Q w - - 0 1").unwrap();
        let mated = pos.make_move(pos.parse_uci_move("h1a8").unwrap());
        let legal = generate_legal(&mated);
        assert!(legal.is_empty());
        assert_eq!(terminal_result(&mated, &legal), -MATE_SCORE);
    }
}
