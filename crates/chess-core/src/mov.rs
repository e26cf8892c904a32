//! Move representation.

use crate::{CastlingRights, Piece, Square};
use std::fmt;

/// A chess move.
///
/// A plain value: building one never touches a board. `promotion` equals
/// `piece` unless the move promotes a pawn, and `castle` is either empty or
/// exactly one castling right, naming which castle this is.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub promotion: Piece,
    pub castle: CastlingRights,
}

impl Move {
    /// A normal (non-promoting, non-castling) move.
    #[inline]
    pub const fn new(from: Square, to: Square, piece: Piece) -> Self {
        Move {
            from,
            to,
            piece,
            promotion: piece,
            castle: CastlingRights::NONE,
        }
    }

    /// A pawn move that promotes to `promotion`.
    #[inline]
    pub const fn promoting(from: Square, to: Square, promotion: Piece) -> Self {
        Move {
            from,
            to,
            piece: Piece::Pawn,
            promotion,
            castle: CastlingRights::NONE,
        }
    }

    /// The king move for a single castling right, or `None` if `right` is
    /// not exactly one right.
    pub const fn castling(right: CastlingRights) -> Option<Self> {
        match right.squares() {
            Some(squares) => Some(Move {
                from: squares.king_from,
                to: squares.king_to,
                piece: Piece::King,
                promotion: Piece::King,
                castle: right,
            }),
            None => None,
        }
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.promotion as u8 != self.piece as u8
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        !self.castle.is_empty()
    }

    /// The piece standing on `to` after the move.
    #[inline]
    pub const fn placed_piece(self) -> Piece {
        self.promotion
    }

    /// UCI long algebraic text, e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(self) -> String {
        if self.is_promotion() {
            format!("{}{}{}", self.from, self.to, self.promotion.to_char())
        } else {
            format!("{}{}", self.from, self.to)
        }
    }

    /// Whether `uci` names this move's squares and promotion.
    pub fn matches(self, uci: UciMove) -> bool {
        let promotion = if self.is_promotion() {
            Some(self.promotion)
        } else {
            None
        };
        self.from == uci.from && self.to == uci.to && promotion == uci.promotion
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} {:?})", self.to_uci(), self.piece)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// The squares and promotion named by a UCI move string.
///
/// Carries no piece information; resolving it to a [`Move`] needs a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl UciMove {
    /// Parses `e2e4`, `e7e8q`. Promotion letters are accepted in either case
    /// but must name a knight, bishop, rook or queen.
    pub fn parse(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            Some(c) => {
                let piece = Piece::from_char(c)?;
                if !Piece::PROMOTIONS.contains(&piece) {
                    return None;
                }
                Some(piece)
            }
            None => None,
        };
        Some(UciMove {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.to_char())?;
        }
        Ok(())
    }
}
