//! Castling rights nibble.

use crate::{Color, Square};
use std::fmt;

/// Castling availability as a 4-bit set.
///
/// Bit 0 is white king-side, bit 1 white queen-side, bit 2 black king-side
/// and bit 3 black queen-side. A move's castle flag is either empty or
/// exactly one of these bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: CastlingRights = CastlingRights(0b0001);
    pub const WHITE_QUEENSIDE: CastlingRights = CastlingRights(0b0010);
    pub const BLACK_KINGSIDE: CastlingRights = CastlingRights(0b0100);
    pub const BLACK_QUEENSIDE: CastlingRights = CastlingRights(0b1000);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// The four single rights in bit order.
    pub const EACH: [CastlingRights; 4] = [
        Self::WHITE_KINGSIDE,
        Self::WHITE_QUEENSIDE,
        Self::BLACK_KINGSIDE,
        Self::BLACK_QUEENSIDE,
    ];

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        CastlingRights(bits & 0b1111)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: CastlingRights) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: CastlingRights) -> Self {
        CastlingRights(self.0 | other.0)
    }

    #[inline]
    pub const fn without(self, other: CastlingRights) -> Self {
        CastlingRights(self.0 & !other.0)
    }

    /// Both rights belonging to `color`.
    #[inline]
    pub const fn for_color(color: Color) -> Self {
        match color {
            Color::White => CastlingRights(0b0011),
            Color::Black => CastlingRights(0b1100),
        }
    }

    #[inline]
    pub const fn kingside(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    #[inline]
    pub const fn queenside(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    /// Rights lost when a piece leaves or lands on `sq`: the king squares
    /// revoke both rights of that side, the rook corners revoke one.
    pub const fn revoked_by(sq: Square) -> Self {
        match sq.index() {
            0 => Self::WHITE_QUEENSIDE,
            7 => Self::WHITE_KINGSIDE,
            4 => CastlingRights(0b0011),
            56 => Self::BLACK_QUEENSIDE,
            63 => Self::BLACK_KINGSIDE,
            60 => CastlingRights(0b1100),
            _ => Self::NONE,
        }
    }

    /// King from/to and rook from/to squares for a single right.
    ///
    /// Returns `None` unless `self` is exactly one right.
    pub const fn squares(self) -> Option<CastleSquares> {
        let (king_from, king_to, rook_from, rook_to) = match self.0 {
            0b0001 => (Square::E1, Square::G1, Square::H1, Square::F1),
            0b0010 => (Square::E1, Square::C1, Square::A1, Square::D1),
            0b0100 => (Square::E8, Square::G8, Square::H8, Square::F8),
            0b1000 => (Square::E8, Square::C8, Square::A8, Square::D8),
            _ => return None,
        };
        Some(CastleSquares {
            king_from,
            king_to,
            rook_from,
            rook_to,
        })
    }

    /// Parses the FEN castling field (`KQkq` subset or `-`).
    pub fn from_fen(field: &str) -> Option<Self> {
        if field == "-" {
            return Some(Self::NONE);
        }
        let mut rights = Self::NONE;
        for c in field.chars() {
            let right = match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => return None,
            };
            rights = rights.union(right);
        }
        Some(rights)
    }

    pub fn to_fen(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        ['K', 'Q', 'k', 'q']
            .iter()
            .zip(Self::EACH)
            .filter(|(_, right)| self.contains(*right))
            .map(|(c, _)| *c)
            .collect()
    }
}

/// Squares touched by one castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleSquares {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}
