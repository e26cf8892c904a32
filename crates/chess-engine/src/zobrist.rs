//! Zobrist keys for position hashing.
//!
//! A position hash is the XOR of:
//! - one key per occupied square, chosen by colored piece (12 x 64)
//! - the side key, when White is to move
//! - one key for the whole castling-rights nibble (16)
//! - one key for the en-passant target square, when there is one (64)
//!
//! Every component can be toggled independently, which is what makes
//! incremental updates in `Position::apply_move` possible.

use chess_core::{CastlingRights, ColoredPiece, Square};

/// The process-wide key set.
pub struct ZobristKeys {
    pieces: [[u64; 64]; ColoredPiece::COUNT],
    en_passant: [u64; 64],
    castling: [u64; 16],
    white_to_move: u64,
}

const SEED: u64 = 0x9E37_79B9_7F4A_7C15;

const fn xorshift(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

impl ZobristKeys {
    /// Fills every table from a fixed-seed xorshift stream, in declaration
    /// order, so the keys are identical across runs and builds.
    const fn generate() -> Self {
        let mut state = SEED;
        let mut pieces = [[0u64; 64]; ColoredPiece::COUNT];
        let mut en_passant = [0u64; 64];
        let mut castling = [0u64; 16];

        let mut kind = 0;
        while kind < ColoredPiece::COUNT {
            let mut sq = 0;
            while sq < 64 {
                state = xorshift(state);
                pieces[kind][sq] = state;
                sq += 1;
            }
            kind += 1;
        }

        let mut sq = 0;
        while sq < 64 {
            state = xorshift(state);
            en_passant[sq] = state;
            sq += 1;
        }

        let mut bits = 0;
        while bits < 16 {
            state = xorshift(state);
            castling[bits] = state;
            bits += 1;
        }

        state = xorshift(state);
        ZobristKeys {
            pieces,
            en_passant,
            castling,
            white_to_move: state,
        }
    }

    #[inline]
    pub const fn piece(&self, piece: ColoredPiece, sq: Square) -> u64 {
        self.pieces[piece.index()][sq.index() as usize]
    }

    #[inline]
    pub const fn en_passant(&self, sq: Square) -> u64 {
        self.en_passant[sq.index() as usize]
    }

    #[inline]
    pub const fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.bits() as usize]
    }

    #[inline]
    pub const fn white_to_move(&self) -> u64 {
        self.white_to_move
    }
}

/// Keys shared by every position in the process.
pub static ZOBRIST: ZobristKeys = ZobristKeys::generate();

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Color, Piece};
    use std::collections::HashSet;

    #[test]
    fn all_keys_are_distinct_and_nonzero() {
        let mut seen = HashSet::new();
        for cp in ColoredPiece::all() {
            for i in 0..64 {
                seen.insert(ZOBRIST.piece(cp, Square::from_index_masked(i)));
            }
        }
        for i in 0..64 {
            seen.insert(ZOBRIST.en_passant(Square::from_index_masked(i)));
        }
        for bits in 0..16 {
            seen.insert(ZOBRIST.castling(CastlingRights::from_bits(bits)));
        }
        seen.insert(ZOBRIST.white_to_move());

        assert_eq!(seen.len(), 12 * 64 + 64 + 16 + 1);
        assert!(!seen.contains(&0));
    }

    #[test]
    fn keys_depend_on_color_and_square() {
        let wp = ColoredPiece::new(Piece::Pawn, Color::White);
        let bp = ColoredPiece::new(Piece::Pawn, Color::Black);
        assert_ne!(ZOBRIST.piece(wp, Square::A1), ZOBRIST.piece(wp, Square::B1));
        assert_ne!(ZOBRIST.piece(wp, Square::A1), ZOBRIST.piece(bp, Square::A1));
    }

    #[test]
    fn generation_is_deterministic() {
        let again = ZobristKeys::generate();
        assert_eq!(again.white_to_move(), ZOBRIST.white_to_move());
        assert_eq!(again.castling(CastlingRights::ALL), ZOBRIST.castling(CastlingRights::ALL));
    }
}
