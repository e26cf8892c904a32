//! Bitboard chess engine core.
//!
//! This crate provides:
//! - [`Bitboard`]: 64-bit square sets, a1 as bit 0
//! - leaper and magic-bitboard slider attacks, with an optional on-disk cache
//! - [`Position`]: piece placement with incrementally maintained Zobrist hash
//!   and attack mask
//! - pseudo-legal and legal move generation, plus perft
//! - a centipawn static evaluation
//!
//! # Example
//!
//! ```
//! use chess_engine::{generate_legal, Position};
//!
//! let mut position = Position::startpos();
//! assert_eq!(generate_legal(&position).len(), 20);
//!
//! position.apply_uci_moves(&["e2e4", "e7e5"]).unwrap();
//! assert_eq!(
//!     position.to_fen(),
//!     "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
//! );
//! ```

pub mod attack_cache;
pub mod attacks;
mod bitboard;
mod error;
pub mod eval;
pub mod magics;
pub mod movegen;
mod position;
mod zobrist;

pub use attack_cache::{load_or_build, AttackCacheError};
pub use attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks};
pub use bitboard::{Bitboard, BitboardIter};
pub use error::{InvariantError, MoveParseError};
pub use eval::{evaluate_relative, piece_value, static_evaluate, terminal_result, MATE_SCORE};
pub use magics::{attack_tables, AttackTables};
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{filter_legal, generate_legal, generate_pseudo_legal, MoveList};
pub use position::Position;
pub use zobrist::{ZobristKeys, ZOBRIST};
