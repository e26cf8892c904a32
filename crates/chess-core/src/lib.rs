//! Core value types for the chess engine.
//!
//! Everything in this crate is a small `Copy` value with no knowledge of
//! board state:
//! - [`Color`], [`Piece`] and [`ColoredPiece`] for the twelve piece kinds
//! - [`Square`], [`File`] and [`Rank`] for board coordinates
//! - [`CastlingRights`] for the four-bit castling nibble
//! - [`Move`] and [`UciMove`] for moves and their text form
//! - [`FenParser`] for FEN tokenizing and validation

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use castling::{CastleSquares, CastlingRights};
pub use color::Color;
pub use fen::{FenError, FenParser};
pub use mov::{Move, UciMove};
pub use piece::{ColoredPiece, Piece};
pub use square::{File, Rank, Square};
