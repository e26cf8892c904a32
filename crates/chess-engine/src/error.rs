//! Errors raised by board construction, move parsing and self-checks.

use chess_core::{Color, ColoredPiece, Square};
use thiserror::Error;

/// A UCI move string that could not be played.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("malformed move '{0}'")]
    Malformed(String),

    #[error("illegal move '{0}' in this position")]
    Illegal(String),
}

/// A broken board invariant, reported by `Position::validate`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvariantError {
    #[error("{first} and {second} share squares")]
    OverlappingPieces {
        first: ColoredPiece,
        second: ColoredPiece,
    },

    #[error("{0} occupancy does not match its piece bitboards")]
    OccupancyMismatch(Color),

    #[error("{color} must have exactly one king, found {count}")]
    KingCount { color: Color, count: u32 },

    #[error("cached {color} king square {cached} is wrong")]
    KingSquare { color: Color, cached: Square },

    #[error("cached hash {cached:#018x} differs from recomputed {computed:#018x}")]
    HashMismatch { cached: u64, computed: u64 },

    #[error("cached attack mask is stale")]
    StaleAttackMask,
}
