//! Transposition table.

use crate::ordering::MAX_PLY;
use chess_core::Move;
use chess_engine::MATE_SCORE;

const MATE_BOUND: i32 = MATE_SCORE - MAX_PLY as i32;

// Mate scores are stored relative to the node, so a transposition at a
// different ply still reports the right distance.
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_BOUND {
        score + ply as i32
    } else if score <= -MATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_BOUND {
        score - ply as i32
    } else if score <= -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

/// How a stored score relates to the true value of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Searched with the full window.
    Exact,
    /// Failed high: the true value is at least the score.
    Lower,
    /// Failed low: the true value is at most the score.
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub hash: u64,
    pub depth: u32,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

/// Fixed-size hash table keyed by Zobrist hash, one entry per slot.
///
/// The slot count is a power of two so the index is a mask of the hash.
/// Stores always replace whatever is in the slot.
pub struct TranspositionTable {
    entries: Vec<Option<TtEntry>>,
    mask: usize,
}

impl TranspositionTable {
    const MIN_ENTRIES: usize = 1024;

    /// A table using at most about `size_mb` megabytes, but never fewer
    /// than 1024 slots.
    pub fn new(size_mb: usize) -> Self {
        let slot_size = std::mem::size_of::<Option<TtEntry>>();
        let wanted = size_mb.saturating_mul(1024 * 1024) / slot_size;
        let slots = if wanted.is_power_of_two() {
            wanted
        } else {
            wanted.next_power_of_two() >> 1
        };
        let slots = slots.max(Self::MIN_ENTRIES);

        TranspositionTable {
            entries: vec![None; slots],
            mask: slots - 1,
        }
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// The entry for `hash`, if the slot holds that exact position.
    pub fn get(&self, hash: u64) -> Option<&TtEntry> {
        self.entries[self.slot(hash)]
            .as_ref()
            .filter(|entry| entry.hash == hash)
    }

    /// A score that can stand in for searching this node to `depth` with
    /// window `(alpha, beta)`, `ply` plies from the root. Mate scores come
    /// back as distances from the root and are compared as such.
    pub fn probe(&self, hash: u64, depth: u32, alpha: i32, beta: i32, ply: usize) -> Option<i32> {
        let entry = self.get(hash)?;
        if entry.depth < depth {
            return None;
        }
        let score = score_from_tt(entry.score, ply);
        match entry.bound {
            Bound::Exact => Some(score),
            Bound::Lower if score >= beta => Some(score),
            Bound::Upper if score <= alpha => Some(score),
            _ => None,
        }
    }

    /// The best move recorded for `hash`, whatever its depth.
    pub fn best_move(&self, hash: u64) -> Option<Move> {
        self.get(hash).and_then(|entry| entry.best_move)
    }

    /// Records a search of this node, found `ply` plies from the root.
    pub fn store(&mut self, hash: u64, depth: u32, score: i32, bound: Bound, best_move: Option<Move>, ply: usize) {
        let slot = self.slot(hash);
        self.entries[slot] = Some(TtEntry {
            hash,
            depth,
            score: score_to_tt(score, ply),
            bound,
            best_move,
        });
    }

    pub fn clear(&mut self) {
        self.entries.fill(None);
    }

    /// Occupied slots per thousand, sampled over the first thousand slots.
    pub fn hashfull(&self) -> u32 {
        let sample = self.entries.len().min(1000);
        let used = self.entries[..sample].iter().filter(|e| e.is_some()).count();
        (used * 1000 / sample) as u32
    }
}
