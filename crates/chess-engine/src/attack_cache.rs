//! On-disk cache for the magic attack tables.
//!
//! The file is a flat sequence of little-endian `u64` words:
//!
//! ```text
//! FILE_TAG VERSION bishop_len rook_len
//! 64 x (magic mask shift offset)   bishop squares, a1 first
//! 64 x (magic mask shift offset)   rook squares
//! bishop_len words                 bishop attack table
//! rook_len words                   rook attack table
//! ```

use crate::magics::{attack_tables, attack_tables_ready, install_attack_tables, AttackTables, Magic};
use crate::Bitboard;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

const FILE_TAG: u64 = u64::from_le_bytes(*b"MAGICATK");
const VERSION: u64 = 1;
const HEADER_WORDS: usize = 4;
const SQUARE_WORDS: usize = 4;

/// Failures reading, writing or installing cached tables.
#[derive(Debug, Error)]
pub enum AttackCacheError {
    #[error("attack cache I/O: {0}")]
    Io(#[from] io::Error),

    #[error("attack cache header is not recognised")]
    BadHeader,

    #[error("attack cache is truncated or has inconsistent lengths")]
    Truncated,

    #[error("attack tables were already initialised")]
    AlreadyInitialized,
}

impl AttackTables {
    /// Serializes the tables to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), AttackCacheError> {
        let mut words = Vec::with_capacity(
            HEADER_WORDS + 2 * 64 * SQUARE_WORDS + self.bishop_table.len() + self.rook_table.len(),
        );
        words.extend([
            FILE_TAG,
            VERSION,
            self.bishop_table.len() as u64,
            self.rook_table.len() as u64,
        ]);
        for magic in self.bishop_magics.iter().chain(self.rook_magics.iter()) {
            words.extend([
                magic.magic,
                magic.mask.0,
                u64::from(magic.shift),
                magic.offset as u64,
            ]);
        }
        words.extend(self.bishop_table.iter().map(|bb| bb.0));
        words.extend(self.rook_table.iter().map(|bb| bb.0));

        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Reads tables written by [`AttackTables::save`].
    ///
    /// Lengths and per-square slot ranges are checked; the attack sets
    /// themselves are not. Use [`AttackTables::verify`] for that.
    pub fn load(path: &Path) -> Result<Self, AttackCacheError> {
        let bytes = fs::read(path)?;
        if bytes.len() % 8 != 0 {
            return Err(AttackCacheError::Truncated);
        }
        let words: Vec<u64> = bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut word = [0u8; 8];
                word.copy_from_slice(chunk);
                u64::from_le_bytes(word)
            })
            .collect();

        if words.len() < HEADER_WORDS {
            return Err(AttackCacheError::Truncated);
        }
        if words[0] != FILE_TAG || words[1] != VERSION {
            return Err(AttackCacheError::BadHeader);
        }
        let bishop_len = usize::try_from(words[2]).map_err(|_| AttackCacheError::Truncated)?;
        let rook_len = usize::try_from(words[3]).map_err(|_| AttackCacheError::Truncated)?;

        let magics_end = HEADER_WORDS + 2 * 64 * SQUARE_WORDS;
        let expected = magics_end
            .checked_add(bishop_len)
            .and_then(|n| n.checked_add(rook_len))
            .ok_or(AttackCacheError::Truncated)?;
        if words.len() != expected {
            return Err(AttackCacheError::Truncated);
        }

        let read_magics = |start: usize, table_len: usize| -> Result<[Magic; 64], AttackCacheError> {
            let mut magics = [Magic::default(); 64];
            for (i, magic) in magics.iter_mut().enumerate() {
                let base = start + i * SQUARE_WORDS;
                let shift = u8::try_from(words[base + 2]).map_err(|_| AttackCacheError::BadHeader)?;
                if shift == 0 || shift > 63 {
                    return Err(AttackCacheError::BadHeader);
                }
                let offset = usize::try_from(words[base + 3]).map_err(|_| AttackCacheError::Truncated)?;
                let slots = 1usize << (64 - u32::from(shift));
                if offset.checked_add(slots).map_or(true, |end| end > table_len) {
                    return Err(AttackCacheError::Truncated);
                }
                *magic = Magic {
                    magic: words[base],
                    mask: Bitboard(words[base + 1]),
                    shift,
                    offset,
                };
            }
            Ok(magics)
        };

        let bishop_magics = read_magics(HEADER_WORDS, bishop_len)?;
        let rook_magics = read_magics(HEADER_WORDS + 64 * SQUARE_WORDS, rook_len)?;
        let bishop_table = words[magics_end..magics_end + bishop_len]
            .iter()
            .map(|&w| Bitboard(w))
            .collect();
        let rook_table = words[magics_end + bishop_len..]
            .iter()
            .map(|&w| Bitboard(w))
            .collect();

        Ok(AttackTables {
            bishop_magics,
            rook_magics,
            bishop_table,
            rook_table,
        })
    }
}

/// Makes the process-wide tables available, going through the cache at
/// `path`.
///
/// A readable, consistent cache is installed as-is. Otherwise the tables are
/// built and written back. Cache problems are logged and never fatal.
pub fn load_or_build(path: &Path) -> &'static AttackTables {
    if attack_tables_ready() {
        debug!("attack tables already initialised");
        if path.exists() {
            return attack_tables();
        }
    } else {
        match AttackTables::load(path) {
            Ok(tables) if tables.verify() => {
                match install_attack_tables(tables) {
                    Ok(()) => info!(path = %path.display(), "loaded attack tables from cache"),
                    Err(err) => debug!(%err, "cached attack tables not installed"),
                }
                return attack_tables();
            }
            Ok(_) => warn!(path = %path.display(), "cached attack tables failed verification, rebuilding"),
            Err(AttackCacheError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no attack table cache yet")
            }
            Err(err) => warn!(path = %path.display(), %err, "ignoring unreadable attack table cache"),
        }
    }

    let tables = attack_tables();
    match tables.save(path) {
        Ok(()) => info!(path = %path.display(), "wrote attack table cache"),
        Err(err) => warn!(path = %path.display(), %err, "could not write attack table cache"),
    }
    tables
}
