//! Magic bitboard tables for sliding piece attack generation.
//!
//! Each square gets a mask of relevant blocker squares and a multiplier that
//! hashes every blocker subset of that mask to a slot holding the precomputed
//! attack set. Multipliers start from a known-good table; each one is checked
//! while its slots are filled and replaced by a searched one if two subsets
//! with different attacks collide.

use crate::attack_cache::AttackCacheError;
use crate::attacks::{ray_attacks, BISHOP_DIRECTIONS, ROOK_DIRECTIONS};
use crate::Bitboard;
use chess_core::Square;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Lookup parameters for one square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Magic {
    /// Relevant blocker squares (rays without their final edge square).
    pub mask: Bitboard,
    pub magic: u64,
    /// 64 minus the number of mask bits.
    pub shift: u8,
    /// Start of this square's slots in the shared attack table.
    pub offset: usize,
}

impl Magic {
    #[inline]
    pub fn index(&self, occupied: Bitboard) -> usize {
        let relevant = occupied & self.mask;
        self.offset + (relevant.0.wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// Bishop and rook lookup tables for all 64 squares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackTables {
    pub bishop_magics: [Magic; 64],
    pub rook_magics: [Magic; 64],
    pub bishop_table: Vec<Bitboard>,
    pub rook_table: Vec<Bitboard>,
}

static TABLES: OnceLock<AttackTables> = OnceLock::new();

/// The process-wide tables, built on first use unless a set was installed.
pub fn attack_tables() -> &'static AttackTables {
    TABLES.get_or_init(AttackTables::build)
}

/// Installs `tables` as the process-wide set. Fails if lookups have already
/// forced a build or another set was installed first.
pub fn install_attack_tables(tables: AttackTables) -> Result<(), AttackCacheError> {
    TABLES
        .set(tables)
        .map_err(|_| AttackCacheError::AlreadyInitialized)
}

/// Whether the process-wide tables exist yet.
pub fn attack_tables_ready() -> bool {
    TABLES.get().is_some()
}

#[derive(Clone, Copy)]
enum Slider {
    Bishop,
    Rook,
}

impl Slider {
    fn directions(self) -> &'static [(i8, i8); 4] {
        match self {
            Slider::Bishop => &BISHOP_DIRECTIONS,
            Slider::Rook => &ROOK_DIRECTIONS,
        }
    }

    fn seeds(self) -> &'static [u64; 64] {
        match self {
            Slider::Bishop => &BISHOP_MAGICS,
            Slider::Rook => &ROOK_MAGICS,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Slider::Bishop => "bishop",
            Slider::Rook => "rook",
        }
    }
}

impl AttackTables {
    /// Builds both tables from scratch.
    pub fn build() -> Self {
        let (bishop_magics, bishop_table) = build_slider(Slider::Bishop);
        let (rook_magics, rook_table) = build_slider(Slider::Rook);
        debug!(
            bishop_slots = bishop_table.len(),
            rook_slots = rook_table.len(),
            "built magic attack tables"
        );
        AttackTables {
            bishop_magics,
            rook_magics,
            bishop_table,
            rook_table,
        }
    }

    #[inline]
    pub fn bishop(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let magic = &self.bishop_magics[sq.index() as usize];
        self.bishop_table[magic.index(occupied)]
    }

    #[inline]
    pub fn rook(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let magic = &self.rook_magics[sq.index() as usize];
        self.rook_table[magic.index(occupied)]
    }

    /// Checks every square's mask, shift and slot range against what
    /// [`AttackTables::build`] would produce, then every blocker subset
    /// against ray-casting.
    pub fn verify(&self) -> bool {
        verify_slider(&self.bishop_magics, &self.bishop_table, Slider::Bishop)
            && verify_slider(&self.rook_magics, &self.rook_table, Slider::Rook)
    }
}

fn verify_slider(magics: &[Magic; 64], table: &[Bitboard], slider: Slider) -> bool {
    let directions = slider.directions();
    magics.iter().enumerate().all(|(i, magic)| {
        let sq = Square::from_index_masked(i as u8);
        let mask = relevance_mask(sq, directions);
        let bits = mask.count();
        let in_bounds = magic
            .offset
            .checked_add(1usize << bits)
            .is_some_and(|end| end <= table.len());
        if magic.mask != mask || u32::from(magic.shift) != 64 - bits || !in_bounds {
            warn!(square = %sq, slider = slider.name(), "attack table entry has the wrong shape");
            return false;
        }
        subsets(mask).all(|occ| table[magic.index(occ)] == ray_attacks(sq, occ, directions))
    })
}

#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    attack_tables().bishop(sq, occupied)
}

#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    attack_tables().rook(sq, occupied)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let tables = attack_tables();
    tables.bishop(sq, occupied) | tables.rook(sq, occupied)
}

fn build_slider(slider: Slider) -> ([Magic; 64], Vec<Bitboard>) {
    let mut magics = [Magic::default(); 64];
    let mut table = Vec::new();
    let mut rng = SparseRng::new(0x2545_F491_4F6C_DD1D);
    let mut replaced = 0;

    for (i, entry) in magics.iter_mut().enumerate() {
        let sq = Square::from_index_masked(i as u8);
        let mask = relevance_mask(sq, slider.directions());
        let bits = mask.count();
        let shift = (64 - bits) as u8;
        let offset = table.len();
        table.resize(offset + (1usize << bits), Bitboard::EMPTY);

        let blockers: Vec<(Bitboard, Bitboard)> = subsets(mask)
            .map(|occ| (occ, ray_attacks(sq, occ, slider.directions())))
            .collect();

        let mut magic = Magic {
            mask,
            magic: slider.seeds()[i],
            shift,
            offset,
        };
        while !try_fill(&magic, &blockers, &mut table[offset..]) {
            magic.magic = rng.candidate(mask);
            replaced += 1;
        }
        *entry = magic;
    }

    if replaced > 0 {
        warn!(
            slider = slider.name(),
            replaced, "seed magics collided, searched replacements"
        );
    }
    (magics, table)
}

/// Writes every (blockers, attacks) pair into `slots`, failing on a
/// destructive collision. Collisions that agree on the attack set are fine.
fn try_fill(magic: &Magic, blockers: &[(Bitboard, Bitboard)], slots: &mut [Bitboard]) -> bool {
    let mut used = vec![false; slots.len()];
    for &(occ, attacks) in blockers {
        let idx = magic.index(occ) - magic.offset;
        if used[idx] {
            if slots[idx] != attacks {
                return false;
            }
        } else {
            used[idx] = true;
            slots[idx] = attacks;
        }
    }
    true
}

/// Ray squares from `sq` whose next step is still on the board, i.e. every
/// square a blocker can stand on and still change the attack set.
fn relevance_mask(sq: Square, directions: &[(i8, i8); 4]) -> Bitboard {
    let file = sq.file().index() as i8;
    let rank = sq.rank().index() as i8;
    let mut mask = Bitboard::EMPTY;
    for &(df, dr) in directions {
        let (mut f, mut r) = (file + df, rank + dr);
        while let (Some(here), Some(_)) =
            (Square::from_coords(f, r), Square::from_coords(f + df, r + dr))
        {
            mask.set(here);
            f += df;
            r += dr;
        }
    }
    mask
}

/// Every subset of `mask`, starting with the empty set (Carry-Rippler).
pub(crate) fn subsets(mask: Bitboard) -> impl Iterator<Item = Bitboard> {
    let mut next = Some(Bitboard::EMPTY);
    std::iter::from_fn(move || {
        let current = next?;
        let following = current.0.wrapping_sub(mask.0) & mask.0;
        next = (following != 0).then_some(Bitboard(following));
        Some(current)
    })
}

/// xorshift64* stream producing sparse multipliers (AND of three draws).
struct SparseRng(u64);

impl SparseRng {
    fn new(seed: u64) -> Self {
        SparseRng(seed)
    }

    fn next(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// A multiplier that spreads the mask into the top byte well enough to
    /// be worth trying.
    fn candidate(&mut self, mask: Bitboard) -> u64 {
        loop {
            let magic = self.next() & self.next() & self.next();
            if (mask.0.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() >= 6 {
                return magic;
            }
        }
    }
}

// Known-good multipliers, a1 first.
const BISHOP_MAGICS: [u64; 64] = [
    0x89a1121896040240,
    0x2004844802002010,
    0x2068080051921000,
    0x62880a0220200808,
    0x0004042004000000,
    0x0100822020200011,
    0xc00444222012000a,
    0x0028808801216001,
    0x0400492088408100,
    0x0201c401040c0084,
    0x00840800910a0010,
    0x0000082080240060,
    0x2000840504006000,
    0x30010c4108405004,
    0x1008005410080802,
    0x8144042209100900,
    0x0208081020014400,
    0x004800201208ca00,
    0x0f18140408012008,
    0x1004002802102001,
    0x0841000820080811,
    0x0040200200a42008,
    0x0000800054042000,
    0x88010400410c9000,
    0x0520040470104290,
    0x1004040051500081,
    0x2002081833080021,
    0x000400c00c010142,
    0x941408200c002000,
    0x0658810000806011,
    0x0188071040440a00,
    0x4800404002011c00,
    0x0104442040404200,
    0x0511080200222104,
    0x0004022401120400,
    0x80c0040400080120,
    0x8040010040820802,
    0x0480810700020090,
    0x0102008e00040242,
    0x0809005202050100,
    0x8002024220104080,
    0x0431008804142000,
    0x0019001802081400,
    0x0200014208040080,
    0x3308082008200100,
    0x041010500040c020,
    0x4012020c04210308,
    0x208220a202004080,
    0x0111040120082000,
    0x6803040141280a00,
    0x2101004202410000,
    0x8200000041108022,
    0x0000021082088000,
    0x0002410204010040,
    0x0040100400809000,
    0x0822088220820214,
    0x0040808090012004,
    0x00910224040218c9,
    0x0402814422015008,
    0x0090014004842410,
    0x0001000042304105,
    0x0010008830412a00,
    0x2520081090008908,
    0x40102000a0a60140,
];

const ROOK_MAGICS: [u64; 64] = [
    0x0a8002c000108020,
    0x06c00049b0002001,
    0x0100200010090040,
    0x2480041000800801,
    0x0280028004000800,
    0x0900410008040022,
    0x0280020001001080,
    0x2880002041000080,
    0xa000800080400034,
    0x0004808020004000,
    0x2290802004801000,
    0x0411000d00100020,
    0x0402800800040080,
    0x000b000401004208,
    0x2409000100040200,
    0x0001002100004082,
    0x0022878001e24000,
    0x1090810021004010,
    0x0801030040200012,
    0x0500808008001000,
    0x0a08018014000880,
    0x8000808004000200,
    0x0201008080010200,
    0x0801020000441091,
    0x0000800080204005,
    0x1040200040100048,
    0x0000120200402082,
    0x0d14880480100080,
    0x0012040280080080,
    0x0100040080020080,
    0x9020010080800200,
    0x0813241200148449,
    0x0491604001800080,
    0x0100401000402001,
    0x4820010021001040,
    0x0400402202000812,
    0x0209009005000802,
    0x0810800601800400,
    0x4301083214000150,
    0x204026458e001401,
    0x0040204000808000,
    0x8001008040010020,
    0x8410820820420010,
    0x1003001000090020,
    0x0804040008008080,
    0x0012000810020004,
    0x1000100200040208,
    0x430000a044020001,
    0x0280009023410300,
    0x00e0100040002240,
    0x0000200100401700,
    0x2244100408008080,
    0x0008000400801980,
    0x0002000810040200,
    0x8010100228810400,
    0x2000009044210200,
    0x4080008040102101,
    0x0040002080411d01,
    0x2005524060000901,
    0x0502001008400422,
    0x489a000810200402,
    0x0001004400080a13,
    0x4000011008020084,
    0x0026002114058042,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attacks::{bishop_attacks_ray, rook_attacks_ray};
    use chess_core::{File, Rank};

    #[test]
    fn relevance_mask_sizes() {
        let rook_bits: Vec<u32> = (0..64u8)
            .map(|i| relevance_mask(Square::from_index_masked(i), &ROOK_DIRECTIONS).count())
            .collect();
        assert_eq!(rook_bits[0], 12);
        assert_eq!(rook_bits[1], 11);
        assert_eq!(rook_bits[9], 10);

        let d4 = Square::new(File::D, Rank::R4);
        assert_eq!(relevance_mask(d4, &BISHOP_DIRECTIONS).count(), 9);
        assert_eq!(relevance_mask(Square::A1, &BISHOP_DIRECTIONS).count(), 6);
    }

    #[test]
    fn subsets_enumerates_power_set() {
        let mask = Bitboard(0b1011);
        let all: Vec<u64> = subsets(mask).map(|b| b.0).collect();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0], 0);
        assert!(all.iter().all(|s| s & !mask.0 == 0));
    }

    #[test]
    fn built_tables_verify_exhaustively() {
        assert!(attack_tables().verify());
    }

    #[test]
    fn empty_board_counts() {
        let d4 = Square::new(File::D, Rank::R4);
        assert_eq!(bishop_attacks(d4, Bitboard::EMPTY).count(), 13);
        assert_eq!(rook_attacks(d4, Bitboard::EMPTY).count(), 14);
        assert_eq!(queen_attacks(d4, Bitboard::EMPTY).count(), 27);
        assert_eq!(rook_attacks(Square::A1, Bitboard::EMPTY).count(), 14);
    }

    #[test]
    fn blockers_are_included_and_stop_rays() {
        let d4 = Square::new(File::D, Rank::R4);
        let e5 = Square::new(File::E, Rank::R5);
        let c3 = Square::new(File::C, Rank::R3);
        let occ = Bitboard::from_square(e5) | Bitboard::from_square(c3);
        let attacks = bishop_attacks(d4, occ);
        assert!(attacks.contains(e5));
        assert!(attacks.contains(c3));
        assert!(!attacks.contains(Square::new(File::F, Rank::R6)));
        assert!(!attacks.contains(Square::new(File::B, Rank::R2)));
        assert_eq!(attacks, bishop_attacks_ray(d4, occ));
        assert_eq!(rook_attacks(d4, occ), rook_attacks_ray(d4, occ));
    }

    #[test]
    fn broken_seed_is_replaced() {
        let sq = Square::new(File::D, Rank::R4);
        let mask = relevance_mask(sq, &ROOK_DIRECTIONS);
        let blockers: Vec<(Bitboard, Bitboard)> =
            subsets(mask).map(|occ| (occ, rook_attacks_ray(sq, occ))).collect();
        let bits = mask.count();
        let mut slots = vec![Bitboard::EMPTY; 1 << bits];
        let mut magic = Magic {
            mask,
            magic: 1,
            shift: (64 - bits) as u8,
            offset: 0,
        };
        assert!(!try_fill(&magic, &blockers, &mut slots));

        let mut rng = SparseRng::new(7);
        while !try_fill(&magic, &blockers, &mut slots) {
            magic.magic = rng.candidate(mask);
        }
        for (occ, attacks) in blockers {
            assert_eq!(slots[magic.index(occ)], attacks);
        }
    }
}
