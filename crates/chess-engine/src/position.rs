//! Board state: piece placement, game flags and cached derived data.

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::error::{InvariantError, MoveParseError};
use crate::movegen::generate_legal;
use crate::zobrist::ZOBRIST;
use crate::Bitboard;
use chess_core::{
    CastlingRights, Color, ColoredPiece, FenError, FenParser, Move, Piece, Rank, Square, UciMove,
};

/// A complete chess position.
///
/// Holds one bitboard per colored piece kind plus everything derived from
/// them that search needs quickly: per-color and total occupancy, both king
/// squares, the Zobrist hash and the attack mask of the side not to move.
/// All of it is kept current by [`Position::apply_move`]; [`Position::validate`]
/// recomputes each cache from scratch and compares.
///
/// Search explores a branch by cloning (see [`Position::make_move`]), so
/// there is no undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pieces: [Bitboard; ColoredPiece::COUNT],
    occupancy: [Bitboard; 2],
    occupied: Bitboard,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    kings: [Square; 2],
    hash: u64,
    attack_mask: Bitboard,
}

impl Position {
    /// The standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(FenParser::STARTPOS).expect("STARTPOS is valid")
    }

    /// Builds a position from FEN text.
    ///
    /// Rejects anything [`FenParser`] rejects, and boards without exactly one
    /// king per side.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Self::from_parsed(&FenParser::parse(fen)?)
    }

    pub fn from_parsed(parsed: &FenParser) -> Result<Self, FenError> {
        let (white, black) = parsed.king_counts();
        if white != 1 || black != 1 {
            return Err(FenError::InvalidKings { white, black });
        }

        let mut position = Position {
            pieces: [Bitboard::EMPTY; ColoredPiece::COUNT],
            occupancy: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            side_to_move: parsed.side_to_move,
            castling: parsed.castling,
            en_passant: parsed.en_passant,
            halfmove_clock: parsed.halfmove_clock,
            fullmove_number: parsed.fullmove_number,
            kings: [Square::E1, Square::E8],
            hash: 0,
            attack_mask: Bitboard::EMPTY,
        };
        for (sq, piece) in parsed.pieces() {
            position.pieces[piece.index()].set(sq);
            position.occupancy[piece.color.index()].set(sq);
            if piece.piece == Piece::King {
                position.kings[piece.color.index()] = sq;
            }
        }
        position.occupied = position.occupancy[0] | position.occupancy[1];
        if let Some(ep) = position.en_passant {
            position.check_en_passant(ep)?;
        }
        position.hash = position.compute_hash();
        position.attack_mask = position.attacks_by(!position.side_to_move);
        Ok(position)
    }

    /// An en-passant target must be empty, on the mover's sixth rank, with
    /// the pawn that just double-pushed standing behind it.
    fn check_en_passant(&self, ep: Square) -> Result<(), FenError> {
        let them = !self.side_to_move;
        let (target_rank, victim) = match self.side_to_move {
            Color::White => (5, ep.index().checked_sub(8)),
            Color::Black => (2, ep.index().checked_add(8)),
        };
        let victim_ok = victim
            .and_then(Square::from_index)
            .is_some_and(|sq| self.pieces_of(Piece::Pawn, them).contains(sq));
        if ep.rank().index() != target_rank || self.occupied.contains(ep) || !victim_ok {
            return Err(FenError::InvalidEnPassantSquare(ep.to_algebraic()));
        }
        Ok(())
    }

    /// The position as FEN text. Inverse of [`Position::from_fen`] on
    /// canonical input.
    pub fn to_fen(&self) -> String {
        let mut board = [None; 64];
        for piece in ColoredPiece::all() {
            for sq in self.pieces(piece) {
                board[sq.index() as usize] = Some(piece);
            }
        }
        FenParser {
            board,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_fen()
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// The cached Zobrist hash.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Squares attacked by the side not to move.
    #[inline]
    pub fn attack_mask(&self) -> Bitboard {
        self.attack_mask
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// The bitboard of one colored piece kind, by value.
    #[inline]
    pub fn pieces(&self, piece: ColoredPiece) -> Bitboard {
        self.pieces[piece.index()]
    }

    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.pieces[ColoredPiece::new(piece, color).index()]
    }

    #[inline]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    pub fn piece_at(&self, sq: Square) -> Option<ColoredPiece> {
        if !self.occupied.contains(sq) {
            return None;
        }
        let color = if self.occupancy[Color::White.index()].contains(sq) {
            Color::White
        } else {
            Color::Black
        };
        Piece::ALL
            .into_iter()
            .map(|piece| ColoredPiece::new(piece, color))
            .find(|cp| self.pieces[cp.index()].contains(sq))
    }

    /// Whether any piece of `by` attacks `sq` under the current occupancy.
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let occupied = self.occupied;
        let queens = self.pieces_of(Piece::Queen, by);

        pawn_attacks(sq, !by).intersects(self.pieces_of(Piece::Pawn, by))
            || knight_attacks(sq).intersects(self.pieces_of(Piece::Knight, by))
            || king_attacks(sq).intersects(self.pieces_of(Piece::King, by))
            || bishop_attacks(sq, occupied).intersects(self.pieces_of(Piece::Bishop, by) | queens)
            || rook_attacks(sq, occupied).intersects(self.pieces_of(Piece::Rook, by) | queens)
    }

    pub fn is_king_in_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.king_square(color), !color)
    }

    /// Whether the side to move is in check. Answered from the cached
    /// attack mask.
    #[inline]
    pub fn in_check(&self) -> bool {
        self.attack_mask.contains(self.king_square(self.side_to_move))
    }

    /// Every square attacked by `color`.
    pub fn attacks_by(&self, color: Color) -> Bitboard {
        let occupied = self.occupied;
        let mut attacks = Bitboard::EMPTY;
        for sq in self.pieces_of(Piece::Pawn, color) {
            attacks |= pawn_attacks(sq, color);
        }
        for sq in self.pieces_of(Piece::Knight, color) {
            attacks |= knight_attacks(sq);
        }
        let queens = self.pieces_of(Piece::Queen, color);
        for sq in self.pieces_of(Piece::Bishop, color) | queens {
            attacks |= bishop_attacks(sq, occupied);
        }
        for sq in self.pieces_of(Piece::Rook, color) | queens {
            attacks |= rook_attacks(sq, occupied);
        }
        attacks | king_attacks(self.king_square(color))
    }

    /// The Zobrist hash recomputed from scratch.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0;
        for piece in ColoredPiece::all() {
            for sq in self.pieces(piece) {
                hash ^= ZOBRIST.piece(piece, sq);
            }
        }
        if self.side_to_move == Color::White {
            hash ^= ZOBRIST.white_to_move();
        }
        hash ^= ZOBRIST.castling(self.castling);
        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.en_passant(ep);
        }
        hash
    }

    fn put(&mut self, piece: ColoredPiece, sq: Square) {
        self.pieces[piece.index()].set(sq);
        self.occupancy[piece.color.index()].set(sq);
        self.occupied.set(sq);
        self.hash ^= ZOBRIST.piece(piece, sq);
    }

    fn remove(&mut self, piece: ColoredPiece, sq: Square) {
        self.pieces[piece.index()].clear(sq);
        self.occupancy[piece.color.index()].clear(sq);
        self.occupied.clear(sq);
        self.hash ^= ZOBRIST.piece(piece, sq);
    }

    fn relocate(&mut self, piece: ColoredPiece, from: Square, to: Square) {
        self.remove(piece, from);
        self.put(piece, to);
    }

    /// Plays `mv`, which must be pseudo-legal here.
    ///
    /// Exactly one of three cases applies, tried in order: en passant (a pawn
    /// landing on the en-passant target), castling (non-empty castle flag),
    /// or a normal move including captures and promotions. Castling rights
    /// are revoked uniformly afterwards from both the origin and the
    /// destination square, which covers king moves, rooks leaving their
    /// corner and any capture on a rook corner.
    pub fn apply_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = !us;
        let mover = ColoredPiece::new(mv.piece, us);
        let mut capture = false;

        if let Some(ep) = self.en_passant.take() {
            self.hash ^= ZOBRIST.en_passant(ep);
            if mv.piece == Piece::Pawn && mv.to == ep {
                let victim_sq = match us {
                    Color::White => Square::from_index_masked(ep.index() - 8),
                    Color::Black => Square::from_index_masked(ep.index() + 8),
                };
                self.remove(ColoredPiece::new(Piece::Pawn, them), victim_sq);
                self.relocate(mover, mv.from, mv.to);
                capture = true;
            }
        }

        if !capture {
            if let Some(squares) = mv.castle.squares() {
                self.relocate(mover, squares.king_from, squares.king_to);
                self.relocate(
                    ColoredPiece::new(Piece::Rook, us),
                    squares.rook_from,
                    squares.rook_to,
                );
            } else {
                if let Some(victim) = self.piece_at(mv.to) {
                    self.remove(victim, mv.to);
                    capture = true;
                }
                self.remove(mover, mv.from);
                self.put(ColoredPiece::new(mv.promotion, us), mv.to);

                if mv.piece == Piece::Pawn && is_double_push(us, mv.from, mv.to) {
                    let passed = Square::from_index_masked((mv.from.index() + mv.to.index()) / 2);
                    self.en_passant = Some(passed);
                    self.hash ^= ZOBRIST.en_passant(passed);
                }
            }
        }

        let revoked = CastlingRights::revoked_by(mv.from).union(CastlingRights::revoked_by(mv.to));
        if self.castling.bits() & revoked.bits() != 0 {
            self.hash ^= ZOBRIST.castling(self.castling);
            self.castling = self.castling.without(revoked);
            self.hash ^= ZOBRIST.castling(self.castling);
        }

        if mv.piece == Piece::King {
            self.kings[us.index()] = mv.to;
        }

        if mv.piece == Piece::Pawn || capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = them;
        self.hash ^= ZOBRIST.white_to_move();
        self.attack_mask = self.attacks_by(us);

        debug_assert_eq!(self.validate(), Ok(()), "after {}", mv);
    }

    /// A copy of this position with `mv` applied.
    pub fn make_move(&self, mv: Move) -> Position {
        let mut next = self.clone();
        next.apply_move(mv);
        next
    }

    /// Resolves UCI text such as `e2e4` or `e7e8q` against the legal moves
    /// of this position.
    pub fn parse_uci_move(&self, text: &str) -> Result<Move, MoveParseError> {
        let uci = UciMove::parse(text).ok_or_else(|| MoveParseError::Malformed(text.to_string()))?;
        generate_legal(self)
            .into_iter()
            .find(|mv| mv.matches(uci))
            .ok_or_else(|| MoveParseError::Illegal(text.to_string()))
    }

    /// Plays a sequence of UCI moves. On the first bad move nothing is
    /// applied and `self` is unchanged.
    pub fn apply_uci_moves<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<(), MoveParseError> {
        let mut next = self.clone();
        for text in moves {
            let mv = next.parse_uci_move(text.as_ref())?;
            next.apply_move(mv);
        }
        *self = next;
        Ok(())
    }

    /// Recomputes every cached value and checks the placement invariants.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let mut union = Bitboard::EMPTY;
        let mut per_color = [Bitboard::EMPTY; 2];
        for first in ColoredPiece::all() {
            let bb = self.pieces(first);
            if bb.intersects(union) {
                let second = ColoredPiece::all()
                    .find(|other| other.index() < first.index() && self.pieces(*other).intersects(bb))
                    .unwrap_or(first);
                return Err(InvariantError::OverlappingPieces { first: second, second: first });
            }
            union |= bb;
            per_color[first.color.index()] |= bb;
        }

        for color in Color::BOTH {
            if per_color[color.index()] != self.occupancy(color) {
                return Err(InvariantError::OccupancyMismatch(color));
            }
            let kings = self.pieces_of(Piece::King, color);
            if kings.count() != 1 {
                return Err(InvariantError::KingCount {
                    color,
                    count: kings.count(),
                });
            }
            let cached = self.king_square(color);
            if !kings.contains(cached) {
                return Err(InvariantError::KingSquare { color, cached });
            }
        }
        if union != self.occupied {
            return Err(InvariantError::OccupancyMismatch(self.side_to_move));
        }

        let computed = self.compute_hash();
        if computed != self.hash {
            return Err(InvariantError::HashMismatch {
                cached: self.hash,
                computed,
            });
        }
        if self.attack_mask != self.attacks_by(!self.side_to_move) {
            return Err(InvariantError::StaleAttackMask);
        }
        Ok(())
    }
}

fn is_double_push(color: Color, from: Square, to: Square) -> bool {
    match color {
        Color::White => from.rank() == Rank::R2 && to.rank() == Rank::R4,
        Color::Black => from.rank() == Rank::R7 && to.rank() == Rank::R5,
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}
