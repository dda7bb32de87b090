use std::fmt;
use std::str::FromStr;

use crate::error::Error;

use super::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use super::bitboard::{BitBoard, EMPTY};
use super::chessmove::Move;
use super::piece::{Color, Piece};
use super::square::Square;
use super::zobrist;

/// Castle rights as a 4-bit mask.
pub const WK: u8 = 1;
pub const WQ: u8 = 2;
pub const BK: u8 = 4;
pub const BQ: u8 = 8;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[inline]
fn kingside_bit(color: Color) -> u8 {
    match color {
        Color::White => WK,
        Color::Black => BK,
    }
}

#[inline]
fn queenside_bit(color: Color) -> u8 {
    match color {
        Color::White => WQ,
        Color::Black => BQ,
    }
}

/// Rights surviving a move touching this square: king and rook home squares
/// clear their bits whether moved from or captured on.
const CASTLE_MASK: [u8; 64] = {
    let mut mask = [0xFFu8; 64];
    mask[0] = 0xFF ^ WQ; // a1
    mask[4] = 0xFF ^ (WK | WQ); // e1
    mask[7] = 0xFF ^ WK; // h1
    mask[56] = 0xFF ^ BQ; // a8
    mask[60] = 0xFF ^ (BK | BQ); // e8
    mask[63] = 0xFF ^ BK; // h8
    mask
};

/// Bitboard-indexed position with incremental Zobrist hash, hash history for
/// repetition counting, and in-place apply/undo.
#[derive(Clone, Debug)]
pub struct Position {
    piece_bb: [[BitBoard; 6]; 2],
    occupancy: [BitBoard; 2],
    /// Redundant square -> piece map for O(1) lookup: 0 empty, else
    /// 1 + color * 6 + piece.
    mailbox: [u8; 64],
    side_to_move: Color,
    castling: u8,
    ep_file: Option<u8>,
    halfmove_clock: u8,
    fullmove_number: u16,
    hash: u64,
    in_check: bool,
    /// Zobrist hashes of every position reached since the game root,
    /// current position last.
    history: Vec<u64>,
    /// Half-move clocks saved by `apply`, restored by `undo`. The clock is
    /// not derivable from the move itself.
    clock_stack: Vec<u8>,
}

impl Position {
    // --- accessors ---

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn pieces(&self, color: Color, piece: Piece) -> BitBoard {
        self.piece_bb[color.index()][piece.index()]
    }

    #[inline]
    pub fn occupied_by(&self, color: Color) -> BitBoard {
        self.occupancy[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> BitBoard {
        self.occupancy[0] | self.occupancy[1]
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<(Color, Piece)> {
        match self.mailbox[sq.index()] {
            0 => None,
            code => {
                let code = code as usize - 1;
                Some((
                    if code < 6 { Color::White } else { Color::Black },
                    Piece::from_index(code % 6),
                ))
            }
        }
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn castling_rights(&self) -> u8 {
        self.castling
    }

    #[inline]
    pub fn ep_file(&self) -> Option<u8> {
        self.ep_file
    }

    /// The en-passant target square implied by the stored file and the side
    /// to move.
    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_file.map(|f| {
            let rank = if self.side_to_move == Color::White { 5 } else { 2 };
            Square::from_coords(rank, f)
        })
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.in_check
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u8 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(color, Piece::King)
            .first()
            .expect("position must contain both kings")
    }

    /// How many times the current position occurs in the game history.
    pub fn times_seen(&self) -> usize {
        self.history.iter().filter(|&&h| h == self.hash).count()
    }

    // --- attack queries ---

    /// Is `sq` attacked by any piece of `by`?
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let attackers = self.occupancy[by.index()];
        let occupied = self.occupied();

        if !(knight_attacks(sq) & self.pieces(by, Piece::Knight)).is_empty() {
            return true;
        }
        // A pawn of `by` attacks sq iff a pawn of the other color standing
        // on sq would attack the pawn's square.
        if !(pawn_attacks(!by, sq) & self.pieces(by, Piece::Pawn)).is_empty() {
            return true;
        }
        let diag = self.pieces(by, Piece::Bishop) | self.pieces(by, Piece::Queen);
        if !(bishop_attacks(sq, occupied) & diag & attackers).is_empty() {
            return true;
        }
        let straight = self.pieces(by, Piece::Rook) | self.pieces(by, Piece::Queen);
        if !(rook_attacks(sq, occupied) & straight & attackers).is_empty() {
            return true;
        }
        !(king_attacks(sq) & self.pieces(by, Piece::King)).is_empty()
    }

    fn king_attacked(&self, color: Color) -> bool {
        self.is_square_attacked(self.king_square(color), !color)
    }

    // --- move construction ---

    /// Pack a move from coordinates, reading the captured piece from the
    /// board and snapshotting the state `undo` needs. The move must be
    /// pseudo-legal for the side to move.
    pub fn make_move(&self, src: Square, dst: Square, promotion: Option<Piece>) -> Move {
        let (_, piece) = self.piece_on(src).expect("make_move: empty source square");
        let dst_piece = self.piece_on(dst).map(|(_, p)| p);

        let en_passant =
            piece == Piece::Pawn && src.file() != dst.file() && dst_piece.is_none();
        let captured = if en_passant { Some(Piece::Pawn) } else { dst_piece };

        let new_rights =
            self.castling & CASTLE_MASK[src.index()] & CASTLE_MASK[dst.index()];
        let lost = self.castling ^ new_rights;
        let us = self.side_to_move;
        let them = !us;

        Move::pack(
            src,
            dst,
            piece,
            captured,
            promotion,
            en_passant,
            lost & kingside_bit(us) != 0,
            lost & queenside_bit(us) != 0,
            self.ep_file,
            self.in_check,
        )
        .with_opponent_castle_flags(
            lost & kingside_bit(them) != 0,
            lost & queenside_bit(them) != 0,
        )
    }

    // --- piece plumbing (bitboards, mailbox, hash together) ---

    #[inline]
    fn put_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        let bb = BitBoard::from_square(sq);
        self.piece_bb[color.index()][piece.index()] |= bb;
        self.occupancy[color.index()] |= bb;
        self.mailbox[sq.index()] = 1 + (color.index() * 6 + piece.index()) as u8;
        self.hash ^= zobrist::piece_key(color, piece, sq);
    }

    #[inline]
    fn remove_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        let bb = BitBoard::from_square(sq);
        self.piece_bb[color.index()][piece.index()] ^= bb;
        self.occupancy[color.index()] ^= bb;
        self.mailbox[sq.index()] = 0;
        self.hash ^= zobrist::piece_key(color, piece, sq);
    }

    fn castle_rook_squares(us: Color, kingside: bool) -> (Square, Square) {
        let rank = if us == Color::White { 0 } else { 7 };
        if kingside {
            (Square::from_coords(rank, 7), Square::from_coords(rank, 5))
        } else {
            (Square::from_coords(rank, 0), Square::from_coords(rank, 3))
        }
    }

    fn rights_cleared_by(mv: Move, us: Color) -> u8 {
        let them = !us;
        let mut cleared = 0u8;
        if mv.clears_kingside_castle() {
            cleared |= kingside_bit(us);
        }
        if mv.clears_queenside_castle() {
            cleared |= queenside_bit(us);
        }
        if mv.clears_opponent_kingside_castle() {
            cleared |= kingside_bit(them);
        }
        if mv.clears_opponent_queenside_castle() {
            cleared |= queenside_bit(them);
        }
        cleared
    }

    // --- apply / undo ---

    /// Apply a pseudo-legal move in place: piece movement, castling rook,
    /// en passant, promotion, rights, en-passant file, clocks, side to move,
    /// hash, history, and the in-check flag for the side now to play.
    pub fn apply(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = !us;
        let src = mv.src();
        let dst = mv.dst();
        let piece = mv.piece();

        self.clock_stack.push(self.halfmove_clock);

        if let Some(f) = self.ep_file {
            self.hash ^= zobrist::ep_file_key(f);
        }

        self.remove_piece(us, piece, src);
        if mv.is_en_passant() {
            // The captured pawn sits beside the source, on the destination file.
            let cap_sq = Square::from_coords(src.rank(), dst.file());
            self.remove_piece(them, Piece::Pawn, cap_sq);
        } else if let Some(cap) = mv.captured() {
            self.remove_piece(them, cap, dst);
        }
        self.put_piece(us, mv.promotion().unwrap_or(piece), dst);

        if mv.is_castle() {
            let (rook_src, rook_dst) = Self::castle_rook_squares(us, dst.file() == 6);
            self.remove_piece(us, Piece::Rook, rook_src);
            self.put_piece(us, Piece::Rook, rook_dst);
        }

        let cleared = Self::rights_cleared_by(mv, us);
        self.castling &= !cleared;
        self.hash ^= zobrist::castle_rights_key(cleared);

        self.ep_file = if piece == Piece::Pawn && src.rank().abs_diff(dst.rank()) == 2 {
            Some(src.file())
        } else {
            None
        };
        if let Some(f) = self.ep_file {
            self.hash ^= zobrist::ep_file_key(f);
        }

        self.halfmove_clock = if piece == Piece::Pawn || mv.is_capture() {
            0
        } else {
            self.halfmove_clock + 1
        };
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = them;
        self.hash ^= zobrist::side_key();

        self.in_check = self.king_attacked(them);
        self.history.push(self.hash);
    }

    /// Reverse `apply(mv)` using the move's snapshot fields. The position is
    /// bit-identical to the pre-apply state afterwards, hash and history
    /// length included.
    pub fn undo(&mut self, mv: Move) {
        self.history.pop();

        let them = self.side_to_move;
        let us = !them;
        let src = mv.src();
        let dst = mv.dst();
        let piece = mv.piece();

        self.hash ^= zobrist::side_key();
        self.side_to_move = us;
        if us == Color::Black {
            self.fullmove_number -= 1;
        }

        if let Some(f) = self.ep_file {
            self.hash ^= zobrist::ep_file_key(f);
        }

        let cleared = Self::rights_cleared_by(mv, us);
        self.castling |= cleared;
        self.hash ^= zobrist::castle_rights_key(cleared);

        if mv.is_castle() {
            let (rook_src, rook_dst) = Self::castle_rook_squares(us, dst.file() == 6);
            self.remove_piece(us, Piece::Rook, rook_dst);
            self.put_piece(us, Piece::Rook, rook_src);
        }

        self.remove_piece(us, mv.promotion().unwrap_or(piece), dst);
        self.put_piece(us, piece, src);
        if mv.is_en_passant() {
            let cap_sq = Square::from_coords(src.rank(), dst.file());
            self.put_piece(them, Piece::Pawn, cap_sq);
        } else if let Some(cap) = mv.captured() {
            self.put_piece(them, cap, dst);
        }

        self.ep_file = mv.prior_ep_file();
        if let Some(f) = self.ep_file {
            self.hash ^= zobrist::ep_file_key(f);
        }

        self.halfmove_clock = self.clock_stack.pop().unwrap_or_default();
        self.in_check = mv.prior_in_check();
    }

    // --- invariants ---

    /// Hash recomputed from the piece placement and state fields; equals the
    /// incrementally maintained hash at all times.
    pub fn compute_hash_from_scratch(&self) -> u64 {
        let mut h = 0u64;
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL {
                for sq in self.pieces(color, piece).iter() {
                    h ^= zobrist::piece_key(color, piece, sq);
                }
            }
        }
        if self.side_to_move == Color::Black {
            h ^= zobrist::side_key();
        }
        h ^= zobrist::castle_rights_key(self.castling);
        if let Some(f) = self.ep_file {
            h ^= zobrist::ep_file_key(f);
        }
        h
    }

    /// Debug check that the mailbox agrees with the bitboards and the hash
    /// with its recomputation. Dumps the position on failure.
    pub fn debug_validate(&self) {
        #[cfg(debug_assertions)]
        {
            for sq in super::square::ALL_SQUARES {
                let from_bb = Piece::ALL.into_iter().find_map(|p| {
                    [Color::White, Color::Black]
                        .into_iter()
                        .find(|&c| self.pieces(c, p).contains(sq))
                        .map(|c| (c, p))
                });
                debug_assert!(
                    from_bb == self.piece_on(sq),
                    "mailbox/bitboard disagreement on {sq}: {self}"
                );
            }
            debug_assert!(
                self.hash == self.compute_hash_from_scratch(),
                "zobrist drift: {self}"
            );
            debug_assert!(self.pieces(Color::White, Piece::King).count() == 1);
            debug_assert!(self.pieces(Color::Black, Piece::King).count() == 1);
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::from_str(START_FEN).expect("start FEN is valid")
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.piece_bb == other.piece_bb
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.ep_file == other.ep_file
    }
}

impl Eq for Position {}

// --- FEN ---

impl FromStr for Position {
    type Err = Error;

    fn from_str(fen: &str) -> Result<Self, Error> {
        super::init();

        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(Error::InvalidFen(fen.to_string()));
        }

        let mut pos = Position {
            piece_bb: [[EMPTY; 6]; 2],
            occupancy: [EMPTY; 2],
            mailbox: [0; 64],
            side_to_move: Color::White,
            castling: 0,
            ep_file: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            in_check: false,
            history: Vec::with_capacity(256),
            clock_stack: Vec::with_capacity(256),
        };

        let mut rank = 7i8;
        let mut file = 0i8;
        for ch in parts[0].chars() {
            match ch {
                '/' => {
                    rank -= 1;
                    file = 0;
                }
                '1'..='8' => file += ch as i8 - b'0' as i8,
                _ => {
                    let piece = Piece::from_fen_char(ch)
                        .ok_or_else(|| Error::InvalidFen(fen.to_string()))?;
                    let color =
                        if ch.is_ascii_uppercase() { Color::White } else { Color::Black };
                    if !(0..8).contains(&rank) || !(0..8).contains(&file) {
                        return Err(Error::InvalidFen(fen.to_string()));
                    }
                    let sq = Square::from_coords(rank as u8, file as u8);
                    pos.put_piece(color, piece, sq);
                    file += 1;
                }
            }
        }

        pos.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(Error::InvalidFen(fen.to_string())),
        };

        for ch in parts[2].chars() {
            match ch {
                'K' => pos.castling |= WK,
                'Q' => pos.castling |= WQ,
                'k' => pos.castling |= BK,
                'q' => pos.castling |= BQ,
                '-' => {}
                _ => return Err(Error::InvalidFen(fen.to_string())),
            }
        }

        if parts[3] != "-" {
            let sq = Square::parse(parts[3])
                .map_err(|_| Error::InvalidFen(fen.to_string()))?;
            pos.ep_file = Some(sq.file());
        }

        if parts.len() > 4 {
            pos.halfmove_clock = parts[4]
                .parse()
                .map_err(|_| Error::InvalidFen(fen.to_string()))?;
        }
        if parts.len() > 5 {
            pos.fullmove_number = parts[5]
                .parse()
                .map_err(|_| Error::InvalidFen(fen.to_string()))?;
        }

        if pos.pieces(Color::White, Piece::King).count() != 1
            || pos.pieces(Color::Black, Piece::King).count() != 1
        {
            return Err(Error::InvalidFen(fen.to_string()));
        }

        pos.hash = pos.compute_hash_from_scratch();
        pos.in_check = pos.king_attacked(pos.side_to_move);
        pos.history.push(pos.hash);

        Ok(pos)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let sq = Square::from_coords(rank, file);
                match self.piece_on(sq) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            write!(f, "{empty}")?;
                            empty = 0;
                        }
                        write!(f, "{}", piece.fen_char(color))?;
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{empty}")?;
            }
            if rank > 0 {
                write!(f, "/")?;
            }
        }

        write!(f, " {}", if self.side_to_move == Color::White { "w" } else { "b" })?;

        write!(f, " ")?;
        if self.castling == 0 {
            write!(f, "-")?;
        } else {
            for (bit, ch) in [(WK, 'K'), (WQ, 'Q'), (BK, 'k'), (BQ, 'q')] {
                if self.castling & bit != 0 {
                    write!(f, "{ch}")?;
                }
            }
        }

        match self.ep_square() {
            Some(sq) => write!(f, " {sq}")?,
            None => write!(f, " -")?,
        }

        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(pos: &Position, uci: &str) -> Move {
        let src = Square::parse(&uci[0..2]).unwrap();
        let dst = Square::parse(&uci[2..4]).unwrap();
        let promo = uci.as_bytes().get(4).and_then(|&c| Piece::from_fen_char(c as char));
        pos.make_move(src, dst, promo)
    }

    #[test]
    fn startpos_fields() {
        let pos = Position::default();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling_rights(), WK | WQ | BK | BQ);
        assert!(pos.ep_file().is_none());
        assert!(!pos.in_check());
        assert_eq!(pos.history_len(), 1);
    }

    #[test]
    fn fen_roundtrip() {
        for fen in [
            START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 3 12",
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
        ] {
            let pos = Position::from_str(fen).unwrap();
            assert_eq!(pos.to_string(), fen);
        }
    }

    #[test]
    fn fen_rejects_garbage() {
        assert!(Position::from_str("not a fen").is_err());
        assert!(Position::from_str("8/8/8/8/8/8/8/8 w - - 0 1").is_err()); // kingless
        assert!(Position::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
    }

    #[test]
    fn apply_undo_restores_everything() {
        let mut pos = Position::from_str(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let before_fen = pos.to_string();
        let before_hash = pos.hash();
        let before_len = pos.history_len();

        for uci in ["e2a6", "e1g1", "d5e6", "a1b1", "h1f1"] {
            let m = mv(&pos, uci);
            pos.apply(m);
            pos.undo(m);
            assert_eq!(pos.to_string(), before_fen, "undo {uci}");
            assert_eq!(pos.hash(), before_hash, "hash after undo {uci}");
            assert_eq!(pos.history_len(), before_len, "history after undo {uci}");
            pos.debug_validate();
        }
    }

    #[test]
    fn en_passant_apply_matches_expected_fen() {
        let mut pos =
            Position::from_str("8/4k3/5p2/3BP1pP/5KP1/8/2b5/8 w - g6 0 1").unwrap();
        let m = mv(&pos, "h5g6");
        assert!(m.is_en_passant());
        pos.apply(m);
        assert_eq!(pos.to_string(), "8/4k3/5pP1/3BP3/5KP1/8/2b5/8 b - - 0 1");
        pos.undo(m);
        assert_eq!(pos.to_string(), "8/4k3/5p2/3BP1pP/5KP1/8/2b5/8 w - g6 0 1");
    }

    #[test]
    fn castling_moves_rook_and_rights() {
        let mut pos =
            Position::from_str("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let m = mv(&pos, "e1g1");
        pos.apply(m);
        assert_eq!(pos.piece_on(Square::parse("g1").unwrap()), Some((Color::White, Piece::King)));
        assert_eq!(pos.piece_on(Square::parse("f1").unwrap()), Some((Color::White, Piece::Rook)));
        assert_eq!(pos.castling_rights(), BK | BQ);
        pos.undo(m);
        assert_eq!(pos.castling_rights(), WK | WQ | BK | BQ);
    }

    #[test]
    fn rook_capture_clears_opponent_rights() {
        let mut pos =
            Position::from_str("r3k2r/pppppppp/8/8/8/8/PPPPP1PP/R3K2R b KQkq - 0 1").unwrap();
        // Black rook takes h1.
        let m = mv(&pos, "h8h1");
        pos.apply(m);
        assert_eq!(pos.castling_rights() & WK, 0);
        assert_eq!(pos.castling_rights() & BK, 0);
        pos.undo(m);
        assert_eq!(pos.castling_rights(), WK | WQ | BK | BQ);
    }

    #[test]
    fn promotion_substitutes_piece() {
        let mut pos = Position::from_str("8/P7/8/8/8/8/8/K6k w - - 0 1").unwrap();
        let m = mv(&pos, "a7a8q");
        pos.apply(m);
        assert_eq!(pos.piece_on(Square::parse("a8").unwrap()), Some((Color::White, Piece::Queen)));
        pos.undo(m);
        assert_eq!(pos.piece_on(Square::parse("a7").unwrap()), Some((Color::White, Piece::Pawn)));
    }

    #[test]
    fn hash_matches_scratch_along_a_game() {
        let mut pos = Position::default();
        for uci in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "g8f6", "e1g1", "f6e4"] {
            let m = mv(&pos, uci);
            pos.apply(m);
            assert_eq!(pos.hash(), pos.compute_hash_from_scratch(), "after {uci}");
        }
    }

    #[test]
    fn e4_hash_is_stable_and_undo_restores_it() {
        let mut pos = Position::default();
        let start_hash = pos.hash();
        let m = mv(&pos, "e2e4");
        pos.apply(m);
        let e4_hash = pos.hash();
        assert_ne!(e4_hash, 0);
        assert_ne!(e4_hash, start_hash);
        pos.undo(m);
        assert_eq!(pos.hash(), start_hash);

        // Deterministic key table: re-deriving from a fresh position gives
        // the same value.
        let mut again = Position::default();
        let m2 = mv(&again, "e2e4");
        again.apply(m2);
        assert_eq!(again.hash(), e4_hash);
    }

    #[test]
    fn repetition_counting() {
        let mut pos = Position::default();
        assert_eq!(pos.times_seen(), 1);
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
            let m = mv(&pos, uci);
            pos.apply(m);
        }
        assert_eq!(pos.times_seen(), 3);
    }

    #[test]
    fn fullmove_number_tracks_black_moves() {
        let mut pos = Position::default();
        let m1 = mv(&pos, "e2e4");
        pos.apply(m1);
        assert_eq!(pos.fullmove_number(), 1);
        let m2 = mv(&pos, "e7e5");
        pos.apply(m2);
        assert_eq!(pos.fullmove_number(), 2);
        pos.undo(m2);
        assert_eq!(pos.fullmove_number(), 1);
    }
}
