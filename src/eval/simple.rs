use crate::board::{BitBoard, Color, Move, Piece, Position, Square};
use crate::types::Score;

/// Hand-crafted material + structure scorer. Cheap and deterministic; the
/// center-distance terms are anchored at d4, so it does not claim mirror
/// symmetry.
pub struct SimpleEval;

// Material, in the evaluator's own units (not classical centipawns).
const QUEEN_VALUE: Score = 100;
const ROOK_VALUE: Score = 48;
const KNIGHT_VALUE: Score = 47;
const PAWN_VALUE: Score = 21;
const BISHOP_VALUE: Score = 11;
const FLANK_PAWN_PENALTY: Score = 2;

const PASSED_PAWN: Score = 10;
const ISOLATED_PAWN: Score = 3;
const DOUBLED_PAWN: Score = 4;

const KNIGHT_CENTER_PENALTY: Score = 4;
const BISHOP_DIAGONAL_BONUS: Score = 3;
const KING_CENTER_PENALTY: Score = 1;
const QUEEN_DIAGONAL_BONUS: Score = 1;
const ROOK_HALF_OPEN_FILE: Score = 9;
const ROOK_FULL_OPEN_FILE: Score = 14;

/// Chebyshev distance from the d4/e5 quad center approximation.
fn distance_from_center(rank: u8, file: u8) -> Score {
    let dr = (3 - rank as i32).abs();
    let df = (3 - file as i32).abs();
    dr.max(df)
}

/// Length of both diagonals through the square, as a mobility proxy.
fn diagonal_moves(rank: u8, file: u8) -> Score {
    16 - (rank as i32 - file as i32).abs() - (7 - file as i32 - rank as i32).abs()
}

const FILE_A: u64 = 0x0101_0101_0101_0101;

#[inline]
fn file_mask(file: u8) -> u64 {
    FILE_A << file
}

#[inline]
fn adjacent_files_mask(file: u8) -> u64 {
    let f = file_mask(file);
    (f << 1) & !FILE_A | (f >> 1) & !(FILE_A << 7)
}

impl SimpleEval {
    /// Score from the side-to-play's perspective.
    pub fn evaluate(&self, pos: &Position) -> Score {
        self.evaluate_white(pos) * pos.side_to_move().sign()
    }

    fn evaluate_white(&self, pos: &Position) -> Score {
        let mut score = 0;
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL {
                for sq in pos.pieces(color, piece).iter() {
                    score += piece_terms(pos, color, piece, sq);
                }
            }
            score += color.sign() * pawn_structure(pos, color);
        }
        score
    }

    /// O(1)-amortized re-evaluation after `mv`: previous score adjusted by
    /// the moved and captured pieces' material and activity terms. Global
    /// pawn-structure terms are not recomputed; this is an ordering-quality
    /// approximation, not an exact re-evaluation.
    ///
    /// `prev_score` and the result are both side-to-play relative (before
    /// and after the move respectively).
    pub fn delta_evaluate(&self, pos: &Position, mv: Move, prev_score: Score) -> Score {
        let us = pos.side_to_move();
        let mut white = prev_score * us.sign();

        let piece = mv.piece();
        let placed = mv.promotion().unwrap_or(piece);
        white -= piece_terms(pos, us, piece, mv.src());
        white += piece_terms(pos, us, placed, mv.dst());

        if mv.is_en_passant() {
            let cap_sq = Square::from_coords(mv.src().rank(), mv.dst().file());
            white -= piece_terms(pos, !us, Piece::Pawn, cap_sq);
        } else if let Some(cap) = mv.captured() {
            white -= piece_terms(pos, !us, cap, mv.dst());
        }

        white * (!us).sign()
    }
}

/// Terms contributed by a single piece, signed for `color` (white positive).
fn piece_terms(pos: &Position, color: Color, piece: Piece, sq: Square) -> Score {
    let sign = color.sign();
    let (rank, file) = (sq.rank(), sq.file());
    let term = match piece {
        Piece::Queen => QUEEN_VALUE + QUEEN_DIAGONAL_BONUS * diagonal_moves(rank, file),
        Piece::Rook => ROOK_VALUE + rook_file_bonus(pos, color, file),
        Piece::Bishop => BISHOP_VALUE + BISHOP_DIAGONAL_BONUS * diagonal_moves(rank, file),
        Piece::Knight => KNIGHT_VALUE - KNIGHT_CENTER_PENALTY * distance_from_center(rank, file),
        Piece::Pawn => {
            let flank = if file == 0 || file == 7 { FLANK_PAWN_PENALTY } else { 0 };
            PAWN_VALUE - flank
        }
        Piece::King => -KING_CENTER_PENALTY * distance_from_center(rank, file),
    };
    sign * term
}

/// Positional component of a piece on a square, ignoring board context.
/// The move sorter uses the source/destination difference of this table.
pub(crate) fn activity(piece: Piece, sq: Square) -> Score {
    let (rank, file) = (sq.rank(), sq.file());
    match piece {
        Piece::Queen => QUEEN_DIAGONAL_BONUS * diagonal_moves(rank, file),
        Piece::Bishop => BISHOP_DIAGONAL_BONUS * diagonal_moves(rank, file),
        Piece::Knight => -KNIGHT_CENTER_PENALTY * distance_from_center(rank, file),
        Piece::King => -KING_CENTER_PENALTY * distance_from_center(rank, file),
        Piece::Pawn => {
            if file == 0 || file == 7 { -FLANK_PAWN_PENALTY } else { 0 }
        }
        Piece::Rook => 0,
    }
}

fn rook_file_bonus(pos: &Position, color: Color, file: u8) -> Score {
    let own_pawns = pos.pieces(color, Piece::Pawn).0 & file_mask(file);
    let their_pawns = pos.pieces(!color, Piece::Pawn).0 & file_mask(file);
    if own_pawns != 0 {
        return 0;
    }
    if their_pawns == 0 {
        ROOK_HALF_OPEN_FILE + ROOK_FULL_OPEN_FILE
    } else {
        ROOK_HALF_OPEN_FILE
    }
}

/// Passed / isolated / doubled pawn terms for one side, positive units.
fn pawn_structure(pos: &Position, color: Color) -> Score {
    let own = pos.pieces(color, Piece::Pawn);
    let their = pos.pieces(!color, Piece::Pawn);
    let mut score = 0;

    for file in 0..8u8 {
        let on_file = BitBoard(own.0 & file_mask(file));
        let count = on_file.count() as Score;
        if count == 0 {
            continue;
        }

        score -= DOUBLED_PAWN * (count - 1);

        if own.0 & adjacent_files_mask(file) == 0 {
            score -= ISOLATED_PAWN;
        }

        // Most advanced pawn on the file; passed if no enemy pawn ahead of
        // it on this or an adjacent file.
        let front_rank = match color {
            Color::White => on_file.iter().map(|s| s.rank()).max().unwrap_or(0),
            Color::Black => on_file.iter().map(|s| s.rank()).min().unwrap_or(7),
        };
        let span = file_mask(file) | adjacent_files_mask(file);
        let ahead: u64 = match color {
            Color::White if front_rank >= 7 => 0,
            Color::White => span & (!0u64 << ((front_rank as u64 + 1) * 8)),
            Color::Black => span & ((1u64 << (front_rank as u64 * 8)) - 1),
        };
        if their.0 & ahead == 0 {
            score += PASSED_PAWN;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::legal_moves;
    use std::str::FromStr;

    #[test]
    fn startpos_is_near_balanced() {
        // Not exactly zero: the center-distance terms are anchored at d4,
        // which leaves a small first-rank bias.
        let pos = Position::default();
        assert!(SimpleEval.evaluate(&pos).abs() < 20);
    }

    #[test]
    fn queen_up_is_winning() {
        let pos = Position::from_str("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
        assert!(SimpleEval.evaluate(&pos) > 90);
    }

    #[test]
    fn perspective_flips_with_side_to_move() {
        let w = Position::from_str("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
        let b = Position::from_str("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1")
            .unwrap();
        assert_eq!(SimpleEval.evaluate(&w), -SimpleEval.evaluate(&b));
    }

    #[test]
    fn material_count_dominates() {
        // Two extra pawns beat one extra pawn, activity terms aside.
        let one = Position::from_str("4k3/8/8/8/8/8/3P4/4K3 w - - 0 1").unwrap();
        let two = Position::from_str("4k3/8/8/8/8/8/2PP4/4K3 w - - 0 1").unwrap();
        assert!(SimpleEval.evaluate(&two) > SimpleEval.evaluate(&one));
    }

    #[test]
    fn doubled_and_isolated_pawns_cost() {
        let healthy = Position::from_str("4k3/8/8/8/8/8/PPP5/4K3 w - - 0 1").unwrap();
        let doubled = Position::from_str("4k3/8/8/8/P7/P7/P7/4K3 w - - 0 1").unwrap();
        assert!(SimpleEval.evaluate(&doubled) < SimpleEval.evaluate(&healthy));
    }

    #[test]
    fn passed_pawn_rewarded() {
        let passed = Position::from_str("4k3/8/8/3P4/8/8/8/4K3 w - - 0 1").unwrap();
        let blocked = Position::from_str("4k3/3p4/8/3P4/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(SimpleEval.evaluate(&passed) > SimpleEval.evaluate(&blocked));
    }

    #[test]
    fn rook_prefers_open_files() {
        // Same material; only the rook's file changes character.
        let open = Position::from_str("4k3/8/8/8/8/8/1P6/R3K3 w - - 0 1").unwrap();
        let blocked = Position::from_str("4k3/8/8/8/8/8/P7/R3K3 w - - 0 1").unwrap();
        assert!(SimpleEval.evaluate(&open) > SimpleEval.evaluate(&blocked));
    }

    #[test]
    fn delta_tracks_captures_for_ordering() {
        let mut pos = Position::from_str(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
        )
        .unwrap();
        let prev = SimpleEval.evaluate(&pos);
        let capture = legal_moves(&mut pos)
            .into_iter()
            .find(|m| m.to_string() == "e4d5")
            .unwrap();
        let after_delta = SimpleEval.delta_evaluate(&mut pos, capture, prev);
        // Black to move, down a pawn: negative for the mover.
        assert!(after_delta < 0, "got {after_delta}");
    }
}
