mod nnue;
mod simple;

pub use nnue::{NnueEval, NnueModel};
pub use simple::SimpleEval;
pub(crate) use simple::activity;

use crate::board::{Color, Move, Piece, Position};
use crate::types::Score;

/// The configured evaluator. A small closed set chosen at configuration
/// time; dispatch happens once per call, not through trait objects.
pub enum Evaluator {
    Simple(SimpleEval),
    Nnue(Box<NnueEval>),
}

impl Evaluator {
    pub fn simple() -> Evaluator {
        Evaluator::Simple(SimpleEval)
    }

    pub fn nnue(model: NnueModel) -> Evaluator {
        Evaluator::Nnue(Box::new(NnueEval::new(model)))
    }

    /// Score from the side-to-play's perspective. The endgame oracle
    /// overrides the net.
    pub fn evaluate(&mut self, pos: &Position) -> Score {
        if let Some(score) = endgame_draw(pos) {
            return score;
        }
        match self {
            Evaluator::Simple(e) => e.evaluate(pos),
            Evaluator::Nnue(e) => e.evaluate(pos),
        }
    }

    /// Score of the position after `mv`, from the perspective of the side
    /// to move after `mv`, without a full re-evaluation where the evaluator
    /// supports it. `pos` and any accumulator state are unchanged on return.
    pub fn delta_evaluate(&mut self, pos: &mut Position, mv: Move, prev_score: Score) -> Score {
        match self {
            Evaluator::Simple(e) => e.delta_evaluate(pos, mv, prev_score),
            Evaluator::Nnue(e) => e.delta_evaluate(pos, mv, prev_score),
        }
    }

    /// Draw score when material is down to bare kings or king + one minor.
    pub fn endgame(&self, pos: &Position) -> Option<Score> {
        endgame_draw(pos)
    }
}

/// K vs K and K + minor vs K cannot be won.
fn endgame_draw(pos: &Position) -> Option<Score> {
    let occupied = pos.occupied();
    if occupied.count() > 3 {
        return None;
    }
    let minors = pos.pieces(Color::White, Piece::Knight)
        | pos.pieces(Color::White, Piece::Bishop)
        | pos.pieces(Color::Black, Piece::Knight)
        | pos.pieces(Color::Black, Piece::Bishop);
    let kings = pos.pieces(Color::White, Piece::King) | pos.pieces(Color::Black, Piece::King);
    if occupied == kings | minors {
        Some(0)
    } else {
        None
    }
}
