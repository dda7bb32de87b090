mod attacks;
mod bitboard;
#[allow(clippy::module_inception)]
mod board;
mod chessmove;
mod magic;
mod movegen;
mod piece;
mod square;
mod zobrist;

pub use attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks};
pub use bitboard::{BitBoard, EMPTY};
pub use board::{BK, BQ, Position, START_FEN, WK, WQ};
pub use chessmove::Move;
pub use movegen::{MoveList, find_legal, has_any_legal_move, legal_moves, pseudo_legal_moves};
pub use piece::{Color, Piece};
pub use square::{ALL_SQUARES, Square};

/// Build the attack tables and Zobrist keys. Idempotent; both also
/// initialize lazily on first use.
pub fn init() {
    attacks::init();
    zobrist::init();
}
