pub mod board;
pub mod error;
pub mod eval;
pub mod san;
pub mod search;
pub mod sorter;
pub mod tt;
pub mod types;
pub mod uci;

/// Build the attack tables and Zobrist keys. Must run (or be triggered
/// lazily) before any board operation.
pub fn init() {
    board::init();
}
