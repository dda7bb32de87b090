use thiserror::Error;

/// Input errors. Logic invariants are `debug_assert!`s, not error values;
/// the search itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("invalid weights blob: expected {expected} bytes, got {got}")]
    InvalidWeights { expected: usize, got: usize },

    #[error("weights io: {0}")]
    WeightsIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
