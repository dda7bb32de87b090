pub type Score = i32;

/// Forced-mate ceiling: a mate reached n plies from the root scores
/// `VERY_GOOD - n` for the winner.
pub const VERY_GOOD: Score = 10_000;
pub const VERY_BAD: Score = -VERY_GOOD;

/// Window bounds strictly outside any reachable score.
pub const SCORE_MAX: Score = VERY_GOOD + 1000;
pub const SCORE_MIN: Score = VERY_BAD - 1000;

/// Scores beyond this are mate-distance scores and need ply rebasing in the
/// transposition table.
pub const MATE_THRESHOLD: Score = VERY_GOOD - 200;

pub const MAX_PLY: usize = 64;
pub const DEFAULT_DEPTH: u8 = 5;
pub const DEFAULT_QUIESCENT_DEPTH: u8 = 2;
pub const DEFAULT_TT_LOG2: u32 = 24;
pub const HISTORY_MAX: Score = 16_384;
