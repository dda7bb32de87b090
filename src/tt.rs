use crate::board::Move;
use crate::types::{MATE_THRESHOLD, Score};

/// Bound type of a stored score. Nonzero, so it doubles as the
/// slot-occupied marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Upper = 1,
    Lower = 2,
    Exact = 3,
}

#[derive(Clone, Copy, Debug)]
pub struct TtEntry {
    pub mv: Move,
    pub score: Score,
    pub depth: u8,
    pub bound: Bound,
}

/// Direct-mapped table of 2^k packed entries, indexed by the low k bits of
/// the Zobrist hash.
///
/// Entry layout in a u64:
///   - bits 0..2:   bound type (0 = empty slot)
///   - bits 2..7:   depth remaining
///   - bits 8..16:  checksum, the hash's top byte (never part of the index)
///   - bits 16..32: score as i16
///   - bits 32..64: response move
pub struct TranspositionTable {
    entries: Vec<u64>,
    mask: u64,
}

const DEPTH_MAX: u8 = 31;

#[inline]
fn checksum(hash: u64) -> u64 {
    hash >> 56
}

impl TranspositionTable {
    /// Allocate 2^k entries up front. Allocation failure is fatal; there is
    /// no degraded mode.
    pub fn new(size_log2: u32) -> TranspositionTable {
        let size = 1usize << size_log2;
        TranspositionTable { entries: vec![0u64; size], mask: size as u64 - 1 }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.fill(0);
    }

    /// Look up `hash`. Misses on an empty slot or a checksum disagreement
    /// (index aliasing); corruption is indistinguishable from a miss.
    /// Mate-distance scores are rebased to `ply`.
    pub fn probe(&self, hash: u64, ply: usize) -> Option<TtEntry> {
        let storage = self.entries[(hash & self.mask) as usize];
        let bound = match storage & 0x3 {
            1 => Bound::Upper,
            2 => Bound::Lower,
            3 => Bound::Exact,
            _ => return None,
        };
        if (storage >> 8) & 0xFF != checksum(hash) {
            return None;
        }

        let depth = ((storage >> 2) & 0x1F) as u8;
        let mut score = (storage >> 16) as u16 as i16 as Score;
        if score > MATE_THRESHOLD {
            score -= ply as Score;
        } else if score < -MATE_THRESHOLD {
            score += ply as Score;
        }
        let mv = Move::from_bits((storage >> 32) as u32);

        Some(TtEntry { mv, score, depth, bound })
    }

    /// Replace-if-stranger-or-shallower: a checksum disagreement counts the
    /// conflict and overwrites; an agreeing slot keeps the deeper entry.
    /// Returns true when an aliased entry was evicted.
    pub fn insert(
        &mut self,
        hash: u64,
        mv: Move,
        mut score: Score,
        depth: u8,
        bound: Bound,
        ply: usize,
    ) -> bool {
        let idx = (hash & self.mask) as usize;
        let stored = self.entries[idx];

        let mut conflict = false;
        if stored != 0 {
            if (stored >> 8) & 0xFF != checksum(hash) {
                conflict = true;
            } else if ((stored >> 2) & 0x1F) as u8 > depth {
                return false;
            }
        }

        // Mate scores are stored node-relative so any ply can reuse them.
        if score > MATE_THRESHOLD {
            score += ply as Score;
        } else if score < -MATE_THRESHOLD {
            score -= ply as Score;
        }

        let depth = depth.min(DEPTH_MAX);
        let storage = (bound as u64)
            | ((depth as u64) << 2)
            | (checksum(hash) << 8)
            | (((score as i16 as u16) as u64) << 16)
            | ((mv.bits() as u64) << 32);
        self.entries[idx] = storage;
        conflict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VERY_GOOD;

    const LOG2: u32 = 10; // small table keeps the tests fast

    fn some_move() -> Move {
        use crate::board::{Piece, Square};
        Move::pack(
            Square::new(12),
            Square::new(28),
            Piece::Pawn,
            None,
            None,
            false,
            false,
            false,
            None,
            false,
        )
    }

    #[test]
    fn probe_after_insert_returns_entry() {
        let mut tt = TranspositionTable::new(LOG2);
        let hash = 0xABCD_EF01_2345_6789;
        tt.insert(hash, some_move(), 42, 5, Bound::Exact, 0);

        let entry = tt.probe(hash, 0).expect("hit");
        assert_eq!(entry.score, 42);
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.bound, Bound::Exact);
        assert_eq!(entry.mv, some_move());
    }

    #[test]
    fn empty_slot_misses() {
        let tt = TranspositionTable::new(LOG2);
        assert!(tt.probe(0xDEAD_BEEF, 0).is_none());
    }

    #[test]
    fn checksum_mismatch_misses_and_conflict_overwrites() {
        let mut tt = TranspositionTable::new(LOG2);
        // Same index (low bits), different top byte.
        let a = 0x1100_0000_0000_0042;
        let b = 0x2200_0000_0000_0042;
        tt.insert(a, some_move(), 10, 3, Bound::Exact, 0);
        assert!(tt.probe(b, 0).is_none(), "aliased read must miss");

        let conflict = tt.insert(b, some_move(), 20, 1, Bound::Lower, 0);
        assert!(conflict, "disagreeing checksum evicts");
        assert!(tt.probe(a, 0).is_none());
        assert_eq!(tt.probe(b, 0).unwrap().score, 20);
    }

    #[test]
    fn deeper_entry_is_kept() {
        let mut tt = TranspositionTable::new(LOG2);
        let hash = 0x77;
        tt.insert(hash, some_move(), 50, 6, Bound::Exact, 0);
        tt.insert(hash, Move::NULL, 99, 3, Bound::Exact, 0);
        let entry = tt.probe(hash, 0).unwrap();
        assert_eq!(entry.depth, 6);
        assert_eq!(entry.score, 50);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut tt = TranspositionTable::new(LOG2);
        let hash = 0x1234_5678_9ABC_DEF0;
        tt.insert(hash, some_move(), 7, 4, Bound::Lower, 0);
        let first = tt.entries[(hash & tt.mask) as usize];
        tt.insert(hash, some_move(), 7, 4, Bound::Lower, 0);
        assert_eq!(tt.entries[(hash & tt.mask) as usize], first);
    }

    #[test]
    fn mate_scores_rebase_with_ply() {
        let mut tt = TranspositionTable::new(LOG2);
        let hash = 0xFACE;
        // Mate found 3 plies from the root, stored from a node at ply 3.
        tt.insert(hash, some_move(), VERY_GOOD - 3, 10, Bound::Exact, 3);
        // Probed from ply 5, the same mate is 5 plies away.
        assert_eq!(tt.probe(hash, 5).unwrap().score, VERY_GOOD - 5);
        assert_eq!(tt.probe(hash, 3).unwrap().score, VERY_GOOD - 3);
    }

    #[test]
    fn negative_scores_roundtrip() {
        let mut tt = TranspositionTable::new(LOG2);
        tt.insert(0x42, Move::NULL, -321, 2, Bound::Upper, 0);
        assert_eq!(tt.probe(0x42, 0).unwrap().score, -321);
    }

    #[test]
    fn clear_empties_table() {
        let mut tt = TranspositionTable::new(LOG2);
        tt.insert(0x99, some_move(), 5, 1, Bound::Exact, 0);
        tt.clear();
        assert!(tt.probe(0x99, 0).is_none());
    }
}
