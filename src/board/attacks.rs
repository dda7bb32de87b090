use std::sync::LazyLock;

use super::bitboard::BitBoard;
use super::magic::{EMPTY_MAGIC, Magic, SplitMix, find_factor, occupancy_subset};
use super::piece::Color;
use super::square::Square;

/// All precomputed attack tables. Built once at startup; lookups after that
/// are table reads.
struct Tables {
    knight: [BitBoard; 64],
    king: [BitBoard; 64],
    pawn: [[BitBoard; 64]; 2],
    bishop_magics: [Magic; 64],
    rook_magics: [Magic; 64],
    bishop_table: Vec<BitBoard>,
    rook_table: Vec<BitBoard>,
}

static TABLES: LazyLock<Tables> = LazyLock::new(build_tables);

/// Force table construction. Idempotent; lookups also initialize lazily.
pub fn init() {
    LazyLock::force(&TABLES);
}

#[inline]
pub fn knight_attacks(sq: Square) -> BitBoard {
    TABLES.knight[sq.index()]
}

#[inline]
pub fn king_attacks(sq: Square) -> BitBoard {
    TABLES.king[sq.index()]
}

/// Squares a pawn of `color` on `sq` attacks.
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> BitBoard {
    TABLES.pawn[color.index()][sq.index()]
}

#[inline]
pub fn bishop_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    let t = &*TABLES;
    t.bishop_table[magic_index(&t.bishop_magics[sq.index()], occupied)]
}

#[inline]
pub fn rook_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    let t = &*TABLES;
    t.rook_table[magic_index(&t.rook_magics[sq.index()], occupied)]
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

#[inline]
fn magic_index(m: &Magic, occupied: BitBoard) -> usize {
    let blockers = occupied & m.mask;
    m.offset as usize + (blockers.0.wrapping_mul(m.factor) >> m.shift) as usize
}

fn build_tables() -> Tables {
    let mut t = Tables {
        knight: [BitBoard(0); 64],
        king: [BitBoard(0); 64],
        pawn: [[BitBoard(0); 64]; 2],
        bishop_magics: [EMPTY_MAGIC; 64],
        rook_magics: [EMPTY_MAGIC; 64],
        bishop_table: Vec::new(),
        rook_table: Vec::new(),
    };

    build_leapers(&mut t);
    build_sliders(&mut t);
    t
}

fn build_leapers(t: &mut Tables) {
    const KNIGHT_OFFSETS: [(i8, i8); 8] =
        [(-2, -1), (-2, 1), (-1, -2), (-1, 2), (1, -2), (1, 2), (2, -1), (2, 1)];
    const KING_OFFSETS: [(i8, i8); 8] =
        [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];

    for sq in 0..64usize {
        let r = (sq / 8) as i8;
        let f = (sq % 8) as i8;

        t.knight[sq] = offsets_to_bb(r, f, &KNIGHT_OFFSETS);
        t.king[sq] = offsets_to_bb(r, f, &KING_OFFSETS);

        let mut white = 0u64;
        let mut black = 0u64;
        if r + 1 < 8 {
            if f > 0 {
                white |= 1u64 << ((r + 1) * 8 + f - 1);
            }
            if f + 1 < 8 {
                white |= 1u64 << ((r + 1) * 8 + f + 1);
            }
        }
        if r > 0 {
            if f > 0 {
                black |= 1u64 << ((r - 1) * 8 + f - 1);
            }
            if f + 1 < 8 {
                black |= 1u64 << ((r - 1) * 8 + f + 1);
            }
        }
        t.pawn[0][sq] = BitBoard(white);
        t.pawn[1][sq] = BitBoard(black);
    }
}

fn offsets_to_bb(r: i8, f: i8, offsets: &[(i8, i8)]) -> BitBoard {
    let mut bb = 0u64;
    for &(dr, df) in offsets {
        let (nr, nf) = (r + dr, f + df);
        if (0..8).contains(&nr) && (0..8).contains(&nf) {
            bb |= 1u64 << (nr * 8 + nf);
        }
    }
    BitBoard(bb)
}

fn build_sliders(t: &mut Tables) {
    let mut rng = SplitMix(0xB1A5_ED0C_0C0F_FEE1);
    build_slider_set(&BISHOP_DIRS, true, &mut t.bishop_magics, &mut t.bishop_table, &mut rng);
    build_slider_set(&ROOK_DIRS, false, &mut t.rook_magics, &mut t.rook_table, &mut rng);
}

/// Find a factor and populate the shared attack table for all 64 squares of
/// one slider kind. The relevant-bit count falls out of the mask itself,
/// and the table grows square by square.
fn build_slider_set(
    dirs: &[(i8, i8); 4],
    diagonal: bool,
    magics: &mut [Magic; 64],
    table: &mut Vec<BitBoard>,
    rng: &mut SplitMix,
) {
    let mut offset = 0u32;
    for sq in 0..64 {
        let mask = slider_mask(sq, dirs, diagonal);
        let bits = mask.count_ones() as u8;
        let count = 1usize << bits;

        let subsets: Vec<u64> = (0..count).map(|i| occupancy_subset(mask, i)).collect();
        let attacks: Vec<u64> = subsets.iter().map(|&occ| ray_attacks(sq, occ, dirs)).collect();
        let factor = find_factor(bits, &subsets, &attacks, rng);
        let shift = 64 - bits;

        magics[sq] = Magic { mask: BitBoard(mask), factor, shift, offset };
        table.resize(offset as usize + count, BitBoard(0));
        for (&occ, &att) in subsets.iter().zip(attacks.iter()) {
            let idx = offset as usize + (occ.wrapping_mul(factor) >> shift) as usize;
            table[idx] = BitBoard(att);
        }
        offset += count as u32;
    }
}

const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Relevant-occupancy mask: ray squares excluding the board edge, since a
/// blocker on the edge cannot shorten the ray further.
fn slider_mask(sq: usize, dirs: &[(i8, i8); 4], diagonal: bool) -> u64 {
    let mut mask = 0u64;
    let r = (sq / 8) as i8;
    let f = (sq % 8) as i8;
    for &(dr, df) in dirs {
        let mut nr = r + dr;
        let mut nf = f + df;
        loop {
            let on_edge = if diagonal {
                !(1..7).contains(&nr) || !(1..7).contains(&nf)
            } else {
                (dr != 0 && !(1..7).contains(&nr)) || (df != 0 && !(1..7).contains(&nf))
            };
            if !(0..8).contains(&nr) || !(0..8).contains(&nf) || on_edge {
                break;
            }
            mask |= 1u64 << (nr * 8 + nf);
            nr += dr;
            nf += df;
        }
    }
    mask
}

/// Reference ray trace used only during table construction.
fn ray_attacks(sq: usize, occupied: u64, dirs: &[(i8, i8); 4]) -> u64 {
    let mut attacks = 0u64;
    let r = (sq / 8) as i8;
    let f = (sq % 8) as i8;
    for &(dr, df) in dirs {
        let mut nr = r + dr;
        let mut nf = f + df;
        while (0..8).contains(&nr) && (0..8).contains(&nf) {
            let bit = 1u64 << (nr * 8 + nf);
            attacks |= bit;
            if occupied & bit != 0 {
                break;
            }
            nr += dr;
            nf += df;
        }
    }
    attacks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(rank: u8, file: u8) -> Square {
        Square::from_coords(rank, file)
    }

    #[test]
    fn knight_counts() {
        init();
        assert_eq!(knight_attacks(sq(0, 0)).count(), 2);
        assert_eq!(knight_attacks(sq(3, 3)).count(), 8);
    }

    #[test]
    fn king_counts() {
        init();
        assert_eq!(king_attacks(sq(0, 0)).count(), 3);
        assert_eq!(king_attacks(sq(3, 3)).count(), 8);
    }

    #[test]
    fn pawn_attack_edges() {
        init();
        assert_eq!(pawn_attacks(Color::White, sq(1, 4)).count(), 2);
        assert_eq!(pawn_attacks(Color::White, sq(1, 0)).count(), 1);
        assert_eq!(pawn_attacks(Color::Black, sq(6, 7)).count(), 1);
    }

    #[test]
    fn rook_empty_board() {
        init();
        for r in 0..8 {
            for f in 0..8 {
                assert_eq!(rook_attacks(sq(r, f), BitBoard(0)).count(), 14);
            }
        }
    }

    #[test]
    fn bishop_empty_board_center() {
        init();
        assert_eq!(bishop_attacks(sq(3, 3), BitBoard(0)).count(), 13);
    }

    #[test]
    fn rook_with_blockers() {
        init();
        // Rook on a1; blockers on a4 and d1 terminate both rays.
        let blockers = BitBoard::from_square(sq(3, 0)) | BitBoard::from_square(sq(0, 3));
        assert_eq!(rook_attacks(sq(0, 0), blockers).count(), 6);
    }

    #[test]
    fn bishop_with_blockers() {
        init();
        let blockers = BitBoard::from_square(sq(5, 5));
        assert_eq!(bishop_attacks(sq(3, 3), blockers).count(), 11);
    }

    #[test]
    fn queen_is_union() {
        init();
        let occ = BitBoard(0x0000_0010_0800_0000);
        let s = sq(4, 4);
        assert_eq!(queen_attacks(s, occ), bishop_attacks(s, occ) | rook_attacks(s, occ));
    }

    #[test]
    fn magic_lookup_matches_ray_trace() {
        init();
        // Spot-check the perfect hash against the reference generator on a
        // handful of occupancies.
        let occs = [0u64, 0x55AA_55AA_55AA_55AA, 0x0F0F_0F0F_F0F0_F0F0, u64::MAX];
        for sq_idx in [0usize, 27, 36, 63] {
            for &occ in &occs {
                assert_eq!(
                    rook_attacks(Square::new(sq_idx as u8), BitBoard(occ)).0,
                    ray_attacks(sq_idx, occ, &ROOK_DIRS)
                );
                assert_eq!(
                    bishop_attacks(Square::new(sq_idx as u8), BitBoard(occ)).0,
                    ray_attacks(sq_idx, occ, &BISHOP_DIRS)
                );
            }
        }
    }
}
