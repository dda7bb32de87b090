use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::debug;

use crate::board::{Move, Position, find_legal};
use crate::eval::Evaluator;
use crate::sorter::{Heuristics, MoveSorter, SortWeights};
use crate::tt::{Bound, TranspositionTable};
use crate::types::{
    DEFAULT_DEPTH, DEFAULT_QUIESCENT_DEPTH, DEFAULT_TT_LOG2, MATE_THRESHOLD, MAX_PLY, SCORE_MAX,
    SCORE_MIN, Score, VERY_BAD,
};

const NTH_SORT_BUCKETS: usize = 40;
const DEADLINE_POLL_MASK: u64 = 4095;

/// Progress emitted to the driver's callback; the UCI layer renders these
/// as `info` lines.
pub enum SearchEvent<'a> {
    Depth {
        depth: u8,
        score: Score,
        nodes: u64,
        best: Move,
        pv: &'a [Move],
        elapsed: Duration,
    },
    CurrMove {
        mv: Move,
        number: usize,
    },
}

/// Per-call counters, reset by `alphabeta`.
pub struct SearchStats {
    pub transposition_checks: u64,
    pub transposition_partial_hits: u64,
    pub transposition_full_hits: u64,
    pub transposition_insufficient_depth: u64,
    pub transposition_conflicts: u64,
    /// Histogram of the sort index of cutoff moves: slot n counts cutoffs
    /// produced by the n-th move tried.
    pub nth_sort_freq: [u64; NTH_SORT_BUCKETS],
    /// Histogram of how many moves nodes ended up trying.
    pub move_counts: [u64; NTH_SORT_BUCKETS],
}

impl Default for SearchStats {
    fn default() -> Self {
        SearchStats {
            transposition_checks: 0,
            transposition_partial_hits: 0,
            transposition_full_hits: 0,
            transposition_insufficient_depth: 0,
            transposition_conflicts: 0,
            nth_sort_freq: [0; NTH_SORT_BUCKETS],
            move_counts: [0; NTH_SORT_BUCKETS],
        }
    }
}

/// One search instance: configuration, evaluator, transposition table,
/// ordering heuristics, and a pool of move sorters indexed by recursion
/// depth. Single-threaded; a UCI wrapper may flip `stop` from outside.
pub struct Search {
    // Result of the last `alphabeta` call.
    pub score: Score,
    pub nodecount: u64,
    pub qnodecount: u64,

    // Policy. Plain fields, set before calling `alphabeta`.
    pub use_pruning: bool,
    pub use_transposition_table: bool,
    pub use_mtdf: bool,
    pub use_iterative_deepening: bool,
    pub use_quiescence: bool,
    pub quiescent_depth: u8,
    pub max_depth: u8,
    pub mtdf_window: Score,
    pub millis_available: u64,
    pub soft_deadline: bool,
    pub debug: bool,
    pub sort_weights: SortWeights,

    pub stats: SearchStats,

    eval: Evaluator,
    tt: TranspositionTable,
    heur: Heuristics,
    sorters: Vec<MoveSorter>,
    stop: Arc<AtomicBool>,
    deadline: Option<Instant>,
    stopped: bool,
}

impl Search {
    pub fn new(eval: Evaluator) -> Search {
        Search::with_table_size(eval, DEFAULT_TT_LOG2)
    }

    pub fn with_table_size(eval: Evaluator, tt_log2: u32) -> Search {
        Search {
            score: 0,
            nodecount: 0,
            qnodecount: 0,
            use_pruning: true,
            use_transposition_table: true,
            use_mtdf: true,
            use_iterative_deepening: true,
            use_quiescence: true,
            quiescent_depth: DEFAULT_QUIESCENT_DEPTH,
            max_depth: DEFAULT_DEPTH,
            mtdf_window: 10,
            millis_available: 0,
            soft_deadline: true,
            debug: false,
            sort_weights: SortWeights::default(),
            stats: SearchStats::default(),
            eval,
            tt: TranspositionTable::new(tt_log2),
            heur: Heuristics::new(),
            sorters: (0..=MAX_PLY).map(|_| MoveSorter::new()).collect(),
            stop: Arc::new(AtomicBool::new(false)),
            deadline: None,
            stopped: false,
        }
    }

    /// Shared stop flag for an external command reader.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Forget everything learned: transposition table and ordering
    /// heuristics. Used by `ucinewgame`.
    pub fn reset(&mut self) {
        self.tt.clear();
        self.heur.clear();
        self.score = 0;
        self.nodecount = 0;
        self.qnodecount = 0;
    }

    pub fn reset_counters(&mut self) {
        self.nodecount = 0;
        self.qnodecount = 0;
        self.stats = SearchStats::default();
    }

    pub fn evaluator(&mut self) -> &mut Evaluator {
        &mut self.eval
    }

    // --- drivers ---

    /// Full search under the configured policies: iterative deepening with
    /// MTD(f) when enabled, a wall-clock deadline when `millis_available`
    /// is nonzero. Returns the best move at the last completed depth and
    /// leaves its score in `self.score`. `on_event` receives progress.
    pub fn alphabeta(
        &mut self,
        pos: &mut Position,
        on_event: &mut dyn FnMut(SearchEvent),
    ) -> Move {
        self.reset_counters();
        // The caller owns the stop flag; an already-raised flag means
        // "return the static fallback immediately".
        self.stopped = self.stop.load(Ordering::Relaxed);
        self.deadline = (self.millis_available > 0)
            .then(|| Instant::now() + Duration::from_millis(self.millis_available));
        let start = Instant::now();

        let best = if self.use_mtdf && self.use_iterative_deepening {
            self.deepening(pos, start, on_event)
        } else if self.use_mtdf {
            let guess = self.eval.evaluate(pos);
            let (mv, score) = self.mtdf(pos, guess, Move::NULL, on_event);
            self.score = score;
            mv
        } else {
            let mut line = Vec::with_capacity(MAX_PLY);
            let (mv, _, score) =
                self.negamax(pos, 0, SCORE_MIN, SCORE_MAX, &mut line, Move::NULL, on_event);
            self.score = score;
            mv
        };

        if self.debug {
            debug!(
                "search done: score={} nodes={} qnodes={} tt checks={} full={} partial={} shallow={} conflicts={}",
                self.score,
                self.nodecount,
                self.qnodecount,
                self.stats.transposition_checks,
                self.stats.transposition_full_hits,
                self.stats.transposition_partial_hits,
                self.stats.transposition_insufficient_depth,
                self.stats.transposition_conflicts,
            );
        }

        if !best.is_null() {
            return best;
        }
        // Interrupted before any depth completed: fall back to the shallow
        // static ordering so a legal move is still produced.
        self.first_sorted_move(pos)
    }

    /// Reference mode: plain negamax with pruning, MTD(f), and the
    /// transposition table all disabled. Restores the flags afterwards.
    pub fn minimax(&mut self, pos: &mut Position) -> Move {
        let saved = (self.use_pruning, self.use_mtdf, self.use_transposition_table, self.use_iterative_deepening);
        self.use_pruning = false;
        self.use_mtdf = false;
        self.use_transposition_table = false;
        self.use_iterative_deepening = false;
        let mv = self.alphabeta(pos, &mut |_| {});
        (self.use_pruning, self.use_mtdf, self.use_transposition_table, self.use_iterative_deepening) = saved;
        mv
    }

    fn deepening(
        &mut self,
        pos: &mut Position,
        start: Instant,
        on_event: &mut dyn FnMut(SearchEvent),
    ) -> Move {
        let target_depth = self.max_depth.max(2);
        let mut best = Move::NULL;
        let mut guess = self.eval.evaluate(pos);

        let mut depth = 2u8.min(target_depth);
        loop {
            self.max_depth = depth;
            let (mv, score) = self.mtdf(pos, guess, best, on_event);

            if !self.stopped && mv.is_null() {
                // Terminal root: mated, stalemated, or drawn. Nothing
                // deeper to find.
                self.score = score;
                break;
            }
            if !self.stopped {
                best = mv;
                self.score = score;
                guess = score;

                let pv = self.extract_pv(pos, depth as usize);
                on_event(SearchEvent::Depth {
                    depth,
                    score,
                    nodes: self.nodecount,
                    best,
                    pv: &pv,
                    elapsed: start.elapsed(),
                });
                if self.debug {
                    debug!("depth {depth} best={best} score={score} nodes={}", self.nodecount);
                }
            }

            if self.stopped
                || depth >= target_depth
                || self.deadline_passed()
                || score.abs() > MATE_THRESHOLD
            {
                break;
            }

            self.heur.decay();
            depth += 1;
        }

        self.max_depth = target_depth;
        best
    }

    /// Zero-width-window driver: repeatedly probe with a window of
    /// `mtdf_window` around the guess, shrinking the proven bounds until
    /// they cross.
    fn mtdf(
        &mut self,
        pos: &mut Position,
        guess: Score,
        hint: Move,
        on_event: &mut dyn FnMut(SearchEvent),
    ) -> (Move, Score) {
        let mut score = guess;
        let mut lower = SCORE_MIN;
        let mut upper = SCORE_MAX;
        let mut best = hint;
        let window = self.mtdf_window.max(1);

        loop {
            if !self.soft_deadline && self.deadline_passed() {
                self.stopped = true;
                break;
            }

            let alpha = (score - window).max(lower);
            let beta = (alpha + window).min(upper);
            let mut line = Vec::with_capacity(MAX_PLY);
            let (mv, _, s) = self.negamax(pos, 0, alpha, beta, &mut line, best, on_event);
            if self.stopped {
                break;
            }
            if !mv.is_null() {
                best = mv;
            }
            score = s;
            if s < beta {
                upper = s;
            } else {
                lower = s;
            }
            if self.debug {
                debug!("mtdf window=[{alpha},{beta}] score={s} bounds=[{lower},{upper}] best={best}");
            }
            if lower >= upper {
                break;
            }
        }
        (best, score)
    }

    // --- recursive core ---

    /// Negamax with alpha-beta bounds. Returns the best move, the expected
    /// reply, and the score from the side-to-play's perspective.
    fn negamax(
        &mut self,
        pos: &mut Position,
        ply: usize,
        mut alpha: Score,
        mut beta: Score,
        line: &mut Vec<Move>,
        hint: Move,
        on_event: &mut dyn FnMut(SearchEvent),
    ) -> (Move, Move, Score) {
        self.nodecount += 1;
        if self.nodecount & DEADLINE_POLL_MASK == 0 {
            self.poll_stop();
        }
        if self.stopped {
            return (Move::NULL, Move::NULL, 0);
        }

        if let Some(score) = self.eval.endgame(pos) {
            return (Move::NULL, Move::NULL, score);
        }
        if pos.times_seen() >= 3 {
            return (Move::NULL, Move::NULL, 0);
        }

        let depth_to_go = (self.max_depth as usize).saturating_sub(ply) as u8;
        let original_alpha = alpha;
        let original_beta = beta;

        let mut tt_move = Move::NULL;
        if self.use_transposition_table {
            self.stats.transposition_checks += 1;
            if let Some(entry) = self.tt.probe(pos.hash(), ply) {
                tt_move = entry.mv;
                if entry.depth >= depth_to_go {
                    match entry.bound {
                        Bound::Exact => {
                            self.stats.transposition_full_hits += 1;
                            return (entry.mv, Move::NULL, entry.score);
                        }
                        Bound::Lower => {
                            if entry.score >= beta {
                                self.stats.transposition_full_hits += 1;
                                return (entry.mv, Move::NULL, entry.score);
                            }
                            self.stats.transposition_partial_hits += 1;
                            alpha = alpha.max(entry.score);
                        }
                        Bound::Upper => {
                            if entry.score <= alpha {
                                self.stats.transposition_full_hits += 1;
                                return (entry.mv, Move::NULL, entry.score);
                            }
                            self.stats.transposition_partial_hits += 1;
                            beta = beta.min(entry.score);
                        }
                    }
                } else {
                    self.stats.transposition_insufficient_depth += 1;
                }
            }
        }

        if ply >= self.max_depth as usize || ply >= MAX_PLY {
            if self.use_quiescence && self.quiescent_depth > 0 && ply < MAX_PLY {
                return self.quiescence(pos, ply, alpha, beta, line);
            }
            return (Move::NULL, Move::NULL, self.eval.evaluate(pos));
        }

        let mut sorter = std::mem::take(&mut self.sorters[ply]);
        sorter.reset(pos, &self.heur, self.sort_weights, line, ply, hint, tt_move, false);

        if !sorter.has_more_moves() {
            self.sorters[ply] = sorter;
            let score = if pos.in_check() {
                // Shallower mates score worse for the mated side.
                VERY_BAD + ply as Score
            } else {
                0
            };
            return (Move::NULL, Move::NULL, score);
        }

        let mut best_score = SCORE_MIN;
        let mut best_move = Move::NULL;
        let mut best_reply = Move::NULL;
        let mut tried = 0usize;
        let side = pos.side_to_move();

        while sorter.has_more_moves() {
            let mv = sorter.next_move();
            tried += 1;
            if ply == 0 {
                on_event(SearchEvent::CurrMove { mv, number: tried });
            }

            pos.apply(mv);
            line.push(mv);
            let (reply, _, child) =
                self.negamax(pos, ply + 1, -beta, -alpha, line, Move::NULL, on_event);
            line.pop();
            pos.undo(mv);
            let score = -child;

            if self.stopped {
                self.sorters[ply] = sorter;
                return (best_move, best_reply, best_score);
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                best_reply = reply;

                if self.use_pruning {
                    alpha = alpha.max(best_score);
                    if alpha >= beta {
                        self.heur.record_cutoff(side, depth_to_go, ply, mv, line);
                        self.stats.nth_sort_freq[(tried - 1).min(NTH_SORT_BUCKETS - 1)] += 1;
                        break;
                    }
                }
            }
        }
        self.stats.move_counts[tried.min(NTH_SORT_BUCKETS - 1)] += 1;
        self.sorters[ply] = sorter;

        if self.use_transposition_table {
            let bound = if best_score <= original_alpha {
                Bound::Upper
            } else if best_score >= original_beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            if self.tt.insert(pos.hash(), best_move, best_score, depth_to_go, bound, ply) {
                self.stats.transposition_conflicts += 1;
            }
        }

        (best_move, best_reply, best_score)
    }

    /// Horizon extension over noisy moves only. Stand-pat bounds the score
    /// when not in check; in check every evasion is searched. Never writes
    /// the transposition table.
    fn quiescence(
        &mut self,
        pos: &mut Position,
        ply: usize,
        mut alpha: Score,
        beta: Score,
        line: &mut Vec<Move>,
    ) -> (Move, Move, Score) {
        self.qnodecount += 1;

        let limit = self.max_depth as usize + self.quiescent_depth as usize;
        if ply >= limit || ply >= MAX_PLY {
            return (Move::NULL, Move::NULL, self.eval.evaluate(pos));
        }

        let in_check = pos.in_check();
        let mut current_score = None;
        let mut best_score = SCORE_MIN;

        if !in_check {
            let stand_pat = self.eval.evaluate(pos);
            if self.use_pruning && stand_pat >= beta {
                return (Move::NULL, Move::NULL, beta);
            }
            if self.use_pruning && stand_pat > alpha {
                alpha = stand_pat;
            }
            current_score = Some(stand_pat);
            best_score = stand_pat;
        }

        let mut sorter = std::mem::take(&mut self.sorters[ply]);
        sorter.reset(
            pos,
            &self.heur,
            self.sort_weights,
            line,
            ply,
            Move::NULL,
            Move::NULL,
            !in_check,
        );

        if in_check && !sorter.has_more_moves() {
            self.sorters[ply] = sorter;
            return (Move::NULL, Move::NULL, VERY_BAD + ply as Score);
        }

        let mut best_move = Move::NULL;
        let side = pos.side_to_move();

        while sorter.has_more_moves() {
            let mv = sorter.next_move();

            let score = if ply + 1 >= limit {
                // Capture leaves go through the incremental evaluator
                // instead of an apply/evaluate/undo round trip.
                let prev = match current_score {
                    Some(s) => s,
                    None => {
                        let s = self.eval.evaluate(pos);
                        current_score = Some(s);
                        s
                    }
                };
                -self.eval.delta_evaluate(pos, mv, prev)
            } else {
                pos.apply(mv);
                line.push(mv);
                let (_, _, child) = self.quiescence(pos, ply + 1, -beta, -alpha, line);
                line.pop();
                pos.undo(mv);
                -child
            };

            if self.stopped {
                break;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                if self.use_pruning {
                    alpha = alpha.max(score);
                    if alpha >= beta {
                        self.heur.record_cutoff(side, 1, ply, mv, line);
                        break;
                    }
                }
            }
        }

        self.sorters[ply] = sorter;
        (best_move, Move::NULL, best_score)
    }

    // --- support ---

    fn poll_stop(&mut self) {
        if self.stop.load(Ordering::Relaxed) {
            self.stopped = true;
            return;
        }
        if !self.soft_deadline && self.deadline_passed() {
            self.stopped = true;
        }
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Principal variation recovered by walking the transposition chain,
    /// stopping on a miss, an illegal move, or a cycle.
    fn extract_pv(&self, pos: &mut Position, max_moves: usize) -> Vec<Move> {
        let mut pv = Vec::new();
        let mut seen = Vec::new();

        for _ in 0..max_moves {
            let hash = pos.hash();
            if seen.contains(&hash) {
                break;
            }
            seen.push(hash);

            let Some(entry) = self.tt.probe(hash, 0) else { break };
            if entry.mv.is_null() {
                break;
            }
            let Some(mv) = find_legal(pos, entry.mv.src(), entry.mv.dst(), entry.mv.promotion())
            else {
                break;
            };
            pv.push(mv);
            pos.apply(mv);
        }

        for &mv in pv.iter().rev() {
            pos.undo(mv);
        }
        pv
    }

    /// Shallow fallback when no full depth completed before the deadline:
    /// the statically best-ordered legal move.
    fn first_sorted_move(&mut self, pos: &mut Position) -> Move {
        let mut sorter = std::mem::take(&mut self.sorters[0]);
        sorter.reset(
            pos,
            &self.heur,
            self.sort_weights,
            &[],
            0,
            Move::NULL,
            Move::NULL,
            false,
        );
        let mv = if sorter.has_more_moves() { sorter.next_move() } else { Move::NULL };
        self.sorters[0] = sorter;
        mv
    }
}
