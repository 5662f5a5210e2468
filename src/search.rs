//! Minimax search with alpha-beta pruning
//!
//! One searcher serves every game through [`GameRules`]. Scores are always
//! taken from the perspective of the side that asked for a move, so the
//! recursion alternates between maximising and minimising nodes according to
//! whose turn the child position says it is. That matters for Nine Men's
//! Morris, where forming a mill hands the same side a second (removal) turn.
//!
//! ## Root move selection
//! Every root child is searched with a lower bound of `best - 1`. Any child
//! that reaches the current best therefore comes back with its exact score,
//! which lets the root collect *all* equally best moves and pick one of them
//! with the caller's random source.

use crate::{GameRules, Outcome, Side};
use log::debug;
use parking_lot::Mutex;
use rand::Rng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Base score of a decided game. Heuristic evaluations stay well below it.
pub const WIN_SCORE: i32 = 100_000;

const INF: i32 = i32::MAX / 2;

/// Nodes between two clock reads.
const TIME_CHECK_INTERVAL: u64 = 1024;

/// Search limits that control how far and how long the engine searches.
///
/// With only a depth the search is a single fixed-depth pass. Adding a time
/// or node limit switches to iterative deepening, and the deepest completed
/// iteration wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum search depth in plies
    pub depth: u32,
    /// Maximum time allowed for this move (None = no limit)
    pub move_time: Option<Duration>,
    /// Maximum number of visited nodes (None = no limit)
    pub node_budget: Option<u64>,
}

impl SearchLimits {
    /// Limits with only a depth constraint.
    pub fn depth(depth: u32) -> Self {
        Self {
            depth,
            move_time: None,
            node_budget: None,
        }
    }

    /// Limits with both depth and time constraints.
    pub fn depth_and_time(depth: u32, move_time: Duration) -> Self {
        Self {
            depth,
            move_time: Some(move_time),
            node_budget: None,
        }
    }

    pub fn with_node_budget(mut self, nodes: u64) -> Self {
        self.node_budget = Some(nodes);
        self
    }

    /// True if anything besides depth can end the search.
    pub fn is_bounded(&self) -> bool {
        self.move_time.is_some() || self.node_budget.is_some()
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::depth(4)
    }
}

/// Shared cancellation flag.
///
/// Cheap to clone; every clone observes the same flag. The search checks it
/// on every node it enters.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask any running search to return as soon as possible.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of [`AlphaBeta::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome<M> {
    /// Chosen move; `None` when the side has no legal move
    pub best_move: Option<M>,
    /// Score of the chosen move from the searching side's perspective
    pub score: i32,
    /// Nodes entered, root children included
    pub nodes: u64,
    /// Deepest iteration that ran to completion (0 if none did)
    pub completed_depth: u32,
    /// True if a limit or the stop flag cut the search short
    pub stopped: bool,
    /// How many root moves shared the best score
    pub tied: usize,
}

impl<M> SearchOutcome<M> {
    fn no_moves() -> Self {
        Self {
            best_move: None,
            score: 0,
            nodes: 0,
            completed_depth: 0,
            stopped: false,
            tied: 0,
        }
    }
}

/// Marker returned up the recursion when a limit is hit.
#[derive(Debug)]
struct Stopped;

/// Node accounting and limit checks for one search call.
struct Budget<'a> {
    stop: &'a StopFlag,
    deadline: Option<Instant>,
    node_budget: Option<u64>,
    nodes: AtomicU64,
    expired: AtomicBool,
}

impl<'a> Budget<'a> {
    fn new(stop: &'a StopFlag, limits: &SearchLimits) -> Self {
        Self {
            stop,
            deadline: limits.move_time.map(|t| Instant::now() + t),
            node_budget: limits.node_budget,
            nodes: AtomicU64::new(0),
            expired: AtomicBool::new(false),
        }
    }

    /// Counts a node and fails once any limit is exceeded.
    #[inline]
    fn enter(&self) -> Result<(), Stopped> {
        let n = self.nodes.fetch_add(1, Ordering::Relaxed) + 1;
        if self.stop.is_stopped() || self.expired.load(Ordering::Relaxed) {
            return Err(Stopped);
        }
        if self.node_budget.is_some_and(|max| n > max) {
            self.expired.store(true, Ordering::Relaxed);
            return Err(Stopped);
        }
        if let Some(deadline) = self.deadline {
            if n % TIME_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                self.expired.store(true, Ordering::Relaxed);
                return Err(Stopped);
            }
        }
        Ok(())
    }

    fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }
}

/// Best score seen at the root and the indices of every move reaching it.
#[derive(Debug, Clone)]
struct RootBest {
    score: i32,
    ties: Vec<usize>,
}

impl RootBest {
    fn new() -> Self {
        Self {
            score: -INF,
            ties: Vec::new(),
        }
    }

    /// Alpha for the next root child: one below the best so far, so a child
    /// that equals the best still gets an exact score.
    fn lower_bound(&self) -> i32 {
        if self.ties.is_empty() {
            -INF
        } else {
            self.score - 1
        }
    }

    fn record(&mut self, index: usize, score: i32) {
        if self.ties.is_empty() || score > self.score {
            self.score = score;
            self.ties = vec![index];
        } else if score == self.score {
            self.ties.push(index);
        }
    }
}

/// Score for a finished game seen with `depth` plies still to search.
///
/// Remaining depth is added so that faster wins (and slower losses) are
/// preferred.
pub fn terminal_score(outcome: Outcome, perspective: Side, depth: u32) -> i32 {
    match outcome {
        Outcome::Draw => 0,
        Outcome::Win(side) if side == perspective => WIN_SCORE + depth as i32,
        Outcome::Win(_) => -(WIN_SCORE + depth as i32),
    }
}

/// Recursive minimax with alpha-beta pruning (fail-soft).
fn alpha_beta<G: GameRules>(
    state: &G,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    perspective: Side,
    budget: &Budget<'_>,
) -> Result<i32, Stopped> {
    budget.enter()?;

    if let Some(outcome) = state.outcome() {
        return Ok(terminal_score(outcome, perspective, depth));
    }
    if depth == 0 {
        return Ok(state.evaluate(perspective));
    }

    let side = state.side_to_move();
    let moves = state.legal_moves(side).into_legal();
    if moves.is_empty() {
        // Not terminal, so the rules let this side pass (Reversi).
        return match state.pass() {
            Some(passed) => alpha_beta(&passed, depth - 1, alpha, beta, perspective, budget),
            None => Ok(terminal_score(Outcome::Win(side.opponent()), perspective, depth)),
        };
    }

    if side == perspective {
        let mut value = -INF;
        for mv in &moves {
            let child = state.apply(mv, side);
            value = value.max(alpha_beta(&child, depth - 1, alpha, beta, perspective, budget)?);
            alpha = alpha.max(value);
            if beta <= alpha {
                break;
            }
        }
        Ok(value)
    } else {
        let mut value = INF;
        for mv in &moves {
            let child = state.apply(mv, side);
            value = value.min(alpha_beta(&child, depth - 1, alpha, beta, perspective, budget)?);
            beta = beta.min(value);
            if beta <= alpha {
                break;
            }
        }
        Ok(value)
    }
}

/// Plain minimax without pruning.
///
/// Explores the full tree, so it is only practical at small depths. Used as
/// the reference the pruned search must agree with.
pub fn minimax<G: GameRules>(state: &G, depth: u32, perspective: Side) -> i32 {
    if let Some(outcome) = state.outcome() {
        return terminal_score(outcome, perspective, depth);
    }
    if depth == 0 {
        return state.evaluate(perspective);
    }

    let side = state.side_to_move();
    let moves = state.legal_moves(side).into_legal();
    if moves.is_empty() {
        return match state.pass() {
            Some(passed) => minimax(&passed, depth - 1, perspective),
            None => terminal_score(Outcome::Win(side.opponent()), perspective, depth),
        };
    }

    let scores = moves
        .iter()
        .map(|mv| minimax(&state.apply(mv, side), depth - 1, perspective));
    if side == perspective {
        scores.max().unwrap_or(-INF)
    } else {
        scores.min().unwrap_or(INF)
    }
}

/// Exact minimax score of every legal root move for `side`.
pub fn root_scores<G: GameRules>(state: &G, side: Side, depth: u32) -> Vec<(G::Move, i32)> {
    let depth = depth.max(1);
    state
        .legal_moves(side)
        .into_legal()
        .into_iter()
        .map(|mv| {
            let score = minimax(&state.apply(&mv, side), depth - 1, side);
            (mv, score)
        })
        .collect()
}

/// The alpha-beta engine.
///
/// Holds the limits, a cancellation flag, and optionally a rayon pool for
/// splitting the root moves across threads.
pub struct AlphaBeta {
    limits: SearchLimits,
    stop: StopFlag,
    pool: Option<ThreadPool>,
}

impl AlphaBeta {
    /// Creates a single-threaded engine.
    pub fn new(limits: SearchLimits) -> Self {
        Self {
            limits,
            stop: StopFlag::new(),
            pool: None,
        }
    }

    /// Creates an engine that searches root moves on `num_threads` threads.
    /// With 0 or 1 threads the search stays on the calling thread.
    pub fn with_threads(limits: SearchLimits, num_threads: usize) -> crate::Result<Self> {
        let pool = if num_threads > 1 {
            Some(ThreadPoolBuilder::new().num_threads(num_threads).build()?)
        } else {
            None
        };
        Ok(Self {
            limits,
            stop: StopFlag::new(),
            pool,
        })
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    pub fn set_limits(&mut self, limits: SearchLimits) {
        self.limits = limits;
    }

    /// Number of threads the root split uses.
    pub fn num_threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |p| p.current_num_threads())
    }

    /// A handle that can cancel searches run by this engine.
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    /// Makes the engine observe an externally owned flag.
    pub fn set_stop_flag(&mut self, stop: StopFlag) {
        self.stop = stop;
    }

    /// Searches `state` for `side` and returns the best move with statistics.
    ///
    /// `rng` is only used to break ties between equally scored root moves, so
    /// a seeded generator makes the whole search reproducible.
    /// A finished game yields no move even if empty cells remain.
    pub fn search<G: GameRules, R: Rng>(
        &self,
        state: &G,
        side: Side,
        rng: &mut R,
    ) -> SearchOutcome<G::Move> {
        debug_assert_eq!(state.side_to_move(), side, "searching for the side not on move");

        if state.is_terminal() {
            return SearchOutcome::no_moves();
        }
        let moves = state.legal_moves(side).into_legal();
        if moves.is_empty() {
            return SearchOutcome::no_moves();
        }

        let started = Instant::now();
        let budget = Budget::new(&self.stop, &self.limits);
        let max_depth = self.limits.depth.max(1);
        let first_depth = if self.limits.is_bounded() { 1 } else { max_depth };

        let mut chosen: Option<RootBest> = None;
        let mut completed_depth = 0;
        let mut stopped = false;

        for depth in first_depth..=max_depth {
            let (best, was_stopped) = match &self.pool {
                Some(pool) => search_root_parallel(pool, state, side, &moves, depth, &budget),
                None => search_root(state, side, &moves, depth, &budget),
            };
            if was_stopped {
                stopped = true;
                if chosen.is_none() && !best.ties.is_empty() {
                    chosen = Some(best);
                }
                break;
            }
            completed_depth = depth;
            let decided = best.score.abs() >= WIN_SCORE;
            chosen = Some(best);
            if decided {
                break;
            }
        }

        let (best_move, score, tied) = match chosen {
            Some(best) => {
                let pick = best.ties[rng.random_range(0..best.ties.len())];
                (moves[pick].clone(), best.score, best.ties.len())
            }
            // Stopped before a single root move finished.
            None => (moves[rng.random_range(0..moves.len())].clone(), 0, 0),
        };

        let nodes = budget.nodes();
        debug!(
            "search: side={} depth={}/{} nodes={} score={} ties={} stopped={} elapsed={:?}",
            side,
            completed_depth,
            max_depth,
            nodes,
            score,
            tied,
            stopped,
            started.elapsed()
        );

        SearchOutcome {
            best_move: Some(best_move),
            score,
            nodes,
            completed_depth,
            stopped,
            tied,
        }
    }
}

fn search_root<G: GameRules>(
    state: &G,
    side: Side,
    moves: &[G::Move],
    depth: u32,
    budget: &Budget<'_>,
) -> (RootBest, bool) {
    let mut best = RootBest::new();
    for (i, mv) in moves.iter().enumerate() {
        let child = state.apply(mv, side);
        match alpha_beta(&child, depth - 1, best.lower_bound(), INF, side, budget) {
            Ok(score) => best.record(i, score),
            Err(Stopped) => return (best, true),
        }
    }
    (best, false)
}

/// Root split across the pool. Workers share the running best so later root
/// moves start with a tighter lower bound; the final tie set matches the
/// sequential search because every best-scoring child is searched exactly.
fn search_root_parallel<G: GameRules>(
    pool: &ThreadPool,
    state: &G,
    side: Side,
    moves: &[G::Move],
    depth: u32,
    budget: &Budget<'_>,
) -> (RootBest, bool) {
    let shared = Mutex::new(RootBest::new());
    let stopped = AtomicBool::new(false);

    pool.install(|| {
        moves.par_iter().enumerate().for_each(|(i, mv)| {
            if stopped.load(Ordering::Relaxed) {
                return;
            }
            let alpha = shared.lock().lower_bound();
            let child = state.apply(mv, side);
            match alpha_beta(&child, depth - 1, alpha, INF, side, budget) {
                Ok(score) => shared.lock().record(i, score),
                Err(Stopped) => stopped.store(true, Ordering::Relaxed),
            }
        });
    });

    let mut best = shared.into_inner();
    best.ties.sort_unstable();
    (best, stopped.into_inner())
}

/// Best move for `side` at a fixed `depth`, ties broken with `rng`.
///
/// Returns `None` when the game is over or `side` has no legal move; in the
/// latter case the caller decides whether that is a pass or a loss.
pub fn best_move<G: GameRules, R: Rng>(
    state: &G,
    side: Side,
    depth: u32,
    rng: &mut R,
) -> Option<G::Move> {
    AlphaBeta::new(SearchLimits::depth(depth))
        .search(state, side, rng)
        .best_move
}
