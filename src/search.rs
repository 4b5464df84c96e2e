/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::{
    atomic::{AtomicU64, Ordering},
    mpsc, Arc,
};
use std::time::{Duration, Instant};

use threadpool::ThreadPool;

use crate::board::{Board, Color, Move, MAX_VALUE, MIN_VALUE};
use crate::cache::MoveCache;
use crate::eval::Evaluator;

/// A position with this many moves or fewer counts as near the end game,
/// where cached answers are not trusted and everything is searched fresh.
const END_GAME_MOVES: usize = 5;

/// Configuration variables for the [`Engine`].
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Plies to search before quiescence takes over.
    pub max_depth: i32,

    /// How far past depth zero quiescence may chase captures, stored as a
    /// negative number.
    pub q_max_depth: i32,

    /// Wall-clock budget for one `best_move` call. Zero means unlimited.
    pub timeout: Duration,

    /// Fan the root moves out across worker threads.
    pub use_threads: bool,

    /// Reuse previously chosen moves via the cache.
    pub use_cache: bool,

    /// Highest cache-entry risk that may be reused without re-evaluation.
    pub acceptable_risk: f64,

    /// Cores to leave idle when sizing the worker pool.
    pub reserved_cores: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            q_max_depth: -2,
            timeout: Duration::ZERO,
            use_threads: false,
            use_cache: false,
            acceptable_risk: 0.25,
            reserved_cores: 0,
        }
    }
}

/// The best move found so far for one search frame, together with how many
/// descendants were examined to find it.
#[derive(Debug, Clone, Copy)]
struct BestMove {
    mv: Move,
    value: i32,
    moves_examined: u64,
}

impl BestMove {
    /// Starts at the worst possible score for the searching side, so any
    /// real result replaces it.
    #[inline(always)]
    fn worst_for(maximize: bool) -> Self {
        Self {
            mv: Move::invalid(),
            value: if maximize { MIN_VALUE } else { MAX_VALUE },
            moves_examined: 0,
        }
    }
}

/// Per-call state shared between the coordinator and its workers.
struct SearchContext {
    config: SearchConfig,
    start: Instant,
    cache: Arc<MoveCache>,
    moves_examined: AtomicU64,
}

impl SearchContext {
    /// Whether the wall clock has outrun the budget at this frame.
    ///
    /// Frames entered at the full search depth never time out; that is what
    /// guarantees the root enumerates every move. Deeper frames stop
    /// recursing once the deadline has passed.
    #[inline(always)]
    fn timed_out(&self, depth: i32) -> bool {
        !self.config.timeout.is_zero()
            && depth != self.config.max_depth
            && self.start.elapsed() >= self.config.timeout
    }

    /// Folds one returned subtree's examined count into the call total.
    #[inline(always)]
    fn add_examined(&self, count: u64) {
        self.moves_examined.fetch_add(count, Ordering::Relaxed);
    }

    /// The recursive alpha-beta step.
    ///
    /// Walks the sorted move list of `board`, recursing with the window
    /// tightened as it goes, consulting the cache when allowed, extending
    /// past depth zero only while the best sorted moves are captures, and
    /// answering with a neutral value when the clock runs out before any
    /// move was scored.
    fn minimax(&self, board: &Board, mut alpha: i32, mut beta: i32, depth: i32, maximize: bool) -> i32 {
        let mut local = BestMove::worst_for(maximize);
        let mut value = local.value;

        for mv in &board.moves_side_to_move {
            // Quiescence gate: past depth zero, only captures keep the
            // search alive, and only down to the quiescence floor.
            if depth <= 0 && (mv.value() == 0 || depth <= self.config.q_max_depth) {
                self.add_examined(local.moves_examined);
                return Evaluator::evaluate(board, Evaluator::FULL);
            }

            if self.timed_out(depth) {
                // Nothing scored yet reads as neutral, so results from
                // peer frames that did finish can dominate it.
                if (maximize && local.value == MIN_VALUE)
                    || (!maximize && local.value == MAX_VALUE)
                {
                    return 0;
                }
                return local.value;
            }

            // See whether a trusted answer for this whole position exists
            // before spending a subtree on it. End-game positions are
            // always searched fresh.
            let mut accepted_cached = false;
            let mut got_cache_hit = false;
            let mut cached_value = value;

            if self.config.use_cache && board.moves_side_to_move.len() > END_GAME_MOVES {
                if let Some(entry) = self.cache.lookup(board, board.turn) {
                    if entry.mv.is_valid() {
                        got_cache_hit = true;
                        value = entry.mv.value();
                        cached_value = value;
                        local.mv = entry.mv;
                        local.value = value;
                        local.moves_examined += entry.moves_examined;

                        if entry.risk() > self.config.acceptable_risk {
                            // Too risky to trust; verify it manually and
                            // remember that we had to.
                            self.cache.note_reuse(board, board.turn);
                        } else {
                            accepted_cached = true;
                        }
                    }
                }
            }

            if !accepted_cached {
                let mut trial = board.clone();
                let mut trial_mv = *mv;
                trial.execute(&mut trial_mv);
                trial.advance_turn();
                local.moves_examined += 1;

                if trial.moves_side_to_move.is_empty() {
                    // The reply side has nothing: mate or stalemate one
                    // frame down. Shallower mates score better.
                    local.mv = *mv;
                    local.value = if maximize {
                        MAX_VALUE - (100 - depth)
                    } else {
                        MIN_VALUE + (100 - depth)
                    };
                    break;
                }

                value = self.minimax(&trial, alpha, beta, depth - 1, !maximize);

                if (maximize && value > local.value) || (!maximize && value < local.value) {
                    local.value = value;
                    local.mv = *mv;
                    local.mv.set_value(value);

                    if self.config.use_cache {
                        self.cache.offer(
                            board,
                            local.mv,
                            board.turn,
                            value,
                            local.moves_examined,
                        );
                    }
                }

                if got_cache_hit {
                    // We re-evaluated a cached answer; track whether doing
                    // so actually paid off.
                    if (maximize && value > cached_value)
                        || (!maximize && value < cached_value)
                    {
                        self.cache.note_improved(board, board.turn);
                    }
                }
            }

            if maximize {
                alpha = alpha.max(value);
            } else {
                beta = beta.min(value);
            }
            if alpha >= beta {
                break;
            }
        }

        self.add_examined(local.moves_examined);
        local.value
    }
}

/// Alpha-beta minimax engine with quiescence extension, an optional
/// cache short-circuit, an optional worker-parallel root split, and a
/// wall-clock timeout.
pub struct Engine {
    config: SearchConfig,
    cache: Arc<MoveCache>,
    last_examined: u64,
}

impl Engine {
    /// Constructs a new [`Engine`] searching `max_depth` plies.
    pub fn new(max_depth: i32) -> Self {
        Self {
            config: SearchConfig {
                max_depth,
                ..Default::default()
            },
            cache: Arc::new(MoveCache::new()),
            last_examined: 0,
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The engine's move cache; lives as long as the engine does.
    #[inline(always)]
    pub fn cache(&self) -> &MoveCache {
        &self.cache
    }

    /// Moves examined by the most recent `best_move` call.
    #[inline(always)]
    pub fn moves_examined(&self) -> u64 {
        self.last_examined
    }

    pub fn set_max_depth(&mut self, plies: i32) {
        self.config.max_depth = plies;
    }

    /// Sets the quiescence floor. Expects a non-positive number of plies
    /// past zero.
    pub fn set_q_max_depth(&mut self, depth: i32) {
        self.config.q_max_depth = depth;
    }

    /// Sets the wall-clock budget per move. [`Duration::ZERO`] disables it.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }

    pub fn set_use_threads(&mut self, use_threads: bool) {
        self.config.use_threads = use_threads;
    }

    pub fn set_use_cache(&mut self, use_cache: bool) {
        self.config.use_cache = use_cache;
    }

    pub fn set_acceptable_risk(&mut self, risk: f64) {
        self.config.acceptable_risk = risk;
    }

    pub fn set_reserved_cores(&mut self, cores: usize) {
        self.config.reserved_cores = cores;
    }

    /// Picks the best move for the side to move on `board`, or the invalid
    /// sentinel when there is none.
    ///
    /// Trivial positions short-circuit: no moves returns the sentinel, a
    /// single move is returned as-is. Familiar positions may come straight
    /// from the cache. Everything else goes through the serial or parallel
    /// root search.
    pub fn best_move(&mut self, board: &Board) -> Move {
        let maximize = board.turn == Color::White;
        self.last_examined = 0;

        let moves = &board.moves_side_to_move;
        if moves.is_empty() {
            return Move::invalid();
        }
        if moves.len() == 1 {
            self.last_examined = 1;
            return moves[0];
        }

        let context = Arc::new(SearchContext {
            config: self.config,
            start: Instant::now(),
            cache: Arc::clone(&self.cache),
            moves_examined: AtomicU64::new(0),
        });

        // A familiar middle-game position answers from the cache without
        // searching at all.
        if self.config.use_cache && moves.len() > END_GAME_MOVES {
            if let Some(entry) = self.cache.lookup(board, board.turn) {
                if entry.mv.is_valid_for(board) {
                    self.last_examined = entry.moves_examined;
                    return entry.mv;
                }
            }
        }

        let best = if self.config.use_threads {
            Self::search_parallel(&context, board, maximize)
        } else {
            Self::search_serial(&context, board, maximize)
        };

        self.last_examined = context.moves_examined.load(Ordering::Relaxed);

        if self.config.use_cache && best.is_valid_for(board) {
            self.cache
                .offer(board, best, board.turn, best.value(), self.last_examined);
        }

        best
    }

    /// Walks the root moves on the calling thread, giving each its own full
    /// alpha-beta window.
    fn search_serial(context: &SearchContext, board: &Board, maximize: bool) -> Move {
        let mut best = BestMove::worst_for(maximize);

        for mv in &board.moves_side_to_move {
            if context.timed_out(context.config.max_depth) {
                return best.mv;
            }

            let mut trial = board.clone();
            let mut trial_mv = *mv;
            trial.execute(&mut trial_mv);
            trial.advance_turn();
            context.add_examined(1);

            let value = context.minimax(
                &trial,
                MIN_VALUE,
                MAX_VALUE,
                context.config.max_depth,
                !maximize,
            );

            if (maximize && value > best.value) || (!maximize && value < best.value) {
                best.value = value;
                best.mv = *mv;
                best.mv.set_value(value);
            }
        }

        best.mv
    }

    /// Fans one task per root move out over a bounded worker pool.
    ///
    /// Workers share no pruning window; each explores exactly the subtree
    /// the serial search would. Results arrive in completion order, and on
    /// equal scores the move earlier in sorted order wins, so the outcome
    /// is identical to the serial search.
    fn search_parallel(context: &Arc<SearchContext>, board: &Board, maximize: bool) -> Move {
        let workers = num_cpus::get()
            .saturating_sub(context.config.reserved_cores)
            .max(1);
        let pool = ThreadPool::with_name(
            format!("{} search worker(s)", env!("CARGO_PKG_NAME")),
            workers,
        );
        let (sender, receiver) = mpsc::channel();

        for (index, mv) in board.moves_side_to_move.iter().enumerate() {
            let sender = sender.clone();
            let context = Arc::clone(context);
            let board = board.clone();
            let mv = *mv;

            pool.execute(move || {
                let mut trial = board;
                let mut trial_mv = mv;
                trial.execute(&mut trial_mv);
                trial.advance_turn();
                context.add_examined(1);

                let value = context.minimax(
                    &trial,
                    MIN_VALUE,
                    MAX_VALUE,
                    context.config.max_depth,
                    !maximize,
                );

                // The coordinator outlives every worker, so this only fails
                // if it already has all the results it needs.
                let _ = sender.send((index, mv, value));
            });
        }
        drop(sender);

        let mut best = BestMove::worst_for(maximize);
        let mut best_index = usize::MAX;

        for (index, mv, value) in receiver {
            let improves = (maximize && value > best.value) || (!maximize && value < best.value);
            // First-seen wins on equality, regardless of arrival order.
            let earlier_tie = value == best.value && best.mv.is_valid() && index < best_index;

            if improves || earlier_tie {
                best.value = value;
                best.mv = mv;
                best.mv.set_value(value);
                best_index = index;
            }
        }

        best.mv
    }
}
