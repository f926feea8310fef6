//! Constants for board geometry, move generation, evaluation and search.
//!
//! Everything tunable about the engine lives here so that the heuristics in
//! [`crate::movegen`], [`crate::eval`] and [`crate::playout`] agree on a
//! single scoring scale.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Connect6 is played on the 19x19 Go grid.
pub const N: usize = 19;

/// Stones in a row needed to win.
pub const WIN_LENGTH: usize = 6;

/// Center row/column, where the opening window is placed.
pub const CENTER: i32 = (N / 2) as i32;

/// Half-width of the opening window around the center (5x5 window).
pub const OPENING_RADIUS: i32 = 2;

/// The four line axes: horizontal, vertical, diagonal, anti-diagonal.
pub const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

// =============================================================================
// Move Generation
// =============================================================================

/// Chebyshev radius around existing stones that candidate cells are drawn from.
pub const PRIORITY_RADIUS: i32 = 2;

/// Maximum number of base candidate pairs.
pub const MAX_BASE_PAIRS: usize = 100;

/// Maximum number of candidates including prepended immediate wins.
pub const MAX_CANDIDATES: usize = 150;

/// Run length (counting the hypothetical stone) that makes a cell critical.
pub const CRITICAL_RUN: usize = 4;

/// Cells considered when searching for a pair that blocks a next-turn win.
pub const BLOCK_CANDIDATE_LIMIT: usize = 10;

// =============================================================================
// Chain Scores (see `eval::chain_score`)
// =============================================================================

/// Score of a run of six or more: terminal, saturates everything else.
pub const SCORE_SIX: i64 = 999_999;

/// Scores for runs of 5, 4, 3, 2 indexed by open ends `[0, 1, 2]`.
pub const SCORE_FIVE: [i64; 3] = [20_000, 50_000, 100_000];
pub const SCORE_FOUR: [i64; 3] = [5_000, 15_000, 30_000];
pub const SCORE_THREE: [i64; 3] = [1_000, 3_000, 7_000];
pub const SCORE_TWO: [i64; 3] = [500, 500, 1_500];

/// Score of a lone stone, regardless of open ends.
pub const SCORE_ONE: i64 = 50;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default iteration cap per search.
pub const DEFAULT_ITERATIONS: usize = 100_000;

/// Default UCB1 exploration constant (sqrt 2).
pub const DEFAULT_EXPLORATION: f64 = 1.414;

/// Default maximum number of turns played in a rollout.
pub const DEFAULT_MAX_ROLLOUT_DEPTH: usize = 30;

/// Default per-move time budget in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 4;

/// Probability of a uniformly random candidate in place of the greedy rollout move.
pub const DEFAULT_ROLLOUT_NOISE: f64 = 0.1;
