//! Static board evaluation.
//!
//! A board is scored from one color's point of view as the sum of its chain
//! scores minus the sum of the opponent's. Every occupied cell is scanned in
//! all four directions and the chain through it is scored by length and open
//! ends. Overlapping chains are not deduplicated: a chain of length `k` is
//! counted once from each of its `k` cells, which weights long and crossing
//! structures (typically central ones) more heavily. The rest of the engine's
//! thresholds are calibrated to that scale.

use crate::board::{Board, Color, Point};
use crate::constants::{
    DIRECTIONS, SCORE_FIVE, SCORE_FOUR, SCORE_ONE, SCORE_SIX, SCORE_THREE, SCORE_TWO, WIN_LENGTH,
};

/// The chain of same-colored stones through a cell along one axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChainInfo {
    /// Stones in the chain, including the starting cell.
    pub length: usize,
    /// The backward end touches the edge or an opposing stone.
    pub blocked_back: bool,
    /// The forward end touches the edge or an opposing stone.
    pub blocked_forward: bool,
}

impl ChainInfo {
    pub fn open_ends(&self) -> usize {
        usize::from(!self.blocked_back) + usize::from(!self.blocked_forward)
    }
}

/// Measure the chain of `stone` through `pt` along `dir`, extending both ways.
///
/// `pt` itself is counted as part of the chain whatever it holds, so this
/// also answers "what would a stone here join".
pub fn chain_info(board: &Board, pt: Point, dir: (i32, i32), stone: Color) -> ChainInfo {
    let (dr, dc) = dir;
    let forward = board.run_from(pt, dir, stone);
    let backward = board.run_from(pt, (-dr, -dc), stone);
    let blocked = |end: Point| !board.is_empty_at(end);
    ChainInfo {
        length: 1 + forward + backward,
        blocked_forward: blocked(pt.step(dir, forward as i32 + 1)),
        blocked_back: blocked(pt.step((-dr, -dc), backward as i32 + 1)),
    }
}

/// Weighted score of one chain.
///
/// | length | both open | one open | both blocked |
/// |---|---|---|---|
/// | >=6 | 999999 | 999999 | 999999 |
/// | 5 | 100000 | 50000 | 20000 |
/// | 4 | 30000 | 15000 | 5000 |
/// | 3 | 7000 | 3000 | 1000 |
/// | 2 | 1500 | 500 | 500 |
/// | 1 | 50 | 50 | 50 |
pub fn chain_score(length: usize, open_ends: usize) -> i64 {
    let open = open_ends.min(2);
    match length {
        0 => 0,
        1 => SCORE_ONE,
        2 => SCORE_TWO[open],
        3 => SCORE_THREE[open],
        4 => SCORE_FOUR[open],
        5 => SCORE_FIVE[open],
        _ => {
            debug_assert!(length >= WIN_LENGTH);
            SCORE_SIX
        }
    }
}

/// Score of [`chain_info`] at `pt` along `dir`.
#[inline]
pub fn chain_value(board: &Board, pt: Point, dir: (i32, i32), stone: Color) -> i64 {
    let info = chain_info(board, pt, dir, stone);
    chain_score(info.length, info.open_ends())
}

/// Heuristic value of `board` for `player`: own chain scores minus the opponent's.
pub fn evaluate_board(board: &Board, player: Color) -> i64 {
    let mut own = 0;
    let mut theirs = 0;
    for (pt, stone) in board.occupied() {
        let total: i64 = DIRECTIONS
            .iter()
            .map(|&dir| chain_value(board, pt, dir, stone))
            .sum();
        if stone == player {
            own += total;
        } else {
            theirs += total;
        }
    }
    own - theirs
}
