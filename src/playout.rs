//! Heuristic playouts for estimating a position's value.
//!
//! Each rollout turn prefers, in order:
//! - a win available with this turn's stones
//! - a block of the opponent's next-turn win
//! - the candidate with the best one-ply static evaluation, replaced by a
//!   uniformly random candidate with probability `noise`
//!
//! A rollout ends on a win or after `max_depth` turns; unfinished games are
//! scored by the sign of the evaluation from the root player's side.

use fastrand::Rng;

use crate::board::{Board, Color, Move};
use crate::eval::evaluate_board;
use crate::movegen::{candidate_moves, find_blocking_move, find_pair_winning_move};

#[inline]
fn outcome(winner: Color, root_player: Color) -> f64 {
    if winner == root_player { 1.0 } else { 0.0 }
}

/// Pick the rollout move for `player`, or `None` when no candidate exists.
pub fn choose_rollout_move(board: &Board, player: Color, noise: f64, rng: &mut Rng) -> Option<Move> {
    if let Some(mv) = find_pair_winning_move(board, player) {
        return Some(mv);
    }
    if let Some(mv) = find_blocking_move(board, player) {
        return Some(mv);
    }

    let candidates = candidate_moves(board);
    if candidates.is_empty() {
        return None;
    }
    if rng.f64() < noise {
        return Some(candidates[rng.usize(..candidates.len())]);
    }
    candidates.into_iter().max_by_key(|&mv| {
        let mut after = board.clone();
        after.apply_move(mv, player);
        evaluate_board(&after, player)
    })
}

/// Play out from `board` with `to_move` to play.
///
/// Returns 1.0 if `root_player` wins (or leads at the depth cap), else 0.0.
pub fn rollout(
    board: &Board,
    to_move: Color,
    root_player: Color,
    max_depth: usize,
    noise: f64,
    rng: &mut Rng,
) -> f64 {
    if let Some(winner) = board.winner() {
        return outcome(winner, root_player);
    }

    let mut board = board.clone();
    let mut player = to_move;
    for _ in 0..max_depth {
        let Some(mv) = choose_rollout_move(&board, player, noise, rng) else {
            break;
        };
        board.apply_move(mv, player);
        if board.wins_with(mv, player) {
            return outcome(player, root_player);
        }
        player = player.opponent();
    }

    if evaluate_board(&board, root_player) > 0 {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;

    fn setpos(black: &[(i32, i32)], white: &[(i32, i32)]) -> Board {
        let mut board = Board::new();
        for &(r, c) in black {
            board.place(Point::new(r, c), Color::Black);
        }
        for &(r, c) in white {
            board.place(Point::new(r, c), Color::White);
        }
        board
    }

    #[test]
    fn test_rollout_on_won_board() {
        let mut rng = Rng::with_seed(1);
        let board = setpos(&[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (0, 5)], &[(5, 5)]);
        assert_eq!(rollout(&board, Color::White, Color::Black, 10, 0.0, &mut rng), 1.0);
        assert_eq!(rollout(&board, Color::White, Color::White, 10, 0.0, &mut rng), 0.0);
    }

    #[test]
    fn test_rollout_takes_immediate_win() {
        let mut rng = Rng::with_seed(7);
        let board = setpos(&[(9, 6), (9, 7), (9, 8), (9, 9)], &[(2, 2), (2, 3), (16, 16)]);
        for _ in 0..5 {
            assert_eq!(rollout(&board, Color::Black, Color::Black, 4, 1.0, &mut rng), 1.0);
        }
    }

    #[test]
    fn test_zero_depth_uses_evaluation() {
        let mut rng = Rng::with_seed(3);
        let board = setpos(&[(9, 8), (9, 9), (9, 10)], &[(0, 0)]);
        assert_eq!(rollout(&board, Color::White, Color::Black, 0, 0.0, &mut rng), 1.0);
        assert_eq!(rollout(&board, Color::White, Color::White, 0, 0.0, &mut rng), 0.0);
    }

    #[test]
    fn test_rollout_move_blocks_threat() {
        let mut rng = Rng::with_seed(11);
        let board = setpos(&[(3, 3), (3, 4), (15, 2)], &[(9, 6), (9, 7), (9, 8), (9, 9)]);
        let mv = choose_rollout_move(&board, Color::Black, 1.0, &mut rng).unwrap();
        let mut after = board.clone();
        after.apply_move(mv, Color::Black);
        assert!(find_pair_winning_move(&after, Color::White).is_none());
    }

    #[test]
    fn test_rollout_moves_are_legal() {
        let mut rng = Rng::with_seed(5);
        let board = setpos(&[(9, 9), (10, 10), (8, 11)], &[(9, 10), (10, 9)]);
        for noise in [0.0, 1.0] {
            let mv = choose_rollout_move(&board, Color::White, noise, &mut rng).unwrap();
            assert!(board.is_legal(mv));
        }
        let opening = choose_rollout_move(&Board::new(), Color::Black, 0.0, &mut rng).unwrap();
        assert!(matches!(opening, Move::Single(_)));
    }
}
