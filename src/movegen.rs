//! Candidate move generation and forced-move detection.
//!
//! The full move space (every pair of empty cells) is far too large to
//! search, so candidates are restricted to cells near existing stones:
//!
//! - [`priority_positions`] - empty cells within a Chebyshev radius of a stone
//! - [`smart_moves`] - ranked candidate pairs, immediate wins first
//! - [`find_winning_move`] / [`find_pair_winning_move`] - one- and two-stone wins
//! - [`find_critical_blocks`] / [`find_blocking_move`] - answers to opponent threats
//!
//! Threat detection is built on 6-cell windows: a color can win on its next
//! turn exactly when some window holds at least four of its stones and none
//! of the opponent's.

use std::cmp::Reverse;
use std::ops::ControlFlow;

use crate::board::{Board, Color, Move, Point};
use crate::constants::{
    BLOCK_CANDIDATE_LIMIT, CENTER, CRITICAL_RUN, DIRECTIONS, MAX_BASE_PAIRS, MAX_CANDIDATES, N,
    OPENING_RADIUS, PRIORITY_RADIUS, WIN_LENGTH,
};
use crate::eval::{chain_value, evaluate_board};

/// Empty cells within `radius` (Chebyshev) of any stone, in row-major order.
///
/// On the empty board this is the fixed 5x5 window around the center.
pub fn priority_positions(board: &Board, radius: i32) -> Vec<Point> {
    if board.is_empty() {
        let center = Point::new(CENTER, CENTER);
        return (-OPENING_RADIUS..=OPENING_RADIUS)
            .flat_map(|dr| (-OPENING_RADIUS..=OPENING_RADIUS).map(move |dc| (dr, dc)))
            .map(|(dr, dc)| Point::new(center.row + dr, center.col + dc))
            .filter(|&pt| pt.in_bounds())
            .collect();
    }

    let mut marked = [[false; N]; N];
    for (pt, _) in board.occupied() {
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                let near = Point::new(pt.row + dr, pt.col + dc);
                if board.is_empty_at(near) {
                    marked[near.row as usize][near.col as usize] = true;
                }
            }
        }
    }
    Board::all_points()
        .filter(|pt| marked[pt.row as usize][pt.col as usize])
        .collect()
}

/// How much a stone at `pt` would join, for either color, summed over all axes.
fn local_value(board: &Board, pt: Point) -> i64 {
    DIRECTIONS
        .iter()
        .flat_map(|&dir| [Color::Black, Color::White].map(|c| chain_value(board, pt, dir, c)))
        .sum()
}

fn center_distance(pt: Point) -> i32 {
    (pt.row - CENTER).abs().max((pt.col - CENTER).abs())
}

/// Sort cells by local value, best first; ties go to the cell nearer the center.
pub fn rank_positions(board: &Board, cells: &mut [Point]) {
    cells.sort_by_cached_key(|&pt| (Reverse(local_value(board, pt)), center_distance(pt)));
}

/// [`priority_positions`] at the default radius, ranked.
pub fn ranked_positions(board: &Board) -> Vec<Point> {
    let mut cells = priority_positions(board, PRIORITY_RADIUS);
    rank_positions(board, &mut cells);
    cells
}

/// Pairs of `positions` in triangular order, so that a capped prefix is the
/// full cross product of the best-ranked cells.
fn base_pairs(positions: &[Point], cap: usize) -> Vec<Move> {
    let n = positions.len();
    let mut moves = Vec::with_capacity(cap.min(n * n.saturating_sub(1) / 2));
    for j in 1..positions.len() {
        for i in 0..j {
            if moves.len() >= cap {
                return moves;
            }
            moves.push(Move::Pair(positions[i], positions[j]));
        }
    }
    moves
}

/// Locality-pruned candidates without win detection: opening singles on the
/// empty board, otherwise up to `MAX_BASE_PAIRS` ranked pairs.
pub fn candidate_moves(board: &Board) -> Vec<Move> {
    let positions = ranked_positions(board);
    if board.is_empty() {
        return positions.into_iter().map(Move::Single).collect();
    }
    base_pairs(&positions, MAX_BASE_PAIRS)
}

fn same_cells(a: Move, b: Move) -> bool {
    match (a, b) {
        (Move::Pair(p, q), Move::Pair(r, s)) => (p == r && q == s) || (p == s && q == r),
        _ => a == b,
    }
}

/// Candidate moves for `player`: immediate wins first, then the ranked base
/// pairs, at most `MAX_CANDIDATES` in total.
pub fn smart_moves(board: &Board, player: Color) -> Vec<Move> {
    let positions = ranked_positions(board);
    if board.is_empty() {
        return positions.into_iter().map(Move::Single).collect();
    }

    let mut moves = winning_moves(board, player, &positions, MAX_CANDIDATES - MAX_BASE_PAIRS);
    for mv in base_pairs(&positions, MAX_BASE_PAIRS) {
        if moves.len() >= MAX_CANDIDATES {
            break;
        }
        if !moves.iter().any(|&m| same_cells(m, mv)) {
            moves.push(mv);
        }
    }
    moves
}

/// Visit every 6-cell window on the board with its own/opponent stone counts,
/// stopping as soon as `visit` breaks.
fn for_each_window(
    board: &Board,
    stone: Color,
    mut visit: impl FnMut(Point, (i32, i32), usize, usize) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let span = WIN_LENGTH as i32 - 1;
    for start in Board::all_points() {
        for dir in DIRECTIONS {
            if !start.step(dir, span).in_bounds() {
                continue;
            }
            let (mut own, mut theirs) = (0, 0);
            for i in 0..WIN_LENGTH as i32 {
                match board.get(start.step(dir, i)) {
                    Some(c) if c == stone => own += 1,
                    Some(_) => theirs += 1,
                    None => {}
                }
            }
            visit(start, dir, own, theirs)?;
        }
    }
    ControlFlow::Continue(())
}

/// Some window holds at least `min_own` of `stone` and none of the opponent.
fn has_open_window(board: &Board, stone: Color, min_own: usize) -> bool {
    for_each_window(board, stone, |_, _, own, theirs| {
        if theirs == 0 && own >= min_own {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .is_break()
}

/// True if `stone` can make six with the two stones of its next turn.
pub fn can_win_next_turn(board: &Board, stone: Color) -> bool {
    has_open_window(board, stone, WIN_LENGTH - 2)
}

/// Empty cells of every window `stone` could complete on its next turn, row-major.
pub fn threat_cells(board: &Board, stone: Color) -> Vec<Point> {
    let mut marked = [[false; N]; N];
    let _ = for_each_window(board, stone, |start, dir, own, theirs| {
        if theirs == 0 && own >= WIN_LENGTH - 2 {
            for i in 0..WIN_LENGTH as i32 {
                let pt = start.step(dir, i);
                if board.is_empty_at(pt) {
                    marked[pt.row as usize][pt.col as usize] = true;
                }
            }
        }
        ControlFlow::Continue(())
    });
    Board::all_points()
        .filter(|pt| marked[pt.row as usize][pt.col as usize])
        .collect()
}

/// Complete a winning stone at `positions[idx]` into a pair with the best-ranked other cell.
fn pair_with(board: &Board, positions: &[Point], idx: usize) -> Move {
    let p = positions[idx];
    let other = positions
        .iter()
        .copied()
        .find(|&q| q != p)
        .or_else(|| board.empty_points().find(|&q| q != p));
    match other {
        Some(q) => Move::Pair(p, q),
        None => Move::Single(p),
    }
}

/// Winning moves for `player` among `positions`, in candidate order.
///
/// Single-stone completions come paired with a filler stone; otherwise the
/// first stone is tried from each candidate and the second from the
/// candidates after it.
fn winning_moves(board: &Board, player: Color, positions: &[Point], limit: usize) -> Vec<Move> {
    let mut wins = Vec::new();
    if limit == 0 || !can_win_next_turn(board, player) {
        return wins;
    }
    for (i, &p) in positions.iter().enumerate() {
        if board.completes_six(p, player) {
            wins.push(pair_with(board, positions, i));
            if wins.len() >= limit {
                return wins;
            }
            continue;
        }
        let mut after = board.clone();
        after.place(p, player);
        for &q in &positions[i + 1..] {
            if after.completes_six(q, player) {
                wins.push(Move::Pair(p, q));
                if wins.len() >= limit {
                    return wins;
                }
            }
        }
    }
    wins
}

/// First candidate whose first stone alone completes six for `player`.
pub fn find_winning_move(board: &Board, player: Color) -> Option<Move> {
    if board.is_empty() || !has_open_window(board, player, WIN_LENGTH - 1) {
        return None;
    }
    let positions = ranked_positions(board);
    positions
        .iter()
        .position(|&p| board.completes_six(p, player))
        .map(|i| pair_with(board, &positions, i))
}

/// First two-stone win for `player` found over the ranked candidates.
///
/// Order dependent and limited to the candidate set: it reports the first
/// pair found, not the best one.
pub fn find_pair_winning_move(board: &Board, player: Color) -> Option<Move> {
    if board.is_empty() {
        return None;
    }
    let positions = ranked_positions(board);
    winning_moves(board, player, &positions, 1).pop()
}

/// Empty cells where an `opponent` stone would make a run of at least four.
pub fn find_critical_blocks(board: &Board, opponent: Color) -> Vec<Point> {
    board
        .empty_points()
        .filter(|&pt| {
            DIRECTIONS.iter().any(|&(dr, dc)| {
                1 + board.run_from(pt, (dr, dc), opponent) + board.run_from(pt, (-dr, -dc), opponent)
                    >= CRITICAL_RUN
            })
        })
        .collect()
}

/// The empty cell that, played by `player` together with `critical`,
/// maximizes [`evaluate_board`]. `None` if no other empty cell exists.
pub fn find_best_complement_for_critical(
    board: &Board,
    player: Color,
    critical: Point,
) -> Option<Point> {
    let mut best: Option<(i64, Point)> = None;
    for cand in board.empty_points() {
        if !board.is_valid_move(critical, cand) {
            continue;
        }
        let mut after = board.clone();
        after.apply_move(Move::Pair(critical, cand), player);
        let score = evaluate_board(&after, player);
        if best.is_none_or(|(s, _)| score > s) {
            best = Some((score, cand));
        }
    }
    best.map(|(_, pt)| pt)
}

/// A pair for `player` that stops the opponent's next-turn win, if one is threatened.
///
/// Pairs are drawn from the threatened cells and the opponent's critical
/// cells (topped up with ranked candidates); among those that leave the
/// opponent no winning window, the best evaluated one is chosen. When no
/// pair closes every window, the critical-cell rule is used instead.
pub fn find_blocking_move(board: &Board, player: Color) -> Option<Move> {
    let opponent = player.opponent();
    if board.is_empty() || !can_win_next_turn(board, opponent) {
        return None;
    }

    let critical = find_critical_blocks(board, opponent);
    let mut pool = threat_cells(board, opponent);
    for &pt in &critical {
        if !pool.contains(&pt) {
            pool.push(pt);
        }
    }
    rank_positions(board, &mut pool);
    pool.truncate(BLOCK_CANDIDATE_LIMIT);
    for pt in ranked_positions(board) {
        if pool.len() >= BLOCK_CANDIDATE_LIMIT {
            break;
        }
        if !pool.contains(&pt) {
            pool.push(pt);
        }
    }

    let mut best: Option<(i64, Move)> = None;
    for mv in base_pairs(&pool, usize::MAX) {
        let mut after = board.clone();
        after.apply_move(mv, player);
        if can_win_next_turn(&after, opponent) {
            continue;
        }
        let score = evaluate_board(&after, player);
        if best.is_none_or(|(s, _)| score > s) {
            best = Some((score, mv));
        }
    }
    if let Some((_, mv)) = best {
        return Some(mv);
    }

    match critical.as_slice() {
        [a, b, ..] => Some(Move::Pair(*a, *b)),
        [a] => find_best_complement_for_critical(board, player, *a).map(|b| Move::Pair(*a, b)),
        [] => match pool.as_slice() {
            [a, b, ..] => Some(Move::Pair(*a, *b)),
            _ => None,
        },
    }
}
