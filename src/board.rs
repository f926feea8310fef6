//! Connect6 board state: stones, points, moves and win detection.
//!
//! The board is a plain 19x19 grid of `Option<Color>`. It is mutated only
//! through [`Board::apply_move`], which trusts its caller: legality is a
//! separate predicate ([`Board::is_legal`], [`Board::is_valid_move`]) checked
//! by whoever originates the move.

use std::fmt;

use crate::constants::{DIRECTIONS, N, WIN_LENGTH};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other color. Applying it twice yields the original color.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Single-character symbol used for rendering and fingerprints.
    pub fn symbol(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}

/// A zero-based (row, col) coordinate.
///
/// Coordinates are signed so that out-of-range input and the `(-1, -1)`
/// sentinel are representable; [`Point::in_bounds`] tells them apart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub row: i32,
    pub col: i32,
}

impl Point {
    /// Marks the missing second stone of a single-stone move in the wire encoding.
    pub const SENTINEL: Point = Point { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    #[inline]
    pub fn in_bounds(self) -> bool {
        (0..N as i32).contains(&self.row) && (0..N as i32).contains(&self.col)
    }

    /// The point `steps` cells away along direction `(dr, dc)`.
    #[inline]
    pub fn step(self, (dr, dc): (i32, i32), steps: i32) -> Self {
        Self::new(self.row + dr * steps, self.col + dc * steps)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One turn's placement: a single stone (only the opening) or a pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Single(Point),
    Pair(Point, Point),
}

impl Move {
    #[inline]
    pub fn first(self) -> Point {
        match self {
            Move::Single(p) | Move::Pair(p, _) => p,
        }
    }

    #[inline]
    pub fn second(self) -> Option<Point> {
        match self {
            Move::Single(_) => None,
            Move::Pair(_, q) => Some(q),
        }
    }

    /// The placed points in order.
    pub fn points(self) -> impl Iterator<Item = Point> {
        std::iter::once(self.first()).chain(self.second())
    }

    /// Number of stones the move places.
    pub fn stones(self) -> usize {
        match self {
            Move::Single(_) => 1,
            Move::Pair(..) => 2,
        }
    }

    /// Wire encoding: two (row, col) pairs, `(-1, -1)` in the second slot for a single stone.
    pub fn to_coords(self) -> [(i32, i32); 2] {
        let q = self.second().unwrap_or(Point::SENTINEL);
        let p = self.first();
        [(p.row, p.col), (q.row, q.col)]
    }

    /// Inverse of [`Move::to_coords`].
    pub fn from_coords([(r1, c1), (r2, c2)]: [(i32, i32); 2]) -> Self {
        let p = Point::new(r1, c1);
        let q = Point::new(r2, c2);
        if q == Point::SENTINEL {
            Move::Single(p)
        } else {
            Move::Pair(p, q)
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Single(p) => write!(f, "{p}"),
            Move::Pair(p, q) => write!(f, "{p} {q}"),
        }
    }
}

/// The 19x19 Connect6 board. Equality and hashing cover the full grid.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Option<Color>; N]; N],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[None; N]; N],
        }
    }

    /// Color at `pt`, or `None` for empty or out-of-range points.
    #[inline]
    pub fn get(&self, pt: Point) -> Option<Color> {
        if !pt.in_bounds() {
            return None;
        }
        self.cells[pt.row as usize][pt.col as usize]
    }

    /// True iff `pt` is on the board and unoccupied.
    #[inline]
    pub fn is_empty_at(&self, pt: Point) -> bool {
        pt.in_bounds() && self.cells[pt.row as usize][pt.col as usize].is_none()
    }

    /// Put one stone on the board. Unchecked: `pt` must be an empty on-board point.
    #[inline]
    pub fn place(&mut self, pt: Point, stone: Color) {
        debug_assert!(self.is_empty_at(pt), "placing on {pt} which is not empty");
        self.cells[pt.row as usize][pt.col as usize] = Some(stone);
    }

    /// Write `stone` into the one or two target cells of `mv`. Unchecked.
    pub fn apply_move(&mut self, mv: Move, stone: Color) {
        for pt in mv.points() {
            self.place(pt, stone);
        }
    }

    /// True iff the two points are distinct, on the board and empty.
    pub fn is_valid_move(&self, p1: Point, p2: Point) -> bool {
        p1 != p2 && self.is_empty_at(p1) && self.is_empty_at(p2)
    }

    /// Full legality: a single stone only on the empty board, a valid pair otherwise.
    pub fn is_legal(&self, mv: Move) -> bool {
        match mv {
            Move::Single(p) => self.is_empty() && self.is_empty_at(p),
            Move::Pair(p, q) => !self.is_empty() && self.is_valid_move(p, q),
        }
    }

    /// Number of contiguous `stone`s starting one step from `pt` along `dir`.
    #[inline]
    pub fn run_from(&self, pt: Point, dir: (i32, i32), stone: Color) -> usize {
        let mut count = 0;
        let mut cur = pt.step(dir, 1);
        while self.get(cur) == Some(stone) {
            count += 1;
            cur = cur.step(dir, 1);
        }
        count
    }

    /// Whether `player` has a run of six or more anywhere on the board.
    ///
    /// Every owned cell is tried as a run start in each direction; redundant
    /// starts inside a longer run are tolerated since only existence matters.
    pub fn check_win(&self, player: Color) -> bool {
        self.occupied().any(|(pt, stone)| {
            stone == player
                && DIRECTIONS
                    .iter()
                    .any(|&dir| 1 + self.run_from(pt, dir, player) >= WIN_LENGTH)
        })
    }

    /// True if a `stone` at `pt` would sit in (or already sits in) a run of six.
    ///
    /// Only the four lines through `pt` are examined, so this is the cheap
    /// check to use right after placing a stone.
    pub fn completes_six(&self, pt: Point, stone: Color) -> bool {
        DIRECTIONS.iter().any(|&(dr, dc)| {
            1 + self.run_from(pt, (dr, dc), stone) + self.run_from(pt, (-dr, -dc), stone)
                >= WIN_LENGTH
        })
    }

    /// After `mv` has been applied for `stone`, did it make six in a row?
    pub fn wins_with(&self, mv: Move, stone: Color) -> bool {
        mv.points().any(|pt| self.completes_six(pt, stone))
    }

    /// The color holding six in a row, Black checked first.
    pub fn winner(&self) -> Option<Color> {
        [Color::Black, Color::White]
            .into_iter()
            .find(|&stone| self.check_win(stone))
    }

    pub fn stone_count(&self, stone: Color) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| **c == Some(stone))
            .count()
    }

    /// The color to move, inferred from stone counts.
    ///
    /// Black opens with one stone and both sides then place two, so the
    /// side with fewer or equal stones is the one to move.
    pub fn current_player(&self) -> Color {
        if self.stone_count(Color::Black) <= self.stone_count(Color::White) {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    /// Every on-board point in row-major order.
    pub fn all_points() -> impl Iterator<Item = Point> {
        (0..N as i32).flat_map(|row| (0..N as i32).map(move |col| Point::new(row, col)))
    }

    pub fn empty_points(&self) -> impl Iterator<Item = Point> + '_ {
        Self::all_points().filter(|&pt| self.get(pt).is_none())
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Point, Color)> + '_ {
        Self::all_points().filter_map(|pt| self.get(pt).map(|stone| (pt, stone)))
    }

    /// Canonical text key of the grid: `.`, `B` or `W` per cell, row-major.
    pub fn fingerprint(&self) -> String {
        let mut s = String::with_capacity(N * N);
        for cell in self.cells.iter().flatten() {
            s.push(cell.map_or('.', Color::symbol));
        }
        s
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..N {
            write!(f, "{col:>3}")?;
        }
        writeln!(f)?;
        for (row, cells) in self.cells.iter().enumerate() {
            write!(f, "{row:>3}")?;
            for cell in cells {
                let ch = cell.map_or('.', Color::symbol);
                write!(f, "  {ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
