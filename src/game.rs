//! Console game: a human against the MCTS engine.
//!
//! The session alternates turns, Black first, rendering the board before
//! each one. Human moves are read as zero-based coordinates:
//!
//! - `row col` - the single opening stone (only on the empty board)
//! - `row1 col1 row2 col2` - a regular two-stone turn
//! - `quit` - abandon the game
//!
//! Malformed or illegal input is reported and re-prompted; only validated
//! moves reach [`Board::apply_move`].
//!
//! ## Example
//!
//! ```ignore
//! use connect6::game::GameSession;
//! let mut session = GameSession::new(engine, Color::Black);
//! session.play(&mut io::stdin().lock(), &mut io::stdout())?;
//! ```

use std::io::{BufRead, Write};

use anyhow::{Result, ensure};
use thiserror::Error;
use tracing::info;

use crate::board::{Board, Color, Move, Point};
use crate::mcts::Mcts;

/// Why a line of human input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("expected {expected} numbers, got {got}")]
    WrongArity { expected: usize, got: usize },

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("{0} is off the board")]
    OutOfRange(Point),

    #[error("{0} is already occupied")]
    Occupied(Point),

    #[error("the two stones must go on different points")]
    Coincident,
}

/// Parse and validate one line of human input against `board`.
pub fn parse_move(line: &str, board: &Board) -> Result<Move, InputError> {
    let expected = if board.is_empty() { 2 } else { 4 };
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != expected {
        return Err(InputError::WrongArity {
            expected,
            got: tokens.len(),
        });
    }

    let numbers = tokens
        .iter()
        .map(|t| t.parse::<i32>().map_err(|_| InputError::NotANumber(t.to_string())))
        .collect::<Result<Vec<_>, _>>()?;
    let points: Vec<Point> = numbers.chunks(2).map(|c| Point::new(c[0], c[1])).collect();

    for &pt in &points {
        if !pt.in_bounds() {
            return Err(InputError::OutOfRange(pt));
        }
        if board.get(pt).is_some() {
            return Err(InputError::Occupied(pt));
        }
    }

    match *points.as_slice() {
        [p] => Ok(Move::Single(p)),
        [p, q] if p == q => Err(InputError::Coincident),
        [p, q] => Ok(Move::Pair(p, q)),
        _ => Err(InputError::WrongArity {
            expected,
            got: tokens.len(),
        }),
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Color),
    /// The board filled up or the engine found nothing to play.
    Draw,
    /// The human quit or input ended.
    Abandoned,
}

/// Game state for one human-versus-engine match.
pub struct GameSession {
    board: Board,
    engine: Mcts,
    human: Color,
    to_move: Color,
    history: Vec<(Color, Move)>,
}

impl GameSession {
    /// New game on an empty board; Black moves first.
    pub fn new(engine: Mcts, human: Color) -> Self {
        Self::from_board(engine, human, Board::new())
    }

    /// Continue from an existing position, with the side to move inferred.
    pub fn from_board(engine: Mcts, human: Color, board: Board) -> Self {
        let to_move = board.current_player();
        Self {
            board,
            engine,
            human,
            to_move,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    /// Moves played in this session, in order.
    pub fn history(&self) -> &[(Color, Move)] {
        &self.history
    }

    /// Run the game loop until someone wins, the game is drawn or input ends.
    pub fn play<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<Outcome> {
        info!(human = %self.human, "game started");
        let outcome = loop {
            writeln!(out, "\n{}", self.board)?;

            if let Some(winner) = self.board.winner() {
                writeln!(out, "{winner} wins!")?;
                break Outcome::Winner(winner);
            }
            if self.board.is_full() {
                writeln!(out, "The board is full: draw.")?;
                break Outcome::Draw;
            }

            let mv = if self.to_move == self.human {
                match self.human_turn(input, out)? {
                    Some(mv) => mv,
                    None => break Outcome::Abandoned,
                }
            } else {
                match self.engine_turn(out)? {
                    Some(mv) => mv,
                    None => {
                        writeln!(out, "The engine has no move: draw.")?;
                        break Outcome::Draw;
                    }
                }
            };
            self.apply(mv)?;
        };
        out.flush()?;
        info!(?outcome, moves = self.history.len(), "game over");
        Ok(outcome)
    }

    /// Prompt until a valid move is read. `None` on end of input or `quit`.
    fn human_turn<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<Option<Move>> {
        let prompt = if self.board.is_empty() {
            "Your move (row col): "
        } else {
            "Your move (row1 col1 row2 col2): "
        };
        loop {
            write!(out, "{prompt}")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let line = line.trim();
            if line.eq_ignore_ascii_case("quit") {
                return Ok(None);
            }
            match parse_move(line, &self.board) {
                Ok(mv) => return Ok(Some(mv)),
                Err(e) => writeln!(out, "Invalid move: {e}")?,
            }
        }
    }

    fn engine_turn<W: Write>(&mut self, out: &mut W) -> Result<Option<Move>> {
        writeln!(out, "Engine ({}) is thinking...", self.to_move)?;
        let report = self.engine.analyze(&self.board, self.to_move);
        info!(
            player = %self.to_move,
            iterations = report.iterations,
            nodes = report.nodes,
            forced = report.forced,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "engine moved"
        );
        if let Some(mv) = report.best {
            writeln!(out, "Engine plays {mv}")?;
        }
        Ok(report.best)
    }

    fn apply(&mut self, mv: Move) -> Result<()> {
        ensure!(self.board.is_legal(mv), "illegal move {mv} for {}", self.to_move);
        self.board.apply_move(mv, self.to_move);
        self.history.push((self.to_move, mv));
        self.to_move = self.to_move.opponent();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use super::*;
    use crate::config::SearchConfig;

    fn engine() -> Mcts {
        let config = SearchConfig::for_testing()
            .with_iterations(10)
            .with_max_rollout_depth(1)
            .with_time_limit(Duration::from_secs(5));
        Mcts::with_seed(config, 7)
    }

    fn opened() -> Board {
        let mut board = Board::new();
        board.place(Point::new(9, 9), Color::Black);
        board
    }

    #[test]
    fn test_parse_opening() {
        let board = Board::new();
        assert_eq!(parse_move(" 9 9 ", &board), Ok(Move::Single(Point::new(9, 9))));
        assert_eq!(
            parse_move("9 9 9 10", &board),
            Err(InputError::WrongArity { expected: 2, got: 4 })
        );
    }

    #[test]
    fn test_parse_pair() {
        let board = opened();
        assert_eq!(
            parse_move("8 8 10 10", &board),
            Ok(Move::Pair(Point::new(8, 8), Point::new(10, 10)))
        );
        assert_eq!(
            parse_move("8 8", &board),
            Err(InputError::WrongArity { expected: 4, got: 2 })
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let board = opened();
        assert_eq!(
            parse_move("a 1 2 3", &board),
            Err(InputError::NotANumber("a".to_string()))
        );
        assert_eq!(
            parse_move("0 0 19 3", &board),
            Err(InputError::OutOfRange(Point::new(19, 3)))
        );
        assert_eq!(
            parse_move("-1 0 1 1", &board),
            Err(InputError::OutOfRange(Point::new(-1, 0)))
        );
        assert_eq!(
            parse_move("9 9 1 1", &board),
            Err(InputError::Occupied(Point::new(9, 9)))
        );
        assert_eq!(parse_move("4 4 4 4", &board), Err(InputError::Coincident));
    }

    #[test]
    fn test_quit_abandons() {
        let mut session = GameSession::new(engine(), Color::Black);
        let mut input = Cursor::new("quit\n");
        let mut out = Vec::new();
        assert_eq!(session.play(&mut input, &mut out).unwrap(), Outcome::Abandoned);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_invalid_input_is_retried() {
        let mut session = GameSession::new(engine(), Color::Black);
        let mut input = Cursor::new("hello\n30 30\n9 9\n");
        let mut out = Vec::new();
        let outcome = session.play(&mut input, &mut out).unwrap();
        assert_eq!(outcome, Outcome::Abandoned);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Invalid move").count(), 2);
        assert_eq!(session.history()[0], (Color::Black, Move::Single(Point::new(9, 9))));
        // The engine answered, then input ran out on Black's second turn.
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[1].0, Color::White);
        assert_eq!(session.to_move(), Color::Black);
    }

    #[test]
    fn test_engine_opens_for_black() {
        let mut session = GameSession::new(engine(), Color::White);
        let mut out = Vec::new();
        session.play(&mut Cursor::new(""), &mut out).unwrap();
        assert_eq!(session.board().stone_count(Color::Black), 1);
        assert!(matches!(session.history()[0].1, Move::Single(_)));
    }

    #[test]
    fn test_human_wins() {
        let mut board = Board::new();
        for c in 5..9 {
            board.place(Point::new(9, c), Color::Black);
        }
        for (r, c) in [(0, 0), (0, 1), (18, 18), (18, 17)] {
            board.place(Point::new(r, c), Color::White);
        }
        let mut session = GameSession::from_board(engine(), Color::Black, board);
        assert_eq!(session.to_move(), Color::Black);
        let mut out = Vec::new();
        let outcome = session.play(&mut Cursor::new("9 9 9 10\n"), &mut out).unwrap();
        assert_eq!(outcome, Outcome::Winner(Color::Black));
        assert!(String::from_utf8(out).unwrap().contains("Black wins!"));
    }
}
