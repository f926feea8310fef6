//! Connect6: a time-bounded Monte Carlo Tree Search engine.
//!
//! Connect6 is played on a 19x19 grid: Black opens with one stone, then
//! both sides place two stones per turn; six in a row wins.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, candidate caps, score table, search defaults
//! - [`board`] - Board state, moves and win detection
//! - [`eval`] - Static evaluation from open/blocked chain lengths
//! - [`movegen`] - Locality-pruned candidates and forced-move detection
//! - [`playout`] - Heuristic rollouts
//! - [`mcts`] - UCB1 tree search under an iteration and wall-clock budget
//! - [`transposition`] - Optional statistics shared across transpositions
//! - [`config`] - Search parameters
//! - [`game`] - Human-versus-engine console session
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use connect6::board::{Board, Color, Point};
//! use connect6::config::SearchConfig;
//! use connect6::mcts::Mcts;
//!
//! let mut board = Board::new();
//! board.place(Point::new(9, 9), Color::Black);
//!
//! let config = SearchConfig::for_testing().with_time_limit(Duration::from_millis(200));
//! let mut engine = Mcts::with_seed(config, 1);
//! let mv = engine.search(&board, Color::White).expect("a move");
//! assert!(board.is_legal(mv));
//! println!("White plays {mv}");
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod eval;
pub mod game;
pub mod mcts;
pub mod movegen;
pub mod playout;
pub mod transposition;
