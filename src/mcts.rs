//! Monte Carlo Tree Search (MCTS) for Connect6.
//!
//! This module implements MCTS with:
//! - A forced-move pre-check (take a win, otherwise block the opponent's)
//! - UCB1 for node selection
//! - Uniformly random expansion of untried candidate moves
//! - Heuristic rollouts from [`crate::playout`]
//! - Optional statistics sharing through a [`TranspositionTable`]
//!
//! The tree is an index-addressed arena: nodes live in one `Vec` and refer
//! to their parent and children by [`NodeId`]. Each node applies one whole
//! turn (one or two stones); the turn-phase counter tracks how many stones
//! of the current turn have been placed and wraps to 0 when a turn completes.
//! A fresh tree is built for every search and dropped when it returns.

use std::time::{Duration, Instant};

use fastrand::Rng;
use tracing::{debug, trace};

use crate::board::{Board, Color, Move};
use crate::config::SearchConfig;
use crate::movegen::{find_blocking_move, find_pair_winning_move, smart_moves};
use crate::playout::rollout;
use crate::transposition::TranspositionTable;

/// Index of a node in the search arena.
pub type NodeId = usize;

/// A node in the MCTS search tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Board after `mv` was played
    pub board: Board,
    /// Parent node (`None` for the root); used for traversal only
    pub parent: Option<NodeId>,
    /// Expanded children
    pub children: Vec<NodeId>,
    /// Number of visits
    pub visits: u32,
    /// Accumulated reward for `player` (winrate = wins / visits)
    pub wins: f64,
    /// Candidate moves not yet expanded
    pub untried: Vec<Move>,
    /// Move that produced this node (`None` for the root)
    pub mv: Option<Move>,
    /// Player who made `mv`
    pub player: Color,
    /// Player to act at this node
    pub to_move: Color,
    /// Stones placed so far in the current turn, 0 once the turn is complete.
    ///
    /// Nodes apply whole turns, so this is 0 after the opening single and
    /// after every pair. It is 1 only when a lone stone is played on a
    /// non-empty board, which happens when a single empty cell is left.
    pub phase: u8,
    /// Color with six in a row on `board`, if any
    pub winner: Option<Color>,
    /// Board fingerprint, kept only when transpositions are enabled
    pub fingerprint: Option<String>,
}

impl SearchNode {
    fn root(board: Board, to_move: Color, untried: Vec<Move>) -> Self {
        let winner = board.winner();
        Self {
            board,
            parent: None,
            children: Vec::new(),
            visits: 0,
            wins: 0.0,
            untried: if winner.is_some() { Vec::new() } else { untried },
            mv: None,
            player: to_move.opponent(),
            to_move,
            phase: 0,
            winner,
            fingerprint: None,
        }
    }

    /// Winrate from the point of view of the player who moved into this node.
    #[inline]
    pub fn winrate(&self) -> f64 {
        if self.visits > 0 {
            self.wins / self.visits as f64
        } else {
            0.0
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }
}

/// Convert a budget in seconds to a [`Duration`].
///
/// NaN and negative budgets become zero; infinite or out-of-range ones
/// saturate to [`Duration::MAX`], which means no time limit.
pub fn budget_from_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Advance the turn-phase counter by `stones` placements against a turn of
/// `quota` stones. Returns the new phase and whether the turn completed.
pub fn advance_phase(phase: u8, stones: usize, quota: usize) -> (u8, bool) {
    let placed = phase as usize + stones;
    if placed >= quota {
        (0, true)
    } else {
        (placed as u8, false)
    }
}

/// UCB1 priority of a child; unvisited children come first.
#[inline]
pub fn ucb1(winrate: f64, visits: u32, parent_visits: u32, exploration: f64) -> f64 {
    if visits == 0 {
        return f64::INFINITY;
    }
    winrate + exploration * ((parent_visits as f64).ln() / visits as f64).sqrt()
}

/// Arena of search nodes; the root is always node 0.
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    pub fn new(board: Board, to_move: Color, untried: Vec<Move>) -> Self {
        Self {
            nodes: vec![SearchNode::root(board, to_move, untried)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        0
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id]
    }

    /// Number of nodes, root included. Never 0.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate `node` as the newest child of its parent.
    fn add_child(&mut self, node: SearchNode) -> NodeId {
        let id = self.nodes.len();
        if let Some(parent) = node.parent {
            self.nodes[parent].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    /// The child of `id` with the highest UCB1 score.
    ///
    /// With a transposition table, a child's winrate is taken from the
    /// table whenever the table has seen its position more often.
    pub fn select_child(
        &self,
        id: NodeId,
        exploration: f64,
        table: Option<&TranspositionTable>,
    ) -> Option<NodeId> {
        let parent = self.get(id);
        let score = |child: &SearchNode| {
            let shared = table
                .zip(child.fingerprint.as_deref())
                .and_then(|(t, fp)| t.get(fp))
                .filter(|e| e.visits > child.visits)
                .and_then(|e| e.winrate());
            ucb1(
                shared.unwrap_or_else(|| child.winrate()),
                child.visits,
                parent.visits,
                exploration,
            )
        };
        parent.children.iter().copied().max_by(|&a, &b| {
            score(self.get(a))
                .partial_cmp(&score(self.get(b)))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Walk from `leaf` to the root adding one visit and the rollout result.
    ///
    /// `result` is from `root_player`'s side; each node is credited from the
    /// side of the player who moved into it.
    pub fn backpropagate(
        &mut self,
        leaf: NodeId,
        result: f64,
        root_player: Color,
        mut table: Option<&mut TranspositionTable>,
    ) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &mut self.nodes[id];
            let reward = if node.player == root_player {
                result
            } else {
                1.0 - result
            };
            node.visits += 1;
            node.wins += reward;
            if let (Some(t), Some(fp)) = (table.as_deref_mut(), node.fingerprint.as_deref()) {
                t.record(fp, reward);
            }
            current = node.parent;
        }
    }
}

/// Summary of one search.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Chosen move; `None` when there is nothing to play.
    pub best: Option<Move>,
    /// Completed iterations.
    pub iterations: usize,
    /// Nodes in the tree when the search stopped.
    pub nodes: usize,
    pub elapsed: Duration,
    /// The move came from the forced-win/forced-block pre-check.
    pub forced: bool,
}

/// Time-bounded MCTS engine.
///
/// Owns its random generator (seeded once, at construction) and the
/// transposition table, both of which persist across searches.
pub struct Mcts {
    config: SearchConfig,
    rng: Rng,
    table: TranspositionTable,
}

impl Mcts {
    /// Engine seeded from system entropy.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_rng(config, Rng::new())
    }

    /// Reproducible engine.
    pub fn with_seed(config: SearchConfig, seed: u64) -> Self {
        Self::with_rng(config, Rng::with_seed(seed))
    }

    pub fn with_rng(config: SearchConfig, rng: Rng) -> Self {
        Self {
            config,
            rng,
            table: TranspositionTable::new(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    pub fn transpositions(&self) -> &TranspositionTable {
        &self.table
    }

    /// Choose a move for `player` on `board`.
    pub fn search(&mut self, board: &Board, player: Color) -> Option<Move> {
        self.analyze(board, player).best
    }

    /// [`Mcts::search`] with explicit parameters for this call only.
    pub fn search_with(
        &mut self,
        board: &Board,
        player: Color,
        iterations: usize,
        exploration: f64,
        max_rollout_depth: usize,
        time_limit_secs: f64,
    ) -> Option<Move> {
        let limit = budget_from_secs(time_limit_secs);
        let saved = self.config.clone();
        self.config = saved
            .clone()
            .with_iterations(iterations)
            .with_exploration(exploration)
            .with_max_rollout_depth(max_rollout_depth)
            .with_time_limit(limit);
        let best = self.search(board, player);
        self.config = saved;
        best
    }

    /// Run a full search and report how it went.
    pub fn analyze(&mut self, board: &Board, player: Color) -> SearchReport {
        let start = Instant::now();
        // `None` when the budget runs past what `Instant` can represent.
        let deadline = start.checked_add(self.config.time_limit);

        if board.winner().is_none() {
            if let Some(mv) = forced_move(board, player) {
                debug!(%player, %mv, "forced move");
                return SearchReport {
                    best: Some(mv),
                    iterations: 0,
                    nodes: 0,
                    elapsed: start.elapsed(),
                    forced: true,
                };
            }
        }

        let mut tree = SearchTree::new(board.clone(), player, smart_moves(board, player));
        let mut iterations = 0;
        while iterations < self.config.iterations {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
            let leaf = self.select(&tree);
            let node = if tree.get(leaf).untried.is_empty() {
                leaf
            } else {
                self.expand(&mut tree, leaf)
            };

            let result = {
                let n = tree.get(node);
                match n.winner {
                    Some(winner) if winner == player => 1.0,
                    Some(_) => 0.0,
                    None => rollout(
                        &n.board,
                        n.to_move,
                        player,
                        self.config.max_rollout_depth,
                        self.config.rollout_noise,
                        &mut self.rng,
                    ),
                }
            };
            let table = self.config.use_transpositions.then_some(&mut self.table);
            tree.backpropagate(node, result, player, table);
            iterations += 1;
            trace!(iteration = iterations, node, result, "iteration done");
        }

        let best = best_move(&tree, player);
        let elapsed = start.elapsed();
        log_children(&tree);
        debug!(
            %player,
            iterations,
            nodes = tree.node_count(),
            elapsed_ms = elapsed.as_millis() as u64,
            best = ?best,
            "search finished"
        );
        SearchReport {
            best,
            iterations,
            nodes: tree.node_count(),
            elapsed,
            forced: false,
        }
    }

    /// Descend while the current node is fully expanded and has children.
    fn select(&self, tree: &SearchTree) -> NodeId {
        let table = self.config.use_transpositions.then_some(&self.table);
        let mut id = tree.root();
        loop {
            let node = tree.get(id);
            if !node.untried.is_empty() || node.children.is_empty() {
                return id;
            }
            match tree.select_child(id, self.config.exploration, table) {
                Some(child) => id = child,
                None => return id,
            }
        }
    }

    /// Expand one untried move of `id`, chosen uniformly at random.
    fn expand(&mut self, tree: &mut SearchTree, id: NodeId) -> NodeId {
        let parent = tree.get_mut(id);
        let idx = self.rng.usize(..parent.untried.len());
        let mv = parent.untried.swap_remove(idx);

        let actor = parent.to_move;
        let quota = if parent.board.is_empty() { 1 } else { 2 };
        let (phase, turn_done) = advance_phase(parent.phase, mv.stones(), quota);
        let next = if turn_done { actor.opponent() } else { actor };

        let mut board = parent.board.clone();
        board.apply_move(mv, actor);
        let winner = board.wins_with(mv, actor).then_some(actor);
        let untried = if winner.is_some() {
            Vec::new()
        } else {
            smart_moves(&board, next)
        };
        let fingerprint = self.config.use_transpositions.then(|| board.fingerprint());

        tree.add_child(SearchNode {
            board,
            parent: Some(id),
            children: Vec::new(),
            visits: 0,
            wins: 0.0,
            untried,
            mv: Some(mv),
            player: actor,
            to_move: next,
            phase,
            winner,
            fingerprint,
        })
    }
}

/// Win now if possible, otherwise stop the opponent's next-turn win.
fn forced_move(board: &Board, player: Color) -> Option<Move> {
    if board.is_empty() {
        return None;
    }
    find_pair_winning_move(board, player).or_else(|| find_blocking_move(board, player))
}

/// A completed-turn child that wins outright, else the most visited child,
/// else the first candidate if nothing was expanded.
fn best_move(tree: &SearchTree, root_player: Color) -> Option<Move> {
    let root = tree.get(tree.root());
    let children = || root.children.iter().map(|&id| tree.get(id));

    if let Some(win) = children().find(|c| c.phase == 0 && c.winner == Some(root_player)) {
        return win.mv;
    }
    children()
        .max_by_key(|c| c.visits)
        .and_then(|c| c.mv)
        .or_else(|| root.untried.first().copied())
}

fn log_children(tree: &SearchTree) {
    for &id in &tree.get(tree.root()).children {
        let child = tree.get(id);
        if let Some(mv) = child.mv {
            trace!(%mv, v = child.visits, w = child.wins, wr = child.winrate(), "root child");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;

    fn quick() -> SearchConfig {
        SearchConfig::for_testing()
            .with_iterations(30)
            .with_max_rollout_depth(2)
            .with_time_limit(Duration::from_secs(30))
    }

    #[test]
    fn test_advance_phase() {
        assert_eq!(advance_phase(0, 1, 2), (1, false));
        assert_eq!(advance_phase(1, 1, 2), (0, true));
        assert_eq!(advance_phase(0, 2, 2), (0, true));
        assert_eq!(advance_phase(0, 1, 1), (0, true));
    }

    #[test]
    fn test_ucb1() {
        assert_eq!(ucb1(0.0, 0, 10, 1.414), f64::INFINITY);
        assert_eq!(ucb1(0.5, 4, 1, 1.414), 0.5);
        assert!(ucb1(0.5, 1, 10, 1.414) > ucb1(0.5, 5, 10, 1.414));
        assert_eq!(ucb1(0.7, 3, 10, 0.0), 0.7);
    }

    #[test]
    fn test_backpropagate_credits_mover() {
        let board = Board::new();
        let mut tree = SearchTree::new(board.clone(), Color::Black, Vec::new());
        let child = tree.add_child(SearchNode {
            board,
            parent: Some(0),
            children: Vec::new(),
            visits: 0,
            wins: 0.0,
            untried: Vec::new(),
            mv: Some(Move::Single(Point::new(9, 9))),
            player: Color::Black,
            to_move: Color::White,
            phase: 0,
            winner: None,
            fingerprint: Some("x".to_string()),
        });
        let mut table = TranspositionTable::new();
        tree.backpropagate(child, 1.0, Color::Black, Some(&mut table));
        assert_eq!(tree.get(child).visits, 1);
        assert_eq!(tree.get(child).wins, 1.0);
        assert_eq!(tree.get(0).visits, 1);
        assert_eq!(tree.get(0).wins, 0.0, "root is credited to White");
        assert_eq!(table.get("x").map(|e| e.visits), Some(1));
        assert_eq!(tree.get(0).children, vec![child]);
    }

    #[test]
    fn test_search_opening_is_single_near_center() {
        let mut engine = Mcts::with_seed(quick(), 42);
        let report = engine.analyze(&Board::new(), Color::Black);
        assert!(!report.forced);
        assert!(report.iterations > 0);
        match report.best {
            Some(Move::Single(p)) => {
                assert!((7..=11).contains(&p.row) && (7..=11).contains(&p.col));
            }
            other => panic!("expected single opening stone, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_budget_falls_back_to_first_candidate() {
        let mut board = Board::new();
        board.place(Point::new(9, 9), Color::Black);
        let mut engine = Mcts::with_seed(quick().with_time_limit(Duration::ZERO), 1);
        let report = engine.analyze(&board, Color::White);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.best, smart_moves(&board, Color::White).first().copied());
    }

    #[test]
    fn test_finished_game_has_no_move() {
        let mut board = Board::new();
        for c in 0..6 {
            board.place(Point::new(0, c), Color::Black);
        }
        let mut engine = Mcts::with_seed(quick(), 2);
        assert_eq!(engine.search(&board, Color::White), None);
    }

    #[test]
    fn test_search_takes_forced_win() {
        let mut board = Board::new();
        for c in 6..10 {
            board.place(Point::new(9, c), Color::Black);
        }
        for (r, c) in [(3, 3), (3, 4), (15, 15)] {
            board.place(Point::new(r, c), Color::White);
        }
        let mut engine = Mcts::with_seed(quick(), 3);
        let report = engine.analyze(&board, Color::Black);
        assert!(report.forced);
        let mv = report.best.unwrap();
        board.apply_move(mv, Color::Black);
        assert!(board.check_win(Color::Black));
    }

    #[test]
    fn test_seeded_search_is_reproducible() {
        let mut board = Board::new();
        board.place(Point::new(9, 9), Color::Black);
        let a = Mcts::with_seed(quick(), 99).search(&board, Color::White);
        let b = Mcts::with_seed(quick(), 99).search(&board, Color::White);
        assert_eq!(a, b);
    }

    #[test]
    fn test_transpositions_are_recorded() {
        let mut board = Board::new();
        board.place(Point::new(9, 9), Color::Black);
        let mut engine = Mcts::with_seed(quick().with_transpositions(true), 4);
        let report = engine.analyze(&board, Color::White);
        assert!(report.best.is_some());
        assert!(!engine.transpositions().is_empty());
    }

    #[test]
    fn test_budget_from_secs() {
        assert_eq!(budget_from_secs(f64::NAN), Duration::ZERO);
        assert_eq!(budget_from_secs(-1.0), Duration::ZERO);
        assert_eq!(budget_from_secs(0.0), Duration::ZERO);
        assert_eq!(budget_from_secs(1.5), Duration::from_millis(1500));
        assert_eq!(budget_from_secs(f64::INFINITY), Duration::MAX);
        assert_eq!(budget_from_secs(1e30), Duration::MAX);
    }

    #[test]
    fn test_huge_time_limit_has_no_deadline() {
        let mut board = Board::new();
        board.place(Point::new(9, 9), Color::Black);
        let config = quick()
            .with_iterations(3)
            .with_time_limit(Duration::from_secs(u64::MAX));
        assert!(config.validate().is_ok());

        let mut engine = Mcts::with_seed(config, 8);
        let report = engine.analyze(&board, Color::White);
        assert_eq!(report.iterations, 3);
        assert!(report.best.is_some());

        let mut engine = Mcts::with_seed(quick(), 8);
        let mv = engine.search_with(&board, Color::White, 3, 1.414, 1, f64::INFINITY);
        assert!(mv.is_some_and(|mv| board.is_legal(mv)));
        assert_eq!(engine.config(), &quick(), "per-call parameters are restored");
    }

    #[test]
    fn test_lone_stone_mid_game_keeps_the_turn() {
        let mut board = Board::new();
        board.place(Point::new(9, 9), Color::Black);
        let lone = Move::Single(Point::new(0, 0));
        let mut tree = SearchTree::new(board, Color::White, vec![lone]);
        let mut engine = Mcts::with_seed(quick(), 9);

        let root = tree.root();
        let child = engine.expand(&mut tree, root);
        let node = tree.get(child);
        assert_eq!(node.mv, Some(lone));
        assert_eq!(node.phase, 1);
        assert_eq!(node.player, Color::White);
        assert_eq!(node.to_move, Color::White, "the second stone is still White's");
        assert_eq!(tree.node_count(), 2);
    }
}
