//! # Board Arena
//!
//! Adversarial search engines for two-player board games: Reversi, Checkers,
//! Nine Men's Morris and Connect Four. Every game implements [`GameRules`],
//! and a single alpha-beta searcher in [`search`] plays all of them.
//!
//! ## Flow
//! ```text
//! human move ──► legal_moves() ──► apply() ──► AlphaBeta::search() ──► apply()
//!                   (validate)                  (legal_moves + evaluate
//!                                                on board copies)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

pub mod ai_worker;
pub mod config;
pub mod error;
pub mod game_controller;
pub mod game_wrapper;
pub mod games;
pub mod search;

pub use error::{ArenaError, Result};
pub use search::{best_move, AlphaBeta, SearchLimits, SearchOutcome, StopFlag, WIN_SCORE};

/// One of the two players.
///
/// `One` always moves first. Each game maps the sides to its own piece
/// identities (Black/White, Red/Yellow, ...).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    One,
    Two,
}

impl Side {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// Index into per-side arrays: 0 for `One`, 1 for `Two`.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::One => write!(f, "one"),
            Side::Two => write!(f, "two"),
        }
    }
}

/// Final result of a finished game.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Win(Side),
    Draw,
}

/// Legal moves for one side, split by kind.
///
/// Games with mandatory capture put capturing moves in `captures`; when that
/// list is non-empty the simple moves are not legal. [`MoveSet::into_legal`]
/// applies the rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveSet<M> {
    pub simple: Vec<M>,
    pub captures: Vec<M>,
}

impl<M> Default for MoveSet<M> {
    fn default() -> Self {
        Self {
            simple: Vec::new(),
            captures: Vec::new(),
        }
    }
}

impl<M> MoveSet<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the side has no legal move at all.
    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.captures.is_empty()
    }

    /// Number of legal moves once mandatory capture is applied.
    pub fn len(&self) -> usize {
        if self.captures.is_empty() {
            self.simple.len()
        } else {
            self.captures.len()
        }
    }

    /// The legal moves: the captures if any exist, otherwise the simple moves.
    pub fn into_legal(self) -> Vec<M> {
        if self.captures.is_empty() {
            self.simple
        } else {
            self.captures
        }
    }

    /// Converts every move, keeping the simple/capture split.
    pub fn map<N, F: FnMut(M) -> N>(self, mut f: F) -> MoveSet<N> {
        MoveSet {
            simple: self.simple.into_iter().map(&mut f).collect(),
            captures: self.captures.into_iter().map(&mut f).collect(),
        }
    }
}

impl<M: PartialEq> MoveSet<M> {
    /// True if `mv` is legal under the mandatory-capture rule.
    pub fn is_legal(&self, mv: &M) -> bool {
        if self.captures.is_empty() {
            self.simple.contains(mv)
        } else {
            self.captures.contains(mv)
        }
    }
}

/// The capabilities the search engine needs from a game.
///
/// Implementations are value types: [`GameRules::apply`] returns a new state
/// and never touches `self`, so the search can explore freely on copies.
/// `Send` and `Sync` are required for the parallel root split.
pub trait GameRules: Clone + Send + Sync {
    /// The type of a move in the game.
    type Move: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync;

    /// The side whose turn it is.
    fn side_to_move(&self) -> Side;

    /// All moves `side` could make on this board.
    fn legal_moves(&self, side: Side) -> MoveSet<Self::Move>;

    /// Returns the board after `side` plays `mv`.
    ///
    /// `mv` must come from `legal_moves(side)` for this exact state. Debug
    /// builds panic on structurally impossible moves.
    fn apply(&self, mv: &Self::Move, side: Side) -> Self;

    /// Static score of the board, higher is better for `side`.
    fn evaluate(&self, side: Side) -> i32;

    /// `Some` once the game is over.
    fn outcome(&self) -> Option<Outcome>;

    fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    /// The state after the side to move passes, for games that allow it.
    fn pass(&self) -> Option<Self> {
        None
    }

    /// Pieces on the board plus pieces still waiting to be placed.
    fn piece_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Side::One.opponent(), Side::Two);
        assert_eq!(Side::Two.opponent().opponent(), Side::Two);
    }

    #[test]
    fn test_move_set_mandatory_capture() {
        let set = MoveSet {
            simple: vec![1, 2, 3],
            captures: vec![9],
        };
        assert!(set.is_legal(&9));
        assert!(!set.is_legal(&1));
        assert_eq!(set.len(), 1);
        assert_eq!(set.into_legal(), vec![9]);
    }

    #[test]
    fn test_move_set_without_captures() {
        let set: MoveSet<u8> = MoveSet {
            simple: vec![4, 5],
            captures: vec![],
        };
        assert!(set.is_legal(&5));
        assert_eq!(set.map(|m| m * 2).into_legal(), vec![8, 10]);
        assert!(MoveSet::<u8>::new().is_empty());
    }
}
