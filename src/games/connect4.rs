//! # Connect 4 Game Implementation
//!
//! This module implements the classic Connect 4 board game.
//! Players take turns dropping pieces into columns, trying to get 4 pieces
//! in a row (horizontally, vertically, or diagonally).
//!
//! ## Rules
//! - Players alternate dropping pieces into columns
//! - Pieces fall to the lowest available spot in the column due to gravity
//! - First player to get 4 pieces in a row wins
//! - Game is a draw if the board fills up with no winner

use crate::error::ArenaError;
use crate::{GameRules, MoveSet, Outcome, Side};
use arena_shared::{check_line_win, for_each_window};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents a move in Connect 4
///
/// Contains the column number where a player wants to drop their piece.
/// Column numbers are 0-based indices.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Connect4Move(pub usize);

impl fmt::Display for Connect4Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Evaluation weights for Connect 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connect4Weights {
    /// Per piece in the center column (own minus opponent)
    pub center: i32,
    /// Per window holding `line_size - 1` own pieces and one empty cell
    pub three: i32,
    /// Per window holding `line_size - 2` own pieces and two empty cells
    pub two: i32,
    /// Penalty per window the opponent is one piece away from completing
    pub opponent_three: i32,
}

impl Default for Connect4Weights {
    fn default() -> Self {
        Self {
            center: 3,
            three: 5,
            two: 2,
            opponent_three: 4,
        }
    }
}

/// Represents the complete state of a Connect 4 game
///
/// The board is stored row-major with row 0 at the top; pieces settle at the
/// highest row index that is still empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect4State {
    /// The game board as a flat vector (row-major)
    board: Vec<Option<Side>>,
    /// Side to move
    to_move: Side,
    /// Board width (number of columns)
    width: usize,
    /// Board height (number of rows)
    height: usize,
    /// Number of pieces needed in a row to win
    line_size: usize,
    /// Last move made, if any (row, column)
    last_move: Option<(usize, usize)>,
    weights: Connect4Weights,
}

impl fmt::Display for Connect4State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.height {
            for c in 0..self.width {
                let symbol = match self.board[r * self.width + c] {
                    Some(Side::One) => "X",
                    Some(Side::Two) => "O",
                    None => ".",
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        for c in 0..self.width {
            write!(f, "{} ", c % 10)?;
        }
        writeln!(f)
    }
}

impl GameRules for Connect4State {
    type Move = Connect4Move;

    fn side_to_move(&self) -> Side {
        self.to_move
    }

    fn legal_moves(&self, _side: Side) -> MoveSet<Self::Move> {
        MoveSet {
            simple: (0..self.width)
                .filter(|&c| self.board[c].is_none())
                .map(Connect4Move)
                .collect(),
            captures: Vec::new(),
        }
    }

    fn apply(&self, mv: &Self::Move, side: Side) -> Self {
        let mut next = self.clone();
        let row = self.landing_row(mv.0);
        debug_assert!(row.is_some(), "column {} is full or out of range", mv.0);
        if let Some(r) = row {
            next.board[r * self.width + mv.0] = Some(side);
            next.last_move = Some((r, mv.0));
        }
        next.to_move = side.opponent();
        next
    }

    fn evaluate(&self, side: Side) -> i32 {
        let w = &self.weights;
        let own = Some(side);
        let other = Some(side.opponent());

        let center = self.width / 2;
        let mut score = 0;
        for r in 0..self.height {
            match self.board[r * self.width + center] {
                Some(s) if s == side => score += w.center,
                Some(_) => score -= w.center,
                None => {}
            }
        }

        let line = self.line_size;
        for_each_window(
            &self.board,
            self.width,
            self.height,
            line,
            &own,
            &other,
            |mine, theirs, empty| {
                if theirs == 0 && mine + 1 == line && empty == 1 {
                    score += w.three;
                } else if theirs == 0 && mine + 2 == line && empty == 2 {
                    score += w.two;
                } else if mine == 0 && theirs + 1 == line && empty == 1 {
                    score -= w.opponent_three;
                }
            },
        );
        score
    }

    fn outcome(&self) -> Option<Outcome> {
        for side in [Side::One, Side::Two] {
            if check_line_win(&self.board, self.width, self.height, &Some(side), self.line_size) {
                return Some(Outcome::Win(side));
            }
        }
        if self.board[..self.width].iter().all(Option::is_some) {
            return Some(Outcome::Draw);
        }
        None
    }

    fn piece_count(&self) -> usize {
        self.board.iter().filter(|c| c.is_some()).count()
    }
}

impl Connect4State {
    /// Creates a new Connect 4 game with the specified configuration
    pub fn new(width: usize, height: usize, line_size: usize) -> Self {
        Self {
            board: vec![None; width * height],
            to_move: Side::One,
            width,
            height,
            line_size,
            last_move: None,
            weights: Connect4Weights::default(),
        }
    }

    /// Standard 7 wide, 6 high, four in a row.
    pub fn standard() -> Self {
        Self::new(7, 6, 4)
    }

    pub fn with_weights(mut self, weights: Connect4Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Builds a position from text rows, top row first.
    ///
    /// `X` is side one, `O` side two, `.` empty. Line size is 4.
    pub fn from_rows(rows: &[&str], to_move: Side) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut state = Self::new(width, height, 4);
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().enumerate() {
                state.board[r * width + c] = match ch {
                    'X' => Some(Side::One),
                    'O' => Some(Side::Two),
                    _ => None,
                };
            }
        }
        state.to_move = to_move;
        state
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Gets the number of pieces needed in a row to win
    pub fn line_size(&self) -> usize {
        self.line_size
    }

    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Side> {
        self.board[row * self.width + col]
    }

    /// Row a piece dropped into `col` would land on, if the column has room.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if col >= self.width {
            return None;
        }
        (0..self.height).rev().find(|&r| self.board[r * self.width + col].is_none())
    }

    /// Checks if a move is legal in the current game state
    ///
    /// A move is legal if the column is within bounds and the top row
    /// of that column is empty (pieces can be dropped).
    pub fn is_legal(&self, mv: &Connect4Move) -> bool {
        mv.0 < self.width && self.board[mv.0].is_none()
    }
}

impl FromStr for Connect4Move {
    type Err = ArenaError;

    /// Parses a column number, e.g. `"3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c = s.trim().parse::<usize>().map_err(|e| ArenaError::MoveParse {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Connect4Move(c))
    }
}
