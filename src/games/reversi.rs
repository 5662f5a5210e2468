//! # Reversi (Othello) Game Implementation
//!
//! Players take turns placing discs on an NxN board, with the goal of having
//! the most discs of their color when neither side can move.
//!
//! ## Rules
//! - A disc must "sandwich" at least one straight run of opponent discs
//!   between itself and another disc of the mover's color
//! - All sandwiched discs are flipped to the mover's color
//! - A player with no legal move passes
//! - The game ends when neither player can move; more discs wins
//!
//! Every legal move flips something, so moves are reported as captures and
//! each one carries the exact list of discs it flips.

use crate::error::ArenaError;
use crate::{GameRules, MoveSet, Outcome, Side};
use arena_shared::{step, DIRECTIONS_8};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A disc placement together with the discs it flips.
///
/// Two moves on the same cell of the same board always carry the same flips,
/// so equality on the whole struct behaves like equality on the cell.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ReversiMove {
    pub row: usize,
    pub col: usize,
    pub flips: Vec<(usize, usize)>,
}

impl ReversiMove {
    pub fn cell(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

impl fmt::Display for ReversiMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// A cell typed by the user: `"row,col"`. Resolved against the legal moves
/// of the current board to obtain the full [`ReversiMove`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ReversiCell(pub usize, pub usize);

impl FromStr for ReversiCell {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason: String| ArenaError::MoveParse {
            input: s.to_string(),
            reason,
        };
        let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
        if parts.len() != 2 {
            return Err(err("expected format: row,col".to_string()));
        }
        let r = parts[0].parse::<usize>().map_err(|e| err(e.to_string()))?;
        let c = parts[1].parse::<usize>().map_err(|e| err(e.to_string()))?;
        Ok(ReversiCell(r, c))
    }
}

/// Evaluation weights for Reversi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReversiWeights {
    /// Per disc of difference
    pub disc: i32,
    /// Multiplier on the positional table sum
    pub position: i32,
    /// Per legal move of difference
    pub mobility: i32,
    /// Per corner of difference, on top of the table
    pub corner: i32,
}

impl Default for ReversiWeights {
    fn default() -> Self {
        Self {
            disc: 1,
            position: 1,
            mobility: 5,
            corner: 25,
        }
    }
}

/// Static value of a cell, from the classic 8x8 table:
///
/// ```text
/// 100 -20  10   5   5  10 -20 100
/// -20 -50  -2  -2  -2  -2 -50 -20
///  10  -2  -1  -1  -1  -1  -2  10
///   5  -2  -1  -1  -1  -1  -2   5
/// ```
///
/// The value depends only on how far the cell is from the nearest edges, so
/// the same classes work for any board size.
pub fn position_weight(row: usize, col: usize, size: usize) -> i32 {
    let dr = row.min(size - 1 - row);
    let dc = col.min(size - 1 - col);
    let (near, far) = (dr.min(dc), dr.max(dc));
    match (near, far) {
        (0, 0) => 100,
        (0, 1) => -20,
        (1, 1) => -50,
        (0, 2) => 10,
        (0, _) => 5,
        (1, _) => -2,
        _ => -1,
    }
}

/// Represents the complete state of a Reversi game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReversiState {
    /// The game board as a 2D vector
    board: Vec<Vec<Option<Side>>>,
    /// Side to move (One = Black, Two = White)
    to_move: Side,
    /// Size of the board (NxN)
    board_size: usize,
    /// Last placement, if any
    last_move: Option<(usize, usize)>,
    weights: ReversiWeights,
}

impl fmt::Display for ReversiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for c in 0..self.board_size {
            write!(f, "{} ", c)?;
        }
        writeln!(f)?;
        for (r, row) in self.board.iter().enumerate() {
            write!(f, "{} ", r)?;
            for cell in row {
                let symbol = match cell {
                    Some(Side::One) => "B",
                    Some(Side::Two) => "W",
                    None => ".",
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl GameRules for ReversiState {
    type Move = ReversiMove;

    fn side_to_move(&self) -> Side {
        self.to_move
    }

    fn legal_moves(&self, side: Side) -> MoveSet<Self::Move> {
        let mut captures = Vec::new();
        for r in 0..self.board_size {
            for c in 0..self.board_size {
                let flips = self.flips_for(r, c, side);
                if !flips.is_empty() {
                    captures.push(ReversiMove { row: r, col: c, flips });
                }
            }
        }
        MoveSet {
            simple: Vec::new(),
            captures,
        }
    }

    fn apply(&self, mv: &Self::Move, side: Side) -> Self {
        debug_assert!(self.board[mv.row][mv.col].is_none(), "cell {} is occupied", mv);
        debug_assert!(!mv.flips.is_empty(), "move {} flips nothing", mv);
        let mut next = self.clone();
        next.board[mv.row][mv.col] = Some(side);
        for &(r, c) in &mv.flips {
            debug_assert_eq!(self.board[r][c], Some(side.opponent()));
            next.board[r][c] = Some(side);
        }
        next.last_move = Some((mv.row, mv.col));
        next.to_move = side.opponent();
        next
    }

    fn evaluate(&self, side: Side) -> i32 {
        let w = &self.weights;
        let n = self.board_size;
        let mut discs = 0;
        let mut position = 0;
        let mut corners = 0;
        for r in 0..n {
            for c in 0..n {
                let sign = match self.board[r][c] {
                    Some(s) if s == side => 1,
                    Some(_) => -1,
                    None => continue,
                };
                discs += sign;
                position += sign * position_weight(r, c, n);
                if (r == 0 || r == n - 1) && (c == 0 || c == n - 1) {
                    corners += sign;
                }
            }
        }
        let mobility = self.legal_moves(side).len() as i32
            - self.legal_moves(side.opponent()).len() as i32;
        w.disc * discs + w.position * position + w.mobility * mobility + w.corner * corners
    }

    fn outcome(&self) -> Option<Outcome> {
        if self.has_any_move(Side::One) || self.has_any_move(Side::Two) {
            return None;
        }
        let (one, two) = self.disc_counts();
        Some(if one > two {
            Outcome::Win(Side::One)
        } else if two > one {
            Outcome::Win(Side::Two)
        } else {
            Outcome::Draw
        })
    }

    fn pass(&self) -> Option<Self> {
        let mut next = self.clone();
        next.to_move = self.to_move.opponent();
        Some(next)
    }

    fn piece_count(&self) -> usize {
        let (one, two) = self.disc_counts();
        one + two
    }
}

impl ReversiState {
    /// Creates a new game with the standard four-disc start.
    /// Black (side one) moves first.
    ///
    /// # Arguments
    /// * `board_size` - Size of the board (NxN); even and at least 4
    pub fn new(board_size: usize) -> Self {
        debug_assert!(board_size >= 4 && board_size % 2 == 0);
        let mut board = vec![vec![None; board_size]; board_size];
        let center = board_size / 2;
        board[center - 1][center - 1] = Some(Side::Two);
        board[center - 1][center] = Some(Side::One);
        board[center][center - 1] = Some(Side::One);
        board[center][center] = Some(Side::Two);
        ReversiState {
            board,
            to_move: Side::One,
            board_size,
            last_move: None,
            weights: ReversiWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: ReversiWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Builds a position from text rows: `B` side one, `W` side two, `.` empty.
    pub fn from_rows(rows: &[&str], to_move: Side) -> Self {
        let board_size = rows.len();
        let board = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|ch| match ch {
                        'B' => Some(Side::One),
                        'W' => Some(Side::Two),
                        _ => None,
                    })
                    .collect()
            })
            .collect();
        ReversiState {
            board,
            to_move,
            board_size,
            last_move: None,
            weights: ReversiWeights::default(),
        }
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Side> {
        self.board[row][col]
    }

    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    /// Disc counts as (side one, side two).
    pub fn disc_counts(&self) -> (usize, usize) {
        self.board.iter().flatten().fold((0, 0), |(one, two), cell| match cell {
            Some(Side::One) => (one + 1, two),
            Some(Side::Two) => (one, two + 1),
            None => (one, two),
        })
    }

    /// The legal move on `cell` for the side to move, if there is one.
    pub fn move_at(&self, cell: ReversiCell) -> Option<ReversiMove> {
        let ReversiCell(r, c) = cell;
        if r >= self.board_size || c >= self.board_size {
            return None;
        }
        let flips = self.flips_for(r, c, self.to_move);
        (!flips.is_empty()).then_some(ReversiMove { row: r, col: c, flips })
    }

    fn has_any_move(&self, side: Side) -> bool {
        (0..self.board_size)
            .any(|r| (0..self.board_size).any(|c| !self.flips_for(r, c, side).is_empty()))
    }

    /// Opponent discs flipped if `side` plays at `(r, c)`.
    ///
    /// Scans all 8 directions; a run counts only when it is closed by a disc
    /// of `side`. Empty when the cell is occupied or nothing would flip.
    fn flips_for(&self, r: usize, c: usize, side: Side) -> Vec<(usize, usize)> {
        let mut flips = Vec::new();
        if self.board[r][c].is_some() {
            return flips;
        }
        let n = self.board_size;
        let opponent = Some(side.opponent());

        for &(dr, dc) in DIRECTIONS_8.iter() {
            let mut line = Vec::new();
            let mut next = step(r, c, dr, dc, n, n);
            while let Some((nr, nc)) = next {
                if self.board[nr][nc] == opponent {
                    line.push((nr, nc));
                } else {
                    if self.board[nr][nc] == Some(side) {
                        flips.extend_from_slice(&line);
                    }
                    break;
                }
                next = step(nr, nc, dr, dc, n, n);
            }
        }
        flips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_moves() {
        let game = ReversiState::new(8);
        let moves = game.legal_moves(Side::One).into_legal();
        let mut cells: Vec<_> = moves.iter().map(|m| m.cell()).collect();
        cells.sort();
        assert_eq!(cells, vec![(2, 3), (3, 2), (4, 5), (5, 4)]);
        for mv in &moves {
            assert_eq!(mv.flips.len(), 1);
        }
    }

    #[test]
    fn test_apply_flips_and_keeps_input() {
        let game = ReversiState::new(8);
        let mv = game.move_at(ReversiCell(2, 3)).unwrap();
        assert_eq!(mv.flips, vec![(3, 3)]);
        let after = game.apply(&mv, Side::One);
        assert_eq!(after.cell(2, 3), Some(Side::One));
        assert_eq!(after.cell(3, 3), Some(Side::One));
        assert_eq!(after.disc_counts(), (4, 1));
        assert_eq!(after.side_to_move(), Side::Two);
        assert_eq!(game.disc_counts(), (2, 2));
    }

    #[test]
    fn test_flips_in_several_directions() {
        let game = ReversiState::from_rows(
            &[
                "......",
                ".BBB..",
                ".BWW..",
                ".BW...",
                "......",
                "......",
            ],
            Side::One,
        );
        let mv = game.move_at(ReversiCell(3, 3)).unwrap();
        let mut flips = mv.flips.clone();
        flips.sort();
        // Up the column, diagonally up-left and along the row.
        assert_eq!(flips, vec![(2, 2), (2, 3), (3, 2)]);
    }

    #[test]
    fn test_occupied_or_unflanked_cell_is_illegal() {
        let game = ReversiState::new(6);
        assert!(game.move_at(ReversiCell(2, 2)).is_none());
        assert!(game.move_at(ReversiCell(0, 0)).is_none());
    }

    #[test]
    fn test_pass_when_blocked() {
        // White has no move, Black still does.
        let game = ReversiState::from_rows(&["BW..", "....", "....", "...."], Side::Two);
        assert!(game.legal_moves(Side::Two).is_empty());
        assert!(!game.legal_moves(Side::One).is_empty());
        assert_eq!(game.outcome(), None);
        let passed = game.pass().unwrap();
        assert_eq!(passed.side_to_move(), Side::One);
    }

    #[test]
    fn test_game_over_by_count() {
        let game = ReversiState::from_rows(&["BBBB", "BBBB", "BBWW", "WWWW"], Side::One);
        assert_eq!(game.outcome(), Some(Outcome::Win(Side::One)));
        let drawn = ReversiState::from_rows(&["BBBB", "BBBB", "WWWW", "WWWW"], Side::One);
        assert_eq!(drawn.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn test_position_weights_scale() {
        assert_eq!(position_weight(0, 0, 8), 100);
        assert_eq!(position_weight(7, 6, 8), -20);
        assert_eq!(position_weight(1, 1, 8), -50);
        assert_eq!(position_weight(0, 3, 8), 5);
        assert_eq!(position_weight(3, 3, 8), -1);
        assert_eq!(position_weight(5, 5, 6), 100);
        assert_eq!(position_weight(4, 4, 6), -50);
    }

    #[test]
    fn test_corner_scores_high() {
        let game = ReversiState::from_rows(
            &[
                "......",
                ".W....",
                "..W...",
                "...B..",
                "......",
                "......",
            ],
            Side::One,
        );
        let corner = game.move_at(ReversiCell(0, 0)).unwrap();
        let after = game.apply(&corner, Side::One);
        assert!(after.evaluate(Side::One) > game.evaluate(Side::One));
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!("3, 4".parse::<ReversiCell>().unwrap(), ReversiCell(3, 4));
        assert!("3".parse::<ReversiCell>().is_err());
    }
}
