//! # Checkers Game Implementation
//!
//! 8x8 American checkers. Pieces live on the dark squares (`row + col` odd).
//!
//! ## Rules
//! - Black (side one) starts on rows 5-7 and moves toward row 0; White
//!   (side two) starts on rows 0-2 and moves toward row 7
//! - Men step and capture diagonally forward; kings in all four directions
//! - Capturing is mandatory, and a capturing piece keeps jumping while it can;
//!   each maximal chain is one move
//! - A man reaching the far row becomes a king and the chain ends there
//! - A side with no legal move loses
//! - 80 plies in a row without a capture or a man move is a draw

use crate::error::ArenaError;
use crate::{GameRules, MoveSet, Outcome, Side};
use arena_shared::step;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const BOARD_SIZE: usize = 8;

/// Plies without a capture or a man move before the game is drawn.
pub const DRAW_QUIET_PLIES: u32 = 80;

/// A board square as (row, col).
pub type Square = (usize, usize);

type Board = [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE];

const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Piece {
    Man(Side),
    King(Side),
}

impl Piece {
    pub fn side(self) -> Side {
        match self {
            Piece::Man(s) | Piece::King(s) => s,
        }
    }

    pub fn is_king(self) -> bool {
        matches!(self, Piece::King(_))
    }

    /// Diagonals this piece may move and capture along.
    fn directions(self) -> &'static [(i32, i32)] {
        match self {
            Piece::King(_) => &DIAGONALS,
            Piece::Man(Side::One) => &DIAGONALS[..2],
            Piece::Man(Side::Two) => &DIAGONALS[2..],
        }
    }

    fn symbol(self) -> char {
        match self {
            Piece::Man(Side::One) => 'b',
            Piece::King(Side::One) => 'B',
            Piece::Man(Side::Two) => 'w',
            Piece::King(Side::Two) => 'W',
        }
    }
}

/// The row on which `side`'s men are crowned.
pub fn promotion_row(side: Side) -> usize {
    match side {
        Side::One => 0,
        Side::Two => BOARD_SIZE - 1,
    }
}

fn home_row(side: Side) -> usize {
    promotion_row(side.opponent())
}

fn diagonal_step(sq: Square, dr: i32, dc: i32) -> Option<Square> {
    step(sq.0, sq.1, dr, dc, BOARD_SIZE, BOARD_SIZE)
}

/// A checkers move: the squares the piece visits and the squares it jumps.
///
/// A simple move has a two-square path and no captures. A capture chain has
/// one more path square than captured squares.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct CheckersMove {
    pub path: Vec<Square>,
    pub captured: Vec<Square>,
}

impl CheckersMove {
    pub fn from(&self) -> Square {
        self.path[0]
    }

    pub fn to(&self) -> Square {
        self.path[self.path.len() - 1]
    }

    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }
}

impl fmt::Display for CheckersMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.is_capture() { "x" } else { "-" };
        for (i, (r, c)) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", sep)?;
            }
            write!(f, "{},{}", r, c)?;
        }
        Ok(())
    }
}

/// Squares typed by the user, e.g. `"5,2-4,3"` or `"7,0x5,2x3,4"`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CheckersPath(pub Vec<Square>);

impl FromStr for CheckersPath {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason: String| ArenaError::MoveParse {
            input: s.to_string(),
            reason,
        };
        let squares = s
            .split(&['-', 'x'][..])
            .map(|part| {
                let (r, c) = part
                    .trim()
                    .split_once(',')
                    .ok_or_else(|| err("expected squares as row,col".to_string()))?;
                let r = r.trim().parse::<usize>().map_err(|e| err(e.to_string()))?;
                let c = c.trim().parse::<usize>().map_err(|e| err(e.to_string()))?;
                Ok((r, c))
            })
            .collect::<Result<Vec<_>, ArenaError>>()?;
        if squares.len() < 2 {
            return Err(err("a move needs at least two squares".to_string()));
        }
        Ok(CheckersPath(squares))
    }
}

/// What applying a move did besides moving the piece.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MoveReport {
    pub captured: Vec<Square>,
    pub promoted: bool,
}

/// Evaluation weights for checkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckersWeights {
    pub man: i32,
    pub king: i32,
    /// Per row a man has advanced from its home row
    pub advancement: i32,
    /// Per piece on the central 4x4 block
    pub center: i32,
    /// Per man still guarding its home row
    pub back_row: i32,
    /// Per legal move of difference
    pub mobility: i32,
}

impl Default for CheckersWeights {
    fn default() -> Self {
        Self {
            man: 100,
            king: 160,
            advancement: 3,
            center: 4,
            back_row: 8,
            mobility: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckersState {
    board: Board,
    to_move: Side,
    /// Plies since the last capture or man move
    quiet_plies: u32,
    weights: CheckersWeights,
}

impl fmt::Display for CheckersState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for c in 0..BOARD_SIZE {
            write!(f, "{} ", c)?;
        }
        writeln!(f)?;
        for (r, row) in self.board.iter().enumerate() {
            write!(f, "{} ", r)?;
            for cell in row {
                write!(f, "{} ", cell.map_or('.', Piece::symbol))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl GameRules for CheckersState {
    type Move = CheckersMove;

    fn side_to_move(&self) -> Side {
        self.to_move
    }

    fn legal_moves(&self, side: Side) -> MoveSet<Self::Move> {
        let mut moves = MoveSet::new();
        for (from, piece) in self.pieces(side) {
            let mut path = vec![from];
            let mut captured = Vec::new();
            collect_jumps(&self.board, from, piece, &mut path, &mut captured, &mut moves.captures);
        }
        if !moves.captures.is_empty() {
            return moves;
        }
        for (from, piece) in self.pieces(side) {
            for &(dr, dc) in piece.directions() {
                if let Some(to) = diagonal_step(from, dr, dc) {
                    if self.board[to.0][to.1].is_none() {
                        moves.simple.push(CheckersMove {
                            path: vec![from, to],
                            captured: Vec::new(),
                        });
                    }
                }
            }
        }
        moves
    }

    fn apply(&self, mv: &Self::Move, side: Side) -> Self {
        self.apply_with_report(mv, side).0
    }

    fn evaluate(&self, side: Side) -> i32 {
        let w = &self.weights;
        let mut score = 0;
        for (r, row) in self.board.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let Some(piece) = cell else { continue };
                let owner = piece.side();
                let mut value = if piece.is_king() { w.king } else { w.man };
                if !piece.is_king() {
                    value += w.advancement * r.abs_diff(home_row(owner)) as i32;
                    if r == home_row(owner) {
                        value += w.back_row;
                    }
                }
                if (2..=5).contains(&r) && (2..=5).contains(&c) {
                    value += w.center;
                }
                score += if owner == side { value } else { -value };
            }
        }
        let mobility = self.legal_moves(side).len() as i32
            - self.legal_moves(side.opponent()).len() as i32;
        score + w.mobility * mobility
    }

    fn outcome(&self) -> Option<Outcome> {
        if !self.has_any_move(self.to_move) {
            return Some(Outcome::Win(self.to_move.opponent()));
        }
        if self.quiet_plies >= DRAW_QUIET_PLIES {
            return Some(Outcome::Draw);
        }
        None
    }

    fn piece_count(&self) -> usize {
        self.board.iter().flatten().filter(|c| c.is_some()).count()
    }
}

/// Depth-first enumeration of capture chains starting from `at`.
///
/// Each branch works on its own copy of the board with the jumped piece
/// already removed, so a piece can never be captured twice. Only maximal
/// chains are emitted; a promotion ends the chain immediately.
fn collect_jumps(
    board: &Board,
    at: Square,
    piece: Piece,
    path: &mut Vec<Square>,
    captured: &mut Vec<Square>,
    out: &mut Vec<CheckersMove>,
) {
    let mut extended = false;
    for &(dr, dc) in piece.directions() {
        let Some(over) = diagonal_step(at, dr, dc) else { continue };
        let Some(land) = diagonal_step(over, dr, dc) else { continue };
        match board[over.0][over.1] {
            Some(p) if p.side() != piece.side() => {}
            _ => continue,
        }
        if board[land.0][land.1].is_some() {
            continue;
        }
        extended = true;

        let promotes = !piece.is_king() && land.0 == promotion_row(piece.side());
        let moved = if promotes { Piece::King(piece.side()) } else { piece };
        let mut next = *board;
        next[at.0][at.1] = None;
        next[over.0][over.1] = None;
        next[land.0][land.1] = Some(moved);

        path.push(land);
        captured.push(over);
        if promotes {
            out.push(CheckersMove {
                path: path.clone(),
                captured: captured.clone(),
            });
        } else {
            collect_jumps(&next, land, moved, path, captured, out);
        }
        path.pop();
        captured.pop();
    }
    if !extended && !captured.is_empty() {
        out.push(CheckersMove {
            path: path.clone(),
            captured: captured.clone(),
        });
    }
}

impl CheckersState {
    /// Standard starting position, Black (side one) to move.
    pub fn new() -> Self {
        let mut board: Board = [[None; BOARD_SIZE]; BOARD_SIZE];
        for (r, row) in board.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                if (r + c) % 2 == 0 {
                    continue;
                }
                if r < 3 {
                    *cell = Some(Piece::Man(Side::Two));
                } else if r > 4 {
                    *cell = Some(Piece::Man(Side::One));
                }
            }
        }
        Self {
            board,
            to_move: Side::One,
            quiet_plies: 0,
            weights: CheckersWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: CheckersWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Builds a position from eight text rows: `b`/`B` black man/king,
    /// `w`/`W` white man/king, anything else empty.
    pub fn from_rows(rows: &[&str; BOARD_SIZE], to_move: Side) -> Self {
        let mut board: Board = [[None; BOARD_SIZE]; BOARD_SIZE];
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().take(BOARD_SIZE).enumerate() {
                board[r][c] = match ch {
                    'b' => Some(Piece::Man(Side::One)),
                    'B' => Some(Piece::King(Side::One)),
                    'w' => Some(Piece::Man(Side::Two)),
                    'W' => Some(Piece::King(Side::Two)),
                    _ => None,
                };
            }
        }
        Self {
            board,
            to_move,
            quiet_plies: 0,
            weights: CheckersWeights::default(),
        }
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.0][sq.1]
    }

    pub fn quiet_plies(&self) -> u32 {
        self.quiet_plies
    }

    /// Applies `mv` and reports the captured squares and whether the piece
    /// was crowned.
    pub fn apply_with_report(&self, mv: &CheckersMove, side: Side) -> (Self, MoveReport) {
        let (from, to) = (mv.from(), mv.to());
        let piece = self.board[from.0][from.1];
        debug_assert!(
            piece.is_some_and(|p| p.side() == side),
            "no {} piece on {:?}",
            side,
            from
        );
        debug_assert!(
            to == from || self.board[to.0][to.1].is_none(),
            "landing square {:?} is occupied",
            to
        );
        debug_assert_eq!(mv.path.len(), mv.captured.len().max(1) + 1);

        let mut next = self.clone();
        let mut report = MoveReport {
            captured: mv.captured.clone(),
            promoted: false,
        };
        let Some(piece) = piece else {
            next.to_move = side.opponent();
            return (next, report);
        };

        next.board[from.0][from.1] = None;
        for &(r, c) in &mv.captured {
            debug_assert!(self.board[r][c].is_some_and(|p| p.side() != side));
            next.board[r][c] = None;
        }
        report.promoted = !piece.is_king() && to.0 == promotion_row(side);
        next.board[to.0][to.1] = Some(if report.promoted { Piece::King(side) } else { piece });

        next.quiet_plies = if mv.is_capture() || !piece.is_king() {
            0
        } else {
            self.quiet_plies + 1
        };
        next.to_move = side.opponent();
        (next, report)
    }

    /// The legal move for the side to move that follows `path`.
    ///
    /// A two-square path may also name a whole capture chain by its start
    /// and end squares when only one chain connects them.
    pub fn move_for_path(&self, path: &CheckersPath) -> Option<CheckersMove> {
        let legal = self.legal_moves(self.to_move).into_legal();
        if let Some(mv) = legal.iter().find(|m| m.path == path.0) {
            return Some(mv.clone());
        }
        if path.0.len() == 2 {
            let mut matching = legal
                .into_iter()
                .filter(|m| m.from() == path.0[0] && m.to() == path.0[1]);
            let first = matching.next()?;
            if matching.next().is_none() {
                return Some(first);
            }
        }
        None
    }

    fn pieces(&self, side: Side) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.board.iter().enumerate().flat_map(move |(r, row)| {
            row.iter().enumerate().filter_map(move |(c, cell)| match cell {
                Some(p) if p.side() == side => Some(((r, c), *p)),
                _ => None,
            })
        })
    }

    /// Cheap check for at least one step or single jump.
    fn has_any_move(&self, side: Side) -> bool {
        self.pieces(side).any(|(from, piece)| {
            piece.directions().iter().any(|&(dr, dc)| match diagonal_step(from, dr, dc) {
                Some(to) => match self.board[to.0][to.1] {
                    None => true,
                    Some(p) if p.side() != side => {
                        diagonal_step(to, dr, dc)
                            .is_some_and(|land| self.board[land.0][land.1].is_none())
                    }
                    Some(_) => false,
                },
                None => false,
            })
        })
    }
}

impl Default for CheckersState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY: &str = "........";

    #[test]
    fn test_opening_position() {
        let game = CheckersState::new();
        assert_eq!(game.piece_count(), 24);
        let moves = game.legal_moves(Side::One);
        assert!(moves.captures.is_empty());
        assert_eq!(moves.simple.len(), 7);
        assert_eq!(game.legal_moves(Side::Two).simple.len(), 7);
    }

    #[test]
    fn test_capture_is_mandatory() {
        let game = CheckersState::from_rows(
            &[EMPTY, EMPTY, EMPTY, EMPTY, "...w....", "..b.....", EMPTY, ".....b.."],
            Side::One,
        );
        let moves = game.legal_moves(Side::One);
        assert_eq!(moves.captures.len(), 1);
        assert!(moves.simple.is_empty());
        let legal = moves.into_legal();
        assert_eq!(legal[0].path, vec![(5, 2), (3, 4)]);
        assert_eq!(legal[0].captured, vec![(4, 3)]);
    }

    #[test]
    fn test_triple_jump_is_one_move() {
        let game = CheckersState::from_rows(
            &[EMPTY, EMPTY, ".....w..", EMPTY, "...w....", EMPTY, ".w......", "b......."],
            Side::One,
        );
        let legal = game.legal_moves(Side::One).into_legal();
        assert_eq!(legal.len(), 1);
        assert_eq!(legal[0].path, vec![(7, 0), (5, 2), (3, 4), (1, 6)]);
        assert_eq!(legal[0].captured.len(), 3);

        let after = game.apply(&legal[0], Side::One);
        assert_eq!(after.piece_count(), 1);
        assert_eq!(after.piece_at((1, 6)), Some(Piece::Man(Side::One)));
    }

    #[test]
    fn test_branching_chains_are_distinct_moves() {
        // After the first jump the man can continue left or right.
        let game = CheckersState::from_rows(
            &[EMPTY, EMPTY, EMPTY, "....w.w.", EMPTY, "....w...", "...b....", EMPTY],
            Side::One,
        );
        let mut ends: Vec<Square> = game
            .legal_moves(Side::One)
            .into_legal()
            .iter()
            .map(|m| m.to())
            .collect();
        ends.sort();
        assert_eq!(ends, vec![(2, 3), (2, 7)]);
    }

    #[test]
    fn test_promotion_ends_the_chain() {
        // The crowned king could jump (1,4) next, but the move stops on (0,3).
        let game = CheckersState::from_rows(
            &[EMPTY, "..w.w...", ".b......", EMPTY, EMPTY, EMPTY, EMPTY, EMPTY],
            Side::One,
        );
        let legal = game.legal_moves(Side::One).into_legal();
        assert_eq!(legal.len(), 1);
        assert_eq!(legal[0].path, vec![(2, 1), (0, 3)]);

        let (after, report) = game.apply_with_report(&legal[0], Side::One);
        assert!(report.promoted);
        assert_eq!(report.captured, vec![(1, 2)]);
        assert_eq!(after.piece_at((0, 3)), Some(Piece::King(Side::One)));
        assert_eq!(after.piece_at((1, 4)), Some(Piece::Man(Side::Two)));
    }

    #[test]
    fn test_king_moves_backwards() {
        let game = CheckersState::from_rows(
            &[EMPTY, EMPTY, EMPTY, EMPTY, "...B....", EMPTY, EMPTY, "w......."],
            Side::One,
        );
        assert_eq!(game.legal_moves(Side::One).into_legal().len(), 4);
    }

    #[test]
    fn test_no_moves_loses() {
        let game = CheckersState::from_rows(
            &[EMPTY, EMPTY, EMPTY, EMPTY, EMPTY, EMPTY, EMPTY, "w......."],
            Side::One,
        );
        assert_eq!(game.outcome(), Some(Outcome::Win(Side::Two)));

        // Blocked man: (7,0) cannot step to (6,1), and (5,2) is occupied.
        let blocked = CheckersState::from_rows(
            &[EMPTY, EMPTY, EMPTY, EMPTY, EMPTY, "..w.....", ".w......", "b......."],
            Side::One,
        );
        assert!(blocked.legal_moves(Side::One).is_empty());
        assert_eq!(blocked.outcome(), Some(Outcome::Win(Side::Two)));
    }

    #[test]
    fn test_quiet_king_moves_draw() {
        let mut game = CheckersState::from_rows(
            &[".W......", EMPTY, EMPTY, EMPTY, EMPTY, EMPTY, "...b....", "......B."],
            Side::One,
        );
        game.quiet_plies = DRAW_QUIET_PLIES - 2;

        let king_step = game.move_for_path(&"7,6-6,5".parse().unwrap()).unwrap();
        let after = game.apply(&king_step, Side::One);
        assert_eq!(after.quiet_plies(), DRAW_QUIET_PLIES - 1);
        assert_eq!(after.outcome(), None);

        let man_step = game.move_for_path(&"6,3-5,4".parse().unwrap()).unwrap();
        assert_eq!(game.apply(&man_step, Side::One).quiet_plies(), 0);

        let king_back = after.move_for_path(&"0,1-1,0".parse().unwrap()).unwrap();
        let drawn = after.apply(&king_back, Side::Two);
        assert_eq!(drawn.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn test_material_evaluation() {
        let game = CheckersState::from_rows(
            &[EMPTY, EMPTY, EMPTY, "....B...", EMPTY, EMPTY, "w.......", EMPTY],
            Side::One,
        );
        assert!(game.evaluate(Side::One) > 0);
        assert!(game.evaluate(Side::Two) < 0);
    }

    #[test]
    fn test_parse_and_resolve_path() {
        let game = CheckersState::new();
        let path: CheckersPath = "5,2-4,3".parse().unwrap();
        let mv = game.move_for_path(&path).unwrap();
        assert_eq!(mv.to_string(), "5,2-4,3");
        assert!(game.move_for_path(&"5,2-3,4".parse().unwrap()).is_none());
        assert!("5,2".parse::<CheckersPath>().is_err());
    }
}
