//! # Nine Men's Morris Game Implementation
//!
//! The board is 24 points on three nested squares joined at their midpoints:
//!
//! ```text
//! 0-----------1-----------2
//! |           |           |
//! |   3-------4-------5   |
//! |   |       |       |   |
//! |   |   6---7---8   |   |
//! |   |   |       |   |   |
//! 9---10--11      12--13--14
//! |   |   |       |   |   |
//! |   |   15--16--17  |   |
//! |   |       |       |   |
//! |   18------19------20  |
//! |           |           |
//! 21----------22----------23
//! ```
//!
//! ## Rules
//! - Each side starts with nine pieces in hand and places them one per turn
//! - With an empty hand a side slides a piece to an adjacent empty point, or
//!   flies to any empty point once it is down to exactly three pieces
//! - Completing a mill (three in a line) with the placed or moved piece earns
//!   a removal: the same side moves again and must take an opponent piece
//!   that is not part of a mill, unless every opponent piece is in one
//! - A side with an empty hand loses when it has fewer than three pieces or
//!   cannot move
//! - 50 movement plies in a row without a removal is a draw

use crate::error::ArenaError;
use crate::{GameRules, MoveSet, Outcome, Side};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const POINTS: usize = 24;
pub const PIECES_PER_SIDE: u8 = 9;

/// Movement plies without a removal before the game is drawn.
pub const DRAW_QUIET_PLIES: u32 = 50;

/// Neighbours of every point.
pub const ADJACENCY: [&[usize]; POINTS] = [
    &[1, 9],
    &[0, 2, 4],
    &[1, 14],
    &[4, 10],
    &[1, 3, 5, 7],
    &[4, 13],
    &[7, 11],
    &[4, 6, 8],
    &[7, 12],
    &[0, 10, 21],
    &[3, 9, 11, 18],
    &[6, 10, 15],
    &[8, 13, 17],
    &[5, 12, 14, 20],
    &[2, 13, 23],
    &[11, 16],
    &[15, 17, 19],
    &[12, 16],
    &[10, 19],
    &[16, 18, 20, 22],
    &[13, 19],
    &[9, 22],
    &[19, 21, 23],
    &[14, 22],
];

/// Every line of three that forms a mill.
pub const MILLS: [[usize; 3]; 16] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [9, 10, 11],
    [12, 13, 14],
    [15, 16, 17],
    [18, 19, 20],
    [21, 22, 23],
    [0, 9, 21],
    [3, 10, 18],
    [6, 11, 15],
    [1, 4, 7],
    [16, 19, 22],
    [8, 12, 17],
    [5, 13, 20],
    [2, 14, 23],
];

/// Position of each point on a 7x7 drawing grid.
const GRID: [(usize, usize); POINTS] = [
    (0, 0), (0, 3), (0, 6),
    (1, 1), (1, 3), (1, 5),
    (2, 2), (2, 3), (2, 4),
    (3, 0), (3, 1), (3, 2), (3, 4), (3, 5), (3, 6),
    (4, 2), (4, 3), (4, 4),
    (5, 1), (5, 3), (5, 5),
    (6, 0), (6, 3), (6, 6),
];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MorrisMove {
    /// Put a piece from hand on an empty point
    Place(usize),
    /// Slide to an adjacent point, or fly anywhere with three pieces left
    Move { from: usize, to: usize },
    /// Take an opponent piece after closing a mill
    Remove(usize),
}

impl fmt::Display for MorrisMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MorrisMove::Place(p) => write!(f, "{}", p),
            MorrisMove::Move { from, to } => write!(f, "{}-{}", from, to),
            MorrisMove::Remove(p) => write!(f, "x{}", p),
        }
    }
}

impl FromStr for MorrisMove {
    type Err = ArenaError;

    /// Parses `"5"` (place), `"4-7"` (move) or `"x13"` (remove).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let point = |text: &str| -> Result<usize, ArenaError> {
            let p = text.trim().parse::<usize>().map_err(|e| ArenaError::MoveParse {
                input: s.to_string(),
                reason: e.to_string(),
            })?;
            if p >= POINTS {
                return Err(ArenaError::MoveParse {
                    input: s.to_string(),
                    reason: format!("points are numbered 0-{}", POINTS - 1),
                });
            }
            Ok(p)
        };
        if let Some(rest) = s.strip_prefix('x') {
            Ok(MorrisMove::Remove(point(rest)?))
        } else if let Some((from, to)) = s.split_once('-') {
            Ok(MorrisMove::Move {
                from: point(from)?,
                to: point(to)?,
            })
        } else {
            Ok(MorrisMove::Place(point(s)?))
        }
    }
}

/// Evaluation weights for Nine Men's Morris.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorrisWeights {
    /// Per piece, on board or in hand
    pub piece: i32,
    /// Per closed mill
    pub mill: i32,
    /// Per line with two own pieces and an empty third point
    pub threat: i32,
    /// Per sliding move of difference (movement phase only)
    pub mobility: i32,
    /// Per piece with no empty neighbour
    pub blocked: i32,
}

impl Default for MorrisWeights {
    fn default() -> Self {
        Self {
            piece: 50,
            mill: 20,
            threat: 10,
            mobility: 2,
            blocked: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorrisState {
    board: [Option<Side>; POINTS],
    /// Pieces not yet placed, indexed by `Side::index`
    in_hand: [u8; 2],
    to_move: Side,
    /// The side to move closed a mill and must remove a piece
    pending_removal: bool,
    /// Movement plies since the last removal
    quiet_plies: u32,
    weights: MorrisWeights,
}

impl fmt::Display for MorrisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut grid = [[' '; 7]; 7];
        for (p, &(r, c)) in GRID.iter().enumerate() {
            grid[r][c] = match self.board[p] {
                Some(Side::One) => 'W',
                Some(Side::Two) => 'B',
                None => '+',
            };
        }
        for row in grid.iter() {
            let line: String = row.iter().flat_map(|&ch| [ch, ' ']).collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        writeln!(
            f,
            "in hand: W {} / B {}{}",
            self.in_hand[0],
            self.in_hand[1],
            if self.pending_removal { " (removal pending)" } else { "" }
        )
    }
}

impl GameRules for MorrisState {
    type Move = MorrisMove;

    fn side_to_move(&self) -> Side {
        self.to_move
    }

    fn legal_moves(&self, side: Side) -> MoveSet<Self::Move> {
        let mut moves = MoveSet::new();
        if self.pending_removal && side == self.to_move {
            moves.captures = self.removable(side.opponent()).map(MorrisMove::Remove).collect();
            return moves;
        }
        if self.in_hand[side.index()] > 0 {
            moves.simple = self.empty_points().map(MorrisMove::Place).collect();
        } else if self.on_board(side) == 3 {
            for from in self.points_of(side) {
                moves
                    .simple
                    .extend(self.empty_points().map(|to| MorrisMove::Move { from, to }));
            }
        } else {
            for from in self.points_of(side) {
                moves.simple.extend(
                    ADJACENCY[from]
                        .iter()
                        .filter(|&&to| self.board[to].is_none())
                        .map(|&to| MorrisMove::Move { from, to }),
                );
            }
        }
        moves
    }

    fn apply(&self, mv: &Self::Move, side: Side) -> Self {
        let mut next = self.clone();
        match *mv {
            MorrisMove::Place(p) => {
                debug_assert!(self.board[p].is_none(), "point {} is occupied", p);
                debug_assert!(self.in_hand[side.index()] > 0, "{} has nothing to place", side);
                next.board[p] = Some(side);
                next.in_hand[side.index()] = self.in_hand[side.index()].saturating_sub(1);
                next.quiet_plies = 0;
                next.after_landing(p, side);
            }
            MorrisMove::Move { from, to } => {
                debug_assert_eq!(self.board[from], Some(side), "no {} piece on {}", side, from);
                debug_assert!(self.board[to].is_none(), "point {} is occupied", to);
                next.board[from] = None;
                next.board[to] = Some(side);
                next.quiet_plies = self.quiet_plies + 1;
                next.after_landing(to, side);
            }
            MorrisMove::Remove(p) => {
                debug_assert!(self.pending_removal, "no mill was closed");
                debug_assert_eq!(
                    self.board[p],
                    Some(side.opponent()),
                    "no opponent piece on {}",
                    p
                );
                next.board[p] = None;
                next.pending_removal = false;
                next.quiet_plies = 0;
                next.to_move = side.opponent();
            }
        }
        next
    }

    fn evaluate(&self, side: Side) -> i32 {
        let w = &self.weights;
        let other = side.opponent();
        let material = |s: Side| self.on_board(s) as i32 + self.in_hand[s.index()] as i32;

        let mut score = w.piece * (material(side) - material(other));

        for mill in MILLS.iter() {
            let own = mill.iter().filter(|&&p| self.board[p] == Some(side)).count();
            let theirs = mill.iter().filter(|&&p| self.board[p] == Some(other)).count();
            match (own, theirs) {
                (3, _) => score += w.mill,
                (_, 3) => score -= w.mill,
                (2, 0) => score += w.threat,
                (0, 2) => score -= w.threat,
                _ => {}
            }
        }

        score += w.mobility * (self.sliding_mobility(side) - self.sliding_mobility(other));
        score -= w.blocked * (self.blocked_pieces(side) - self.blocked_pieces(other));
        score
    }

    fn outcome(&self) -> Option<Outcome> {
        if self.pending_removal {
            return None;
        }
        let side = self.to_move;
        if self.in_hand[side.index()] == 0 && self.on_board(side) < 3 {
            return Some(Outcome::Win(side.opponent()));
        }
        if self.legal_moves(side).is_empty() {
            return Some(Outcome::Win(side.opponent()));
        }
        if self.quiet_plies >= DRAW_QUIET_PLIES {
            return Some(Outcome::Draw);
        }
        None
    }

    fn piece_count(&self) -> usize {
        self.on_board(Side::One)
            + self.on_board(Side::Two)
            + self.in_hand.iter().map(|&n| n as usize).sum::<usize>()
    }
}

impl MorrisState {
    /// Empty board, nine pieces in each hand, White (side one) to move.
    pub fn new() -> Self {
        Self {
            board: [None; POINTS],
            in_hand: [PIECES_PER_SIDE; 2],
            to_move: Side::One,
            pending_removal: false,
            quiet_plies: 0,
            weights: MorrisWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: MorrisWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Builds a position from the occupied points of each side.
    pub fn from_points(one: &[usize], two: &[usize], in_hand: [u8; 2], to_move: Side) -> Self {
        let mut state = Self::new();
        for &p in one {
            state.board[p] = Some(Side::One);
        }
        for &p in two {
            state.board[p] = Some(Side::Two);
        }
        state.in_hand = in_hand;
        state.to_move = to_move;
        state
    }

    pub fn point(&self, p: usize) -> Option<Side> {
        self.board[p]
    }

    pub fn in_hand(&self, side: Side) -> u8 {
        self.in_hand[side.index()]
    }

    pub fn pending_removal(&self) -> bool {
        self.pending_removal
    }

    pub fn on_board(&self, side: Side) -> usize {
        self.board.iter().filter(|&&c| c == Some(side)).count()
    }

    /// True if the piece on `p` is part of a closed mill.
    pub fn in_mill(&self, p: usize) -> bool {
        match self.board[p] {
            Some(side) => forms_mill(&self.board, p, side),
            None => false,
        }
    }

    /// Opponent pieces `victim` may lose to a removal.
    fn removable(&self, victim: Side) -> impl Iterator<Item = usize> + '_ {
        let all_milled = self.points_of(victim).all(|p| self.in_mill(p));
        self.points_of(victim).filter(move |&p| all_milled || !self.in_mill(p))
    }

    fn after_landing(&mut self, p: usize, side: Side) {
        if forms_mill(&self.board, p, side) && self.on_board(side.opponent()) > 0 {
            self.pending_removal = true;
            self.to_move = side;
        } else {
            self.to_move = side.opponent();
        }
    }

    fn points_of(&self, side: Side) -> impl Iterator<Item = usize> + '_ {
        (0..POINTS).filter(move |&p| self.board[p] == Some(side))
    }

    fn empty_points(&self) -> impl Iterator<Item = usize> + '_ {
        (0..POINTS).filter(move |&p| self.board[p].is_none())
    }

    fn sliding_mobility(&self, side: Side) -> i32 {
        if self.in_hand[side.index()] > 0 {
            return 0;
        }
        self.points_of(side)
            .map(|p| ADJACENCY[p].iter().filter(|&&q| self.board[q].is_none()).count() as i32)
            .sum()
    }

    fn blocked_pieces(&self, side: Side) -> i32 {
        self.points_of(side)
            .filter(|&p| ADJACENCY[p].iter().all(|&q| self.board[q].is_some()))
            .count() as i32
    }
}

impl Default for MorrisState {
    fn default() -> Self {
        Self::new()
    }
}

/// True if `side` owns every point of some mill through `p`.
fn forms_mill(board: &[Option<Side>; POINTS], p: usize, side: Side) -> bool {
    MILLS
        .iter()
        .filter(|mill| mill.contains(&p))
        .any(|mill| mill.iter().all(|&q| board[q] == Some(side)))
}
