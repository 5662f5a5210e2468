//! # Game Wrapper Module - Unified Game Interface
//!
//! Lets the searcher, the controller and the binaries work with any of the
//! four games through one type. `GameWrapper` and `MoveWrapper` are enums
//! over the concrete games, and a macro generates the `GameRules`
//! implementation that forwards every call to the wrapped state.
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │ AlphaBeta /     │◄──►│   GameWrapper    │◄──►│ ReversiState    │
//! │ GameController  │    │   MoveWrapper    │    │ CheckersState   │
//! │                 │    │                  │    │ MorrisState     │
//! └─────────────────┘    └──────────────────┘    │ Connect4State   │
//!                                                 └─────────────────┘
//! ```
//!
//! Enum dispatch keeps the calls static, so wrapping costs one match per call.

use crate::config::ArenaConfig;
use crate::error::{ArenaError, Result};
use crate::games::checkers::{CheckersMove, CheckersPath, CheckersState};
use crate::games::connect4::{Connect4Move, Connect4State};
use crate::games::morris::{MorrisMove, MorrisState};
use crate::games::reversi::{ReversiCell, ReversiMove, ReversiState};
use crate::{GameRules, MoveSet, Outcome, Side};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which game to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Reversi,
    Checkers,
    Morris,
    Connect4,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::Reversi,
        GameKind::Checkers,
        GameKind::Morris,
        GameKind::Connect4,
    ];

    /// Display name of the game.
    pub fn title(self) -> &'static str {
        match self {
            GameKind::Reversi => "Reversi",
            GameKind::Checkers => "Checkers",
            GameKind::Morris => "Nine Men's Morris",
            GameKind::Connect4 => "Connect 4",
        }
    }

    /// The colour each side plays in this game.
    pub fn side_name(self, side: Side) -> &'static str {
        match (self, side) {
            (GameKind::Reversi | GameKind::Checkers, Side::One) => "Black",
            (GameKind::Reversi | GameKind::Checkers, Side::Two) => "White",
            (GameKind::Morris, Side::One) => "White",
            (GameKind::Morris, Side::Two) => "Black",
            (GameKind::Connect4, Side::One) => "Red",
            (GameKind::Connect4, Side::Two) => "Yellow",
        }
    }

    /// How a human types a move.
    pub fn move_hint(self) -> &'static str {
        match self {
            GameKind::Reversi => "row,col (e.g. 2,3)",
            GameKind::Checkers => "squares as row,col joined by - or x (e.g. 5,0-4,1 or 5,2x3,4x1,2)",
            GameKind::Morris => "point to place (e.g. 4), from-to to move (e.g. 4-5), x<point> to remove (e.g. x13)",
            GameKind::Connect4 => "column number (e.g. 3)",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            GameKind::Reversi => "reversi",
            GameKind::Checkers => "checkers",
            GameKind::Morris => "morris",
            GameKind::Connect4 => "connect4",
        };
        write!(f, "{}", key)
    }
}

impl FromStr for GameKind {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reversi" | "othello" => Ok(GameKind::Reversi),
            "checkers" | "draughts" => Ok(GameKind::Checkers),
            "morris" | "nine-mens-morris" | "mill" => Ok(GameKind::Morris),
            "connect4" | "connect-four" | "c4" => Ok(GameKind::Connect4),
            _ => Err(ArenaError::UnknownGame { name: s.to_string() }),
        }
    }
}

/// Wrapper enum for all supported game states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameWrapper {
    Reversi(ReversiState),
    Checkers(CheckersState),
    Morris(MorrisState),
    Connect4(Connect4State),
}

/// Wrapper enum for all supported move types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MoveWrapper {
    Reversi(ReversiMove),
    Checkers(CheckersMove),
    Morris(MorrisMove),
    Connect4(Connect4Move),
}

impl fmt::Display for MoveWrapper {
    /// Same text the move parser accepts, so transcripts can be replayed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveWrapper::Reversi(m) => write!(f, "{}", m),
            MoveWrapper::Checkers(m) => write!(f, "{}", m),
            MoveWrapper::Morris(m) => write!(f, "{}", m),
            MoveWrapper::Connect4(m) => write!(f, "{}", m),
        }
    }
}

impl fmt::Display for GameWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameWrapper::Reversi(g) => write!(f, "{}", g),
            GameWrapper::Checkers(g) => write!(f, "{}", g),
            GameWrapper::Morris(g) => write!(f, "{}", g),
            GameWrapper::Connect4(g) => write!(f, "{}", g),
        }
    }
}

macro_rules! impl_game_dispatch {
    ($($variant:ident),*) => {
        impl GameRules for GameWrapper {
            type Move = MoveWrapper;

            fn side_to_move(&self) -> Side {
                match self {
                    $(GameWrapper::$variant(g) => g.side_to_move(),)*
                }
            }

            fn legal_moves(&self, side: Side) -> MoveSet<Self::Move> {
                match self {
                    $(GameWrapper::$variant(g) => g.legal_moves(side).map(MoveWrapper::$variant),)*
                }
            }

            /// Panics if `mv` belongs to a different game. Moves only ever come
            /// from this wrapper's own `legal_moves` or `parse_move`.
            fn apply(&self, mv: &Self::Move, side: Side) -> Self {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => {
                        GameWrapper::$variant(g.apply(m, side))
                    })*
                    _ => panic!("Mismatched game and move types"),
                }
            }

            fn evaluate(&self, side: Side) -> i32 {
                match self {
                    $(GameWrapper::$variant(g) => g.evaluate(side),)*
                }
            }

            fn outcome(&self) -> Option<Outcome> {
                match self {
                    $(GameWrapper::$variant(g) => g.outcome(),)*
                }
            }

            fn pass(&self) -> Option<Self> {
                match self {
                    $(GameWrapper::$variant(g) => g.pass().map(GameWrapper::$variant),)*
                }
            }

            fn piece_count(&self) -> usize {
                match self {
                    $(GameWrapper::$variant(g) => g.piece_count(),)*
                }
            }
        }

        impl GameWrapper {
            /// Checks if a move is legal for the side to move
            pub fn is_legal(&self, mv: &MoveWrapper) -> bool {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => {
                        g.legal_moves(g.side_to_move()).is_legal(m)
                    })*
                    _ => false,
                }
            }
        }
    };
}

impl_game_dispatch!(Reversi, Checkers, Morris, Connect4);

impl GameWrapper {
    /// Starting position of `kind`, sized and weighted from `config`.
    pub fn new(kind: GameKind, config: &ArenaConfig) -> Self {
        match kind {
            GameKind::Reversi => GameWrapper::Reversi(
                ReversiState::new(config.reversi.board_size).with_weights(config.reversi.weights),
            ),
            GameKind::Checkers => {
                GameWrapper::Checkers(CheckersState::new().with_weights(config.checkers.weights))
            }
            GameKind::Morris => {
                GameWrapper::Morris(MorrisState::new().with_weights(config.morris.weights))
            }
            GameKind::Connect4 => {
                let c4 = &config.connect4;
                GameWrapper::Connect4(
                    Connect4State::new(c4.width, c4.height, c4.line_size).with_weights(c4.weights),
                )
            }
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            GameWrapper::Reversi(_) => GameKind::Reversi,
            GameWrapper::Checkers(_) => GameKind::Checkers,
            GameWrapper::Morris(_) => GameKind::Morris,
            GameWrapper::Connect4(_) => GameKind::Connect4,
        }
    }

    pub fn side_name(&self, side: Side) -> &'static str {
        self.kind().side_name(side)
    }

    /// Turns user text into a move for the side to move.
    ///
    /// Reversi and checkers moves carry derived data (flips, captured
    /// squares), so those games resolve the text against the legal moves and
    /// report an illegal move here. For the others legality is left to
    /// [`GameWrapper::is_legal`].
    pub fn parse_move(&self, input: &str) -> Result<MoveWrapper> {
        let illegal = || ArenaError::IllegalMove { mv: input.trim().to_string() };
        match self {
            GameWrapper::Reversi(g) => {
                let cell: ReversiCell = input.parse()?;
                g.move_at(cell).map(MoveWrapper::Reversi).ok_or_else(illegal)
            }
            GameWrapper::Checkers(g) => {
                let path: CheckersPath = input.parse()?;
                g.move_for_path(&path).map(MoveWrapper::Checkers).ok_or_else(illegal)
            }
            GameWrapper::Morris(_) => Ok(MoveWrapper::Morris(input.parse()?)),
            GameWrapper::Connect4(_) => Ok(MoveWrapper::Connect4(input.parse()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(kind: GameKind) -> GameWrapper {
        GameWrapper::new(kind, &ArenaConfig::default())
    }

    #[test]
    fn test_opening_move_counts() {
        let expected = [
            (GameKind::Reversi, 4),
            (GameKind::Checkers, 7),
            (GameKind::Morris, 24),
            (GameKind::Connect4, 7),
        ];
        for (kind, count) in expected {
            let game = start(kind);
            assert_eq!(game.kind(), kind);
            assert_eq!(game.side_to_move(), Side::One);
            assert_eq!(game.legal_moves(Side::One).into_legal().len(), count, "{}", kind);
        }
    }

    #[test]
    fn test_apply_through_wrapper() {
        let game = start(GameKind::Connect4);
        let mv = game.parse_move("3").unwrap();
        assert!(game.is_legal(&mv));
        let after = game.apply(&mv, Side::One);
        assert_eq!(after.side_to_move(), Side::Two);
        assert_eq!(after.piece_count(), 1);
        assert_eq!(mv.to_string(), "3");
    }

    #[test]
    fn test_parse_resolves_derived_moves() {
        let reversi = start(GameKind::Reversi);
        assert!(matches!(reversi.parse_move("2,3"), Ok(MoveWrapper::Reversi(_))));
        assert!(matches!(reversi.parse_move("0,0"), Err(ArenaError::IllegalMove { .. })));
        assert!(matches!(reversi.parse_move("zz"), Err(ArenaError::MoveParse { .. })));

        let checkers = start(GameKind::Checkers);
        let mv = checkers.parse_move("5,0-4,1").unwrap();
        assert!(checkers.is_legal(&mv));
    }

    #[test]
    fn test_mismatched_move_is_not_legal() {
        let game = start(GameKind::Morris);
        assert!(!game.is_legal(&MoveWrapper::Connect4(Connect4Move(0))));
    }

    #[test]
    fn test_game_kind_names() {
        assert_eq!("othello".parse::<GameKind>().unwrap(), GameKind::Reversi);
        assert_eq!("Connect4".parse::<GameKind>().unwrap(), GameKind::Connect4);
        assert!(matches!("chess".parse::<GameKind>(), Err(ArenaError::UnknownGame { .. })));
        assert_eq!(GameKind::Morris.side_name(Side::One), "White");
        assert_eq!(GameKind::Checkers.side_name(Side::One), "Black");
        for kind in GameKind::ALL {
            assert_eq!(kind.to_string().parse::<GameKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_config_sizes_the_board() {
        let mut config = ArenaConfig::default();
        config.reversi.board_size = 6;
        config.connect4.width = 5;
        let reversi = GameWrapper::new(GameKind::Reversi, &config);
        assert!(matches!(&reversi, GameWrapper::Reversi(g) if g.board_size() == 6));
        let c4 = GameWrapper::new(GameKind::Connect4, &config);
        assert_eq!(c4.legal_moves(Side::One).into_legal().len(), 5);
    }
}
