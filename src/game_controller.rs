//! # Game Controller Module - Central Game State Management
//!
//! `GameController` is the single source of truth for a running game. The AI
//! searches clones of its state; only moves that come back through the
//! controller change the real board.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                GameController                │
//! │  authoritative GameWrapper + history         │
//! └──────────────────────────────────────────────┘
//!        ▲ try_make_move           │ get_state_for_search
//!        │ apply_trusted_move      ▼
//!   ┌──────────┐              ┌───────────┐
//!   │  human   │              │ AI worker │
//!   └──────────┘              └───────────┘
//! ```
//!
//! Human moves are checked against the legal move set before they are
//! applied. Moves produced by the search use the same rules and go through
//! `apply_trusted_move`.

use crate::game_wrapper::{GameWrapper, MoveWrapper};
use crate::{GameRules, Outcome, Side};
use log::info;
use std::fmt::Write;
use std::time::SystemTime;
use thiserror::Error;

/// Result of attempting to apply a move
#[derive(Debug, Clone)]
pub enum MoveResult {
    /// Move was successfully applied
    Success {
        move_made: MoveWrapper,
        /// Side that made the move
        side: Side,
        /// Whether the game is now over
        game_over: bool,
        /// Winner if the game is over (None for a draw)
        winner: Option<Side>,
    },
    /// Move was rejected
    Invalid { reason: MoveValidationError },
    /// Game is already over, no more moves allowed
    GameOver,
}

/// Reasons a move is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveValidationError {
    /// Not among the legal moves of the side to move
    #[error("Illegal move")]
    IllegalMove,
    #[error("Move type doesn't match game")]
    MismatchedGameType,
    #[error("Game is already over")]
    GameAlreadyOver,
}

/// What happened on one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    Move(MoveWrapper),
    /// The side had no legal move and the rules made it pass
    Pass,
}

/// A single entry in the game history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    pub timestamp: SystemTime,
    pub side: Side,
    pub action: HistoryAction,
    /// Turn number (1-indexed)
    pub move_number: usize,
}

impl MoveHistoryEntry {
    pub fn new(side: Side, action: HistoryAction, move_number: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            side,
            action,
            move_number,
        }
    }
}

/// Current game status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Win(Side),
    Draw,
}

impl GameStatus {
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

impl From<Option<Outcome>> for GameStatus {
    fn from(outcome: Option<Outcome>) -> Self {
        match outcome {
            None => GameStatus::InProgress,
            Some(Outcome::Win(side)) => GameStatus::Win(side),
            Some(Outcome::Draw) => GameStatus::Draw,
        }
    }
}

/// The central game controller that owns the authoritative game state
///
/// # Usage
/// ```rust,ignore
/// let mut controller = GameController::new(GameWrapper::new(GameKind::Checkers, &config));
///
/// let mv = controller.get_render_state().parse_move("5,0-4,1")?;
/// match controller.try_make_move(mv) {
///     MoveResult::Success { game_over, winner, .. } => {}
///     MoveResult::Invalid { reason } => {}
///     MoveResult::GameOver => {}
/// }
///
/// // The AI searches a clone
/// let state_for_ai = controller.get_state_for_search();
/// ```
#[derive(Debug, Clone)]
pub struct GameController {
    game_state: GameWrapper,
    move_history: Vec<MoveHistoryEntry>,
    status: GameStatus,
}

impl GameController {
    pub fn new(initial_state: GameWrapper) -> Self {
        let status = GameStatus::from(initial_state.outcome());
        Self {
            game_state: initial_state,
            move_history: Vec::new(),
            status,
        }
    }

    /// Validate a move for the side to move without applying it
    pub fn validate_move(&self, mv: &MoveWrapper) -> Result<(), MoveValidationError> {
        if self.status.is_game_over() {
            return Err(MoveValidationError::GameAlreadyOver);
        }
        if !matches!(
            (&self.game_state, mv),
            (GameWrapper::Reversi(_), MoveWrapper::Reversi(_))
                | (GameWrapper::Checkers(_), MoveWrapper::Checkers(_))
                | (GameWrapper::Morris(_), MoveWrapper::Morris(_))
                | (GameWrapper::Connect4(_), MoveWrapper::Connect4(_))
        ) {
            return Err(MoveValidationError::MismatchedGameType);
        }
        if !self.game_state.is_legal(mv) {
            return Err(MoveValidationError::IllegalMove);
        }
        Ok(())
    }

    /// Validate a move and apply it if it is legal
    pub fn try_make_move(&mut self, mv: MoveWrapper) -> MoveResult {
        if let Err(reason) = self.validate_move(&mv) {
            return MoveResult::Invalid { reason };
        }
        self.apply_unchecked(mv)
    }

    /// Apply a move without checking it against the legal move set
    ///
    /// Only for moves produced by the search on the current state.
    pub fn apply_trusted_move(&mut self, mv: MoveWrapper) -> MoveResult {
        if self.status.is_game_over() {
            return MoveResult::GameOver;
        }
        self.apply_unchecked(mv)
    }

    fn apply_unchecked(&mut self, mv: MoveWrapper) -> MoveResult {
        let side = self.game_state.side_to_move();
        let move_number = self.move_history.len() + 1;

        self.game_state = self.game_state.apply(&mv, side);
        self.move_history
            .push(MoveHistoryEntry::new(side, HistoryAction::Move(mv.clone()), move_number));
        self.refresh_status();

        MoveResult::Success {
            move_made: mv,
            side,
            game_over: self.status.is_game_over(),
            winner: self.get_winner(),
        }
    }

    /// Passes for the side to move if it has no legal move and the game
    /// allows passing. Returns true if a pass was recorded.
    pub fn resolve_pass(&mut self) -> bool {
        if self.status.is_game_over() {
            return false;
        }
        let side = self.game_state.side_to_move();
        if !self.game_state.legal_moves(side).is_empty() {
            return false;
        }
        match self.game_state.pass() {
            Some(passed) => {
                info!("{} has no legal move and passes", self.game_state.side_name(side));
                self.game_state = passed;
                let move_number = self.move_history.len() + 1;
                self.move_history
                    .push(MoveHistoryEntry::new(side, HistoryAction::Pass, move_number));
                self.refresh_status();
                true
            }
            None => false,
        }
    }

    fn refresh_status(&mut self) {
        self.status = GameStatus::from(self.game_state.outcome());
        if self.status.is_game_over() {
            info!("game over: {}", self.result_text());
        }
    }

    /// A clone of the game state the AI can search freely
    pub fn get_state_for_search(&self) -> GameWrapper {
        self.game_state.clone()
    }

    /// The live state, for display only
    pub fn get_render_state(&self) -> &GameWrapper {
        &self.game_state
    }

    pub fn side_to_move(&self) -> Side {
        self.game_state.side_to_move()
    }

    pub fn get_status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    pub fn get_winner(&self) -> Option<Side> {
        match self.status {
            GameStatus::Win(w) => Some(w),
            _ => None,
        }
    }

    pub fn get_move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    pub fn get_last_move(&self) -> Option<&MoveHistoryEntry> {
        self.move_history.last()
    }

    /// Legal moves for the side to move, empty once the game is over
    pub fn get_legal_moves(&self) -> Vec<MoveWrapper> {
        if self.status.is_game_over() {
            Vec::new()
        } else {
            self.game_state
                .legal_moves(self.game_state.side_to_move())
                .into_legal()
        }
    }

    /// Start over from `new_state`
    pub fn reset(&mut self, new_state: GameWrapper) {
        self.status = GameStatus::from(new_state.outcome());
        self.game_state = new_state;
        self.move_history.clear();
    }

    /// Plain-text record of the game so far
    pub fn format_transcript(&self) -> String {
        let kind = self.game_state.kind();
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = format!("=== {} Game History ===\n\n", kind.title());
        for entry in &self.move_history {
            let name = kind.side_name(entry.side);
            let _ = match &entry.action {
                HistoryAction::Move(mv) => {
                    writeln!(output, "{}. {} - {}", entry.move_number, name, mv)
                }
                HistoryAction::Pass => writeln!(output, "{}. {} - pass", entry.move_number, name),
            };
        }
        let _ = writeln!(output, "\n{}", self.result_text());
        output
    }

    fn result_text(&self) -> String {
        let kind = self.game_state.kind();
        match self.status {
            GameStatus::Win(side) => format!("Result: {} wins!", kind.side_name(side)),
            GameStatus::Draw => String::from("Result: Draw"),
            GameStatus::InProgress => format!(
                "(Game in progress - {} to move)",
                kind.side_name(self.game_state.side_to_move())
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::game_wrapper::GameKind;
    use crate::games::connect4::{Connect4Move, Connect4State};
    use crate::games::reversi::ReversiState;

    fn connect4() -> GameController {
        GameController::new(GameWrapper::new(GameKind::Connect4, &ArenaConfig::default()))
    }

    #[test]
    fn test_valid_move() {
        let mut controller = connect4();
        match controller.try_make_move(MoveWrapper::Connect4(Connect4Move(3))) {
            MoveResult::Success { side, game_over, .. } => {
                assert_eq!(side, Side::One);
                assert!(!game_over);
            }
            other => panic!("Expected successful move, got {:?}", other),
        }
        assert_eq!(controller.side_to_move(), Side::Two);
    }

    #[test]
    fn test_illegal_and_mismatched_moves() {
        let mut controller =
            GameController::new(GameWrapper::Connect4(Connect4State::new(3, 1, 2)));
        controller.try_make_move(MoveWrapper::Connect4(Connect4Move(0)));
        assert!(matches!(
            controller.try_make_move(MoveWrapper::Connect4(Connect4Move(0))),
            MoveResult::Invalid { reason: MoveValidationError::IllegalMove }
        ));
        let morris = MoveWrapper::Morris("4".parse().unwrap());
        assert_eq!(
            controller.validate_move(&morris),
            Err(MoveValidationError::MismatchedGameType)
        );
        assert_eq!(controller.move_count(), 1);
    }

    #[test]
    fn test_move_history_and_win() {
        let mut controller = connect4();
        for col in [0, 1, 0, 1, 0, 1, 0] {
            controller.try_make_move(MoveWrapper::Connect4(Connect4Move(col)));
        }
        assert_eq!(controller.move_count(), 7);
        assert_eq!(controller.get_move_history()[0].side, Side::One);
        assert_eq!(controller.get_move_history()[1].side, Side::Two);
        assert_eq!(controller.get_status(), GameStatus::Win(Side::One));
        assert!(controller.get_legal_moves().is_empty());
        assert!(matches!(
            controller.apply_trusted_move(MoveWrapper::Connect4(Connect4Move(2))),
            MoveResult::GameOver
        ));
    }

    #[test]
    fn test_resolve_pass_records_history() {
        // Black has no move; White can still play at (0,3).
        let state = ReversiState::from_rows(&["WWB.", "WWWW", "WWWW", "WWWW"], Side::One);
        let mut controller = GameController::new(GameWrapper::Reversi(state));
        assert!(!controller.is_game_over());
        assert!(controller.resolve_pass());
        assert_eq!(controller.side_to_move(), Side::Two);
        assert_eq!(controller.get_last_move().map(|e| &e.action), Some(&HistoryAction::Pass));
        assert!(!controller.resolve_pass());
        assert!(controller.format_transcript().contains("1. Black - pass"));
    }

    #[test]
    fn test_reset() {
        let mut controller = connect4();
        controller.try_make_move(MoveWrapper::Connect4(Connect4Move(3)));
        controller.reset(GameWrapper::new(GameKind::Connect4, &ArenaConfig::default()));
        assert_eq!(controller.move_count(), 0);
        assert_eq!(controller.get_status(), GameStatus::InProgress);
    }

    #[test]
    fn test_format_transcript() {
        let mut controller = connect4();
        assert_eq!(controller.format_transcript(), "No moves made yet.");
        controller.try_make_move(MoveWrapper::Connect4(Connect4Move(3)));
        let history = controller.format_transcript();
        assert!(history.contains("Connect 4 Game History"));
        assert!(history.contains("1. Red - 3"));
        assert!(history.contains("Yellow to move"));
    }
}
