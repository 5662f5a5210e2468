//! # Game Implementations Module
//!
//! Rules for every game the arena plays. Each game implements
//! [`GameRules`](crate::GameRules) so the alpha-beta searcher and the
//! controller can drive it without knowing its details.
//!
//! ## Supported Games
//! - **Reversi**: N×N disc-flipping game, 8×8 by default
//! - **Checkers**: 8×8 American checkers with mandatory capture and multi-jumps
//! - **Nine Men's Morris**: 24-point mill game with placement, movement and flying
//! - **Connect 4**: gravity-based N-in-a-row, 7×6 by default
//!
//! ## Adding New Games
//! 1. A move type implementing `Display` and `FromStr`
//! 2. A state type implementing `GameRules`, holding the side to move
//! 3. A variant in `GameWrapper` and `MoveWrapper`

pub mod checkers;
pub mod connect4;
pub mod morris;
pub mod reversi;
