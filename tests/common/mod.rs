//! Helpers shared by the integration tests.

#![allow(dead_code)]

use arena::config::ArenaConfig;
use arena::game_wrapper::{GameKind, GameWrapper};
use arena::GameRules;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub fn start(kind: GameKind) -> GameWrapper {
    GameWrapper::new(kind, &ArenaConfig::default())
}

/// Plays up to `plies` uniformly random legal moves from the start of
/// `kind`, passing where the rules allow. Stops early at a finished game.
pub fn random_position(kind: GameKind, plies: usize, seed: u64) -> GameWrapper {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut game = start(kind);
    for _ in 0..plies {
        if game.is_terminal() {
            break;
        }
        let side = game.side_to_move();
        let moves = game.legal_moves(side).into_legal();
        if moves.is_empty() {
            match game.pass() {
                Some(passed) => game = passed,
                None => break,
            }
            continue;
        }
        let mv = &moves[rng.random_range(0..moves.len())];
        game = game.apply(mv, side);
    }
    game
}

/// Fixed depth small enough for the unpruned reference search.
pub fn reference_depth(kind: GameKind) -> u32 {
    match kind {
        GameKind::Reversi => 3,
        GameKind::Checkers => 4,
        GameKind::Morris => 2,
        GameKind::Connect4 => 4,
    }
}
