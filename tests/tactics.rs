use arena::games::checkers::CheckersState;
use arena::games::connect4::{Connect4Move, Connect4State};
use arena::games::morris::{MorrisMove, MorrisState};
use arena::games::reversi::ReversiState;
use arena::search::{minimax, root_scores};
use arena::{best_move, AlphaBeta, GameRules, SearchLimits, Side, WIN_SCORE};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

const EMPTY: &str = "........";

fn rng(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

#[test]
fn connect4_takes_the_immediate_win() {
    let game = Connect4State::from_rows(
        &[".......", ".......", ".......", ".......", "OOO....", "XXX...."],
        Side::One,
    );
    assert_eq!(best_move(&game, Side::One, 2, &mut rng(1)), Some(Connect4Move(3)));
}

#[test]
fn connect4_blocks_the_opponent() {
    let game = Connect4State::from_rows(
        &[".......", ".......", ".......", ".......", "X......", "OOO.XX."],
        Side::One,
    );
    assert_eq!(best_move(&game, Side::One, 2, &mut rng(2)), Some(Connect4Move(3)));
}

#[test]
fn checkers_captures_the_last_piece() {
    let game = CheckersState::from_rows(
        &[EMPTY, EMPTY, EMPTY, EMPTY, "...w....", "..b.....", EMPTY, EMPTY],
        Side::One,
    );
    let mv = best_move(&game, Side::One, 2, &mut rng(3)).unwrap();
    assert_eq!(mv.path, vec![(5, 2), (3, 4)]);
    assert!(game.apply(&mv, Side::One).is_terminal());
}

#[test]
fn morris_closes_the_deciding_mill() {
    let game = MorrisState::from_points(&[0, 1, 14], &[10, 19, 22], [0, 0], Side::One);
    let engine = AlphaBeta::new(SearchLimits::depth(2));
    let outcome = engine.search(&game, Side::One, &mut rng(4));
    assert_eq!(outcome.best_move, Some(MorrisMove::Move { from: 14, to: 2 }));
    assert!(outcome.score >= WIN_SCORE);
}

#[test]
fn faster_wins_score_higher() {
    let engine = AlphaBeta::new(SearchLimits::depth(4));
    let immediate = Connect4State::from_rows(
        &[".......", ".......", ".......", ".......", "OOO....", "XXX...."],
        Side::One,
    );
    // Open two on the bottom row: the win takes three plies.
    let delayed = Connect4State::from_rows(
        &[".......", ".......", ".......", ".......", "......O", ".XX...O"],
        Side::One,
    );
    let fast = engine.search(&immediate, Side::One, &mut rng(5));
    let slow = engine.search(&delayed, Side::One, &mut rng(5));
    assert!(slow.score >= WIN_SCORE, "delayed win not found: {}", slow.score);
    assert!(fast.score > slow.score);
}

#[test]
fn connect4_prefers_the_center_column() {
    let game = Connect4State::standard();
    let scores = root_scores(&game, Side::One, 4);
    let score_of = |col: usize| scores.iter().find(|(m, _)| m.0 == col).map(|(_, s)| *s).unwrap();
    let best = scores.iter().map(|(_, s)| *s).max().unwrap();
    assert_eq!(score_of(3), best);
    assert!(score_of(3) > score_of(0));

    let engine = AlphaBeta::new(SearchLimits::depth(4));
    let mut counts = [0usize; 7];
    for seed in 0..20 {
        let mv = engine.search(&game, Side::One, &mut rng(seed)).best_move.unwrap();
        counts[mv.0] += 1;
    }
    assert!(counts[3] > counts[0], "column picks: {:?}", counts);
}

#[test]
fn reversi_wins_through_an_opponent_pass() {
    // White at 1,2 leaves Black without a move; White then fills 1,0 and wins
    // 10-6. White at 1,0 instead lets Black finish the game on 1,2 and win.
    let game = ReversiState::from_rows(&["WWWB", ".B.B", "BBBW", "BBWB"], Side::Two);
    let outcome = AlphaBeta::new(SearchLimits::depth(4)).search(&game, Side::Two, &mut rng(5));
    let mv = outcome.best_move.unwrap();
    assert_eq!(mv.cell(), (1, 2));
    // Four plies: move, pass, move, then a finished board with one ply left.
    assert_eq!(outcome.score, WIN_SCORE + 1);
    assert_eq!(outcome.tied, 1);

    let after = game.apply(&mv, Side::Two);
    assert!(after.legal_moves(Side::One).is_empty());
    assert!(!after.is_terminal());
    assert_eq!(minimax(&after, 3, Side::Two), WIN_SCORE + 1);

    let scores = root_scores(&game, Side::Two, 4);
    let other = scores.iter().find(|(m, _)| m.cell() == (1, 0)).unwrap();
    assert_eq!(other.1, -(WIN_SCORE + 2));
}

#[test]
fn finished_game_has_no_best_move() {
    // Red already has four in a row; open columns remain.
    let game = Connect4State::from_rows(
        &[".......", ".......", ".......", ".......", "OOO....", "XXXX..."],
        Side::Two,
    );
    assert!(game.is_terminal());
    assert!(!game.legal_moves(Side::Two).is_empty());
    assert_eq!(best_move(&game, Side::Two, 3, &mut rng(6)), None);
}
