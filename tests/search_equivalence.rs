mod common;

use arena::game_wrapper::GameKind;
use arena::search::root_scores;
use arena::{AlphaBeta, GameRules, SearchLimits};
use common::{random_position, reference_depth};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn game_kind() -> impl Strategy<Value = GameKind> {
    prop::sample::select(GameKind::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn pruned_search_matches_exhaustive_minimax(
        kind in game_kind(),
        plies in 0usize..40,
        seed in any::<u64>(),
    ) {
        let game = random_position(kind, plies, seed);
        prop_assume!(!game.is_terminal());
        let side = game.side_to_move();
        prop_assume!(!game.legal_moves(side).is_empty());

        let depth = reference_depth(kind);
        let engine = AlphaBeta::new(SearchLimits::depth(depth));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let outcome = engine.search(&game, side, &mut rng);

        let exhaustive = root_scores(&game, side, depth);
        let best = exhaustive.iter().map(|(_, s)| *s).max().unwrap();
        let tied = exhaustive.iter().filter(|(_, s)| *s == best).count();

        prop_assert_eq!(outcome.score, best);
        prop_assert_eq!(outcome.tied, tied);
        let chosen = outcome.best_move.unwrap();
        prop_assert!(exhaustive.contains(&(chosen, best)));
    }

    #[test]
    fn parallel_search_matches_sequential(
        kind in game_kind(),
        plies in 0usize..30,
        seed in any::<u64>(),
    ) {
        let game = random_position(kind, plies, seed);
        prop_assume!(!game.is_terminal());
        let side = game.side_to_move();
        prop_assume!(!game.legal_moves(side).is_empty());

        let depth = reference_depth(kind);
        let sequential = AlphaBeta::new(SearchLimits::depth(depth));
        let parallel = AlphaBeta::with_threads(SearchLimits::depth(depth), 3).unwrap();
        let a = sequential.search(&game, side, &mut Xoshiro256PlusPlus::seed_from_u64(seed));
        let b = parallel.search(&game, side, &mut Xoshiro256PlusPlus::seed_from_u64(seed));
        prop_assert_eq!(a.score, b.score);
        prop_assert_eq!(a.tied, b.tied);
        prop_assert_eq!(a.best_move, b.best_move);
    }
}
