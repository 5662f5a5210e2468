use arena::config::ArenaConfig;
use arena::game_wrapper::{GameKind, GameWrapper};
use arena::{AlphaBeta, GameRules, SearchLimits, SearchOutcome};
use clap::Parser;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Alpha-beta throughput per game, depth and thread count",
    long_about = None
)]
struct Args {
    /// Games to benchmark (default: all)
    #[arg(long, value_enum)]
    game: Vec<GameKind>,

    /// Deepest fixed-depth search to run; every depth from 1 up is timed
    #[arg(long, default_value_t = 6)]
    max_depth: u32,

    /// Thread counts to compare (default: 1 and all cores)
    #[arg(long)]
    threads: Vec<usize>,

    /// Random opening plies played before searching, so positions are not trivial
    #[arg(long, default_value_t = 4)]
    opening_plies: usize,

    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> arena::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let games = if args.game.is_empty() {
        GameKind::ALL.to_vec()
    } else {
        args.game.clone()
    };
    let threads = if args.threads.is_empty() {
        vec![1, num_cpus::get()]
    } else {
        args.threads.clone()
    };

    println!("Board Arena - Benchmark Tool");
    println!("============================");
    println!("Max depth: {}", args.max_depth);
    println!("Threads: {:?}", threads);
    println!("----------------------------");

    #[cfg(debug_assertions)]
    println!(
        "WARNING: Running in debug mode. Performance will be significantly lower.\n\
         Use --release for accurate benchmarks.\n"
    );

    let config = ArenaConfig::default();
    for kind in games {
        let position = opening(GameWrapper::new(kind, &config), args.opening_plies, args.seed);
        println!("\n{} ({} opening plies)", kind.title(), args.opening_plies);
        for &num_threads in &threads {
            for depth in 1..=args.max_depth {
                let engine = AlphaBeta::with_threads(SearchLimits::depth(depth), num_threads)?;
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(args.seed);
                let side = position.side_to_move();
                let start = Instant::now();
                let outcome = engine.search(&position, side, &mut rng);
                print_stats(num_threads, depth, &outcome, start.elapsed());
            }
        }
    }
    Ok(())
}

/// Plays `plies` random legal moves, passing where the rules allow.
fn opening(mut game: GameWrapper, plies: usize, seed: u64) -> GameWrapper {
    use rand::Rng;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
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

fn print_stats<M: std::fmt::Display>(
    threads: usize,
    depth: u32,
    outcome: &SearchOutcome<M>,
    duration: Duration,
) {
    let secs = duration.as_secs_f64().max(1e-9);
    let best = outcome
        .best_move
        .as_ref()
        .map_or_else(|| "-".to_string(), |m| m.to_string());
    println!(
        "  threads {:>2}  depth {:>2}  nodes {:>11}  time {:>8.3}s  NPS {:>11.0}  best {} ({})",
        threads,
        depth,
        outcome.nodes,
        secs,
        outcome.nodes as f64 / secs,
        best,
        outcome.score
    );
}
