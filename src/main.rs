//! # Board Arena - play
//!
//! Plays Reversi, Checkers, Nine Men's Morris or Connect 4 in the terminal,
//! human against the alpha-beta AI or AI against itself.
//!
//! ## Usage
//! ```text
//! play --game checkers --difficulty hard
//! play --game reversi --human none --max-plies 120
//! play --config arena.toml --move-time-ms 1500
//! ```
//!
//! Set `RUST_LOG=debug` to see per-search statistics.

use arena::ai_worker::AiHandle;
use arena::config::{ArenaConfig, Difficulty};
use arena::game_controller::{GameController, GameStatus, MoveResult};
use arena::game_wrapper::{GameKind, GameWrapper};
use arena::{GameRules, Result, Side};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::info;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

/// Which sides a human controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Seat {
    One,
    Two,
    Both,
    None,
}

impl Seat {
    fn is_human(self, side: Side) -> bool {
        match self {
            Seat::Both => true,
            Seat::None => false,
            Seat::One => side == Side::One,
            Seat::Two => side == Side::Two,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Play board games against an alpha-beta AI", long_about = None)]
struct Args {
    /// Game to play (overrides the config file)
    #[arg(short, long, value_enum)]
    game: Option<GameKind>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    /// Search depth in plies (overrides difficulty)
    #[arg(long)]
    depth: Option<u32>,

    /// Time limit per AI move in milliseconds
    #[arg(long)]
    move_time_ms: Option<u64>,

    #[arg(long)]
    node_budget: Option<u64>,

    /// Threads for the root split (default: all cores)
    #[arg(short = 'n', long)]
    threads: Option<usize>,

    /// Seed for AI tie-breaking
    #[arg(long)]
    seed: Option<u64>,

    /// Sides played by a human
    #[arg(long, value_enum, default_value_t = Seat::One)]
    human: Seat,

    /// Pause after each AI move, in milliseconds
    #[arg(long, default_value_t = 0)]
    think_delay_ms: u64,

    /// Stop after this many plies
    #[arg(long)]
    max_plies: Option<usize>,
}

impl Args {
    fn config(&self) -> Result<ArenaConfig> {
        let mut config = match &self.config {
            Some(path) => ArenaConfig::load(path)?,
            None => ArenaConfig::default(),
        };
        if let Some(game) = self.game {
            config.game = game;
        }
        let search = &mut config.search;
        if let Some(difficulty) = self.difficulty {
            search.difficulty = difficulty;
            search.depth = None;
        }
        if self.depth.is_some() {
            search.depth = self.depth;
        }
        if self.move_time_ms.is_some() {
            search.move_time_ms = self.move_time_ms;
        }
        if self.node_budget.is_some() {
            search.node_budget = self.node_budget;
        }
        if let Some(threads) = self.threads {
            search.threads = threads;
        }
        if self.seed.is_some() {
            search.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

/// What the human typed
enum Command {
    Quit,
    Help,
    Moves,
    Move(String),
}

fn read_command(stdin: &mut impl BufRead) -> Result<Command> {
    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(Command::Quit);
    }
    Ok(match line.trim() {
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" | "?" => Command::Help,
        "m" | "moves" => Command::Moves,
        other => Command::Move(other.to_string()),
    })
}

fn print_status(controller: &GameController) {
    let state = controller.get_render_state();
    println!("\n{}", state);
    if !controller.is_game_over() {
        let side = controller.side_to_move();
        println!("{} to move", state.side_name(side).bold());
    }
}

fn print_result(controller: &GameController) {
    let state = controller.get_render_state();
    let line = match controller.get_status() {
        GameStatus::Win(side) => format!("{} wins!", state.side_name(side)).green().bold(),
        GameStatus::Draw => "Draw.".yellow().bold(),
        GameStatus::InProgress => "Game stopped.".normal(),
    };
    println!("\n{}", line);
}

fn human_turn(controller: &mut GameController, stdin: &mut impl BufRead) -> Result<bool> {
    let kind = controller.get_render_state().kind();
    loop {
        print!("{} ", "move>".cyan());
        io::stdout().flush()?;
        match read_command(stdin)? {
            Command::Quit => return Ok(false),
            Command::Help => println!(
                "Enter a move as {}. 'moves' lists legal moves, 'quit' exits.",
                kind.move_hint()
            ),
            Command::Moves => {
                let moves: Vec<String> = controller
                    .get_legal_moves()
                    .iter()
                    .map(|m| m.to_string())
                    .collect();
                println!("{}", moves.join("  "));
            }
            Command::Move(text) => {
                let mv = match controller.get_render_state().parse_move(&text) {
                    Ok(mv) => mv,
                    Err(e) => {
                        println!("{}", e.to_string().red());
                        continue;
                    }
                };
                match controller.try_make_move(mv) {
                    MoveResult::Success { .. } => return Ok(true),
                    MoveResult::Invalid { reason } => {
                        println!("{}", format!("{}: {}", reason, text).red())
                    }
                    MoveResult::GameOver => return Ok(true),
                }
            }
        }
    }
}

fn ai_turn(
    controller: &mut GameController,
    ai: &mut AiHandle,
    think_delay: Duration,
) -> Result<()> {
    let state = controller.get_state_for_search();
    let side = state.side_to_move();
    let request_id = ai.request_move(state)?;
    let ready = ai.wait_for_move(request_id)?;
    let name = controller.get_render_state().side_name(side);
    println!(
        "{} plays {}  (score {}, depth {}, {} nodes)",
        name.bold(),
        ready.best_move.to_string().magenta().bold(),
        ready.score,
        ready.completed_depth,
        ready.nodes
    );
    controller.apply_trusted_move(ready.best_move);
    if !think_delay.is_zero() {
        thread::sleep(think_delay);
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = args.config()?;
    let kind = config.game;
    info!(
        "starting {} at depth {} on {} thread(s)",
        kind.title(),
        config.search.effective_depth(),
        config.search.threads
    );

    let mut controller = GameController::new(GameWrapper::new(kind, &config));
    let mut ai = AiHandle::spawn(&config.search)?;
    let think_delay = Duration::from_millis(args.think_delay_ms);
    let stdin = io::stdin();
    let mut stdin = stdin.lock();

    println!("{}", format!("=== {} ===", kind.title()).bold());
    if args.human != Seat::None {
        println!("Enter moves as {}. Type 'help' for commands.", kind.move_hint());
    }

    let mut plies = 0;
    while !controller.is_game_over() {
        if args.max_plies.is_some_and(|max| plies >= max) {
            println!("Reached the {} ply limit.", plies);
            break;
        }
        if controller.resolve_pass() {
            let side = controller.side_to_move().opponent();
            println!("{} has no move and passes.", controller.get_render_state().side_name(side));
            continue;
        }
        print_status(&controller);
        if args.human.is_human(controller.side_to_move()) {
            if !human_turn(&mut controller, &mut stdin)? {
                break;
            }
        } else {
            ai_turn(&mut controller, &mut ai, think_delay)?;
        }
        plies += 1;
    }

    print_status(&controller);
    print_result(&controller);
    println!("\n{}", controller.format_transcript());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
