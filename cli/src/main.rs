//! # 2048 CLI
//!
//! Command-line driver for the 2048 engine: play interactively in the
//! terminal (with undo and an auto-player key) or run headless simulations
//! with a chosen policy.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use flexi_logger::Logger;
use log::info;
use merge2048_core::{Direction, Session, SessionConfig};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};

#[derive(Parser, Debug)]
#[command(name = "merge2048")]
#[command(author, version, about = "Play 2048 in the terminal or run simulations")]
struct Args {
    /// Number of episodes to run in headless mode (interactive if omitted)
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed for deterministic runs (OS entropy if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum steps per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "greedy")]
    policy: Policy,

    /// Keep at most this many undo snapshots
    #[arg(long)]
    undo_limit: Option<usize>,

    /// Probability that a spawn places a power-up marker
    #[arg(long, default_value = "0.0")]
    power_ups: f64,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,

    /// Print the headless summary as JSON
    #[arg(long)]
    json: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum Policy {
    /// Greedy auto-player: biggest immediate merge score
    Greedy,
    /// Random valid moves
    Random,
    /// Cycle through actions: Left, Down, Right, Up
    Cycle,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _logger = Logger::try_with_env_or_str(&args.log_level)?
        .format(flexi_logger::default_format)
        .start()?;

    let mut config = SessionConfig::default().with_power_up_chance(args.power_ups);
    config.seed = args.seed;
    config.undo_limit = args.undo_limit;

    match args.episodes {
        Some(episodes) => run_headless(&args, config, episodes),
        None => run_interactive(config),
    }
}

const CONTROLS: &str = "Controls: WASD/Arrows move | I AI move | U undo | N new game | H history | Q quit";

fn redraw(session: &Session, comment: &str) -> Result<()> {
    print!("\x1b[2J\x1b[H"); // Clear screen
    println!("=== 2048 ===");
    println!("{}\n", CONTROLS);
    print!("{}", session);
    println!("  {}", comment);
    io::stdout().flush()?;
    Ok(())
}

/// Run interactive mode where user plays with keyboard.
fn run_interactive(config: SessionConfig) -> Result<()> {
    let _raw = RawMode::enable();

    let mut session = Session::new(config);
    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];
    redraw(&session, "Good luck!")?;

    loop {
        let bytes_read = stdin.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        let (comment, step) = match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(dir) => (format!("Moved {}", dir), Some(session.step(dir))),
            InputAction::Ai => match session.ai_step() {
                Some((dir, result)) => (format!("AI moved {}", dir), Some(result)),
                None => ("AI has no move".to_string(), None),
            },
            InputAction::Undo => {
                let msg = if session.undo() {
                    "Move undone"
                } else {
                    "Nothing to undo"
                };
                (msg.to_string(), None)
            }
            InputAction::NewGame => {
                session.new_game();
                ("New game started!".to_string(), None)
            }
            InputAction::History => {
                println!();
                for line in session.move_log().lines() {
                    println!("{}", line);
                }
                io::stdout().flush()?;
                continue;
            }
            InputAction::Quit => {
                println!("\nGoodbye!");
                break;
            }
            InputAction::None => continue,
        };

        redraw(&session, &comment)?;
        if let Some(result) = step {
            if result.gained > 0 {
                println!("  +{} points!", result.gained);
            }
            for p in &result.power_ups {
                println!("  Power-up: {}", p);
            }
            for a in &result.unlocked {
                println!("  Achievement unlocked: {}", a);
            }
            if result.game_over {
                print_game_over(&session);
            }
        }
    }
    Ok(())
}

fn print_game_over(session: &Session) {
    println!("\n  *** GAME OVER ***");
    println!("  Final Score: {}", session.score());
    println!("  Max Tile: {}", session.max_tile());
    for (i, score) in session.high_scores().scores().iter().enumerate() {
        println!("  High Score {}: {}", i + 1, score);
    }
    for (i, score) in session.leaderboard().ranked().iter().enumerate() {
        println!("  Rank {}: {}", i + 1, score);
    }
    println!("\n  Press N to start a new game or Q to quit");
}

#[derive(Serialize)]
struct Summary {
    episodes: u32,
    policy: Policy,
    seed: Option<u64>,
    max_steps: u32,
    avg_score: f64,
    median_score: f64,
    min_score: u64,
    max_score: u64,
    max_tile_overall: u32,
    tile_distribution: BTreeMap<u32, u32>,
    high_scores: Vec<u64>,
    leaderboard: Vec<u64>,
    achievements: Vec<String>,
}

/// Run headless simulation mode.
fn run_headless(args: &Args, config: SessionConfig, episodes: u32) -> Result<()> {
    let mut session = Session::new(config);
    let mut scores: Vec<u64> = Vec::with_capacity(episodes as usize);
    let mut tile_distribution = BTreeMap::new();

    // Use a separate RNG for action selection
    let mut action_rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(1000)),
        None => SmallRng::from_entropy(),
    };

    for episode in 0..episodes {
        if episode > 0 {
            session.new_game();
        }
        let mut steps = 0;
        let mut action_cycle = 0;

        while !session.is_game_over() && (args.max_steps == 0 || steps < args.max_steps) {
            let action = match args.policy {
                Policy::Greedy => session.best_move(),
                Policy::Random => select_random_action(&session, &mut action_rng),
                Policy::Cycle => select_cycle_action(&session, &mut action_cycle),
            };

            let Some(dir) = action else {
                break; // No valid actions
            };
            session.step(dir);
            steps += 1;

            if args.verbose {
                println!("Episode {} Step {}: {}", episode + 1, steps, dir);
                print!("{}", session);
            }
        }

        // Episodes cut short by max_steps still count towards the scores.
        if !session.is_game_over() {
            session.record_score(session.score());
        }

        let score = session.score();
        let max_tile = session.max_tile();
        scores.push(score);
        *tile_distribution.entry(max_tile).or_insert(0u32) += 1;
        info!(
            "episode {} finished: score={} max_tile={} steps={}",
            episode + 1,
            score,
            max_tile,
            steps
        );
    }

    let summary = summarize(args, episodes, scores, tile_distribution, &session);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn summarize(
    args: &Args,
    episodes: u32,
    mut scores: Vec<u64>,
    tile_distribution: BTreeMap<u32, u32>,
    session: &Session,
) -> Summary {
    scores.sort_unstable();
    let n = scores.len();
    let avg_score = if n == 0 {
        0.0
    } else {
        scores.iter().sum::<u64>() as f64 / n as f64
    };
    let median_score = match n {
        0 => 0.0,
        _ if n % 2 == 0 => (scores[n / 2 - 1] + scores[n / 2]) as f64 / 2.0,
        _ => scores[n / 2] as f64,
    };

    Summary {
        episodes,
        policy: args.policy,
        seed: args.seed,
        max_steps: args.max_steps,
        avg_score,
        median_score,
        min_score: scores.first().copied().unwrap_or(0),
        max_score: scores.last().copied().unwrap_or(0),
        max_tile_overall: tile_distribution.keys().last().copied().unwrap_or(0),
        tile_distribution,
        high_scores: session.high_scores().scores().to_vec(),
        leaderboard: session.leaderboard().ranked(),
        achievements: session.achievements().iter().map(|a| a.to_string()).collect(),
    }
}

fn print_summary(s: &Summary) {
    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("episodes={}", s.episodes);
    println!("policy={:?}", s.policy);
    match s.seed {
        Some(seed) => println!("seed={}", seed),
        None => println!("seed=entropy"),
    }
    println!("max_steps={}", s.max_steps);
    println!("avg_score={:.2}", s.avg_score);
    println!("median_score={:.2}", s.median_score);
    println!("min_score={}", s.min_score);
    println!("max_score={}", s.max_score);
    println!("max_tile_overall={}", s.max_tile_overall);

    let tiles: Vec<String> = s
        .tile_distribution
        .iter()
        .map(|(tile, count)| format!("{}:{}", tile, count))
        .collect();
    println!("tile_distribution={}", tiles.join(","));

    let join = |v: &[u64]| v.iter().map(u64::to_string).collect::<Vec<_>>().join(",");
    println!("high_scores={}", join(&s.high_scores));
    println!("leaderboard={}", join(&s.leaderboard));
    println!("achievements={}", s.achievements.join(";"));
}

/// Select a random valid action.
fn select_random_action(session: &Session, rng: &mut SmallRng) -> Option<Direction> {
    let legal = session.legal_moves();
    let valid: Vec<Direction> = Direction::ALL
        .into_iter()
        .zip(legal)
        .filter_map(|(dir, ok)| ok.then_some(dir))
        .collect();
    valid.choose(rng).copied()
}

/// Select action in a cycle: Left, Down, Right, Up.
fn select_cycle_action(session: &Session, cycle: &mut usize) -> Option<Direction> {
    let order = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];
    let legal = session.legal_moves();

    // Try actions in cycle order, starting from current position
    for _ in 0..4 {
        let action = order[*cycle % 4];
        *cycle += 1;
        let idx = Direction::ALL
            .iter()
            .position(|&d| d == action)
            .unwrap_or_default();
        if legal[idx] {
            return Some(action);
        }
    }

    None
}

enum InputAction {
    Move(Direction),
    Ai,
    Undo,
    NewGame,
    History,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        // Control keys
        [b'i'] | [b'I'] => InputAction::Ai,
        [b'u'] | [b'U'] => InputAction::Undo,
        [b'n'] | [b'N'] | [b'r'] | [b'R'] => InputAction::NewGame,
        [b'h'] | [b'H'] => InputAction::History,
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc

        _ => InputAction::None,
    }
}

/// Puts the terminal into unbuffered, no-echo mode until dropped.
struct RawMode;

// Platform-specific terminal raw mode handling
#[cfg(unix)]
impl RawMode {
    fn enable() -> Self {
        set_canonical(false);
        RawMode
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        set_canonical(true);
    }
}

#[cfg(unix)]
fn set_canonical(on: bool) {
    use std::os::unix::io::AsRawFd;
    let fd = io::stdin().as_raw_fd();
    // SAFETY: termios is plain data and tcgetattr fully initializes it
    // before it is read.
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut termios) != 0 {
            return;
        }
        if on {
            termios.c_lflag |= libc::ICANON | libc::ECHO;
        } else {
            termios.c_lflag &= !(libc::ICANON | libc::ECHO);
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;
        }
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(not(unix))]
impl RawMode {
    // On non-Unix systems, interactive mode needs Enter after each key
    fn enable() -> Self {
        RawMode
    }
}
