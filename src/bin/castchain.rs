//! castchain CLI — play the actor-connection puzzle in a terminal.
//!
//! Usage:
//!   castchain play
//!   castchain search <query>
//!   castchain pool
//!   castchain connected <id> <id>

use castchain::{
    BackendConfig, ChainEngine, ChainOracle, CommitOutcome, ConnectionOracle, Entity, GameConfig,
    GameState, GameStatus, TmdbBackend,
};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "castchain",
    version,
    about = "Connect two actors through shared screen credits"
)]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,

    #[command(flatten)]
    game: GameArgs,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BackendArgs {
    /// TMDB API read access token
    #[arg(long, env = "TMDB_API_TOKEN", hide_env_values = true, global = true)]
    api_token: Option<String>,

    /// TMDB API root
    #[arg(long, env = "TMDB_BASE_URL", default_value = castchain::config::DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Request timeout in milliseconds
    #[arg(long, env = "TMDB_TIMEOUT_MS", default_value = "10000", global = true)]
    timeout_ms: u64,
}

#[derive(Args)]
struct GameArgs {
    /// Fewest connections a puzzle may ask for
    #[arg(long, env = "CASTCHAIN_MIN_HANDSHAKES", default_value = "2", global = true)]
    min_handshakes: usize,

    /// Most connections a puzzle may ask for
    #[arg(long, env = "CASTCHAIN_MAX_HANDSHAKES", default_value = "6", global = true)]
    max_handshakes: usize,

    /// Number of popular people puzzles are drawn from
    #[arg(long, env = "CASTCHAIN_POOL_SIZE", default_value = "100", global = true)]
    pool_size: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively
    Play,
    /// Search people by name
    Search {
        /// Name or part of a name
        query: String,
    },
    /// Show the popularity-ranked pool puzzles are drawn from
    Pool,
    /// Check whether two people share a credit
    Connected {
        /// First person id
        a: u64,
        /// Second person id
        b: u64,
    },
}

fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("castchain={},warn", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_oracle(cli: &Cli) -> Result<ConnectionOracle, String> {
    let game = GameConfig {
        min_handshakes: cli.game.min_handshakes,
        max_handshakes: cli.game.max_handshakes,
        pool_size: cli.game.pool_size,
        ..GameConfig::default()
    };
    game.validate().map_err(|e| format!("Invalid game settings: {}", e))?;

    let backend = BackendConfig {
        base_url: cli.backend.base_url.clone(),
        api_token: cli.backend.api_token.clone().unwrap_or_default(),
        request_timeout: Duration::from_millis(cli.backend.timeout_ms),
    };
    backend
        .validate()
        .map_err(|e| format!("{} (set --api-token or TMDB_API_TOKEN)", e))?;

    Ok(ConnectionOracle::new(
        Arc::new(TmdbBackend::new(&backend)),
        game,
    ))
}

fn print_people(people: &[Entity]) {
    if people.is_empty() {
        println!("No matches.");
        return;
    }
    println!("{:>3}  {:>10}  {:<32}  {:>10}", "#", "ID", "NAME", "POPULARITY");
    println!("{}", "-".repeat(62));
    for (i, person) in people.iter().enumerate() {
        println!(
            "{:>3}  {:>10}  {:<32}  {:>10.1}",
            i + 1,
            person.id.get(),
            person.display_name,
            person.popularity
        );
    }
}

async fn cmd_search(oracle: &ConnectionOracle, query: &str) -> i32 {
    if query.trim().chars().count() < oracle.config().min_query_len {
        eprintln!(
            "Error: queries need at least {} characters",
            oracle.config().min_query_len
        );
        return 1;
    }
    print_people(&oracle.search_entities(query).await);
    0
}

async fn cmd_pool(oracle: &ConnectionOracle) -> i32 {
    let pool = oracle.ranked_pool().await;
    if pool.is_empty() {
        eprintln!("Error: the popular listing returned nobody");
        return 1;
    }
    print_people(pool);
    0
}

async fn cmd_connected(oracle: &ConnectionOracle, a: u64, b: u64) -> i32 {
    let left = Entity::new(a, format!("#{}", a));
    let right = Entity::new(b, format!("#{}", b));
    let verdict = oracle.are_connected(&left, &right).await;
    if verdict.is_connected() {
        println!("{} and {} share at least one credit", a, b);
        0
    } else {
        println!("{} and {} are not connected ({:?})", a, b, verdict);
        1
    }
}

// ---------------------------------------------------------------------------
// Interactive play
// ---------------------------------------------------------------------------

const HELP: &str = "\
Commands:
  new            start a new puzzle
  focus N        edit slot N (0 is the start, the last slot is the target)
  unfocus        stop editing
  search TEXT    look people up for the focused slot
  pick N         put search result N into the focused slot
  show           redraw the board
  help           this text
  quit           leave";

fn render(state: &GameState) {
    println!();
    if state.chain.is_empty() {
        println!("No puzzle yet. Type 'new'.");
        return;
    }
    println!(
        "Connect {} to {} in {} handshakes",
        state.chain.start().map(|e| e.display_name.as_str()).unwrap_or("?"),
        state.chain.target().map(|e| e.display_name.as_str()).unwrap_or("?"),
        state.chain.handshakes()
    );
    for (i, slot) in state.chain.slots().iter().enumerate() {
        let marker = if state.focus == Some(i) { ">" } else { " " };
        let name = slot
            .as_ref()
            .map(|e| e.display_name.as_str())
            .unwrap_or("________");
        println!("{} [{}] {}", marker, i, name);
    }
    if !state.search.query.is_empty() {
        println!("Search: {}", state.search.query);
        for (i, person) in state.search.results.iter().enumerate() {
            println!("    {:>2}. {}", i + 1, person.display_name);
        }
    }
    if let Some(error) = &state.error {
        println!("! {}", error);
    }
    match state.status {
        GameStatus::Won => println!("You connected them! Type 'new' to play again."),
        GameStatus::Lost => println!("Out of moves."),
        GameStatus::Playing => {}
    }
}

async fn handle_line(engine: &ChainEngine, line: &str) -> bool {
    let (command, rest) = match line.trim().split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line.trim(), ""),
    };

    match command {
        "" => {}
        "quit" | "exit" | "q" => return false,
        "help" | "?" => println!("{}", HELP),
        "new" => {
            // failure already lands in the error message
            let _ = engine.start_new_puzzle().await;
        }
        "focus" | "f" => match rest.parse::<usize>() {
            Ok(index) if index < engine.chain().len() => engine.focus_slot(index),
            _ => println!("Usage: focus N (0..{})", engine.chain().len().saturating_sub(1)),
        },
        "unfocus" => engine.clear_focus(),
        "search" | "s" => engine.set_search_query(rest).await,
        "pick" | "p" => {
            let results = engine.search_results();
            let choice = rest
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| results.get(i).cloned());
            match choice {
                Some(person) => {
                    if let Ok(CommitOutcome::NoFocus) = engine.commit_selection(person).await {
                        println!("Focus a slot first.");
                    }
                }
                None => println!("Usage: pick N (a number from the search results)"),
            }
        }
        "show" => {}
        other => println!("Unknown command '{}'. Type 'help'.", other),
    }
    true
}

async fn cmd_play(oracle: ConnectionOracle) -> i32 {
    let config = oracle.config().clone();
    let engine = ChainEngine::new(Arc::new(oracle), &config);
    println!("{}", HELP);
    if let Err(e) = engine.start_new_puzzle().await {
        eprintln!("Error: {}", e);
    }
    render(&engine.snapshot());
    engine.clear_error();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        if !handle_line(&engine, &line).await {
            break;
        }
        render(&engine.snapshot());
        // the board shows each message once
        engine.clear_error();
    }
    0
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let oracle = match build_oracle(&cli) {
        Ok(oracle) => oracle,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Play => cmd_play(oracle).await,
        Commands::Search { query } => cmd_search(&oracle, &query).await,
        Commands::Pool => cmd_pool(&oracle).await,
        Commands::Connected { a, b } => cmd_connected(&oracle, a, b).await,
    };
    std::process::exit(code);
}
