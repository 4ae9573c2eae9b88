mod config;
mod items;
mod output;
mod prompt;
mod store;

use clap::Parser;
use mergerank_core::{Decision, NextComparison, RankError, RankingSession};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::config::MergerankConfig;
use crate::prompt::Answer;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "mergerank", version, about = "Rank items with human pairwise comparisons, merge-sort style")]
struct Cli {
    /// Path to config file (default: ~/.config/mergerank/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session state file (default: mergerank-state.json)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start a ranking session from a list of items
    Start(StartArgs),
    /// Check out the next comparison
    Next {
        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Submit a decision for a comparison
    Decide(DecideArgs),
    /// Answer comparisons interactively until done or quit
    Judge,
    /// Show session progress
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Print the final ranking
    Export {
        #[arg(long)]
        json: bool,
    },
    /// Create a default config file (at --config, or ~/.config/mergerank/config.toml)
    Init,
}

#[derive(clap::Args)]
struct StartArgs {
    /// File with one item per line, or a JSON array of strings
    #[arg(long)]
    items: PathBuf,

    /// Only rank the top N items
    #[arg(long)]
    max_pass: Option<usize>,

    /// Treat the first line of the items file as column headers
    #[arg(long)]
    header: bool,

    /// Overwrite an existing state file
    #[arg(long)]
    force: bool,
}

#[derive(clap::Args)]
struct DecideArgs {
    /// Comparison path, as printed by `next` ("" for the root)
    #[arg(long, allow_hyphen_values = true)]
    path: String,

    /// Input position of the left item
    #[arg(long)]
    left: usize,

    /// Input position of the right item
    #[arg(long)]
    right: usize,

    /// SORT, STRIKE (or SKIP), or PASS
    #[arg(long)]
    command: String,

    /// l or r: which item the command applies to
    #[arg(long)]
    side: String,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Init = cli.command {
        let path = cli.config.clone().unwrap_or_else(config::config_path);
        config::create_default_config(&path);
        println!("Created config at {}", path.display());
        println!("Edit it to set your default state file, cutoff, etc.");
        return;
    }

    let cfg = config::load_config(cli.config.as_deref());
    let state_path = cfg.state_path(cli.state.clone());

    match cli.command {
        Commands::Start(args) => run_start(args, &cfg, &state_path),
        Commands::Next { json } => run_next(&state_path, json),
        Commands::Decide(args) => run_decide(args, &state_path),
        Commands::Judge => run_judge(&state_path),
        Commands::Status { json } => {
            let session = store::load_session(&state_path);
            output::print_progress(&session.progress(), json);
        }
        Commands::Export { json } => run_export(&state_path, json),
        Commands::Init => unreachable!("handled above"),
    }
}

fn run_start(args: StartArgs, cfg: &MergerankConfig, state_path: &Path) {
    let content = std::fs::read_to_string(&args.items)
        .unwrap_or_else(|e| bail(format!("Failed to read items file {}: {e}", args.items.display())));
    let list = items::parse_items(&content, cfg.header(args.header)).unwrap_or_else(|e| bail(e));

    if list.items.len() < 2 {
        bail(format!("Need at least 2 items to rank, got {}", list.items.len()));
    }

    let total = list.items.len();
    let session = RankingSession::new(list.items, list.headers, cfg.max_pass(args.max_pass))
        .unwrap_or_else(|e| bail(format!("Cannot start session: {e}")));
    store::create_session(state_path, &session, args.force);

    println!(
        "Ranking {} items (top {}). Session saved to {}",
        total,
        session.max_pass(),
        state_path.display()
    );
}

fn run_next(state_path: &Path, json: bool) {
    match store::update_session(state_path, |s| s.next_comparison()) {
        NextComparison::Compare(c) => output::print_comparison(&c, json),
        NextComparison::NoWork => println!("No work available right now. Try again shortly."),
        NextComparison::Finished => println!("Ranking finished. Run `mergerank export`."),
    }
}

fn run_decide(args: DecideArgs, state_path: &Path) {
    let (result, finished) = store::update_session(state_path, |s| {
        let result = s.submit_decision(&args.path, args.left, args.right, &args.command, &args.side);
        (result, s.is_finished())
    });
    report_decision(result);
    if finished {
        println!("Ranking finished. Run `mergerank export`.");
    }
}

fn report_decision(result: Result<(), RankError>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_recoverable() => {
            eprintln!("Decision ignored: {e}");
        }
        Err(e) => bail(e),
    }
}

/// Interactive judging. The state lock is only held while dispatching or
/// applying, never while waiting on the judge, so other judges keep working.
fn run_judge(state_path: &Path) {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answered = 0;

    loop {
        let (next, headers) = store::update_session(state_path, |s| (s.next_comparison(), s.headers().to_vec()));
        let c = match next {
            NextComparison::Compare(c) => c,
            NextComparison::NoWork => {
                println!("No work available right now. Try again shortly.");
                break;
            }
            NextComparison::Finished => {
                println!("Ranking finished after {answered} answers. Run `mergerank export`.");
                break;
            }
        };

        println!("\n{}", prompt::build_prompt(&c, &headers));
        let answer = loop {
            print!("> ");
            let _ = io::stdout().flush();
            let Some(line) = lines.next() else {
                break Answer::Quit;
            };
            let line = line.unwrap_or_else(|e| bail(format!("Failed to read from stdin: {e}")));
            match prompt::parse_answer(&line) {
                Some(answer) => break answer,
                None => println!("Please answer 1, 2, s1, s2, p1, p2 or q."),
            }
        };

        let Answer::Decide(command, side) = answer else {
            println!("Stopped after {answered} answers. Progress is saved.");
            break;
        };

        let decision = Decision {
            left: c.left.position,
            right: c.right.position,
            command,
            side,
        };
        let result = store::update_session(state_path, |s| s.apply_decision(&c.path, decision));
        if result.is_ok() {
            answered += 1;
        }
        report_decision(result);
    }
}

fn run_export(state_path: &Path, json: bool) {
    let session = store::load_session(state_path);
    let ranking = session.final_ranking().unwrap_or_else(|| {
        let p = session.progress();
        bail(format!(
            "Ranking is not finished yet ({} of {} items placed). Keep judging.",
            p.accepted + p.settled,
            p.max_pass
        ))
    });

    if json {
        output::print_json(&ranking, session.headers(), session.max_pass());
    } else {
        output::print_table(&ranking, session.headers(), session.max_pass());
    }
}
