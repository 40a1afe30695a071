//! CLI frontend for the snowball simulator.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::RosterMode;
use commands::play::{PlayArgs, SummaryFormat};
use commands::verify::VerifyTarget;

#[derive(Parser)]
#[command(
    name = "snowball",
    about = "Deterministic snowball fight simulator with an append-only event ledger",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine activity at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log engine activity at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and print the timeline and scoreboard
    Play {
        /// RNG seed (default: 42, or the config file's)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of turns (default: 20, or the config file's)
        #[arg(short, long)]
        turns: Option<u32>,

        /// Roster directory (one agent per .json file) or JSON array file
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Which agents take the field: open (everyone) or classic (the original six)
        #[arg(short, long, value_enum, default_value_t = RosterMode::Open)]
        mode: RosterMode,

        /// Built-in scenario name or path to a scenario JSON file
        #[arg(long)]
        scenario: Option<String>,

        /// Audit mode: transparent, stabilize, conditional
        #[arg(long)]
        audit_mode: Option<String>,

        /// Simulation config JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the ledger as JSONL to this path
        #[arg(short, long)]
        ledger: Option<PathBuf>,

        /// Show at most this many timeline entries (0 = all)
        #[arg(long, default_value = "0")]
        timeline: usize,

        /// Print a machine-readable summary
        #[arg(long, value_enum)]
        summary: Option<SummaryFormat>,

        /// Audit the ledger once the run is over
        #[arg(long)]
        audit: bool,

        /// Skip the turn-0 origin events
        #[arg(long)]
        no_prologue: bool,
    },

    /// Run the built-in verification suites
    Verify {
        /// Which suite to run
        #[arg(value_enum, default_value = "all")]
        target: VerifyTarget,
    },

    /// Show the roster that a run would use
    Roster {
        /// Roster directory or JSON array file (default: built-in sample)
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Which agents take the field
        #[arg(short, long, value_enum, default_value_t = RosterMode::Open)]
        mode: RosterMode,
    },
}

fn init_tracing(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    let result = match cli.command {
        Commands::Play {
            seed,
            turns,
            roster,
            mode,
            scenario,
            audit_mode,
            config,
            ledger,
            timeline,
            summary,
            audit,
            no_prologue,
        } => commands::play::run(&PlayArgs {
            seed,
            turns,
            roster,
            mode,
            scenario,
            audit_mode,
            config,
            ledger,
            timeline,
            summary,
            audit,
            no_prologue,
        }),
        Commands::Verify { target } => commands::verify::run(target),
        Commands::Roster { roster, mode } => commands::roster::run(roster.as_deref(), mode),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
