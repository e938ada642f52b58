use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize;
use library_ledger::{
    CatalogReport, LibraryConfig, LibraryError, LibraryManager, LoggingListener, Result,
    script::{self, Outcome},
};

/// Command-line arguments for the library ledger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Command script to run, or `-` to read one from stdin
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Start from an empty catalog instead of the sample data
    #[arg(long)]
    no_seed: bool,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Build the manager, run the script or the overview, print the summary
fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => LibraryConfig::from_file(path)?,
        None => LibraryConfig::default(),
    };
    let mut manager = LibraryManager::with_config(config)?;
    manager.add_listener(Box::new(LoggingListener));

    if !args.no_seed {
        seed_sample_catalog(&mut manager)?;
    }

    match &args.script {
        Some(path) => run_script(&mut manager, &script::read_source(path)?)?,
        None => {
            println!("{}", "Library Ledger".green().bold());
            println!("==============\n");
            print!("{}", CatalogReport::render_catalog(manager.library()));
            println!();
            print!("{}", CatalogReport::render_members(manager.library()));
        }
    }

    let summary = manager.library_summary();
    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| LibraryError::Output(format!("Failed to render summary: {e}")))?;
        println!("{json}");
    } else {
        println!("\n{} {summary}", "Summary:".yellow().bold());
    }
    Ok(())
}

/// Run every command, reporting invalid input per line and carrying on
fn run_script(manager: &mut LibraryManager, source: &str) -> Result<()> {
    script::run_script(manager, source, |line, outcome| match outcome {
        Outcome::Done(message) => println!("{} {message}", "ok".green()),
        Outcome::Rejected(message) => println!("{} {message}", "no".yellow()),
        Outcome::Report(text) => println!("{}", text.trim_end()),
        Outcome::Invalid(err) => println!("{} line {line}: {err}", "invalid".red()),
    })
}

/// Add the demonstration books and members, with B001 out to M001
fn seed_sample_catalog(manager: &mut LibraryManager) -> Result<()> {
    manager.add_book("fiction", "B001", "The Great Gatsby", "F. Scott Fitzgerald", 1925)?;
    manager.add_book("non-fiction", "B002", "A Brief History of Time", "Stephen Hawking", 1988)?;
    manager.add_book(
        "reference",
        "B003",
        "Oxford English Dictionary",
        "Oxford University Press",
        2010,
    )?;

    manager.add_member("M001", "John Doe");
    manager.add_member("M002", "Jane Smith");

    manager.borrow_book("B001", "M001");
    Ok(())
}
