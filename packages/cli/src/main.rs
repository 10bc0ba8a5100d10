mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, normalize, references, text, CheckArgs, NormalizeArgs, ReferencesArgs, TextArgs};
use folio_workspace::WorkspaceConfig;
use tracing::Level;

/// Folio CLI - inspect and repair rich-text documents
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate stored documents
    Check(CheckArgs),

    /// Normalize a stored document
    Normalize(NormalizeArgs),

    /// Export a document as plain text
    Text(TextArgs),

    /// Number the citations of a stored form
    References(ReferencesArgs),
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = WorkspaceConfig::load(&cwd)?;

    match cli.command {
        Command::Check(args) => check(args),
        Command::Normalize(args) => normalize(args),
        Command::Text(args) => text(args, &config),
        Command::References(args) => references(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
