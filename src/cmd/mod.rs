mod anonymize;
mod logging;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sql-anonymizer")]
#[command(author = "Helge Sverre <helge.sverre@gmail.com>")]
#[command(version)]
#[command(
    about = "Anonymize sensitive columns in MySQL dump files, preserving value shapes",
    long_about = None
)]
pub struct Cli {
    /// Input SQL dump (supports .gz, .bz2, .xz, .zst compression)
    #[arg(required_unless_present = "completions")]
    pub file: Option<PathBuf>,

    /// YAML file listing the table columns to anonymize
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file (default: <FILE>.output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbose output; -v traces every rewritten line, -vv every value
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Add descriptive comments after each table definition
    #[arg(long)]
    pub comments: bool,

    /// Write one row per line in rewritten INSERT statements
    #[arg(long)]
    pub expand_inserts: bool,

    /// Split rows on every literal `),(` instead of tracking quotes
    #[arg(long)]
    pub literal_row_split: bool,

    /// Random seed for reproducible output (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fail when a configured column is missing from its table
    #[arg(long)]
    pub strict: bool,

    /// Show progress during processing
    #[arg(short, long)]
    pub progress: bool,

    /// Process the dump without writing output
    #[arg(long)]
    pub dry_run: bool,

    /// Print per-table column counts and declared type frequencies
    #[arg(long)]
    pub stats: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Generate a YAML config skeleton from the dump's schema
    #[arg(long, conflicts_with = "config")]
    pub generate_config: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(shell) = cli.completions {
        generate(
            shell,
            &mut Cli::command(),
            "sql-anonymizer",
            &mut io::stdout(),
        );
        return Ok(());
    }

    logging::init_logging(cli.verbose, cli.quiet)?;
    anonymize::run(cli)
}
