// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

mod anonymizer;
mod cmd;
mod compression;
mod error;
mod parser;
mod progress;
mod schema;

use clap::Parser;
use cmd::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cmd::run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
