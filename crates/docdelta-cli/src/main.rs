//! docdelta CLI
//!
//! Command-line interface for comparing plain-text documents

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod settings;

#[derive(Debug, Parser)]
#[command(name = "docdelta")]
#[command(about = "docdelta - Page-aware document text comparison", long_about = None)]
struct Cli {
    /// Settings file (TOML); flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two documents
    Compare(commands::compare::CompareArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = settings::CliSettings::load(cli.config.as_deref()).and_then(|settings| {
        match cli.command {
            Commands::Compare(args) => commands::compare::execute(args, settings),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
