//! CLI module for the workflow engine
//!
//! Subcommands:
//! - `run`: execute a workflow document from a JSON file

pub mod run;

use clap::{Parser, Subcommand};

/// Flowline - declarative workflow execution engine
#[derive(Parser)]
#[command(name = "flowline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute a workflow document and print the run result
    Run(run::RunArgs),
}
