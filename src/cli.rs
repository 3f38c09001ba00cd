//! CLI interface for commit-gate.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod check;
pub mod config;
pub mod context;
pub mod hook;

/// commit-gate: Commit acceptance policy for git pushes.
#[derive(Parser)]
#[command(name = "commit-gate")]
#[command(about = "Enforces commit acceptance policies on pushed refs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Runs as a pre-receive hook, reading ref changes from stdin.
    Hook(hook::HookCommand),
    /// Checks a single ref change.
    Check(check::CheckCommand),
    /// Settings file operations.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Hook(hook_cmd) => hook_cmd.execute(),
            Commands::Check(check_cmd) => check_cmd.execute(),
            Commands::Config(config_cmd) => config_cmd.execute(),
        }
    }
}
