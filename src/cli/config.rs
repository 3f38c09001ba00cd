//! Configuration-related CLI commands.

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::context::ConfigArgs;

/// Configuration operations.
#[derive(Parser)]
pub struct ConfigCommand {
    /// Configuration subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Reports every invalid option in the settings file.
    Validate(ValidateCommand),
}

/// Validate command options.
#[derive(Parser)]
pub struct ValidateCommand {
    #[command(flatten)]
    config: ConfigArgs,
}

impl ConfigCommand {
    /// Executes the config command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            ConfigSubcommands::Validate(validate_cmd) => validate_cmd.execute(),
        }
    }
}

impl ValidateCommand {
    /// Executes the validate command, exiting non-zero when problems are found.
    pub fn execute(self) -> Result<()> {
        let path = self.config.path()?;
        let file = self.config.load()?;
        let errors = file.validate();

        if errors.is_empty() {
            println!("✅ {} is valid", path.display());
            return Ok(());
        }

        println!("❌ {} has {} problem(s):", path.display(), errors.len());
        for error in &errors {
            println!("   {error}");
        }
        std::process::exit(1);
    }
}
