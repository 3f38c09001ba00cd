//! Check command: evaluates a single ref change.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::Parser;
use termcolor::StandardStream;

use super::context::{color_choice, PushArgs};
use crate::refs::RefChange;
use crate::report::{write_text, OutputFormat, Report, ReportOptions};

/// Checks one ref change and prints the report to stdout.
#[derive(Parser)]
pub struct CheckCommand {
    /// Full ref name, e.g. refs/heads/main.
    #[arg(value_name = "REF")]
    pub ref_id: String,

    /// Object the ref pointed at before (all zeros for a new ref).
    #[arg(value_name = "OLD")]
    pub old: String,

    /// Object the ref points at after (all zeros for a deleted ref).
    #[arg(value_name = "NEW")]
    pub new: String,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: String,

    #[command(flatten)]
    push: PushArgs,
}

impl CheckCommand {
    /// Executes the check command.
    pub fn execute(self) -> Result<()> {
        let output_format: OutputFormat = self
            .format
            .parse()
            .map_err(|()| anyhow::anyhow!("Unknown output format: {}", self.format))?;

        let ref_change = RefChange::new(&self.ref_id, &self.old, &self.new)
            .with_context(|| format!("Invalid ref change for {}", self.ref_id))?;

        let file = self.push.load_policy()?;
        let service = self.push.service(&file)?;
        let violations = service
            .check_ref_change(&file.settings, &ref_change)
            .with_context(|| format!("Failed to check {}", ref_change.ref_id))?;

        let report = Report::new(ref_change.ref_id, violations);
        let options = ReportOptions::from_settings(&file.settings);

        match output_format {
            OutputFormat::Text => {
                let mut stdout = StandardStream::stdout(color_choice(io::stdout().is_terminal()));
                write_text(std::slice::from_ref(&report), &options, &mut stdout)
                    .context("Failed to write report")?;
            }
            format => println!("{}", report.render(format, &options)?),
        }

        if !report.is_clean() {
            std::process::exit(1);
        }
        Ok(())
    }
}
