//! Rejection reports shown to the pusher.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use termcolor::{Color, ColorSpec, NoColor, WriteColor};

use crate::config::keys;
use crate::settings::SettingsSource;
use crate::violation::{Violation, ViolationKind};

/// Violations found for one ref change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Ref the violations belong to.
    pub ref_id: String,
    /// Violations, in evaluation order.
    pub violations: Vec<Violation>,
}

impl Report {
    /// Creates a report for `ref_id`.
    pub fn new(ref_id: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            ref_id: ref_id.into(),
            violations,
        }
    }

    /// True when the ref change may be accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Renders the report in the requested format.
    pub fn render(&self, format: OutputFormat, options: &ReportOptions) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(render_text(std::slice::from_ref(self), options)),
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(self).context("Failed to serialize report to YAML")
            }
        }
    }
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Site-specific text around the violation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Printed before the violations.
    pub header: Option<String>,
    /// Printed after the violations.
    pub footer: Option<String>,
    /// Extra explanation per violation kind, in [`ViolationKind::ALL`] order.
    pub explanations: Vec<(ViolationKind, String)>,
}

impl ReportOptions {
    /// Reads `errorMessageHeader`, `errorMessageFooter` and every
    /// `errorMessage.<KIND>` option.
    pub fn from_settings(settings: &dyn SettingsSource) -> Self {
        let explanations = ViolationKind::ALL
            .into_iter()
            .filter_map(|kind| {
                settings
                    .get_string(&format!("{}{kind}", keys::ERROR_MESSAGE_PREFIX))
                    .map(|text| (kind, text))
            })
            .collect();

        Self {
            header: settings.get_string(keys::ERROR_MESSAGE_HEADER),
            footer: settings.get_string(keys::ERROR_MESSAGE_FOOTER),
            explanations,
        }
    }
}

/// Writes the text form of `reports`, coloring violation lines.
///
/// Writes nothing when no report has violations.
pub fn write_text(
    reports: &[Report],
    options: &ReportOptions,
    out: &mut dyn WriteColor,
) -> io::Result<()> {
    if reports.iter().all(Report::is_clean) {
        return Ok(());
    }

    if let Some(header) = &options.header {
        writeln!(out, "{header}")?;
        writeln!(out)?;
    }

    let mut kinds = Vec::new();
    for report in reports {
        for violation in &report.violations {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(out, "{}", report.ref_id)?;
            out.reset()?;
            writeln!(out, ": {}", violation.message)?;

            if let Some(kind) = violation.kind {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
    }

    for (kind, explanation) in &options.explanations {
        if kinds.contains(kind) {
            writeln!(out)?;
            writeln!(out, "{explanation}")?;
        }
    }

    if let Some(footer) = &options.footer {
        writeln!(out)?;
        writeln!(out, "{footer}")?;
    }

    Ok(())
}

/// Renders `reports` as uncolored text.
pub fn render_text(reports: &[Report], options: &ReportOptions) -> String {
    let mut out = NoColor::new(Vec::new());
    // Writing into a Vec cannot fail.
    let _ = write_text(reports, options, &mut out);
    String::from_utf8_lossy(&out.into_inner()).into_owned()
}
