//! Hook command: evaluates a push as git's `pre-receive` hook.

use std::io::{self, BufRead, IsTerminal};

use anyhow::{Context, Result};
use clap::Parser;
use termcolor::StandardStream;
use tracing::info;

use super::context::{color_choice, PushArgs};
use crate::refs::RefChange;
use crate::report::{write_text, Report, ReportOptions};
use crate::service::PolicyService;
use crate::settings::SettingsSource;

/// Reads `<old> <new> <ref>` lines from stdin and rejects the push on any violation.
#[derive(Parser)]
pub struct HookCommand {
    #[command(flatten)]
    push: PushArgs,
}

impl HookCommand {
    /// Executes the hook command.
    pub fn execute(self) -> Result<()> {
        let file = self.push.load_policy()?;
        let service = self.push.service(&file)?;

        let stdin = io::stdin();
        let reports = check_push(&service, &file.settings, stdin.lock())?;

        if reports.iter().all(Report::is_clean) {
            return Ok(());
        }

        let options = ReportOptions::from_settings(&file.settings);
        let mut stderr = StandardStream::stderr(color_choice(io::stderr().is_terminal()));
        write_text(&reports, &options, &mut stderr).context("Failed to write report")?;
        std::process::exit(1);
    }
}

/// Checks every ref change listed in `input`, one per line.
pub fn check_push(
    service: &PolicyService,
    settings: &dyn SettingsSource,
    input: impl BufRead,
) -> Result<Vec<Report>> {
    let mut reports = Vec::new();

    for line in input.lines() {
        let line = line.context("Failed to read ref changes from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let ref_change: RefChange = line
            .parse()
            .with_context(|| format!("Invalid ref change: {line}"))?;
        let violations = service
            .check_ref_change(settings, &ref_change)
            .with_context(|| format!("Failed to check {}", ref_change.ref_id))?;

        info!(ref_id = %ref_change.ref_id, violations = violations.len(), "Checked ref change");
        reports.push(Report::new(ref_change.ref_id, violations));
    }

    Ok(reports)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::settings::SettingsMap;
    use crate::test_utils::{commit_with_message, test_user, MockCommitSource, MockIssueTracker};
    use crate::violation::ViolationKind;

    fn service(message: &str) -> PolicyService {
        PolicyService::new(
            Box::new(test_user()),
            Box::new(MockCommitSource::new(vec![commit_with_message(message)])),
            Box::new(MockIssueTracker::new()),
        )
    }

    const INPUT: &str = "\
5773fc438a763e64df8a9c5c32f3b1e83010ada7 35d938b060bb361503e021f228e43351f1a71551 refs/heads/master

0000000000000000000000000000000000000000 35d938b060bb361503e021f228e43351f1a71551 refs/tags/v1.0
";

    #[test]
    fn every_ref_change_gets_a_report() {
        let settings = SettingsMap::new().with("commitMessageRegex", "[a-z ]+");
        let reports = check_push(&service("Bad Message"), &settings, INPUT.as_bytes()).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].ref_id, "refs/heads/master");
        assert_eq!(reports[0].violations.len(), 1);
        assert_eq!(reports[0].violations[0].kind, Some(ViolationKind::CommitRegex));
        assert_eq!(reports[1].ref_id, "refs/tags/v1.0");
        assert!(reports[1].is_clean());
    }

    #[test]
    fn clean_push_has_only_clean_reports() {
        let settings = SettingsMap::new().with("commitMessageRegex", "[a-z ]+");
        let reports = check_push(&service("good message"), &settings, INPUT.as_bytes()).unwrap();
        assert!(reports.iter().all(Report::is_clean));
    }

    #[test]
    fn malformed_line_is_an_error() {
        let err = check_push(&service("x"), &SettingsMap::new(), "garbage\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Invalid ref change: garbage"));
    }

    #[test]
    fn invalid_settings_abort_the_hook() {
        let settings = SettingsMap::new().with("excludeByRegex", "(");
        let err = check_push(&service("x"), &settings, INPUT.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Failed to check refs/heads/master"));
    }
}
