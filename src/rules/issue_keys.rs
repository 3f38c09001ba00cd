//! Issue reference rule.

use tracing::{debug, info};

use crate::commit::Commit;
use crate::config::PolicyConfig;
use crate::issue::IssueKey;
use crate::tracker::{IssueTracker, TrackerError};
use crate::violation::Violation;

/// Requires the commit message to reference at least one valid issue.
///
/// Violations reported by the tracker for individual issues are passed
/// through with the commit id prefixed.
pub fn check_issue_keys(
    config: &PolicyConfig,
    tracker: &dyn IssueTracker,
    commit: &Commit,
) -> Result<Vec<Violation>, TrackerError> {
    if !config.require_jira_issue {
        return Ok(Vec::new());
    }

    if !tracker.application_link_exists() {
        return Ok(vec![Violation::general(
            "Unable to verify JIRA issue because JIRA Application Link does not exist",
        )
        .for_commit(&commit.id)]);
    }

    let mut violations = Vec::new();
    let mut found_issue = false;

    for key in IssueKey::scan_message(&commit.message) {
        if config.ignore_unknown_issue_project_keys && !tracker.project_exists(&key)? {
            debug!(commit = %commit.id, %key, "Ignoring issue key with unknown project");
            continue;
        }

        found_issue = true;
        violations.extend(
            tracker
                .issue_exists(&key)?
                .into_iter()
                .map(|violation| violation.for_commit(&commit.id)),
        );
    }

    if !found_issue {
        info!(commit = %commit.id, "No issue key found in commit message");
        violations.push(
            Violation::general("No JIRA Issue found in commit message.").for_commit(&commit.id),
        );
    }

    Ok(violations)
}
