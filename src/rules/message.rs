//! Commit message format rule.

use tracing::debug;

use crate::commit::Commit;
use crate::config::PolicyConfig;
use crate::violation::{Violation, ViolationKind};

/// Requires the whole commit message to match `commitMessageRegex`.
pub fn check_message(config: &PolicyConfig, commit: &Commit) -> Option<Violation> {
    let pattern = config.commit_message_regex.as_ref()?;

    if pattern.is_match(&commit.message) {
        return None;
    }

    debug!(commit = %commit.id, regex = pattern.as_str(), "Commit message does not match");
    Some(
        Violation::new(
            ViolationKind::CommitRegex,
            format!("commit message doesn't match regex: {}", pattern.as_str()),
        )
        .for_commit(&commit.id),
    )
}
