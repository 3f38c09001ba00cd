//! Committer identity rules.

use tracing::debug;

use crate::commit::Commit;
use crate::config::PolicyConfig;
use crate::identity::{emails_match, equals_ignoring_formatting};
use crate::user::AuthenticatedUser;
use crate::violation::{Violation, ViolationKind};

/// Compares the commit's committer with the pushing user.
///
/// Service accounts push on behalf of others, so they are never compared.
/// The email regex only runs when exact email matching is off.
pub fn check_committer(
    config: &PolicyConfig,
    user: &AuthenticatedUser,
    commit: &Commit,
) -> Vec<Violation> {
    if user.is_service_account() {
        debug!(commit = %commit.id, user = %user.name, "Skipping identity checks for service account");
        return Vec::new();
    }

    let committer = &commit.committer;
    let mut violations = Vec::new();

    if config.require_matching_author_name
        && !equals_ignoring_formatting(&user.display_name, &committer.name)
    {
        violations.push(
            Violation::new(
                ViolationKind::CommitterName,
                format!(
                    "expected committer name '{}' but found '{}'",
                    user.display_name, committer.name
                ),
            )
            .for_commit(&commit.id),
        );
    }

    if config.require_matching_author_email {
        if !emails_match(&user.email_address, &committer.email_address) {
            violations.push(
                Violation::new(
                    ViolationKind::CommitterEmail,
                    format!(
                        "expected committer email '{}' but found '{}'",
                        user.email_address, committer.email_address
                    ),
                )
                .for_commit(&commit.id),
            );
        }
    } else if let Some(pattern) = &config.committer_email_regex {
        if !pattern.is_match(&committer.email_address) {
            violations.push(
                Violation::new(
                    ViolationKind::CommitterEmailRegex,
                    format!(
                        "committer email regex '{}' does not match user email '{}'",
                        pattern.as_str(),
                        committer.email_address
                    ),
                )
                .for_commit(&commit.id),
            );
        }
    }

    violations
}
