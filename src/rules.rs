//! Policy rules.
//!
//! Each rule is a plain function from configuration and context to the
//! violations it finds. [`PolicyService`](crate::service::PolicyService)
//! decides which rules run for a commit and in which order.

pub mod branch_name;
pub mod committer;
pub mod issue_keys;
pub mod message;

pub use branch_name::check_branch_name;
pub use committer::check_committer;
pub use issue_keys::check_issue_keys;
pub use message::check_message;

use tracing::debug;

use crate::config::PolicyConfig;
use crate::refs::RefClassification;

/// Whether message and issue-key rules apply to commits on this ref.
///
/// Tags never get them, nor do branches whose whole short name matches
/// `excludeBranchRegex`.
pub fn message_rules_apply(config: &PolicyConfig, classification: &RefClassification) -> bool {
    if classification.is_tag {
        return false;
    }

    if let Some(pattern) = &config.exclude_branch_regex {
        if pattern.is_match(&classification.short_name) {
            debug!(
                branch = %classification.short_name,
                regex = pattern.as_str(),
                "Branch excluded from message checks"
            );
            return false;
        }
    }

    true
}
