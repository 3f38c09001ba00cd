//! Branch naming rule for newly created branches.

use tracing::debug;

use crate::config::PolicyConfig;
use crate::refs::RefClassification;
use crate::violation::{Violation, ViolationKind};

/// Requires the short name of a new branch to match `branchNameRegex`.
///
/// Existing branches and tags are never checked.
pub fn check_branch_name(
    config: &PolicyConfig,
    classification: &RefClassification,
) -> Option<Violation> {
    if !classification.is_new_branch {
        return None;
    }

    let pattern = config.branch_name_regex.as_ref()?;
    if pattern.is_match(&classification.short_name) {
        return None;
    }

    debug!(branch = %classification.short_name, regex = pattern.as_str(), "Invalid branch name");
    Some(Violation::new(
        ViolationKind::BranchName,
        format!(
            "Invalid branch name. '{}' does not match regex '{}'",
            classification.short_name,
            pattern.as_str()
        ),
    ))
}
