//! Evaluation of a ref change against the commit policy.

use tracing::{debug, info};

use crate::commit::CommitSource;
use crate::config::PolicyConfig;
use crate::error::PolicyError;
use crate::filter::CommitFilter;
use crate::refs::{RefChange, RefChangeType};
use crate::rules;
use crate::settings::SettingsSource;
use crate::tracker::IssueTracker;
use crate::user::UserProvider;
use crate::violation::Violation;

/// Checks pushed ref changes against the configured policy.
///
/// Holds the collaborators that answer questions about the push: who is
/// pushing, which commits are new, and whether referenced issues exist.
pub struct PolicyService {
    users: Box<dyn UserProvider>,
    commits: Box<dyn CommitSource>,
    tracker: Box<dyn IssueTracker>,
}

impl PolicyService {
    /// Creates a service from its collaborators.
    pub fn new(
        users: Box<dyn UserProvider>,
        commits: Box<dyn CommitSource>,
        tracker: Box<dyn IssueTracker>,
    ) -> Self {
        Self {
            users,
            commits,
            tracker,
        }
    }

    /// Validates `settings` and checks `ref_change` against them.
    pub fn check_ref_change(
        &self,
        settings: &dyn SettingsSource,
        ref_change: &RefChange,
    ) -> Result<Vec<Violation>, PolicyError> {
        let config = PolicyConfig::from_settings(settings)?;
        self.check_with_config(&config, ref_change)
    }

    /// Checks `ref_change` against an already validated configuration.
    ///
    /// Violations are ordered by commit, in the order the commit source
    /// returned them, with each commit's identity findings before its message
    /// findings. A branch-name violation, if any, comes last.
    pub fn check_with_config(
        &self,
        config: &PolicyConfig,
        ref_change: &RefChange,
    ) -> Result<Vec<Violation>, PolicyError> {
        if ref_change.change_type == RefChangeType::Delete {
            debug!(ref_id = %ref_change.ref_id, "Ref deleted, nothing to check");
            return Ok(Vec::new());
        }

        let classification = ref_change.classify();
        debug!(
            ref_id = %ref_change.ref_id,
            change_type = %ref_change.change_type,
            is_tag = classification.is_tag,
            is_new_branch = classification.is_new_branch,
            "Checking ref change"
        );

        let user = self.users.current_user();
        let filter = CommitFilter::new(config, &user);
        let check_messages = rules::message_rules_apply(config, &classification);

        let commits = self.commits.new_commits(ref_change)?;
        debug!(ref_id = %ref_change.ref_id, count = commits.len(), "Retrieved new commits");

        let mut violations = Vec::new();
        for commit in &commits {
            if filter.is_exempt(commit) {
                continue;
            }

            violations.extend(rules::check_committer(config, &user, commit));

            if check_messages {
                violations.extend(rules::check_issue_keys(config, self.tracker.as_ref(), commit)?);
                violations.extend(rules::check_message(config, commit));
            }
        }

        violations.extend(rules::check_branch_name(config, &classification));

        if !violations.is_empty() {
            info!(
                ref_id = %ref_change.ref_id,
                violations = violations.len(),
                "Ref change violates commit policy"
            );
        }

        Ok(violations)
    }
}
