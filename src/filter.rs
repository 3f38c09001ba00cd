//! Per-commit exemptions from all policy checks.

use std::fmt;

use tracing::debug;

use crate::commit::Commit;
use crate::config::PolicyConfig;
use crate::user::AuthenticatedUser;

/// Why a commit skips every per-commit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    /// Merge commit with `excludeMergeCommits` set.
    MergeCommit,
    /// Pushed by a service account with `excludeServiceUserCommits` set.
    ServiceUser,
    /// Pushed by an account listed in `excludeUsers`.
    ExcludedUser,
    /// Message contains a match for `excludeByRegex`.
    ExcludedByMessage,
}

impl fmt::Display for Exemption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MergeCommit => write!(f, "merge commit"),
            Self::ServiceUser => write!(f, "service user"),
            Self::ExcludedUser => write!(f, "excluded user"),
            Self::ExcludedByMessage => write!(f, "excluded by message"),
        }
    }
}

/// Decides which commits are exempt for one push.
pub struct CommitFilter<'a> {
    config: &'a PolicyConfig,
    user: &'a AuthenticatedUser,
}

impl<'a> CommitFilter<'a> {
    /// Creates a filter for commits pushed by `user`.
    pub fn new(config: &'a PolicyConfig, user: &'a AuthenticatedUser) -> Self {
        Self { config, user }
    }

    /// Returns the first exemption that applies to `commit`, if any.
    pub fn exemption(&self, commit: &Commit) -> Option<Exemption> {
        if self.config.exclude_merge_commits && commit.is_merge {
            return Some(Exemption::MergeCommit);
        }

        if self.config.exclude_service_user_commits && self.user.is_service_account() {
            return Some(Exemption::ServiceUser);
        }

        if self.config.is_excluded_user(&self.user.name) {
            return Some(Exemption::ExcludedUser);
        }

        // Find semantics: a match anywhere in the message is enough
        if self
            .config
            .exclude_by_regex
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(&commit.message))
        {
            return Some(Exemption::ExcludedByMessage);
        }

        None
    }

    /// True when no per-commit rule should run for `commit`.
    pub fn is_exempt(&self, commit: &Commit) -> bool {
        match self.exemption(commit) {
            Some(reason) => {
                debug!(commit = %commit.id, %reason, "Commit exempt from policy checks");
                true
            }
            None => false,
        }
    }
}
