//! Shared test doubles for the policy engine's collaborators.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::commit::{Commit, CommitSource, CommitSourceError, Committer};
use crate::issue::IssueKey;
use crate::refs::{RefChange, ZERO_HASH};
use crate::tracker::{IssueTracker, TrackerError};
use crate::user::{AuthenticatedUser, UserType};
use crate::violation::Violation;

/// A non-merge commit `deadbeef` by John Smith with an empty message.
pub(crate) fn test_commit() -> Commit {
    Commit {
        id: "deadbeef".to_string(),
        message: String::new(),
        is_merge: false,
        committer: Committer {
            name: "John Smith".to_string(),
            email_address: "jsmith@example.com".to_string(),
        },
    }
}

/// [`test_commit`] with the given message.
pub(crate) fn commit_with_message(message: &str) -> Commit {
    Commit {
        message: message.to_string(),
        ..test_commit()
    }
}

/// A normal account named `userName`.
pub(crate) fn test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        name: "userName".to_string(),
        display_name: "John Smith".to_string(),
        email_address: "jsmith@example.com".to_string(),
        user_type: UserType::Normal,
    }
}

/// An update of `refs/heads/master`.
pub(crate) fn branch_update() -> RefChange {
    branch_update_of("refs/heads/master")
}

/// An update of the given ref.
#[allow(clippy::unwrap_used)]
pub(crate) fn branch_update_of(ref_id: &str) -> RefChange {
    RefChange::new(
        ref_id,
        "5773fc438a763e64df8a9c5c32f3b1e83010ada7",
        "35d938b060bb361503e021f228e43351f1a71551",
    )
    .unwrap()
}

/// Creation of `refs/heads/master`.
#[allow(clippy::unwrap_used)]
pub(crate) fn branch_add() -> RefChange {
    RefChange::new(
        "refs/heads/master",
        ZERO_HASH,
        "35d938b060bb361503e021f228e43351f1a71551",
    )
    .unwrap()
}

/// Creation of `refs/tags/tag`.
#[allow(clippy::unwrap_used)]
pub(crate) fn tag_add() -> RefChange {
    RefChange::new(
        "refs/tags/tag",
        ZERO_HASH,
        "35d938b060bb361503e021f228e43351f1a71551",
    )
    .unwrap()
}

/// Commit source returning a fixed list and recording every request.
pub(crate) struct MockCommitSource {
    commits: Vec<Commit>,
    requests: Arc<Mutex<Vec<RefChange>>>,
}

impl MockCommitSource {
    /// Creates a source that returns `commits` for every ref change.
    pub(crate) fn new(commits: Vec<Commit>) -> Self {
        Self {
            commits,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle to the ref changes requested so far.
    pub(crate) fn request_handle(&self) -> Arc<Mutex<Vec<RefChange>>> {
        self.requests.clone()
    }
}

#[allow(clippy::unwrap_used)]
impl CommitSource for MockCommitSource {
    fn new_commits(&self, ref_change: &RefChange) -> Result<Vec<Commit>, CommitSourceError> {
        self.requests.lock().unwrap().push(ref_change.clone());
        Ok(self.commits.clone())
    }
}

/// A call made to [`MockIssueTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TrackerCall {
    ApplicationLinkExists,
    ProjectExists(IssueKey),
    IssueExists(IssueKey),
}

/// Issue tracker with scripted answers.
///
/// By default the application link exists, every project exists and every
/// issue is acceptable. Every call is recorded; use
/// [`call_handle`](Self::call_handle) to inspect them after the tracker has
/// been moved into a [`PolicyService`](crate::service::PolicyService).
pub(crate) struct MockIssueTracker {
    link_exists: bool,
    unknown_projects: HashSet<String>,
    issue_violations: Vec<Violation>,
    fail_issue_lookups: bool,
    calls: Arc<Mutex<Vec<TrackerCall>>>,
}

impl MockIssueTracker {
    pub(crate) fn new() -> Self {
        Self {
            link_exists: true,
            unknown_projects: HashSet::new(),
            issue_violations: Vec::new(),
            fail_issue_lookups: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Simulates a missing application link.
    pub(crate) fn without_application_link(mut self) -> Self {
        self.link_exists = false;
        self
    }

    /// Marks a project key as unknown to the tracker.
    pub(crate) fn with_unknown_project(mut self, project_key: &str) -> Self {
        self.unknown_projects.insert(project_key.to_string());
        self
    }

    /// Violations returned for every issue lookup.
    pub(crate) fn with_issue_violations(mut self, violations: Vec<Violation>) -> Self {
        self.issue_violations = violations;
        self
    }

    /// Makes issue lookups fail with a network error.
    pub(crate) fn failing_issue_lookups(mut self) -> Self {
        self.fail_issue_lookups = true;
        self
    }

    pub(crate) fn call_handle(&self) -> TrackerCallHandle {
        TrackerCallHandle {
            calls: self.calls.clone(),
        }
    }

    #[allow(clippy::unwrap_used)]
    fn record(&self, call: TrackerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Shared handle to the calls recorded by a [`MockIssueTracker`].
pub(crate) struct TrackerCallHandle {
    calls: Arc<Mutex<Vec<TrackerCall>>>,
}

#[allow(clippy::unwrap_used)]
impl TrackerCallHandle {
    /// Returns every recorded call, in order.
    pub(crate) fn calls(&self) -> Vec<TrackerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the keys passed to `issue_exists`, in order.
    pub(crate) fn issue_lookups(&self) -> Vec<IssueKey> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TrackerCall::IssueExists(key) => Some(key),
                _ => None,
            })
            .collect()
    }
}

impl IssueTracker for MockIssueTracker {
    fn application_link_exists(&self) -> bool {
        self.record(TrackerCall::ApplicationLinkExists);
        self.link_exists
    }

    fn project_exists(&self, key: &IssueKey) -> Result<bool, TrackerError> {
        self.record(TrackerCall::ProjectExists(key.clone()));
        Ok(!self.unknown_projects.contains(key.project_key()))
    }

    fn issue_exists(&self, key: &IssueKey) -> Result<Vec<Violation>, TrackerError> {
        self.record(TrackerCall::IssueExists(key.clone()));
        if self.fail_issue_lookups {
            return Err(TrackerError::Network("connection refused".to_string()));
        }
        Ok(self.issue_violations.clone())
    }
}
