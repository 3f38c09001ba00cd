//! Policy violations reported back to the pusher.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of a violation, for callers that handle kinds differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    /// Committer name differs from the pushing user's display name.
    CommitterName,
    /// Committer email differs from the pushing user's email.
    CommitterEmail,
    /// Committer email does not match the configured pattern.
    CommitterEmailRegex,
    /// Commit message does not match the configured pattern.
    CommitRegex,
    /// New branch name does not match the configured pattern.
    BranchName,
    /// Referenced issue does not match the configured JQL query.
    IssueJql,
}

impl ViolationKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::CommitterName,
        Self::CommitterEmail,
        Self::CommitterEmailRegex,
        Self::CommitRegex,
        Self::BranchName,
        Self::IssueJql,
    ];

    /// Upper-case identifier used in settings keys such as `errorMessage.COMMIT_REGEX`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CommitterName => "COMMITTER_NAME",
            Self::CommitterEmail => "COMMITTER_EMAIL",
            Self::CommitterEmailRegex => "COMMITTER_EMAIL_REGEX",
            Self::CommitRegex => "COMMIT_REGEX",
            Self::BranchName => "BRANCH_NAME",
            Self::IssueJql => "ISSUE_JQL",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// A single policy failure. Equal when both kind and message are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Optional classification; `None` for general violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ViolationKind>,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// Creates a classified violation.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            message: message.into(),
        }
    }

    /// Creates an unclassified violation.
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
        }
    }

    /// Returns the same violation with `<commit_id>: ` in front of its message.
    #[must_use]
    pub fn for_commit(self, commit_id: &str) -> Self {
        Self {
            kind: self.kind,
            message: format!("{commit_id}: {}", self.message),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
