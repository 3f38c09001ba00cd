//! Issue tracker integration boundary.

use thiserror::Error;

use crate::issue::IssueKey;
use crate::violation::Violation;

/// Failure talking to the issue tracker.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Request could not be sent or no response arrived.
    #[error("issue tracker request failed: {0}")]
    Network(String),

    /// Tracker answered with an unexpected status.
    #[error("issue tracker returned {status} for {url}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Tracker response could not be decoded.
    #[error("invalid response from issue tracker: {0}")]
    InvalidResponse(String),

    /// Tracker connection settings are unusable.
    #[error("invalid issue tracker configuration: {0}")]
    Configuration(String),
}

/// Resolves issue keys against an issue tracker.
pub trait IssueTracker {
    /// Whether a tracker is connected at all.
    fn application_link_exists(&self) -> bool;

    /// Whether the key's project is known to the tracker.
    fn project_exists(&self, key: &IssueKey) -> Result<bool, TrackerError>;

    /// Problems with the referenced issue; empty when it exists and is acceptable.
    fn issue_exists(&self, key: &IssueKey) -> Result<Vec<Violation>, TrackerError>;
}

/// Tracker used when no issue tracker is connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIssueTracker;

impl IssueTracker for NoIssueTracker {
    fn application_link_exists(&self) -> bool {
        false
    }

    fn project_exists(&self, _key: &IssueKey) -> Result<bool, TrackerError> {
        Ok(false)
    }

    fn issue_exists(&self, _key: &IssueKey) -> Result<Vec<Violation>, TrackerError> {
        Ok(Vec::new())
    }
}
