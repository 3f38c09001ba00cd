//! Error types for policy evaluation.
//!
//! Rule failures are [`Violation`](crate::violation::Violation)s, not errors.
//! The types here cover faults: bad configuration and collaborators that
//! could not answer.

use thiserror::Error;

use crate::commit::CommitSourceError;
use crate::tracker::TrackerError;

/// Invalid policy configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A regex option does not compile.
    #[error("invalid regex for '{option}' ({pattern}): {source}")]
    InvalidRegex {
        /// Setting name.
        option: &'static str,
        /// Pattern as configured.
        pattern: String,
        /// Compilation error.
        source: regex::Error,
    },

    /// An option needs an issue tracker connection that is not configured.
    #[error("'{option}' is enabled but no Jira connection is configured")]
    MissingIssueTracker {
        /// Setting name.
        option: &'static str,
    },
}

/// Failure evaluating a ref change.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// Configuration could not be used.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// New commits could not be determined.
    #[error("failed to list new commits: {0}")]
    CommitSource(#[from] CommitSourceError),

    /// The issue tracker could not be queried.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}
