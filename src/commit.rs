//! Commits introduced by a ref change, and where they come from.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::refs::RefChange;

/// Identity recorded on a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committer {
    /// Committer name.
    pub name: String,
    /// Committer email address.
    pub email_address: String,
}

/// A commit being pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit hash, used verbatim in violation messages.
    pub id: String,
    /// Full commit message, without trailing line endings.
    pub message: String,
    /// Whether the commit has more than one parent.
    pub is_merge: bool,
    /// Who committed it.
    pub committer: Committer,
}

/// Failure to determine the new commits of a ref change.
#[derive(Error, Debug)]
pub enum CommitSourceError {
    /// The repository could not be read.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// A ref change named an object that is not a valid hash.
    #[error("invalid object id '{0}'")]
    InvalidObjectId(String),
}

/// Supplies the commits a ref change introduces.
pub trait CommitSource {
    /// Returns the commits introduced by `ref_change` that are not already
    /// reachable from other refs, in a stable order.
    fn new_commits(&self, ref_change: &RefChange) -> Result<Vec<Commit>, CommitSourceError>;
}
