//! Ref changes pushed to a repository and their classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of branch refs.
pub const BRANCH_PREFIX: &str = "refs/heads/";

/// Prefix of tag refs.
pub const TAG_PREFIX: &str = "refs/tags/";

/// Hash git uses for "no object" on either side of a ref change.
pub const ZERO_HASH: &str = "0000000000000000000000000000000000000000";

/// How a ref moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RefChangeType {
    /// The ref did not exist before.
    Add,
    /// The ref existed and now points elsewhere.
    Update,
    /// The ref is being removed.
    Delete,
}

impl fmt::Display for RefChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "ADD"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A single ref update as received by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefChange {
    /// Full ref path, e.g. `refs/heads/master`.
    pub ref_id: String,
    /// Object the ref pointed at before the push.
    pub from_hash: String,
    /// Object the ref points at after the push.
    pub to_hash: String,
    /// Kind of change.
    #[serde(rename = "type")]
    pub change_type: RefChangeType,
}

/// Error parsing a pre-receive input line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefChangeParseError {
    /// The line did not have exactly three fields.
    #[error("expected '<old> <new> <ref>', got '{0}'")]
    WrongFieldCount(String),
    /// Both sides of the change were the zero hash.
    #[error("ref change for {0} has no old or new object")]
    NoObjects(String),
}

impl RefChange {
    /// Creates a ref change, deriving its type from the zero hash on either side.
    pub fn new(
        ref_id: impl Into<String>,
        from_hash: impl Into<String>,
        to_hash: impl Into<String>,
    ) -> Result<Self, RefChangeParseError> {
        let ref_id = ref_id.into();
        let from_hash = from_hash.into();
        let to_hash = to_hash.into();

        let change_type = match (is_zero_hash(&from_hash), is_zero_hash(&to_hash)) {
            (true, true) => return Err(RefChangeParseError::NoObjects(ref_id)),
            (true, false) => RefChangeType::Add,
            (false, true) => RefChangeType::Delete,
            (false, false) => RefChangeType::Update,
        };

        Ok(Self {
            ref_id,
            from_hash,
            to_hash,
            change_type,
        })
    }

    /// Classifies the ref for rule applicability.
    pub fn classify(&self) -> RefClassification {
        let is_tag = self.ref_id.starts_with(TAG_PREFIX);
        let short_name = self
            .ref_id
            .strip_prefix(BRANCH_PREFIX)
            .unwrap_or(&self.ref_id)
            .to_string();

        RefClassification {
            is_tag,
            is_new_branch: self.change_type == RefChangeType::Add && !is_tag,
            short_name,
        }
    }
}

impl FromStr for RefChange {
    type Err = RefChangeParseError;

    /// Parses one line of `pre-receive` input: `<old> <new> <ref>`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [old, new, ref_id] => Self::new(*ref_id, *old, *new),
            _ => Err(RefChangeParseError::WrongFieldCount(line.to_string())),
        }
    }
}

/// Facts about a ref change that decide which rules apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefClassification {
    /// The ref lives under `refs/tags/`.
    pub is_tag: bool,
    /// A branch is being created.
    pub is_new_branch: bool,
    /// Ref id with `refs/heads/` stripped.
    pub short_name: String,
}

/// True for git's all-zero "no object" hash, of any length.
pub fn is_zero_hash(hash: &str) -> bool {
    !hash.is_empty() && hash.bytes().all(|b| b == b'0')
}
