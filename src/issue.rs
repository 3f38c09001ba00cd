//! Issue-tracker keys (`PROJECT-123`) and scanning commit messages for them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Anchored shape of a single issue key. Project keys may use either case here.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static ISSUE_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<project>[A-Za-z][A-Za-z0-9_]*)-(?P<number>[0-9]+)$").unwrap()
});

/// Issue references inside free text. Upper-case project keys only, so that
/// ordinary hyphenated words such as `abc-123` are not picked up. Surrounding
/// characters are not constrained: `xABC-1` and `ABC-1_fix` both yield `ABC-1`.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static ISSUE_REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][A-Z0-9_]*-[0-9]+").unwrap());

/// Error returned when text is not an issue key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not an issue key (expected PROJECT-123)")]
pub struct IssueKeyError(pub String);

/// A parsed issue key: project code plus issue number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueKey {
    project_key: String,
    issue_number: String,
}

impl IssueKey {
    /// Builds a key from its two parts, validating each.
    pub fn new(
        project_key: impl Into<String>,
        issue_number: impl Into<String>,
    ) -> Result<Self, IssueKeyError> {
        let project_key = project_key.into();
        let issue_number = issue_number.into();
        Self::parse(&format!("{project_key}-{issue_number}"))
    }

    /// Parses `PROJECT-123`, splitting on the last hyphen before the numeric suffix.
    pub fn parse(text: &str) -> Result<Self, IssueKeyError> {
        let captures = ISSUE_KEY_PATTERN
            .captures(text)
            .ok_or_else(|| IssueKeyError(text.to_string()))?;

        Ok(Self {
            project_key: captures["project"].to_string(),
            issue_number: captures["number"].to_string(),
        })
    }

    /// Returns the project part of the key.
    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    /// Returns the numeric part of the key, as written.
    pub fn issue_number(&self) -> &str {
        &self.issue_number
    }

    /// Extracts every issue key mentioned in `message`.
    ///
    /// Keys are returned once each, in order of first appearance.
    pub fn scan_message(message: &str) -> Vec<Self> {
        let mut seen = HashSet::new();

        ISSUE_REFERENCE_PATTERN
            .find_iter(message)
            .filter_map(|m| Self::parse(m.as_str()).ok())
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }
}

impl FromStr for IssueKey {
    type Err = IssueKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.project_key, self.issue_number)
    }
}
