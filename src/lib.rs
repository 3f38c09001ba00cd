//! # commit-gate
//!
//! Commit acceptance policies for git pushes.
//!
//! Each pushed ref change is checked against a configurable policy: committer
//! identity must match the pushing user, commit messages must match a pattern
//! and reference existing issues, and new branches must follow a naming
//! scheme. Failures are reported as [`Violation`]s; the push is accepted when
//! there are none.
//!
//! ## Quick Start
//!
//! ```rust
//! use commit_gate::settings::SettingsMap;
//! use commit_gate::config::PolicyConfig;
//!
//! let settings = SettingsMap::new().with("commitMessageRegex", "[A-Z]+-[0-9]+: .*");
//! let config = PolicyConfig::from_settings(&settings).unwrap();
//! assert!(config.commit_message_regex.is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commit;
pub mod config;
pub mod error;
pub mod filter;
pub mod git;
pub mod identity;
pub mod issue;
pub mod jira;
pub mod refs;
pub mod report;
pub mod rules;
pub mod service;
pub mod settings;
pub mod tracker;
pub mod user;
pub mod violation;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::cli::Cli;
pub use crate::error::{ConfigError, PolicyError};
pub use crate::service::PolicyService;
pub use crate::violation::{Violation, ViolationKind};

/// The current version of commit-gate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
