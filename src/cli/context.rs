//! Arguments shared by the commands that evaluate pushes.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use termcolor::ColorChoice;
use tracing::debug;

use crate::commit::CommitSource;
use crate::config::keys;
use crate::git::GitCommitSource;
use crate::jira::JiraClient;
use crate::service::PolicyService;
use crate::settings::{PolicyFile, SettingsSource};
use crate::tracker::{IssueTracker, NoIssueTracker};
use crate::user::{AuthenticatedUser, UserType};

/// Environment variable naming the pushing account.
pub const ENV_USER: &str = "COMMIT_GATE_USER";
/// Environment variable with the pushing account's display name.
pub const ENV_DISPLAY_NAME: &str = "COMMIT_GATE_DISPLAY_NAME";
/// Environment variable with the pushing account's email.
pub const ENV_EMAIL: &str = "COMMIT_GATE_EMAIL";
/// Environment variable marking the pushing account as a service account.
pub const ENV_SERVICE_ACCOUNT: &str = "COMMIT_GATE_SERVICE_ACCOUNT";

/// Settings file location.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Settings file (defaults to ~/.commit-gate/settings.json).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    /// Loads the settings file.
    pub fn load(&self) -> Result<PolicyFile> {
        match &self.config {
            Some(path) => PolicyFile::load_from_path(path),
            None => PolicyFile::load(),
        }
    }

    /// Path the settings are read from.
    pub fn path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => PolicyFile::get_settings_path(),
        }
    }
}

/// Repository, settings and pushing account.
#[derive(Args, Debug, Clone, Default)]
pub struct PushArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Repository to read commits from (defaults to $GIT_DIR or the current directory).
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Account name of the pushing user.
    #[arg(long, env = ENV_USER)]
    pub user: Option<String>,

    /// Display name of the pushing user (defaults to the account name).
    #[arg(long, env = ENV_DISPLAY_NAME)]
    pub display_name: Option<String>,

    /// Email address of the pushing user.
    #[arg(long, env = ENV_EMAIL)]
    pub email: Option<String>,

    /// Treats the pushing user as a service account.
    #[arg(long, env = ENV_SERVICE_ACCOUNT)]
    pub service_account: bool,
}

impl PushArgs {
    /// Loads the settings file.
    pub fn load_policy(&self) -> Result<PolicyFile> {
        self.config.load()
    }

    /// Resolves the pushing user, falling back to the settings file's `env` section.
    pub fn user(&self, file: &PolicyFile) -> Result<AuthenticatedUser> {
        let lookup = |flag: &Option<String>, key: &str| {
            flag.clone()
                .or_else(|| file.get_env_var(key))
                .filter(|value| !value.trim().is_empty())
        };

        let Some(name) = lookup(&self.user, ENV_USER) else {
            bail!("No pushing user given: pass --user or set {ENV_USER}");
        };

        let service_account = self.service_account
            || file
                .get_env_var(ENV_SERVICE_ACCOUNT)
                .is_some_and(|value| matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes"));

        Ok(AuthenticatedUser {
            display_name: lookup(&self.display_name, ENV_DISPLAY_NAME)
                .unwrap_or_else(|| name.clone()),
            email_address: lookup(&self.email, ENV_EMAIL).unwrap_or_default(),
            user_type: if service_account {
                UserType::Service
            } else {
                UserType::Normal
            },
            name,
        })
    }

    /// Opens the repository the push targets.
    pub fn commit_source(&self) -> Result<Box<dyn CommitSource>> {
        let source = match &self.repo {
            Some(path) => GitCommitSource::open(path)
                .with_context(|| format!("Failed to open git repository: {}", path.display()))?,
            None => GitCommitSource::open_from_env().context("Not in a git repository")?,
        };
        Ok(Box::new(source))
    }

    /// Builds the policy service for the push.
    pub fn service(&self, file: &PolicyFile) -> Result<PolicyService> {
        let user = self.user(file)?;
        debug!(user = %user.name, user_type = ?user.user_type, "Resolved pushing user");

        Ok(PolicyService::new(
            Box::new(user),
            self.commit_source()?,
            issue_tracker(file)?,
        ))
    }
}

/// Colors output only when it goes to a terminal.
pub fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Connects to Jira when the settings file configures it.
pub fn issue_tracker(file: &PolicyFile) -> Result<Box<dyn IssueTracker>> {
    match &file.jira {
        Some(jira) => {
            let client = JiraClient::new(jira)
                .context("Failed to configure Jira client")?
                .with_jql_matcher(file.settings.get_string(keys::ISSUE_JQL_MATCHER));
            debug!(base_url = %jira.base_url, "Using Jira issue tracker");
            Ok(Box::new(client))
        }
        None => Ok(Box::new(NoIssueTracker)),
    }
}
