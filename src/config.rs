//! Validated policy configuration.
//!
//! [`PolicyConfig`] is built once per evaluation from a [`SettingsSource`].
//! Every regex option is compiled at that point, so a bad pattern is reported
//! as a [`ConfigError`] before any commit is looked at.

use regex::Regex;

use crate::error::ConfigError;
use crate::settings::SettingsSource;

/// Setting names understood by the engine.
pub mod keys {
    /// Committer name must equal the pusher's display name.
    pub const REQUIRE_MATCHING_AUTHOR_NAME: &str = "requireMatchingAuthorName";
    /// Committer email must equal the pusher's email.
    pub const REQUIRE_MATCHING_AUTHOR_EMAIL: &str = "requireMatchingAuthorEmail";
    /// Pattern committer emails must match.
    pub const COMMITTER_EMAIL_REGEX: &str = "committerEmailRegex";
    /// Commit messages must reference an issue.
    pub const REQUIRE_JIRA_ISSUE: &str = "requireJiraIssue";
    /// Skip issue keys whose project the tracker does not know.
    pub const IGNORE_UNKNOWN_ISSUE_PROJECT_KEYS: &str = "ignoreUnknownIssueProjectKeys";
    /// JQL an issue must satisfy.
    pub const ISSUE_JQL_MATCHER: &str = "issueJqlMatcher";
    /// Pattern commit messages must match.
    pub const COMMIT_MESSAGE_REGEX: &str = "commitMessageRegex";
    /// Pattern new branch names must match.
    pub const BRANCH_NAME_REGEX: &str = "branchNameRegex";
    /// Commits whose message contains a match are skipped.
    pub const EXCLUDE_BY_REGEX: &str = "excludeByRegex";
    /// Branches whose name matches skip message and issue checks.
    pub const EXCLUDE_BRANCH_REGEX: &str = "excludeBranchRegex";
    /// Skip merge commits.
    pub const EXCLUDE_MERGE_COMMITS: &str = "excludeMergeCommits";
    /// Skip everything pushed by service accounts.
    pub const EXCLUDE_SERVICE_USER_COMMITS: &str = "excludeServiceUserCommits";
    /// Comma-separated account names whose pushes are skipped.
    pub const EXCLUDE_USERS: &str = "excludeUsers";
    /// Text printed before the list of violations.
    pub const ERROR_MESSAGE_HEADER: &str = "errorMessageHeader";
    /// Text printed after the list of violations.
    pub const ERROR_MESSAGE_FOOTER: &str = "errorMessageFooter";
    /// Prefix of per-kind explanations, e.g. `errorMessage.COMMIT_REGEX`.
    pub const ERROR_MESSAGE_PREFIX: &str = "errorMessage.";
}

/// How a [`Pattern`] is applied to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The whole text must match.
    Full,
    /// Any substring may match.
    Find,
}

/// A configured regex together with the text it was written as.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    mode: MatchMode,
}

impl Pattern {
    /// Compiles `source` for the option named `option`.
    pub fn new(option: &'static str, source: &str, mode: MatchMode) -> Result<Self, ConfigError> {
        let compiled = match mode {
            MatchMode::Full => format!("^(?:{source})$"),
            MatchMode::Find => source.to_string(),
        };

        let regex = Regex::new(&compiled).map_err(|source_err| ConfigError::InvalidRegex {
            option,
            pattern: source.to_string(),
            source: source_err,
        })?;

        Ok(Self {
            source: source.to_string(),
            regex,
            mode,
        })
    }

    /// The pattern as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match mode the pattern was compiled with.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Applies the pattern to `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// All policy options, parsed and validated.
#[derive(Debug, Clone, Default)]
pub struct PolicyConfig {
    /// `requireMatchingAuthorName`
    pub require_matching_author_name: bool,
    /// `requireMatchingAuthorEmail`
    pub require_matching_author_email: bool,
    /// `committerEmailRegex`, full match.
    pub committer_email_regex: Option<Pattern>,
    /// `requireJiraIssue`
    pub require_jira_issue: bool,
    /// `ignoreUnknownIssueProjectKeys`
    pub ignore_unknown_issue_project_keys: bool,
    /// `commitMessageRegex`, full match.
    pub commit_message_regex: Option<Pattern>,
    /// `branchNameRegex`, full match.
    pub branch_name_regex: Option<Pattern>,
    /// `excludeByRegex`, find.
    pub exclude_by_regex: Option<Pattern>,
    /// `excludeBranchRegex`, full match.
    pub exclude_branch_regex: Option<Pattern>,
    /// `excludeMergeCommits`
    pub exclude_merge_commits: bool,
    /// `excludeServiceUserCommits`
    pub exclude_service_user_commits: bool,
    /// `excludeUsers`, split on commas and trimmed.
    pub exclude_users: Vec<String>,
}

impl PolicyConfig {
    /// Reads and validates every option, failing on the first invalid one.
    pub fn from_settings(settings: &dyn SettingsSource) -> Result<Self, ConfigError> {
        let (config, mut errors) = Self::parse(settings);
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors.remove(0))
        }
    }

    /// Reads every option and returns all problems found.
    pub fn validate(settings: &dyn SettingsSource) -> Vec<ConfigError> {
        Self::parse(settings).1
    }

    fn parse(settings: &dyn SettingsSource) -> (Self, Vec<ConfigError>) {
        let mut errors = Vec::new();
        let mut pattern = |option: &'static str, mode: MatchMode| {
            settings
                .get_string(option)
                .and_then(|source| match Pattern::new(option, &source, mode) {
                    Ok(pattern) => Some(pattern),
                    Err(err) => {
                        errors.push(err);
                        None
                    }
                })
        };

        let committer_email_regex = pattern(keys::COMMITTER_EMAIL_REGEX, MatchMode::Full);
        let commit_message_regex = pattern(keys::COMMIT_MESSAGE_REGEX, MatchMode::Full);
        let branch_name_regex = pattern(keys::BRANCH_NAME_REGEX, MatchMode::Full);
        let exclude_by_regex = pattern(keys::EXCLUDE_BY_REGEX, MatchMode::Find);
        let exclude_branch_regex = pattern(keys::EXCLUDE_BRANCH_REGEX, MatchMode::Full);

        let exclude_users = settings
            .get_string(keys::EXCLUDE_USERS)
            .map(|users| {
                users
                    .split(',')
                    .map(str::trim)
                    .filter(|user| !user.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let config = Self {
            require_matching_author_name: settings
                .get_bool(keys::REQUIRE_MATCHING_AUTHOR_NAME, false),
            require_matching_author_email: settings
                .get_bool(keys::REQUIRE_MATCHING_AUTHOR_EMAIL, false),
            committer_email_regex,
            require_jira_issue: settings.get_bool(keys::REQUIRE_JIRA_ISSUE, false),
            ignore_unknown_issue_project_keys: settings
                .get_bool(keys::IGNORE_UNKNOWN_ISSUE_PROJECT_KEYS, false),
            commit_message_regex,
            branch_name_regex,
            exclude_by_regex,
            exclude_branch_regex,
            exclude_merge_commits: settings.get_bool(keys::EXCLUDE_MERGE_COMMITS, false),
            exclude_service_user_commits: settings
                .get_bool(keys::EXCLUDE_SERVICE_USER_COMMITS, false),
            exclude_users,
        };

        (config, errors)
    }

    /// True when `account_name` is listed in `excludeUsers` (exact, case-sensitive).
    pub fn is_excluded_user(&self, account_name: &str) -> bool {
        self.exclude_users.iter().any(|user| user == account_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::settings::SettingsMap;

    #[test]
    fn defaults_disable_everything() {
        let config = PolicyConfig::from_settings(&SettingsMap::new()).unwrap();
        assert!(!config.require_matching_author_name);
        assert!(!config.require_matching_author_email);
        assert!(!config.require_jira_issue);
        assert!(config.commit_message_regex.is_none());
        assert!(config.exclude_users.is_empty());
    }

    #[test]
    fn full_match_patterns_are_anchored() {
        let pattern = Pattern::new("commitMessageRegex", "[a-z ]+", MatchMode::Full).unwrap();
        assert!(pattern.is_match("matches regex"));
        assert!(!pattern.is_match("123 does not match regex because it contains numbers"));
        assert_eq!(pattern.as_str(), "[a-z ]+");
    }

    #[test]
    fn alternation_is_anchored_as_a_whole() {
        let pattern = Pattern::new("branchNameRegex", "foo|bar", MatchMode::Full).unwrap();
        assert!(pattern.is_match("bar"));
        assert!(!pattern.is_match("foox"));
        assert!(!pattern.is_match("xbar"));
    }

    #[test]
    fn find_patterns_match_substrings() {
        let pattern = Pattern::new("excludeByRegex", "#skipcheck", MatchMode::Find).unwrap();
        assert!(pattern.is_match("this commit will be allowed #skipcheck"));
        assert!(!pattern.is_match("this commit will be rejected"));
    }

    #[test]
    fn invalid_regex_names_the_option() {
        let settings = SettingsMap::new().with("commitMessageRegex", "[unclosed");
        let err = PolicyConfig::from_settings(&settings).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidRegex { option: "commitMessageRegex", .. }
        ));
        assert!(err.to_string().contains("commitMessageRegex"));
    }

    #[test]
    fn validate_reports_every_bad_pattern() {
        let settings = SettingsMap::new()
            .with("commitMessageRegex", "(")
            .with("branchNameRegex", "ok")
            .with("excludeByRegex", "[");

        let errors = PolicyConfig::validate(&settings);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn exclude_users_are_split_and_trimmed() {
        let settings = SettingsMap::new().with("excludeUsers", "excludeUser, nonExcludeUser,,");
        let config = PolicyConfig::from_settings(&settings).unwrap();

        assert_eq!(config.exclude_users, vec!["excludeUser", "nonExcludeUser"]);
        assert!(config.is_excluded_user("excludeUser"));
        assert!(config.is_excluded_user("nonExcludeUser"));
        assert!(!config.is_excluded_user("excludeuser"));
        assert!(!config.is_excluded_user("someoneElse"));
    }

    #[test]
    fn options_get_their_match_modes() {
        let settings = SettingsMap::new()
            .with("commitMessageRegex", "x")
            .with("committerEmailRegex", "x")
            .with("branchNameRegex", "x")
            .with("excludeByRegex", "x")
            .with("excludeBranchRegex", "x");
        let config = PolicyConfig::from_settings(&settings).unwrap();

        let mode = |pattern: &Option<Pattern>| pattern.as_ref().unwrap().mode();
        assert_eq!(mode(&config.commit_message_regex), MatchMode::Full);
        assert_eq!(mode(&config.committer_email_regex), MatchMode::Full);
        assert_eq!(mode(&config.branch_name_regex), MatchMode::Full);
        assert_eq!(mode(&config.exclude_branch_regex), MatchMode::Full);
        assert_eq!(mode(&config.exclude_by_regex), MatchMode::Find);
    }
}
