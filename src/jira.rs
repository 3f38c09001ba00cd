//! Jira REST implementation of [`IssueTracker`].

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tracing::{debug, info};
use url::Url;

use crate::issue::IssueKey;
use crate::tracker::{IssueTracker, TrackerError};
use crate::violation::{Violation, ViolationKind};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection details for a Jira instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraConfig {
    /// Root URL of the Jira instance, e.g. `https://jira.example.com`.
    pub base_url: String,
    /// Account used for basic authentication.
    pub username: String,
    /// API token or password for `username`.
    pub token: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Deserialize)]
struct SearchResponse {
    total: u64,
}

/// Blocking Jira client.
///
/// Requests go through async `reqwest` on a runtime owned by the client, so
/// it must not be called from inside another tokio runtime.
pub struct JiraClient {
    client: Client,
    runtime: Runtime,
    base_url: Url,
    username: String,
    token: String,
    jql_matcher: Option<String>,
}

impl JiraClient {
    /// Creates a client for the configured instance.
    pub fn new(config: &JiraConfig) -> Result<Self, TrackerError> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            TrackerError::Configuration(format!("invalid Jira URL '{}': {e}", config.base_url))
        })?;
        // Url::join replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TrackerError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TrackerError::Configuration(format!("failed to create runtime: {e}")))?;

        Ok(Self {
            client,
            runtime,
            base_url,
            username: config.username.clone(),
            token: config.token.clone(),
            jql_matcher: None,
        })
    }

    /// Additionally requires every issue to match `jql`.
    pub fn with_jql_matcher(mut self, jql: Option<String>) -> Self {
        self.jql_matcher = jql.filter(|jql| !jql.trim().is_empty());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, TrackerError> {
        self.base_url
            .join(path)
            .map_err(|e| TrackerError::Configuration(format!("invalid Jira path '{path}': {e}")))
    }

    /// Issues a GET and returns the status with the body, if successful.
    fn get(&self, url: Url) -> Result<(StatusCode, Option<String>), TrackerError> {
        debug!(url = %url, "Sending Jira request");

        self.runtime.block_on(async {
            let response = self
                .client
                .get(url.clone())
                .basic_auth(&self.username, Some(&self.token))
                .header("accept", "application/json")
                .send()
                .await
                .map_err(|e| TrackerError::Network(e.to_string()))?;

            let status = response.status();
            debug!(url = %url, status = status.as_u16(), "Received Jira response");

            if !status.is_success() {
                return Ok((status, None));
            }

            let body = response
                .text()
                .await
                .map_err(|e| TrackerError::InvalidResponse(e.to_string()))?;
            Ok((status, Some(body)))
        })
    }

    fn matches_jql(&self, key: &IssueKey, jql: &str) -> Result<bool, TrackerError> {
        let mut url = self.endpoint("rest/api/2/search")?;
        url.query_pairs_mut()
            .append_pair("jql", &format!("issueKey={key} AND ({jql})"))
            .append_pair("maxResults", "0");

        match self.get(url.clone())? {
            (_, Some(body)) => {
                let search: SearchResponse = serde_json::from_str(&body)
                    .map_err(|e| TrackerError::InvalidResponse(e.to_string()))?;
                Ok(search.total > 0)
            }
            (status, None) => Err(unexpected(status, &url)),
        }
    }
}

fn unexpected(status: StatusCode, url: &Url) -> TrackerError {
    TrackerError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_string(),
    }
}

impl IssueTracker for JiraClient {
    fn application_link_exists(&self) -> bool {
        true
    }

    fn project_exists(&self, key: &IssueKey) -> Result<bool, TrackerError> {
        let url = self.endpoint(&format!("rest/api/2/project/{}", key.project_key()))?;
        match self.get(url.clone())? {
            (_, Some(_)) => Ok(true),
            (StatusCode::NOT_FOUND, None) => {
                debug!(project = key.project_key(), "Unknown Jira project");
                Ok(false)
            }
            (status, None) => Err(unexpected(status, &url)),
        }
    }

    fn issue_exists(&self, key: &IssueKey) -> Result<Vec<Violation>, TrackerError> {
        let url = self.endpoint(&format!("rest/api/2/issue/{key}"))?;
        match self.get(url.clone())? {
            (_, Some(_)) => {}
            (StatusCode::NOT_FOUND, None) => {
                info!(%key, "Jira issue does not exist");
                return Ok(vec![Violation::general(format!(
                    "{key}: JIRA Issue does not exist"
                ))]);
            }
            (status, None) => return Err(unexpected(status, &url)),
        }

        let Some(jql) = &self.jql_matcher else {
            return Ok(Vec::new());
        };

        if self.matches_jql(key, jql)? {
            Ok(Vec::new())
        } else {
            info!(%key, jql = %jql, "Jira issue does not match JQL");
            Ok(vec![Violation::new(
                ViolationKind::IssueJql,
                format!("{key}: JIRA Issue does not match JQL Query: {jql}"),
            )])
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // The server must be dropped before the runtime that started it.
    struct Server {
        server: MockServer,
        runtime: Runtime,
    }

    impl Server {
        fn start() -> Self {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            let server = runtime.block_on(MockServer::start());
            Self { server, runtime }
        }

        fn mount(&self, mock: Mock) {
            self.runtime.block_on(mock.mount(&self.server));
        }

        fn client(&self) -> JiraClient {
            JiraClient::new(&JiraConfig {
                base_url: self.server.uri(),
                username: "bot".to_string(),
                token: "secret".to_string(),
                timeout_secs: 5,
            })
            .unwrap()
        }
    }

    fn key(text: &str) -> IssueKey {
        IssueKey::parse(text).unwrap()
    }

    #[test]
    fn config_deserializes_with_default_timeout() {
        let config: JiraConfig = serde_json::from_str(
            r#"{"baseUrl": "https://jira.example.com", "username": "bot", "token": "t"}"#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn invalid_base_url_is_a_configuration_error() {
        let result = JiraClient::new(&JiraConfig {
            base_url: "not a url".to_string(),
            username: String::new(),
            token: String::new(),
            timeout_secs: 1,
        });
        assert!(matches!(result, Err(TrackerError::Configuration(_))));
    }

    #[test]
    fn existing_project_and_issue() {
        let server = Server::start();
        // "bot:secret"
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/project/ABC"))
                .and(header("authorization", "Basic Ym90OnNlY3JldA=="))
                .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"key":"ABC"}"#)),
        );
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/issue/ABC-123"))
                .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"key":"ABC-123"}"#)),
        );

        let client = server.client();
        assert!(client.application_link_exists());
        assert!(client.project_exists(&key("ABC-123")).unwrap());
        assert!(client.issue_exists(&key("ABC-123")).unwrap().is_empty());
    }

    #[test]
    fn unknown_project() {
        let server = Server::start();
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/project/UTF"))
                .respond_with(ResponseTemplate::new(404)),
        );

        assert!(!server.client().project_exists(&key("UTF-8")).unwrap());
    }

    #[test]
    fn missing_issue_is_a_violation() {
        let server = Server::start();
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/issue/ABC-404"))
                .respond_with(ResponseTemplate::new(404)),
        );

        assert_eq!(
            server.client().issue_exists(&key("ABC-404")).unwrap(),
            vec![Violation::general("ABC-404: JIRA Issue does not exist")]
        );
    }

    #[test]
    fn unexpected_status_is_an_error() {
        let server = Server::start();
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/issue/ABC-1"))
                .respond_with(ResponseTemplate::new(401)),
        );

        assert!(matches!(
            server.client().issue_exists(&key("ABC-1")),
            Err(TrackerError::UnexpectedStatus { status: 401, .. })
        ));
    }

    #[test]
    fn issue_outside_jql_is_a_violation() {
        let server = Server::start();
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/issue/ABC-1"))
                .respond_with(ResponseTemplate::new(200).set_body_string("{}")),
        );
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/search"))
                .and(query_param("jql", "issueKey=ABC-1 AND (status = Open)"))
                .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"total":0}"#)),
        );

        let client = server
            .client()
            .with_jql_matcher(Some("status = Open".to_string()));
        assert_eq!(
            client.issue_exists(&key("ABC-1")).unwrap(),
            vec![Violation::new(
                ViolationKind::IssueJql,
                "ABC-1: JIRA Issue does not match JQL Query: status = Open"
            )]
        );
    }

    #[test]
    fn issue_matching_jql_passes() {
        let server = Server::start();
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/issue/ABC-2"))
                .respond_with(ResponseTemplate::new(200).set_body_string("{}")),
        );
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/search"))
                .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"total":1}"#)),
        );

        let client = server
            .client()
            .with_jql_matcher(Some("status = Open".to_string()));
        assert!(client.issue_exists(&key("ABC-2")).unwrap().is_empty());
    }

    #[test]
    fn malformed_search_response_is_an_error() {
        let server = Server::start();
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/issue/ABC-3"))
                .respond_with(ResponseTemplate::new(200).set_body_string("{}")),
        );
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/search"))
                .respond_with(ResponseTemplate::new(200).set_body_string("not json")),
        );

        let client = server.client().with_jql_matcher(Some("project = ABC".to_string()));
        assert!(matches!(
            client.issue_exists(&key("ABC-3")),
            Err(TrackerError::InvalidResponse(_))
        ));
    }

    #[test]
    fn blank_jql_is_ignored() {
        let server = Server::start();
        server.mount(
            Mock::given(method("GET"))
                .and(path("/rest/api/2/issue/ABC-4"))
                .respond_with(ResponseTemplate::new(200).set_body_string("{}")),
        );

        let client = server.client().with_jql_matcher(Some("  ".to_string()));
        assert!(client.issue_exists(&key("ABC-4")).unwrap().is_empty());
    }
}
