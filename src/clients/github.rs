use std::fmt::Display;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use tracing::warn;

use super::http::HttpRequest;
use super::http::HttpResponse;
use super::http::HttpTransport;
use super::http::Method;
use super::rate_limit::RateLimitGate;
use crate::commit::SHORT_HASH_LENGTH;
use crate::error::Error;
use crate::error::Result;
use crate::remote::RemoteDescriptor;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "ficion";
pub const DEFAULT_STATUS_TARGET_URL: &str = "http://localhost:8080";
pub const DEFAULT_STATUS_CONTEXT: &str = "continuous-integration/ficion";

/// Commit message used for every merge.
pub const MERGE_COMMIT_MESSAGE: &str = "Pull Request successfully merged";

// -----------------------------------------------------------------------------
// Types

/// Settings for talking to the provider, fixed for the client's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_url: String,
    pub user_agent: String,
    /// Link attached to every commit status.
    pub status_target_url: String,
    pub status_context: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            status_target_url: DEFAULT_STATUS_TARGET_URL.to_string(),
            status_context: DEFAULT_STATUS_CONTEXT.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Build a request for an API path, authenticated when a token is given.
    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> HttpRequest {
        let url = format!("{}{}", self.api_url.trim_end_matches('/'), path);
        let request = HttpRequest::new(method, url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "application/vnd.github+json");
        match token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            api_url: "https://api.example.test".to_string(),
            ..Self::default()
        }
    }
}

/// A pull request as seen by the CI orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    /// Head commit of the pull request.
    pub commit: String,
    pub merge_commit: Option<String>,
    pub short_commit: String,
    /// Remote URL the pull request was looked up with.
    pub repository_url: String,
}

/// Result of a merge attempt. Either `sha` (and possibly `message`) or
/// `error` is set, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub merged: bool,
    pub sha: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl MergeOutcome {
    pub fn merged(sha: String, message: Option<String>) -> Self {
        Self {
            merged: true,
            sha: Some(sha),
            message,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            merged: false,
            sha: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Pending,
    Success,
    Failure,
    Error,
}

impl Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
        })
    }
}

impl FromStr for CommitState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            "error" => Ok(Self::Error),
            other => anyhow::bail!(
                "unknown commit state '{other}' (expected pending, success, failure or error)"
            ),
        }
    }
}

/// Commit status sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub state: CommitState,
    pub target_url: String,
    pub description: String,
    pub context: String,
}

/// The provider's copy of a commit status it accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAck {
    #[serde(default)]
    pub id: Option<u64>,
    pub state: CommitState,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    Acknowledged(StatusAck),
    Failed { error: String },
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubError {
    message: String,
    #[serde(default)]
    #[allow(dead_code)]
    documentation_url: Option<String>,
}

impl GitHubError {
    pub(crate) fn into_error(self, status: u16) -> Error {
        Error::Provider {
            status,
            message: self.message,
        }
    }
}

/// A response body decoded as the expected success shape, or else as a
/// GitHub error. Bodies matching neither are [`Error::MalformedPayload`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ApiReply<T> {
    Success(T),
    Failure(GitHubError),
}

impl<T: DeserializeOwned> ApiReply<T> {
    pub(crate) fn decode(response: &HttpResponse) -> Result<Self> {
        serde_json::from_str(&response.body).map_err(|_| Error::MalformedPayload {
            status: response.status,
            body: response.body.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    number: u64,
    title: String,
    head: CommitRef,
    merge_commit_sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Serialize)]
struct MergePullRequest {
    commit_message: &'static str,
}

#[derive(Debug, Deserialize)]
struct MergeResult {
    merged: bool,
    sha: String,
    #[serde(default)]
    message: Option<String>,
}

impl PullRequest {
    fn into_summary(self, repository_url: &str) -> PullRequestSummary {
        let short_commit = self.head.sha.chars().take(SHORT_HASH_LENGTH).collect();
        PullRequestSummary {
            number: self.number,
            title: self.title,
            commit: self.head.sha,
            merge_commit: self.merge_commit_sha,
            short_commit,
            repository_url: repository_url.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// GithubClient

/// Client to interact with GitHub API.
///
/// Every call is preceded by a fresh rate-limit check and is skipped when the
/// quota is used up.
pub struct GithubClient<H> {
    config: ProviderConfig,
    http: H,
}

impl<H: HttpTransport> GithubClient<H> {
    pub fn new(config: ProviderConfig, http: H) -> Self {
        Self { config, http }
    }

    pub fn rate_limit_gate(&self) -> RateLimitGate<'_, H> {
        RateLimitGate::new(&self.config, &self.http)
    }

    /// Gate, then send one request and decode its reply.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> Result<T> {
        self.rate_limit_gate().ensure_allowed(token).await?;

        let mut request = self.config.request(method, path, token);
        if let Some(body) = body {
            request = request.header("Content-Type", "application/json").body(body);
        }

        let response = self.http.send(request).await.map_err(Error::transport)?;
        match ApiReply::<T>::decode(&response)? {
            ApiReply::Success(value) => Ok(value),
            ApiReply::Failure(err) => Err(err.into_error(response.status)),
        }
    }

    /// List the open pull requests of a repository.
    #[instrument(skip_all, fields(remote = remote_url))]
    pub async fn fetch_pull_requests(
        &self,
        remote_url: &str,
        token: Option<&str>,
    ) -> Result<Vec<PullRequestSummary>> {
        let remote = RemoteDescriptor::parse(remote_url)?;
        let path = format!("/repos/{}/{}/pulls", remote.organization, remote.repository);

        let prs: Vec<PullRequest> = self.call(Method::Get, &path, token, None).await?;
        Ok(prs
            .into_iter()
            .map(|pr| pr.into_summary(remote_url))
            .collect())
    }

    /// Fetch one pull request by number.
    #[instrument(skip_all, fields(remote = remote_url, number = number))]
    pub async fn fetch_pull_request(
        &self,
        remote_url: &str,
        number: u64,
        token: Option<&str>,
    ) -> Result<PullRequestSummary> {
        let remote = RemoteDescriptor::parse(remote_url)?;
        let path = format!(
            "/repos/{}/{}/pulls/{}",
            remote.organization, remote.repository, number
        );

        let pr: PullRequest = self.call(Method::Get, &path, token, None).await?;
        Ok(pr.into_summary(remote_url))
    }

    /// Like [`Self::fetch_pull_requests`], but any failure is logged and
    /// yields an empty list, so "no pull requests" and "could not ask" look
    /// the same to the caller.
    pub async fn list_pull_requests(
        &self,
        remote_url: &str,
        token: Option<&str>,
    ) -> Vec<PullRequestSummary> {
        self.fetch_pull_requests(remote_url, token)
            .await
            .unwrap_or_else(|err| {
                warn!(%err, remote = remote_url, "could not list pull requests");
                Vec::new()
            })
    }

    /// Like [`Self::fetch_pull_request`], but any failure is logged and
    /// yields `None`.
    pub async fn get_pull_request(
        &self,
        remote_url: &str,
        number: u64,
        token: Option<&str>,
    ) -> Option<PullRequestSummary> {
        match self.fetch_pull_request(remote_url, number, token).await {
            Ok(pr) => Some(pr),
            Err(err) => {
                warn!(%err, remote = remote_url, number, "could not get pull request");
                None
            }
        }
    }

    /// Merge a pull request. Failures are reported in the outcome.
    #[instrument(skip_all, fields(remote = remote_url, number = number))]
    pub async fn merge_pull_request(
        &self,
        remote_url: &str,
        number: u64,
        token: &str,
    ) -> MergeOutcome {
        let result = self.try_merge(remote_url, number, token).await;
        let outcome = match result {
            Ok(MergeResult {
                merged: true,
                sha,
                message,
            }) => MergeOutcome::merged(sha, message),
            Ok(MergeResult { message, .. }) => {
                MergeOutcome::failed(message.unwrap_or_else(|| "Pull Request was not merged".into()))
            }
            Err(err) => MergeOutcome::failed(failure_text(err)),
        };

        if let Some(error) = &outcome.error {
            warn!(%error, "merge failed");
        }
        outcome
    }

    async fn try_merge(&self, remote_url: &str, number: u64, token: &str) -> Result<MergeResult> {
        let remote = RemoteDescriptor::parse(remote_url)?;
        let path = format!(
            "/repos/{}/{}/pulls/{}/merge",
            remote.organization, remote.repository, number
        );
        let body = encode(&MergePullRequest {
            commit_message: MERGE_COMMIT_MESSAGE,
        })?;

        self.call(Method::Put, &path, Some(token), Some(body)).await
    }

    /// Post a commit status. Failures are reported in the outcome.
    #[instrument(skip_all, fields(remote = remote_url, commit = commit, state = %state))]
    pub async fn update_commit_status(
        &self,
        remote_url: &str,
        commit: &str,
        state: CommitState,
        token: &str,
    ) -> StatusOutcome {
        match self.try_update_status(remote_url, commit, state, token).await {
            Ok(ack) => StatusOutcome::Acknowledged(ack),
            Err(err) => {
                let error = failure_text(err);
                warn!(%error, "commit status update failed");
                StatusOutcome::Failed { error }
            }
        }
    }

    async fn try_update_status(
        &self,
        remote_url: &str,
        commit: &str,
        state: CommitState,
        token: &str,
    ) -> Result<StatusAck> {
        let remote = RemoteDescriptor::parse(remote_url)?;
        let path = format!(
            "/repos/{}/{}/statuses/{}",
            remote.organization, remote.repository, commit
        );
        let body = encode(&StatusReport {
            state,
            target_url: self.config.status_target_url.clone(),
            description: state.to_string(),
            context: self.config.status_context.clone(),
        })?;

        self.call(Method::Post, &path, Some(token), Some(body)).await
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|err| Error::Transport(format!("cannot encode request body: {err}")))
}

/// Text reported to callers for a failed mutating call: the provider's own
/// message or raw body when there is one.
fn failure_text(err: Error) -> String {
    match err {
        Error::Provider { message, .. } => message,
        Error::MalformedPayload { status, body } if body.trim().is_empty() => {
            format!("empty response (status {status})")
        }
        Error::MalformedPayload { body, .. } => body,
        other => other.to_string(),
    }
}
