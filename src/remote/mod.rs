//! Remote issue trackers.
//!
//! A [`Remote`] is a thin CRUD adapter over a tracker's HTTP API. It knows
//! nothing about taxonomies: the sync orchestrator decides what to write and the
//! remote writes it, or only logs it on a dry run.

mod github;
mod gitlab;

use async_trait::async_trait;
use label_sync_core::{Change, ChangeVerb};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use github::GithubRemote;
pub use gitlab::GitlabRemote;

use crate::config::{RemoteConfig, RemoteKind};

/// Remote errors.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: token missing or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Invalid remote config: {0}")]
    Config(String),

    #[error("Remote is not connected")]
    NotConnected,
}

/// An issue and its current labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub labels: Vec<String>,
}

/// A label as it exists, or should exist, on the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelInfo {
    pub name: String,
    /// Bare hex color, without a leading `#`.
    pub color: String,
    pub desc: String,
}

/// Operations every tracker must provide.
#[async_trait]
pub trait Remote: Send + Sync {
    /// Build the API client. Must be called before any other operation.
    async fn connect(&mut self) -> Result<(), RemoteError>;

    /// List open issues with their labels.
    async fn list_issues(&self, project: &str) -> Result<Vec<Issue>, RemoteError>;

    /// List all labels defined on the project.
    async fn list_labels(&self, project: &str) -> Result<Vec<LabelInfo>, RemoteError>;

    async fn create_label(&self, project: &str, label: &LabelInfo)
        -> Result<LabelInfo, RemoteError>;

    /// Update a label's color and description.
    async fn update_label(&self, project: &str, label: &LabelInfo)
        -> Result<LabelInfo, RemoteError>;

    async fn delete_label(&self, project: &str, name: &str) -> Result<(), RemoteError>;

    /// Replace the labels of an issue.
    async fn update_issue(
        &self,
        project: &str,
        issue: u64,
        labels: &[String],
    ) -> Result<(), RemoteError>;

    /// Add a comment to an issue, for attribution and auditing.
    async fn create_comment(&self, project: &str, issue: u64, body: &str)
        -> Result<(), RemoteError>;
}

/// Create the adapter for a project's remote. Call [`Remote::connect`] next.
pub fn create_remote(config: &RemoteConfig, dryrun: bool) -> Box<dyn Remote> {
    match config.kind {
        RemoteKind::Github => Box::new(GithubRemote::from_config(config, dryrun)),
        RemoteKind::Gitlab => Box::new(GitlabRemote::from_config(config, dryrun)),
    }
}

/// Render the audit comment posted after an issue's labels change.
pub fn format_comment(changes: &[Change]) -> String {
    let mut lines = vec![
        format!(
            "{} v{} has updated the labels on this issue!",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ),
        String::new(),
    ];

    for change in changes {
        let label = &change.label;
        let cause = change.cause.as_deref().unwrap_or("unknown");
        let line = match change.effect {
            ChangeVerb::Conflicted => format!("- `{label}` conflicted with `{cause}`."),
            ChangeVerb::Created => format!("- `{label}` was created by `{cause}`."),
            ChangeVerb::Existing => format!("- `{label}` already existed."),
            ChangeVerb::Removed => format!("- `{label}` was removed by `{cause}`."),
            ChangeVerb::Required => {
                format!("- `{label}` was removed because it requires `{cause}`.")
            }
        };
        lines.push(line);
    }

    lines.join("\n")
}

/// `base` with `segments` appended, each percent-encoded (`status/new` stays one segment).
pub(crate) fn api_url(base: &str, segments: &[&str]) -> Result<Url, RemoteError> {
    let mut url =
        Url::parse(base).map_err(|e| RemoteError::Config(format!("invalid url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| RemoteError::Config(format!("url cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Handle response, converting HTTP errors to RemoteError.
pub(crate) async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, RemoteError> {
    let response = check_status(response).await?;
    Ok(response.json().await?)
}

/// Handle response whose body is not needed.
pub(crate) async fn handle_empty_response(response: reqwest::Response) -> Result<(), RemoteError> {
    check_status(response).await.map(|_| ())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => Err(RemoteError::NotFound(body)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(RemoteError::BadRequest(body))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::Unauthorized),
        _ => Err(RemoteError::Server(format!("{}: {}", status, body))),
    }
}
