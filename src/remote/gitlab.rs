//! GitLab v4 API implementation of the [`Remote`] contract.
//!
//! GitLab addresses projects by their URL-encoded path and issues by their
//! project-local `iid`. Colors travel as `#rrggbb` and are stored bare.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;

use super::{
    api_url, handle_empty_response, handle_response, Issue, LabelInfo, Remote, RemoteError,
};
use crate::config::RemoteConfig;

const DEFAULT_URL: &str = "https://gitlab.com/api/v4";

/// Token fallback when `remote.data.token` is unset.
pub const TOKEN_ENV: &str = "GITLAB_TOKEN";

const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct GitlabIssue {
    iid: u64,
    title: String,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GitlabLabel {
    name: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<GitlabLabel> for LabelInfo {
    fn from(label: GitlabLabel) -> Self {
        Self {
            name: label.name,
            color: label.color.trim_start_matches('#').to_lowercase(),
            desc: label.description.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitlabRemote {
    base_url: String,
    token: Option<String>,
    dryrun: bool,
    client: Option<Client>,
}

impl GitlabRemote {
    pub fn new(base_url: impl Into<String>, token: Option<String>, dryrun: bool) -> Self {
        Self {
            base_url: base_url.into(),
            token,
            dryrun,
            client: None,
        }
    }

    pub fn from_config(config: &RemoteConfig, dryrun: bool) -> Self {
        let base_url = config
            .data
            .get("url")
            .cloned()
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let token = config
            .data
            .get("token")
            .cloned()
            .or_else(|| std::env::var(TOKEN_ENV).ok());
        Self::new(base_url, token, dryrun || config.dryrun)
    }

    /// Build a request against `/projects/{project}/{path...}`.
    fn request(
        &self,
        method: Method,
        project: &str,
        path: &[&str],
    ) -> Result<RequestBuilder, RemoteError> {
        let client = self.client.as_ref().ok_or(RemoteError::NotConnected)?;

        let mut segments = vec!["projects", project];
        segments.extend_from_slice(path);
        let url = api_url(&self.base_url, &segments)?;

        let mut req = client.request(method, url);
        if let Some(ref token) = self.token {
            req = req.header("PRIVATE-TOKEN", token);
        }
        Ok(req)
    }

    async fn list_all<T: serde::de::DeserializeOwned>(
        &self,
        project: &str,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, RemoteError> {
        let mut items = Vec::new();
        let per_page = PAGE_SIZE.to_string();
        let mut page = 1usize;

        loop {
            let page_str = page.to_string();
            let response = self
                .request(Method::GET, project, path)?
                .query(query)
                .query(&[("per_page", per_page.as_str()), ("page", page_str.as_str())])
                .send()
                .await?;
            let batch: Vec<T> = handle_response(response).await?;
            let done = batch.len() < PAGE_SIZE;
            items.extend(batch);
            if done {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    fn body(label: &LabelInfo) -> serde_json::Value {
        serde_json::json!({
            "color": format!("#{}", label.color.trim_start_matches('#')),
            "description": label.desc,
        })
    }
}

#[async_trait]
impl Remote for GitlabRemote {
    async fn connect(&mut self) -> Result<(), RemoteError> {
        tracing::info!(url = %self.base_url, "connecting to gitlab");

        if self.token.is_none() {
            return Err(RemoteError::Config(format!(
                "gitlab token missing, set remote.data.token or {TOKEN_ENV}"
            )));
        }

        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        self.client = Some(client);
        Ok(())
    }

    async fn list_issues(&self, project: &str) -> Result<Vec<Issue>, RemoteError> {
        let issues: Vec<GitlabIssue> = self
            .list_all(project, &["issues"], &[("state", "opened")])
            .await?;

        Ok(issues
            .into_iter()
            .map(|issue| Issue {
                number: issue.iid,
                title: issue.title,
                labels: issue.labels,
            })
            .collect())
    }

    async fn list_labels(&self, project: &str) -> Result<Vec<LabelInfo>, RemoteError> {
        let labels: Vec<GitlabLabel> = self.list_all(project, &["labels"], &[]).await?;
        Ok(labels.into_iter().map(LabelInfo::from).collect())
    }

    async fn create_label(
        &self,
        project: &str,
        label: &LabelInfo,
    ) -> Result<LabelInfo, RemoteError> {
        if self.dryrun {
            tracing::info!(project, label = %label.name, "dry run, not creating label");
            return Ok(label.clone());
        }

        let mut body = Self::body(label);
        body["name"] = serde_json::Value::String(label.name.clone());

        let response = self
            .request(Method::POST, project, &["labels"])?
            .json(&body)
            .send()
            .await?;
        let created: GitlabLabel = handle_response(response).await?;
        Ok(created.into())
    }

    async fn update_label(
        &self,
        project: &str,
        label: &LabelInfo,
    ) -> Result<LabelInfo, RemoteError> {
        if self.dryrun {
            tracing::info!(project, label = %label.name, "dry run, not updating label");
            return Ok(label.clone());
        }

        let response = self
            .request(Method::PUT, project, &["labels", label.name.as_str()])?
            .json(&Self::body(label))
            .send()
            .await?;
        let updated: GitlabLabel = handle_response(response).await?;
        Ok(updated.into())
    }

    async fn delete_label(&self, project: &str, name: &str) -> Result<(), RemoteError> {
        if self.dryrun {
            tracing::info!(project, label = name, "dry run, not deleting label");
            return Ok(());
        }

        let response = self
            .request(Method::DELETE, project, &["labels", name])?
            .send()
            .await?;
        handle_empty_response(response).await
    }

    async fn update_issue(
        &self,
        project: &str,
        issue: u64,
        labels: &[String],
    ) -> Result<(), RemoteError> {
        if self.dryrun {
            tracing::info!(project, issue, ?labels, "dry run, not updating issue");
            return Ok(());
        }

        let iid = issue.to_string();
        let response = self
            .request(Method::PUT, project, &["issues", iid.as_str()])?
            .json(&serde_json::json!({ "labels": labels.join(",") }))
            .send()
            .await?;
        handle_empty_response(response).await?;

        tracing::info!(project, issue, "updated issue");
        Ok(())
    }

    async fn create_comment(
        &self,
        project: &str,
        issue: u64,
        body: &str,
    ) -> Result<(), RemoteError> {
        tracing::debug!(project, issue, body, "creating issue note");
        if self.dryrun {
            return Ok(());
        }

        let iid = issue.to_string();
        let response = self
            .request(Method::POST, project, &["issues", iid.as_str(), "notes"])?
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;
        handle_empty_response(response).await
    }
}
