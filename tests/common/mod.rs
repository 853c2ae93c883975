//! In-memory remote shared by the integration specs.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use label_sync::config::{ProjectConfig, RemoteConfig, RemoteKind};
use label_sync::remote::{Issue, LabelInfo, Remote, RemoteError};
use label_sync_core::Taxonomy;

/// A write the remote received, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateLabel(String),
    UpdateLabel(String),
    DeleteLabel(String),
    UpdateIssue(u64, Vec<String>),
    Comment(u64, String),
}

#[derive(Default)]
struct State {
    issues: Vec<Issue>,
    labels: Vec<LabelInfo>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct MemoryRemote {
    state: Mutex<State>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(self, number: u64, labels: &[&str]) -> Self {
        self.state.lock().unwrap().issues.push(Issue {
            number,
            title: format!("issue {number}"),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        });
        self
    }

    pub fn with_label(self, name: &str, color: &str, desc: &str) -> Self {
        self.state.lock().unwrap().labels.push(label(name, color, desc));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn labels(&self) -> Vec<LabelInfo> {
        self.state.lock().unwrap().labels.clone()
    }

    pub fn issue_labels(&self, number: u64) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .issues
            .iter()
            .find(|i| i.number == number)
            .map(|i| i.labels.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Remote for MemoryRemote {
    async fn connect(&mut self) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn list_issues(&self, _project: &str) -> Result<Vec<Issue>, RemoteError> {
        Ok(self.state.lock().unwrap().issues.clone())
    }

    async fn list_labels(&self, _project: &str) -> Result<Vec<LabelInfo>, RemoteError> {
        Ok(self.labels())
    }

    async fn create_label(
        &self,
        _project: &str,
        label: &LabelInfo,
    ) -> Result<LabelInfo, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.labels.push(label.clone());
        state.calls.push(Call::CreateLabel(label.name.clone()));
        Ok(label.clone())
    }

    async fn update_label(
        &self,
        _project: &str,
        label: &LabelInfo,
    ) -> Result<LabelInfo, RemoteError> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .labels
            .iter_mut()
            .find(|l| l.name == label.name)
            .ok_or_else(|| RemoteError::NotFound(label.name.clone()))?;
        *existing = label.clone();
        state.calls.push(Call::UpdateLabel(label.name.clone()));
        Ok(label.clone())
    }

    async fn delete_label(&self, _project: &str, name: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.labels.retain(|l| l.name != name);
        state.calls.push(Call::DeleteLabel(name.to_string()));
        Ok(())
    }

    async fn update_issue(
        &self,
        _project: &str,
        issue: u64,
        labels: &[String],
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .issues
            .iter_mut()
            .find(|i| i.number == issue)
            .ok_or_else(|| RemoteError::NotFound(issue.to_string()))?;
        existing.labels = labels.to_vec();
        state.calls.push(Call::UpdateIssue(issue, labels.to_vec()));
        Ok(())
    }

    async fn create_comment(
        &self,
        _project: &str,
        issue: u64,
        body: &str,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Comment(issue, body.to_string()));
        Ok(())
    }
}

pub fn label(name: &str, color: &str, desc: &str) -> LabelInfo {
    LabelInfo {
        name: name.to_string(),
        color: color.to_string(),
        desc: desc.to_string(),
    }
}

pub fn project(taxonomy: Taxonomy) -> ProjectConfig {
    ProjectConfig {
        name: "owner/repo".to_string(),
        colors: None,
        comment: true,
        prune: false,
        taxonomy,
        remote: RemoteConfig {
            kind: RemoteKind::Github,
            dryrun: false,
            data: Default::default(),
        },
    }
}
