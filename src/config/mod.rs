//! Configuration for label-sync.
//!
//! A single YAML file lists the projects to keep in sync. Each project carries
//! its taxonomy (flags and states), a fallback color palette, and the remote
//! tracker it lives on.

mod load;

use std::collections::BTreeMap;

use label_sync_core::Taxonomy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use load::*;

/// Fallback colors used when a project does not configure its own palette.
pub const DEFAULT_PALETTE: &[&str] = &[
    "b60205", "d93f0b", "fbca04", "0e8a16", "006b75", "1d76db", "0052cc", "5319e7", "e99695",
    "f9d0c4", "fef2c0", "c2e0c6", "bfdadc", "c5def5", "bfd4f2", "d4c5f9",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub logger: LoggerConfig,
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LoggerConfig {
    /// Default log filter (`info`, `label_sync=debug`, ...). `RUST_LOG` wins when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// One repository or project on a remote tracker.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectConfig {
    /// Project path on the remote, e.g. `owner/repo`. Also seeds fallback colors.
    pub name: String,
    /// Fallback palette for labels without an explicit color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    /// Post an audit comment after changing an issue's labels.
    #[serde(default = "default_true")]
    pub comment: bool,
    /// Delete remote labels that are not part of the taxonomy.
    #[serde(default)]
    pub prune: bool,
    #[serde(flatten)]
    pub taxonomy: Taxonomy,
    pub remote: RemoteConfig,
}

impl ProjectConfig {
    /// The configured palette, or [`DEFAULT_PALETTE`].
    pub fn palette(&self) -> Vec<String> {
        match &self.colors {
            Some(colors) => colors.clone(),
            None => DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Which tracker API a project lives on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemoteKind {
    #[serde(alias = "github-remote")]
    Github,
    #[serde(alias = "gitlab-remote")]
    Gitlab,
}

impl RemoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RemoteConfig {
    #[serde(rename = "type")]
    pub kind: RemoteKind,
    /// Read from the remote but skip every write.
    #[serde(default)]
    pub dryrun: bool,
    /// Adapter settings: `token`, `url`.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}
