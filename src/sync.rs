//! Sync orchestration: push a project's taxonomy to its remote.
//!
//! Two passes share one [`SyncContext`]. The label pass makes the remote's
//! label definitions match the catalog; the issue pass resolves each open
//! issue and replaces its labels when the result differs.

use std::collections::{BTreeSet, HashMap};

use anyhow::Context;
use label_sync_core::{resolve_color, value_name, Resolver};
use rand::rngs::StdRng;

use crate::config::ProjectConfig;
use crate::random::{project_rng, unit_source};
use crate::remote::{format_comment, LabelInfo, Remote};

/// Everything a sync pass needs for one project.
pub struct SyncContext<'a> {
    pub project: &'a ProjectConfig,
    pub remote: &'a dyn Remote,
    pub rng: StdRng,
}

impl<'a> SyncContext<'a> {
    /// Seed the color generator from the project name.
    pub fn new(project: &'a ProjectConfig, remote: &'a dyn Remote) -> Self {
        Self {
            project,
            remote,
            rng: project_rng(&project.name),
        }
    }
}

/// Outcome of [`sync_project_labels`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    /// Remote labels outside the catalog that were left in place.
    pub unmanaged: usize,
}

/// Outcome of [`sync_issue_labels`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub seen: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// The catalog as remote labels, with resolved colors and descriptions.
///
/// Labels are produced in catalog order so the seeded generator assigns the
/// same fallback colors on every run.
pub fn expected_labels(project: &ProjectConfig, rng: &mut StdRng) -> Vec<LabelInfo> {
    let palette = project.palette();
    let mut labels = Vec::new();

    for flag in &project.taxonomy.flags {
        labels.push(LabelInfo {
            name: flag.base.name.clone(),
            color: resolve_color(&palette, unit_source(rng), &[&flag.base]),
            desc: flag.base.desc.clone().unwrap_or_default(),
        });
    }

    for state in &project.taxonomy.states {
        for value in &state.values {
            let desc = value
                .base
                .desc
                .as_ref()
                .or(state.base.desc.as_ref())
                .cloned()
                .unwrap_or_default();
            labels.push(LabelInfo {
                name: value_name(state, value),
                color: resolve_color(&palette, unit_source(rng), &[&value.base, &state.base]),
                desc,
            });
        }
    }

    labels
}

fn same_color(a: &str, b: &str) -> bool {
    a.trim_start_matches('#')
        .eq_ignore_ascii_case(b.trim_start_matches('#'))
}

/// Create, update and optionally prune the project's label definitions.
pub async fn sync_project_labels(ctx: &mut SyncContext<'_>) -> anyhow::Result<LabelSummary> {
    let project = ctx.project.name.as_str();
    let expected = expected_labels(ctx.project, &mut ctx.rng);

    let existing = ctx
        .remote
        .list_labels(project)
        .await
        .with_context(|| format!("listing labels of {project}"))?;
    let mut remaining: HashMap<&str, &LabelInfo> =
        existing.iter().map(|l| (l.name.as_str(), l)).collect();

    let mut summary = LabelSummary::default();

    for label in &expected {
        match remaining.remove(label.name.as_str()) {
            None => {
                tracing::info!(project, label = %label.name, color = %label.color, "creating label");
                ctx.remote
                    .create_label(project, label)
                    .await
                    .with_context(|| format!("creating label {}", label.name))?;
                summary.created += 1;
            }
            Some(current) if same_color(&current.color, &label.color) && current.desc == label.desc => {
                summary.unchanged += 1;
            }
            Some(current) => {
                tracing::info!(
                    project,
                    label = %label.name,
                    from = %current.color,
                    to = %label.color,
                    "updating label"
                );
                ctx.remote
                    .update_label(project, label)
                    .await
                    .with_context(|| format!("updating label {}", label.name))?;
                summary.updated += 1;
            }
        }
    }

    let mut extra: Vec<&str> = remaining.into_keys().collect();
    extra.sort_unstable();

    for name in extra {
        if ctx.project.prune {
            tracing::info!(project, label = name, "deleting label");
            ctx.remote
                .delete_label(project, name)
                .await
                .with_context(|| format!("deleting label {name}"))?;
            summary.deleted += 1;
        } else {
            tracing::debug!(project, label = name, "label is not managed, keeping it");
            summary.unmanaged += 1;
        }
    }

    Ok(summary)
}

/// Resolve every open issue and write back the ones that changed.
///
/// An issue whose labels do not settle is logged and skipped; the rest of the
/// project still syncs.
pub async fn sync_issue_labels(
    ctx: &SyncContext<'_>,
    resolver: &Resolver,
) -> anyhow::Result<SyncSummary> {
    let project = ctx.project.name.as_str();
    let issues = ctx
        .remote
        .list_issues(project)
        .await
        .with_context(|| format!("listing issues of {project}"))?;

    let mut summary = SyncSummary::default();

    for issue in issues {
        summary.seen += 1;

        let resolution = match resolver.resolve(&issue.labels) {
            Ok(resolution) => resolution,
            Err(err) => {
                tracing::warn!(project, issue = issue.number, %err, "skipping issue");
                summary.skipped += 1;
                continue;
            }
        };

        let current: BTreeSet<&str> = issue.labels.iter().map(String::as_str).collect();
        let desired: BTreeSet<&str> = resolution.desired.iter().map(String::as_str).collect();
        if current == desired {
            tracing::debug!(project, issue = issue.number, "issue labels are up to date");
            continue;
        }

        let labels: Vec<String> = resolution.desired.iter().cloned().collect();
        tracing::info!(project, issue = issue.number, title = %issue.title, ?labels, "updating issue labels");
        ctx.remote
            .update_issue(project, issue.number, &labels)
            .await
            .with_context(|| format!("updating issue #{}", issue.number))?;

        if ctx.project.comment {
            ctx.remote
                .create_comment(project, issue.number, &format_comment(&resolution.changes))
                .await
                .with_context(|| format!("commenting on issue #{}", issue.number))?;
        }

        summary.updated += 1;
    }

    Ok(summary)
}

/// Log references to labels the catalog does not define.
pub fn warn_dangling(project: &str, resolver: &Resolver) {
    for dangling in resolver.dangling() {
        tracing::warn!(project, "{dangling}");
    }
}
