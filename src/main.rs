use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use label_sync_core::Resolver;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use label_sync::config::{self, Config, ProjectConfig, CONFIG_ENV};
use label_sync::graph::render_dot;
use label_sync::remote::create_remote;
use label_sync::sync::{sync_issue_labels, sync_project_labels, warn_dangling, SyncContext};

#[derive(Parser)]
#[command(name = "label-sync")]
#[command(about = "Keep issue tracker labels in line with a declarative taxonomy")]
struct Cli {
    /// Config file (default: config.yml in the platform config directory)
    #[arg(short, long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Only sync these projects (repeatable)
    #[arg(short, long = "project", global = true)]
    projects: Vec<String>,

    /// Read from the remote but skip every write
    #[arg(long, global = true)]
    dryrun: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and update the labels of every open issue
    Issues,
    /// Create, update and prune the project's label definitions
    Labels,
    /// Print each project's taxonomy as a Graphviz digraph
    Graph,
    /// Print the JSON schema of the config file
    Schema,
}

/// Initialize tracing on stderr so stdout stays clean for `graph` and `schema`.
fn init_tracing(level: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .ok()
            .or_else(|| level.map(str::to_string))
            .unwrap_or_else(|| "label_sync=info,label_sync_core=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn selected<'a>(config: &'a Config, names: &'a [String]) -> impl Iterator<Item = &'a ProjectConfig> {
    config
        .projects
        .iter()
        .filter(move |p| names.is_empty() || names.contains(&p.name))
}

async fn run_project(project: &ProjectConfig, command: &Commands, dryrun: bool) -> anyhow::Result<()> {
    let name = project.name.as_str();

    let resolver = match Resolver::new(&project.taxonomy) {
        Ok(resolver) => resolver,
        Err(err) => {
            tracing::error!(project = name, %err, "invalid taxonomy, skipping project");
            return Ok(());
        }
    };
    warn_dangling(name, &resolver);

    let mut remote = create_remote(&project.remote, dryrun);
    remote
        .connect()
        .await
        .with_context(|| format!("connecting to {} for {name}", project.remote.kind.as_str()))?;

    let mut ctx = SyncContext::new(project, remote.as_ref());
    match command {
        Commands::Issues => {
            let summary = sync_issue_labels(&ctx, &resolver).await?;
            tracing::info!(
                project = name,
                seen = summary.seen,
                updated = summary.updated,
                skipped = summary.skipped,
                "synced issue labels"
            );
        }
        Commands::Labels => {
            let summary = sync_project_labels(&mut ctx).await?;
            tracing::info!(
                project = name,
                created = summary.created,
                updated = summary.updated,
                deleted = summary.deleted,
                unchanged = summary.unchanged,
                unmanaged = summary.unmanaged,
                "synced project labels"
            );
        }
        Commands::Graph | Commands::Schema => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Schema = cli.command {
        let schema = schemars::schema_for!(Config);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let path = match cli.config {
        Some(path) => path,
        None => config::default_path()?,
    };
    let config = config::load(&path)?;
    init_tracing(config.logger.level.as_deref());
    tracing::debug!(path = %path.display(), projects = config.projects.len(), "loaded config");

    for name in &cli.projects {
        if !config.projects.iter().any(|p| &p.name == name) {
            tracing::warn!(project = %name, "project is not in the config");
        }
    }

    for project in selected(&config, &cli.projects) {
        match cli.command {
            Commands::Graph => match render_dot(project) {
                Ok(dot) => print!("{dot}"),
                Err(err) => {
                    tracing::error!(project = %project.name, %err, "invalid taxonomy, skipping project");
                }
            },
            _ => run_project(project, &cli.command, cli.dryrun).await?,
        }
    }

    Ok(())
}
