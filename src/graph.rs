//! Graphviz rendering of a project's taxonomy.

use label_sync_core::{value_name, ConfigError, LabelRef, LabelSet, Resolver, StateChange};

use crate::config::ProjectConfig;
use crate::random::project_rng;
use crate::sync::expected_labels;

const ADD_COLOR: &str = "green";
const REMOVE_COLOR: &str = "red";

/// Render the taxonomy as a `dot` digraph.
///
/// Nodes are filled with the same colors the label sync would use. State
/// values are grouped in one cluster per state. Fails like the sync passes do
/// when the taxonomy does not compile.
///
/// Example output:
/// ```text
/// digraph "owner/repo" {
///   node [style=filled];
///   "bug" [fillcolor="#d73a4a"];
///   subgraph "cluster_status" {
///     label="status";
///     "status/new" [fillcolor="#0e8a16"];
///   }
///   "bug" -> "status/new" [color=green];
/// }
/// ```
pub fn render_dot(project: &ProjectConfig) -> Result<String, ConfigError> {
    Resolver::new(&project.taxonomy)?;

    let mut rng = project_rng(&project.name);
    let labels = expected_labels(project, &mut rng);
    let color_of = |name: &str| {
        labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.color.trim_start_matches('#').to_string())
            .unwrap_or_default()
    };

    let taxonomy = &project.taxonomy;
    let mut output = format!("digraph {} {{\n", quote(&project.name));
    output.push_str("  node [style=filled];\n");

    for flag in &taxonomy.flags {
        push_node(&mut output, "  ", &flag.base.name, &color_of(&flag.base.name));
    }

    for state in &taxonomy.states {
        output.push_str(&format!(
            "  subgraph {} {{\n",
            quote(&format!("cluster_{}", state.base.name))
        ));
        output.push_str(&format!("    label={};\n", quote(&state.base.name)));
        for value in &state.values {
            let name = value_name(state, value);
            push_node(&mut output, "    ", &name, &color_of(&name));
        }
        output.push_str("  }\n");
    }

    let mut edges = Vec::new();

    for flag in &taxonomy.flags {
        let from = flag.base.name.as_str();
        requires_edges(&mut edges, from, &flag.base.requires);
        set_edges(&mut edges, from, &flag.set, None);
    }

    for state in &taxonomy.states {
        for value in &state.values {
            let from = value_name(state, value);
            requires_edges(&mut edges, &from, &value.base.requires);
            requires_edges(&mut edges, &from, &state.base.requires);
            set_edges(&mut edges, &from, &state.set, None);
            for change in &value.becomes {
                transition_edges(&mut edges, &from, change);
            }
        }
    }

    for edge in edges {
        output.push_str("  ");
        output.push_str(&edge);
        output.push('\n');
    }

    output.push_str("}\n");
    Ok(output)
}

fn push_node(output: &mut String, indent: &str, name: &str, color: &str) {
    output.push_str(&format!(
        "{indent}{} [fillcolor={}];\n",
        quote(name),
        quote(&format!("#{color}"))
    ));
}

fn requires_edges(edges: &mut Vec<String>, from: &str, requires: &[LabelRef]) {
    for dep in requires {
        edges.push(format!(
            "{} -> {} [style=dashed];",
            quote(from),
            quote(&dep.name)
        ));
    }
}

fn set_edges(edges: &mut Vec<String>, from: &str, set: &LabelSet, label: Option<&str>) {
    let label = label
        .map(|l| format!(", label={}", quote(l)))
        .unwrap_or_default();
    for target in &set.adds {
        edges.push(format!(
            "{} -> {} [color={ADD_COLOR}{label}];",
            quote(from),
            quote(&target.name)
        ));
    }
    for target in &set.removes {
        edges.push(format!(
            "{} -> {} [color={REMOVE_COLOR}{label}];",
            quote(from),
            quote(&target.name)
        ));
    }
}

fn transition_edges(edges: &mut Vec<String>, from: &str, change: &StateChange) {
    let matches: Vec<&str> = change.matches.iter().map(|m| m.name.as_str()).collect();
    set_edges(edges, from, &change.set, Some(matches.join(", ").as_str()));
}

/// A double-quoted dot identifier.
fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}
