mod common;

use common::{label, project, Call, MemoryRemote};
use label_sync::sync::{sync_issue_labels, sync_project_labels, SyncContext};
use label_sync_core::*;
use speculate2::speculate;
use tokio_test::block_on;

fn colored() -> Taxonomy {
    Taxonomy::new(
        vec![
            FlagLabel::new("bug").color("d73a4a").desc("Something is broken").adds(["triage"]),
            FlagLabel::new("triage").color("fbca04"),
        ],
        vec![StateLabel::new("status")
            .color("0e8a16")
            .desc("Workflow status")
            .value(StateValue::new("new"))
            .value(StateValue::new("done").color("5319e7"))],
    )
}

/// The `light` states flip forever while `flip` is present.
fn flapping() -> Taxonomy {
    let mut taxonomy = colored();
    taxonomy.flags.push(FlagLabel::new("flip"));
    taxonomy.states.push(
        StateLabel::new("light")
            .value(StateValue::new("on").becomes(
                StateChange::new().matches(["flip"]).adds(["light/off"]).removes(["light/on"]),
            ))
            .value(StateValue::new("off").becomes(
                StateChange::new().matches(["flip"]).adds(["light/on"]).removes(["light/off"]),
            )),
    );
    taxonomy
}

speculate! {
    describe "sync_project_labels" {
        it "creates every missing label in catalog order" {
            let config = project(colored());
            let remote = MemoryRemote::new();
            let mut ctx = SyncContext::new(&config, &remote);

            let summary = block_on(sync_project_labels(&mut ctx)).unwrap();

            assert_eq!(summary.created, 4);
            assert_eq!(
                remote.calls(),
                vec![
                    Call::CreateLabel("bug".to_string()),
                    Call::CreateLabel("triage".to_string()),
                    Call::CreateLabel("status/new".to_string()),
                    Call::CreateLabel("status/done".to_string()),
                ]
            );
            assert!(remote.labels().contains(&label("status/new", "0e8a16", "Workflow status")));
            assert!(remote.labels().contains(&label("bug", "d73a4a", "Something is broken")));
        }

        it "updates labels whose color or description drifted" {
            let config = project(colored());
            let remote = MemoryRemote::new()
                .with_label("bug", "000000", "Something is broken")
                .with_label("triage", "fbca04", "stale")
                .with_label("status/new", "0e8a16", "Workflow status")
                .with_label("status/done", "5319e7", "Workflow status");
            let mut ctx = SyncContext::new(&config, &remote);

            let summary = block_on(sync_project_labels(&mut ctx)).unwrap();

            assert_eq!(summary.updated, 2);
            assert_eq!(summary.unchanged, 2);
            assert_eq!(
                remote.calls(),
                vec![
                    Call::UpdateLabel("bug".to_string()),
                    Call::UpdateLabel("triage".to_string()),
                ]
            );
        }

        it "compares colors without case" {
            let config = project(Taxonomy::new(vec![FlagLabel::new("bug").color("d73a4a")], vec![]));
            let remote = MemoryRemote::new().with_label("bug", "D73A4A", "");
            let mut ctx = SyncContext::new(&config, &remote);

            let summary = block_on(sync_project_labels(&mut ctx)).unwrap();

            assert_eq!(summary.unchanged, 1);
            assert!(remote.calls().is_empty());
        }

        it "keeps labels outside the catalog" {
            let config = project(Taxonomy::new(vec![FlagLabel::new("bug").color("d73a4a")], vec![]));
            let remote = MemoryRemote::new()
                .with_label("bug", "d73a4a", "")
                .with_label("help wanted", "008672", "");
            let mut ctx = SyncContext::new(&config, &remote);

            let summary = block_on(sync_project_labels(&mut ctx)).unwrap();

            assert_eq!(summary.unmanaged, 1);
            assert_eq!(summary.deleted, 0);
            assert_eq!(remote.labels().len(), 2);
        }

        it "prunes labels outside the catalog when asked" {
            let mut config = project(Taxonomy::new(vec![FlagLabel::new("bug").color("d73a4a")], vec![]));
            config.prune = true;
            let remote = MemoryRemote::new()
                .with_label("bug", "d73a4a", "")
                .with_label("wontfix", "ffffff", "")
                .with_label("help wanted", "008672", "");
            let mut ctx = SyncContext::new(&config, &remote);

            let summary = block_on(sync_project_labels(&mut ctx)).unwrap();

            assert_eq!(summary.deleted, 2);
            assert_eq!(
                remote.calls(),
                vec![
                    Call::DeleteLabel("help wanted".to_string()),
                    Call::DeleteLabel("wontfix".to_string()),
                ]
            );
        }
    }

    describe "sync_issue_labels" {
        it "updates changed issues and leaves a comment" {
            let config = project(colored());
            let resolver = Resolver::new(&config.taxonomy).unwrap();
            let remote = MemoryRemote::new().with_issue(7, &["bug"]);
            let ctx = SyncContext::new(&config, &remote);

            let summary = block_on(sync_issue_labels(&ctx, &resolver)).unwrap();

            assert_eq!(summary.seen, 1);
            assert_eq!(summary.updated, 1);
            assert_eq!(remote.issue_labels(7), vec!["bug", "triage"]);

            let calls = remote.calls();
            assert_eq!(calls.len(), 2);
            assert_eq!(calls[0], Call::UpdateIssue(7, vec!["bug".to_string(), "triage".to_string()]));
            match &calls[1] {
                Call::Comment(7, body) => {
                    assert!(body.contains("- `bug` already existed."));
                    assert!(body.contains("- `triage` was created by `bug`."));
                }
                other => panic!("expected a comment, got {other:?}"),
            }
        }

        it "leaves settled issues alone" {
            let config = project(colored());
            let resolver = Resolver::new(&config.taxonomy).unwrap();
            let remote = MemoryRemote::new().with_issue(1, &["triage", "bug"]);
            let ctx = SyncContext::new(&config, &remote);

            let summary = block_on(sync_issue_labels(&ctx, &resolver)).unwrap();

            assert_eq!(summary.seen, 1);
            assert_eq!(summary.updated, 0);
            assert!(remote.calls().is_empty());
        }

        it "skips the comment when disabled" {
            let mut config = project(colored());
            config.comment = false;
            let resolver = Resolver::new(&config.taxonomy).unwrap();
            let remote = MemoryRemote::new().with_issue(3, &["bug"]);
            let ctx = SyncContext::new(&config, &remote);

            block_on(sync_issue_labels(&ctx, &resolver)).unwrap();

            assert_eq!(
                remote.calls(),
                vec![Call::UpdateIssue(3, vec!["bug".to_string(), "triage".to_string()])]
            );
        }

        it "skips issues that never settle and syncs the rest" {
            let config = project(flapping());
            let resolver = Resolver::new(&config.taxonomy).unwrap();
            let remote = MemoryRemote::new()
                .with_issue(1, &["flip", "light/on"])
                .with_issue(2, &["bug"]);
            let ctx = SyncContext::new(&config, &remote);

            let summary = block_on(sync_issue_labels(&ctx, &resolver)).unwrap();

            assert_eq!(summary.seen, 2);
            assert_eq!(summary.skipped, 1);
            assert_eq!(summary.updated, 1);
            assert_eq!(remote.issue_labels(1), vec!["flip", "light/on"]);
            assert_eq!(remote.issue_labels(2), vec!["bug", "triage"]);
        }

        it "keeps labels the taxonomy does not know" {
            let config = project(colored());
            let resolver = Resolver::new(&config.taxonomy).unwrap();
            let remote = MemoryRemote::new().with_issue(4, &["bug", "help wanted"]);
            let ctx = SyncContext::new(&config, &remote);

            block_on(sync_issue_labels(&ctx, &resolver)).unwrap();

            assert_eq!(remote.issue_labels(4), vec!["bug", "help wanted", "triage"]);
        }
    }
}
