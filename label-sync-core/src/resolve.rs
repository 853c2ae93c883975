//! The label resolution engine.
//!
//! A [`Resolver`] is compiled once per taxonomy and then turns the current labels
//! of any number of issues into a desired label set plus an explained list of
//! [`Change`]s. Resolution runs in passes: every pass evaluates the entries that
//! are active at its start, in priority order, and applies their combined
//! effects. Passes repeat until nothing changes, then state exclusivity is
//! enforced and the working set settles again.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::catalog::{build_catalog, priority_sort, value_name, Prioritized};
use crate::error::{ConfigError, DanglingRef, RefField};
use crate::models::{Change, ChangeVerb, LabelRef, LabelSet, StateChange, Taxonomy};

/// Upper bound on passes for one resolution. Reaching it means the taxonomy
/// keeps flipping labels back and forth.
pub const MAX_PASSES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Flag,
    Value { state: usize },
}

/// Label effects applied while every `matches` label is present.
#[derive(Debug, Clone)]
struct Rule {
    matches: Vec<String>,
    adds: Vec<String>,
    removes: Vec<String>,
}

/// A flag or state value, flattened for resolution.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    priority: i32,
    kind: EntryKind,
    requires: Vec<String>,
    rules: Vec<Rule>,
}

impl Prioritized for Entry {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// Output of one resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The labels the resolution started from.
    pub current: BTreeSet<String>,
    pub desired: BTreeSet<String>,
    /// One record per label in `current ∪ desired`, plus labels that were kept
    /// out by a conflict or an unmet requirement, in priority order.
    pub changes: Vec<Change>,
}

impl Resolution {
    /// True when the desired labels are exactly the current ones.
    ///
    /// `Conflicted` and `Required` records for labels that were never present
    /// can still be reported on an unchanged issue.
    pub fn is_unchanged(&self) -> bool {
        self.current == self.desired
    }
}

/// Compiled taxonomy, shared read-only by every resolution of a run.
#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: Vec<String>,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    groups: Vec<Vec<usize>>,
    dangling: Vec<DanglingRef>,
}

/// Effects gathered from one pass, keyed by target label.
#[derive(Default)]
struct Plan<'a> {
    dropped: Vec<(&'a str, &'a str)>,
    adds: BTreeMap<&'a str, &'a str>,
    removes: BTreeMap<&'a str, &'a str>,
}

/// Last reason each label entered or left the working set.
type Ledger = HashMap<String, (ChangeVerb, String)>;

impl Resolver {
    /// Compile a taxonomy. Fails on duplicate catalog names.
    pub fn new(taxonomy: &Taxonomy) -> Result<Self, ConfigError> {
        let catalog = build_catalog(&taxonomy.flags, &taxonomy.states);

        let mut known = HashSet::new();
        for name in &catalog {
            if !known.insert(name.as_str()) {
                return Err(ConfigError::DuplicateName(name.clone()));
            }
        }

        let mut dangling = Vec::new();
        let mut entries = Vec::new();

        for flag in &taxonomy.flags {
            let name = &flag.base.name;
            check_refs(&known, name, RefField::Requires, &flag.base.requires, &mut dangling);
            entries.push(Entry {
                name: name.clone(),
                priority: flag.base.priority,
                kind: EntryKind::Flag,
                requires: names(&flag.base.requires),
                rules: vec![set_rule(&known, name, &flag.set, &mut dangling)],
            });
        }

        for (state_idx, state) in taxonomy.states.iter().enumerate() {
            let state_name = &state.base.name;
            check_refs(&known, state_name, RefField::Requires, &state.base.requires, &mut dangling);
            let state_rule = set_rule(&known, state_name, &state.set, &mut dangling);

            for value in &state.values {
                let name = value_name(state, value);
                check_refs(&known, &name, RefField::Requires, &value.base.requires, &mut dangling);

                let mut requires = names(&value.base.requires);
                requires.extend(names(&state.base.requires));

                let mut rules = vec![state_rule.clone()];
                for change in &value.becomes {
                    rules.push(change_rule(&known, &name, change, &mut dangling));
                }

                entries.push(Entry {
                    name,
                    priority: value.base.priority,
                    kind: EntryKind::Value { state: state_idx },
                    requires,
                    rules,
                });
            }
        }

        let entries = priority_sort(entries);
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();

        let mut groups = vec![Vec::new(); taxonomy.states.len()];
        for (i, entry) in entries.iter().enumerate() {
            if let EntryKind::Value { state } = entry.kind {
                groups[state].push(i);
            }
        }

        for issue in &dangling {
            tracing::debug!(%issue, "dangling label reference");
        }

        Ok(Self {
            catalog,
            entries,
            index,
            groups,
            dangling,
        })
    }

    /// Concrete label names in catalog order.
    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Catalog names in resolution order (priority, then name).
    pub fn ordered(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// References to labels outside the catalog, found while compiling.
    pub fn dangling(&self) -> &[DanglingRef] {
        &self.dangling
    }

    /// Resolve the desired labels for one issue or project.
    ///
    /// Labels outside the catalog are left untouched. Fails with
    /// [`ConfigError::Unstable`] when the taxonomy does not settle within
    /// [`MAX_PASSES`].
    pub fn resolve<I, S>(&self, current: I) -> Result<Resolution, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let current: BTreeSet<String> = current
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut working = current.clone();
        let mut excluded = HashSet::new();
        let mut ledger = Ledger::new();
        let mut passes = 0;

        loop {
            loop {
                if passes >= MAX_PASSES {
                    tracing::warn!(passes, "label resolution did not settle");
                    return Err(ConfigError::Unstable { passes });
                }
                passes += 1;
                if !self.run_pass(&mut working, &excluded, &mut ledger) {
                    break;
                }
            }

            if !self.enforce_exclusive(&mut working, &mut excluded, &mut ledger) {
                break;
            }
        }

        tracing::debug!(passes, desired = working.len(), "labels resolved");

        let changes = self.changes(&current, &working, &ledger);
        Ok(Resolution {
            current,
            desired: working,
            changes,
        })
    }

    /// First dependency of `entry` missing from `labels`.
    fn unmet<'a>(&self, entry: &'a Entry, labels: &BTreeSet<String>) -> Option<&'a str> {
        entry
            .requires
            .iter()
            .find(|dep| !self.present(dep, labels))
            .map(String::as_str)
    }

    /// Catalog label present in `labels`. Names outside the catalog never are.
    fn present(&self, label: &str, labels: &BTreeSet<String>) -> bool {
        self.contains(label) && labels.contains(label)
    }

    fn plan<'a>(&'a self, snapshot: &BTreeSet<String>) -> Plan<'a> {
        let mut plan = Plan::default();

        for entry in self.entries.iter().filter(|e| snapshot.contains(&e.name)) {
            if let Some(dependency) = self.unmet(entry, snapshot) {
                plan.dropped.push((entry.name.as_str(), dependency));
                continue;
            }

            let firing = entry
                .rules
                .iter()
                .filter(|rule| rule.matches.iter().all(|m| self.present(m, snapshot)));
            for rule in firing {
                for label in &rule.adds {
                    plan.adds.entry(label.as_str()).or_insert(entry.name.as_str());
                }
                for label in &rule.removes {
                    plan.removes.entry(label.as_str()).or_insert(entry.name.as_str());
                }
            }
        }

        plan
    }

    /// Apply one pass. Returns whether the working set changed.
    fn run_pass(
        &self,
        working: &mut BTreeSet<String>,
        excluded: &HashSet<String>,
        ledger: &mut Ledger,
    ) -> bool {
        let snapshot = working.clone();
        let plan = self.plan(&snapshot);
        let mut changed = false;

        for &(label, dependency) in &plan.dropped {
            if working.remove(label) {
                record(ledger, label, ChangeVerb::Required, dependency);
                changed = true;
            }
        }

        for (&label, &remover) in &plan.removes {
            if plan.adds.contains_key(label) {
                // An add and a remove of the same label cancel out and exclude it,
                // whether or not it is currently present.
                record(ledger, label, ChangeVerb::Conflicted, remover);
                changed |= working.remove(label);
            } else if working.remove(label) {
                record(ledger, label, ChangeVerb::Removed, remover);
                changed = true;
            }
        }

        for (&label, &adder) in &plan.adds {
            if plan.removes.contains_key(label)
                || excluded.contains(label)
                || working.contains(label)
            {
                continue;
            }
            let Some(&idx) = self.index.get(label) else {
                continue;
            };
            if let Some(dependency) = self.unmet(&self.entries[idx], &snapshot) {
                tracing::trace!(label, dependency, "skipping add with unmet requirement");
                record(ledger, label, ChangeVerb::Required, dependency);
                continue;
            }
            working.insert(label.to_string());
            record(ledger, label, ChangeVerb::Created, adder);
            changed = true;
        }

        changed
    }

    /// Keep only the highest priority value of each state.
    fn enforce_exclusive(
        &self,
        working: &mut BTreeSet<String>,
        excluded: &mut HashSet<String>,
        ledger: &mut Ledger,
    ) -> bool {
        let mut losers = Vec::new();

        for group in &self.groups {
            let mut active = group
                .iter()
                .map(|&i| &self.entries[i])
                .filter(|e| working.contains(&e.name));
            let Some(kept) = active.next() else {
                continue;
            };
            for loser in active {
                losers.push((loser.name.as_str(), kept.name.as_str()));
            }
        }

        for &(loser, kept) in &losers {
            working.remove(loser);
            excluded.insert(loser.to_string());
            record(ledger, loser, ChangeVerb::Conflicted, kept);
        }

        !losers.is_empty()
    }

    fn changes(
        &self,
        current: &BTreeSet<String>,
        desired: &BTreeSet<String>,
        ledger: &Ledger,
    ) -> Vec<Change> {
        // Labels that never made it into the set still explain why.
        let blocked = ledger.iter().filter_map(|(label, (effect, _))| {
            matches!(effect, ChangeVerb::Conflicted | ChangeVerb::Required).then_some(label)
        });
        let labels: BTreeSet<&String> = current.union(desired).chain(blocked).collect();

        let mut changes: Vec<Change> = labels
            .into_iter()
            .map(|label| {
                let was = current.contains(label);
                let is = desired.contains(label);
                match (was, is, ledger.get(label)) {
                    (true, true, _) => Change::existing(label.as_str()),
                    (_, _, Some((effect, cause))) => {
                        Change::new(label.as_str(), *effect, Some(cause.clone()))
                    }
                    // every entry into or out of the set is recorded
                    (_, _, None) => Change::existing(label.as_str()),
                }
            })
            .collect();

        changes.sort_by(|a, b| {
            self.rank(&a.label)
                .cmp(&self.rank(&b.label))
                .then_with(|| a.label.cmp(&b.label))
        });
        changes
    }

    fn rank(&self, label: &str) -> usize {
        self.index.get(label).copied().unwrap_or(usize::MAX)
    }
}

/// Resolve `current` against `taxonomy` in one call.
///
/// Compiles a fresh [`Resolver`]; build one and reuse it when resolving many
/// issues against the same taxonomy.
pub fn resolve<I, S>(taxonomy: &Taxonomy, current: I) -> Result<Resolution, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Resolver::new(taxonomy)?.resolve(current)
}

fn record(ledger: &mut Ledger, label: &str, effect: ChangeVerb, cause: &str) {
    ledger.insert(label.to_string(), (effect, cause.to_string()));
}

fn names(refs: &[LabelRef]) -> Vec<String> {
    refs.iter().map(|r| r.name.clone()).collect()
}

fn check_refs(
    known: &HashSet<&str>,
    entry: &str,
    field: RefField,
    refs: &[LabelRef],
    dangling: &mut Vec<DanglingRef>,
) {
    for r in refs.iter().filter(|r| !known.contains(r.name.as_str())) {
        dangling.push(DanglingRef {
            entry: entry.to_string(),
            field,
            target: r.name.clone(),
        });
    }
}

/// Keep only catalog names of an adds/removes list.
fn known_names(
    known: &HashSet<&str>,
    entry: &str,
    field: RefField,
    refs: &[LabelRef],
    dangling: &mut Vec<DanglingRef>,
) -> Vec<String> {
    check_refs(known, entry, field, refs, dangling);
    refs.iter()
        .filter(|r| known.contains(r.name.as_str()))
        .map(|r| r.name.clone())
        .collect()
}

fn set_rule(
    known: &HashSet<&str>,
    entry: &str,
    set: &LabelSet,
    dangling: &mut Vec<DanglingRef>,
) -> Rule {
    Rule {
        matches: Vec::new(),
        adds: known_names(known, entry, RefField::Adds, &set.adds, dangling),
        removes: known_names(known, entry, RefField::Removes, &set.removes, dangling),
    }
}

fn change_rule(
    known: &HashSet<&str>,
    entry: &str,
    change: &StateChange,
    dangling: &mut Vec<DanglingRef>,
) -> Rule {
    check_refs(known, entry, RefField::Matches, &change.matches, dangling);
    Rule {
        matches: names(&change.matches),
        ..set_rule(known, entry, &change.set, dangling)
    }
}
