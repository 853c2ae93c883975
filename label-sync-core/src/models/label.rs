use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A reference to another label by name.
///
/// References never own the label they point at. A reference to a name that is
/// not part of the catalog is dangling and is never satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct LabelRef {
    pub name: String,
}

impl LabelRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<&str> for LabelRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for LabelRef {
    fn from(name: String) -> Self {
        Self { name }
    }
}

/// A set of labels to add and/or remove.
///
/// Order inside either list does not affect resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LabelSet {
    #[serde(default)]
    pub adds: Vec<LabelRef>,
    #[serde(default)]
    pub removes: Vec<LabelRef>,
}

/// Fields shared by flags, states and state values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BaseLabel {
    /// Label name, unique within its owning scope.
    pub name: String,
    /// Display color as bare hex (`d73a4a`). Derived from the palette when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Higher priorities resolve first and win state ties.
    #[serde(default)]
    pub priority: i32,
    /// Labels that must be present for this one to be kept or added.
    #[serde(default)]
    pub requires: Vec<LabelRef>,
}

impl BaseLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The configured color, ignoring empty strings.
    pub fn explicit_color(&self) -> Option<&str> {
        self.color.as_deref().filter(|c| !c.is_empty())
    }
}

/// Individual labels: the equivalent of a checkbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FlagLabel {
    #[serde(flatten)]
    pub base: BaseLabel,
    #[serde(flatten)]
    pub set: LabelSet,
}

/// The transition between two state values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StateChange {
    #[serde(flatten)]
    pub set: LabelSet,
    /// Labels that must all be present for this transition to fire.
    #[serde(default)]
    pub matches: Vec<LabelRef>,
}

/// One of many values for a particular state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StateValue {
    #[serde(flatten)]
    pub base: BaseLabel,
    /// Transitions that may fire while this value is active.
    #[serde(default)]
    pub becomes: Vec<StateChange>,
}

/// Grouped labels: the equivalent of a radio group.
///
/// A state's own `requires` and label set apply to every one of its values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StateLabel {
    #[serde(flatten)]
    pub base: BaseLabel,
    #[serde(flatten)]
    pub set: LabelSet,
    #[serde(default)]
    pub values: Vec<StateValue>,
}

/// The flags and states of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Taxonomy {
    #[serde(default)]
    pub flags: Vec<FlagLabel>,
    #[serde(default)]
    pub states: Vec<StateLabel>,
}

impl Taxonomy {
    pub fn new(flags: Vec<FlagLabel>, states: Vec<StateLabel>) -> Self {
        Self { flags, states }
    }
}

fn refs<I, S>(names: I) -> Vec<LabelRef>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(LabelRef::new).collect()
}

// Chained setters for the `BaseLabel` fields, shared by every taxonomy type.
macro_rules! base_setters {
    ($ty:ty) => {
        impl $ty {
            pub fn priority(mut self, priority: i32) -> Self {
                self.base.priority = priority;
                self
            }

            pub fn color(mut self, color: impl Into<String>) -> Self {
                self.base.color = Some(color.into());
                self
            }

            pub fn desc(mut self, desc: impl Into<String>) -> Self {
                self.base.desc = Some(desc.into());
                self
            }

            pub fn requires<I, S>(mut self, names: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                self.base.requires.extend(refs(names));
                self
            }
        }
    };
}

macro_rules! set_setters {
    ($ty:ty) => {
        impl $ty {
            pub fn adds<I, S>(mut self, names: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                self.set.adds.extend(refs(names));
                self
            }

            pub fn removes<I, S>(mut self, names: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                self.set.removes.extend(refs(names));
                self
            }
        }
    };
}

base_setters!(FlagLabel);
base_setters!(StateValue);
base_setters!(StateLabel);
set_setters!(FlagLabel);
set_setters!(StateLabel);
set_setters!(StateChange);

impl FlagLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseLabel::new(name),
            set: LabelSet::default(),
        }
    }
}

impl StateValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseLabel::new(name),
            becomes: Vec::new(),
        }
    }

    pub fn becomes(mut self, change: StateChange) -> Self {
        self.becomes.push(change);
        self
    }
}

impl StateChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matches.extend(refs(names));
        self
    }
}

impl StateLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseLabel::new(name),
            set: LabelSet::default(),
            values: Vec::new(),
        }
    }

    pub fn value(mut self, value: StateValue) -> Self {
        self.values.push(value);
        self
    }
}
