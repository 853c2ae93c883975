use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a label entered, stayed in, left, or was kept out of the desired set.
///
/// - `Created`: newly desired, added by `cause`
/// - `Existing`: already present and still desired
/// - `Removed`: dropped by the `removes` of `cause`
/// - `Required`: dropped or never added because dependency `cause` is missing
/// - `Conflicted`: excluded pending human resolution; `cause` is the opposing label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChangeVerb {
    Created,
    Existing,
    Removed,
    Required,
    Conflicted,
}

impl ChangeVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Existing => "existing",
            Self::Removed => "removed",
            Self::Required => "required",
            Self::Conflicted => "conflicted",
        }
    }
}

impl fmt::Display for ChangeVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One explained label change produced by a resolution run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Change {
    pub label: String,
    pub effect: ChangeVerb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl Change {
    pub fn new(label: impl Into<String>, effect: ChangeVerb, cause: Option<String>) -> Self {
        Self {
            label: label.into(),
            effect,
            cause,
        }
    }

    pub fn existing(label: impl Into<String>) -> Self {
        Self::new(label, ChangeVerb::Existing, None)
    }
}
