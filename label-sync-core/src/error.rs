use std::fmt;

use thiserror::Error;

/// A taxonomy that cannot be resolved at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("label `{0}` is defined more than once")]
    DuplicateName(String),

    #[error("labels did not settle after {passes} passes, the taxonomy contains a cycle")]
    Unstable { passes: usize },
}

/// Which list of an entry holds a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefField {
    Requires,
    Adds,
    Removes,
    Matches,
}

impl RefField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requires => "requires",
            Self::Adds => "adds",
            Self::Removes => "removes",
            Self::Matches => "matches",
        }
    }
}

impl fmt::Display for RefField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to a label that is not in the catalog.
///
/// Not fatal: dangling `requires` and `matches` are never satisfied, dangling
/// `adds` and `removes` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{entry}` {field} unknown label `{target}`")]
pub struct DanglingRef {
    pub entry: String,
    pub field: RefField,
    pub target: String,
}
