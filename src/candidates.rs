//! Candidate values flowing through the pipeline

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What a place reference currently resolves to.
///
/// Serializes as `null`, a string, or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Candidates {
    #[default]
    NotFound,
    Single(String),
    Multiple(Vec<String>),
}

/// Place reference -> resolved value, ordered by reference.
pub type ResolutionMap = BTreeMap<String, Candidates>;

impl Candidates {
    /// Collapse a list of values: nothing is not-found, one value is single,
    /// more stay a list. Duplicates are removed keeping first-seen order.
    pub fn collapse<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        match unique.len() {
            0 => Self::NotFound,
            1 => Self::Single(unique.remove(0)),
            _ => Self::Multiple(unique),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(v) => Some(v),
            _ => None,
        }
    }

    /// Every value held, in order.
    pub fn values(&self) -> &[String] {
        match self {
            Self::NotFound => &[],
            Self::Single(v) => std::slice::from_ref(v),
            Self::Multiple(vs) => vs,
        }
    }
}

impl From<&str> for Candidates {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for Candidates {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Option<String>> for Candidates {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::NotFound, Self::Single)
    }
}
