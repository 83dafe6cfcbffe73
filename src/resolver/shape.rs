//! Input and output shapes
//!
//! Callers hand in a single reference, a sequence, or a table column with
//! nulls. Internally the pipeline only sees a deduplicated list; the shape is
//! restored at the very end.

use serde::Serialize;

use crate::candidates::{Candidates, ResolutionMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceInput {
    Single(String),
    Sequence(Vec<String>),
    /// A table column; `None` rows are carried through untouched.
    Column(Vec<Option<String>>),
}

/// Resolved values in the same shape, order and length as the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlaceOutput {
    Single(Candidates),
    Sequence(Vec<Candidates>),
    Column(Vec<Candidates>),
}

impl PlaceInput {
    /// Distinct non-null references in first-seen order.
    pub fn unique(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.iter()
            .flatten()
            .filter(|p| seen.insert(*p))
            .map(str::to_string)
            .collect()
    }

    /// Every row, nulls included, in input order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = Option<&str>> + '_> {
        match self {
            Self::Single(p) => Box::new(std::iter::once(Some(p.as_str()))),
            Self::Sequence(ps) => Box::new(ps.iter().map(|p| Some(p.as_str()))),
            Self::Column(ps) => Box::new(ps.iter().map(|p| p.as_deref())),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Sequence(ps) => ps.len(),
            Self::Column(ps) => ps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expand a resolution map back to this input's shape. References
    /// missing from the map, and null rows, become [`Candidates::NotFound`].
    pub fn reshape(&self, map: &ResolutionMap) -> PlaceOutput {
        let lookup = |place: Option<&str>| {
            place
                .and_then(|p| map.get(p))
                .cloned()
                .unwrap_or_default()
        };
        match self {
            Self::Single(p) => PlaceOutput::Single(lookup(Some(p))),
            Self::Sequence(_) => PlaceOutput::Sequence(self.iter().map(lookup).collect()),
            Self::Column(_) => PlaceOutput::Column(self.iter().map(lookup).collect()),
        }
    }
}

impl PlaceOutput {
    /// Flatten to one value per input row.
    pub fn into_vec(self) -> Vec<Candidates> {
        match self {
            Self::Single(c) => vec![c],
            Self::Sequence(cs) | Self::Column(cs) => cs,
        }
    }

    /// The value of a single-reference resolution.
    pub fn into_single(self) -> Option<Candidates> {
        match self {
            Self::Single(c) => Some(c),
            _ => None,
        }
    }
}

impl From<&str> for PlaceInput {
    fn from(place: &str) -> Self {
        Self::Single(place.to_string())
    }
}

impl From<String> for PlaceInput {
    fn from(place: String) -> Self {
        Self::Single(place)
    }
}

impl From<Vec<String>> for PlaceInput {
    fn from(places: Vec<String>) -> Self {
        Self::Sequence(places)
    }
}

impl From<Vec<&str>> for PlaceInput {
    fn from(places: Vec<&str>) -> Self {
        Self::Sequence(places.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for PlaceInput {
    fn from(places: &[&str]) -> Self {
        Self::Sequence(places.iter().map(|p| p.to_string()).collect())
    }
}

impl From<Vec<Option<String>>> for PlaceInput {
    fn from(column: Vec<Option<String>>) -> Self {
        Self::Column(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_keeps_first_seen_order() {
        let input = PlaceInput::from(vec!["A", "B", "A", "C", "B"]);
        assert_eq!(input.unique(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_column_skips_nulls() {
        let input = PlaceInput::Column(vec![Some("A".into()), None, Some("A".into())]);
        assert_eq!(input.unique(), vec!["A"]);
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn test_reshape_sequence_with_repeats() {
        let input = PlaceInput::from(vec!["A", "B", "A"]);
        let map = ResolutionMap::from([
            ("A".to_string(), Candidates::from("1")),
            ("B".to_string(), Candidates::from("2")),
        ]);
        let out = input.reshape(&map);
        assert_eq!(
            out,
            PlaceOutput::Sequence(vec![
                Candidates::from("1"),
                Candidates::from("2"),
                Candidates::from("1"),
            ])
        );
    }

    #[test]
    fn test_reshape_column_keeps_alignment() {
        let input = PlaceInput::Column(vec![Some("A".into()), None, Some("Z".into())]);
        let map = ResolutionMap::from([("A".to_string(), Candidates::from("1"))]);
        assert_eq!(
            input.reshape(&map).into_vec(),
            vec![Candidates::from("1"), Candidates::NotFound, Candidates::NotFound]
        );
    }

    #[test]
    fn test_reshape_single() {
        let input = PlaceInput::from("A");
        let map = ResolutionMap::from([("A".to_string(), Candidates::from("1"))]);
        assert_eq!(input.reshape(&map).into_single(), Some(Candidates::from("1")));
    }

    #[test]
    fn test_output_json() {
        let out = PlaceOutput::Sequence(vec![Candidates::from("ZWE"), Candidates::NotFound]);
        assert_eq!(serde_json::to_string(&out).unwrap(), r#"["ZWE",null]"#);
    }
}
