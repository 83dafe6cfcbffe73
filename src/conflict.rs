//! Not-found and multiple-candidate policies
//!
//! Both passes take a resolution map by value and return a new one. The
//! pipeline always applies the not-found pass first, so an absent value never
//! reaches the multiple-candidate check.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use tracing::{info, warn};

use crate::candidates::{Candidates, ResolutionMap};
use crate::error::{PlaceError, Result};

/// What to do with a reference that resolved to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NotFoundPolicy {
    #[default]
    Raise,
    Ignore,
    /// Use this literal value instead.
    Substitute(String),
}

/// What to do with a reference that resolved to several values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiplePolicy {
    #[default]
    Raise,
    First,
    Last,
    Ignore,
}

impl FromStr for NotFoundPolicy {
    type Err = Infallible;

    /// `raise` and `ignore` are keywords; any other string is a substitute.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "raise" => Self::Raise,
            "ignore" => Self::Ignore,
            other => Self::Substitute(other.to_string()),
        })
    }
}

impl From<&str> for NotFoundPolicy {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(policy) => policy,
            Err(never) => match never {},
        }
    }
}

impl FromStr for MultiplePolicy {
    type Err = PlaceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raise" => Ok(Self::Raise),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "ignore" => Ok(Self::Ignore),
            other => Err(PlaceError::InvalidInput(format!(
                "invalid multiple-candidates policy '{other}': \
                 must be one of raise, first, last, ignore"
            ))),
        }
    }
}

impl fmt::Display for NotFoundPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raise => f.write_str("raise"),
            Self::Ignore => f.write_str("ignore"),
            Self::Substitute(v) => write!(f, "substitute({v})"),
        }
    }
}

impl fmt::Display for MultiplePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Raise => "raise",
            Self::First => "first",
            Self::Last => "last",
            Self::Ignore => "ignore",
        })
    }
}

/// Apply `policy` to every [`Candidates::NotFound`] entry.
pub fn apply_not_found(
    map: ResolutionMap,
    policy: &NotFoundPolicy,
    target: &str,
) -> Result<ResolutionMap> {
    map.into_iter()
        .map(|(place, value)| {
            if !value.is_not_found() {
                return Ok((place, value));
            }
            match policy {
                NotFoundPolicy::Raise => Err(PlaceError::PlaceNotFound {
                    place,
                    target: target.to_string(),
                }),
                NotFoundPolicy::Ignore => {
                    warn!(place = %place, target, "Place not found");
                    Ok((place, Candidates::NotFound))
                }
                NotFoundPolicy::Substitute(substitute) => {
                    Ok((place, Candidates::Single(substitute.clone())))
                }
            }
        })
        .collect()
}

/// Apply `policy` to every [`Candidates::Multiple`] entry.
pub fn apply_multiple(
    map: ResolutionMap,
    policy: MultiplePolicy,
    target: &str,
) -> Result<ResolutionMap> {
    map.into_iter()
        .map(|(place, value)| {
            let Candidates::Multiple(candidates) = value else {
                return Ok((place, value));
            };
            let chosen = match policy {
                MultiplePolicy::Raise => {
                    return Err(PlaceError::MultipleCandidates {
                        place,
                        target: target.to_string(),
                        candidates,
                    })
                }
                MultiplePolicy::Ignore => {
                    warn!(place = %place, ?candidates, "Multiple candidates found, keeping all");
                    return Ok((place, Candidates::Multiple(candidates)));
                }
                MultiplePolicy::First => candidates.first(),
                MultiplePolicy::Last => candidates.last(),
            };
            let chosen = Candidates::from(chosen.cloned());
            info!(place = %place, ?chosen, %policy, "Multiple candidates found, picked one");
            Ok((place, chosen))
        })
        .collect()
}

/// Not-found pass, then multiple-candidate pass.
pub fn resolve_conflicts(
    map: ResolutionMap,
    not_found: &NotFoundPolicy,
    multiple: MultiplePolicy,
    target: &str,
) -> Result<ResolutionMap> {
    let map = apply_not_found(map, not_found, target)?;
    apply_multiple(map, multiple, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c123() -> Candidates {
        Candidates::Multiple(vec!["c1".into(), "c2".into(), "c3".into()])
    }

    fn sample() -> ResolutionMap {
        ResolutionMap::from([
            ("Atlantis".to_string(), Candidates::NotFound),
            ("Georgia".to_string(), c123()),
            ("Italy".to_string(), Candidates::from("ITA")),
        ])
    }

    #[test]
    fn test_parse_not_found() {
        assert_eq!(NotFoundPolicy::from("raise"), NotFoundPolicy::Raise);
        assert_eq!(NotFoundPolicy::from("ignore"), NotFoundPolicy::Ignore);
        assert_eq!(
            NotFoundPolicy::from("not found"),
            NotFoundPolicy::Substitute("not found".into())
        );
    }

    #[test]
    fn test_parse_multiple() {
        assert_eq!("first".parse::<MultiplePolicy>().unwrap(), MultiplePolicy::First);
        assert_eq!("last".parse::<MultiplePolicy>().unwrap(), MultiplePolicy::Last);
        assert!(matches!(
            "random".parse::<MultiplePolicy>(),
            Err(PlaceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_not_found_raise_names_place() {
        let err = apply_not_found(sample(), &NotFoundPolicy::Raise, "iso3").unwrap_err();
        match err {
            PlaceError::PlaceNotFound { place, target } => {
                assert_eq!(place, "Atlantis");
                assert_eq!(target, "iso3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_not_found_ignore_and_substitute() {
        let ignored = apply_not_found(sample(), &NotFoundPolicy::Ignore, "iso3").unwrap();
        assert_eq!(ignored["Atlantis"], Candidates::NotFound);

        let substituted =
            apply_not_found(sample(), &NotFoundPolicy::Substitute("X".into()), "iso3").unwrap();
        assert_eq!(substituted["Atlantis"], Candidates::from("X"));
        assert_eq!(substituted["Georgia"], c123());
        assert_eq!(substituted["Italy"], Candidates::from("ITA"));
    }

    #[test]
    fn test_multiple_policies() {
        let map = ResolutionMap::from([("Georgia".to_string(), c123())]);

        let first = apply_multiple(map.clone(), MultiplePolicy::First, "dcid").unwrap();
        assert_eq!(first["Georgia"], Candidates::from("c1"));

        let last = apply_multiple(map.clone(), MultiplePolicy::Last, "dcid").unwrap();
        assert_eq!(last["Georgia"], Candidates::from("c3"));

        let ignored = apply_multiple(map.clone(), MultiplePolicy::Ignore, "dcid").unwrap();
        assert_eq!(ignored["Georgia"], c123());

        let err = apply_multiple(map, MultiplePolicy::Raise, "dcid").unwrap_err();
        match err {
            PlaceError::MultipleCandidates { place, candidates, .. } => {
                assert_eq!(place, "Georgia");
                assert_eq!(candidates, vec!["c1", "c2", "c3"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_not_found_runs_before_multiple() {
        // raising on ambiguity must not trip over an absent value
        let map = ResolutionMap::from([("Atlantis".to_string(), Candidates::NotFound)]);
        let result =
            resolve_conflicts(map, &NotFoundPolicy::Ignore, MultiplePolicy::Raise, "iso3").unwrap();
        assert_eq!(result["Atlantis"], Candidates::NotFound);
    }

    #[test]
    fn test_substitute_is_not_ambiguous() {
        let result = resolve_conflicts(
            sample(),
            &NotFoundPolicy::Substitute("unknown".into()),
            MultiplePolicy::First,
            "iso3",
        )
        .unwrap();
        assert_eq!(result["Atlantis"], Candidates::from("unknown"));
        assert_eq!(result["Georgia"], Candidates::from("c1"));
    }
}
