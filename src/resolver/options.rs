use std::collections::HashMap;

use crate::conflict::{MultiplePolicy, NotFoundPolicy};
use crate::error::{PlaceError, Result};

/// Per-call settings for [`super::PlaceResolver::resolve`].
///
/// Defaults: disambiguate free text, return canonical identifiers, raise on
/// both not-found and ambiguous references, no overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Concordance column the references are already expressed in.
    pub from_attr: Option<String>,
    /// Target attribute; `None` means the canonical identifier.
    pub to_attr: Option<String>,
    pub not_found: NotFoundPolicy,
    pub multiple: MultiplePolicy,
    /// Reference -> final value, bypassing the pipeline.
    pub overrides: HashMap<String, String>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for options targeting `attr`.
    pub fn to(attr: impl Into<String>) -> Self {
        Self::new().to_attr(attr)
    }

    pub fn from_attr(mut self, attr: impl Into<String>) -> Self {
        self.from_attr = Some(attr.into());
        self
    }

    pub fn to_attr(mut self, attr: impl Into<String>) -> Self {
        self.to_attr = Some(attr.into());
        self
    }

    pub fn not_found(mut self, policy: impl Into<NotFoundPolicy>) -> Self {
        self.not_found = policy.into();
        self
    }

    pub fn multiple(mut self, policy: MultiplePolicy) -> Self {
        self.multiple = policy;
        self
    }

    pub fn with_override(mut self, place: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(place.into(), value.into());
        self
    }

    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides.extend(overrides);
        self
    }
}

/// Attribute names must be non-empty and free of whitespace and control
/// characters before anything is sent to the service.
pub(crate) fn validate_attribute(attr: &str) -> Result<()> {
    if attr.is_empty() {
        return Err(PlaceError::invalid_attribute(attr, "attribute name is empty"));
    }
    if attr.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(PlaceError::invalid_attribute(
            attr,
            "attribute name contains whitespace or control characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = ResolveOptions::to("iso3_code")
            .from_attr("name_official")
            .not_found("ignore")
            .multiple(MultiplePolicy::First)
            .with_override("Zimbabwe", "ZIM");

        assert_eq!(options.from_attr.as_deref(), Some("name_official"));
        assert_eq!(options.to_attr.as_deref(), Some("iso3_code"));
        assert_eq!(options.not_found, NotFoundPolicy::Ignore);
        assert_eq!(options.multiple, MultiplePolicy::First);
        assert_eq!(options.overrides["Zimbabwe"], "ZIM");
    }

    #[test]
    fn test_defaults_raise() {
        let options = ResolveOptions::new();
        assert_eq!(options.not_found, NotFoundPolicy::Raise);
        assert_eq!(options.multiple, MultiplePolicy::Raise);
        assert!(options.to_attr.is_none());
    }

    #[test]
    fn test_validate_attribute() {
        assert!(validate_attribute("iso3_code").is_ok());
        assert!(validate_attribute("containedInPlace").is_ok());
        assert!(matches!(
            validate_attribute(""),
            Err(PlaceError::InvalidAttribute { .. })
        ));
        assert!(matches!(
            validate_attribute("iso3 code"),
            Err(PlaceError::InvalidAttribute { .. })
        ));
    }
}
