//! Static disambiguation rules
//!
//! Known-problematic references mapped straight to a canonical identifier.
//! Keys are stored normalized, so a rule for "Cabo Verde" also catches
//! "CABO-VERDE" and "cabo verde".

use std::collections::HashMap;

use crate::normalize::normalize_key;

/// Country references the knowledge graph resolves badly or ambiguously.
const COUNTRY_RULES: &[(&str, &str)] = &[
    ("congo", "country/COG"),
    ("france", "country/FRA"),
    ("caboverde", "country/CPV"),
    ("antarctica", "antarctica"),
    ("alandislands", "nuts/FI2"),
    ("aland", "nuts/FI2"),
    ("pitcairn", "country/PCN"),
    ("svalbardandjanmayenislands", "country/SJM"),
    ("svalbardjanmayenislands", "country/SJM"),
    ("svalbardandjanmayenis", "country/SJM"),
    ("svalbardjanmayenis", "country/SJM"),
    ("palestine", "country/PSE"),
    ("saintmartin", "country/MAF"),
    ("southgeorgiaandsouthsandwichis", "country/SGS"),
    ("southgeorgiasouthsandwichis", "country/SGS"),
    ("sthelena", "country/SHN"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideRules {
    rules: HashMap<String, String>,
}

impl OverrideRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in rules for country names.
    pub fn countries() -> Self {
        COUNTRY_RULES.iter().copied().collect()
    }

    /// Add or replace a rule. The reference is normalized first.
    pub fn insert(&mut self, reference: &str, id: impl Into<String>) {
        self.rules.insert(normalize_key(reference), id.into());
    }

    /// Canonical identifier for `reference`, if a rule covers it.
    pub fn get(&self, reference: &str) -> Option<&str> {
        self.rules.get(&normalize_key(reference)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> Extend<(K, V)> for OverrideRules {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (reference, id) in iter {
            self.insert(reference.as_ref(), id);
        }
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for OverrideRules {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut rules = Self::new();
        rules.extend(iter);
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_rules() {
        let rules = OverrideRules::countries();
        assert_eq!(rules.len(), COUNTRY_RULES.len());
        assert_eq!(rules.get("Congo"), Some("country/COG"));
        assert_eq!(rules.get("Cabo Verde"), Some("country/CPV"));
        assert_eq!(rules.get("Åland Islands"), Some("nuts/FI2"));
        assert_eq!(rules.get("St. Helena"), Some("country/SHN"));
        assert_eq!(rules.get("Svalbard & Jan Mayen Is."), Some("country/SJM"));
        assert_eq!(rules.get("Italy"), None);
    }

    #[test]
    fn test_insert_normalizes() {
        let mut rules = OverrideRules::new();
        rules.insert("Côte d'Ivoire", "country/CIV");
        assert_eq!(rules.get("COTE DIVOIRE"), Some("country/CIV"));
    }

    #[test]
    fn test_extend_replaces() {
        let mut rules = OverrideRules::countries();
        rules.extend([("France", "custom/FRA"), ("Kosovo", "country/XKX")]);
        assert_eq!(rules.get("france"), Some("custom/FRA"));
        assert_eq!(rules.get("Kosovo"), Some("country/XKX"));
    }
}
