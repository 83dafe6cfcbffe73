//! Named groupings over the concordance index
//!
//! Projections such as "every African country as ISO3" or "UN members by
//! name". Results follow row order and skip rows whose requested format is
//! null.

use std::collections::BTreeMap;

use tracing::warn;

use super::index::ConcordanceIndex;
use crate::error::{PlaceError, Result};

/// Cell values treated as a set flag in boolean membership columns.
const TRUTHY: &[&str] = &["true", "1", "yes", "y", "t"];

fn is_truthy(cell: &str) -> bool {
    TRUTHY.iter().any(|t| cell.eq_ignore_ascii_case(t))
}

impl ConcordanceIndex {
    /// `place_format` values of the rows whose `category` is one of `values`.
    ///
    /// Every filter value must occur in the category column, otherwise the
    /// call fails with [`PlaceError::InvalidInput`].
    pub fn places_by<S: AsRef<str>>(
        &self,
        category: &str,
        values: &[S],
        place_format: &str,
        raise_if_empty: bool,
    ) -> Result<Vec<String>> {
        let filters = BTreeMap::from([(
            category.to_string(),
            values.iter().map(|v| v.as_ref().to_string()).collect(),
        )]);
        self.places_by_multiple(&filters, place_format, raise_if_empty)
    }

    /// Like [`places_by`](Self::places_by) with several categories; a row
    /// must match every category.
    pub fn places_by_multiple(
        &self,
        filters: &BTreeMap<String, Vec<String>>,
        place_format: &str,
        raise_if_empty: bool,
    ) -> Result<Vec<String>> {
        if filters.is_empty() {
            return Err(PlaceError::InvalidInput(
                "at least one filter category is required".to_string(),
            ));
        }

        let target = self.column_position(place_format)?;
        let mut checks = Vec::with_capacity(filters.len());
        for (category, values) in filters {
            self.validate_filter_values(category, values)?;
            checks.push((self.column_position(category)?, values));
        }

        let result: Vec<String> = self
            .rows()
            .iter()
            .filter(|row| {
                checks.iter().all(|(pos, values)| {
                    row[*pos]
                        .as_deref()
                        .is_some_and(|cell| values.iter().any(|v| v == cell))
                })
            })
            .filter_map(|row| row[target].clone())
            .collect();

        if result.is_empty() {
            let description = filters
                .iter()
                .map(|(c, v)| format!("{c} in [{}]", v.join(", ")))
                .collect::<Vec<_>>()
                .join(" and ");
            empty_result(format!("No places found for {description}"), raise_if_empty)?;
        }
        Ok(result)
    }

    /// `place_format` values of the rows whose boolean `flag_column` is set.
    pub fn flagged(
        &self,
        flag_column: &str,
        place_format: &str,
        raise_if_empty: bool,
    ) -> Result<Vec<String>> {
        let flag = self.column_position(flag_column)?;
        let target = self.column_position(place_format)?;

        let result: Vec<String> = self
            .rows()
            .iter()
            .filter(|row| row[flag].as_deref().is_some_and(is_truthy))
            .filter_map(|row| row[target].clone())
            .collect();

        if result.is_empty() {
            empty_result(
                format!("No places found for boolean field '{flag_column}'"),
                raise_if_empty,
            )?;
        }
        Ok(result)
    }

    fn validate_filter_values(&self, category: &str, values: &[String]) -> Result<()> {
        if values.is_empty() {
            return Err(PlaceError::InvalidInput(format!(
                "no filter values given for '{category}'"
            )));
        }
        let present = self.column_values(category)?;
        let missing: Vec<&str> = values
            .iter()
            .map(String::as_str)
            .filter(|v| !present.contains(&Some(*v)))
            .collect();
        if !missing.is_empty() {
            return Err(PlaceError::InvalidInput(format!(
                "invalid filter value(s) for '{category}': {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

fn empty_result(message: String, raise_if_empty: bool) -> Result<()> {
    if raise_if_empty {
        return Err(PlaceError::InvalidInput(message));
    }
    warn!("{message}");
    Ok(())
}
