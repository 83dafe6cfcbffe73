//! In-memory concordance index
//!
//! One row per canonical identifier, one column per alternate code or
//! classification attribute. The index is validated once at construction and
//! never mutated afterwards, so it is shared behind an `Arc`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::error::{PlaceError, Result, TableError};
use crate::normalize::normalize_key;

/// Column holding the canonical identifier unless told otherwise.
pub const DEFAULT_ID_COLUMN: &str = "dcid";

/// A validated concordance table.
#[derive(Debug, Clone)]
pub struct ConcordanceIndex {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    id_position: usize,
}

impl ConcordanceIndex {
    /// Build an index from a header and rows of optional cells.
    ///
    /// Fails with [`TableError`] if the id column is missing, the table has
    /// no rows or no other column, or the id column holds nulls or
    /// duplicates.
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Vec<Option<String>>>,
        id_column: &str,
    ) -> Result<Self> {
        let id_position = columns
            .iter()
            .position(|c| c == id_column)
            .ok_or_else(|| TableError::MissingIdColumn(id_column.to_string()))?;

        if rows.is_empty() {
            return Err(TableError::Empty.into());
        }
        if columns.len() < 2 {
            return Err(TableError::TooFewColumns(id_column.to_string()).into());
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TableError::RaggedRow {
                    row: i,
                    found: row.len(),
                    expected: columns.len(),
                }
                .into());
            }
        }

        let null_count = rows.iter().filter(|r| r[id_position].is_none()).count();
        if null_count > 0 {
            return Err(TableError::NullIds {
                column: id_column.to_string(),
                count: null_count,
            }
            .into());
        }

        let mut seen = HashSet::new();
        let mut duplicates: Vec<String> = Vec::new();
        for id in rows.iter().filter_map(|r| r[id_position].as_deref()) {
            if !seen.insert(id) && !duplicates.iter().any(|d| d == id) {
                duplicates.push(id.to_string());
            }
        }
        if !duplicates.is_empty() {
            return Err(TableError::DuplicateIds {
                column: id_column.to_string(),
                duplicates,
            }
            .into());
        }

        Ok(Self {
            columns,
            rows,
            id_position,
        })
    }

    /// Build an index keyed by the default `dcid` column.
    pub fn with_default_id(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self> {
        Self::new(columns, rows, DEFAULT_ID_COLUMN)
    }

    pub fn id_column(&self) -> &str {
        &self.columns[self.id_position]
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn column_position(&self, name: &str) -> Result<usize> {
        self.columns.iter().position(|c| c == name).ok_or_else(|| {
            PlaceError::invalid_attribute(
                name,
                format!(
                    "not a concordance column (available: {})",
                    self.columns.join(", ")
                ),
            )
        })
    }

    /// Every cell of one column, in row order.
    pub fn column_values(&self, name: &str) -> Result<Vec<Option<&str>>> {
        let pos = self.column_position(name)?;
        Ok(self.rows.iter().map(|r| r[pos].as_deref()).collect())
    }

    pub(crate) fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Normalized `from_attr` value -> `to_attr` value.
    ///
    /// Rows where either side is null are skipped. When two rows share a
    /// normalized key the later row wins.
    pub fn lookup(&self, from_attr: &str, to_attr: &str) -> Result<HashMap<String, String>> {
        let from = self.column_position(from_attr)?;
        let to = self.column_position(to_attr)?;

        let mut mapping = HashMap::with_capacity(self.rows.len());
        for row in &self.rows {
            let (Some(key), Some(value)) = (row[from].as_deref(), row[to].as_deref()) else {
                continue;
            };
            let key = normalize_key(key);
            if let Some(previous) = mapping.insert(key.clone(), value.to_string()) {
                debug!(
                    from_attr,
                    to_attr,
                    key = %key,
                    previous = %previous,
                    current = %value,
                    "duplicate normalized key in concordance lookup, keeping last"
                );
            }
        }
        Ok(mapping)
    }

    /// Raw (un-normalized) `from_attr` value -> `to_attr` value.
    ///
    /// Rows with a null `from_attr` are always skipped; rows with a null
    /// `to_attr` are kept as `None` only when `include_nulls` is set.
    pub fn concordance_dict(
        &self,
        from_attr: &str,
        to_attr: &str,
        include_nulls: bool,
    ) -> Result<BTreeMap<String, Option<String>>> {
        let from = self.column_position(from_attr)?;
        let to = self.column_position(to_attr)?;

        Ok(self
            .rows
            .iter()
            .filter_map(|row| {
                let key = row[from].clone()?;
                let value = row[to].clone();
                (include_nulls || value.is_some()).then_some((key, value))
            })
            .collect())
    }
}

impl fmt::Display for ConcordanceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConcordanceIndex {{ rows: {}, columns: {}, id_column: {} }}",
            self.rows.len(),
            self.columns.len(),
            self.id_column()
        )
    }
}
