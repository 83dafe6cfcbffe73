//! CSV loading for concordance tables
//!
//! The first record is the header. Cells are trimmed and empty cells become
//! nulls, so a CSV exported from a spreadsheet loads without preprocessing.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::index::ConcordanceIndex;

impl ConcordanceIndex {
    /// Load and validate a concordance table from a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>, id_column: &str) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open concordance CSV: {}", path.display()))?;
        let index = read_table(reader, id_column)
            .with_context(|| format!("Failed to load concordance CSV: {}", path.display()))?;

        info!(
            path = %path.display(),
            rows = index.len(),
            columns = index.columns().len(),
            "Loaded concordance table"
        );
        Ok(index)
    }

    /// Load and validate a concordance table from any CSV source.
    pub fn from_csv_reader<R: io::Read>(reader: R, id_column: &str) -> Result<Self> {
        read_table(csv::Reader::from_reader(reader), id_column)
    }
}

fn read_table<R: io::Read>(
    mut reader: csv::Reader<R>,
    id_column: &str,
) -> Result<ConcordanceIndex> {
    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read row {}", idx + 1))?;
        rows.push(record.iter().map(cell).collect());
    }

    Ok(ConcordanceIndex::new(headers, rows, id_column)?)
}

fn cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PlaceError, TableError};
    use std::io::Write;

    const TABLE: &str = "\
dcid,name_official,iso3_code,region
country/ZWE,Zimbabwe,ZWE,Africa
country/ITA,Italy,ITA,Europe
country/ATA, Antarctica ,,
";

    #[test]
    fn test_reader_blank_cells_are_null() {
        let index = ConcordanceIndex::from_csv_reader(TABLE.as_bytes(), "dcid").unwrap();
        assert_eq!(index.len(), 3);
        let iso3 = index.column_values("iso3_code").unwrap();
        assert_eq!(iso3, vec![Some("ZWE"), Some("ITA"), None]);
        let names = index.column_values("name_official").unwrap();
        assert_eq!(names[2], Some("Antarctica"));
    }

    #[test]
    fn test_path_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();

        let index = ConcordanceIndex::from_csv_path(file.path(), "dcid").unwrap();
        assert_eq!(index.id_column(), "dcid");
        assert_eq!(
            index.lookup("name_official", "iso3_code").unwrap().get("italy"),
            Some(&"ITA".to_string())
        );
    }

    #[test]
    fn test_missing_file() {
        let err = ConcordanceIndex::from_csv_path("/definitely/not/here.csv", "dcid").unwrap_err();
        assert!(err.to_string().contains("Failed to open concordance CSV"));
    }

    #[test]
    fn test_validation_error_is_preserved() {
        let csv = "dcid,name\nc1,A\nc1,B\n";
        let err = ConcordanceIndex::from_csv_reader(csv.as_bytes(), "dcid").unwrap_err();
        let place_err = err.downcast_ref::<PlaceError>().unwrap();
        assert!(matches!(
            place_err,
            PlaceError::InvalidTable(TableError::DuplicateIds { .. })
        ));
    }
}
