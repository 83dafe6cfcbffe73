//! Error types for place resolution
//!
//! `PlaceError` is what callers of the resolver see. Concordance validation
//! failures and external service failures have their own enums so the
//! disambiguator can tell a transient outage apart from a broken response.

use thiserror::Error;

/// Result alias used across the resolution pipeline.
pub type Result<T> = std::result::Result<T, PlaceError>;

#[derive(Debug, Error)]
pub enum PlaceError {
    #[error("invalid attribute '{attribute}': {reason}")]
    InvalidAttribute { attribute: String, reason: String },

    #[error("invalid concordance table: {0}")]
    InvalidTable(#[from] TableError),

    #[error("place not found: '{place}' could not be resolved to {target}")]
    PlaceNotFound { place: String, target: String },

    #[error("multiple candidates for '{place}' ({target}): {}", .candidates.join(", "))]
    MultipleCandidates {
        place: String,
        target: String,
        candidates: Vec<String>,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("place service error: {0}")]
    Service(#[from] ServiceError),
}

impl PlaceError {
    pub fn invalid_attribute(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}

/// Concordance table invariant violations, raised while building the index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("id column '{0}' not found in table")]
    MissingIdColumn(String),

    #[error("table has no rows")]
    Empty,

    #[error("table must have at least one column besides '{0}'")]
    TooFewColumns(String),

    #[error("id column '{column}' has {count} null value(s)")]
    NullIds { column: String, count: usize },

    #[error("id column '{column}' has duplicate value(s): {}", .duplicates.join(", "))]
    DuplicateIds {
        column: String,
        duplicates: Vec<String>,
    },

    #[error("row {row} has {found} cell(s), expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Failures reported by a [`crate::service::PlaceService`] implementation.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("failed to decode service response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Transient failures are worth retrying one reference at a time. Only a
    /// response that arrived but could not be decoded is not.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Decode(_))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
            Self::Unavailable(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_candidates_lists_every_candidate() {
        let err = PlaceError::MultipleCandidates {
            place: "Georgia".into(),
            target: "dcid".into(),
            candidates: vec!["geoId/13".into(), "country/GEO".into()],
        };
        assert_eq!(
            err.to_string(),
            "multiple candidates for 'Georgia' (dcid): geoId/13, country/GEO"
        );
    }

    #[test]
    fn table_error_converts_into_place_error() {
        let err: PlaceError = TableError::Empty.into();
        assert!(matches!(err, PlaceError::InvalidTable(TableError::Empty)));
        assert_eq!(err.to_string(), "invalid concordance table: table has no rows");
    }

    #[test]
    fn transient_classification() {
        assert!(ServiceError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(ServiceError::Unavailable("timed out".into()).is_transient());
        assert!(!ServiceError::Decode("eof".into()).is_transient());
        assert!(ServiceError::Transport("connection reset".into()).is_transient());
    }
}
