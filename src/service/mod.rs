//! PlaceService trait: the boundary to the external knowledge graph
//!
//! The resolver only needs two batch operations from the outside world:
//! name -> candidate identifiers, and identifier -> property values.
//! `DataCommonsClient` talks to the Data Commons REST API;
//! `InMemoryPlaceService` answers from fixed tables for offline use and tests.

pub mod datacommons;
pub mod memory;
mod types;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ServiceError;

pub use datacommons::{DataCommonsClient, DataCommonsSettings};
pub use memory::InMemoryPlaceService;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait PlaceService: Send + Sync {
    /// Candidate identifiers for each name, optionally restricted to an entity
    /// type such as `Country`. Unmatched names map to an empty list or are
    /// left out.
    async fn resolve_names(
        &self,
        names: &[String],
        entity_type: Option<&str>,
    ) -> ServiceResult<HashMap<String, Vec<String>>>;

    /// Values of `property` for each identifier. Identifiers lacking the
    /// property map to an empty list or are left out.
    async fn fetch_properties(
        &self,
        ids: &[String],
        property: &str,
    ) -> ServiceResult<HashMap<String, Vec<String>>>;
}
