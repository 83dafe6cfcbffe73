//! In-memory PlaceService
//!
//! Answers from fixed name and property tables. Every call is recorded so
//! callers can assert on batching, and individual names or whole batches can
//! be made to fail.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{PlaceService, ServiceResult};
use crate::error::ServiceError;

/// One recorded call against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    ResolveNames {
        names: Vec<String>,
        entity_type: Option<String>,
    },
    FetchProperties {
        ids: Vec<String>,
        property: String,
    },
}

#[derive(Debug, Default)]
pub struct InMemoryPlaceService {
    names: HashMap<String, Vec<String>>,
    properties: HashMap<(String, String), Vec<String>>,
    failing_names: HashSet<String>,
    batch_failure: Option<ServiceError>,
    calls: Mutex<Vec<ServiceCall>>,
}

impl InMemoryPlaceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates returned for `name`.
    pub fn with_name<I, S>(mut self, name: &str, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names
            .insert(name.to_string(), candidates.into_iter().map(Into::into).collect());
        self
    }

    /// Values of `property` on `id`.
    pub fn with_property<I, S>(mut self, id: &str, property: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.insert(
            (id.to_string(), property.to_string()),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Any name-resolution call containing `name` fails with a 503.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing_names.insert(name.to_string());
        self
    }

    /// Name-resolution calls with more than one name fail with `error`.
    pub fn failing_batches(mut self, error: ServiceError) -> Self {
        self.batch_failure = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.lock_calls().clone()
    }

    /// Batches sent to `resolve_names`, in call order.
    pub fn resolve_batches(&self) -> Vec<Vec<String>> {
        self.lock_calls()
            .iter()
            .filter_map(|c| match c {
                ServiceCall::ResolveNames { names, .. } => Some(names.clone()),
                ServiceCall::FetchProperties { .. } => None,
            })
            .collect()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<ServiceCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PlaceService for InMemoryPlaceService {
    async fn resolve_names(
        &self,
        names: &[String],
        entity_type: Option<&str>,
    ) -> ServiceResult<HashMap<String, Vec<String>>> {
        self.lock_calls().push(ServiceCall::ResolveNames {
            names: names.to_vec(),
            entity_type: entity_type.map(str::to_string),
        });

        if names.len() > 1 {
            if let Some(err) = &self.batch_failure {
                return Err(err.clone());
            }
        }
        if let Some(name) = names.iter().find(|n| self.failing_names.contains(*n)) {
            return Err(ServiceError::Status {
                status: 503,
                body: format!("upstream unavailable for {name}"),
            });
        }

        Ok(names
            .iter()
            .filter_map(|n| self.names.get(n).map(|c| (n.clone(), c.clone())))
            .collect())
    }

    async fn fetch_properties(
        &self,
        ids: &[String],
        property: &str,
    ) -> ServiceResult<HashMap<String, Vec<String>>> {
        self.lock_calls().push(ServiceCall::FetchProperties {
            ids: ids.to_vec(),
            property: property.to_string(),
        });

        Ok(ids
            .iter()
            .map(|id| {
                let values = self
                    .properties
                    .get(&(id.clone(), property.to_string()))
                    .cloned()
                    .unwrap_or_default();
                (id.clone(), values)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls() {
        let service = InMemoryPlaceService::new().with_name("Italy", ["country/ITA"]);
        let result = service
            .resolve_names(&["Italy".to_string(), "Atlantis".to_string()], Some("Country"))
            .await
            .unwrap();

        assert_eq!(result.get("Italy"), Some(&vec!["country/ITA".to_string()]));
        assert!(!result.contains_key("Atlantis"));
        assert_eq!(
            service.calls(),
            vec![ServiceCall::ResolveNames {
                names: vec!["Italy".into(), "Atlantis".into()],
                entity_type: Some("Country".into()),
            }]
        );
    }

    #[tokio::test]
    async fn test_failing_name() {
        let service = InMemoryPlaceService::new().failing_on("Narnia");
        let err = service
            .resolve_names(&["Narnia".to_string()], None)
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_properties_default_empty() {
        let service =
            InMemoryPlaceService::new().with_property("country/ITA", "isoCode", ["ITA"]);
        let result = service
            .fetch_properties(&["country/ITA".into(), "country/XXX".into()], "isoCode")
            .await
            .unwrap();
        assert_eq!(result["country/ITA"], vec!["ITA".to_string()]);
        assert!(result["country/XXX"].is_empty());
    }
}
