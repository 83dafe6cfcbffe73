//! Batch disambiguation of place references
//!
//! Override rules are consulted first; everything else goes to the
//! [`PlaceService`] in chunks. A chunk that fails with a transient error is
//! retried one reference at a time so a single bad name cannot sink the
//! whole batch.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::overrides::OverrideRules;
use crate::candidates::{Candidates, ResolutionMap};
use crate::error::Result;
use crate::service::PlaceService;

/// Chunk size used for name resolution unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 30;

pub struct Disambiguator {
    service: Arc<dyn PlaceService>,
    rules: OverrideRules,
    entity_type: Option<String>,
    batch_size: usize,
}

impl Disambiguator {
    pub fn new(service: Arc<dyn PlaceService>) -> Self {
        Self {
            service,
            rules: OverrideRules::new(),
            entity_type: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_rules(mut self, rules: OverrideRules) -> Self {
        self.rules = rules;
        self
    }

    /// Restrict candidates to one knowledge-graph type, e.g. `Country`.
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// `0` sends every pending reference in a single call.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn rules(&self) -> &OverrideRules {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut OverrideRules {
        &mut self.rules
    }

    pub fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Resolve every reference to its candidate identifiers.
    ///
    /// References the service does not know come back as
    /// [`Candidates::NotFound`]; only non-transient service failures are
    /// returned as errors.
    pub async fn resolve_batch(&self, refs: &[String]) -> Result<ResolutionMap> {
        let mut resolved = ResolutionMap::new();
        let mut pending: Vec<String> = Vec::new();

        for reference in refs {
            match self.rules.get(reference) {
                Some(id) => {
                    debug!(place = %reference, id, "resolved by override rule");
                    resolved.insert(reference.clone(), Candidates::from(id));
                }
                None => pending.push(reference.clone()),
            }
        }

        if pending.is_empty() {
            return Ok(resolved);
        }

        let chunk_size = if self.batch_size == 0 {
            pending.len()
        } else {
            self.batch_size
        };

        for chunk in pending.chunks(chunk_size) {
            let mut found = self.resolve_chunk(chunk).await?;
            for reference in chunk {
                let candidates = found
                    .remove(reference)
                    .map(Candidates::collapse)
                    .unwrap_or_default();
                resolved.insert(reference.clone(), candidates);
            }
        }

        Ok(resolved)
    }

    async fn resolve_chunk(&self, chunk: &[String]) -> Result<HashMap<String, Vec<String>>> {
        let entity_type = self.entity_type.as_deref();
        debug!(size = chunk.len(), entity_type, "resolving name chunk");

        match self.service.resolve_names(chunk, entity_type).await {
            Ok(found) => Ok(found),
            Err(err) if err.is_transient() => {
                warn!(
                    error = %err,
                    size = chunk.len(),
                    "name resolution failed for chunk, retrying one place at a time"
                );
                let mut found = HashMap::new();
                for reference in chunk {
                    match self
                        .service
                        .resolve_names(std::slice::from_ref(reference), entity_type)
                        .await
                    {
                        Ok(single) => found.extend(single),
                        Err(err) => warn!(
                            place = %reference,
                            error = %err,
                            "could not resolve place, treating as not found"
                        ),
                    }
                }
                Ok(found)
            }
            Err(err) => Err(err.into()),
        }
    }
}
