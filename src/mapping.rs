//! Attribute mapping
//!
//! Turns canonical identifiers into the attribute a caller asked for. Known
//! concordance columns are answered locally; anything else is treated as a
//! property of the external knowledge graph and fetched in one call.

use tracing::{debug, info};

use crate::candidates::{Candidates, ResolutionMap};
use crate::concordance::{ConcordanceIndex, DEFAULT_ID_COLUMN};
use crate::error::Result;
use crate::normalize::normalize_key;
use crate::service::PlaceService;

pub struct AttributeMapper<'a> {
    index: Option<&'a ConcordanceIndex>,
    service: &'a dyn PlaceService,
}

impl<'a> AttributeMapper<'a> {
    pub fn new(index: Option<&'a ConcordanceIndex>, service: &'a dyn PlaceService) -> Self {
        Self { index, service }
    }

    /// Attribute holding canonical identifiers.
    pub fn canonical_attr(&self) -> &str {
        self.index.map_or(DEFAULT_ID_COLUMN, |i| i.id_column())
    }

    /// Whether `attr` can be answered from the concordance index.
    pub fn is_column(&self, attr: &str) -> bool {
        self.index.is_some_and(|i| i.has_column(attr))
    }

    /// Map candidate identifiers to `target_attr`.
    pub async fn map_candidates(
        &self,
        candidates: ResolutionMap,
        target_attr: &str,
    ) -> Result<ResolutionMap> {
        if target_attr == self.canonical_attr() {
            return Ok(candidates);
        }

        match self.index {
            Some(index) if index.has_column(target_attr) => {
                debug!(target_attr, "mapping candidates through concordance");
                let lookup = index.lookup(index.id_column(), target_attr)?;
                Ok(candidates
                    .into_iter()
                    .map(|(place, cands)| {
                        let mapped = Candidates::collapse(
                            cands
                                .values()
                                .iter()
                                .filter_map(|id| lookup.get(&normalize_key(id)).cloned()),
                        );
                        (place, mapped)
                    })
                    .collect())
            }
            _ => self.fetch_property(candidates, target_attr).await,
        }
    }

    /// Map references already expressed in concordance column `from_attr`
    /// to `to_attr`, without disambiguation.
    ///
    /// When `to_attr` is not a column the references are first mapped to
    /// their canonical identifiers and the property is fetched externally.
    /// Without an index the references are taken to be canonical identifiers.
    pub async fn map_references(
        &self,
        refs: &[String],
        from_attr: &str,
        to_attr: &str,
    ) -> Result<ResolutionMap> {
        let Some(index) = self.index else {
            let ids = refs.iter().map(|r| (r.clone(), Candidates::from(r.as_str())));
            return self.fetch_property(ids.collect(), to_attr).await;
        };

        if index.has_column(to_attr) {
            debug!(from_attr, to_attr, "mapping references through concordance");
            let lookup = index.lookup(from_attr, to_attr)?;
            return Ok(refs
                .iter()
                .map(|r| (r.clone(), lookup.get(&normalize_key(r)).cloned().into()))
                .collect());
        }

        let lookup = index.lookup(from_attr, index.id_column())?;
        let from_canonical = from_attr == index.id_column();
        let ids: ResolutionMap = refs
            .iter()
            .map(|r| {
                let id = lookup
                    .get(&normalize_key(r))
                    .cloned()
                    .or_else(|| from_canonical.then(|| r.clone()));
                (r.clone(), id.into())
            })
            .collect();

        self.fetch_property(ids, to_attr).await
    }

    async fn fetch_property(
        &self,
        candidates: ResolutionMap,
        property: &str,
    ) -> Result<ResolutionMap> {
        let mut ids: Vec<String> = Vec::new();
        for id in candidates.values().flat_map(Candidates::values) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }

        if ids.is_empty() {
            debug!(property, "no identifiers to fetch, skipping property call");
            return Ok(candidates
                .into_keys()
                .map(|place| (place, Candidates::NotFound))
                .collect());
        }

        info!(property, ids = ids.len(), "Mapping to property using place service");
        let values = self.service.fetch_properties(&ids, property).await?;

        Ok(candidates
            .into_iter()
            .map(|(place, cands)| {
                let mapped = Candidates::collapse(
                    cands
                        .values()
                        .iter()
                        .filter_map(|id| values.get(id))
                        .flatten()
                        .cloned(),
                );
                (place, mapped)
            })
            .collect())
    }
}
