//! Place resolution pipeline
//!
//! `PlaceResolver` ties the pieces together for one request:
//!
//! 1. flatten the input to a deduplicated work list
//! 2. drop references covered by caller overrides (short-circuit if none remain)
//! 3. disambiguate and map, or map straight from a known concordance column
//! 4. apply the not-found and multiple-candidate policies
//! 5. merge overrides, which always win
//! 6. restore the caller's input shape
//!
//! The resolver holds no per-call state. It can be shared across tasks and
//! called concurrently as long as the underlying service allows it.

mod options;
pub mod shape;

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::candidates::{Candidates, ResolutionMap};
use crate::concordance::{ConcordanceIndex, DEFAULT_ID_COLUMN};
use crate::conflict::resolve_conflicts;
use crate::disambiguation::{Disambiguator, OverrideRules};
use crate::error::{PlaceError, Result};
use crate::mapping::AttributeMapper;
use crate::service::PlaceService;

pub use options::ResolveOptions;
pub use shape::{PlaceInput, PlaceOutput};

use options::validate_attribute;

pub struct PlaceResolver {
    index: Option<Arc<ConcordanceIndex>>,
    service: Arc<dyn PlaceService>,
    disambiguator: Disambiguator,
}

impl PlaceResolver {
    /// A resolver backed only by the external service.
    pub fn new(service: Arc<dyn PlaceService>) -> Self {
        Self {
            index: None,
            disambiguator: Disambiguator::new(service.clone()),
            service,
        }
    }

    /// Resolver for countries: built-in country override rules and the
    /// `Country` entity type.
    pub fn countries(
        service: Arc<dyn PlaceService>,
        index: impl Into<Arc<ConcordanceIndex>>,
    ) -> Self {
        Self::new(service)
            .with_concordance(index)
            .with_overrides(OverrideRules::countries())
            .with_entity_type("Country")
    }

    /// Resolver whose concordance table is loaded from a CSV file.
    pub fn from_concordance_csv(
        service: Arc<dyn PlaceService>,
        path: impl AsRef<Path>,
        id_column: &str,
    ) -> anyhow::Result<Self> {
        let index = ConcordanceIndex::from_csv_path(path, id_column)?;
        Ok(Self::new(service).with_concordance(index))
    }

    pub fn with_concordance(mut self, index: impl Into<Arc<ConcordanceIndex>>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn with_overrides(mut self, rules: OverrideRules) -> Self {
        self.disambiguator = self.disambiguator.with_rules(rules);
        self
    }

    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.disambiguator = self.disambiguator.with_entity_type(entity_type);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.disambiguator = self.disambiguator.with_batch_size(batch_size);
        self
    }

    /// Add disambiguation rules after construction; later rules replace
    /// earlier ones for the same normalized reference.
    pub fn add_override_rules<I, K, V>(&mut self, rules: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.disambiguator.rules_mut().extend(rules);
        self
    }

    pub fn override_rules(&self) -> &OverrideRules {
        self.disambiguator.rules()
    }

    /// The concordance index, if one was configured.
    pub fn concordance(&self) -> Result<&ConcordanceIndex> {
        self.index.as_deref().ok_or_else(|| {
            PlaceError::InvalidInput(
                "no concordance table is defined for this resolver".to_string(),
            )
        })
    }

    /// Raw `from_attr` -> `to_attr` pairs from the concordance table.
    pub fn concordance_dict(
        &self,
        from_attr: &str,
        to_attr: &str,
        include_nulls: bool,
    ) -> Result<BTreeMap<String, Option<String>>> {
        if from_attr == to_attr {
            debug!(from_attr, "from and to attributes match, returning identity mapping");
        }
        self.concordance()?
            .concordance_dict(from_attr, to_attr, include_nulls)
    }

    /// Attribute holding canonical identifiers.
    pub fn canonical_attr(&self) -> &str {
        self.index.as_deref().map_or(DEFAULT_ID_COLUMN, |i| i.id_column())
    }

    fn mapper(&self) -> AttributeMapper<'_> {
        AttributeMapper::new(self.index.as_deref(), self.service.as_ref())
    }

    /// Resolve places, returning values in the same shape as the input.
    pub async fn resolve(
        &self,
        places: impl Into<PlaceInput>,
        options: &ResolveOptions,
    ) -> Result<PlaceOutput> {
        let input = places.into();
        let map = self.resolve_input(&input, options).await?;
        Ok(input.reshape(&map))
    }

    /// Resolve places, returning a reference -> value mapping.
    pub async fn resolve_map(
        &self,
        places: impl Into<PlaceInput>,
        options: &ResolveOptions,
    ) -> Result<ResolutionMap> {
        let input = places.into();
        self.resolve_input(&input, options).await
    }

    /// Disambiguate and map without applying any conflict policy.
    pub async fn candidates(
        &self,
        places: impl Into<PlaceInput>,
        to_attr: Option<&str>,
    ) -> Result<ResolutionMap> {
        let to_attr = to_attr.unwrap_or(self.canonical_attr());
        validate_attribute(to_attr)?;

        let work = places.into().unique();
        let candidates = self.disambiguator.resolve_batch(&work).await?;
        self.mapper().map_candidates(candidates, to_attr).await
    }

    /// Keep the places whose `category` value is one of `values`.
    ///
    /// Order and repeats of the input are preserved; null rows are dropped.
    pub async fn filter<S: AsRef<str>>(
        &self,
        places: impl Into<PlaceInput>,
        category: &str,
        values: &[S],
        options: &ResolveOptions,
    ) -> Result<Vec<String>> {
        if values.is_empty() {
            return Err(PlaceError::InvalidInput("no filter values given".to_string()));
        }

        let input = places.into();
        let options = options.clone().to_attr(category);
        let map = self.resolve_input(&input, &options).await?;

        let wanted: HashSet<&str> = values.iter().map(|v| v.as_ref()).collect();
        let matching: HashSet<&str> = map
            .iter()
            .filter(|(_, value)| value.values().iter().any(|v| wanted.contains(v.as_str())))
            .map(|(place, _)| place.as_str())
            .collect();

        Ok(input
            .iter()
            .flatten()
            .filter(|p| matching.contains(p))
            .map(str::to_string)
            .collect())
    }

    async fn resolve_input(
        &self,
        input: &PlaceInput,
        options: &ResolveOptions,
    ) -> Result<ResolutionMap> {
        let to_attr = options
            .to_attr
            .as_deref()
            .unwrap_or(self.canonical_attr());
        validate_attribute(to_attr)?;
        if let Some(from_attr) = options.from_attr.as_deref() {
            validate_attribute(from_attr)?;
        }

        let places = input.unique();
        let overrides = &options.overrides;
        let work: Vec<String> = places
            .iter()
            .filter(|p| !overrides.contains_key(*p))
            .cloned()
            .collect();

        if work.is_empty() {
            debug!(places = places.len(), "every place covered by overrides");
            return Ok(apply_overrides(ResolutionMap::new(), &places, options));
        }

        let mapper = self.mapper();
        let resolved = match options.from_attr.as_deref() {
            Some(from_attr) if mapper.is_column(from_attr) => {
                info!(
                    places = work.len(),
                    from_attr, to_attr, "resolving from concordance column"
                );
                mapper.map_references(&work, from_attr, to_attr).await?
            }
            from_attr => {
                info!(
                    places = work.len(),
                    from_attr, to_attr, "resolving by disambiguation"
                );
                let candidates = self.disambiguator.resolve_batch(&work).await?;
                mapper.map_candidates(candidates, to_attr).await?
            }
        };

        let resolved = resolve_conflicts(resolved, &options.not_found, options.multiple, to_attr)?;
        Ok(apply_overrides(resolved, &places, options))
    }
}

/// Merge overrides for the requested places; overrides win.
fn apply_overrides(
    mut resolved: ResolutionMap,
    places: &[String],
    options: &ResolveOptions,
) -> ResolutionMap {
    for place in places {
        if let Some(value) = options.overrides.get(place) {
            resolved.insert(place.clone(), Candidates::from(value.as_str()));
        }
    }
    resolved
}
