//! Shared fixtures for the resolver integration tests
//!
//! A small country concordance table on disk and a knowledge graph stand-in
//! that answers the names the tests use.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use place_resolver::{ConcordanceIndex, InMemoryPlaceService, PlaceResolver};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn concordance_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/concordance.csv")
}

pub fn country_index() -> ConcordanceIndex {
    ConcordanceIndex::from_csv_path(concordance_path(), "dcid").unwrap()
}

/// Names the stand-in knowledge graph knows about.
pub fn knowledge_graph() -> InMemoryPlaceService {
    InMemoryPlaceService::new()
        .with_name("Zimbabwe", ["country/ZWE"])
        .with_name("Italy", ["country/ITA"])
        .with_name("Italia", ["country/ITA"])
        .with_name("Ivory Coast", ["country/CIV"])
        .with_name("Haiti", ["country/HTI"])
        .with_name("Georgia", ["geoId/13", "country/GEO"])
        .with_name("Atlantis", Vec::<String>::new())
        .with_property("country/ZWE", "name", ["Zimbabwe"])
        .with_property("country/ITA", "name", ["Italy"])
        .with_property("country/CIV", "name", ["Côte d'Ivoire"])
        .with_property("geoId/13", "name", ["Georgia"])
        .with_property("country/GEO", "name", ["Georgia"])
        .with_property("geoId/13", "containedInPlace", ["United States"])
        .with_property("country/GEO", "containedInPlace", ["Asia"])
}

pub fn country_resolver(service: Arc<InMemoryPlaceService>) -> PlaceResolver {
    PlaceResolver::countries(service, country_index())
}

pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
