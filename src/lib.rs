//! Place reference resolution
//!
//! Resolves informal place references ("Côte d'Ivoire", "CIV", "Ivory
//! Coast") to a canonical identifier and on to any attribute of a
//! concordance table (ISO codes, region, income level) or of an external
//! knowledge graph.
//!
//! ```no_run
//! use std::sync::Arc;
//! use place_resolver::{
//!     ConcordanceIndex, DataCommonsClient, NotFoundPolicy, PlaceResolver, ResolveOptions,
//! };
//!
//! # async fn run() -> anyhow::Result<()> {
//! let service = Arc::new(DataCommonsClient::from_env()?);
//! let index = ConcordanceIndex::from_csv_path("concordance.csv", "dcid")?;
//! let resolver = PlaceResolver::countries(service, index);
//!
//! let iso3 = resolver
//!     .resolve(
//!         vec!["Zimbabwe", "Italy", "Atlantis"],
//!         &ResolveOptions::to("iso3_code").not_found(NotFoundPolicy::Ignore),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod candidates;
pub mod concordance;
pub mod config;
pub mod conflict;
pub mod disambiguation;
pub mod error;
pub mod mapping;
pub mod normalize;
pub mod resolver;
pub mod service;

pub use candidates::{Candidates, ResolutionMap};
pub use concordance::ConcordanceIndex;
pub use config::ResolverConfig;
pub use conflict::{MultiplePolicy, NotFoundPolicy};
pub use disambiguation::{Disambiguator, OverrideRules};
pub use error::{PlaceError, Result, ServiceError, TableError};
pub use mapping::AttributeMapper;
pub use normalize::{normalize, normalize_key};
pub use resolver::{PlaceInput, PlaceOutput, PlaceResolver, ResolveOptions};
pub use service::{DataCommonsClient, DataCommonsSettings, InMemoryPlaceService, PlaceService};
