//! Disambiguation: free-text place reference -> canonical identifier(s)

pub mod disambiguator;
pub mod overrides;

pub use disambiguator::{Disambiguator, DEFAULT_BATCH_SIZE};
pub use overrides::OverrideRules;
