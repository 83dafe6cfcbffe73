//! Concordance tables
//!
//! A concordance table lists every known place once, keyed by its canonical
//! identifier, with alternate codes (ISO alpha-2/3, M49, DAC, names) and
//! classification attributes (region, income level, membership flags) as
//! further columns.

mod groups;
pub mod index;
mod loader;

pub use index::{ConcordanceIndex, DEFAULT_ID_COLUMN};
