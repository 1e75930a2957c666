//! Roster Normalizer - Fuses raw provider records into the canonical dataset
//!
//! Default-fills missing identity fields, canonicalizes position and team
//! vocabularies, keeps fantasy-relevant positions only, deduplicates on
//! (name, team) and imposes a deterministic sort.

pub mod normalize;
pub mod summary;
pub mod types;
pub mod vocab;

pub use normalize::{normalize, UNKNOWN_PLAYER};
pub use summary::RosterSummary;
pub use types::{FantasyPosition, NormalizedPlayerRecord};
