//! # Artifact Store
//!
//! Persistence for every pipeline stage under one output directory: raw
//! provider payloads with an acquisition audit report, the normalized roster,
//! versioned model runs (bincode + gzip, one file per model family, published
//! by a manifest written last), training metrics and ranked projections.
//!
//! Every file is written to a temporary sibling and renamed into place.

pub mod atomic;
pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{publish_app_data, AcquisitionReport, ArtifactStore, RunManifest};
