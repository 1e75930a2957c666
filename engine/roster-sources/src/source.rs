use crate::error::Result;
use crate::types::RawPlayerRecord;
use async_trait::async_trait;

/// The single capability every upstream provider exposes.
///
/// Implementations return `Ok(vec![])` when the provider simply has no data
/// for the season and reserve `Err` for transport, status or payload failures.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Provenance tag written into every record this adapter emits
    fn name(&self) -> &str;

    /// Fetch all players this provider knows for `season`
    async fn fetch(&self, season: i32) -> Result<Vec<RawPlayerRecord>>;
}
