//! Per-sub-unit fan-out for providers organized by team or position bucket

use crate::error::{Result, SourceError};
use crate::types::RawPlayerRecord;
use futures::future::join_all;
use std::fmt::Display;
use std::future::Future;
use tracing::warn;

/// Outcome of querying every sub-unit of one provider
#[derive(Debug)]
pub struct FanoutReport<U> {
    /// Records from every sub-unit that succeeded, in sub-unit order
    pub records: Vec<RawPlayerRecord>,
    /// Sub-units that failed, with their error
    pub failures: Vec<(U, SourceError)>,
    pub attempted: usize,
}

impl<U: Display> FanoutReport<U> {
    /// Collapse into an adapter result.
    ///
    /// Partial success is success. Only a provider whose every sub-unit failed
    /// reports an error.
    pub fn into_result(self) -> Result<Vec<RawPlayerRecord>> {
        if self.attempted > 0 && self.failures.len() == self.attempted {
            let last = self
                .failures
                .last()
                .map(|(unit, err)| format!("{unit}: {err}"))
                .unwrap_or_default();
            return Err(SourceError::AllSubUnitsFailed { attempted: self.attempted, last });
        }
        Ok(self.records)
    }
}

/// Query every unit, isolating failures.
///
/// With `parallel` the requests run concurrently, but results are still merged
/// in the order of `units`, so downstream first-seen-wins deduplication gives
/// the same answer either way.
pub async fn collect<U, F, Fut>(
    source: &str,
    units: &[U],
    parallel: bool,
    fetch_unit: F,
) -> FanoutReport<U>
where
    U: Clone + Display,
    F: Fn(U) -> Fut,
    Fut: Future<Output = Result<Vec<RawPlayerRecord>>>,
{
    let results: Vec<Result<Vec<RawPlayerRecord>>> = if parallel {
        join_all(units.iter().cloned().map(&fetch_unit)).await
    } else {
        let mut results = Vec::with_capacity(units.len());
        for unit in units.iter().cloned() {
            results.push(fetch_unit(unit).await);
        }
        results
    };

    let mut report = FanoutReport { records: Vec::new(), failures: Vec::new(), attempted: units.len() };
    for (unit, result) in units.iter().cloned().zip(results) {
        match result {
            Ok(records) => report.records.extend(records),
            Err(e) => {
                warn!("{} sub-unit {} failed: {}", source, unit, e);
                report.failures.push((unit, e));
            }
        }
    }

    report
}
