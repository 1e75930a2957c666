//! Priority-ordered acquisition with fixture fallback

use crate::config::{SourcesConfig, YahooCredentials};
use crate::error::{Result, SourceError};
use crate::espn::{EspnAdapter, ESPN_SOURCE};
use crate::fixture::fixture_players;
use crate::nfl::{NflAdapter, NFL_SOURCE};
use crate::oauth::YahooOAuthClient;
use crate::sleeper::{SleeperAdapter, SLEEPER_SOURCE};
use crate::source::SourceAdapter;
use crate::transport::{HttpTransport, JsonTransport};
use crate::types::{Provenance, RawPlayerRecord};
use crate::yahoo::{YahooAdapter, YAHOO_SOURCE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// What happened when one adapter was tried
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success { count: usize },
    Empty,
    /// Non-empty, but too little of it survived the caller's usability check
    Unusable { count: usize },
    Failed { error: String },
}

/// One adapter invocation, kept for the audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceAttempt {
    pub source: String,
    pub outcome: AttemptOutcome,
    pub fetched_at: DateTime<Utc>,
    #[serde(skip)]
    pub records: Vec<RawPlayerRecord>,
}

/// Result of running the chain
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub season: i32,
    pub records: Vec<RawPlayerRecord>,
    pub provenance: Provenance,
    /// Every adapter actually invoked, in invocation order
    pub attempts: Vec<SourceAttempt>,
}

impl Acquisition {
    pub fn used_fixture(&self) -> bool {
        self.provenance == Provenance::Fixture
    }
}

/// Ordered list of providers sharing the `fetch` capability
pub struct AcquisitionChain {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl AcquisitionChain {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Build the production chain in `config.order`.
    ///
    /// `yahoo` is skipped when no credentials are available.
    pub fn from_config(config: &SourcesConfig, yahoo: Option<YahooCredentials>) -> Result<Self> {
        let transport: Arc<dyn JsonTransport> = Arc::new(HttpTransport::new(config.timeout(), &config.user_agent)?);
        let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::new();

        for name in &config.order {
            match name.as_str() {
                SLEEPER_SOURCE => adapters.push(Box::new(SleeperAdapter::new(transport.clone()))),
                ESPN_SOURCE => adapters.push(Box::new(EspnAdapter::new(transport.clone(), config.parallel_fanout))),
                NFL_SOURCE => adapters.push(Box::new(NflAdapter::new(transport.clone(), config.parallel_fanout))),
                YAHOO_SOURCE => match &yahoo {
                    Some(credentials) => {
                        let client = YahooOAuthClient::new(credentials.clone(), config.retry.clone())?;
                        adapters.push(Box::new(YahooAdapter::new(Arc::new(client))));
                    }
                    None => info!("Yahoo credentials not configured, skipping yahoo source"),
                },
                other => return Err(SourceError::NotConfigured(format!("unknown source '{other}'"))),
            }
        }

        Ok(Self::new(adapters))
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Try each adapter in order and return the first non-empty result.
    ///
    /// Never fails: adapter errors are logged and skipped, and the fixture set
    /// stands in when nothing usable came back.
    pub async fn acquire(&self, season: i32) -> Acquisition {
        self.acquire_usable(season, |_| true).await
    }

    /// Like [`acquire`](Self::acquire), but a non-empty result only wins when
    /// `usable` accepts it. Rejected results advance the chain like empty ones.
    pub async fn acquire_usable<F>(&self, season: i32, usable: F) -> Acquisition
    where
        F: Fn(&[RawPlayerRecord]) -> bool,
    {
        let mut attempts = Vec::new();

        for adapter in &self.adapters {
            let source = adapter.name().to_string();
            info!("Trying source {} for season {}", source, season);
            let fetched_at = Utc::now();

            match adapter.fetch(season).await {
                Ok(records) if !records.is_empty() && !usable(&records) => {
                    warn!("Source {} returned {} players but too few are usable", source, records.len());
                    attempts.push(SourceAttempt {
                        source,
                        outcome: AttemptOutcome::Unusable { count: records.len() },
                        fetched_at,
                        records,
                    });
                }
                Ok(records) if !records.is_empty() => {
                    info!("Source {} returned {} players", source, records.len());
                    attempts.push(SourceAttempt {
                        source: source.clone(),
                        outcome: AttemptOutcome::Success { count: records.len() },
                        fetched_at,
                        records: records.clone(),
                    });
                    return Acquisition { season, records, provenance: Provenance::Source(source), attempts };
                }
                Ok(_) => {
                    warn!("Source {} returned no data", source);
                    attempts.push(SourceAttempt { source, outcome: AttemptOutcome::Empty, fetched_at, records: Vec::new() });
                }
                Err(e) => {
                    warn!("Source {} failed: {}", source, e);
                    attempts.push(SourceAttempt {
                        source,
                        outcome: AttemptOutcome::Failed { error: e.to_string() },
                        fetched_at,
                        records: Vec::new(),
                    });
                }
            }
        }

        warn!("All {} sources failed, using fallback dataset", attempts.len());
        Acquisition { season, records: fixture_players(), provenance: Provenance::Fixture, attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Players(usize),
        Linebackers(usize),
        Empty,
        Fail,
    }

    struct MockAdapter {
        name: &'static str,
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    impl MockAdapter {
        fn boxed(name: &'static str, behavior: Behavior, calls: &Arc<AtomicUsize>) -> Box<dyn SourceAdapter> {
            Box::new(Self { name, behavior, calls: calls.clone() })
        }
    }

    #[async_trait]
    impl SourceAdapter for MockAdapter {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _season: i32) -> Result<Vec<RawPlayerRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Players(n) => Ok((0..n)
                    .map(|i| RawPlayerRecord::new(self.name, i.to_string(), format!("Player {i}"), "WR", "KC"))
                    .collect()),
                Behavior::Linebackers(n) => Ok((0..n)
                    .map(|i| RawPlayerRecord::new(self.name, i.to_string(), format!("Linebacker {i}"), "LB", "KC"))
                    .collect()),
                Behavior::Empty => Ok(Vec::new()),
                Behavior::Fail => Err(SourceError::Http { status: 500, url: self.name.to_string() }),
            }
        }
    }

    #[tokio::test]
    async fn test_first_non_empty_source_wins() {
        let calls = [Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0))];
        let chain = AcquisitionChain::new(vec![
            MockAdapter::boxed("a", Behavior::Fail, &calls[0]),
            MockAdapter::boxed("b", Behavior::Players(3), &calls[1]),
            MockAdapter::boxed("c", Behavior::Players(5), &calls[2]),
        ]);

        let acquisition = chain.acquire(2024).await;
        assert_eq!(acquisition.provenance, Provenance::Source("b".to_string()));
        assert_eq!(acquisition.records.len(), 3);
        assert_eq!(calls[2].load(Ordering::SeqCst), 0);
        assert_eq!(acquisition.attempts.len(), 2);
        assert!(matches!(acquisition.attempts[0].outcome, AttemptOutcome::Failed { .. }));
        assert_eq!(acquisition.attempts[1].outcome, AttemptOutcome::Success { count: 3 });
    }

    #[tokio::test]
    async fn test_empty_result_advances_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = AcquisitionChain::new(vec![
            MockAdapter::boxed("a", Behavior::Empty, &calls),
            MockAdapter::boxed("b", Behavior::Players(1), &calls),
        ]);

        let acquisition = chain.acquire(2024).await;
        assert_eq!(acquisition.provenance.to_string(), "b");
        assert_eq!(acquisition.attempts[0].outcome, AttemptOutcome::Empty);
    }

    #[tokio::test]
    async fn test_total_failure_yields_fixture() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = AcquisitionChain::new(vec![
            MockAdapter::boxed("a", Behavior::Fail, &calls),
            MockAdapter::boxed("b", Behavior::Empty, &calls),
        ]);

        let acquisition = chain.acquire(2024).await;
        assert!(acquisition.used_fixture());
        assert_eq!(acquisition.provenance.to_string(), "fallback");
        assert_eq!(acquisition.records, fixture_players());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unusable_result_advances_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = AcquisitionChain::new(vec![
            MockAdapter::boxed("a", Behavior::Linebackers(3), &calls),
            MockAdapter::boxed("b", Behavior::Players(4), &calls),
        ]);
        let no_linebackers = |records: &[RawPlayerRecord]| records.iter().all(|r| r.position.as_deref() != Some("LB"));

        let acquisition = chain.acquire_usable(2024, no_linebackers).await;
        assert_eq!(acquisition.provenance.to_string(), "b");
        assert_eq!(acquisition.attempts[0].outcome, AttemptOutcome::Unusable { count: 3 });
        assert_eq!(acquisition.attempts[0].records.len(), 3);
    }

    #[tokio::test]
    async fn test_only_unusable_results_yield_fixture() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = AcquisitionChain::new(vec![MockAdapter::boxed("a", Behavior::Linebackers(3), &calls)]);

        let acquisition = chain.acquire_usable(2024, |records| records.len() > 3).await;
        assert!(acquisition.used_fixture());
        assert_eq!(acquisition.records, fixture_players());
    }

    #[test]
    fn test_from_config_skips_yahoo_without_credentials() {
        let chain = AcquisitionChain::from_config(&SourcesConfig::default(), None).unwrap();
        assert_eq!(chain.source_names(), vec!["sleeper", "espn", "nfl"]);

        let mut config = SourcesConfig::default();
        config.order.push("myspace".to_string());
        assert!(matches!(AcquisitionChain::from_config(&config, None), Err(SourceError::NotConfigured(_))));
    }
}
