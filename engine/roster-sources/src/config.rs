use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::transport::DEFAULT_USER_AGENT;

/// Configuration for roster acquisition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Provider names in priority order
    pub order: Vec<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent sent to the keyless providers
    pub user_agent: String,

    /// Issue a provider's per-team / per-position requests concurrently
    pub parallel_fanout: bool,

    /// Retry policy for the authenticated provider
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds
    pub initial_delay_ms: u64,

    /// Upper bound on any single delay in milliseconds
    pub max_delay_ms: u64,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            order: vec!["sleeper".to_string(), "espn".to_string(), "nfl".to_string(), "yahoo".to_string()],
            timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            parallel_fanout: false,
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, initial_delay_ms: 1_000, max_delay_ms: 10_000, backoff_multiplier: 2.0 }
    }
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RetryConfig {
    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.max(1.0).powi(attempt.saturating_sub(1) as i32);
        let millis = (self.initial_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Duration::from_millis(millis as u64)
    }
}

/// OAuth credentials for the Yahoo Fantasy API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YahooCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl YahooCredentials {
    pub const CLIENT_ID_ENV: &'static str = "YAHOO_CLIENT_ID";
    pub const CLIENT_SECRET_ENV: &'static str = "YAHOO_CLIENT_SECRET";
    pub const ACCESS_TOKEN_ENV: &'static str = "YAHOO_ACCESS_TOKEN";
    pub const REFRESH_TOKEN_ENV: &'static str = "YAHOO_REFRESH_TOKEN";

    /// Load credentials from environment variables.
    ///
    /// Returns `None` unless a client id, a client secret and at least one
    /// token are all present; the Yahoo adapter is simply not registered then.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let credentials = Self {
            client_id: get(Self::CLIENT_ID_ENV)?,
            client_secret: get(Self::CLIENT_SECRET_ENV)?,
            access_token: get(Self::ACCESS_TOKEN_ENV),
            refresh_token: get(Self::REFRESH_TOKEN_ENV),
        };
        if credentials.access_token.is_none() && credentials.refresh_token.is_none() {
            return None;
        }
        Some(credentials)
    }
}
