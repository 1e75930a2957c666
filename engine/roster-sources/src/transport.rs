//! JSON-over-HTTP transport shared by the keyless providers

use crate::error::{Result, SourceError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; FantasyDraftBot/1.0)";

/// Fetches a URL and decodes the body as JSON.
///
/// Adapters only talk to the network through this trait so tests can feed
/// canned payloads and inject per-request failures.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value>;
}

/// reqwest-backed transport with a per-request timeout
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new transport
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder().timeout(timeout).user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        debug!("GET {} {:?}", url, query);
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http { status: status.as_u16(), url: url.to_string() });
        }

        let body = response.json::<Value>().await?;
        Ok(body)
    }
}
