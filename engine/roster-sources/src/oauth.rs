//! Authenticated Yahoo Fantasy API client

use crate::config::{RetryConfig, YahooCredentials};
use crate::error::{Result, SourceError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const YAHOO_TOKEN_URL: &str = "https://api.login.yahoo.com/oauth2/get_token";
const FANTASY_BASE_URL: &str = "https://fantasysports.yahooapis.com/fantasy/v2";
const FANTASY_TIMEOUT: Duration = Duration::from_secs(20);

/// `get(path, params) -> JSON` against an authenticated fantasy API
#[async_trait]
pub trait FantasyApi: Send + Sync {
    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// Bearer-token client with one-shot refresh on 401 and bounded retry
pub struct YahooOAuthClient {
    client: Client,
    client_id: String,
    client_secret: String,
    tokens: RwLock<Tokens>,
    retry: RetryConfig,
    base_url: String,
    token_url: String,
}

impl YahooOAuthClient {
    /// Create a new client
    pub fn new(credentials: YahooCredentials, retry: RetryConfig) -> Result<Self> {
        let client = Client::builder().timeout(FANTASY_TIMEOUT).build()?;
        Ok(Self {
            client,
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            tokens: RwLock::new(Tokens { access: credentials.access_token, refresh: credentials.refresh_token }),
            retry,
            base_url: FANTASY_BASE_URL.to_string(),
            token_url: YAHOO_TOKEN_URL.to_string(),
        })
    }

    /// Point the client at a different API root and token endpoint
    pub fn with_endpoints(mut self, base_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.token_url = token_url.into();
        self
    }

    /// Exchange the refresh token for a new access token
    pub async fn refresh(&self) -> Result<()> {
        let refresh_token = self
            .tokens
            .read()
            .await
            .refresh
            .clone()
            .ok_or_else(|| SourceError::Auth("no refresh token available".to_string()))?;

        info!("Refreshing Yahoo access token");
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        let response = self.client.post(&self.token_url).form(&form).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Auth(format!("token refresh answered HTTP {}", response.status())));
        }
        let token: TokenResponse = response.json().await?;

        let mut tokens = self.tokens.write().await;
        tokens.access = Some(token.access_token);
        if token.refresh_token.is_some() {
            tokens.refresh = token.refresh_token;
        }
        Ok(())
    }

    async fn send(&self, url: &str, params: &[(&str, String)]) -> Result<reqwest::Response> {
        let mut request = self.client.get(url).query(params);
        if let Some(access) = self.tokens.read().await.access.as_deref() {
            request = request.bearer_auth(access);
        }
        Ok(request.send().await?)
    }

    async fn get_once(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut response = self.send(&url, params).await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.tokens.read().await.refresh.is_some() {
            self.refresh().await?;
            response = self.send(&url, params).await?;
        }

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SourceError::Auth(format!("Yahoo rejected credentials for {path}")));
        }
        if !status.is_success() {
            return Err(SourceError::Http { status: status.as_u16(), url });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl FantasyApi for YahooOAuthClient {
    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        debug!("Yahoo GET {}", path);
        with_retry(&self.retry, || self.get_once(path, params)).await
    }
}

/// Run `op`, retrying transient failures with exponential backoff
pub async fn with_retry<F, Fut, T>(retry: &RetryConfig, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = retry.delay_after(attempt);
                warn!("Attempt {} failed: {}, retrying in {:?}", attempt, e, delay);
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Responder = dyn Fn(&str) -> (u16, &'static str) + Send + Sync;

    /// Minimal HTTP/1.1 server answering every request through `respond`.
    /// Returns its base URL and the request lines it has seen.
    async fn serve(respond: Box<Responder>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let head_end = loop {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break None;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        break Some(pos + 4);
                    }
                };
                let Some(head_end) = head_end else { continue };

                let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                while buf.len() < head_end + body_len {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }

                let request_line = head.lines().next().unwrap_or_default().to_string();
                log.lock().unwrap().push(request_line);
                let (status, body) = respond(head.as_str());
                let response = format!(
                    "HTTP/1.1 {status} STUB\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        (base, seen)
    }

    fn client_for(base: &str, refresh_token: Option<&str>) -> YahooOAuthClient {
        let credentials = YahooCredentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            access_token: Some("stale".into()),
            refresh_token: refresh_token.map(String::from),
        };
        YahooOAuthClient::new(credentials, fast_retry())
            .unwrap()
            .with_endpoints(format!("{base}/fantasy"), format!("{base}/token"))
    }

    fn methods(seen: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        seen.lock()
            .unwrap()
            .iter()
            .map(|line| line.split_whitespace().take(2).collect::<Vec<_>>().join(" "))
            .collect()
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig { max_attempts: 3, initial_delay_ms: 1, max_delay_ms: 2, backoff_multiplier: 2.0 }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_rate_limit() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast_retry(), || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(SourceError::Http { status: 429, url: "/players".into() })
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(&fast_retry(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Http { status: 503, url: "/players".into() })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(&fast_retry(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Auth("bad token".into()))
        })
        .await;

        assert!(matches!(result, Err(SourceError::Auth(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_fails() {
        let credentials = YahooCredentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            access_token: Some("token".into()),
            refresh_token: None,
        };
        let client = YahooOAuthClient::new(credentials, fast_retry()).unwrap();
        assert!(matches!(client.refresh().await, Err(SourceError::Auth(_))));
    }

    #[tokio::test]
    async fn test_unauthorized_refreshes_once_and_resends() {
        let (base, seen) = serve(Box::new(|head: &str| {
            if head.starts_with("post /token") {
                (200, r#"{"access_token":"fresh","refresh_token":"next"}"#)
            } else if head.contains("bearer fresh") {
                (200, r#"{"players":[]}"#)
            } else {
                (401, "{}")
            }
        }))
        .await;
        let client = client_for(&base, Some("refresh"));

        let value = client.get("/players", &[("start", "0".to_string())]).await.unwrap();
        assert_eq!(value["players"], serde_json::json!([]));
        assert_eq!(methods(&seen), vec!["get /fantasy/players?start=0", "post /token", "get /fantasy/players?start=0"]);
        assert_eq!(client.tokens.read().await.refresh.as_deref(), Some("next"));
    }

    #[tokio::test]
    async fn test_second_unauthorized_is_not_retried() {
        let (base, seen) = serve(Box::new(|head: &str| {
            if head.starts_with("post /token") {
                (200, r#"{"access_token":"fresh"}"#)
            } else {
                (401, "{}")
            }
        }))
        .await;
        let client = client_for(&base, Some("refresh"));

        let result = client.get("/players", &[]).await;
        assert!(matches!(result, Err(SourceError::Auth(_))));
        assert_eq!(methods(&seen), vec!["get /fantasy/players", "post /token", "get /fantasy/players"]);
    }

    #[tokio::test]
    async fn test_unauthorized_without_refresh_token_fails_fast() {
        let (base, seen) = serve(Box::new(|_: &str| (401, "{}"))).await;
        let client = client_for(&base, None);

        assert!(matches!(client.get("/players", &[]).await, Err(SourceError::Auth(_))));
        assert_eq!(methods(&seen), vec!["get /fantasy/players"]);
    }

    #[tokio::test]
    async fn test_server_errors_go_through_retry() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let (base, seen) = serve(Box::new(move |_: &str| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                (503, "{}")
            } else {
                (200, r#"{"ok":true}"#)
            }
        }))
        .await;
        let client = client_for(&base, Some("refresh"));

        let value = client.get("/players", &[]).await.unwrap();
        assert_eq!(value["ok"], serde_json::json!(true));
        assert_eq!(methods(&seen).len(), 3);
        assert!(methods(&seen).iter().all(|m| m == "get /fantasy/players"));
    }

    #[tokio::test]
    async fn test_persistent_server_errors_exhaust_retries() {
        let (base, seen) = serve(Box::new(|_: &str| (500, "{}"))).await;
        let client = client_for(&base, Some("refresh"));

        assert!(matches!(client.get("/players", &[]).await, Err(SourceError::Http { status: 500, .. })));
        assert_eq!(methods(&seen).len(), 3);
    }
}
