use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::instrument;

use crate::core::config::Credentials;
use crate::core::error::Error;
use crate::types::upstream::AuthResponse;

#[derive(Clone)]
pub(crate) struct Token {
    value: String,
    expires_at: Instant,
}

impl Token {
    pub(crate) fn new(value: String, expires_at: Instant) -> Self {
        Self { value, expires_at }
    }

    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Holds the single bearer token shared by every upstream call.
///
/// The slot stays locked for the whole credential exchange, so callers that
/// arrive while a refresh is in flight wait for it and receive the same token.
#[derive(Clone)]
pub(crate) struct TokenCache {
    client: reqwest::Client,
    url: String,
    credentials: Arc<Credentials>,
    token: Arc<Mutex<Option<Token>>>,
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("url", &self.url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl TokenCache {
    pub(crate) fn new(client: reqwest::Client, url: String, credentials: Credentials) -> Self {
        Self {
            client,
            url,
            credentials: Arc::new(credentials),
            token: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the cached token, exchanging credentials for a new one if it is missing or expired.
    #[instrument(skip_all)]
    pub(crate) async fn get(&self) -> Result<String, Error> {
        let mut slot = self.token.lock().await;

        if let Some(token) = slot.as_ref().filter(|token| token.is_valid()) {
            return Ok(token.value.clone());
        }

        *slot = None;

        let token = self.exchange().await?;
        let value = token.value.clone();

        *slot = Some(token);

        Ok(value)
    }

    /// Drops the cached token; the next `get` performs a fresh exchange.
    pub(crate) async fn invalidate(&self) {
        *self.token.lock().await = None;
    }

    /// Drops the cached token only if it is still `stale`. Returns whether anything was dropped.
    pub(crate) async fn invalidate_stale(&self, stale: &str) -> bool {
        let mut slot = self.token.lock().await;

        match slot.as_ref() {
            Some(token) if token.value == stale => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// The cached token value, if any, without refreshing it.
    #[cfg(test)]
    pub(crate) async fn peek(&self) -> Option<String> {
        self.token
            .lock()
            .await
            .as_ref()
            .map(|token| token.value.clone())
    }

    async fn exchange(&self) -> Result<Token, Error> {
        tracing::info!("Fetching new auth token");

        let requested_at = Instant::now();

        let response = self
            .client
            .post(&self.url)
            .json(self.credentials.as_ref())
            .send()
            .await
            .map_err(|e| Error::UpstreamAuth(format!("token exchange failed: {e}")))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::UpstreamAuth(format!(
                "token exchange returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::UpstreamAuth(format!("token exchange failed: {e}")))?;

        let auth = serde_json::from_str::<AuthResponse>(&body)
            .map_err(|e| Error::UpstreamAuth(format!("malformed token response: {e}")))?;

        tracing::debug!(expires_in = auth.expires_in, "Received token");

        let expires_at = requested_at
            .checked_add(Duration::from_secs(auth.expires_in))
            .ok_or_else(|| {
                Error::UpstreamAuth(format!("expires_in out of range: {}", auth.expires_in))
            })?;

        let valid_until = i64::try_from(auth.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));

        match valid_until {
            Some(valid_until) => tracing::info!("New auth token valid until {}", valid_until),
            None => tracing::info!("New auth token received"),
        }

        Ok(Token::new(auth.access_token, expires_at))
    }
}
