//! HTTP API client for the Vantage backend.
//!
//! # Architecture
//!
//! [`ApiClient`] wraps a hardened [`reqwest::Client`] and an owned
//! [`SessionManager`]. Every authorized request flows through
//! `ApiClient::send_authorized`, which attaches the current access token
//! and runs the refresh protocol on a 401:
//!
//! ```text
//! request --401--> refresh gate (single-flight) --ok--> retry once
//!                      |
//!                      +--refresh failed--> clear session, Unauthenticated
//! ```
//!
//! The gate guarantees that N concurrent 401s issue exactly one refresh
//! call; every waiter observes the resulting token through the session's
//! token epoch. A request is retried at most once - a second 401 after the
//! retry surfaces as a final [`ApiError::Unauthenticated`].
//!
//! # Error Handling
//!
//! Errors are classified into the [`ApiError`] taxonomy at the response
//! boundary; callers never see raw status codes. Business errors (4xx with
//! a message body) carry the backend's message verbatim.

mod auth;
mod endpoints;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use vantage_config::ClientConfig;
use vantage_session::{SessionManager, StoreError};

const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 8;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable credentials: not signed in, or the refresh protocol failed,
    /// or a refreshed token was still rejected.
    #[error("not authenticated")]
    Unauthenticated,
    /// Business/domain error: non-2xx response with a message body. The
    /// message is surfaced verbatim and the request is not retried.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    /// Network/transport failure. Pollers log these and keep going.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response arrived but its body was not the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
    /// Persisting the session failed after an otherwise successful exchange.
    #[error("session storage error: {0}")]
    Session(#[from] StoreError),
}

impl ApiError {
    /// True for errors a recurring poller should tolerate (keep last value,
    /// poll again next tick).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Decode(_))
    }
}

fn build_http_client(connect_timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .build()
        .unwrap_or_else(|e| {
            tracing::error!("Failed to build tuned HTTP client: {e}. Using defaults.");
            reqwest::Client::new()
        })
}

/// Read an error body, capping what is kept for display.
async fn read_capped_error_body(response: reqwest::Response) -> String {
    let status = response.status();
    match response.bytes().await {
        Ok(bytes) => {
            let capped = &bytes[..bytes.len().min(MAX_ERROR_BODY_BYTES)];
            let truncated = capped.len() < bytes.len();
            let text = String::from_utf8_lossy(capped);
            if truncated {
                format!("{text}...(truncated)")
            } else {
                text.into_owned()
            }
        }
        Err(e) => {
            tracing::debug!(status = %status, "Failed to read error body: {e}");
            String::new()
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend usually sends `{"message": "..."}` or `{"detail": "..."}`;
/// fall back to the raw (capped) text.
fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for pointer in ["/message", "/detail", "/error/message"] {
            if let Some(message) = json.pointer(pointer).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    body.trim().to_string()
}

/// Client for the Vantage REST API.
///
/// Hold it in an `Arc` when sharing with pollers; the refresh gate and the
/// session manager are both designed for concurrent callers.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: &ClientConfig, session: Arc<SessionManager>) -> Self {
        Self {
            http: build_http_client(config.connect_timeout),
            base_url: config.base_url.clone(),
            session,
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send an unauthenticated request (login, refresh, public status).
    async fn send_public(
        &self,
        build: impl Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = build(&self.http).send().await?;
        classify(response).await
    }

    /// Send a request with the current access token, running the refresh
    /// protocol on a 401 and retrying exactly once.
    pub(crate) async fn send_authorized(
        &self,
        build: impl Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        // Captured before the token read: any refresh that completes after
        // this point moves the epoch, so a 401 on our (possibly stale) token
        // skips our own refresh in favor of the token it installed.
        let seen_epoch = self.session.token_epoch();
        let token = self
            .session
            .access_token()
            .ok_or(ApiError::Unauthenticated)?;

        let response = build(&self.http).bearer_auth(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return classify(response).await;
        }

        tracing::debug!("Access token rejected; entering refresh protocol");
        self.refresh_access_token(seen_epoch).await?;

        let token = self
            .session
            .access_token()
            .ok_or(ApiError::Unauthenticated)?;
        let response = build(&self.http).bearer_auth(&token).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            // Retried once with a fresh token and still rejected: final.
            tracing::warn!("Request rejected again after token refresh");
            return Err(ApiError::Unauthenticated);
        }
        classify(response).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = self.send_authorized(|http| http.get(self.url(path))).await?;
        decode_json(response).await
    }
}

/// Classify a response: 2xx passes through, anything else becomes
/// [`ApiError::Api`] with the backend's message.
async fn classify(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = read_capped_error_body(response).await;
    Err(ApiError::Api {
        status: status.as_u16(),
        message: extract_error_message(&body),
    })
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ApiError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_field() {
        assert_eq!(
            extract_error_message(r#"{"message":"plan limit reached"}"#),
            "plan limit reached"
        );
        assert_eq!(
            extract_error_message(r#"{"detail":"invalid sku"}"#),
            "invalid sku"
        );
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"nested"}}"#),
            "nested"
        );
    }

    #[test]
    fn falls_back_to_raw_body() {
        assert_eq!(extract_error_message("plain text error"), "plain text error");
        assert_eq!(extract_error_message(r#"{"other":1}"#), r#"{"other":1}"#);
    }

    #[test]
    fn transient_classification() {
        let decode = ApiError::Decode(serde_json::from_str::<u8>("x").unwrap_err());
        assert!(decode.is_transient());
        assert!(!ApiError::Unauthenticated.is_transient());
        assert!(!ApiError::Api {
            status: 400,
            message: String::new()
        }
        .is_transient());
    }
}
