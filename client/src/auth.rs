//! Login, logout, and the single-flight token refresh protocol.

use serde::{Deserialize, Serialize};

use vantage_session::Session;
use vantage_types::User;

use crate::{ApiClient, ApiError, decode_json};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    token: String,
}

impl ApiClient {
    /// `POST /api/v1/auth/login`. On success the session is installed and
    /// persisted; the signed-in user is returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let response = self
            .send_public(|http| {
                http.post(self.url("/api/v1/auth/login"))
                    .json(&LoginRequest { email, password })
            })
            .await?;
        let session: Session = decode_json(response).await?;
        let user = session.user.clone();
        self.session().sign_in(session)?;
        Ok(user)
    }

    /// Client-side logout: drop and clear the persisted session.
    pub fn logout(&self) -> Result<(), ApiError> {
        tracing::info!("Logging out");
        self.session().clear()?;
        Ok(())
    }

    /// Run the refresh protocol. `seen_epoch` is the session token epoch the
    /// caller observed before its request failed with a 401.
    ///
    /// Single-flight: the gate serializes refreshes, and a caller that
    /// acquires the gate after another refresh already completed (the epoch
    /// moved) returns immediately and reuses that token. Exactly one refresh
    /// request reaches the backend for any burst of concurrent 401s.
    ///
    /// Any refresh failure - HTTP rejection or network error - clears the
    /// session defensively and surfaces [`ApiError::Unauthenticated`].
    pub(crate) async fn refresh_access_token(&self, seen_epoch: u64) -> Result<(), ApiError> {
        let _gate = self.refresh_gate.lock().await;

        if self.session().token_epoch() != seen_epoch {
            tracing::debug!("Token already refreshed by a concurrent caller");
            return Ok(());
        }

        let Some(refresh_token) = self.session().refresh_token() else {
            return Err(ApiError::Unauthenticated);
        };

        let result = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await;

        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Refresh rejected; clearing session");
                self.session().clear()?;
                return Err(ApiError::Unauthenticated);
            }
            Err(e) => {
                // Network failure during refresh is treated like an auth
                // failure: we cannot know the token's state, so drop it.
                tracing::warn!(error = %e, "Refresh transport failure; clearing session");
                self.session().clear()?;
                return Err(ApiError::Unauthenticated);
            }
        };

        let refreshed: RefreshResponse = match decode_json(response).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable refresh response; clearing session");
                self.session().clear()?;
                return Err(ApiError::Unauthenticated);
            }
        };

        self.session().apply_refreshed_token(refreshed.token)?;
        tracing::debug!("Access token refreshed");
        Ok(())
    }
}
