//! Shared OAuth session - current credentials, token refresh and
//! reconnect-on-expiry for every cookbook call.

use crate::{Credentials, OAuthConfig};
use anyhow::{Context, Result};
use chrono::Utc;
use cookbook::{CookbookError, CookbookResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Token response from an OAuth token refresh endpoint.
#[derive(Deserialize)]
struct TokenRefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// OAuth session shared by the operation surface and the polling scheduler.
pub struct Session {
    connector_name: String,
    oauth: OAuthConfig,
    credentials: RwLock<Credentials>,
    /// Serializes refreshes so concurrent expiries trigger one token request
    refresh_lock: Mutex<()>,
    http_client: reqwest::Client,
}

impl Session {
    pub fn new(
        connector_name: &str,
        oauth: OAuthConfig,
        credentials: Credentials,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            connector_name: connector_name.to_string(),
            oauth,
            credentials: RwLock::new(credentials),
            refresh_lock: Mutex::new(()),
            http_client,
        }
    }

    /// Snapshot of the current credentials.
    pub async fn credentials(&self) -> Credentials {
        self.credentials.read().await.clone()
    }

    /// Returns true if the access token is close to expiry and refreshable.
    pub async fn needs_refresh(&self) -> bool {
        self.credentials.read().await.needs_refresh(Utc::now())
    }

    /// Refreshes the OAuth access token.
    ///
    /// POSTs `grant_type=refresh_token` to the token endpoint, including the
    /// client id/secret when configured. Keeps the existing refresh token if
    /// the provider did not rotate it. On failure the credentials are left
    /// unchanged.
    pub async fn refresh(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<()> {
        let current = self.credentials().await;
        let refresh_token = current
            .refresh_token
            .clone()
            .context("No refresh token available")?;

        let mut form: HashMap<&str, String> = HashMap::new();
        form.insert("grant_type", "refresh_token".to_string());
        form.insert("refresh_token", refresh_token);
        if let Some(client_id) = &self.oauth.client_id {
            form.insert("client_id", client_id.clone());
        }
        if let Some(client_secret) = &self.oauth.client_secret {
            form.insert("client_secret", client_secret.clone());
        }

        info!(connector = %self.connector_name, "Refreshing OAuth token");

        let response = self
            .http_client
            .post(&self.oauth.token_url)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .context("Failed to send token refresh request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            anyhow::bail!("Token refresh failed with status {}: {}", status, body);
        }

        let token_response: TokenRefreshResponse = response
            .json()
            .await
            .context("Failed to parse token refresh response")?;

        let refreshed = Credentials {
            access_token: token_response.access_token,
            refresh_token: token_response.refresh_token.or(current.refresh_token),
            expires_at: token_response
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        };
        *self.credentials.write().await = refreshed;

        info!(connector = %self.connector_name, "OAuth token refreshed successfully");
        Ok(())
    }

    /// Refreshes unless another caller already replaced `stale_token`.
    async fn refresh_if_stale(&self, stale_token: &str) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        if self.credentials.read().await.access_token != stale_token {
            return Ok(());
        }
        self.refresh_locked().await
    }

    /// Runs `op` with the current credentials, reconnecting once on expiry.
    ///
    /// When `op` fails with `SessionExpired` the token is refreshed and `op`
    /// runs a second time. If the refresh itself fails, the original
    /// `SessionExpired` error is returned unmodified. Any other error is
    /// returned as is.
    pub async fn run_with_reconnect<T, F, Fut>(&self, op: F) -> CookbookResult<T>
    where
        F: Fn(Credentials) -> Fut,
        Fut: Future<Output = CookbookResult<T>>,
    {
        let credentials = self.credentials().await;
        let used_token = credentials.access_token.clone();

        match op(credentials).await {
            Err(e @ CookbookError::SessionExpired(_)) => {
                warn!(
                    connector = %self.connector_name,
                    error = %e,
                    "Session expired, reconnecting"
                );
                if let Err(refresh_err) = self.refresh_if_stale(&used_token).await {
                    warn!(
                        connector = %self.connector_name,
                        error = %refresh_err,
                        "Reconnect failed"
                    );
                    return Err(e);
                }
                op(self.credentials().await).await
            }
            other => other,
        }
    }
}
