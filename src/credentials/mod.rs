//! OAuth credentials for the cookbook service.
//!
//! Tokens are held in memory only. The initial access token is issued out of
//! band and handed to the process through the environment; refreshed tokens
//! replace it for the lifetime of the process.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Seconds before expiry at which a token counts as due for refresh.
pub const REFRESH_THRESHOLD_SECS: i64 = 90;

/// Credentials for accessing the cookbook service.
///
/// Never expose these through public APIs or logs; `Debug` redacts the tokens.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    /// OAuth access token (sent as the `access_token` query parameter)
    pub access_token: String,

    /// OAuth refresh token (used to obtain new access tokens)
    pub refresh_token: Option<String>,

    /// When the access token expires (UTC)
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Credentials with only an access token (no refresh, no expiry).
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Reads `COOKBOOK_ACCESS_TOKEN` and the optional `COOKBOOK_REFRESH_TOKEN`.
    pub fn from_env() -> Option<Self> {
        let access_token = std::env::var("COOKBOOK_ACCESS_TOKEN").ok()?;
        Some(Self {
            access_token,
            refresh_token: std::env::var("COOKBOOK_REFRESH_TOKEN").ok(),
            expires_at: None,
        })
    }

    /// Returns true if the token expires within [`REFRESH_THRESHOLD_SECS`]
    /// (or already has) and a refresh token is available.
    ///
    /// Tokens without an expiry or without a refresh token never qualify.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.expires_at, &self.refresh_token) {
            (Some(expires_at), Some(_)) => {
                *expires_at <= now + Duration::seconds(REFRESH_THRESHOLD_SECS)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
