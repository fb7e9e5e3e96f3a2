use crate::{Credentials, OAuthConfig};
use async_trait::async_trait;
use cookbook::{CookbookResult, GenericRecord};
use std::time::Duration;

/// Polling feed source backed by an external API.
///
/// Connectors are stateless - credentials and poll schedules are managed
/// by the [`Session`](crate::session::Session) and the
/// [`PollingScheduler`](crate::scheduler::PollingScheduler).
///
/// # Lifecycle
/// 1. Session is created from the `oauth_config()` endpoints and an initial token
/// 2. Scheduler calls `fetch(credentials)` every `poll_interval()`
/// 3. Records are wrapped in a feed batch and handed to the source callback
///
/// # Example
/// ```no_run
/// use async_trait::async_trait;
/// use cookbook::{CookbookResult, GenericRecord};
/// use cookbook_connector::{Connector, Credentials, OAuthConfig};
/// use std::time::Duration;
///
/// struct PantryConnector;
///
/// #[async_trait]
/// impl Connector for PantryConnector {
///     fn name(&self) -> &str {
///         "pantry"
///     }
///
///     fn oauth_config(&self) -> OAuthConfig {
///         OAuthConfig::default()
///     }
///
///     async fn fetch(&self, _credentials: &Credentials) -> CookbookResult<Vec<GenericRecord>> {
///         Ok(vec![])
///     }
///
///     fn poll_interval(&self) -> Duration {
///         Duration::from_secs(10)
///     }
/// }
/// ```
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the unique identifier for this connector.
    ///
    /// Lowercase alphanumeric; used for logging and as the feed batch source.
    fn name(&self) -> &str;

    /// Returns the OAuth configuration for this connector.
    fn oauth_config(&self) -> OAuthConfig;

    /// Fetches the current feed contents as generic records.
    ///
    /// # Error Handling
    /// - `SessionExpired` → session refreshes the token and retries once
    /// - anything else → recorded in the scheduler status; next tick retries
    async fn fetch(&self, credentials: &Credentials) -> CookbookResult<Vec<GenericRecord>>;

    /// How often the scheduler should call `fetch()`.
    fn poll_interval(&self) -> Duration;
}
