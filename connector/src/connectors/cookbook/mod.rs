pub mod api;
pub mod transformer;

use crate::{Connector, Credentials, OAuthConfig};
use async_trait::async_trait;
use cookbook::config::CookbookConfig;
use cookbook::{CookbookResult, EntityDispatcher, GenericRecord};
use reqwest::Client;
use std::time::Duration;

use self::api::{build_http_client, CookbookApi};

/// Cookbook connector: CRUD dispatch against the cookbook REST API and a
/// polling feed of recently added recipes.
pub struct CookbookConnector {
    base_url: String,
    http_client: Client,
    oauth: OAuthConfig,
    poll_interval: Duration,
}

impl CookbookConnector {
    /// Create a connector from the loaded configuration.
    pub fn new(config: &CookbookConfig) -> CookbookResult<Self> {
        Ok(Self {
            base_url: config.service.address.clone(),
            http_client: build_http_client(config.service.timeout())?,
            oauth: config.oauth.clone(),
            poll_interval: config.polling.interval(),
        })
    }

    /// Create a connector with a custom API base URL and default settings
    /// otherwise (for testing).
    pub fn with_base_url(base_url: String) -> CookbookResult<Self> {
        let mut config = CookbookConfig::default();
        config.service.address = base_url;
        Self::new(&config)
    }

    /// Dispatcher bound to the given credentials.
    ///
    /// Cheap to build: the underlying HTTP connection pool is shared.
    pub fn dispatcher(&self, credentials: &Credentials) -> EntityDispatcher<CookbookApi> {
        EntityDispatcher::new(CookbookApi::new(
            self.http_client.clone(),
            &self.base_url,
            credentials.access_token.clone(),
        ))
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }
}

#[async_trait]
impl Connector for CookbookConnector {
    fn name(&self) -> &str {
        "cookbook"
    }

    fn oauth_config(&self) -> OAuthConfig {
        self.oauth.clone()
    }

    async fn fetch(&self, credentials: &Credentials) -> CookbookResult<Vec<GenericRecord>> {
        self.dispatcher(credentials).recently_added().await
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
