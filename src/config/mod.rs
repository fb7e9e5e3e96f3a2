use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default REST base address of the cookbook service.
pub const DEFAULT_ADDRESS: &str = "http://devkit-cookbook.cloudhub.io/rest";

/// Complete connector configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CookbookConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Remote service connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_address")]
    pub address: String,
    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// OAuth 2.0 endpoints and scopes of the cookbook service.
///
/// Client id and secret are never read from the config file; they come from
/// `COOKBOOK_OAUTH_CLIENT_ID` / `COOKBOOK_OAUTH_CLIENT_SECRET`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(skip)]
    pub client_id: Option<String>,
    #[serde(skip)]
    pub client_secret: Option<String>,
}

fn default_auth_url() -> String {
    format!("{}/oauth/authorize", DEFAULT_ADDRESS)
}

fn default_token_url() -> String {
    format!("{}/oauth/accessToken", DEFAULT_ADDRESS)
}

fn default_scopes() -> Vec<String> {
    vec!["RECIPE".to_string(), "INGREDIENT".to_string()]
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            scopes: default_scopes(),
            client_id: None,
            client_secret: None,
        }
    }
}

/// Recently-added feed polling
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_polling_enabled")]
    pub enabled: bool,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_polling_enabled() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    10_000
}

impl PollingConfig {
    /// Poll period; a zero interval from the config file is raised to 1 ms.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: default_polling_enabled(),
            interval_ms: default_interval_ms(),
        }
    }
}

/// Operation surface (HTTP API)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
}

fn default_api_port() -> u16 {
    3002
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
        }
    }
}

impl CookbookConfig {
    /// Loads configuration: the TOML file named by `COOKBOOK_CONFIG` if set
    /// (defaults otherwise), then environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("COOKBOOK_CONFIG") {
            Ok(path) => load_config(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `COOKBOOK_*` overrides read through `lookup`.
    ///
    /// Values that fail to parse are ignored and the current value is kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("COOKBOOK_ADDRESS") {
            self.service.address = v;
        }
        if let Some(n) = lookup("COOKBOOK_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.service.timeout_secs = n;
        }
        if let Some(v) = lookup("COOKBOOK_OAUTH_AUTH_URL") {
            self.oauth.auth_url = v;
        }
        if let Some(v) = lookup("COOKBOOK_OAUTH_TOKEN_URL") {
            self.oauth.token_url = v;
        }
        if let Some(v) = lookup("COOKBOOK_OAUTH_CLIENT_ID") {
            self.oauth.client_id = Some(v);
        }
        if let Some(v) = lookup("COOKBOOK_OAUTH_CLIENT_SECRET") {
            self.oauth.client_secret = Some(v);
        }
        if let Some(b) = lookup("COOKBOOK_POLLING_ENABLED").and_then(|v| v.parse().ok()) {
            self.polling.enabled = b;
        }
        if let Some(n) = lookup("COOKBOOK_POLL_INTERVAL_MS")
            .and_then(|v| v.parse().ok())
            .filter(|n: &u64| *n > 0)
        {
            self.polling.interval_ms = n;
        }
        if let Some(n) = lookup("COOKBOOK_API_PORT").and_then(|v| v.parse().ok()) {
            self.api.port = n;
        }
    }
}

/// Load configuration from TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CookbookConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CookbookConfig::default();
        assert_eq!(config.service.address, DEFAULT_ADDRESS);
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
        assert!(config.oauth.token_url.ends_with("/oauth/accessToken"));
        assert_eq!(config.oauth.scopes, vec!["RECIPE", "INGREDIENT"]);
        assert!(config.polling.enabled);
        assert_eq!(config.polling.interval_ms, 10_000);
        assert_eq!(config.api.port, 3002);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [service]
            address = "http://localhost:9090/rest"
            timeout_secs = 5

            [oauth]
            token_url = "http://localhost:9090/rest/oauth/accessToken"
            scopes = ["RECIPE"]

            [polling]
            enabled = false
            interval_ms = 2500

            [api]
            port = 4000
        "#;

        let config: CookbookConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.service.address, "http://localhost:9090/rest");
        assert_eq!(config.service.timeout_secs, 5);
        assert_eq!(config.oauth.scopes, vec!["RECIPE"]);
        assert_eq!(config.oauth.auth_url, default_auth_url());
        assert!(!config.polling.enabled);
        assert_eq!(config.polling.interval_ms, 2500);
        assert_eq!(config.api.port, 4000);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [polling]
            interval_ms = 500
        "#;

        let config: CookbookConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.polling.interval_ms, 500);
        assert!(config.polling.enabled); // Default
        assert_eq!(config.service.address, DEFAULT_ADDRESS); // Default
    }

    #[test]
    fn test_client_secret_not_read_from_file() {
        let toml = r#"
            [oauth]
            client_secret = "leaked"
        "#;

        let config: CookbookConfig = toml::from_str(toml).unwrap();
        assert!(config.oauth.client_secret.is_none());
    }

    #[test]
    fn test_apply_overrides() {
        let env: HashMap<&str, &str> = [
            ("COOKBOOK_ADDRESS", "http://cookbook.local/rest"),
            ("COOKBOOK_OAUTH_CLIENT_ID", "client"),
            ("COOKBOOK_OAUTH_CLIENT_SECRET", "secret"),
            ("COOKBOOK_POLL_INTERVAL_MS", "1500"),
            ("COOKBOOK_POLLING_ENABLED", "false"),
            ("COOKBOOK_API_PORT", "not-a-port"),
        ]
        .into_iter()
        .collect();

        let mut config = CookbookConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.service.address, "http://cookbook.local/rest");
        assert_eq!(config.oauth.client_id.as_deref(), Some("client"));
        assert_eq!(config.oauth.client_secret.as_deref(), Some("secret"));
        assert_eq!(config.polling.interval_ms, 1500);
        assert!(!config.polling.enabled);
        assert_eq!(config.api.port, 3002); // Unparsable value ignored
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = CookbookConfig::default();
        config.apply_overrides(|key| {
            (key == "COOKBOOK_POLL_INTERVAL_MS").then(|| "0".to_string())
        });
        assert_eq!(config.polling.interval_ms, 10_000);

        let config: CookbookConfig = toml::from_str("[polling]\ninterval_ms = 0").unwrap();
        assert_eq!(config.polling.interval_ms, 0);
        assert_eq!(config.polling.interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nport = 3100").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.api.port, 3100);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/cookbook.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
