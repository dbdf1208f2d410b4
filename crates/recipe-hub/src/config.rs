//! Configuration for the recipe hub server.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::client::TokenCachePolicy;

/// FatSecret Platform API constants.
pub mod api {
    use std::time::Duration;

    /// OAuth2 token endpoint.
    pub const TOKEN_URL: &str = "https://oauth.fatsecret.com/connect/token";

    /// REST method endpoint.
    pub const API_URL: &str = "https://platform.fatsecret.com/rest/server.api";

    /// Scope requested with the client-credentials grant.
    pub const SCOPE: &str = "basic";

    /// Request timeout for token and search calls.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Retries for transient transport failures.
    pub const MAX_RETRIES: u32 = 2;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Site-level constants.
pub mod site {
    use std::time::Duration;

    /// Username granted the admin flag on self-registration.
    pub const ADMIN_USERNAME: &str = "Rustemdastan";

    /// Fallback session secret when none is configured.
    pub const DEFAULT_SESSION_SECRET: &str = "default_secret";

    /// Session idle lifetime.
    pub const SESSION_TTL: Duration = Duration::from_secs(24 * 3600);

    /// Maximum number of live sessions kept in memory.
    pub const SESSION_MAX_CAPACITY: u64 = 10_000;

    /// Questions drawn per quiz.
    pub const QUIZ_SIZE: usize = 5;

    /// Quiz time limit shown to the client (seconds).
    pub const QUIZ_TIME_LIMIT: Duration = Duration::from_secs(60);

    /// Slack added to the time limit before the server rejects a submission.
    pub const QUIZ_GRACE: Duration = Duration::from_secs(10);

    /// Default locale.
    pub const DEFAULT_LANG: &str = "en";
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherCost {
    /// Memory in KiB.
    pub memory_kib: u32,
    /// Iterations.
    pub iterations: u32,
    /// Lanes.
    pub parallelism: u32,
}

impl HasherCost {
    /// OWASP-recommended Argon2id baseline.
    pub const PRODUCTION: Self = Self { memory_kib: 19 * 1024, iterations: 2, parallelism: 1 };

    /// Cheap parameters so tests do not burn CPU.
    pub const TESTING: Self = Self { memory_kib: 1024, iterations: 1, parallelism: 1 };
}

/// Server configuration.
#[derive(Clone)]
pub struct Config {
    /// FatSecret OAuth client id.
    pub client_id: String,

    /// FatSecret OAuth client secret.
    pub client_secret: String,

    /// Token endpoint (overridable for mock servers).
    pub token_url: String,

    /// REST endpoint (overridable for mock servers).
    pub api_url: String,

    /// How the access token is cached between calls.
    pub token_policy: TokenCachePolicy,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Retries for transient failures.
    pub max_retries: u32,

    /// Secret the session cookie key and share signatures derive from.
    pub session_secret: String,

    /// Whether the session cookie carries the `Secure` flag.
    pub cookie_secure: bool,

    /// Session idle lifetime.
    pub session_ttl: Duration,

    /// Username granted admin on self-registration.
    pub admin_username: String,

    /// Directory holding `users.json` and `questions.json`.
    pub data_dir: PathBuf,

    /// Argon2 cost parameters.
    pub hasher_cost: HasherCost,

    /// Questions drawn per quiz.
    pub quiz_size: usize,

    /// Quiz time limit.
    pub quiz_time_limit: Duration,

    /// Grace period on top of the time limit.
    pub quiz_grace: Duration,
}

impl Config {
    /// Create a configuration with the given FatSecret credentials and defaults for the rest.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: api::TOKEN_URL.to_string(),
            api_url: api::API_URL.to_string(),
            token_policy: TokenCachePolicy::default(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            max_retries: api::MAX_RETRIES,
            session_secret: site::DEFAULT_SESSION_SECRET.to_string(),
            cookie_secure: false,
            session_ttl: site::SESSION_TTL,
            admin_username: site::ADMIN_USERNAME.to_string(),
            data_dir: PathBuf::from("data"),
            hasher_cost: HasherCost::PRODUCTION,
            quiz_size: site::QUIZ_SIZE,
            quiz_time_limit: site::QUIZ_TIME_LIMIT,
            quiz_grace: site::QUIZ_GRACE,
        }
    }

    /// Create a test configuration pointing the FatSecret endpoints at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            token_url: format!("{}/connect/token", base_url),
            api_url: format!("{}/rest/server.api", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            max_retries: 0, // Failures surface immediately in tests
            session_secret: "test-session-secret".to_string(),
            hasher_cost: HasherCost::TESTING,
            data_dir: std::env::temp_dir(),
            ..Self::new("test-client", "test-secret")
        }
    }

    /// Create configuration from environment variables (a `.env` file is honoured).
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let client_id = std::env::var("FATSECRET_CLIENT_ID").unwrap_or_default();
        let client_secret = std::env::var("FATSECRET_CLIENT_SECRET").unwrap_or_default();
        let mut config = Self::new(client_id, client_secret);

        if let Ok(url) = std::env::var("FATSECRET_TOKEN_URL") {
            config.token_url = validated_url(&url)?;
        }
        if let Ok(url) = std::env::var("FATSECRET_API_URL") {
            config.api_url = validated_url(&url)?;
        }
        if let Ok(policy) = std::env::var("TOKEN_CACHE_POLICY") {
            config.token_policy = TokenCachePolicy::from_str(&policy)?;
        }
        if let Ok(secret) = std::env::var("SESSION_SECRET") {
            config.session_secret = secret;
        }
        if let Ok(secure) = std::env::var("COOKIE_SECURE") {
            config.cookie_secure = matches!(secure.as_str(), "1" | "true" | "yes");
        }
        if let Ok(admin) = std::env::var("ADMIN_USERNAME") {
            config.admin_username = admin;
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Check if FatSecret credentials are configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Whether the session secret is still the built-in fallback.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.session_secret == site::DEFAULT_SESSION_SECRET
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("has_credentials", &self.has_credentials())
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .field("token_policy", &self.token_policy)
            .field("cookie_secure", &self.cookie_secure)
            .field("admin_username", &self.admin_username)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

fn validated_url(raw: &str) -> anyhow::Result<String> {
    let parsed = url::Url::parse(raw)?;
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.has_credentials());
        assert!(!config.cookie_secure);
        assert!(config.uses_default_secret());
        assert_eq!(config.token_policy, TokenCachePolicy::ReuseUntilExpiry);
    }

    #[test]
    fn test_config_with_credentials() {
        let config = Config::new("id", "secret");
        assert!(config.has_credentials());
        assert_eq!(config.token_url, api::TOKEN_URL);
    }

    #[test]
    fn test_for_testing_points_at_mock() {
        let config = Config::for_testing("http://127.0.0.1:9999");
        assert_eq!(config.token_url, "http://127.0.0.1:9999/connect/token");
        assert_eq!(config.api_url, "http://127.0.0.1:9999/rest/server.api");
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.hasher_cost, HasherCost::TESTING);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut config = Config::new("id", "very-secret-value");
        config.session_secret = "cookie-secret-value".into();
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret-value"));
        assert!(!debug.contains("cookie-secret-value"));
    }

    #[test]
    fn test_validated_url_rejects_garbage() {
        assert!(validated_url("not a url").is_err());
        assert!(validated_url("https://example.com/token").is_ok());
    }
}
