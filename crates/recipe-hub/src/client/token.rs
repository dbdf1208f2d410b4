//! OAuth2 client-credentials token manager.
//!
//! Owns the cached access token. Under [`TokenCachePolicy::ReuseUntilExpiry`]
//! the cache mutex is held across the refresh, so concurrent callers wait for
//! one in-flight exchange instead of each hitting the token endpoint.

use std::str::FromStr;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{check_status, send};
use crate::config::api;
use crate::error::{ApiError, ClientResult};

/// Subtracted from `expires_in` so a token is not used in its last seconds.
const EXPIRY_SKEW: Duration = Duration::from_secs(30);

/// How access tokens are reused between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TokenCachePolicy {
    /// Reuse the cached token while it is unexpired; refetch afterwards.
    #[default]
    ReuseUntilExpiry,
    /// Exchange credentials on every call; the expiry is recorded but unused.
    AlwaysRefetch,
}

impl FromStr for TokenCachePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "reuse-until-expiry" | "reuse" => Ok(Self::ReuseUntilExpiry),
            "always-refetch" | "refetch" => Ok(Self::AlwaysRefetch),
            other => anyhow::bail!("unknown token cache policy: {other}"),
        }
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    /// Seconds; a missing value means the token is never reused.
    #[serde(default)]
    expires_in: u64,
}

/// A token and the instant it stops being reusable.
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken").field("expires_at", &self.expires_at).finish()
    }
}

/// Client credentials for the token endpoint.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Obtains and caches FatSecret access tokens.
pub struct TokenManager {
    http: ClientWithMiddleware,
    token_url: String,
    credentials: ClientCredentials,
    policy: TokenCachePolicy,
    cache: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    #[must_use]
    pub fn new(
        http: ClientWithMiddleware,
        token_url: impl Into<String>,
        credentials: ClientCredentials,
        policy: TokenCachePolicy,
    ) -> Self {
        Self { http, token_url: token_url.into(), credentials, policy, cache: Mutex::new(None) }
    }

    /// Active caching policy.
    #[must_use]
    pub const fn policy(&self) -> TokenCachePolicy {
        self.policy
    }

    /// Return a usable access token, exchanging credentials when needed.
    pub async fn access_token(&self) -> Result<String, ApiError> {
        self.token().await.map_err(|e| {
            tracing::error!(error = %e, "Error fetching access token");
            ApiError::TokenFetchFailed(e)
        })
    }

    /// Forget the cached token so the next call exchanges credentials again.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    /// Currently cached token, if any.
    pub async fn cached(&self) -> Option<AccessToken> {
        self.cache.lock().await.clone()
    }

    pub(crate) async fn token(&self) -> ClientResult<String> {
        match self.policy {
            TokenCachePolicy::ReuseUntilExpiry => {
                let mut cache = self.cache.lock().await;
                if let Some(token) = cache.as_ref().filter(|t| t.is_fresh(Instant::now())) {
                    tracing::trace!("Reusing cached access token");
                    return Ok(token.value.clone());
                }
                let token = self.exchange().await?;
                let value = token.value.clone();
                *cache = Some(token);
                Ok(value)
            }
            TokenCachePolicy::AlwaysRefetch => {
                let token = self.exchange().await?;
                let value = token.value.clone();
                *self.cache.lock().await = Some(token);
                Ok(value)
            }
        }
    }

    /// One client-credentials exchange.
    async fn exchange(&self) -> ClientResult<AccessToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("scope", api::SCOPE),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];
        let body = serde_urlencoded::to_string(form)?;

        let started = Instant::now();
        let request = self
            .http
            .post(&self.token_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);
        let response = check_status(send(request).await?).await?;
        let parsed: TokenResponse = serde_json::from_slice(&response.bytes().await?)?;

        let lifetime = Duration::from_secs(parsed.expires_in).saturating_sub(EXPIRY_SKEW);
        tracing::debug!(
            token_type = parsed.token_type.as_deref().unwrap_or("Bearer"),
            expires_in = parsed.expires_in,
            "Obtained access token"
        );

        Ok(AccessToken { value: parsed.access_token, expires_at: started + lifetime })
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "reuse-until-expiry".parse::<TokenCachePolicy>().unwrap(),
            TokenCachePolicy::ReuseUntilExpiry
        );
        assert_eq!("ALWAYS_REFETCH".parse::<TokenCachePolicy>().unwrap(), TokenCachePolicy::AlwaysRefetch);
        assert!("sometimes".parse::<TokenCachePolicy>().is_err());
    }

    #[test]
    fn test_freshness() {
        let now = Instant::now();
        let token = AccessToken { value: "t".into(), expires_at: now + Duration::from_secs(10) };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + Duration::from_secs(10)));
    }

    #[test]
    fn test_token_response_without_expiry() {
        let parsed: TokenResponse = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(parsed.expires_in, 0);
        assert!(parsed.token_type.is_none());
    }

    #[test]
    fn test_debug_hides_token_value() {
        let token = AccessToken { value: "super-secret-token".into(), expires_at: Instant::now() };
        assert!(!format!("{token:?}").contains("super-secret-token"));
    }
}
