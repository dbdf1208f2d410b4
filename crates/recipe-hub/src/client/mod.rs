//! FatSecret Platform API client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff for transient failures
//! - Explicit request and connect timeouts
//! - OAuth2 client-credentials tokens via [`TokenManager`]

mod token;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, api};
use crate::error::{ApiError, ClientError, ClientResult};
use crate::models::{ApiErrorResponse, Recipe, RecipeSearchResponse};

pub use token::{AccessToken, ClientCredentials, TokenCachePolicy, TokenManager};

/// FatSecret error codes meaning the bearer token was not accepted.
const TOKEN_REJECTED_CODES: &[i64] = &[13, 14];

/// FatSecret REST client.
#[derive(Clone)]
pub struct FatSecretClient {
    /// HTTP client with middleware.
    http: ClientWithMiddleware,

    /// Token manager shared by every outbound call.
    tokens: Arc<TokenManager>,

    /// REST endpoint.
    api_url: String,

    /// Request timeout, reported in timeout errors.
    timeout: Duration,
}

impl FatSecretClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(200), Duration::from_secs(5))
            .build_with_max_retries(config.max_retries);

        let http = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let tokens = TokenManager::new(
            http.clone(),
            config.token_url.clone(),
            ClientCredentials {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            },
            config.token_policy,
        );

        Ok(Self {
            http,
            tokens: Arc::new(tokens),
            api_url: config.api_url.clone(),
            timeout: config.request_timeout,
        })
    }

    /// Token manager backing this client.
    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Obtain an access token.
    ///
    /// # Errors
    ///
    /// Returns `TokenFetchFailed` on transport, status or parse failure.
    pub async fn access_token(&self) -> Result<String, ApiError> {
        self.tokens.access_token().await
    }

    /// Search recipes by free text.
    ///
    /// A token failure aborts before the search request is sent. A token the
    /// API rejects is dropped from the cache and the search retried once.
    ///
    /// # Errors
    ///
    /// Returns `SearchFailed` on any failure.
    pub async fn search_recipes(&self, query: &str) -> Result<Vec<Recipe>, ApiError> {
        let token = self.tokens.token().await.map_err(|e| {
            tracing::error!(error = %e, "Error fetching access token");
            ApiError::search_without_token(e)
        })?;

        match self.search_with_token(query, &token).await {
            Err(e) if token_rejected(&e) => {
                tracing::warn!(error = %e, "Access token rejected, refreshing");
                self.tokens.invalidate().await;
                let token = self.tokens.token().await.map_err(ApiError::search_without_token)?;
                self.search_with_token(query, &token).await.map_err(ApiError::search_request)
            }
            other => other.map_err(ApiError::search_request),
        }
    }

    async fn search_with_token(&self, query: &str, token: &str) -> ClientResult<Vec<Recipe>> {
        let params = [
            ("method", "recipes.search"),
            ("search_expression", query),
            ("format", "json"),
        ];

        let request = self
            .http
            .get(&self.api_url)
            .query(&params)
            .header(AUTHORIZATION, format!("Bearer {token}"));

        let response = check_status(self.send(request).await?).await?;
        let value: serde_json::Value = serde_json::from_slice(&response.bytes().await?)?;

        if value.get("error").is_some() {
            let err: ApiErrorResponse = serde_json::from_value(value)?;
            return Err(ClientError::Api { code: err.error.code, message: err.error.message });
        }

        let parsed: RecipeSearchResponse = serde_json::from_value(value)?;
        let recipes = parsed.into_recipes();
        tracing::debug!(query = %query, results = recipes.len(), "Recipe search completed");
        Ok(recipes)
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<reqwest::Response> {
        send(request).await.map_err(|e| match e {
            ClientError::Http(ref inner) if inner.is_timeout() => ClientError::Timeout(self.timeout),
            other => other,
        })
    }
}

fn token_rejected(err: &ClientError) -> bool {
    match err {
        ClientError::Api { code, .. } => TOKEN_REJECTED_CODES.contains(code),
        other => other.is_unauthorized(),
    }
}

/// Send through the middleware stack, unwrapping transport errors.
pub(crate) async fn send(request: RequestBuilder) -> ClientResult<reqwest::Response> {
    match request.send().await {
        Ok(response) => Ok(response),
        Err(reqwest_middleware::Error::Reqwest(e)) => Err(ClientError::Http(e)),
        Err(e) => Err(ClientError::Middleware(e)),
    }
}

/// Map non-success statuses to client errors.
pub(crate) async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 | 403 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::Unauthorized { status: status.as_u16(), message: text })
        }
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            Err(ClientError::rate_limited(retry_after))
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
        }
    }
}

impl std::fmt::Debug for FatSecretClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FatSecretClient")
            .field("api_url", &self.api_url)
            .field("policy", &self.tokens.policy())
            .finish()
    }
}
