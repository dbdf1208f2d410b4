//! Error types for the recipe hub.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::Denial;

/// Errors from the document store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The backing store could not be reached or loaded.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// File I/O failure.
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be (de)serialized.
    #[error("Store document error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Authentication and authorization failures.
///
/// None of these reach the client as raw errors: handlers turn them into
/// re-rendered forms or redirects.
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// Registration with a username that already exists.
    #[error("Username already exists")]
    DuplicateUsername,

    /// Unknown user or wrong password (deliberately indistinguishable).
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Form input rejected before touching the store.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Session gate denial, answered with a redirect rather than a 403.
    #[error("Not authorized")]
    NotAuthorized { redirect_to: &'static str },

    /// Store failure underneath an auth operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Password hashing failed or the blocking task was lost.
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl AuthError {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Message shown on the re-rendered form, if this failure is user-facing.
    #[must_use]
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateUsername => Some("Username already exists!"),
            Self::InvalidCredentials => Some("Invalid username or password!"),
            Self::InvalidInput(_) => Some("Username and password are required."),
            _ => None,
        }
    }
}

impl From<Denial> for AuthError {
    fn from(denial: Denial) -> Self {
        Self::NotAuthorized { redirect_to: denial.redirect_to }
    }
}

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Token endpoint or API rejected the credentials (401/403)
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Rate limited by the API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Form encoding error
    #[error("Failed to encode form: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),

    /// API answered 200 with an error document
    #[error("API error {code}: {message}")]
    Api {
        /// FatSecret error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns true if the remote side rejected our credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Failures of the outbound FatSecret integration.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The client-credentials exchange failed.
    #[error("Failed to retrieve access token: {0}")]
    TokenFetchFailed(#[source] ClientError),

    /// The search call failed, or no token could be obtained for it.
    #[error("Failed to fetch recipes: {0}")]
    SearchFailed(#[source] Box<SearchFailure>),
}

/// Cause of a failed recipe search.
#[derive(thiserror::Error, Debug)]
pub enum SearchFailure {
    /// No token could be obtained; the search request was never sent.
    #[error("no access token: {0}")]
    Token(ClientError),

    /// The search request itself failed.
    #[error("{0}")]
    Request(ClientError),
}

impl ApiError {
    /// Wrap a token failure that aborted a search.
    #[must_use]
    pub fn search_without_token(err: ClientError) -> Self {
        Self::SearchFailed(Box::new(SearchFailure::Token(err)))
    }

    /// Wrap a failed search request.
    #[must_use]
    pub fn search_request(err: ClientError) -> Self {
        Self::SearchFailed(Box::new(SearchFailure::Request(err)))
    }

    /// Returns true if a retry could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TokenFetchFailed(e) => e.is_retryable(),
            Self::SearchFailed(failure) => match failure.as_ref() {
                SearchFailure::Token(e) | SearchFailure::Request(e) => e.is_retryable(),
            },
        }
    }
}

/// Quiz grading failures.
#[derive(thiserror::Error, Debug)]
pub enum QuizError {
    /// The submission arrived after the server-side deadline.
    #[error("Quiz deadline exceeded by {overdue:?}")]
    DeadlineExceeded {
        /// How far past the deadline the submission was
        overdue: Duration,
    },

    /// Question bank failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Route-level error rendered as an HTTP response.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// External API failure, surfaced as a generic 500.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Auth failure that was not handled as a form message.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Quiz grading failure.
    #[error(transparent)]
    Quiz(#[from] QuizError),

    /// Client sent something unusable.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Api(ApiError::TokenFetchFailed(ref e)) => token_failure(e),
            Self::Api(ApiError::SearchFailed(failure)) => match *failure {
                SearchFailure::Token(ref e) => token_failure(e),
                SearchFailure::Request(ref e) => {
                    tracing::error!(error = %e, "Error fetching recipes");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recipes.").into_response()
                }
            },
            Self::Quiz(QuizError::DeadlineExceeded { overdue }) => {
                tracing::warn!(overdue = ?overdue, "Rejected late quiz submission");
                (StatusCode::BAD_REQUEST, "Quiz time limit exceeded.").into_response()
            }
            Self::Auth(AuthError::NotAuthorized { redirect_to }) => crate::server::found(redirect_to),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            other => {
                tracing::error!(error = %other, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.").into_response()
            }
        }
    }
}

fn token_failure(err: &ClientError) -> Response {
    tracing::error!(error = %err, "Error fetching access token");
    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve access token.").into_response()
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_retryable() {
        assert!(ClientError::rate_limited(60).is_retryable());
        assert!(ClientError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(ClientError::server(500, "Internal error").is_retryable());

        let unauthorized = ClientError::Unauthorized { status: 401, message: "nope".into() };
        assert!(!unauthorized.is_retryable());
        assert!(unauthorized.is_unauthorized());
    }

    #[test]
    fn test_search_failure_keeps_retryability() {
        let err = ApiError::search_request(ClientError::Timeout(Duration::from_secs(5)));
        assert!(err.is_retryable());

        let err = ApiError::search_without_token(ClientError::Unauthorized {
            status: 401,
            message: String::new(),
        });
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_auth_error_user_messages() {
        assert_eq!(AuthError::DuplicateUsername.user_message(), Some("Username already exists!"));
        assert_eq!(
            AuthError::InvalidCredentials.user_message(),
            Some("Invalid username or password!")
        );
        assert_eq!(AuthError::Hashing("boom".into()).user_message(), None);
    }

    #[test]
    fn test_app_error_status_codes() {
        let resp = AppError::Api(ApiError::TokenFetchFailed(ClientError::server(502, ""))).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = AppError::bad_request("bad signature").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let late = QuizError::DeadlineExceeded { overdue: Duration::from_secs(5) };
        assert_eq!(AppError::from(late).into_response().status(), StatusCode::BAD_REQUEST);

        let store = QuizError::Store(StoreError::unavailable("down"));
        assert_eq!(AppError::from(store).into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_authorized_redirects() {
        let denied = AuthError::from(Denial { redirect_to: "/login" });
        assert_eq!(denied.user_message(), None);

        let resp = AppError::from(denied).into_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[axum::http::header::LOCATION], "/login");
    }
}
