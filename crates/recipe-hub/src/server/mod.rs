//! HTTP server: router, shared state and lifecycle.
//!
//! Every request passes through the session middleware first, so handlers and
//! the gate guards can rely on a [`crate::session::SessionHandle`] in the request extensions.
//! Protected routes are grouped under route layers:
//! - `/quiz*` behind [`guards::authenticated`] (denial redirects to `/login`)
//! - `/admin*` behind [`guards::admin`] (denial redirects to `/`)

pub mod guards;
pub mod handlers;
pub mod views;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{Argon2Hasher, Authenticator};
use crate::client::FatSecretClient;
use crate::config::Config;
use crate::quiz::{QuizEngine, ShareSigner};
use crate::session::{MemorySessionStore, SessionLayer, SessionStore, layer::session_middleware};
use crate::store::{CredentialStore, QuestionBank};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: Authenticator,
    pub quiz: QuizEngine,
    pub share: ShareSigner,
    pub recipes: FatSecretClient,
    pub sessions: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth", &self.auth)
            .field("quiz", &self.quiz)
            .field("recipes", &self.recipes)
            .finish_non_exhaustive()
    }
}

/// The recipe hub web server.
pub struct Server {
    state: AppState,
    session_layer: SessionLayer,
}

impl Server {
    /// Wire up the services over a store that holds both users and quiz questions.
    ///
    /// # Errors
    ///
    /// Returns error if the hasher or the HTTP client cannot be initialized.
    pub fn new<S>(config: &Config, store: Arc<S>) -> anyhow::Result<Self>
    where
        S: CredentialStore + QuestionBank + 'static,
    {
        if config.uses_default_secret() {
            tracing::warn!("SESSION_SECRET is not set; using the built-in default secret");
        }
        if !config.has_credentials() {
            tracing::warn!("FatSecret credentials are not set; recipe search will fail");
        }

        let hasher = Arc::new(Argon2Hasher::new(config.hasher_cost)?);
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let bank: Arc<dyn QuestionBank> = store;

        let auth = Authenticator::new(credentials, hasher, config.admin_username.clone())?;
        let quiz = QuizEngine::new(bank, config.quiz_size, config.quiz_time_limit, config.quiz_grace);
        let share = ShareSigner::new(&config.session_secret);
        let recipes = FatSecretClient::new(config)?;

        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(config.session_ttl));
        let session_layer = SessionLayer::new(Arc::clone(&sessions), &config.session_secret, config.cookie_secure);

        Ok(Self { state: AppState { auth, quiz, share, recipes, sessions }, session_layer })
    }

    /// Shared handler state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router.
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(self.state.clone(), self.session_layer.clone())
    }

    /// Serve until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run(self, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        tracing::info!("HTTP server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server").field("state", &self.state).finish()
    }
}

/// Create the application router.
pub fn create_router(state: AppState, session_layer: SessionLayer) -> Router {
    let members = Router::new()
        .route("/quiz", get(handlers::quiz))
        .route("/quiz/submit", post(handlers::quiz_submit))
        .route_layer(from_fn(guards::authenticated));

    let admin = Router::new()
        .route("/admin", get(handlers::admin_page))
        .route("/admin/add-user", post(handlers::add_user))
        .route("/admin/delete-user/{id}", post(handlers::delete_user))
        .route_layer(from_fn(guards::admin));

    Router::new()
        .route("/", get(handlers::home))
        .route("/index", get(handlers::home))
        .route("/register", get(handlers::register_page).post(handlers::register))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/search", post(handlers::search))
        .route("/share", get(handlers::share))
        .route("/health", get(handlers::health))
        .merge(members)
        .merge(admin)
        .layer(from_fn_with_state(session_layer, session_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `302 Found` to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Received shutdown signal");
}
