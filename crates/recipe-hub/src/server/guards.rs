//! Route-layer middleware adapting [`crate::auth::gate`] checks to redirects.

use axum::extract::{Extension, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::{Access, require_admin, require_authenticated};
use crate::error::{AppError, AuthError};
use crate::session::{SessionData, SessionHandle};

async fn guard(
    session: &SessionHandle,
    check: fn(&SessionData) -> Access<'_>,
    req: Request,
    next: Next,
) -> Response {
    let data = session.data().await;
    match check(&data) {
        Access::Granted(_) => next.run(req).await,
        Access::Denied(denial) => {
            tracing::debug!(path = %req.uri().path(), redirect_to = denial.redirect_to, "Access denied");
            AppError::from(AuthError::from(denial)).into_response()
        }
    }
}

/// Let logged-in users through; send everyone else to the login page.
pub async fn authenticated(
    Extension(session): Extension<SessionHandle>,
    req: Request,
    next: Next,
) -> Response {
    guard(&session, require_authenticated, req, next).await
}

/// Let administrators through; send everyone else home.
pub async fn admin(Extension(session): Extension<SessionHandle>, req: Request, next: Next) -> Response {
    guard(&session, require_admin, req, next).await
}
