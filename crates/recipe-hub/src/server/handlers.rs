//! Route handlers.

use axum::Json;
use axum::extract::{Extension, Form, Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use super::{AppState, found, views};
use crate::error::{AppError, AuthError};
use crate::models::{QuizResult, QuizSubmission};
use crate::session::SessionHandle;

type HandlerResult = Result<Response, AppError>;

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AddUserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// HTML checkbox: present as `on` when ticked.
    #[serde(default)]
    pub admin: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    pub score: u32,
    pub total: u32,
    #[serde(default)]
    pub sig: String,
}

/// Turn a form-level auth failure into its message, or escalate.
fn form_message(err: AuthError) -> Result<&'static str, AppError> {
    err.user_message().ok_or(AppError::Auth(err))
}

// ─── Public pages ────────────────────────────────────────────────────────────

/// `GET /` and `GET /index`
pub async fn home(Extension(session): Extension<SessionHandle>) -> Html<String> {
    let data = session.data().await;
    Html(views::render_home(data.user.as_ref(), &data.lang, None))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "recipe-hub",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.count().await,
    }))
}

/// `POST /search`
pub async fn search(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<SearchForm>,
) -> HandlerResult {
    let recipes = state.recipes.search_recipes(&form.query).await?;
    let data = session.data().await;
    Ok(Html(views::render_home(data.user.as_ref(), &data.lang, Some(&recipes))).into_response())
}

/// `GET /share`
pub async fn share(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Query(query): Query<ShareQuery>,
) -> HandlerResult {
    let result = QuizResult { score: query.score, total: query.total };
    if !state.share.verify(result, &query.sig) {
        tracing::warn!(score = result.score, total = result.total, "Rejected unsigned share link");
        return Err(AppError::bad_request("Invalid share link."));
    }
    Ok(Html(views::render_share(result, &session.lang().await)).into_response())
}

// ─── Registration & login ────────────────────────────────────────────────────

/// `GET /register`
pub async fn register_page(Extension(session): Extension<SessionHandle>) -> Html<String> {
    Html(views::render_register(None, &session.lang().await))
}

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<CredentialsForm>,
) -> HandlerResult {
    match state.auth.register(&form.username, &form.password).await {
        Ok(_) => Ok(found("/login")),
        Err(e) => {
            let message = form_message(e)?;
            Ok(Html(views::render_register(Some(message), &session.lang().await)).into_response())
        }
    }
}

/// `GET /login`
pub async fn login_page(Extension(session): Extension<SessionHandle>) -> Html<String> {
    Html(views::render_login(None, &session.lang().await))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<CredentialsForm>,
) -> HandlerResult {
    match state.auth.login(form.username.trim(), &form.password).await {
        Ok(user) => {
            session.login(&user).await;
            Ok(found("/index"))
        }
        Err(e) => {
            let message = form_message(e)?;
            Ok(Html(views::render_login(Some(message), &session.lang().await)).into_response())
        }
    }
}

/// `GET /logout`
pub async fn logout(State(state): State<AppState>, Extension(session): Extension<SessionHandle>) -> Response {
    state.auth.logout(&session).await;
    found("/login")
}

// ─── Admin ───────────────────────────────────────────────────────────────────

async fn admin_view(state: &AppState, session: &SessionHandle, message: Option<&str>) -> HandlerResult {
    let users = state.auth.list_users().await?;
    Ok(Html(views::render_admin(&users, message, &session.lang().await)).into_response())
}

/// `GET /admin`
pub async fn admin_page(State(state): State<AppState>, Extension(session): Extension<SessionHandle>) -> HandlerResult {
    admin_view(&state, &session, None).await
}

/// `POST /admin/add-user`
pub async fn add_user(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<AddUserForm>,
) -> HandlerResult {
    let is_admin = form.admin.as_deref() == Some("on");
    match state.auth.add_user(&form.username, &form.password, is_admin).await {
        Ok(_) => Ok(found("/admin")),
        Err(e) => {
            let message = form_message(e)?;
            admin_view(&state, &session, Some(message)).await
        }
    }
}

/// `POST /admin/delete-user/{id}`
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    if !state.auth.delete_user(&id).await? {
        tracing::debug!(user_id = %id, "Delete requested for unknown user");
    }
    Ok(found("/admin"))
}

// ─── Quiz ────────────────────────────────────────────────────────────────────

/// `GET /quiz`
pub async fn quiz(State(state): State<AppState>, Extension(session): Extension<SessionHandle>) -> HandlerResult {
    let (sheet, attempt) = state.quiz.start().await?;
    session.set_quiz(Some(attempt)).await;
    Ok(Html(views::render_quiz(&sheet, &session.lang().await)).into_response())
}

/// `POST /quiz/submit`
pub async fn quiz_submit(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(answers): Form<QuizSubmission>,
) -> HandlerResult {
    // A refused submission keeps the attempt, so resubmitting stays refused.
    let attempt = session.quiz().await;
    let result = state.quiz.submit(attempt.as_ref(), &answers).await?;
    session.set_quiz(None).await;
    let share_path = state.share.share_path(result);
    Ok(Html(views::render_quiz_result(result, &share_path, &session.lang().await)).into_response())
}
