//! Cookie <-> session-store glue as an axum middleware.
//!
//! Also applies the locale rule on every request: `?lang=` wins, then the
//! session's stored locale, then `en`.

use std::sync::Arc;

use axum::extract::{FromRef, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use serde::Deserialize;
use sha2::{Digest, Sha512};

use super::{SessionData, SessionHandle, SessionStore};

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "recipe_hub.sid";

/// State for [`session_middleware`].
#[derive(Clone)]
pub struct SessionLayer {
    store: Arc<dyn SessionStore>,
    key: Key,
    secure: bool,
}

impl SessionLayer {
    /// Build the layer state. The cookie signing key is derived from `secret`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, secret: &str, secure: bool) -> Self {
        Self { store, key: derive_key(secret), secure }
    }

    fn session_cookie(&self, id: &str) -> Cookie<'static> {
        Cookie::build((COOKIE_NAME, id.to_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }
}

impl FromRef<SessionLayer> for Key {
    fn from_ref(layer: &SessionLayer) -> Self {
        layer.key.clone()
    }
}

impl std::fmt::Debug for SessionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLayer").field("secure", &self.secure).finish()
    }
}

/// Stretch an arbitrary secret into the 64 bytes a cookie [`Key`] needs.
fn derive_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

#[derive(Debug, Default, Deserialize)]
struct LangQuery {
    #[serde(default)]
    lang: Option<String>,
}

fn requested_lang(req: &Request) -> Option<String> {
    let query = req.uri().query()?;
    serde_urlencoded::from_str::<LangQuery>(query)
        .ok()?
        .lang
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty())
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Load the session named by the cookie (or start one), run the handler, write back.
pub async fn session_middleware(
    State(layer): State<SessionLayer>,
    jar: SignedCookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_id = jar.get(COOKIE_NAME).map(|c| c.value().to_owned());

    let loaded = match cookie_id {
        Some(id) => layer.store.load(&id).await.map(|data| (id, data)),
        None => None,
    };
    let (id, mut data, is_new) = match loaded {
        Some((id, data)) => (id, data, false),
        None => (new_session_id(), SessionData::default(), true),
    };

    if let Some(lang) = requested_lang(&req) {
        data.lang = lang;
    }

    let handle = SessionHandle::new(id.as_str(), data);
    req.extensions_mut().insert(handle.clone());

    let response = next.run(req).await;

    let (data, destroyed, rotate) = handle.finish().await;

    if destroyed {
        layer.store.remove(&id).await;
        let jar = jar.remove(Cookie::build(COOKIE_NAME).path("/"));
        return (jar, response).into_response();
    }

    if rotate && !is_new {
        layer.store.remove(&id).await;
        let fresh = new_session_id();
        tracing::debug!("Rotated session id after login");
        layer.store.save(&fresh, data).await;
        let jar = jar.add(layer.session_cookie(&fresh));
        return (jar, response).into_response();
    }

    layer.store.save(&id, data).await;
    if is_new {
        let jar = jar.add(layer.session_cookie(&id));
        return (jar, response).into_response();
    }
    response
}
