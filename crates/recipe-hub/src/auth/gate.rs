//! Session gate: capability checks evaluated before protected handlers run.
//!
//! Denial is a soft failure. The caller gets [`Access::Denied`] carrying the
//! page to redirect to, never a 403. The checks are pure functions of the
//! session state; the axum guards in [`crate::server::guards`] only adapt them.

use crate::models::SessionUser;
use crate::session::SessionData;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Where non-admin visitors to admin pages are sent.
pub const HOME_PATH: &str = "/";

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<'a> {
    /// The request may proceed as this user.
    Granted(&'a SessionUser),
    /// The request is turned away.
    Denied(Denial),
}

/// A refused request and the redirect that answers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denial {
    pub redirect_to: &'static str,
}

impl Access<'_> {
    /// Whether the check passed.
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Allow iff a user is logged in.
#[must_use]
pub fn require_authenticated(session: &SessionData) -> Access<'_> {
    match session.user.as_ref() {
        Some(user) => Access::Granted(user),
        None => Access::Denied(Denial { redirect_to: LOGIN_PATH }),
    }
}

/// Allow iff a user is logged in and carries the admin flag.
#[must_use]
pub fn require_admin(session: &SessionData) -> Access<'_> {
    match session.user.as_ref() {
        Some(user) if user.is_admin => Access::Granted(user),
        _ => Access::Denied(Denial { redirect_to: HOME_PATH }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(user: Option<(&str, bool)>) -> SessionData {
        SessionData {
            user: user.map(|(name, is_admin)| SessionUser {
                id: format!("id-{name}"),
                username: name.to_string(),
                is_admin,
            }),
            ..SessionData::default()
        }
    }

    #[test]
    fn test_anonymous_denied_everywhere() {
        let session = session_with(None);
        assert_eq!(require_authenticated(&session), Access::Denied(Denial { redirect_to: "/login" }));
        assert_eq!(require_admin(&session), Access::Denied(Denial { redirect_to: "/" }));
    }

    #[test]
    fn test_regular_user() {
        let session = session_with(Some(("alice", false)));
        assert!(require_authenticated(&session).is_granted());
        assert!(!require_admin(&session).is_granted());
    }

    #[test]
    fn test_admin_user() {
        let session = session_with(Some(("root", true)));
        match require_admin(&session) {
            Access::Granted(user) => assert_eq!(user.username, "root"),
            Access::Denied(_) => panic!("admin should be granted"),
        }
    }
}
