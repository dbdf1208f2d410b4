//! Authentication and authorization.
//!
//! - [`Authenticator`]: register, login, logout and admin user management
//! - [`gate`]: pure session checks (`require_authenticated`, `require_admin`)
//! - [`Argon2Hasher`]: salted password hashing

mod authenticator;
pub mod gate;
mod hasher;

pub use authenticator::Authenticator;
pub use gate::{Access, Denial, require_admin, require_authenticated};
pub use hasher::{Argon2Hasher, PasswordHasher};
