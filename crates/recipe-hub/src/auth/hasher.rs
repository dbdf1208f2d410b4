//! Argon2id password hashing.

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};
use rand::rngs::OsRng;

use crate::config::HasherCost;
use crate::error::{AuthError, AuthResult};

/// Salted, computationally hard password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password into a self-describing PHC string.
    fn hash_password(&self, password: &str) -> AuthResult<String>;

    /// Check a password against a stored PHC string. Malformed hashes never verify.
    fn verify_password(&self, hash: &str, password: &str) -> bool;
}

/// Argon2id hasher with configurable cost.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Build a hasher from cost parameters.
    pub fn new(cost: HasherCost) -> AuthResult<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    fn verify_password(&self, hash: &str, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };
        // Parameters embedded in the PHC string win over ours, so hashes made
        // under an older cost still verify.
        self.argon2().verify_password(password.as_bytes(), &parsed).is_ok()
    }
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .finish()
    }
}
