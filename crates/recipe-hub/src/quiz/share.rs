//! Signed share links for quiz results.
//!
//! The share page used to echo whatever `score`/`total` the query carried.
//! Grading now mints an HMAC-SHA256 tag over the pair and `/share` only
//! renders numbers whose tag verifies.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::models::QuizResult;

type HmacSha256 = Hmac<Sha256>;

/// Domain separator so share tags never collide with other uses of the secret.
const CONTEXT: &[u8] = b"recipe-hub/quiz-share/v1";

/// Signs and verifies quiz results.
#[derive(Clone)]
pub struct ShareSigner {
    key: Vec<u8>,
}

impl ShareSigner {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self { key: secret.as_bytes().to_vec() }
    }

    fn mac(&self, result: QuizResult) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(CONTEXT);
        mac.update(format!("{}/{}", result.score, result.total).as_bytes());
        mac
    }

    /// Tag for a result, URL-safe base64.
    #[must_use]
    pub fn sign(&self, result: QuizResult) -> String {
        URL_SAFE_NO_PAD.encode(self.mac(result).finalize().into_bytes())
    }

    /// Constant-time check of a tag.
    #[must_use]
    pub fn verify(&self, result: QuizResult, signature: &str) -> bool {
        let Ok(raw) = URL_SAFE_NO_PAD.decode(signature) else {
            return false;
        };
        self.mac(result).verify_slice(&raw).is_ok()
    }

    /// Relative link to the share page for a result.
    #[must_use]
    pub fn share_path(&self, result: QuizResult) -> String {
        format!("/share?score={}&total={}&sig={}", result.score, result.total, self.sign(result))
    }
}

impl std::fmt::Debug for ShareSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareSigner").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let signer = ShareSigner::new("secret");
        let result = QuizResult { score: 3, total: 5 };
        let sig = signer.sign(result);
        assert!(signer.verify(result, &sig));
    }

    #[test]
    fn test_tampered_score_rejected() {
        let signer = ShareSigner::new("secret");
        let sig = signer.sign(QuizResult { score: 3, total: 5 });
        assert!(!signer.verify(QuizResult { score: 5, total: 5 }, &sig));
        assert!(!signer.verify(QuizResult { score: 3, total: 3 }, &sig));
    }

    #[test]
    fn test_other_secret_rejected() {
        let result = QuizResult { score: 1, total: 5 };
        let sig = ShareSigner::new("a").sign(result);
        assert!(!ShareSigner::new("b").verify(result, &sig));
    }

    #[test]
    fn test_garbage_signature_rejected() {
        let signer = ShareSigner::new("secret");
        assert!(!signer.verify(QuizResult { score: 0, total: 0 }, "%%%"));
        assert!(!signer.verify(QuizResult { score: 0, total: 0 }, ""));
    }

    #[test]
    fn test_share_path_shape() {
        let signer = ShareSigner::new("secret");
        let path = signer.share_path(QuizResult { score: 2, total: 5 });
        assert!(path.starts_with("/share?score=2&total=5&sig="));
    }
}
