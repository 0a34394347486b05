//! Password hashing and verification using bcrypt

use crate::core::error::{CanteenError, Result};
use uuid::Uuid;

/// Lowest bcrypt cost accepted by the configuration
pub const MIN_PASSWORD_COST: u32 = 4;

/// Highest bcrypt cost accepted by the configuration
pub const MAX_PASSWORD_COST: u32 = 31;

/// Hash a password using bcrypt with a fresh random salt
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| CanteenError::PasswordHashError(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored digest.
///
/// A digest that cannot be parsed never matches.
pub fn verify_password(password: &str, digest: &str) -> bool {
    match bcrypt::verify(password, digest) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password digest is malformed");
            false
        }
    }
}

/// Hash on the blocking pool so bcrypt's work factor never stalls the runtime
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| CanteenError::TaskError(format!("Password hashing task panicked: {}", e)))?
}

/// Verify on the blocking pool
pub async fn verify_password_blocking(password: String, digest: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &digest))
        .await
        .map_err(|e| CanteenError::TaskError(format!("Password verification task panicked: {}", e)))
}

/// Digest checked in place of a missing account's hash, so a login for an
/// unknown user costs the same bcrypt work as a wrong password.
pub struct DecoyDigest {
    cost: u32,
    digest: tokio::sync::OnceCell<String>,
}

impl DecoyDigest {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            digest: tokio::sync::OnceCell::new(),
        }
    }

    /// Hashed once at the configured cost, then reused
    pub async fn digest(&self) -> Result<String> {
        let digest = self
            .digest
            .get_or_try_init(|| hash_password_blocking(Uuid::new_v4().to_string(), self.cost))
            .await?;
        Ok(digest.clone())
    }

    pub fn is_ready(&self) -> bool {
        self.digest.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_and_verify() {
        let digest = hash_password("correct horse", MIN_PASSWORD_COST).unwrap();

        assert!(verify_password("correct horse", &digest));
        assert!(!verify_password("correct horse ", &digest));
        assert!(!verify_password("", &digest));
    }

    #[test]
    fn test_same_password_different_digests() {
        let first = hash_password("lunch", MIN_PASSWORD_COST).unwrap();
        let second = hash_password("lunch", MIN_PASSWORD_COST).unwrap();

        assert_ne!(first, second);
        assert!(verify_password("lunch", &first));
        assert!(verify_password("lunch", &second));
    }

    #[test]
    fn test_malformed_digest_is_false() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!verify_password("anything", "$2b$04$tooshort"));
    }

    #[test]
    fn test_altered_digest_fails() {
        let digest = hash_password("menu", MIN_PASSWORD_COST).unwrap();
        let mut altered = digest.clone().into_bytes();
        let pos = altered.len() - 10;
        altered[pos] = if altered[pos] == b'a' { b'b' } else { b'a' };
        let altered = String::from_utf8(altered).unwrap();

        assert!(!verify_password("menu", &altered));
    }

    #[test]
    fn test_cost_out_of_range_is_error() {
        let result = hash_password("menu", 2);
        assert!(matches!(result, Err(CanteenError::PasswordHashError(_))));
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let digest = hash_password_blocking("soup".to_string(), MIN_PASSWORD_COST)
            .await
            .unwrap();

        assert!(verify_password_blocking("soup".to_string(), digest.clone()).await.unwrap());
        assert!(!verify_password_blocking("salad".to_string(), digest).await.unwrap());
    }

    #[tokio::test]
    async fn test_decoy_digest_uses_configured_cost() {
        let decoy = DecoyDigest::new(MIN_PASSWORD_COST);
        assert!(!decoy.is_ready());

        let first = decoy.digest().await.unwrap();
        let second = decoy.digest().await.unwrap();

        assert!(decoy.is_ready());
        assert_eq!(first, second);
        assert!(first.starts_with("$2b$04$"));
        assert!(!verify_password("", &first));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_hash_round_trips(password in "[ -~]{0,40}") {
            let digest = hash_password(&password, MIN_PASSWORD_COST).unwrap();
            prop_assert!(verify_password(&password, &digest));
            let other = format!("{}x", password);
            prop_assert!(!verify_password(&other, &digest));
        }
    }
}
