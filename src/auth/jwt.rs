//! JWT token generation and validation
//!
//! Students and admins hold tokens signed with two different secrets and
//! carrying two different claim shapes, so a token minted for one class can
//! never be accepted as the other. Verification is stateless: nothing about a
//! token is stored server side.

use crate::core::error::{CanteenError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, Rng};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifetime of an admin token
pub const ADMIN_TOKEN_LIFETIME_HOURS: i64 = 12;

/// Secret key for one token class. Never printed.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);

impl TokenSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSecret(<redacted>)")
    }
}

/// The pair of signing secrets, one per identity class
#[derive(Debug, Clone)]
pub struct AuthKeys {
    pub student: TokenSecret,
    pub admin: TokenSecret,
}

impl AuthKeys {
    pub fn new(student: TokenSecret, admin: TokenSecret) -> Self {
        Self { student, admin }
    }
}

/// Claims of a student token. No expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentClaims {
    pub id: i64,
    #[serde(rename = "issuedAt")]
    pub issued_at: DateTime<Utc>,
    pub nonce: f64,
}

/// Claims of an admin token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminClaims {
    pub username: String,
    pub nonce: f64,
    /// Unix seconds
    pub exp: u64,
}

/// Why a token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// Not a JWT, or its claims have the wrong shape
    Malformed,
    /// Signed with another secret, or tampered with
    InvalidSignature,
    /// `exp` has passed
    Expired,
}

impl TokenRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRejection::Malformed => "malformed",
            TokenRejection::InvalidSignature => "invalid_signature",
            TokenRejection::Expired => "expired",
        }
    }
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<jsonwebtoken::errors::Error> for TokenRejection {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenRejection::Expired,
            ErrorKind::InvalidSignature => TokenRejection::InvalidSignature,
            _ => TokenRejection::Malformed,
        }
    }
}

fn nonce() -> f64 {
    OsRng.gen::<f64>()
}

fn sign<C: Serialize>(claims: &C, secret: &TokenSecret) -> Result<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| CanteenError::TokenError(format!("Failed to generate token: {}", e)))
}

/// Generate a token for a student
pub fn issue_student_token(student_id: i64, secret: &TokenSecret) -> Result<String> {
    issue_student_token_at(student_id, Utc::now(), secret)
}

/// Generate a student token with an explicit issuance time
pub fn issue_student_token_at(
    student_id: i64,
    issued_at: DateTime<Utc>,
    secret: &TokenSecret,
) -> Result<String> {
    let claims = StudentClaims {
        id: student_id,
        issued_at,
        nonce: nonce(),
    };
    sign(&claims, secret)
}

/// Generate a token for an admin, valid for [`ADMIN_TOKEN_LIFETIME_HOURS`]
pub fn issue_admin_token(username: &str, secret: &TokenSecret) -> Result<String> {
    issue_admin_token_at(username, Utc::now(), secret)
}

/// Generate an admin token with an explicit issuance time
pub fn issue_admin_token_at(
    username: &str,
    issued_at: DateTime<Utc>,
    secret: &TokenSecret,
) -> Result<String> {
    let expiration = issued_at
        .checked_add_signed(Duration::hours(ADMIN_TOKEN_LIFETIME_HOURS))
        .ok_or_else(|| CanteenError::TokenError("Failed to calculate expiration".to_string()))?
        .timestamp();

    let claims = AdminClaims {
        username: username.to_string(),
        nonce: nonce(),
        exp: u64::try_from(expiration)
            .map_err(|_| CanteenError::TokenError("Expiration before the epoch".to_string()))?,
    };
    sign(&claims, secret)
}

/// Validate a token against `secret` and decode its claims.
///
/// `exp` is enforced when present, with no leeway; tokens without it never
/// expire. Only HS256 is accepted.
pub fn verify<C: DeserializeOwned>(
    token: &str,
    secret: &TokenSecret,
) -> std::result::Result<C, TokenRejection> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<C>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(TokenRejection::from)
}

pub fn verify_student_token(
    token: &str,
    secret: &TokenSecret,
) -> std::result::Result<StudentClaims, TokenRejection> {
    verify(token, secret)
}

pub fn verify_admin_token(
    token: &str,
    secret: &TokenSecret,
) -> std::result::Result<AdminClaims, TokenRejection> {
    verify(token, secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keys() -> AuthKeys {
        AuthKeys::new(
            TokenSecret::new("student-secret-for-tests"),
            TokenSecret::new("admin-secret-for-tests"),
        )
    }

    fn unverified_payload(token: &str) -> serde_json::Value {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        decode::<serde_json::Value>(token, &DecodingKey::from_secret(&[]), &validation)
            .unwrap()
            .claims
    }

    #[test]
    fn test_student_token_round_trip() {
        let keys = keys();
        let token = issue_student_token(42, &keys.student).unwrap();

        let claims = verify_student_token(&token, &keys.student).unwrap();
        assert_eq!(claims.id, 42);
        assert!((0.0..1.0).contains(&claims.nonce));
        assert!(claims.issued_at <= Utc::now());
    }

    #[test]
    fn test_student_payload_shape() {
        let keys = keys();
        let token = issue_student_token(7, &keys.student).unwrap();
        let payload = unverified_payload(&token);

        assert_eq!(payload["id"], 7);
        assert!(payload["issuedAt"].is_string());
        assert!(payload["nonce"].is_f64());
        assert!(payload.get("exp").is_none());
    }

    #[test]
    fn test_admin_payload_shape() {
        let keys = keys();
        let issued_at = Utc::now();
        let token = issue_admin_token_at("chef", issued_at, &keys.admin).unwrap();
        let payload = unverified_payload(&token);

        assert_eq!(payload["username"], "chef");
        assert!(payload["nonce"].is_f64());
        assert_eq!(
            payload["exp"].as_i64().unwrap(),
            issued_at.timestamp() + ADMIN_TOKEN_LIFETIME_HOURS * 3600
        );
    }

    #[test]
    fn test_tokens_for_same_student_differ() {
        let keys = keys();
        let first = issue_student_token(1, &keys.student).unwrap();
        let second = issue_student_token(1, &keys.student).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_student_token_rejected_by_admin_secret() {
        let keys = keys();
        let token = issue_student_token(42, &keys.student).unwrap();

        assert_eq!(
            verify_student_token(&token, &keys.admin),
            Err(TokenRejection::InvalidSignature)
        );
        assert!(verify_admin_token(&token, &keys.admin).is_err());
    }

    #[test]
    fn test_admin_token_rejected_by_student_secret() {
        let keys = keys();
        let token = issue_admin_token("chef", &keys.admin).unwrap();

        assert!(verify_student_token(&token, &keys.student).is_err());
        assert!(verify_admin_token(&token, &keys.student).is_err());
    }

    #[test]
    fn test_claim_shapes_are_disjoint() {
        // Even under one shared secret the claim sets do not decode as each other.
        let shared = TokenSecret::new("shared");
        let student = issue_student_token(1, &shared).unwrap();
        let admin = issue_admin_token("chef", &shared).unwrap();

        assert_eq!(verify_admin_token(&student, &shared), Err(TokenRejection::Malformed));
        assert_eq!(verify_student_token(&admin, &shared), Err(TokenRejection::Malformed));
    }

    #[test]
    fn test_admin_token_valid_within_lifetime() {
        let keys = keys();
        let issued_at = Utc::now() - Duration::hours(ADMIN_TOKEN_LIFETIME_HOURS) + Duration::minutes(1);
        let token = issue_admin_token_at("chef", issued_at, &keys.admin).unwrap();

        let claims = verify_admin_token(&token, &keys.admin).unwrap();
        assert_eq!(claims.username, "chef");
    }

    #[test]
    fn test_admin_token_expires_after_lifetime() {
        let keys = keys();
        let issued_at = Utc::now() - Duration::hours(ADMIN_TOKEN_LIFETIME_HOURS) - Duration::seconds(5);
        let token = issue_admin_token_at("chef", issued_at, &keys.admin).unwrap();

        assert_eq!(
            verify_admin_token(&token, &keys.admin),
            Err(TokenRejection::Expired)
        );
    }

    #[test]
    fn test_old_student_token_still_valid() {
        let keys = keys();
        let issued_at = Utc::now() - Duration::days(365 * 3);
        let token = issue_student_token_at(9, issued_at, &keys.student).unwrap();

        assert_eq!(verify_student_token(&token, &keys.student).unwrap().id, 9);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let keys = keys();
        let token = issue_student_token(42, &keys.student).unwrap();
        let forged = issue_student_token(43, &keys.admin).unwrap();

        // Keep the header and signature of a genuine token, swap in another payload.
        let genuine: Vec<&str> = token.split('.').collect();
        let other: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", genuine[0], other[1], genuine[2]);

        assert_eq!(
            verify_student_token(&spliced, &keys.student),
            Err(TokenRejection::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let keys = keys();
        assert_eq!(
            verify_student_token("not-a-token", &keys.student),
            Err(TokenRejection::Malformed)
        );
        assert_eq!(verify_admin_token("", &keys.admin), Err(TokenRejection::Malformed));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = TokenSecret::new("super-secret-value");
        let printed = format!("{:?}", AuthKeys::new(secret.clone(), secret));
        assert!(!printed.contains("super-secret-value"));
    }

    proptest! {
        #[test]
        fn prop_student_round_trip_and_isolation(id in any::<i64>()) {
            let keys = keys();
            let token = issue_student_token(id, &keys.student).unwrap();

            prop_assert_eq!(verify_student_token(&token, &keys.student).unwrap().id, id);
            prop_assert!(verify_student_token(&token, &keys.admin).is_err());
            prop_assert!(verify_admin_token(&token, &keys.admin).is_err());
        }

        #[test]
        fn prop_admin_round_trip(username in "[a-z][a-z0-9_]{0,15}") {
            let keys = keys();
            let token = issue_admin_token(&username, &keys.admin).unwrap();

            prop_assert_eq!(verify_admin_token(&token, &keys.admin).unwrap().username, username);
            prop_assert!(verify_admin_token(&token, &keys.student).is_err());
        }
    }
}
