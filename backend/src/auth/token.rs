//! JWT issuance and verification
//!
//! Tokens are HS256-signed with claims `userId`, `username`, `role`,
//! `iat` and `exp`. Keys are computed once at startup and shared, so
//! per-request signing never re-derives them.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use miniblog_shared::Role;

/// Errors from token issuance and verification
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Token verification failed")]
    Invalid,

    #[error("Token expired")]
    Expired,

    #[error("Malformed token")]
    Malformed,
}

/// JWT claims
///
/// The wire shape is fixed. Clients depend on the `userId` spelling and
/// on `role` being the lowercase role name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

/// Signs and verifies access tokens
///
/// Cheap to clone; the underlying keys are shared.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    expiry: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            expiry: Duration::seconds(expiry_secs),
        }
    }

    /// Token lifetime in seconds
    pub fn expiry_secs(&self) -> i64 {
        self.expiry.num_seconds()
    }

    /// Create a signed token for the given user
    pub fn issue(&self, user_id: i64, username: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            username: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })
    }

    /// Read the expiry claim without checking signature or freshness
    ///
    /// Revocation needs the expiry of whatever token it is handed, even
    /// one that no longer verifies, so the blacklist entry can be kept
    /// exactly as long as the token itself could live.
    pub fn decode_expiry(token: &str) -> Result<i64, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        let key = DecodingKey::from_secret(&[]);

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims.exp)
            .map_err(|_| AuthError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-unit-tests";

    #[test]
    fn test_issue_and_verify_round_trip() {
        let signer = TokenSigner::new(SECRET, 3600);
        let token = signer.issue(42, "alice", Role::User).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_admin_role_survives_round_trip() {
        let signer = TokenSigner::new(SECRET, 3600);
        let token = signer.issue(1, "root", Role::Admin).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_expired_token_rejected() {
        // Lifetime past the verifier's clock leeway.
        let signer = TokenSigner::new(SECRET, -120);
        let token = signer.issue(42, "alice", Role::User).unwrap();

        assert!(matches!(signer.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = TokenSigner::new(SECRET, 3600);
        let other = TokenSigner::new("a-different-secret-entirely", 3600);
        let token = signer.issue(42, "alice", Role::User).unwrap();

        assert!(matches!(other.verify(&token), Err(AuthError::Invalid)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let signer = TokenSigner::new(SECRET, 3600);

        assert!(matches!(
            signer.verify("not.a.token"),
            Err(AuthError::Invalid)
        ));
    }

    #[test]
    fn test_claims_wire_shape() {
        let claims = Claims {
            user_id: 7,
            username: "bob".to_string(),
            role: Role::Admin,
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        };
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["userId"], 7);
        assert_eq!(value["username"], "bob");
        assert_eq!(value["role"], "admin");
        assert_eq!(value["iat"], 1_700_000_000_i64);
        assert_eq!(value["exp"], 1_700_003_600_i64);

        let back: Claims = serde_json::from_value(value).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn test_decode_expiry_ignores_expiration() {
        let signer = TokenSigner::new(SECRET, -120);
        let token = signer.issue(42, "alice", Role::User).unwrap();

        let exp = TokenSigner::decode_expiry(&token).unwrap();
        assert!(exp < Utc::now().timestamp());
    }

    #[test]
    fn test_decode_expiry_rejects_garbage() {
        assert!(matches!(
            TokenSigner::decode_expiry("garbage"),
            Err(AuthError::Malformed)
        ));
    }
}
