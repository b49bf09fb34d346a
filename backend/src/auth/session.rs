//! Session lifecycle on top of signed tokens
//!
//! A session is a signed token plus its standing against the revocation
//! blacklist. Verification alone never touches the store; revocation
//! checks and sweeps do.

use chrono::DateTime;
use sqlx::PgPool;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use miniblog_shared::Role;

use crate::auth::token::{AuthError, Claims, TokenSigner};
use crate::repositories::TokenBlacklistRepository;

/// Errors from session operations
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Token(#[from] AuthError),

    #[error("Session store error")]
    Store(#[from] anyhow::Error),
}

/// Issues, verifies and revokes sessions
///
/// Cheap to clone; handed to the router through application state rather
/// than living in a global.
#[derive(Clone)]
pub struct SessionService {
    signer: TokenSigner,
    pool: PgPool,
}

impl SessionService {
    pub fn new(signer: TokenSigner, pool: PgPool) -> Self {
        Self { signer, pool }
    }

    /// Token lifetime in seconds, for response bodies
    pub fn expiry_secs(&self) -> i64 {
        self.signer.expiry_secs()
    }

    /// Issue a fresh token for the given user
    pub fn issue(&self, user_id: i64, username: &str, role: Role) -> Result<String, SessionError> {
        Ok(self.signer.issue(user_id, username, role)?)
    }

    /// Verify signature and expiry without consulting the blacklist
    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        Ok(self.signer.verify(token)?)
    }

    /// Whether the token has been revoked
    pub async fn is_revoked(&self, token: &str) -> Result<bool, SessionError> {
        Ok(TokenBlacklistRepository::exists(&self.pool, token).await?)
    }

    /// Revoke a token until its own expiry
    ///
    /// Idempotent: revoking an already-revoked token succeeds. The expiry
    /// is read from the token itself so even a stale token is retained no
    /// longer than it could ever verify.
    pub async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        let exp = TokenSigner::decode_expiry(token)?;
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(AuthError::Malformed)?;
        TokenBlacklistRepository::insert(&self.pool, token, expires_at).await?;
        Ok(())
    }

    /// Drop blacklist entries whose tokens have expired anyway
    pub async fn sweep_expired(&self) -> Result<u64, SessionError> {
        Ok(TokenBlacklistRepository::delete_expired(&self.pool).await?)
    }

    /// Run `sweep_expired` on a fixed interval until the process exits
    pub fn spawn_sweeper(&self, interval_secs: u64) -> JoinHandle<()> {
        let sessions = self.clone();
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match sessions.sweep_expired().await {
                    Ok(0) => {}
                    Ok(removed) => info!(removed, "Removed expired tokens from blacklist"),
                    Err(err) => error!("Blacklist sweep failed: {:?}", err),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_service(expiry_secs: i64) -> SessionService {
        // No connection is made until a store operation runs, so the
        // pure token paths are testable without a database.
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        SessionService::new(TokenSigner::new("session-test-secret", expiry_secs), pool)
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let sessions = lazy_service(3600);
        let token = sessions.issue(9, "carol", Role::User).unwrap();
        let claims = sessions.verify(&token).unwrap();

        assert_eq!(claims.user_id, 9);
        assert_eq!(claims.username, "carol");
    }

    #[tokio::test]
    async fn test_verify_rejects_expired() {
        let sessions = lazy_service(-120);
        let token = sessions.issue(9, "carol", Role::User).unwrap();

        assert!(matches!(
            sessions.verify(&token),
            Err(SessionError::Token(AuthError::Expired))
        ));
    }

    #[test]
    fn test_expiry_secs_reported() {
        let sessions = lazy_service(1800);
        assert_eq!(sessions.expiry_secs(), 1800);
    }
}
