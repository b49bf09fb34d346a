//! User service for accounts and sessions
//!
//! Registration and login issue session tokens; logout revokes them.
//! Password hashing and verification run on the blocking thread pool.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::warn;
use validator::Validate;

use miniblog_shared::types::{
    LoginRequest, MessageResponse, RegisterRequest, TokenResponse, UpdateUserRequest, UserResponse,
};
use miniblog_shared::validation::validate_user_name;
use miniblog_shared::Role;

use crate::auth::{PasswordService, SessionService};
use crate::email::Mailer;
use crate::error::{conflict_on_unique, ApiError};
use crate::repositories::{CreateUser, UpdateUser, UserRecord, UserRepository};

/// User service for account operations
pub struct UserService;

impl UserService {
    /// Register a new user and open their first session
    pub async fn register(
        pool: &PgPool,
        sessions: &SessionService,
        mailer: Arc<dyn Mailer>,
        req: RegisterRequest,
    ) -> Result<TokenResponse, ApiError> {
        req.validate()?;

        // The charset rule has no derive equivalent
        if let Err(msg) = validate_user_name(&req.user_name) {
            return Err(ApiError::Validation(format!("user_name: {}", msg)));
        }

        // Email is checked before username, so when both collide the
        // email conflict is the one reported.
        if UserRepository::email_exists(pool, &req.email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        if UserRepository::user_name_exists(pool, &req.user_name)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }

        // Hash on the blocking thread pool (CPU-intensive)
        let password_hash = PasswordService::hash_async(req.password)
            .await
            .map_err(ApiError::Internal)?;

        let user = UserRepository::create(
            pool,
            CreateUser {
                last_name: req.last_name,
                first_name: req.first_name,
                user_name: req.user_name,
                email: req.email,
                password_hash,
            },
        )
        .await
        .map_err(|e| conflict_on_unique(e, "Email or username already registered"))?;

        let response = Self::open_session(sessions, &user)?;

        // Fire and forget: a failed notice is logged, never surfaced to
        // the fresh account.
        let email = user.email.clone();
        let first_name = user.first_name.clone();
        let last_name = user.last_name.clone();
        tokio::spawn(async move {
            if let Err(err) = mailer
                .send_registration_notice(&email, &first_name, &last_name)
                .await
            {
                warn!("Failed to send registration notice: {:?}", err);
            }
        });

        Ok(response)
    }

    /// Login with email and password
    pub async fn login(
        pool: &PgPool,
        sessions: &SessionService,
        req: LoginRequest,
    ) -> Result<TokenResponse, ApiError> {
        req.validate()?;

        // Unknown email and wrong password produce identical responses,
        // so login cannot be used to probe for accounts.
        let user = UserRepository::find_by_email(pool, &req.email)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        let valid = PasswordService::verify_async(req.password, user.password_hash.clone())
            .await
            .map_err(ApiError::Internal)?;

        if !valid {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        Self::open_session(sessions, &user)
    }

    /// Revoke the presented token
    ///
    /// Revocation is idempotent, so logging out twice with the same
    /// token succeeds both times.
    pub async fn logout(
        sessions: &SessionService,
        token: &str,
    ) -> Result<MessageResponse, ApiError> {
        sessions.revoke(token).await?;
        Ok(MessageResponse::new("Logged out"))
    }

    /// Get a user profile
    pub async fn get_profile(pool: &PgPool, user_id: i64) -> Result<UserResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Self::profile_response(user)
    }

    /// Update a user profile
    ///
    /// Re-hashes when a new password is supplied. Email and username
    /// changes go through the same uniqueness checks as registration.
    pub async fn update_profile(
        pool: &PgPool,
        user_id: i64,
        req: UpdateUserRequest,
    ) -> Result<UserResponse, ApiError> {
        req.validate()?;

        let current = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if let Some(email) = &req.email {
            if email != &current.email
                && UserRepository::email_exists(pool, email)
                    .await
                    .map_err(ApiError::Internal)?
            {
                return Err(ApiError::Conflict("Email already registered".to_string()));
            }
        }

        if let Some(user_name) = &req.user_name {
            if let Err(msg) = validate_user_name(user_name) {
                return Err(ApiError::Validation(format!("user_name: {}", msg)));
            }
            if user_name != &current.user_name
                && UserRepository::user_name_exists(pool, user_name)
                    .await
                    .map_err(ApiError::Internal)?
            {
                return Err(ApiError::Conflict("Username already taken".to_string()));
            }
        }

        let password_hash = match req.password {
            Some(password) => Some(
                PasswordService::hash_async(password)
                    .await
                    .map_err(ApiError::Internal)?,
            ),
            None => None,
        };

        let user = UserRepository::update(
            pool,
            user_id,
            UpdateUser {
                last_name: req.last_name,
                first_name: req.first_name,
                user_name: req.user_name,
                email: req.email,
                password_hash,
                bio: req.bio,
                avatar_url: req.avatar_url,
            },
        )
        .await
        .map_err(|e| conflict_on_unique(e, "Email or username already registered"))?;

        Self::profile_response(user)
    }

    /// Delete a user
    ///
    /// Their articles and ratings are removed by the schema's cascading
    /// foreign keys.
    pub async fn delete_profile(pool: &PgPool, user_id: i64) -> Result<MessageResponse, ApiError> {
        let deleted = UserRepository::delete(pool, user_id)
            .await
            .map_err(ApiError::Internal)?;

        if !deleted {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        Ok(MessageResponse::new("User deleted"))
    }

    fn open_session(
        sessions: &SessionService,
        user: &UserRecord,
    ) -> Result<TokenResponse, ApiError> {
        let token = sessions.issue(user.id, &user.user_name, parse_role(&user.role)?)?;

        Ok(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: sessions.expiry_secs(),
        })
    }

    fn profile_response(user: UserRecord) -> Result<UserResponse, ApiError> {
        Ok(UserResponse {
            id: user.id,
            last_name: user.last_name,
            first_name: user.first_name,
            user_name: user.user_name,
            email: user.email,
            bio: user.bio,
            avatar_url: user.avatar_url,
            role: parse_role(&user.role)?,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

/// Parse a stored role name; failure means corrupt data, not bad input
fn parse_role(role: &str) -> Result<Role, ApiError> {
    role.parse::<Role>()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_known_values() {
        assert_eq!(parse_role("user").unwrap(), Role::User);
        assert_eq!(parse_role("admin").unwrap(), Role::Admin);
    }

    #[test]
    fn test_parse_role_rejects_unknown() {
        assert!(parse_role("superuser").is_err());
    }

    // Account flows are covered by the integration tests, which require
    // a database and are marked with #[ignore].
}
