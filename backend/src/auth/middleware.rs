//! Request extractors for authenticated routes
//!
//! Handlers pick the guard by extractor: [`AuthUser`] verifies the token,
//! [`ActiveUser`] additionally rejects revoked tokens, [`BearerToken`]
//! hands over the raw token for revocation.
//!
//! Status contract: a missing or malformed header is 401, a token that
//! fails verification is 403, a revoked token is 401.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use miniblog_shared::Role;

use crate::error::ApiError;
use crate::state::AppState;

/// Identity taken from a verified token
///
/// Does not consult the blacklist; use [`ActiveUser`] on routes that must
/// reject revoked sessions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

/// Identity taken from a verified token that is not revoked
#[derive(Debug, Clone)]
pub struct ActiveUser(pub AuthUser);

/// The raw bearer token, syntactically validated only
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Pull the token out of an `Authorization: Bearer <token>` header
fn parse_bearer(header_value: Option<&str>) -> Result<&str, ApiError> {
    let value = header_value
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Malformed authorization header".to_string()))?;

    if token.is_empty() {
        return Err(ApiError::Unauthorized(
            "Malformed authorization header".to_string(),
        ));
    }

    Ok(token)
}

fn bearer_from_parts(parts: &Parts) -> Result<&str, ApiError> {
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    parse_bearer(header_value)
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(bearer_from_parts(parts)?.to_string()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_from_parts(parts)?;
        let claims = state.sessions.verify(token)?;

        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_from_parts(parts)?;
        let claims = state.sessions.verify(token)?;

        if state.sessions.is_revoked(token).await? {
            return Err(ApiError::Unauthorized("Token revoked".to_string()));
        }

        Ok(ActiveUser(AuthUser {
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer_extracts_token() {
        let token = parse_bearer(Some("Bearer abc.def.ghi")).unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn test_parse_bearer_missing_header() {
        let err = parse_bearer(None).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_parse_bearer_wrong_scheme() {
        let err = parse_bearer(Some("Basic dXNlcjpwYXNz")).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_parse_bearer_empty_token() {
        let err = parse_bearer(Some("Bearer ")).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_parse_bearer_is_case_sensitive() {
        let err = parse_bearer(Some("bearer abc")).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
