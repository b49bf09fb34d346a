//! Authentication routes
//!
//! Registration, login, logout and the current-user lookup.
//!
//! Logout verifies the token but deliberately skips the revocation
//! check, so a second logout with the same token still succeeds.

use crate::auth::{ActiveUser, AuthUser, BearerToken};
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use miniblog_shared::types::{
    LoginRequest, MessageResponse, RegisterRequest, TokenResponse, UserResponse,
};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Register a new user
///
/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let tokens =
        UserService::register(&state.db, &state.sessions, state.mailer.clone(), req).await?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

/// Login with email and password
///
/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let tokens = UserService::login(&state.db, &state.sessions, req).await?;
    Ok(Json(tokens))
}

/// Revoke the presented token
///
/// POST /api/v1/auth/logout
async fn logout(
    State(state): State<AppState>,
    _user: AuthUser,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<MessageResponse>> {
    let message = UserService::logout(&state.sessions, &token).await?;
    Ok(Json(message))
}

/// Get the profile behind the presented token
///
/// GET /api/v1/auth/me
///
/// Rejects revoked tokens, so this is the canonical "am I still logged
/// in" endpoint.
async fn me(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
) -> ApiResult<Json<UserResponse>> {
    let profile = UserService::get_profile(&state.db, user.user_id).await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    // Route behavior is covered by src/routes/auth_tests.rs and the
    // integration tests.
}
