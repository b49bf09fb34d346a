//! User profile routes
//!
//! Reads need a verified token; mutations additionally reject revoked
//! tokens and pass the admin-or-owner policy against the path id.

use crate::auth::{policy, ActiveUser, AuthUser};
use crate::error::ApiResult;
use crate::services::{ArticleService, UserService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use miniblog_shared::types::{
    ArticleResponse, MessageResponse, NewArticleRequest, UpdateUserRequest, UserResponse,
};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/articles", post(create_article))
}

/// Get a user profile
///
/// GET /api/v1/users/:id
async fn get_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let profile = UserService::get_profile(&state.db, id).await?;
    Ok(Json(profile))
}

/// Update a user profile (admin or the user themselves)
///
/// PUT /api/v1/users/:id
async fn update_user(
    State(state): State<AppState>,
    ActiveUser(actor): ActiveUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    policy::require(&actor, id)?;

    let profile = UserService::update_profile(&state.db, id, req).await?;
    Ok(Json(profile))
}

/// Delete a user (admin or the user themselves)
///
/// DELETE /api/v1/users/:id
async fn delete_user(
    State(state): State<AppState>,
    ActiveUser(actor): ActiveUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    policy::require(&actor, id)?;

    let message = UserService::delete_profile(&state.db, id).await?;
    Ok(Json(message))
}

/// Create an article under the path user (admin or the user themselves)
///
/// POST /api/v1/users/:id/articles
async fn create_article(
    State(state): State<AppState>,
    ActiveUser(actor): ActiveUser,
    Path(id): Path<i64>,
    Json(req): Json<NewArticleRequest>,
) -> ApiResult<(StatusCode, Json<ArticleResponse>)> {
    policy::require(&actor, id)?;

    let article = ArticleService::create(&state.db, id, req).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

#[cfg(test)]
mod tests {
    // Policy and ownership behavior is covered by the integration tests.
}
