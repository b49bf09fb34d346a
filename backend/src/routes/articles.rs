//! Article and rating routes
//!
//! Reads are public. Mutations reject revoked tokens and pass the
//! admin-or-owner policy: article edits against the stored author,
//! rating edits against the rater named in the path.

use crate::auth::{policy, ActiveUser};
use crate::error::ApiResult;
use crate::services::ArticleService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use miniblog_shared::types::{
    ArticleResponse, MessageResponse, RateArticleRequest, UpdateArticleRequest,
};

/// Create article routes
pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_articles))
        .route(
            "/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route(
            "/:id/ratings/:user_id",
            put(rate_article).delete(delete_rating),
        )
}

/// List all articles with ratings and averages
///
/// GET /api/v1/articles
async fn list_articles(State(state): State<AppState>) -> ApiResult<Json<Vec<ArticleResponse>>> {
    let articles = ArticleService::list(&state.db).await?;
    Ok(Json(articles))
}

/// Get one article with ratings and average
///
/// GET /api/v1/articles/:id
async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ArticleResponse>> {
    let article = ArticleService::get(&state.db, id).await?;
    Ok(Json(article))
}

/// Update an article (admin or its author)
///
/// PUT /api/v1/articles/:id
async fn update_article(
    State(state): State<AppState>,
    ActiveUser(actor): ActiveUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateArticleRequest>,
) -> ApiResult<Json<ArticleResponse>> {
    let owner = ArticleService::owner_of(&state.db, id).await?;
    policy::require(&actor, owner)?;

    let article = ArticleService::update(&state.db, id, req).await?;
    Ok(Json(article))
}

/// Delete an article and its ratings (admin or its author)
///
/// DELETE /api/v1/articles/:id
async fn delete_article(
    State(state): State<AppState>,
    ActiveUser(actor): ActiveUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let owner = ArticleService::owner_of(&state.db, id).await?;
    policy::require(&actor, owner)?;

    let message = ArticleService::delete(&state.db, id).await?;
    Ok(Json(message))
}

/// Rate an article as the path user (admin or the user themselves)
///
/// PUT /api/v1/articles/:id/ratings/:user_id
async fn rate_article(
    State(state): State<AppState>,
    ActiveUser(actor): ActiveUser,
    Path((id, user_id)): Path<(i64, i64)>,
    Json(req): Json<RateArticleRequest>,
) -> ApiResult<Json<ArticleResponse>> {
    policy::require(&actor, user_id)?;

    let article = ArticleService::rate(&state.db, id, user_id, req).await?;
    Ok(Json(article))
}

/// Remove the path user's rating (admin or the user themselves)
///
/// DELETE /api/v1/articles/:id/ratings/:user_id
async fn delete_rating(
    State(state): State<AppState>,
    ActiveUser(actor): ActiveUser,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<ArticleResponse>> {
    policy::require(&actor, user_id)?;

    let article = ArticleService::unrate(&state.db, id, user_id).await?;
    Ok(Json(article))
}

#[cfg(test)]
mod tests {
    // Rating and ownership behavior is covered by the integration tests.
}
