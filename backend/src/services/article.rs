//! Article service for publishing and rating
//!
//! Owns slug derivation and rating aggregation. The average of an
//! article's ratings counts numeric rates only; an article with none
//! has no average at all rather than an average of zero.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use miniblog_shared::types::{
    ArticleResponse, MessageResponse, NewArticleRequest, RateArticleRequest, RatingResponse,
    UpdateArticleRequest,
};
use miniblog_shared::ArticleStatus;

use crate::error::{is_foreign_key_violation, is_unique_violation, ApiError};
use crate::repositories::{
    ArticleDetailRecord, ArticleRepository, CreateArticle, RatingDetailRecord, RatingRepository,
    UpdateArticle, UserRepository,
};

/// Article service for blog operations
pub struct ArticleService;

impl ArticleService {
    /// Create an article under the given author
    pub async fn create(
        pool: &PgPool,
        author_id: i64,
        req: NewArticleRequest,
    ) -> Result<ArticleResponse, ApiError> {
        req.validate()?;

        let author = UserRepository::find_by_id(pool, author_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let slug = derive_slug(&req.title);
        let article = ArticleRepository::create(
            pool,
            CreateArticle {
                author_id,
                title: req.title,
                slug,
                content: req.content,
                cover_image: req.cover_image,
                tags: req.tags,
                status: req.status.as_str().to_string(),
            },
        )
        .await
        .map_err(map_article_write_error)?;

        let detail = ArticleDetailRecord {
            id: article.id,
            author_id: article.author_id,
            author_user_name: author.user_name,
            title: article.title,
            slug: article.slug,
            content: article.content,
            cover_image: article.cover_image,
            tags: article.tags,
            status: article.status,
            created_at: article.created_at,
            updated_at: article.updated_at,
        };

        article_response(detail, Vec::new())
    }

    /// Get one article with its ratings and average
    pub async fn get(pool: &PgPool, article_id: i64) -> Result<ArticleResponse, ApiError> {
        let article = ArticleRepository::get_detail(pool, article_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;

        let ratings = RatingRepository::for_article(pool, article_id)
            .await
            .map_err(ApiError::Internal)?;

        article_response(article, ratings)
    }

    /// List all articles, newest first, ratings included
    pub async fn list(pool: &PgPool) -> Result<Vec<ArticleResponse>, ApiError> {
        let articles = ArticleRepository::list_details(pool)
            .await
            .map_err(ApiError::Internal)?;

        let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
        let mut ratings_by_article: HashMap<i64, Vec<RatingDetailRecord>> = HashMap::new();
        if !ids.is_empty() {
            for rating in RatingRepository::for_articles(pool, &ids)
                .await
                .map_err(ApiError::Internal)?
            {
                ratings_by_article
                    .entry(rating.article_id)
                    .or_default()
                    .push(rating);
            }
        }

        articles
            .into_iter()
            .map(|article| {
                let ratings = ratings_by_article.remove(&article.id).unwrap_or_default();
                article_response(article, ratings)
            })
            .collect()
    }

    /// Update an article, leaving omitted fields untouched
    ///
    /// The slug keeps its creation-time value even when the title
    /// changes.
    pub async fn update(
        pool: &PgPool,
        article_id: i64,
        req: UpdateArticleRequest,
    ) -> Result<ArticleResponse, ApiError> {
        req.validate()?;

        ArticleRepository::update(
            pool,
            article_id,
            UpdateArticle {
                title: req.title,
                content: req.content,
                cover_image: req.cover_image,
                tags: req.tags,
                status: req.status.map(|s| s.as_str().to_string()),
            },
        )
        .await
        .map_err(map_article_write_error)?;

        Self::get(pool, article_id).await
    }

    /// Delete an article and all of its ratings
    pub async fn delete(pool: &PgPool, article_id: i64) -> Result<MessageResponse, ApiError> {
        let deleted = ArticleRepository::delete_with_ratings(pool, article_id)
            .await
            .map_err(ApiError::Internal)?;

        if !deleted {
            return Err(ApiError::NotFound("Article not found".to_string()));
        }

        Ok(MessageResponse::new("Article deleted"))
    }

    /// Insert or replace a rating of an article by the given user
    ///
    /// Authors cannot rate their own articles.
    pub async fn rate(
        pool: &PgPool,
        article_id: i64,
        rater_id: i64,
        req: RateArticleRequest,
    ) -> Result<ArticleResponse, ApiError> {
        req.validate()?;

        let article = ArticleRepository::find_by_id(pool, article_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;

        if article.author_id == rater_id {
            return Err(ApiError::BadRequest(
                "You cannot rate your own article".to_string(),
            ));
        }

        RatingRepository::upsert(pool, article_id, rater_id, req.rate, req.comment.as_deref())
            .await
            .map_err(|e| match e.downcast_ref::<sqlx::Error>() {
                // The article or rater vanished between the checks and
                // the insert.
                Some(db_err) if is_foreign_key_violation(db_err) => {
                    ApiError::NotFound("User or article not found".to_string())
                }
                _ => ApiError::Internal(e),
            })?;

        Self::get(pool, article_id).await
    }

    /// Remove a user's rating of an article
    ///
    /// Removing a rating that does not exist is still a success.
    pub async fn unrate(
        pool: &PgPool,
        article_id: i64,
        rater_id: i64,
    ) -> Result<ArticleResponse, ApiError> {
        ArticleRepository::find_by_id(pool, article_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;

        RatingRepository::delete(pool, article_id, rater_id)
            .await
            .map_err(ApiError::Internal)?;

        Self::get(pool, article_id).await
    }

    /// The author id of an article, for policy checks at the routes
    pub async fn owner_of(pool: &PgPool, article_id: i64) -> Result<i64, ApiError> {
        let article = ArticleRepository::find_by_id(pool, article_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;

        Ok(article.author_id)
    }
}

fn map_article_write_error(err: anyhow::Error) -> ApiError {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::RowNotFound) => ApiError::NotFound("Article not found".to_string()),
        Some(db_err) if is_unique_violation(db_err) => {
            ApiError::Conflict("An article with this slug already exists".to_string())
        }
        _ => ApiError::Internal(err),
    }
}

/// Mean of the numeric rates; `None` when there are none
fn average_rate(ratings: &[RatingDetailRecord]) -> Option<f64> {
    let rates: Vec<i32> = ratings.iter().filter_map(|r| r.rate).collect();
    if rates.is_empty() {
        return None;
    }

    Some(rates.iter().map(|r| f64::from(*r)).sum::<f64>() / rates.len() as f64)
}

/// URL slug from a title
///
/// Lowercased alphanumeric runs joined by hyphens, suffixed with the
/// current millisecond timestamp in base36 so near-identical titles do
/// not collide. The slug column's unique constraint backstops the rest.
fn derive_slug(title: &str) -> String {
    let base = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let suffix = to_base36(Utc::now().timestamp_millis());
    if base.is_empty() {
        suffix
    } else {
        format!("{}-{}", base, suffix)
    }
}

fn to_base36(mut n: i64) -> String {
    if n <= 0 {
        return "0".to_string();
    }

    let mut out = String::new();
    while n > 0 {
        if let Some(c) = char::from_digit((n % 36) as u32, 36) {
            out.insert(0, c);
        }
        n /= 36;
    }
    out
}

fn article_response(
    article: ArticleDetailRecord,
    ratings: Vec<RatingDetailRecord>,
) -> Result<ArticleResponse, ApiError> {
    let status = article
        .status
        .parse::<ArticleStatus>()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;

    let average_rate = average_rate(&ratings);
    let ratings = ratings
        .into_iter()
        .map(|r| RatingResponse {
            user_name: r.user_name,
            rate: r.rate,
            comment: r.comment,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
        .collect();

    Ok(ArticleResponse {
        id: article.id,
        author_id: article.author_id,
        author_user_name: article.author_user_name,
        title: article.title,
        slug: article.slug,
        content: article.content,
        cover_image: article.cover_image,
        tags: article.tags,
        status,
        average_rate,
        ratings,
        created_at: article.created_at,
        updated_at: article.updated_at,
    })
}
