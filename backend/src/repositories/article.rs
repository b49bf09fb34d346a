//! Article and rating repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Article record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRecord {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Article record joined with its author's username
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleDetailRecord {
    pub id: i64,
    pub author_id: i64,
    pub author_user_name: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rating record joined with the rater's username
///
/// rate is nullable: a rating may carry only a comment, and such rows
/// are excluded from the average.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RatingDetailRecord {
    pub article_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub rate: Option<i32>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an article
#[derive(Debug, Clone)]
pub struct CreateArticle {
    pub author_id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub status: String,
}

/// Input for updating an article
///
/// The slug is fixed at creation and has no update field.
#[derive(Debug, Clone, Default)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
}

/// Article repository for database operations
pub struct ArticleRepository;

impl ArticleRepository {
    /// Create a new article
    pub async fn create(pool: &PgPool, input: CreateArticle) -> Result<ArticleRecord> {
        let article = sqlx::query_as::<_, ArticleRecord>(
            r#"
            INSERT INTO articles (author_id, title, slug, content, cover_image, tags, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, author_id, title, slug, content, cover_image, tags, status,
                      created_at, updated_at
            "#,
        )
        .bind(input.author_id)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(&input.cover_image)
        .bind(&input.tags)
        .bind(&input.status)
        .fetch_one(pool)
        .await?;

        Ok(article)
    }

    /// Find article by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<ArticleRecord>> {
        let article = sqlx::query_as::<_, ArticleRecord>(
            r#"
            SELECT id, author_id, title, slug, content, cover_image, tags, status,
                   created_at, updated_at
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(article)
    }

    /// Get an article with its author's username
    pub async fn get_detail(pool: &PgPool, id: i64) -> Result<Option<ArticleDetailRecord>> {
        let article = sqlx::query_as::<_, ArticleDetailRecord>(
            r#"
            SELECT a.id, a.author_id, u.user_name AS author_user_name,
                   a.title, a.slug, a.content, a.cover_image, a.tags, a.status,
                   a.created_at, a.updated_at
            FROM articles a
            JOIN users u ON u.id = a.author_id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(article)
    }

    /// List all articles with their authors' usernames, newest first
    pub async fn list_details(pool: &PgPool) -> Result<Vec<ArticleDetailRecord>> {
        let articles = sqlx::query_as::<_, ArticleDetailRecord>(
            r#"
            SELECT a.id, a.author_id, u.user_name AS author_user_name,
                   a.title, a.slug, a.content, a.cover_image, a.tags, a.status,
                   a.created_at, a.updated_at
            FROM articles a
            JOIN users u ON u.id = a.author_id
            ORDER BY a.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(articles)
    }

    /// Update an article, leaving omitted fields untouched
    pub async fn update(pool: &PgPool, id: i64, updates: UpdateArticle) -> Result<ArticleRecord> {
        let article = sqlx::query_as::<_, ArticleRecord>(
            r#"
            UPDATE articles SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                cover_image = COALESCE($4, cover_image),
                tags = COALESCE($5, tags),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, author_id, title, slug, content, cover_image, tags, status,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(updates.title)
        .bind(updates.content)
        .bind(updates.cover_image)
        .bind(updates.tags)
        .bind(updates.status)
        .fetch_one(pool)
        .await?;

        Ok(article)
    }

    /// Delete an article and its ratings in one transaction
    ///
    /// The ratings delete is explicit so the two removals are a single
    /// atomic unit rather than a side effect of the foreign key.
    pub async fn delete_with_ratings(pool: &PgPool, id: i64) -> Result<bool> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM ratings
            WHERE article_id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            DELETE FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Rating repository for database operations
pub struct RatingRepository;

impl RatingRepository {
    /// Insert or replace a user's rating of an article
    ///
    /// Conflicts on the (user, article) primary key, so a re-rate
    /// overwrites rate and comment instead of adding a row.
    pub async fn upsert(
        pool: &PgPool,
        article_id: i64,
        user_id: i64,
        rate: Option<i32>,
        comment: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ratings (user_id, article_id, rate, comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, article_id)
            DO UPDATE SET rate = EXCLUDED.rate,
                          comment = EXCLUDED.comment,
                          updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(article_id)
        .bind(rate)
        .bind(comment)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Remove a user's rating of an article
    pub async fn delete(pool: &PgPool, article_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM ratings
            WHERE article_id = $1 AND user_id = $2
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Ratings for one article, raters' usernames included
    pub async fn for_article(pool: &PgPool, article_id: i64) -> Result<Vec<RatingDetailRecord>> {
        let ratings = sqlx::query_as::<_, RatingDetailRecord>(
            r#"
            SELECT r.article_id, r.user_id, u.user_name, r.rate, r.comment,
                   r.created_at, r.updated_at
            FROM ratings r
            JOIN users u ON u.id = r.user_id
            WHERE r.article_id = $1
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(article_id)
        .fetch_all(pool)
        .await?;

        Ok(ratings)
    }

    /// Ratings for a set of articles in one round trip
    pub async fn for_articles(
        pool: &PgPool,
        article_ids: &[i64],
    ) -> Result<Vec<RatingDetailRecord>> {
        let ratings = sqlx::query_as::<_, RatingDetailRecord>(
            r#"
            SELECT r.article_id, r.user_id, u.user_name, r.rate, r.comment,
                   r.created_at, r.updated_at
            FROM ratings r
            JOIN users u ON u.id = r.user_id
            WHERE r.article_id = ANY($1)
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(article_ids)
        .fetch_all(pool)
        .await?;

        Ok(ratings)
    }
}
