//! User repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub last_name: String,
    pub first_name: String,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Input for updating a user profile
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user with the default role
    pub async fn create(pool: &PgPool, input: CreateUser) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (last_name, first_name, user_name, email, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, last_name, first_name, user_name, email, password_hash,
                      bio, avatar_url, role, created_at, updated_at
            "#,
        )
        .bind(&input.last_name)
        .bind(&input.first_name)
        .bind(&input.user_name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, last_name, first_name, user_name, email, password_hash,
                   bio, avatar_url, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, last_name, first_name, user_name, email, password_hash,
                   bio, avatar_url, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Check if email exists
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Check if username exists
    pub async fn user_name_exists(pool: &PgPool, user_name: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE user_name = $1)
            "#,
        )
        .bind(user_name)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Update a user profile, leaving omitted fields untouched
    pub async fn update(pool: &PgPool, id: i64, updates: UpdateUser) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                last_name = COALESCE($2, last_name),
                first_name = COALESCE($3, first_name),
                user_name = COALESCE($4, user_name),
                email = COALESCE($5, email),
                password_hash = COALESCE($6, password_hash),
                bio = COALESCE($7, bio),
                avatar_url = COALESCE($8, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, last_name, first_name, user_name, email, password_hash,
                      bio, avatar_url, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(updates.last_name)
        .bind(updates.first_name)
        .bind(updates.user_name)
        .bind(updates.email)
        .bind(updates.password_hash)
        .bind(updates.bio)
        .bind(updates.avatar_url)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Delete a user
    ///
    /// Their articles and ratings go with them via the cascading
    /// foreign keys.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
