//! API request and response types

use crate::models::{ArticleStatus, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Generic message response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 3, max = 40))]
    pub user_name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Session token response returned by register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// ============================================================================
// Users
// ============================================================================

/// Public user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub user_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 3, max = 40))]
    pub user_name: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(length(max = 500))]
    pub avatar_url: Option<String>,
}

// ============================================================================
// Articles
// ============================================================================

/// Article creation request; the author comes from the request path
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewArticleRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(max = 500))]
    pub cover_image: Option<String>,
    #[serde(default)]
    #[validate(length(max = 25))]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ArticleStatus,
}

/// Partial article update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(length(max = 500))]
    pub cover_image: Option<String>,
    #[validate(length(max = 25))]
    pub tags: Option<Vec<String>>,
    pub status: Option<ArticleStatus>,
}

/// Rating upsert request
///
/// The 1-5 bound lives here at the API boundary; the service and
/// repository accept whatever the caller validated.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RateArticleRequest {
    #[validate(range(min = 1, max = 5))]
    pub rate: Option<i32>,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// A single rating attached to an article view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingResponse {
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Article read projection with its ratings and aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub author_id: i64,
    pub author_user_name: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub status: ArticleStatus,
    /// Mean of the numeric rates; absent (never 0) when no rating
    /// carries a numeric rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rate: Option<f64>,
    pub ratings: Vec<RatingResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
