//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod article;
pub mod token_blacklist;
pub mod user;

pub use article::{
    ArticleDetailRecord, ArticleRecord, ArticleRepository, CreateArticle, RatingDetailRecord,
    RatingRepository, UpdateArticle,
};
pub use token_blacklist::TokenBlacklistRepository;
pub use user::{CreateUser, UpdateUser, UserRecord, UserRepository};
