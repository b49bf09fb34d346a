//! Business logic services
//!
//! Services hold the application rules between the HTTP routes and the
//! repositories. They are stateless; everything they need arrives as
//! arguments.

pub mod article;
pub mod user;

pub use article::ArticleService;
pub use user::UserService;
