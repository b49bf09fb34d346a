//! MiniBlog shared library
//!
//! Types, domain enums, and input validators shared between the backend
//! and API consumers.

pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use models::{ArticleStatus, Role};
pub use types::*;
