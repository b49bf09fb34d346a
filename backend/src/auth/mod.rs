//! Authentication and authorization

pub mod middleware;
pub mod password;
pub mod policy;
pub mod session;
pub mod token;

pub use middleware::{ActiveUser, AuthUser, BearerToken};
pub use password::PasswordService;
pub use session::{SessionError, SessionService};
pub use token::{AuthError, Claims, TokenSigner};
