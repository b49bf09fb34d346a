//! Admin-or-owner access policy
//!
//! Every mutation of an owned resource goes through the same predicate:
//! admins may act on anything, everyone else only on what they own.

use miniblog_shared::Role;

use crate::auth::middleware::AuthUser;
use crate::error::ApiError;

/// Whether an actor may operate on a resource owned by `owner_id`
pub fn allows(actor_role: Role, actor_id: i64, owner_id: i64) -> bool {
    actor_role == Role::Admin || actor_id == owner_id
}

/// Enforce the policy, turning a denial into a 403
pub fn require(actor: &AuthUser, owner_id: i64) -> Result<(), ApiError> {
    if allows(actor.role, actor.user_id, owner_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Role::Admin, 1, 1, true)]
    #[case(Role::Admin, 1, 2, true)]
    #[case(Role::User, 1, 1, true)]
    #[case(Role::User, 1, 2, false)]
    fn test_allows(
        #[case] role: Role,
        #[case] actor_id: i64,
        #[case] owner_id: i64,
        #[case] expected: bool,
    ) {
        assert_eq!(allows(role, actor_id, owner_id), expected);
    }

    #[test]
    fn test_require_denies_with_forbidden() {
        let actor = AuthUser {
            user_id: 5,
            username: "mallory".to_string(),
            role: Role::User,
        };

        let err = require(&actor, 6).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_require_allows_owner() {
        let actor = AuthUser {
            user_id: 5,
            username: "alice".to_string(),
            role: Role::User,
        };

        assert!(require(&actor, 5).is_ok());
    }
}
