//! Role and ownership checks evaluated per request
//!
//! Reads are unrestricted for authenticated users; the predicates below only
//! narrow who may mutate a record.

use crate::{
    error::{AppError, AppResult},
    models::user::UserClaims,
};

/// Kind of access a request performs on a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

pub fn is_admin(claims: &UserClaims) -> bool {
    claims.is_admin()
}

/// Book mutations: owner or admin
pub fn is_owner_or_read_only(claims: &UserClaims, access: Access, owner_id: i32) -> bool {
    access == Access::Read || claims.user_id == owner_id || is_admin(claims)
}

/// Rental mutations: renter, book owner or admin
pub fn is_renter_or_owner_or_admin(
    claims: &UserClaims,
    access: Access,
    renter_id: i32,
    owner_id: i32,
) -> bool {
    access == Access::Read
        || claims.user_id == renter_id
        || claims.user_id == owner_id
        || is_admin(claims)
}

/// Review mutations: author or admin
pub fn is_reviewer_or_read_only(claims: &UserClaims, access: Access, reviewer_id: i32) -> bool {
    access == Access::Read || claims.user_id == reviewer_id || is_admin(claims)
}

/// Turn a predicate result into an authorization error
pub fn require(allowed: bool, message: &str) -> AppResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::Authorization(message.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::user::{Role, TokenType};

    pub(crate) fn claims(user_id: i32, role: Role) -> UserClaims {
        UserClaims {
            sub: format!("user{}", user_id),
            user_id,
            role,
            token_type: TokenType::Access,
            exp: i64::MAX,
            iat: 0,
        }
    }

    #[test]
    fn anyone_reads_books_only_owner_or_admin_writes() {
        let owner = claims(1, Role::Owner);
        let other = claims(2, Role::Owner);
        let admin = claims(3, Role::Admin);

        assert!(is_owner_or_read_only(&other, Access::Read, 1));
        assert!(is_owner_or_read_only(&owner, Access::Write, 1));
        assert!(is_owner_or_read_only(&admin, Access::Write, 1));
        assert!(!is_owner_or_read_only(&other, Access::Write, 1));
    }

    #[test]
    fn rental_parties_may_modify() {
        let renter = claims(10, Role::Renter);
        let owner = claims(20, Role::Owner);
        let admin = claims(30, Role::Admin);
        let viewer = claims(40, Role::Viewer);

        assert!(is_renter_or_owner_or_admin(&renter, Access::Write, 10, 20));
        assert!(is_renter_or_owner_or_admin(&owner, Access::Write, 10, 20));
        assert!(is_renter_or_owner_or_admin(&admin, Access::Write, 10, 20));
        assert!(!is_renter_or_owner_or_admin(&viewer, Access::Write, 10, 20));
        assert!(is_renter_or_owner_or_admin(&viewer, Access::Read, 10, 20));
    }

    #[test]
    fn only_reviewer_or_admin_edits_review() {
        let author = claims(5, Role::Renter);
        let stranger = claims(6, Role::Renter);
        let admin = claims(1, Role::Admin);

        assert!(is_reviewer_or_read_only(&author, Access::Write, 5));
        assert!(is_reviewer_or_read_only(&admin, Access::Write, 5));
        assert!(!is_reviewer_or_read_only(&stranger, Access::Write, 5));
    }

    #[test]
    fn require_maps_denial_to_authorization_error() {
        assert!(require(true, "nope").is_ok());
        assert!(matches!(require(false, "nope"), Err(AppError::Authorization(m)) if m == "nope"));
    }
}
