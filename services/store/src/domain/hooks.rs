//! Factory points a derived store overrides to populate extension fields.
//!
//! Every row a store persists on behalf of a caller is built here first. The
//! default implementations produce base rows with empty extensions; a derived
//! hooks type fills `extensions` (an issuer, a login context, a timestamp)
//! before the store writes the row. Claim matching uses the same factories, so
//! a claim is identified by everything its hook stores, not only type and value.

use identity_domain::claim::{Claim, RoleClaim, UserClaim};
use identity_domain::login::{UserLogin, UserLoginInfo, UserToken};
use identity_domain::role::Role;
use identity_domain::user::{User, UserRole};

/// Row factories used by user stores.
pub trait UserStoreHooks: Send + Sync {
    fn create_user_claim(&self, user: &User, claim: &Claim) -> UserClaim {
        UserClaim::from_claim(user.id, claim)
    }

    /// Inverse of [`create_user_claim`](Self::create_user_claim).
    fn to_claim(&self, row: &UserClaim) -> Claim {
        row.to_claim()
    }

    fn create_user_role(&self, user: &User, role: &Role) -> UserRole {
        UserRole::new(user.id, role.id)
    }

    fn create_user_login(&self, user: &User, login: &UserLoginInfo) -> UserLogin {
        UserLogin::from_info(user.id, login)
    }

    fn create_user_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
        value: &str,
    ) -> UserToken {
        UserToken::new(user.id, login_provider, name, value)
    }
}

/// Row factories used by role stores.
pub trait RoleStoreHooks: Send + Sync {
    fn create_role_claim(&self, role: &Role, claim: &Claim) -> RoleClaim {
        RoleClaim::from_claim(role.id, claim)
    }

    fn to_claim(&self, row: &RoleClaim) -> Claim {
        row.to_claim()
    }
}

/// Base rows only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUserHooks;

impl UserStoreHooks for DefaultUserHooks {}

/// Base rows only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRoleHooks;

impl RoleStoreHooks for DefaultRoleHooks {}

/// Extension key holding a claim's issuer.
pub const ISSUER: &str = "issuer";

/// Persists the claim issuer for both user and role claims.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssuerHooks;

impl IssuerHooks {
    fn claim_from(claim_type: &str, claim_value: &str, issuer: Option<&str>) -> Claim {
        let claim = Claim::new(claim_type, claim_value);
        match issuer {
            Some(issuer) => claim.with_issuer(issuer),
            None => claim,
        }
    }
}

impl UserStoreHooks for IssuerHooks {
    fn create_user_claim(&self, user: &User, claim: &Claim) -> UserClaim {
        let mut row = UserClaim::from_claim(user.id, claim);
        row.extensions.insert(ISSUER, claim.issuer.clone());
        row
    }

    fn to_claim(&self, row: &UserClaim) -> Claim {
        Self::claim_from(
            &row.claim_type,
            &row.claim_value,
            row.extensions.get_str(ISSUER),
        )
    }
}

impl RoleStoreHooks for IssuerHooks {
    fn create_role_claim(&self, role: &Role, claim: &Claim) -> RoleClaim {
        let mut row = RoleClaim::from_claim(role.id, claim);
        row.extensions.insert(ISSUER, claim.issuer.clone());
        row
    }

    fn to_claim(&self, row: &RoleClaim) -> Claim {
        Self::claim_from(
            &row.claim_type,
            &row.claim_value,
            row.extensions.get_str(ISSUER),
        )
    }
}
