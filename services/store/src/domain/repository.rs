#![allow(async_fn_in_trait)]

//! Capability traits consumed by the managers.
//!
//! A store implements any subset; manager methods are only available for the
//! capabilities its store provides. Names passed to lookups are already
//! normalized.

use uuid::Uuid;

use identity_domain::claim::Claim;
use identity_domain::login::UserLoginInfo;
use identity_domain::pagination::{PageRequest, Sort};
use identity_domain::query::NameMatch;
use identity_domain::result::IdentityResult;
use identity_domain::role::Role;
use identity_domain::user::User;

use crate::error::StoreError;

/// Core user persistence.
pub trait UserStore: Send + Sync {
    /// Insert `user`, assigning an id when nil and a concurrency stamp when empty.
    /// A taken normalized user name yields a failed result, not an error.
    async fn create(&self, user: &mut User) -> Result<IdentityResult, StoreError>;

    /// Write `user` if its concurrency stamp still matches, then rotate the stamp.
    async fn update(&self, user: &mut User) -> Result<IdentityResult, StoreError>;

    /// Delete `user` and everything it owns if its concurrency stamp still matches.
    async fn delete(&self, user: &User) -> Result<IdentityResult, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_name(&self, normalized_user_name: &str)
    -> Result<Option<User>, StoreError>;
}

/// Lookup by normalized email.
pub trait UserEmailStore: UserStore {
    async fn find_by_email(&self, normalized_email: &str) -> Result<Option<User>, StoreError>;
}

/// Predicate queries and paging over users, by normalized user name.
pub trait QueryableUserStore: UserStore {
    /// `name` must already be normalized; see [`NameMatch::normalized`].
    async fn query(&self, name: &NameMatch) -> Result<Vec<User>, StoreError>;

    async fn list(&self, page: PageRequest, sort: Sort) -> Result<Vec<User>, StoreError>;
}

/// Claims owned by users. Each claim row belongs to exactly one user.
pub trait UserClaimStore: UserStore {
    async fn get_claims(&self, user: &User) -> Result<Vec<Claim>, StoreError>;

    async fn add_claims(&self, user: &User, claims: &[Claim]) -> Result<(), StoreError>;

    /// Rewrite every row of `user` matching `claim` (full identity) to `new_claim`.
    async fn replace_claim(
        &self,
        user: &User,
        claim: &Claim,
        new_claim: &Claim,
    ) -> Result<(), StoreError>;

    /// Delete the rows of `user` matching each claim. Missing claims are ignored.
    async fn remove_claims(&self, user: &User, claims: &[Claim]) -> Result<(), StoreError>;

    async fn get_users_for_claim(&self, claim: &Claim) -> Result<Vec<User>, StoreError>;
}

/// External provider logins.
pub trait UserLoginStore: UserStore {
    async fn add_login(&self, user: &User, login: &UserLoginInfo) -> Result<(), StoreError>;

    /// No-op when the login is not bound to `user`.
    async fn remove_login(
        &self,
        user: &User,
        login_provider: &str,
        provider_key: &str,
    ) -> Result<(), StoreError>;

    async fn get_logins(&self, user: &User) -> Result<Vec<UserLoginInfo>, StoreError>;

    async fn find_by_login(
        &self,
        login_provider: &str,
        provider_key: &str,
    ) -> Result<Option<User>, StoreError>;
}

/// Authentication tokens, one value per `(user, provider, name)`.
pub trait UserTokenStore: UserStore {
    async fn get_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
    ) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite.
    async fn set_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
        value: &str,
    ) -> Result<(), StoreError>;

    /// No-op when absent.
    async fn remove_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
    ) -> Result<(), StoreError>;
}

/// Role membership of users.
pub trait UserRoleStore: UserStore {
    /// Fails with [`StoreError::RoleNotFound`] when no role has that name.
    async fn add_to_role(&self, user: &User, normalized_role_name: &str)
    -> Result<(), StoreError>;

    /// No-op when the role or the link does not exist.
    async fn remove_from_role(
        &self,
        user: &User,
        normalized_role_name: &str,
    ) -> Result<(), StoreError>;

    /// Role names of `user`, sorted.
    async fn get_roles(&self, user: &User) -> Result<Vec<String>, StoreError>;

    async fn is_in_role(&self, user: &User, normalized_role_name: &str)
    -> Result<bool, StoreError>;

    async fn get_users_in_role(&self, normalized_role_name: &str)
    -> Result<Vec<User>, StoreError>;
}

/// Core role persistence.
pub trait RoleStore: Send + Sync {
    async fn create(&self, role: &mut Role) -> Result<IdentityResult, StoreError>;

    async fn update(&self, role: &mut Role) -> Result<IdentityResult, StoreError>;

    /// Delete `role`, its claims and its user links.
    async fn delete(&self, role: &Role) -> Result<IdentityResult, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, StoreError>;

    async fn find_by_name(&self, normalized_name: &str) -> Result<Option<Role>, StoreError>;
}

/// Claims owned by roles.
pub trait RoleClaimStore: RoleStore {
    async fn get_claims(&self, role: &Role) -> Result<Vec<Claim>, StoreError>;

    async fn add_claim(&self, role: &Role, claim: &Claim) -> Result<(), StoreError>;

    /// No-op when absent.
    async fn remove_claim(&self, role: &Role, claim: &Claim) -> Result<(), StoreError>;
}

/// Predicate queries over roles, by normalized name.
pub trait QueryableRoleStore: RoleStore {
    /// `name` must already be normalized; see [`NameMatch::normalized`].
    async fn query(&self, name: &NameMatch) -> Result<Vec<Role>, StoreError>;
}
