use chrono::Utc;
use sea_orm::DatabaseConnection;

use identity_domain::claim::{Claim, RoleClaim, UserClaim};
use identity_domain::login::{UserLogin, UserLoginInfo, UserToken};
use identity_domain::role::Role;
use identity_domain::user::{User, UserRole};
use identity_store::config::IdentityOptions;
use identity_store::domain::hooks::{IssuerHooks, RoleStoreHooks, UserStoreHooks};
use identity_store::domain::repository::{RoleStore, UserStore};
use identity_store::infra::db::{DbRoleStore, DbUserStore};
use identity_store::infra::memory::{MemoryRoleStore, MemoryTables, MemoryUserStore};
use identity_store::usecase::role_manager::RoleManager;
use identity_store::usecase::user_manager::UserManager;
use identity_testing::assertions::assert_succeeded;
use identity_testing::builders::{test_role, test_user};
use identity_testing::fixture::TestDatabase;

pub const LOGIN_CONTEXT: &str = "context";
pub const TOKEN_STUFF: &str = "stuff";
pub const ROLE_CREATED: &str = "created";

// ── Extended hooks ───────────────────────────────────────────────────────────

/// Claims carry their issuer; logins, tokens and role links carry one extra field each.
#[derive(Clone, Copy, Default)]
pub struct ExtendedUserHooks;

impl UserStoreHooks for ExtendedUserHooks {
    fn create_user_claim(&self, user: &User, claim: &Claim) -> UserClaim {
        UserStoreHooks::create_user_claim(&IssuerHooks, user, claim)
    }

    fn to_claim(&self, row: &UserClaim) -> Claim {
        UserStoreHooks::to_claim(&IssuerHooks, row)
    }

    fn create_user_role(&self, user: &User, role: &Role) -> UserRole {
        let mut row = UserRole::new(user.id, role.id);
        row.extensions.insert(ROLE_CREATED, Utc::now().to_rfc3339());
        row
    }

    fn create_user_login(&self, user: &User, login: &UserLoginInfo) -> UserLogin {
        let mut row = UserLogin::from_info(user.id, login);
        row.extensions.insert(LOGIN_CONTEXT, "integration");
        row
    }

    fn create_user_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
        value: &str,
    ) -> UserToken {
        let mut row = UserToken::new(user.id, login_provider, name, value);
        row.extensions.insert(TOKEN_STUFF, "extra");
        row
    }
}

#[derive(Clone, Copy, Default)]
pub struct ExtendedRoleHooks;

impl RoleStoreHooks for ExtendedRoleHooks {
    fn create_role_claim(&self, role: &Role, claim: &Claim) -> RoleClaim {
        RoleStoreHooks::create_role_claim(&IssuerHooks, role, claim)
    }

    fn to_claim(&self, row: &RoleClaim) -> Claim {
        RoleStoreHooks::to_claim(&IssuerHooks, row)
    }
}

// ── Managers ─────────────────────────────────────────────────────────────────

pub type DbUsers = UserManager<DbUserStore<DatabaseConnection, ExtendedUserHooks>>;
pub type DbRoles = RoleManager<DbRoleStore<DatabaseConnection, ExtendedRoleHooks>>;
pub type MemoryUsers = UserManager<MemoryUserStore<ExtendedUserHooks>>;
pub type MemoryRoles = RoleManager<MemoryRoleStore<ExtendedRoleHooks>>;

pub fn db_managers(fixture: &TestDatabase) -> (DbUsers, DbRoles) {
    (
        UserManager::new(
            DbUserStore::with_hooks(fixture.conn(), ExtendedUserHooks),
            IdentityOptions::default(),
        ),
        RoleManager::new(
            DbRoleStore::with_hooks(fixture.conn(), ExtendedRoleHooks),
            IdentityOptions::default(),
        ),
    )
}

pub fn memory_managers() -> (MemoryUsers, MemoryRoles) {
    let tables = MemoryTables::shared();
    (
        UserManager::new(
            MemoryUserStore::with_hooks(tables.clone(), ExtendedUserHooks),
            IdentityOptions::default(),
        ),
        RoleManager::new(
            MemoryRoleStore::with_hooks(tables, ExtendedRoleHooks),
            IdentityOptions::default(),
        ),
    )
}

pub async fn create_user<S: UserStore>(users: &UserManager<S>, prefix: &str) -> User {
    let mut user = test_user(prefix);
    assert_succeeded(&users.create(&mut user).await.unwrap());
    user
}

pub async fn create_role<S: RoleStore>(roles: &RoleManager<S>, prefix: &str) -> Role {
    let mut role = test_role(prefix);
    assert_succeeded(&roles.create(&mut role).await.unwrap());
    role
}
