//! In-memory stores with the same observable behavior as the sea-orm stores.
//!
//! User and role stores built over the same [`SharedTables`] see each other's
//! rows, so role membership and cascading deletes work across them.

use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use identity_domain::claim::{Claim, RoleClaim, UserClaim};
use identity_domain::login::{UserLogin, UserLoginInfo, UserToken};
use identity_domain::pagination::{PageRequest, Sort};
use identity_domain::query::NameMatch;
use identity_domain::result::{IdentityError, IdentityResult};
use identity_domain::role::Role;
use identity_domain::user::{User, UserRole};

use crate::domain::hooks::{DefaultRoleHooks, DefaultUserHooks, RoleStoreHooks, UserStoreHooks};
use crate::domain::repository::{
    QueryableRoleStore, QueryableUserStore, RoleClaimStore, RoleStore, UserClaimStore,
    UserEmailStore, UserLoginStore, UserRoleStore, UserStore, UserTokenStore,
};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct MemoryTables {
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub user_claims: Vec<UserClaim>,
    pub role_claims: Vec<RoleClaim>,
    pub user_logins: Vec<UserLogin>,
    pub user_tokens: Vec<UserToken>,
    pub user_roles: Vec<UserRole>,
    next_claim_id: i32,
}

pub type SharedTables = Arc<Mutex<MemoryTables>>;

impl MemoryTables {
    pub fn shared() -> SharedTables {
        Arc::new(Mutex::new(Self::default()))
    }

    fn next_claim_id(&mut self) -> i32 {
        self.next_claim_id += 1;
        self.next_claim_id
    }

    fn role_by_name(&self, normalized_name: &str) -> Option<&Role> {
        self.roles
            .iter()
            .find(|r| r.normalized_name == normalized_name)
    }
}

fn lock(tables: &SharedTables) -> Result<MutexGuard<'_, MemoryTables>, StoreError> {
    tables
        .lock()
        .map_err(|_| StoreError::Internal(anyhow::anyhow!("memory tables poisoned")))
}

fn new_stamp() -> String {
    Uuid::new_v4().to_string()
}

fn sorted_users(mut users: Vec<User>) -> Vec<User> {
    users.sort_by(|a, b| a.normalized_user_name.cmp(&b.normalized_user_name));
    users
}

fn same_user_claim(a: &UserClaim, b: &UserClaim) -> bool {
    a.claim_type == b.claim_type && a.claim_value == b.claim_value && a.extensions == b.extensions
}

fn same_role_claim(a: &RoleClaim, b: &RoleClaim) -> bool {
    a.role_id == b.role_id
        && a.claim_type == b.claim_type
        && a.claim_value == b.claim_value
        && a.extensions == b.extensions
}

// ── User store ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MemoryUserStore<H = DefaultUserHooks> {
    pub tables: SharedTables,
    pub hooks: H,
}

impl MemoryUserStore<DefaultUserHooks> {
    pub fn new(tables: SharedTables) -> Self {
        Self {
            tables,
            hooks: DefaultUserHooks,
        }
    }
}

impl<H> MemoryUserStore<H> {
    pub fn with_hooks(tables: SharedTables, hooks: H) -> Self {
        Self { tables, hooks }
    }
}

impl<H: UserStoreHooks> UserStore for MemoryUserStore<H> {
    async fn create(&self, user: &mut User) -> Result<IdentityResult, StoreError> {
        let mut t = lock(&self.tables)?;
        if t.users
            .iter()
            .any(|u| u.normalized_user_name == user.normalized_user_name)
        {
            return Ok(IdentityResult::failed(IdentityError::duplicate_user_name(
                &user.user_name,
            )));
        }
        if user.id.is_nil() {
            user.id = Uuid::now_v7();
        }
        if user.concurrency_stamp.is_empty() {
            user.concurrency_stamp = new_stamp();
        }
        t.users.push(user.clone());
        Ok(IdentityResult::success())
    }

    async fn update(&self, user: &mut User) -> Result<IdentityResult, StoreError> {
        let mut t = lock(&self.tables)?;
        let Some(idx) = t
            .users
            .iter()
            .position(|u| u.id == user.id && u.concurrency_stamp == user.concurrency_stamp)
        else {
            return Ok(IdentityResult::failed(IdentityError::concurrency_failure()));
        };
        if t.users.iter().any(|u| {
            u.id != user.id && u.normalized_user_name == user.normalized_user_name
        }) {
            return Ok(IdentityResult::failed(IdentityError::duplicate_user_name(
                &user.user_name,
            )));
        }
        user.concurrency_stamp = new_stamp();
        t.users[idx] = user.clone();
        Ok(IdentityResult::success())
    }

    async fn delete(&self, user: &User) -> Result<IdentityResult, StoreError> {
        let mut t = lock(&self.tables)?;
        let before = t.users.len();
        t.users
            .retain(|u| !(u.id == user.id && u.concurrency_stamp == user.concurrency_stamp));
        if t.users.len() == before {
            return Ok(IdentityResult::failed(IdentityError::concurrency_failure()));
        }
        t.user_claims.retain(|c| c.user_id != user.id);
        t.user_logins.retain(|l| l.user_id != user.id);
        t.user_tokens.retain(|k| k.user_id != user.id);
        t.user_roles.retain(|r| r.user_id != user.id);
        Ok(IdentityResult::success())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let t = lock(&self.tables)?;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_name(
        &self,
        normalized_user_name: &str,
    ) -> Result<Option<User>, StoreError> {
        let t = lock(&self.tables)?;
        Ok(t.users
            .iter()
            .find(|u| u.normalized_user_name == normalized_user_name)
            .cloned())
    }
}

impl<H: UserStoreHooks> UserEmailStore for MemoryUserStore<H> {
    async fn find_by_email(&self, normalized_email: &str) -> Result<Option<User>, StoreError> {
        let t = lock(&self.tables)?;
        let matches = t
            .users
            .iter()
            .filter(|u| u.normalized_email.as_deref() == Some(normalized_email))
            .cloned()
            .collect();
        Ok(sorted_users(matches).into_iter().next())
    }
}

impl<H: UserStoreHooks> QueryableUserStore for MemoryUserStore<H> {
    async fn query(&self, name: &NameMatch) -> Result<Vec<User>, StoreError> {
        debug_assert!(name.is_normalized(), "query operand must be normalized");
        let t = lock(&self.tables)?;
        let matches = t
            .users
            .iter()
            .filter(|u| name.matches(&u.normalized_user_name))
            .cloned()
            .collect();
        Ok(sorted_users(matches))
    }

    async fn list(&self, page: PageRequest, sort: Sort) -> Result<Vec<User>, StoreError> {
        let t = lock(&self.tables)?;
        let mut users = sorted_users(t.users.clone());
        if sort == Sort::Desc {
            users.reverse();
        }
        Ok(users
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }
}

impl<H: UserStoreHooks> UserClaimStore for MemoryUserStore<H> {
    async fn get_claims(&self, user: &User) -> Result<Vec<Claim>, StoreError> {
        let t = lock(&self.tables)?;
        Ok(t.user_claims
            .iter()
            .filter(|c| c.user_id == user.id)
            .map(|c| self.hooks.to_claim(c))
            .collect())
    }

    async fn add_claims(&self, user: &User, claims: &[Claim]) -> Result<(), StoreError> {
        let mut t = lock(&self.tables)?;
        for claim in claims {
            let mut row = self.hooks.create_user_claim(user, claim);
            row.id = t.next_claim_id();
            t.user_claims.push(row);
        }
        Ok(())
    }

    async fn replace_claim(
        &self,
        user: &User,
        claim: &Claim,
        new_claim: &Claim,
    ) -> Result<(), StoreError> {
        let old = self.hooks.create_user_claim(user, claim);
        let new = self.hooks.create_user_claim(user, new_claim);
        let mut t = lock(&self.tables)?;
        for row in t
            .user_claims
            .iter_mut()
            .filter(|c| c.user_id == user.id && same_user_claim(c, &old))
        {
            row.claim_type = new.claim_type.clone();
            row.claim_value = new.claim_value.clone();
            row.extensions = new.extensions.clone();
        }
        Ok(())
    }

    async fn remove_claims(&self, user: &User, claims: &[Claim]) -> Result<(), StoreError> {
        let mut t = lock(&self.tables)?;
        for claim in claims {
            let row = self.hooks.create_user_claim(user, claim);
            t.user_claims
                .retain(|c| !(c.user_id == user.id && same_user_claim(c, &row)));
        }
        Ok(())
    }

    async fn get_users_for_claim(&self, claim: &Claim) -> Result<Vec<User>, StoreError> {
        let row = self.hooks.create_user_claim(&User::new(""), claim);
        let t = lock(&self.tables)?;
        let owners: Vec<Uuid> = t
            .user_claims
            .iter()
            .filter(|c| same_user_claim(c, &row))
            .map(|c| c.user_id)
            .collect();
        let users = t
            .users
            .iter()
            .filter(|u| owners.contains(&u.id))
            .cloned()
            .collect();
        Ok(sorted_users(users))
    }
}

impl<H: UserStoreHooks> UserLoginStore for MemoryUserStore<H> {
    async fn add_login(&self, user: &User, login: &UserLoginInfo) -> Result<(), StoreError> {
        let row = self.hooks.create_user_login(user, login);
        let mut t = lock(&self.tables)?;
        if t.user_logins.iter().any(|l| {
            l.login_provider == row.login_provider && l.provider_key == row.provider_key
        }) {
            return Err(StoreError::Internal(anyhow::anyhow!(
                "login {}/{} already bound",
                row.login_provider,
                row.provider_key
            )));
        }
        t.user_logins.push(row);
        Ok(())
    }

    async fn remove_login(
        &self,
        user: &User,
        login_provider: &str,
        provider_key: &str,
    ) -> Result<(), StoreError> {
        let mut t = lock(&self.tables)?;
        t.user_logins.retain(|l| {
            !(l.user_id == user.id
                && l.login_provider == login_provider
                && l.provider_key == provider_key)
        });
        Ok(())
    }

    async fn get_logins(&self, user: &User) -> Result<Vec<UserLoginInfo>, StoreError> {
        let t = lock(&self.tables)?;
        let mut logins: Vec<UserLoginInfo> = t
            .user_logins
            .iter()
            .filter(|l| l.user_id == user.id)
            .map(UserLogin::to_info)
            .collect();
        logins.sort_by(|a, b| {
            (&a.login_provider, &a.provider_key).cmp(&(&b.login_provider, &b.provider_key))
        });
        Ok(logins)
    }

    async fn find_by_login(
        &self,
        login_provider: &str,
        provider_key: &str,
    ) -> Result<Option<User>, StoreError> {
        let t = lock(&self.tables)?;
        let Some(login) = t
            .user_logins
            .iter()
            .find(|l| l.login_provider == login_provider && l.provider_key == provider_key)
        else {
            return Ok(None);
        };
        Ok(t.users.iter().find(|u| u.id == login.user_id).cloned())
    }
}

impl<H: UserStoreHooks> UserTokenStore for MemoryUserStore<H> {
    async fn get_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
    ) -> Result<Option<String>, StoreError> {
        let t = lock(&self.tables)?;
        Ok(t.user_tokens
            .iter()
            .find(|k| k.user_id == user.id && k.login_provider == login_provider && k.name == name)
            .map(|k| k.value.clone()))
    }

    async fn set_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let row = self
            .hooks
            .create_user_token(user, login_provider, name, value);
        let mut t = lock(&self.tables)?;
        match t.user_tokens.iter_mut().find(|k| {
            k.user_id == row.user_id && k.login_provider == row.login_provider && k.name == row.name
        }) {
            Some(existing) => *existing = row,
            None => t.user_tokens.push(row),
        }
        Ok(())
    }

    async fn remove_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut t = lock(&self.tables)?;
        t.user_tokens.retain(|k| {
            !(k.user_id == user.id && k.login_provider == login_provider && k.name == name)
        });
        Ok(())
    }
}

impl<H: UserStoreHooks> UserRoleStore for MemoryUserStore<H> {
    async fn add_to_role(
        &self,
        user: &User,
        normalized_role_name: &str,
    ) -> Result<(), StoreError> {
        let mut t = lock(&self.tables)?;
        let Some(role) = t.role_by_name(normalized_role_name).cloned() else {
            return Err(StoreError::RoleNotFound(normalized_role_name.to_owned()));
        };
        if t.user_roles
            .iter()
            .any(|r| r.user_id == user.id && r.role_id == role.id)
        {
            return Err(StoreError::Internal(anyhow::anyhow!(
                "user already linked to role {normalized_role_name}"
            )));
        }
        let row = self.hooks.create_user_role(user, &role);
        t.user_roles.push(row);
        Ok(())
    }

    async fn remove_from_role(
        &self,
        user: &User,
        normalized_role_name: &str,
    ) -> Result<(), StoreError> {
        let mut t = lock(&self.tables)?;
        let Some(role_id) = t.role_by_name(normalized_role_name).map(|r| r.id) else {
            return Ok(());
        };
        t.user_roles
            .retain(|r| !(r.user_id == user.id && r.role_id == role_id));
        Ok(())
    }

    async fn get_roles(&self, user: &User) -> Result<Vec<String>, StoreError> {
        let t = lock(&self.tables)?;
        let mut names: Vec<String> = t
            .roles
            .iter()
            .filter(|role| {
                t.user_roles
                    .iter()
                    .any(|r| r.user_id == user.id && r.role_id == role.id)
            })
            .map(|role| role.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn is_in_role(
        &self,
        user: &User,
        normalized_role_name: &str,
    ) -> Result<bool, StoreError> {
        let t = lock(&self.tables)?;
        let Some(role) = t.role_by_name(normalized_role_name) else {
            return Ok(false);
        };
        Ok(t.user_roles
            .iter()
            .any(|r| r.user_id == user.id && r.role_id == role.id))
    }

    async fn get_users_in_role(
        &self,
        normalized_role_name: &str,
    ) -> Result<Vec<User>, StoreError> {
        let t = lock(&self.tables)?;
        let Some(role) = t.role_by_name(normalized_role_name) else {
            return Ok(Vec::new());
        };
        let users = t
            .users
            .iter()
            .filter(|u| {
                t.user_roles
                    .iter()
                    .any(|r| r.user_id == u.id && r.role_id == role.id)
            })
            .cloned()
            .collect();
        Ok(sorted_users(users))
    }
}

// ── Role store ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MemoryRoleStore<H = DefaultRoleHooks> {
    pub tables: SharedTables,
    pub hooks: H,
}

impl MemoryRoleStore<DefaultRoleHooks> {
    pub fn new(tables: SharedTables) -> Self {
        Self {
            tables,
            hooks: DefaultRoleHooks,
        }
    }
}

impl<H> MemoryRoleStore<H> {
    pub fn with_hooks(tables: SharedTables, hooks: H) -> Self {
        Self { tables, hooks }
    }
}

impl<H: RoleStoreHooks> RoleStore for MemoryRoleStore<H> {
    async fn create(&self, role: &mut Role) -> Result<IdentityResult, StoreError> {
        let mut t = lock(&self.tables)?;
        if t.role_by_name(&role.normalized_name).is_some() {
            return Ok(IdentityResult::failed(IdentityError::duplicate_role_name(
                &role.name,
            )));
        }
        if role.id.is_nil() {
            role.id = Uuid::now_v7();
        }
        if role.concurrency_stamp.is_empty() {
            role.concurrency_stamp = new_stamp();
        }
        t.roles.push(role.clone());
        Ok(IdentityResult::success())
    }

    async fn update(&self, role: &mut Role) -> Result<IdentityResult, StoreError> {
        let mut t = lock(&self.tables)?;
        let Some(idx) = t
            .roles
            .iter()
            .position(|r| r.id == role.id && r.concurrency_stamp == role.concurrency_stamp)
        else {
            return Ok(IdentityResult::failed(IdentityError::concurrency_failure()));
        };
        if t.roles
            .iter()
            .any(|r| r.id != role.id && r.normalized_name == role.normalized_name)
        {
            return Ok(IdentityResult::failed(IdentityError::duplicate_role_name(
                &role.name,
            )));
        }
        role.concurrency_stamp = new_stamp();
        t.roles[idx] = role.clone();
        Ok(IdentityResult::success())
    }

    async fn delete(&self, role: &Role) -> Result<IdentityResult, StoreError> {
        let mut t = lock(&self.tables)?;
        let before = t.roles.len();
        t.roles
            .retain(|r| !(r.id == role.id && r.concurrency_stamp == role.concurrency_stamp));
        if t.roles.len() == before {
            return Ok(IdentityResult::failed(IdentityError::concurrency_failure()));
        }
        t.role_claims.retain(|c| c.role_id != role.id);
        t.user_roles.retain(|r| r.role_id != role.id);
        Ok(IdentityResult::success())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, StoreError> {
        let t = lock(&self.tables)?;
        Ok(t.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_name(&self, normalized_name: &str) -> Result<Option<Role>, StoreError> {
        let t = lock(&self.tables)?;
        Ok(t.role_by_name(normalized_name).cloned())
    }
}

impl<H: RoleStoreHooks> RoleClaimStore for MemoryRoleStore<H> {
    async fn get_claims(&self, role: &Role) -> Result<Vec<Claim>, StoreError> {
        let t = lock(&self.tables)?;
        Ok(t.role_claims
            .iter()
            .filter(|c| c.role_id == role.id)
            .map(|c| self.hooks.to_claim(c))
            .collect())
    }

    async fn add_claim(&self, role: &Role, claim: &Claim) -> Result<(), StoreError> {
        let mut row = self.hooks.create_role_claim(role, claim);
        let mut t = lock(&self.tables)?;
        row.id = t.next_claim_id();
        t.role_claims.push(row);
        Ok(())
    }

    async fn remove_claim(&self, role: &Role, claim: &Claim) -> Result<(), StoreError> {
        let row = self.hooks.create_role_claim(role, claim);
        let mut t = lock(&self.tables)?;
        t.role_claims.retain(|c| !same_role_claim(c, &row));
        Ok(())
    }
}

impl<H: RoleStoreHooks> QueryableRoleStore for MemoryRoleStore<H> {
    async fn query(&self, name: &NameMatch) -> Result<Vec<Role>, StoreError> {
        debug_assert!(name.is_normalized(), "query operand must be normalized");
        let t = lock(&self.tables)?;
        let mut roles: Vec<Role> = t
            .roles
            .iter()
            .filter(|r| name.matches(&r.normalized_name))
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.normalized_name.cmp(&b.normalized_name));
        Ok(roles)
    }
}
