use chrono::{DateTime, Utc};
use uuid::Uuid;

use identity_domain::claim::Claim;
use identity_domain::login::UserLoginInfo;
use identity_domain::normalize::normalize_name;
use identity_domain::pagination::{PageRequest, Sort};
use identity_domain::query::NameMatch;
use identity_domain::result::{IdentityError, IdentityResult};
use identity_domain::user::User;

use crate::config::IdentityOptions;
use crate::domain::repository::{
    QueryableUserStore, UserClaimStore, UserEmailStore, UserLoginStore, UserRoleStore, UserStore,
    UserTokenStore,
};
use crate::error::StoreError;

/// Drives a user store: validation, normalization, stamps and lockout.
///
/// Methods are grouped by the capability they need, so a manager over a store
/// without, say, [`UserTokenStore`] simply has no token methods.
pub struct UserManager<S> {
    pub store: S,
    pub options: IdentityOptions,
}

// ── Core ─────────────────────────────────────────────────────────────────────

impl<S: UserStore> UserManager<S> {
    pub fn new(store: S, options: IdentityOptions) -> Self {
        Self { store, options }
    }

    fn validate(user: &User) -> Option<IdentityError> {
        if user.user_name.trim().is_empty() {
            return Some(IdentityError::invalid_user_name(&user.user_name));
        }
        None
    }

    fn normalize(user: &mut User) {
        user.normalized_user_name = normalize_name(&user.user_name);
        user.normalized_email = user.email.as_deref().map(normalize_name);
    }

    pub async fn create(&self, user: &mut User) -> Result<IdentityResult, StoreError> {
        if let Some(err) = Self::validate(user) {
            return Ok(IdentityResult::failed(err));
        }
        Self::normalize(user);
        if user.security_stamp.is_none() {
            user.security_stamp = Some(Uuid::new_v4().to_string());
        }
        if self.options.lockout.allowed_for_new_users {
            user.lockout_enabled = true;
        }
        self.store.create(user).await
    }

    pub async fn update(&self, user: &mut User) -> Result<IdentityResult, StoreError> {
        if let Some(err) = Self::validate(user) {
            return Ok(IdentityResult::failed(err));
        }
        if user.id.is_nil() {
            return Ok(IdentityResult::failed(IdentityError::user_not_found()));
        }
        Self::normalize(user);
        self.store.update(user).await
    }

    pub async fn delete(&self, user: &User) -> Result<IdentityResult, StoreError> {
        if user.id.is_nil() {
            return Ok(IdentityResult::failed(IdentityError::user_not_found()));
        }
        self.store.delete(user).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.store.find_by_id(id).await
    }

    pub async fn find_by_name(&self, user_name: &str) -> Result<Option<User>, StoreError> {
        self.store.find_by_name(&normalize_name(user_name)).await
    }

    pub async fn set_user_name(
        &self,
        user: &mut User,
        user_name: &str,
    ) -> Result<IdentityResult, StoreError> {
        user.user_name = user_name.to_owned();
        self.update_security_stamp(user).await
    }

    /// Rotate the security stamp and persist.
    pub async fn update_security_stamp(
        &self,
        user: &mut User,
    ) -> Result<IdentityResult, StoreError> {
        user.security_stamp = Some(Uuid::new_v4().to_string());
        self.update(user).await
    }

    // ── Password ─────────────────────────────────────────────────────────────

    /// Store an already-computed hash (or clear it with `None`).
    pub async fn set_password_hash(
        &self,
        user: &mut User,
        password_hash: Option<String>,
    ) -> Result<IdentityResult, StoreError> {
        user.password_hash = password_hash;
        self.update_security_stamp(user).await
    }

    pub fn has_password(&self, user: &User) -> bool {
        user.password_hash.is_some()
    }

    // ── Lockout ──────────────────────────────────────────────────────────────

    pub fn is_locked_out(&self, user: &User) -> bool {
        user.is_locked_out_at(Utc::now())
    }

    pub async fn set_lockout_enabled(
        &self,
        user: &mut User,
        enabled: bool,
    ) -> Result<IdentityResult, StoreError> {
        user.lockout_enabled = enabled;
        self.update(user).await
    }

    pub async fn set_lockout_end_date(
        &self,
        user: &mut User,
        lockout_end: Option<DateTime<Utc>>,
    ) -> Result<IdentityResult, StoreError> {
        if !user.lockout_enabled {
            return Ok(IdentityResult::failed(
                IdentityError::user_lockout_not_enabled(),
            ));
        }
        user.lockout_end = lockout_end;
        self.update(user).await
    }

    /// Record a failed access. Reaching the configured maximum locks the user
    /// out for the default timespan and resets the counter.
    pub async fn access_failed(&self, user: &mut User) -> Result<IdentityResult, StoreError> {
        let lockout = &self.options.lockout;
        user.access_failed_count += 1;
        if user.access_failed_count >= lockout.max_failed_access_attempts {
            user.lockout_end = Some(lockout_until(Utc::now(), lockout.default_lockout_timespan));
            user.access_failed_count = 0;
            tracing::info!(user_id = %user.id, until = ?user.lockout_end, "user locked out");
        }
        self.update(user).await
    }

    pub async fn reset_access_failed_count(
        &self,
        user: &mut User,
    ) -> Result<IdentityResult, StoreError> {
        if user.access_failed_count == 0 {
            return Ok(IdentityResult::success());
        }
        user.access_failed_count = 0;
        self.update(user).await
    }
}

/// End of a lockout starting at `now`, capped at the latest representable time.
fn lockout_until(now: DateTime<Utc>, timespan: chrono::Duration) -> DateTime<Utc> {
    now.checked_add_signed(timespan).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// ── Email ────────────────────────────────────────────────────────────────────

impl<S: UserEmailStore> UserManager<S> {
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.store.find_by_email(&normalize_name(email)).await
    }

    /// Change the email. The new address starts unconfirmed.
    pub async fn set_email(
        &self,
        user: &mut User,
        email: Option<String>,
    ) -> Result<IdentityResult, StoreError> {
        user.email = email;
        user.email_confirmed = false;
        self.update_security_stamp(user).await
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

impl<S: QueryableUserStore> UserManager<S> {
    pub async fn find_users(&self, name: &NameMatch) -> Result<Vec<User>, StoreError> {
        self.store.query(&name.normalized()).await
    }

    pub async fn list_users(
        &self,
        page: PageRequest,
        sort: Sort,
    ) -> Result<Vec<User>, StoreError> {
        self.store.list(page, sort).await
    }
}

// ── Claims ───────────────────────────────────────────────────────────────────

impl<S: UserClaimStore> UserManager<S> {
    pub async fn get_claims(&self, user: &User) -> Result<Vec<Claim>, StoreError> {
        self.store.get_claims(user).await
    }

    pub async fn add_claim(
        &self,
        user: &mut User,
        claim: &Claim,
    ) -> Result<IdentityResult, StoreError> {
        self.add_claims(user, std::slice::from_ref(claim)).await
    }

    pub async fn add_claims(
        &self,
        user: &mut User,
        claims: &[Claim],
    ) -> Result<IdentityResult, StoreError> {
        self.store.add_claims(user, claims).await?;
        self.update(user).await
    }

    pub async fn replace_claim(
        &self,
        user: &mut User,
        claim: &Claim,
        new_claim: &Claim,
    ) -> Result<IdentityResult, StoreError> {
        self.store.replace_claim(user, claim, new_claim).await?;
        self.update(user).await
    }

    pub async fn remove_claim(
        &self,
        user: &mut User,
        claim: &Claim,
    ) -> Result<IdentityResult, StoreError> {
        self.remove_claims(user, std::slice::from_ref(claim)).await
    }

    pub async fn remove_claims(
        &self,
        user: &mut User,
        claims: &[Claim],
    ) -> Result<IdentityResult, StoreError> {
        self.store.remove_claims(user, claims).await?;
        self.update(user).await
    }

    pub async fn get_users_for_claim(&self, claim: &Claim) -> Result<Vec<User>, StoreError> {
        self.store.get_users_for_claim(claim).await
    }
}

// ── Logins ───────────────────────────────────────────────────────────────────

impl<S: UserLoginStore> UserManager<S> {
    pub async fn add_login(
        &self,
        user: &mut User,
        login: &UserLoginInfo,
    ) -> Result<IdentityResult, StoreError> {
        if self
            .store
            .find_by_login(&login.login_provider, &login.provider_key)
            .await?
            .is_some()
        {
            return Ok(IdentityResult::failed(
                IdentityError::login_already_associated(),
            ));
        }
        self.store.add_login(user, login).await?;
        self.update(user).await
    }

    pub async fn remove_login(
        &self,
        user: &mut User,
        login_provider: &str,
        provider_key: &str,
    ) -> Result<IdentityResult, StoreError> {
        self.store
            .remove_login(user, login_provider, provider_key)
            .await?;
        self.update_security_stamp(user).await
    }

    pub async fn get_logins(&self, user: &User) -> Result<Vec<UserLoginInfo>, StoreError> {
        self.store.get_logins(user).await
    }

    pub async fn find_by_login(
        &self,
        login_provider: &str,
        provider_key: &str,
    ) -> Result<Option<User>, StoreError> {
        self.store.find_by_login(login_provider, provider_key).await
    }
}

// ── Tokens ───────────────────────────────────────────────────────────────────

impl<S: UserTokenStore> UserManager<S> {
    pub async fn get_authentication_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
    ) -> Result<Option<String>, StoreError> {
        self.store.get_token(user, login_provider, name).await
    }

    pub async fn set_authentication_token(
        &self,
        user: &mut User,
        login_provider: &str,
        name: &str,
        value: &str,
    ) -> Result<IdentityResult, StoreError> {
        self.store
            .set_token(user, login_provider, name, value)
            .await?;
        self.update(user).await
    }

    pub async fn remove_authentication_token(
        &self,
        user: &mut User,
        login_provider: &str,
        name: &str,
    ) -> Result<IdentityResult, StoreError> {
        self.store.remove_token(user, login_provider, name).await?;
        self.update(user).await
    }
}

// ── Roles ────────────────────────────────────────────────────────────────────

impl<S: UserRoleStore> UserManager<S> {
    pub async fn add_to_role(
        &self,
        user: &mut User,
        role_name: &str,
    ) -> Result<IdentityResult, StoreError> {
        let normalized = normalize_name(role_name);
        if self.store.is_in_role(user, &normalized).await? {
            return Ok(IdentityResult::failed(IdentityError::user_already_in_role(
                role_name,
            )));
        }
        self.store.add_to_role(user, &normalized).await?;
        self.update(user).await
    }

    pub async fn remove_from_role(
        &self,
        user: &mut User,
        role_name: &str,
    ) -> Result<IdentityResult, StoreError> {
        let normalized = normalize_name(role_name);
        if !self.store.is_in_role(user, &normalized).await? {
            return Ok(IdentityResult::failed(IdentityError::user_not_in_role(
                role_name,
            )));
        }
        self.store.remove_from_role(user, &normalized).await?;
        self.update(user).await
    }

    pub async fn get_roles(&self, user: &User) -> Result<Vec<String>, StoreError> {
        self.store.get_roles(user).await
    }

    pub async fn is_in_role(&self, user: &User, role_name: &str) -> Result<bool, StoreError> {
        self.store.is_in_role(user, &normalize_name(role_name)).await
    }

    pub async fn get_users_in_role(&self, role_name: &str) -> Result<Vec<User>, StoreError> {
        self.store
            .get_users_in_role(&normalize_name(role_name))
            .await
    }
}
