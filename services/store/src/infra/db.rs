use anyhow::Context as _;
use sea_orm::{
    ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, Condition,
    ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, SqlErr, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use identity_core::sea_ext::FilterByName;
use identity_domain::claim::{Claim, RoleClaim, UserClaim};
use identity_domain::extensions::Extensions;
use identity_domain::login::UserLoginInfo;
use identity_domain::pagination::{PageRequest, Sort};
use identity_domain::query::NameMatch;
use identity_domain::result::{IdentityError, IdentityResult};
use identity_domain::role::Role;
use identity_domain::user::User;
use identity_store_schema::{
    role_claims, roles, user_claims, user_logins, user_roles, user_tokens, users,
};

use crate::domain::hooks::{DefaultRoleHooks, DefaultUserHooks, RoleStoreHooks, UserStoreHooks};
use crate::domain::repository::{
    QueryableRoleStore, QueryableUserStore, RoleClaimStore, RoleStore, UserClaimStore,
    UserEmailStore, UserLoginStore, UserRoleStore, UserStore, UserTokenStore,
};
use crate::error::StoreError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn new_stamp() -> String {
    Uuid::new_v4().to_string()
}

// ── User store ───────────────────────────────────────────────────────────────

/// User store over any sea-orm connection.
///
/// `C` is a [`DatabaseConnection`] for ordinary use. Passing a
/// `DatabaseTransaction` instead scopes every call to that transaction; the
/// caller takes it back with [`into_inner`](Self::into_inner) and commits.
#[derive(Clone)]
pub struct DbUserStore<C = DatabaseConnection, H = DefaultUserHooks> {
    pub db: C,
    pub hooks: H,
}

impl<C> DbUserStore<C, DefaultUserHooks> {
    pub fn new(db: C) -> Self {
        Self {
            db,
            hooks: DefaultUserHooks,
        }
    }
}

impl<C, H> DbUserStore<C, H> {
    pub fn with_hooks(db: C, hooks: H) -> Self {
        Self { db, hooks }
    }

    pub fn into_inner(self) -> C {
        self.db
    }
}

impl<C, H> DbUserStore<C, H>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
    H: UserStoreHooks,
{
    async fn find_role(&self, normalized_name: &str) -> Result<Option<roles::Model>, StoreError> {
        let model = roles::Entity::find()
            .filter(roles::Column::NormalizedName.eq(normalized_name))
            .one(&self.db)
            .await
            .context("find role by name")?;
        Ok(model)
    }
}

impl<C, H> UserStore for DbUserStore<C, H>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
    H: UserStoreHooks,
{
    async fn create(&self, user: &mut User) -> Result<IdentityResult, StoreError> {
        // Id and stamp only reach the caller once the row is stored.
        let mut row = user.clone();
        if row.id.is_nil() {
            row.id = Uuid::now_v7();
        }
        if row.concurrency_stamp.is_empty() {
            row.concurrency_stamp = new_stamp();
        }

        match users::Entity::insert(user_active_model(&row))
            .exec_without_returning(&self.db)
            .await
        {
            Ok(_) => {
                tracing::debug!(user_id = %row.id, "user created");
                *user = row;
                Ok(IdentityResult::success())
            }
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!(user_name = %user.user_name, "duplicate user name");
                Ok(IdentityResult::failed(IdentityError::duplicate_user_name(
                    &user.user_name,
                )))
            }
            Err(err) => Err(anyhow::Error::new(err).context("create user").into()),
        }
    }

    async fn update(&self, user: &mut User) -> Result<IdentityResult, StoreError> {
        let stamp = new_stamp();
        let mut am = user_active_model(user);
        am.id = NotSet;
        am.concurrency_stamp = Set(stamp.clone());

        let res = users::Entity::update_many()
            .set(am)
            .filter(users::Column::Id.eq(user.id))
            .filter(users::Column::ConcurrencyStamp.eq(user.concurrency_stamp.as_str()))
            .exec(&self.db)
            .await;

        match res {
            Ok(res) if res.rows_affected == 0 => {
                tracing::warn!(user_id = %user.id, "user update lost concurrency check");
                Ok(IdentityResult::failed(IdentityError::concurrency_failure()))
            }
            Ok(_) => {
                user.concurrency_stamp = stamp;
                Ok(IdentityResult::success())
            }
            Err(err) if is_unique_violation(&err) => Ok(IdentityResult::failed(
                IdentityError::duplicate_user_name(&user.user_name),
            )),
            Err(err) => Err(anyhow::Error::new(err).context("update user").into()),
        }
    }

    async fn delete(&self, user: &User) -> Result<IdentityResult, StoreError> {
        let txn = self.db.begin().await.context("begin delete user")?;

        let res = users::Entity::delete_many()
            .filter(users::Column::Id.eq(user.id))
            .filter(users::Column::ConcurrencyStamp.eq(user.concurrency_stamp.as_str()))
            .exec(&txn)
            .await
            .context("delete user")?;
        if res.rows_affected == 0 {
            txn.rollback().await.context("rollback delete user")?;
            tracing::warn!(user_id = %user.id, "user delete lost concurrency check");
            return Ok(IdentityResult::failed(IdentityError::concurrency_failure()));
        }

        user_claims::Entity::delete_many()
            .filter(user_claims::Column::UserId.eq(user.id))
            .exec(&txn)
            .await
            .context("delete user claims")?;
        user_logins::Entity::delete_many()
            .filter(user_logins::Column::UserId.eq(user.id))
            .exec(&txn)
            .await
            .context("delete user logins")?;
        user_tokens::Entity::delete_many()
            .filter(user_tokens::Column::UserId.eq(user.id))
            .exec(&txn)
            .await
            .context("delete user tokens")?;
        user_roles::Entity::delete_many()
            .filter(user_roles::Column::UserId.eq(user.id))
            .exec(&txn)
            .await
            .context("delete user roles")?;

        txn.commit().await.context("commit delete user")?;
        tracing::debug!(user_id = %user.id, "user deleted");
        Ok(IdentityResult::success())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_name(
        &self,
        normalized_user_name: &str,
    ) -> Result<Option<User>, StoreError> {
        let model = users::Entity::find()
            .filter(users::Column::NormalizedUserName.eq(normalized_user_name))
            .one(&self.db)
            .await
            .context("find user by name")?;
        Ok(model.map(user_from_model))
    }
}

impl<C, H> UserEmailStore for DbUserStore<C, H>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
    H: UserStoreHooks,
{
    async fn find_by_email(&self, normalized_email: &str) -> Result<Option<User>, StoreError> {
        let model = users::Entity::find()
            .filter(users::Column::NormalizedEmail.eq(normalized_email))
            .order_by_asc(users::Column::NormalizedUserName)
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }
}

impl<C, H> QueryableUserStore for DbUserStore<C, H>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
    H: UserStoreHooks,
{
    async fn query(&self, name: &NameMatch) -> Result<Vec<User>, StoreError> {
        debug_assert!(name.is_normalized(), "query operand must be normalized");
        let models = users::Entity::find()
            .filter_by_name(users::Column::NormalizedUserName, name)
            .order_by_asc(users::Column::NormalizedUserName)
            .all(&self.db)
            .await
            .context("query users by name")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn list(&self, page: PageRequest, sort: Sort) -> Result<Vec<User>, StoreError> {
        let select = users::Entity::find();
        let select = match sort {
            Sort::Asc => select.order_by_asc(users::Column::NormalizedUserName),
            Sort::Desc => select.order_by_desc(users::Column::NormalizedUserName),
        };
        let models = select
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }
}

/// Rows whose claim type, value and extensions equal `row`'s, for any owner.
fn user_claim_condition(row: &UserClaim) -> Condition {
    Condition::all()
        .add(user_claims::Column::ClaimType.eq(row.claim_type.as_str()))
        .add(user_claims::Column::ClaimValue.eq(row.claim_value.as_str()))
        .add(user_claims::Column::Extensions.eq(row.extensions.to_json_string()))
}

impl<C, H> UserClaimStore for DbUserStore<C, H>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
    H: UserStoreHooks,
{
    async fn get_claims(&self, user: &User) -> Result<Vec<Claim>, StoreError> {
        let models = user_claims::Entity::find()
            .filter(user_claims::Column::UserId.eq(user.id))
            .order_by_asc(user_claims::Column::Id)
            .all(&self.db)
            .await
            .context("list user claims")?;
        models
            .into_iter()
            .map(|m| user_claim_from_model(m).map(|row| self.hooks.to_claim(&row)))
            .collect()
    }

    async fn add_claims(&self, user: &User, claims: &[Claim]) -> Result<(), StoreError> {
        let txn = self.db.begin().await.context("begin add user claims")?;
        for claim in claims {
            let row = self.hooks.create_user_claim(user, claim);
            user_claims::Entity::insert(user_claims::ActiveModel {
                id: NotSet,
                user_id: Set(row.user_id),
                claim_type: Set(row.claim_type),
                claim_value: Set(row.claim_value),
                extensions: Set(row.extensions.to_json_string()),
            })
            .exec_without_returning(&txn)
            .await
            .context("insert user claim")?;
        }
        txn.commit().await.context("commit add user claims")?;
        tracing::debug!(user_id = %user.id, count = claims.len(), "user claims added");
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
        user_claims::Entity::update_many()
            .col_expr(user_claims::Column::ClaimType, Expr::value(new.claim_type))
            .col_expr(user_claims::Column::ClaimValue, Expr::value(new.claim_value))
            .col_expr(
                user_claims::Column::Extensions,
                Expr::value(new.extensions.to_json_string()),
            )
            .filter(user_claims::Column::UserId.eq(user.id))
            .filter(user_claim_condition(&old))
            .exec(&self.db)
            .await
            .context("replace user claim")?;
        Ok(())
    }

    async fn remove_claims(&self, user: &User, claims: &[Claim]) -> Result<(), StoreError> {
        let txn = self.db.begin().await.context("begin remove user claims")?;
        for claim in claims {
            let row = self.hooks.create_user_claim(user, claim);
            user_claims::Entity::delete_many()
                .filter(user_claims::Column::UserId.eq(user.id))
                .filter(user_claim_condition(&row))
                .exec(&txn)
                .await
                .context("delete user claim")?;
        }
        txn.commit().await.context("commit remove user claims")?;
        Ok(())
    }

    async fn get_users_for_claim(&self, claim: &Claim) -> Result<Vec<User>, StoreError> {
        // Owner is irrelevant to the match; a placeholder user drives the hook.
        let row = self.hooks.create_user_claim(&User::new(""), claim);
        let owners = user_claims::Entity::find()
            .select_only()
            .column(user_claims::Column::UserId)
            .filter(user_claim_condition(&row))
            .into_query();
        let models = users::Entity::find()
            .filter(users::Column::Id.in_subquery(owners))
            .order_by_asc(users::Column::NormalizedUserName)
            .all(&self.db)
            .await
            .context("find users for claim")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }
}

impl<C, H> UserLoginStore for DbUserStore<C, H>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
    H: UserStoreHooks,
{
    async fn add_login(&self, user: &User, login: &UserLoginInfo) -> Result<(), StoreError> {
        let row = self.hooks.create_user_login(user, login);
        user_logins::Entity::insert(user_logins::ActiveModel {
            login_provider: Set(row.login_provider),
            provider_key: Set(row.provider_key),
            provider_display_name: Set(row.provider_display_name),
            user_id: Set(row.user_id),
            extensions: Set(row.extensions.to_json_string()),
        })
        .exec_without_returning(&self.db)
        .await
        .context("insert user login")?;
        Ok(())
    }

    async fn remove_login(
        &self,
        user: &User,
        login_provider: &str,
        provider_key: &str,
    ) -> Result<(), StoreError> {
        user_logins::Entity::delete_many()
            .filter(user_logins::Column::UserId.eq(user.id))
            .filter(user_logins::Column::LoginProvider.eq(login_provider))
            .filter(user_logins::Column::ProviderKey.eq(provider_key))
            .exec(&self.db)
            .await
            .context("delete user login")?;
        Ok(())
    }

    async fn get_logins(&self, user: &User) -> Result<Vec<UserLoginInfo>, StoreError> {
        let models = user_logins::Entity::find()
            .filter(user_logins::Column::UserId.eq(user.id))
            .order_by_asc(user_logins::Column::LoginProvider)
            .order_by_asc(user_logins::Column::ProviderKey)
            .all(&self.db)
            .await
            .context("list user logins")?;
        Ok(models
            .into_iter()
            .map(|m| UserLoginInfo {
                login_provider: m.login_provider,
                provider_key: m.provider_key,
                provider_display_name: m.provider_display_name,
            })
            .collect())
    }

    async fn find_by_login(
        &self,
        login_provider: &str,
        provider_key: &str,
    ) -> Result<Option<User>, StoreError> {
        let Some(login) =
            user_logins::Entity::find_by_id((login_provider.to_owned(), provider_key.to_owned()))
                .one(&self.db)
                .await
                .context("find user login")?
        else {
            return Ok(None);
        };
        let model = login
            .find_related(users::Entity)
            .one(&self.db)
            .await
            .context("find user of login")?;
        Ok(model.map(user_from_model))
    }
}

impl<C, H> UserTokenStore for DbUserStore<C, H>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
    H: UserStoreHooks,
{
    async fn get_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
    ) -> Result<Option<String>, StoreError> {
        let model =
            user_tokens::Entity::find_by_id((user.id, login_provider.to_owned(), name.to_owned()))
                .one(&self.db)
                .await
                .context("find user token")?;
        Ok(model.map(|m| m.value))
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
        user_tokens::Entity::insert(user_tokens::ActiveModel {
            user_id: Set(row.user_id),
            login_provider: Set(row.login_provider),
            name: Set(row.name),
            value: Set(row.value),
            extensions: Set(row.extensions.to_json_string()),
        })
        .on_conflict(
            OnConflict::columns([
                user_tokens::Column::UserId,
                user_tokens::Column::LoginProvider,
                user_tokens::Column::Name,
            ])
            .update_columns([user_tokens::Column::Value, user_tokens::Column::Extensions])
            .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("upsert user token")?;
        Ok(())
    }

    async fn remove_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        user_tokens::Entity::delete_by_id((user.id, login_provider.to_owned(), name.to_owned()))
            .exec(&self.db)
            .await
            .context("delete user token")?;
        Ok(())
    }
}

impl<C, H> UserRoleStore for DbUserStore<C, H>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
    H: UserStoreHooks,
{
    async fn add_to_role(
        &self,
        user: &User,
        normalized_role_name: &str,
    ) -> Result<(), StoreError> {
        let Some(role) = self.find_role(normalized_role_name).await? else {
            return Err(StoreError::RoleNotFound(normalized_role_name.to_owned()));
        };
        let row = self.hooks.create_user_role(user, &role_from_model(role));
        user_roles::Entity::insert(user_roles::ActiveModel {
            user_id: Set(row.user_id),
            role_id: Set(row.role_id),
            extensions: Set(row.extensions.to_json_string()),
        })
        .exec_without_returning(&self.db)
        .await
        .context("insert user role")?;
        Ok(())
    }

    async fn remove_from_role(
        &self,
        user: &User,
        normalized_role_name: &str,
    ) -> Result<(), StoreError> {
        let Some(role) = self.find_role(normalized_role_name).await? else {
            return Ok(());
        };
        user_roles::Entity::delete_by_id((user.id, role.id))
            .exec(&self.db)
            .await
            .context("delete user role")?;
        Ok(())
    }

    async fn get_roles(&self, user: &User) -> Result<Vec<String>, StoreError> {
        let linked = user_roles::Entity::find()
            .select_only()
            .column(user_roles::Column::RoleId)
            .filter(user_roles::Column::UserId.eq(user.id))
            .into_query();
        let models = roles::Entity::find()
            .filter(roles::Column::Id.in_subquery(linked))
            .order_by_asc(roles::Column::Name)
            .all(&self.db)
            .await
            .context("list roles of user")?;
        Ok(models.into_iter().map(|m| m.name).collect())
    }

    async fn is_in_role(
        &self,
        user: &User,
        normalized_role_name: &str,
    ) -> Result<bool, StoreError> {
        let Some(role) = self.find_role(normalized_role_name).await? else {
            return Ok(false);
        };
        let link = user_roles::Entity::find_by_id((user.id, role.id))
            .one(&self.db)
            .await
            .context("find user role")?;
        Ok(link.is_some())
    }

    async fn get_users_in_role(
        &self,
        normalized_role_name: &str,
    ) -> Result<Vec<User>, StoreError> {
        let Some(role) = self.find_role(normalized_role_name).await? else {
            return Ok(Vec::new());
        };
        let members = user_roles::Entity::find()
            .select_only()
            .column(user_roles::Column::UserId)
            .filter(user_roles::Column::RoleId.eq(role.id))
            .into_query();
        let models = users::Entity::find()
            .filter(users::Column::Id.in_subquery(members))
            .order_by_asc(users::Column::NormalizedUserName)
            .all(&self.db)
            .await
            .context("list users in role")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }
}

fn user_active_model(user: &User) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id),
        user_name: Set(user.user_name.clone()),
        normalized_user_name: Set(user.normalized_user_name.clone()),
        email: Set(user.email.clone()),
        normalized_email: Set(user.normalized_email.clone()),
        email_confirmed: Set(user.email_confirmed),
        password_hash: Set(user.password_hash.clone()),
        security_stamp: Set(user.security_stamp.clone()),
        concurrency_stamp: Set(user.concurrency_stamp.clone()),
        phone_number: Set(user.phone_number.clone()),
        phone_number_confirmed: Set(user.phone_number_confirmed),
        two_factor_enabled: Set(user.two_factor_enabled),
        lockout_end: Set(user.lockout_end),
        lockout_enabled: Set(user.lockout_enabled),
        access_failed_count: Set(user.access_failed_count),
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        user_name: model.user_name,
        normalized_user_name: model.normalized_user_name,
        email: model.email,
        normalized_email: model.normalized_email,
        email_confirmed: model.email_confirmed,
        password_hash: model.password_hash,
        security_stamp: model.security_stamp,
        concurrency_stamp: model.concurrency_stamp,
        phone_number: model.phone_number,
        phone_number_confirmed: model.phone_number_confirmed,
        two_factor_enabled: model.two_factor_enabled,
        lockout_end: model.lockout_end,
        lockout_enabled: model.lockout_enabled,
        access_failed_count: model.access_failed_count,
    }
}

fn user_claim_from_model(model: user_claims::Model) -> Result<UserClaim, StoreError> {
    Ok(UserClaim {
        id: model.id,
        user_id: model.user_id,
        claim_type: model.claim_type,
        claim_value: model.claim_value,
        extensions: Extensions::from_json_str(&model.extensions)
            .context("decode user claim extensions")?,
    })
}

// ── Role store ───────────────────────────────────────────────────────────────

/// Role store over any sea-orm connection. See [`DbUserStore`] for `C`.
#[derive(Clone)]
pub struct DbRoleStore<C = DatabaseConnection, H = DefaultRoleHooks> {
    pub db: C,
    pub hooks: H,
}

impl<C> DbRoleStore<C, DefaultRoleHooks> {
    pub fn new(db: C) -> Self {
        Self {
            db,
            hooks: DefaultRoleHooks,
        }
    }
}

impl<C, H> DbRoleStore<C, H> {
    pub fn with_hooks(db: C, hooks: H) -> Self {
        Self { db, hooks }
    }

    pub fn into_inner(self) -> C {
        self.db
    }
}

impl<C, H> RoleStore for DbRoleStore<C, H>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
    H: RoleStoreHooks,
{
    async fn create(&self, role: &mut Role) -> Result<IdentityResult, StoreError> {
        let id = if role.id.is_nil() { Uuid::now_v7() } else { role.id };
        let stamp = if role.concurrency_stamp.is_empty() {
            new_stamp()
        } else {
            role.concurrency_stamp.clone()
        };

        let am = roles::ActiveModel {
            id: Set(id),
            name: Set(role.name.clone()),
            normalized_name: Set(role.normalized_name.clone()),
            concurrency_stamp: Set(stamp.clone()),
        };
        match roles::Entity::insert(am)
            .exec_without_returning(&self.db)
            .await
        {
            Ok(_) => {
                tracing::debug!(role_id = %id, "role created");
                role.id = id;
                role.concurrency_stamp = stamp;
                Ok(IdentityResult::success())
            }
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!(role_name = %role.name, "duplicate role name");
                Ok(IdentityResult::failed(IdentityError::duplicate_role_name(
                    &role.name,
                )))
            }
            Err(err) => Err(anyhow::Error::new(err).context("create role").into()),
        }
    }

    async fn update(&self, role: &mut Role) -> Result<IdentityResult, StoreError> {
        let stamp = new_stamp();
        let res = roles::Entity::update_many()
            .set(roles::ActiveModel {
                id: NotSet,
                name: Set(role.name.clone()),
                normalized_name: Set(role.normalized_name.clone()),
                concurrency_stamp: Set(stamp.clone()),
            })
            .filter(roles::Column::Id.eq(role.id))
            .filter(roles::Column::ConcurrencyStamp.eq(role.concurrency_stamp.as_str()))
            .exec(&self.db)
            .await;

        match res {
            Ok(res) if res.rows_affected == 0 => {
                tracing::warn!(role_id = %role.id, "role update lost concurrency check");
                Ok(IdentityResult::failed(IdentityError::concurrency_failure()))
            }
            Ok(_) => {
                role.concurrency_stamp = stamp;
                Ok(IdentityResult::success())
            }
            Err(err) if is_unique_violation(&err) => Ok(IdentityResult::failed(
                IdentityError::duplicate_role_name(&role.name),
            )),
            Err(err) => Err(anyhow::Error::new(err).context("update role").into()),
        }
    }

    async fn delete(&self, role: &Role) -> Result<IdentityResult, StoreError> {
        let txn = self.db.begin().await.context("begin delete role")?;

        let res = roles::Entity::delete_many()
            .filter(roles::Column::Id.eq(role.id))
            .filter(roles::Column::ConcurrencyStamp.eq(role.concurrency_stamp.as_str()))
            .exec(&txn)
            .await
            .context("delete role")?;
        if res.rows_affected == 0 {
            txn.rollback().await.context("rollback delete role")?;
            tracing::warn!(role_id = %role.id, "role delete lost concurrency check");
            return Ok(IdentityResult::failed(IdentityError::concurrency_failure()));
        }

        role_claims::Entity::delete_many()
            .filter(role_claims::Column::RoleId.eq(role.id))
            .exec(&txn)
            .await
            .context("delete role claims")?;
        user_roles::Entity::delete_many()
            .filter(user_roles::Column::RoleId.eq(role.id))
            .exec(&txn)
            .await
            .context("delete role members")?;

        txn.commit().await.context("commit delete role")?;
        tracing::debug!(role_id = %role.id, "role deleted");
        Ok(IdentityResult::success())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, StoreError> {
        let model = roles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find role by id")?;
        Ok(model.map(role_from_model))
    }

    async fn find_by_name(&self, normalized_name: &str) -> Result<Option<Role>, StoreError> {
        let model = roles::Entity::find()
            .filter(roles::Column::NormalizedName.eq(normalized_name))
            .one(&self.db)
            .await
            .context("find role by name")?;
        Ok(model.map(role_from_model))
    }
}

fn role_claim_condition(row: &RoleClaim) -> Condition {
    Condition::all()
        .add(role_claims::Column::RoleId.eq(row.role_id))
        .add(role_claims::Column::ClaimType.eq(row.claim_type.as_str()))
        .add(role_claims::Column::ClaimValue.eq(row.claim_value.as_str()))
        .add(role_claims::Column::Extensions.eq(row.extensions.to_json_string()))
}

impl<C, H> RoleClaimStore for DbRoleStore<C, H>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
    H: RoleStoreHooks,
{
    async fn get_claims(&self, role: &Role) -> Result<Vec<Claim>, StoreError> {
        let models = role_claims::Entity::find()
            .filter(role_claims::Column::RoleId.eq(role.id))
            .order_by_asc(role_claims::Column::Id)
            .all(&self.db)
            .await
            .context("list role claims")?;
        models
            .into_iter()
            .map(|m| role_claim_from_model(m).map(|row| self.hooks.to_claim(&row)))
            .collect()
    }

    async fn add_claim(&self, role: &Role, claim: &Claim) -> Result<(), StoreError> {
        let row = self.hooks.create_role_claim(role, claim);
        role_claims::Entity::insert(role_claims::ActiveModel {
            id: NotSet,
            role_id: Set(row.role_id),
            claim_type: Set(row.claim_type),
            claim_value: Set(row.claim_value),
            extensions: Set(row.extensions.to_json_string()),
        })
        .exec_without_returning(&self.db)
        .await
        .context("insert role claim")?;
        Ok(())
    }

    async fn remove_claim(&self, role: &Role, claim: &Claim) -> Result<(), StoreError> {
        let row = self.hooks.create_role_claim(role, claim);
        role_claims::Entity::delete_many()
            .filter(role_claim_condition(&row))
            .exec(&self.db)
            .await
            .context("delete role claim")?;
        Ok(())
    }
}

impl<C, H> QueryableRoleStore for DbRoleStore<C, H>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
    H: RoleStoreHooks,
{
    async fn query(&self, name: &NameMatch) -> Result<Vec<Role>, StoreError> {
        debug_assert!(name.is_normalized(), "query operand must be normalized");
        let models = roles::Entity::find()
            .filter_by_name(roles::Column::NormalizedName, name)
            .order_by_asc(roles::Column::NormalizedName)
            .all(&self.db)
            .await
            .context("query roles by name")?;
        Ok(models.into_iter().map(role_from_model).collect())
    }
}

fn role_from_model(model: roles::Model) -> Role {
    Role {
        id: model.id,
        name: model.name,
        normalized_name: model.normalized_name,
        concurrency_stamp: model.concurrency_stamp,
    }
}

fn role_claim_from_model(model: role_claims::Model) -> Result<RoleClaim, StoreError> {
    Ok(RoleClaim {
        id: model.id,
        role_id: model.role_id,
        claim_type: model.claim_type,
        claim_value: model.claim_value,
        extensions: Extensions::from_json_str(&model.extensions)
            .context("decode role claim extensions")?,
    })
}
