use uuid::Uuid;

use identity_domain::claim::Claim;
use identity_domain::normalize::normalize_name;
use identity_domain::query::NameMatch;
use identity_domain::result::{IdentityError, IdentityResult};
use identity_domain::role::Role;

use crate::config::IdentityOptions;
use crate::domain::repository::{QueryableRoleStore, RoleClaimStore, RoleStore};
use crate::error::StoreError;

pub struct RoleManager<S> {
    pub store: S,
    pub options: IdentityOptions,
}

impl<S: RoleStore> RoleManager<S> {
    pub fn new(store: S, options: IdentityOptions) -> Self {
        Self { store, options }
    }

    fn validate(role: &Role) -> Option<IdentityError> {
        if role.name.trim().is_empty() {
            return Some(IdentityError::invalid_role_name(&role.name));
        }
        None
    }

    pub async fn create(&self, role: &mut Role) -> Result<IdentityResult, StoreError> {
        if let Some(err) = Self::validate(role) {
            return Ok(IdentityResult::failed(err));
        }
        role.normalized_name = normalize_name(&role.name);
        self.store.create(role).await
    }

    pub async fn update(&self, role: &mut Role) -> Result<IdentityResult, StoreError> {
        if let Some(err) = Self::validate(role) {
            return Ok(IdentityResult::failed(err));
        }
        role.normalized_name = normalize_name(&role.name);
        self.store.update(role).await
    }

    pub async fn set_role_name(
        &self,
        role: &mut Role,
        name: &str,
    ) -> Result<IdentityResult, StoreError> {
        role.name = name.to_owned();
        self.update(role).await
    }

    pub async fn delete(&self, role: &Role) -> Result<IdentityResult, StoreError> {
        self.store.delete(role).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, StoreError> {
        self.store.find_by_id(id).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        self.store.find_by_name(&normalize_name(name)).await
    }

    pub async fn role_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_name(name).await?.is_some())
    }
}

impl<S: RoleClaimStore> RoleManager<S> {
    pub async fn get_claims(&self, role: &Role) -> Result<Vec<Claim>, StoreError> {
        self.store.get_claims(role).await
    }

    pub async fn add_claim(
        &self,
        role: &mut Role,
        claim: &Claim,
    ) -> Result<IdentityResult, StoreError> {
        self.store.add_claim(role, claim).await?;
        self.update(role).await
    }

    pub async fn remove_claim(
        &self,
        role: &mut Role,
        claim: &Claim,
    ) -> Result<IdentityResult, StoreError> {
        self.store.remove_claim(role, claim).await?;
        self.update(role).await
    }
}

impl<S: QueryableRoleStore> RoleManager<S> {
    pub async fn find_roles(&self, name: &NameMatch) -> Result<Vec<Role>, StoreError> {
        self.store.query(&name.normalized()).await
    }
}
