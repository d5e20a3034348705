//! Claims and the rows that attach them to users and roles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extensions::Extensions;

/// A statement about a user or role: a `(type, value)` pair with an optional issuer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
    pub issuer: Option<String>,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            issuer: None,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }
}

/// A claim row owned by exactly one user.
///
/// `id` is a surrogate key assigned by the store; it is `0` until persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserClaim {
    pub id: i32,
    pub user_id: Uuid,
    pub claim_type: String,
    pub claim_value: String,
    pub extensions: Extensions,
}

impl UserClaim {
    /// Base row for `claim`: type and value only, no extension fields.
    pub fn from_claim(user_id: Uuid, claim: &Claim) -> Self {
        Self {
            id: 0,
            user_id,
            claim_type: claim.claim_type.clone(),
            claim_value: claim.value.clone(),
            extensions: Extensions::new(),
        }
    }

    pub fn to_claim(&self) -> Claim {
        Claim::new(&self.claim_type, &self.claim_value)
    }
}

/// A claim row owned by exactly one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleClaim {
    pub id: i32,
    pub role_id: Uuid,
    pub claim_type: String,
    pub claim_value: String,
    pub extensions: Extensions,
}

impl RoleClaim {
    pub fn from_claim(role_id: Uuid, claim: &Claim) -> Self {
        Self {
            id: 0,
            role_id,
            claim_type: claim.claim_type.clone(),
            claim_value: claim.value.clone(),
            extensions: Extensions::new(),
        }
    }

    pub fn to_claim(&self) -> Claim {
        Claim::new(&self.claim_type, &self.claim_value)
    }
}
