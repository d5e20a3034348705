//! External logins and authentication tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extensions::Extensions;

/// Binding of an external provider account, as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserLoginInfo {
    pub login_provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
}

impl UserLoginInfo {
    pub fn new(
        login_provider: impl Into<String>,
        provider_key: impl Into<String>,
        provider_display_name: Option<String>,
    ) -> Self {
        Self {
            login_provider: login_provider.into(),
            provider_key: provider_key.into(),
            provider_display_name,
        }
    }
}

/// Persisted login row. `(login_provider, provider_key)` is globally unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLogin {
    pub login_provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
    pub user_id: Uuid,
    pub extensions: Extensions,
}

impl UserLogin {
    pub fn from_info(user_id: Uuid, login: &UserLoginInfo) -> Self {
        Self {
            login_provider: login.login_provider.clone(),
            provider_key: login.provider_key.clone(),
            provider_display_name: login.provider_display_name.clone(),
            user_id,
            extensions: Extensions::new(),
        }
    }

    pub fn to_info(&self) -> UserLoginInfo {
        UserLoginInfo {
            login_provider: self.login_provider.clone(),
            provider_key: self.provider_key.clone(),
            provider_display_name: self.provider_display_name.clone(),
        }
    }
}

/// Authentication token row, one value per `(user_id, login_provider, name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserToken {
    pub user_id: Uuid,
    pub login_provider: String,
    pub name: String,
    pub value: String,
    pub extensions: Extensions,
}

impl UserToken {
    pub fn new(
        user_id: Uuid,
        login_provider: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            login_provider: login_provider.into(),
            name: name.into(),
            value: value.into(),
            extensions: Extensions::new(),
        }
    }
}
