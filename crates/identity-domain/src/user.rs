//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extensions::Extensions;

/// A user account as persisted by a user store.
///
/// `id` is nil until the store assigns one on create and never changes afterwards.
/// `concurrency_stamp` is rotated by the store on every successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email: Option<String>,
    pub normalized_email: Option<String>,
    pub email_confirmed: bool,
    pub password_hash: Option<String>,
    pub security_stamp: Option<String>,
    pub concurrency_stamp: String,
    pub phone_number: Option<String>,
    pub phone_number_confirmed: bool,
    pub two_factor_enabled: bool,
    pub lockout_end: Option<DateTime<Utc>>,
    pub lockout_enabled: bool,
    pub access_failed_count: i32,
}

impl User {
    /// New, unsaved user. Normalized fields are filled by the manager.
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            user_name: user_name.into(),
            normalized_user_name: String::new(),
            email: None,
            normalized_email: None,
            email_confirmed: false,
            password_hash: None,
            security_stamp: None,
            concurrency_stamp: String::new(),
            phone_number: None,
            phone_number_confirmed: false,
            two_factor_enabled: false,
            lockout_end: None,
            lockout_enabled: false,
            access_failed_count: 0,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// `true` while `lockout_end` lies in the future and lockout is enabled.
    pub fn is_locked_out_at(&self, now: DateTime<Utc>) -> bool {
        self.lockout_enabled && self.lockout_end.is_some_and(|end| end > now)
    }
}

/// Link row between a user and a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub extensions: Extensions,
}

impl UserRole {
    pub fn new(user_id: Uuid, role_id: Uuid) -> Self {
        Self {
            user_id,
            role_id,
            extensions: Extensions::new(),
        }
    }
}
