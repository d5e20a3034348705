//! Structured outcome of identity operations.

use std::fmt;

use serde::Serialize;

/// Category of an identity failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityErrorKind {
    /// Input rejected: duplicate or invalid name, login already bound, role link state.
    Validation,
    /// The concurrency stamp did not match the stored row.
    Concurrency,
    /// The entity the operation targets does not exist.
    NotFound,
    /// Lockout cannot be applied to this user.
    Lockout,
}

/// A single failure reported inside an [`IdentityResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityError {
    pub kind: IdentityErrorKind,
    pub code: &'static str,
    pub description: String,
}

impl IdentityError {
    pub fn duplicate_user_name(user_name: &str) -> Self {
        Self {
            kind: IdentityErrorKind::Validation,
            code: "DUPLICATE_USER_NAME",
            description: format!("user name '{user_name}' is already taken"),
        }
    }

    pub fn duplicate_role_name(role_name: &str) -> Self {
        Self {
            kind: IdentityErrorKind::Validation,
            code: "DUPLICATE_ROLE_NAME",
            description: format!("role name '{role_name}' is already taken"),
        }
    }

    pub fn invalid_user_name(user_name: &str) -> Self {
        Self {
            kind: IdentityErrorKind::Validation,
            code: "INVALID_USER_NAME",
            description: format!("user name '{user_name}' is invalid"),
        }
    }

    pub fn invalid_role_name(role_name: &str) -> Self {
        Self {
            kind: IdentityErrorKind::Validation,
            code: "INVALID_ROLE_NAME",
            description: format!("role name '{role_name}' is invalid"),
        }
    }

    pub fn login_already_associated() -> Self {
        Self {
            kind: IdentityErrorKind::Validation,
            code: "LOGIN_ALREADY_ASSOCIATED",
            description: "a user with this login already exists".to_owned(),
        }
    }

    pub fn user_already_in_role(role_name: &str) -> Self {
        Self {
            kind: IdentityErrorKind::Validation,
            code: "USER_ALREADY_IN_ROLE",
            description: format!("user already in role '{role_name}'"),
        }
    }

    pub fn user_not_in_role(role_name: &str) -> Self {
        Self {
            kind: IdentityErrorKind::Validation,
            code: "USER_NOT_IN_ROLE",
            description: format!("user is not in role '{role_name}'"),
        }
    }

    pub fn concurrency_failure() -> Self {
        Self {
            kind: IdentityErrorKind::Concurrency,
            code: "CONCURRENCY_FAILURE",
            description: "optimistic concurrency failure, object has been modified".to_owned(),
        }
    }

    pub fn user_not_found() -> Self {
        Self {
            kind: IdentityErrorKind::NotFound,
            code: "USER_NOT_FOUND",
            description: "user not found".to_owned(),
        }
    }

    pub fn user_lockout_not_enabled() -> Self {
        Self {
            kind: IdentityErrorKind::Lockout,
            code: "USER_LOCKOUT_NOT_ENABLED",
            description: "lockout is not enabled for this user".to_owned(),
        }
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

/// Success, or failure carrying one or more [`IdentityError`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentityResult {
    errors: Vec<IdentityError>,
}

impl IdentityResult {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failed(error: IdentityError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn failed_many(errors: impl IntoIterator<Item = IdentityError>) -> Self {
        Self {
            errors: errors.into_iter().collect(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[IdentityError] {
        &self.errors
    }

    /// `true` when any error is of `kind`.
    pub fn has_kind(&self, kind: IdentityErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// `true` when any error carries `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

impl fmt::Display for IdentityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.succeeded() {
            return f.write_str("succeeded");
        }
        f.write_str("failed: ")?;
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}
