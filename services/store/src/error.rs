/// Store faults that are not expressible as an `IdentityResult`.
///
/// Validation and concurrency outcomes travel inside `IdentityResult`; this type
/// carries the rest, most importantly persistence/connection failures, which
/// the store surfaces without retrying.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("role '{0}' not found")]
    RoleNotFound(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoleNotFound(_) => "ROLE_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }
}
