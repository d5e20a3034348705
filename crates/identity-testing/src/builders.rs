//! Unique test entities.

use uuid::Uuid;

use identity_domain::claim::Claim;
use identity_domain::role::Role;
use identity_domain::user::User;

fn suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_owned()
}

/// Unsaved user named `{prefix}-{random}` with a matching email.
pub fn test_user(prefix: &str) -> User {
    let name = format!("{prefix}-{}", suffix());
    let email = format!("{name}@example.com");
    User::new(name).with_email(email)
}

/// Unsaved role named `{prefix}-{random}`.
pub fn test_role(prefix: &str) -> Role {
    Role::new(format!("{prefix}-{}", suffix()))
}

/// `(type, value, issuer)` triples as claims.
pub fn claims(triples: &[(&str, &str, &str)]) -> Vec<Claim> {
    triples
        .iter()
        .map(|(t, v, i)| Claim::new(*t, *v).with_issuer(*i))
        .collect()
}
