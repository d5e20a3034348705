//! Lookup-name normalization.

/// Upper-invariant form of a user name, email or role name.
///
/// Uniqueness and lookups always compare normalized values.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}
