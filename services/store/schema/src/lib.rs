//! sea-orm entities for the identity tables.

pub mod role_claims;
pub mod roles;
pub mod user_claims;
pub mod user_logins;
pub mod user_roles;
pub mod user_tokens;
pub mod users;
