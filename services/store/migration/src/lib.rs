use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_roles;
mod m20260301_000003_create_user_claims;
mod m20260301_000004_create_role_claims;
mod m20260301_000005_create_user_logins;
mod m20260301_000006_create_user_tokens;
mod m20260301_000007_create_user_roles;
mod m20260301_000008_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_roles::Migration),
            Box::new(m20260301_000003_create_user_claims::Migration),
            Box::new(m20260301_000004_create_role_claims::Migration),
            Box::new(m20260301_000005_create_user_logins::Migration),
            Box::new(m20260301_000006_create_user_tokens::Migration),
            Box::new(m20260301_000007_create_user_roles::Migration),
            Box::new(m20260301_000008_add_lookup_indexes::Migration),
        ]
    }
}
