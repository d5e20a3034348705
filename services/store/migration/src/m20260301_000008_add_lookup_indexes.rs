use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Users::Table)
                    .col(Users::NormalizedEmail)
                    .name("idx_users_normalized_email")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(UserClaims::Table)
                    .col(UserClaims::UserId)
                    .name("idx_user_claims_user_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(RoleClaims::Table)
                    .col(RoleClaims::RoleId)
                    .name("idx_role_claims_role_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(UserLogins::Table)
                    .col(UserLogins::UserId)
                    .name("idx_user_logins_user_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(UserRoles::Table)
                    .col(UserRoles::RoleId)
                    .name("idx_user_roles_role_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_user_roles_role_id",
            "idx_user_logins_user_id",
            "idx_role_claims_role_id",
            "idx_user_claims_user_id",
            "idx_users_normalized_email",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    NormalizedEmail,
}

#[derive(Iden)]
enum UserClaims {
    Table,
    UserId,
}

#[derive(Iden)]
enum RoleClaims {
    Table,
    RoleId,
}

#[derive(Iden)]
enum UserLogins {
    Table,
    UserId,
}

#[derive(Iden)]
enum UserRoles {
    Table,
    RoleId,
}
