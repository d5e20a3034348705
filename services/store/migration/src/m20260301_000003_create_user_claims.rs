use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserClaims::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserClaims::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserClaims::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserClaims::ClaimType).string().not_null())
                    .col(ColumnDef::new(UserClaims::ClaimValue).text().not_null())
                    .col(
                        ColumnDef::new(UserClaims::Extensions)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserClaims::Table, UserClaims::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserClaims::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserClaims {
    Table,
    Id,
    UserId,
    ClaimType,
    ClaimValue,
    Extensions,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
