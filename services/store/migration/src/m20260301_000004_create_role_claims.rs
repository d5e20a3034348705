use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoleClaims::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoleClaims::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoleClaims::RoleId).uuid().not_null())
                    .col(ColumnDef::new(RoleClaims::ClaimType).string().not_null())
                    .col(ColumnDef::new(RoleClaims::ClaimValue).text().not_null())
                    .col(
                        ColumnDef::new(RoleClaims::Extensions)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RoleClaims::Table, RoleClaims::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoleClaims::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RoleClaims {
    Table,
    Id,
    RoleId,
    ClaimType,
    ClaimValue,
    Extensions,
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
}
