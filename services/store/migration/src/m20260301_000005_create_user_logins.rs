use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserLogins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserLogins::LoginProvider)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserLogins::ProviderKey)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserLogins::ProviderDisplayName).string().null())
                    .col(ColumnDef::new(UserLogins::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserLogins::Extensions)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserLogins::LoginProvider)
                            .col(UserLogins::ProviderKey),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserLogins::Table, UserLogins::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserLogins::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserLogins {
    Table,
    LoginProvider,
    ProviderKey,
    ProviderDisplayName,
    UserId,
    Extensions,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
