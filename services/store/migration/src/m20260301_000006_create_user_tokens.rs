use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserTokens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserTokens::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserTokens::LoginProvider)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserTokens::Name).string_len(128).not_null())
                    .col(ColumnDef::new(UserTokens::Value).text().not_null())
                    .col(
                        ColumnDef::new(UserTokens::Extensions)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserTokens::UserId)
                            .col(UserTokens::LoginProvider)
                            .col(UserTokens::Name),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserTokens::Table, UserTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserTokens::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserTokens {
    Table,
    UserId,
    LoginProvider,
    Name,
    Value,
    Extensions,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
