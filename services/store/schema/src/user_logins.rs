use sea_orm::entity::prelude::*;

/// External login bound to a user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_logins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub login_provider: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub provider_key: String,
    pub provider_display_name: Option<String>,
    pub user_id: Uuid,
    pub extensions: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
