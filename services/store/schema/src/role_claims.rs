use sea_orm::entity::prelude::*;

/// Claim owned by a single role. `extensions` holds canonical JSON.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "role_claims")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub role_id: Uuid,
    pub claim_type: String,
    pub claim_value: String,
    pub extensions: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::roles::Entity",
        from = "Column::RoleId",
        to = "super::roles::Column::Id"
    )]
    Role,
}

impl Related<super::roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
