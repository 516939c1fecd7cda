use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "publishers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book_copy::Entity")]
    BookCopy,
}

impl Related<super::book_copy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookCopy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
