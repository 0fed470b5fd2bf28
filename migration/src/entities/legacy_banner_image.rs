use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "legacy_banner_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub banner_id: i64,
    pub color: String,
    pub locale: String,
    pub image: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
