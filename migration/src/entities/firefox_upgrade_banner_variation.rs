use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "firefox_upgrade_banner_variations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub banner_id: i64,
    pub color: String,
    pub locale: String,
    pub image: String,
    /// 浏览器已是最新版本时展示的图片
    pub upgrade_image: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::banner::Entity",
        from = "Column::BannerId",
        to = "super::banner::Column::Id",
        on_delete = "Cascade"
    )]
    Banner,
}

impl ActiveModelBehavior for ActiveModel {}
