//! 推广链接实体
//!
//! `aggregate_*` 字段保存已从 data_points 归档的历史点击/下载数。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub banner_id: i64,
    pub banner_variation_id: i64,
    #[sea_orm(column_type = "Text")]
    pub html: String,
    pub aggregate_link_clicks: i64,
    pub aggregate_firefox_downloads: i64,
    pub created: DateTimeUtc,
    pub modified: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::banner::Entity",
        from = "Column::BannerId",
        to = "super::banner::Column::Id",
        on_delete = "Cascade"
    )]
    Banner,
    #[sea_orm(has_many = "super::data_point::Entity")]
    DataPoint,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::banner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Banner.def()
    }
}

impl Related<super::data_point::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataPoint.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
