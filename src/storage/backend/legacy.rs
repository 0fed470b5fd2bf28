//! 旧版（v1）横幅实例
//!
//! 旧版链接只读：查找、计数，不会为未知组合创建实例。

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ExprTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};

use super::SeaOrmStorage;
use super::converters::{model_to_instance, model_to_legacy_banner, model_to_legacy_image};
use crate::errors::{AffiliatesError, Result};
use crate::storage::models::{BannerInstance, LegacyBanner, LegacyBannerImage};

use migration::entities::{banner_instance, legacy_banner, legacy_banner_image};

impl SeaOrmStorage {
    pub async fn create_legacy_banner(&self, name: &str, href: &str) -> Result<LegacyBanner> {
        crate::utils::validate_url(href)?;
        let model = legacy_banner::ActiveModel {
            name: Set(name.to_string()),
            href: Set(href.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(model_to_legacy_banner(model))
    }

    pub async fn add_legacy_banner_image(
        &self,
        banner_id: i64,
        color: &str,
        locale: &str,
        image: &str,
    ) -> Result<i64> {
        let model = legacy_banner_image::ActiveModel {
            banner_id: Set(banner_id),
            color: Set(color.to_string()),
            locale: Set(locale.to_string()),
            image: Set(image.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(model.id)
    }

    pub async fn get_legacy_banner(&self, id: i64) -> Result<Option<LegacyBanner>> {
        Ok(legacy_banner::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_legacy_banner))
    }

    pub async fn legacy_banner_images(&self, banner_id: i64) -> Result<Vec<LegacyBannerImage>> {
        Ok(legacy_banner_image::Entity::find()
            .filter(legacy_banner_image::Column::BannerId.eq(banner_id))
            .order_by_asc(legacy_banner_image::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_legacy_image)
            .collect())
    }

    /// 图片是否属于该旧版横幅
    pub async fn legacy_banner_has_image(&self, banner_id: i64, image_id: i64) -> Result<bool> {
        Ok(legacy_banner_image::Entity::find_by_id(image_id)
            .filter(legacy_banner_image::Column::BannerId.eq(banner_id))
            .one(&self.db)
            .await?
            .is_some())
    }

    pub async fn get_banner_instance(&self, id: i64) -> Result<Option<BannerInstance>> {
        Ok(banner_instance::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_instance))
    }

    pub async fn find_banner_instance(
        &self,
        user_id: i64,
        badge_id: i64,
        image_id: i64,
    ) -> Result<Option<BannerInstance>> {
        Ok(banner_instance::Entity::find()
            .filter(banner_instance::Column::UserId.eq(user_id))
            .filter(banner_instance::Column::BadgeId.eq(badge_id))
            .filter(banner_instance::Column::ImageId.eq(image_id))
            .one(&self.db)
            .await?
            .map(model_to_instance))
    }

    pub async fn user_banner_instances(
        &self,
        user_id: i64,
        badge_id: i64,
    ) -> Result<Vec<BannerInstance>> {
        Ok(banner_instance::Entity::find()
            .filter(banner_instance::Column::UserId.eq(user_id))
            .filter(banner_instance::Column::BadgeId.eq(badge_id))
            .order_by_asc(banner_instance::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_instance)
            .collect())
    }

    /// 返回 (实例, 是否新建)
    pub async fn get_or_create_banner_instance(
        &self,
        user_id: i64,
        badge_id: i64,
        image_id: i64,
    ) -> Result<(BannerInstance, bool)> {
        if let Some(existing) = self.find_banner_instance(user_id, badge_id, image_id).await? {
            return Ok((existing, false));
        }

        let inserted = banner_instance::ActiveModel {
            user_id: Set(user_id),
            badge_id: Set(badge_id),
            image_id: Set(image_id),
            clicks: Set(0),
            created: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        match inserted {
            Ok(model) => Ok((model_to_instance(model), true)),
            // 并发创建时唯一索引冲突，回读已存在的行
            Err(e) => self
                .find_banner_instance(user_id, badge_id, image_id)
                .await?
                .map(|existing| (existing, false))
                .ok_or_else(|| AffiliatesError::from(e)),
        }
    }

    /// 原子地把实例点击数加一
    pub async fn increment_instance_clicks(&self, id: i64) -> Result<()> {
        let result = banner_instance::Entity::update_many()
            .col_expr(
                banner_instance::Column::Clicks,
                Expr::col(banner_instance::Column::Clicks).add(1),
            )
            .filter(banner_instance::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AffiliatesError::not_found(format!("Banner instance {}", id)));
        }
        Ok(())
    }
}
