//! 用户与用户资料

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr,
};

use super::SeaOrmStorage;
use super::converters::{model_to_profile, model_to_user};
use super::retry;
use crate::errors::{AffiliatesError, Result};
use crate::storage::models::{User, UserProfile};

use migration::entities::{user, user_profile};

impl SeaOrmStorage {
    pub async fn create_user(&self, username: &str, email: &str) -> Result<User> {
        if username.trim().is_empty() {
            return Err(AffiliatesError::validation("username must not be empty"));
        }
        let model = user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            is_active: Set(true),
            date_joined: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(model_to_user(model))
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let db = &self.db;
        let model = retry::with_retry("get_user", self.retry_config, || async {
            user::Entity::find_by_id(id).one(db).await
        })
        .await?;
        Ok(model.map(model_to_user))
    }

    pub async fn get_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let db = &self.db;
        let model = retry::with_retry("get_profile", self.retry_config, || async {
            user_profile::Entity::find_by_id(user_id).one(db).await
        })
        .await?;
        Ok(model.map(model_to_profile))
    }

    pub async fn create_profile(
        &self,
        user_id: i64,
        display_name: &str,
        last_visit: Option<NaiveDate>,
    ) -> Result<UserProfile> {
        let model = user_profile::ActiveModel {
            user_id: Set(user_id),
            display_name: Set(display_name.to_string()),
            last_visit: Set(last_visit),
        }
        .insert(&self.db)
        .await?;
        Ok(model_to_profile(model))
    }

    /// 更新用户最近访问日期；资料不存在时返回 NotFound
    pub async fn set_last_visit(&self, user_id: i64, date: NaiveDate) -> Result<()> {
        let result = user_profile::Entity::update_many()
            .col_expr(user_profile::Column::LastVisit, Expr::value(date))
            .filter(user_profile::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AffiliatesError::not_found(format!(
                "Profile for user {}",
                user_id
            )));
        }
        Ok(())
    }
}
