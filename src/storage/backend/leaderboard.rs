//! 排行榜相关查询
//!
//! 两个按用户汇总的查询都以 users 为主表做 LEFT JOIN，
//! 没有链接或数据点的用户也会出现，合计为 NULL。

use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, ExprTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};
use tracing::debug;

use super::{SeaOrmStorage, sum_as_bigint};
use super::converters::model_to_standing;
use super::retry;
use crate::errors::{AffiliatesError, Result};
use crate::storage::models::{Standing, UserClickTotal};

use migration::entities::{data_point, leaderboard_standing, link, user};

#[derive(Debug, FromQueryResult)]
struct UserTotalRow {
    user_id: i64,
    clicks: Option<i64>,
}

impl From<UserTotalRow> for UserClickTotal {
    fn from(row: UserTotalRow) -> Self {
        UserClickTotal {
            user_id: row.user_id,
            clicks: row.clicks,
        }
    }
}

impl SeaOrmStorage {
    /// 每个用户名下链接的归档点击合计
    pub async fn click_totals_from_links(&self) -> Result<Vec<UserClickTotal>> {
        let backend = self.db.get_database_backend();
        let rows = user::Entity::find()
            .select_only()
            .column_as(user::Column::Id, "user_id")
            .column_as(
                sum_as_bigint(backend, link::Column::AggregateLinkClicks.sum()),
                "clicks",
            )
            .join(JoinType::LeftJoin, user::Relation::Link.def())
            .group_by(user::Column::Id)
            .order_by_asc(user::Column::Id)
            .into_model::<UserTotalRow>()
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// 每个用户名下链接的逐日数据点点击合计
    pub async fn click_totals_from_datapoints(&self) -> Result<Vec<UserClickTotal>> {
        let backend = self.db.get_database_backend();
        let rows = user::Entity::find()
            .select_only()
            .column_as(user::Column::Id, "user_id")
            .column_as(
                sum_as_bigint(backend, data_point::Column::LinkClicks.sum()),
                "clicks",
            )
            .join(JoinType::LeftJoin, user::Relation::Link.def())
            .join(JoinType::LeftJoin, link::Relation::DataPoint.def())
            .group_by(user::Column::Id)
            .order_by_asc(user::Column::Id)
            .into_model::<UserTotalRow>()
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// 删除全部排名，返回删除行数
    pub async fn clear_leaderboard(&self) -> Result<u64> {
        let result = leaderboard_standing::Entity::delete_many()
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// 按 `batch_size` 分批批量插入排名
    pub async fn insert_standings(&self, standings: &[Standing], batch_size: usize) -> Result<()> {
        if batch_size == 0 {
            return Err(AffiliatesError::validation("batch_size must be positive"));
        }

        for (i, chunk) in standings.chunks(batch_size).enumerate() {
            let models: Vec<leaderboard_standing::ActiveModel> = chunk
                .iter()
                .map(|s| leaderboard_standing::ActiveModel {
                    ranking: Set(s.ranking),
                    user_id: Set(s.user_id),
                    metric: Set(s.metric.clone()),
                    value: Set(s.value),
                    ..Default::default()
                })
                .collect();

            let db = &self.db;
            retry::with_retry("insert_standings", self.retry_config, || async {
                leaderboard_standing::Entity::insert_many(models.clone())
                    .exec(db)
                    .await
            })
            .await?;
            debug!("Inserted standings batch {} ({} rows)", i + 1, chunk.len());
        }
        Ok(())
    }

    pub async fn top_standings(&self, metric: &str, limit: u64) -> Result<Vec<Standing>> {
        Ok(leaderboard_standing::Entity::find()
            .filter(leaderboard_standing::Column::Metric.eq(metric))
            .order_by_asc(leaderboard_standing::Column::Ranking)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_standing)
            .collect())
    }
}
