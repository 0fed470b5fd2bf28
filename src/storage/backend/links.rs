//! 推广链接与逐日数据点

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseBackend, EntityTrait, ExprTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, info};

use super::{SeaOrmStorage, sum_as_bigint};
use super::converters::model_to_link;
use super::retry;
use crate::errors::{AffiliatesError, Result};
use crate::storage::models::{ActivitySummary, DataPoint, Link};

use migration::entities::{banner, data_point, link};

#[derive(Debug, FromQueryResult)]
struct ActivityRow {
    clicks: Option<i64>,
    downloads: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
struct LinkTotalsRow {
    link_id: i64,
    clicks: Option<i64>,
    downloads: Option<i64>,
}

/// 新建链接所需的字段
#[derive(Debug, Clone, Copy)]
pub struct NewLink {
    pub user_id: i64,
    pub banner_id: i64,
    pub banner_variation_id: i64,
}

impl SeaOrmStorage {
    /// 创建链接；`render_html` 收到新链接的 id，返回嵌入代码
    pub async fn create_link<F>(&self, new: NewLink, render_html: F) -> Result<Link>
    where
        F: FnOnce(i64) -> String,
    {
        let now = Utc::now();
        let txn = self.db.begin().await?;
        let inserted = link::ActiveModel {
            user_id: Set(new.user_id),
            banner_id: Set(new.banner_id),
            banner_variation_id: Set(new.banner_variation_id),
            html: Set(String::new()),
            aggregate_link_clicks: Set(0),
            aggregate_firefox_downloads: Set(0),
            created: Set(now),
            modified: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let html = render_html(inserted.id);
        let mut active: link::ActiveModel = inserted.into();
        active.html = Set(html);
        let model = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            "Created link {} for user {} (banner {})",
            model.id, model.user_id, model.banner_id
        );
        Ok(model_to_link(model))
    }

    pub async fn get_link(&self, id: i64) -> Result<Option<Link>> {
        let db = &self.db;
        let model = retry::with_retry("get_link", self.retry_config, || async {
            link::Entity::find_by_id(id).one(db).await
        })
        .await?;
        Ok(model.map(model_to_link))
    }

    pub async fn links_for_user(&self, user_id: i64) -> Result<Vec<Link>> {
        Ok(link::Entity::find()
            .filter(link::Column::UserId.eq(user_id))
            .order_by_asc(link::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_link)
            .collect())
    }

    /// 推广链接对应横幅的目标地址（带缓存）
    pub async fn referral_destination(&self, link_id: i64) -> Result<Option<String>> {
        if let Some(hit) = self.referral_cache.get(&link_id) {
            return Ok(Some(hit));
        }

        let db = &self.db;
        let destination: Option<String> =
            retry::with_retry("referral_destination", self.retry_config, || async {
                link::Entity::find_by_id(link_id)
                    .select_only()
                    .column(banner::Column::Destination)
                    .join(JoinType::InnerJoin, link::Relation::Banner.def())
                    .into_tuple()
                    .one(db)
                    .await
            })
            .await?;

        if let Some(ref dest) = destination {
            self.referral_cache.insert(link_id, dest.clone());
        }
        Ok(destination)
    }

    /// 把点击数累加到各链接当天的数据点上（不存在则新建）
    ///
    /// 已删除链接的点击被丢弃。
    pub async fn record_link_clicks(&self, updates: &[(i64, usize)], date: NaiveDate) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = updates.iter().map(|(id, _)| *id).collect();
        let existing: Vec<i64> = link::Entity::find()
            .select_only()
            .column(link::Column::Id)
            .filter(link::Column::Id.is_in(ids))
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut merged: HashMap<i64, i64> = HashMap::new();
        for (id, count) in updates {
            if existing.contains(id) {
                *merged.entry(*id).or_insert(0) += *count as i64;
            }
        }
        if merged.is_empty() {
            debug!("Dropped clicks for {} unknown links", updates.len());
            return Ok(());
        }

        let models: Vec<data_point::ActiveModel> = merged
            .iter()
            .map(|(link_id, clicks)| data_point::ActiveModel {
                link_id: Set(*link_id),
                date: Set(date),
                link_clicks: Set(*clicks),
                firefox_downloads: Set(0),
                ..Default::default()
            })
            .collect();

        // SQLite/PostgreSQL: excluded.link_clicks，MySQL: VALUES(link_clicks)
        let incoming = match self.db.get_database_backend() {
            DatabaseBackend::MySql => Expr::cust("VALUES(link_clicks)"),
            _ => Expr::cust("excluded.link_clicks"),
        };
        let on_conflict = OnConflict::columns([data_point::Column::LinkId, data_point::Column::Date])
            .value(
                data_point::Column::LinkClicks,
                Expr::col(data_point::Column::LinkClicks).add(incoming),
            )
            .to_owned();

        let db = &self.db;
        retry::with_retry("record_link_clicks", self.retry_config, || async {
            data_point::Entity::insert_many(models.clone())
                .on_conflict(on_conflict.clone())
                .exec(db)
                .await
        })
        .await?;

        debug!("Recorded clicks for {} links on {}", merged.len(), date);
        Ok(())
    }

    /// 写入某天的数据点（覆盖原值）
    pub async fn upsert_datapoint(&self, point: DataPoint) -> Result<DataPoint> {
        if point.link_clicks < 0 || point.firefox_downloads < 0 {
            return Err(AffiliatesError::validation(
                "Data point counts must not be negative",
            ));
        }
        if self.get_link(point.link_id).await?.is_none() {
            return Err(AffiliatesError::not_found(format!("Link {}", point.link_id)));
        }

        data_point::Entity::insert(data_point::ActiveModel {
            link_id: Set(point.link_id),
            date: Set(point.date),
            link_clicks: Set(point.link_clicks),
            firefox_downloads: Set(point.firefox_downloads),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([data_point::Column::LinkId, data_point::Column::Date])
                .update_columns([
                    data_point::Column::LinkClicks,
                    data_point::Column::FirefoxDownloads,
                ])
                .to_owned(),
        )
        .exec(&self.db)
        .await?;

        Ok(point)
    }

    /// 用户全部链接在 `after < date <= until` 区间内的点击与下载合计
    pub async fn activity_between(
        &self,
        user_id: i64,
        after: NaiveDate,
        until: NaiveDate,
    ) -> Result<ActivitySummary> {
        let backend = self.db.get_database_backend();
        let row = data_point::Entity::find()
            .select_only()
            .column_as(
                sum_as_bigint(backend, data_point::Column::LinkClicks.sum()),
                "clicks",
            )
            .column_as(
                sum_as_bigint(backend, data_point::Column::FirefoxDownloads.sum()),
                "downloads",
            )
            .join(JoinType::InnerJoin, data_point::Relation::Link.def())
            .filter(link::Column::UserId.eq(user_id))
            .filter(data_point::Column::Date.gt(after))
            .filter(data_point::Column::Date.lte(until))
            .into_model::<ActivityRow>()
            .one(&self.db)
            .await?;

        Ok(row
            .map(|r| ActivitySummary {
                clicks: r.clicks.unwrap_or(0),
                downloads: r.downloads.unwrap_or(0),
            })
            .unwrap_or_default())
    }

    /// 把 `cutoff` 之前的数据点并入链接的 aggregate_* 字段并删除这些数据点
    ///
    /// 返回被归档的数据点数量。
    pub async fn aggregate_old_datapoints(&self, cutoff: NaiveDate) -> Result<u64> {
        let txn = self.db.begin().await?;

        let backend = self.db.get_database_backend();
        let totals = data_point::Entity::find()
            .select_only()
            .column(data_point::Column::LinkId)
            .column_as(
                sum_as_bigint(backend, data_point::Column::LinkClicks.sum()),
                "clicks",
            )
            .column_as(
                sum_as_bigint(backend, data_point::Column::FirefoxDownloads.sum()),
                "downloads",
            )
            .filter(data_point::Column::Date.lt(cutoff))
            .group_by(data_point::Column::LinkId)
            .into_model::<LinkTotalsRow>()
            .all(&txn)
            .await?;

        let now = Utc::now();
        for row in &totals {
            link::Entity::update_many()
                .col_expr(
                    link::Column::AggregateLinkClicks,
                    Expr::col(link::Column::AggregateLinkClicks).add(row.clicks.unwrap_or(0)),
                )
                .col_expr(
                    link::Column::AggregateFirefoxDownloads,
                    Expr::col(link::Column::AggregateFirefoxDownloads)
                        .add(row.downloads.unwrap_or(0)),
                )
                .col_expr(link::Column::Modified, Expr::value(now))
                .filter(link::Column::Id.eq(row.link_id))
                .exec(&txn)
                .await?;
        }

        let deleted = data_point::Entity::delete_many()
            .filter(data_point::Column::Date.lt(cutoff))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(
            "Aggregated {} data points older than {} into {} links",
            deleted.rows_affected,
            cutoff,
            totals.len()
        );
        Ok(deleted.rows_affected)
    }
}
