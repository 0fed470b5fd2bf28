//! 横幅与横幅变体
//!
//! 三种横幅共用 `banners` 表，变体各自一张表。

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, DbErr,
    EntityTrait, ExprTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, TransactionTrait,
};
use tracing::info;

use super::{SeaOrmStorage, sum_as_bigint};
use super::converters::{image_variation, model_to_banner, text_variation, upgrade_variation};
use super::retry;
use crate::errors::{AffiliatesError, Result};
use crate::storage::models::{Banner, BannerKind, BannerUpdate, NewBanner, Variation};
use crate::utils::validate_url;

use migration::entities::{
    banner, category, data_point, firefox_upgrade_banner_variation, image_banner_variation, link,
    text_banner_variation,
};

#[derive(Debug, FromQueryResult)]
struct BannerClicksRow {
    banner_id: i64,
    clicks: Option<i64>,
}

impl SeaOrmStorage {
    /// 按类型列出横幅
    ///
    /// `search` 只在 `fields` 声明的字段上做模糊匹配，字段名沿用后台注册表的写法
    /// （`name`、`destination`、`category__name`）。未声明任何可识别字段时忽略 `search`。
    pub async fn list_banners(
        &self,
        kind: BannerKind,
        search: Option<&str>,
        fields: &[&str],
    ) -> Result<Vec<Banner>> {
        let mut query = banner::Entity::find()
            .filter(banner::Column::Kind.eq(kind.to_string()))
            .order_by_asc(banner::Column::Id);

        if let Some(q) = search.map(str::trim).filter(|q| !q.is_empty()) {
            let mut condition = Condition::any();
            let mut searchable = false;
            for field in fields {
                condition = match *field {
                    "name" => condition.add(banner::Column::Name.contains(q)),
                    "destination" => condition.add(banner::Column::Destination.contains(q)),
                    "category__name" => condition.add(category::Column::Name.contains(q)),
                    _ => continue,
                };
                searchable = true;
            }
            if fields.contains(&"category__name") {
                query = query.join(JoinType::InnerJoin, banner::Relation::Category.def());
            }
            if searchable {
                query = query.filter(condition);
            }
        }

        query
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_banner)
            .collect()
    }

    pub async fn get_banner(&self, kind: BannerKind, id: i64) -> Result<Option<Banner>> {
        Ok(self.find_banner(id).await?.filter(|b| b.kind == kind))
    }

    /// 不区分类型按 id 查找横幅
    pub async fn find_banner(&self, id: i64) -> Result<Option<Banner>> {
        let db = &self.db;
        let model = retry::with_retry("find_banner", self.retry_config, || async {
            banner::Entity::find_by_id(id).one(db).await
        })
        .await?;
        model.map(model_to_banner).transpose()
    }

    pub async fn visible_banners_in_category(&self, category_id: i64) -> Result<Vec<Banner>> {
        banner::Entity::find()
            .filter(banner::Column::CategoryId.eq(category_id))
            .filter(banner::Column::Visible.eq(true))
            .order_by_asc(banner::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_banner)
            .collect()
    }

    pub async fn create_banner(&self, kind: BannerKind, input: NewBanner) -> Result<Banner> {
        if input.name.trim().is_empty() {
            return Err(AffiliatesError::validation("Banner name must not be empty"));
        }
        validate_url(&input.destination)?;
        self.require_category(input.category_id).await?;

        let now = Utc::now();
        let model = banner::ActiveModel {
            kind: Set(kind.to_string()),
            name: Set(input.name.trim().to_string()),
            category_id: Set(input.category_id),
            destination: Set(input.destination.trim().to_string()),
            visible: Set(input.visible),
            created: Set(now),
            modified: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Created {} banner {}", kind, model.id);
        model_to_banner(model)
    }

    /// 更新可编辑字段并刷新 `modified`；`created`/`modified` 本身不可写
    pub async fn update_banner(
        &self,
        kind: BannerKind,
        id: i64,
        update: BannerUpdate,
    ) -> Result<Banner> {
        let existing = banner::Entity::find_by_id(id)
            .filter(banner::Column::Kind.eq(kind.to_string()))
            .one(&self.db)
            .await?
            .ok_or_else(|| AffiliatesError::not_found(format!("{} banner {}", kind, id)))?;

        let mut active: banner::ActiveModel = existing.into();
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(AffiliatesError::validation("Banner name must not be empty"));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(category_id) = update.category_id {
            self.require_category(category_id).await?;
            active.category_id = Set(category_id);
        }
        if let Some(destination) = update.destination {
            validate_url(&destination)?;
            active.destination = Set(destination.trim().to_string());
        }
        if let Some(visible) = update.visible {
            active.visible = Set(visible);
        }
        active.modified = Set(Utc::now());

        let model = active.update(&self.db).await?;
        self.invalidate_referral_cache();
        model_to_banner(model)
    }

    pub async fn delete_banner(&self, kind: BannerKind, id: i64) -> Result<()> {
        let result = banner::Entity::delete_many()
            .filter(banner::Column::Id.eq(id))
            .filter(banner::Column::Kind.eq(kind.to_string()))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AffiliatesError::not_found(format!("{} banner {}", kind, id)));
        }
        self.invalidate_referral_cache();
        info!("Deleted {} banner {}", kind, id);
        Ok(())
    }

    /// 每个横幅的点击数：归档点击 + 逐日数据点击
    pub async fn banner_link_clicks(&self, ids: &[i64]) -> Result<HashMap<i64, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.banner_clicks(Some(ids)).await
    }

    pub(super) async fn all_banner_link_clicks(&self) -> Result<HashMap<i64, i64>> {
        self.banner_clicks(None).await
    }

    async fn banner_clicks(&self, ids: Option<&[i64]>) -> Result<HashMap<i64, i64>> {
        let backend = self.db.get_database_backend();
        let mut archived = link::Entity::find()
            .select_only()
            .column(link::Column::BannerId)
            .column_as(
                sum_as_bigint(backend, link::Column::AggregateLinkClicks.sum()),
                "clicks",
            )
            .group_by(link::Column::BannerId);
        let mut daily = data_point::Entity::find()
            .select_only()
            .column_as(link::Column::BannerId, "banner_id")
            .column_as(
                sum_as_bigint(backend, data_point::Column::LinkClicks.sum()),
                "clicks",
            )
            .join(JoinType::InnerJoin, data_point::Relation::Link.def())
            .group_by(link::Column::BannerId);

        if let Some(ids) = ids {
            archived = archived.filter(link::Column::BannerId.is_in(ids.iter().copied()));
            daily = daily.filter(link::Column::BannerId.is_in(ids.iter().copied()));
        }

        let mut totals: HashMap<i64, i64> = HashMap::new();
        let rows = archived
            .into_model::<BannerClicksRow>()
            .all(&self.db)
            .await?
            .into_iter()
            .chain(
                daily
                    .into_model::<BannerClicksRow>()
                    .all(&self.db)
                    .await?,
            );
        for row in rows {
            *totals.entry(row.banner_id).or_insert(0) += row.clicks.unwrap_or(0);
        }
        Ok(totals)
    }

    pub async fn list_variations(&self, kind: BannerKind, banner_id: i64) -> Result<Vec<Variation>> {
        Ok(load_variations(&self.db, kind, banner_id).await?)
    }

    pub async fn get_variation(
        &self,
        kind: BannerKind,
        banner_id: i64,
        variation_id: i64,
    ) -> Result<Option<Variation>> {
        let found = load_variations(&self.db, kind, banner_id)
            .await?
            .into_iter()
            .find(|v| v.id == variation_id);
        Ok(found)
    }

    /// 用给定行替换横幅的变体集合
    ///
    /// 带 id 且属于该横幅的行原地更新，其余行新增，未出现的旧行删除。
    pub async fn replace_variations(
        &self,
        kind: BannerKind,
        banner_id: i64,
        rows: Vec<Variation>,
    ) -> Result<Vec<Variation>> {
        for row in &rows {
            row.validate_for(kind)?;
        }
        if self.get_banner(kind, banner_id).await?.is_none() {
            return Err(AffiliatesError::not_found(format!(
                "{} banner {}",
                kind, banner_id
            )));
        }

        let txn = self.db.begin().await?;
        let existing: Vec<i64> = load_variations(&txn, kind, banner_id)
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();

        let mut kept = Vec::with_capacity(rows.len());
        for row in &rows {
            let is_update = row.id != 0 && existing.contains(&row.id);
            let id = save_variation(&txn, kind, banner_id, row, is_update).await?;
            kept.push(id);
        }
        delete_variations_except(&txn, kind, banner_id, &kept).await?;
        txn.commit().await?;

        self.list_variations(kind, banner_id).await
    }

    async fn require_category(&self, category_id: i64) -> Result<()> {
        if category::Entity::find_by_id(category_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(AffiliatesError::validation(format!(
                "Category {} does not exist",
                category_id
            )));
        }
        Ok(())
    }
}

async fn load_variations<C: ConnectionTrait>(
    db: &C,
    kind: BannerKind,
    banner_id: i64,
) -> std::result::Result<Vec<Variation>, DbErr> {
    let rows = match kind {
        BannerKind::Image => image_banner_variation::Entity::find()
            .filter(image_banner_variation::Column::BannerId.eq(banner_id))
            .order_by_asc(image_banner_variation::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(image_variation)
            .collect(),
        BannerKind::Text => text_banner_variation::Entity::find()
            .filter(text_banner_variation::Column::BannerId.eq(banner_id))
            .order_by_asc(text_banner_variation::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(text_variation)
            .collect(),
        BannerKind::FirefoxUpgrade => firefox_upgrade_banner_variation::Entity::find()
            .filter(firefox_upgrade_banner_variation::Column::BannerId.eq(banner_id))
            .order_by_asc(firefox_upgrade_banner_variation::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(upgrade_variation)
            .collect(),
    };
    Ok(rows)
}

async fn save_variation<C: ConnectionTrait>(
    db: &C,
    kind: BannerKind,
    banner_id: i64,
    row: &Variation,
    is_update: bool,
) -> std::result::Result<i64, DbErr> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();

    let id = match kind {
        BannerKind::Image => {
            let mut am = image_banner_variation::ActiveModel {
                banner_id: Set(banner_id),
                color: Set(text(&row.color)),
                locale: Set(row.locale.clone()),
                image: Set(text(&row.image)),
                ..Default::default()
            };
            if is_update {
                am.id = Set(row.id);
                am.update(db).await?.id
            } else {
                am.insert(db).await?.id
            }
        }
        BannerKind::Text => {
            let mut am = text_banner_variation::ActiveModel {
                banner_id: Set(banner_id),
                locale: Set(row.locale.clone()),
                text: Set(text(&row.text)),
                ..Default::default()
            };
            if is_update {
                am.id = Set(row.id);
                am.update(db).await?.id
            } else {
                am.insert(db).await?.id
            }
        }
        BannerKind::FirefoxUpgrade => {
            let mut am = firefox_upgrade_banner_variation::ActiveModel {
                banner_id: Set(banner_id),
                color: Set(text(&row.color)),
                locale: Set(row.locale.clone()),
                image: Set(text(&row.image)),
                upgrade_image: Set(text(&row.upgrade_image)),
                ..Default::default()
            };
            if is_update {
                am.id = Set(row.id);
                am.update(db).await?.id
            } else {
                am.insert(db).await?.id
            }
        }
    };
    Ok(id)
}

async fn delete_variations_except<C: ConnectionTrait>(
    db: &C,
    kind: BannerKind,
    banner_id: i64,
    keep: &[i64],
) -> std::result::Result<(), DbErr> {
    let keep = keep.iter().copied();
    match kind {
        BannerKind::Image => {
            image_banner_variation::Entity::delete_many()
                .filter(image_banner_variation::Column::BannerId.eq(banner_id))
                .filter(image_banner_variation::Column::Id.is_not_in(keep))
                .exec(db)
                .await?;
        }
        BannerKind::Text => {
            text_banner_variation::Entity::delete_many()
                .filter(text_banner_variation::Column::BannerId.eq(banner_id))
                .filter(text_banner_variation::Column::Id.is_not_in(keep))
                .exec(db)
                .await?;
        }
        BannerKind::FirefoxUpgrade => {
            firefox_upgrade_banner_variation::Entity::delete_many()
                .filter(firefox_upgrade_banner_variation::Column::BannerId.eq(banner_id))
                .filter(firefox_upgrade_banner_variation::Column::Id.is_not_in(keep))
                .exec(db)
                .await?;
        }
    }
    Ok(())
}
