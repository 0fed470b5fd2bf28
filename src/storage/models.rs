use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::errors::{AffiliatesError, Result};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
    pub support_click: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: i64,
    pub display_name: String,
    pub last_visit: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

/// 分类树中的一个节点（按树的先序遍历顺序输出）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryNode {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub depth: usize,
    pub children: Vec<i64>,
    pub link_clicks: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// 横幅类型，对应 `banners.kind` 列
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BannerKind {
    Image,
    Text,
    FirefoxUpgrade,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Banner {
    pub id: i64,
    pub kind: BannerKind,
    pub name: String,
    pub category_id: i64,
    pub destination: String,
    pub visible: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBanner {
    pub name: String,
    pub category_id: i64,
    pub destination: String,
    #[serde(default)]
    pub visible: bool,
}

/// 横幅可编辑字段，`None` 表示保持原值
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BannerUpdate {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub destination: Option<String>,
    pub visible: Option<bool>,
}

/// 横幅变体（颜色/语言组合）
///
/// 三种横幅的变体字段不同：
/// - image: color, locale, image
/// - text: locale, text
/// - firefox_upgrade: color, locale, image, upgrade_image
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Variation {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub banner_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_image: Option<String>,
}

impl Variation {
    /// 校验变体是否具备该横幅类型要求的全部字段
    pub fn validate_for(&self, kind: BannerKind) -> Result<()> {
        fn required(value: &Option<String>, field: &str) -> Result<()> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(()),
                _ => Err(AffiliatesError::validation(format!(
                    "Variation field '{}' is required",
                    field
                ))),
            }
        }

        if self.locale.trim().is_empty() {
            return Err(AffiliatesError::validation(
                "Variation field 'locale' is required",
            ));
        }

        match kind {
            BannerKind::Image => {
                required(&self.color, "color")?;
                required(&self.image, "image")
            }
            BannerKind::Text => required(&self.text, "text"),
            BannerKind::FirefoxUpgrade => {
                required(&self.color, "color")?;
                required(&self.image, "image")?;
                required(&self.upgrade_image, "upgrade_image")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub id: i64,
    pub user_id: i64,
    pub banner_id: i64,
    pub banner_variation_id: i64,
    pub html: String,
    pub aggregate_link_clicks: i64,
    pub aggregate_firefox_downloads: i64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataPoint {
    pub link_id: i64,
    pub date: NaiveDate,
    pub link_clicks: i64,
    pub firefox_downloads: i64,
}

/// 一段时间内的点击/下载汇总
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ActivitySummary {
    pub clicks: i64,
    pub downloads: i64,
}

impl ActivitySummary {
    pub fn is_empty(&self) -> bool {
        self.clicks <= 0 && self.downloads <= 0
    }
}

/// 每个用户的点击合计；聚合 SUM 在没有行时为 NULL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserClickTotal {
    pub user_id: i64,
    pub clicks: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Standing {
    pub ranking: i32,
    pub user_id: i64,
    pub metric: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BannerInstance {
    pub id: i64,
    pub user_id: i64,
    pub badge_id: i64,
    pub image_id: i64,
    pub clicks: i64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyBanner {
    pub id: i64,
    pub name: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyBannerImage {
    pub id: i64,
    pub banner_id: i64,
    pub color: String,
    pub locale: String,
    pub image: String,
}
