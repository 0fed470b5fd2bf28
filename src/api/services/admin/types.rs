//! Admin API 类型定义

use serde::{Deserialize, Serialize};

use crate::storage::{BannerUpdate, NewBanner, Variation};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 列表查询参数，`q` 在 search_fields 上做模糊匹配
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ListQuery {
    pub q: Option<String>,
}

/// 列表页的一行：仅包含 list_display 中的列
pub type AdminRow = serde_json::Map<String, serde_json::Value>;

#[derive(Serialize, Clone, Debug)]
pub struct AdminList {
    pub model: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<AdminRow>,
}

/// 详情页：fields 中的字段与内联行
#[derive(Serialize, Clone, Debug)]
pub struct AdminDetail {
    pub model: &'static str,
    pub fields: AdminRow,
    pub readonly_fields: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<AdminInlineRows>,
}

#[derive(Serialize, Clone, Debug)]
pub struct AdminInlineRows {
    pub model: &'static str,
    pub fields: &'static [&'static str],
    /// 表单额外提供的空白行数
    pub extra: usize,
    pub rows: Vec<AdminRow>,
}

/// 新建横幅（`created`/`modified` 为只读字段，请求中出现时被忽略）
#[derive(Deserialize, Clone, Debug)]
pub struct BannerCreateRequest {
    #[serde(flatten)]
    pub banner: NewBanner,
    #[serde(default)]
    pub variations: Vec<Variation>,
}

/// 更新横幅；`variations` 缺省时保持原有变体
#[derive(Deserialize, Clone, Debug, Default)]
pub struct BannerUpdateRequest {
    #[serde(flatten)]
    pub banner: BannerUpdate,
    pub variations: Option<Vec<Variation>>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct DataPointRequest {
    #[serde(default)]
    pub link_clicks: i64,
    #[serde(default)]
    pub firefox_downloads: i64,
}

#[derive(Serialize, Clone, Debug)]
pub struct SessionTokenResponse {
    pub user_id: i64,
    pub token: String,
    pub cookie_name: String,
    pub expires_in_days: u64,
}

#[derive(Serialize, Clone, Debug)]
pub struct DeleteResponse {
    pub model: &'static str,
    pub id: i64,
}

// ============ Health 类型 ============

#[derive(Serialize, Clone, Debug)]
pub struct HealthStorageBackend {
    pub storage_type: String,
    pub support_click: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: HealthStorageBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct HealthChecks {
    pub storage: HealthStorageCheck,
    /// 尚未写入数据库的缓冲点击数；未启用缓冲时为空
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffered_clicks: Option<usize>,
}

#[derive(Serialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u32,
    pub checks: HealthChecks,
    pub response_time_ms: u32,
}
