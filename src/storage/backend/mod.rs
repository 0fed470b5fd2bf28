//! SeaORM storage backend
//!
//! Database access for the affiliates service on SQLite, MySQL/MariaDB and
//! PostgreSQL. Operations are grouped per aggregate in the submodules.

mod banners;
mod categories;
mod click_sink;
mod connection;
mod converters;
mod leaderboard;
mod legacy;
mod links;
pub mod retry;
mod users;

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use sea_orm::sea_query::{Alias, Expr, Func};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::warn;

use crate::analytics::ClickSink;
use crate::errors::{AffiliatesError, Result};
use crate::storage::models::StorageConfig;

pub use categories::build_category_tree;
pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use links::NewLink;

/// 把 SUM 表达式转成 64 位整数
///
/// Postgres 对 BIGINT 求和得到 NUMERIC，MySQL 得到 DECIMAL，都不能直接解码为 i64。
/// MySQL 的 CAST 不接受 BIGINT，要写 SIGNED。
pub(crate) fn sum_as_bigint(backend: DatabaseBackend, sum: impl Into<Expr>) -> Expr {
    let target = match backend {
        DatabaseBackend::MySql => "SIGNED",
        _ => "BIGINT",
    };
    Func::cast_as(sum, Alias::new(target)).into()
}

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(AffiliatesError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

pub fn normalize_backend_name(backend: &str) -> String {
    match backend {
        "mariadb" => "mysql".to_string(),
        other => other.to_string(),
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// link id -> banner destination, used by the referral redirect
    referral_cache: Cache<i64, String>,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(AffiliatesError::database_config("database_url is not set"));
        }

        let config = crate::config::get_config();
        let retry_config = retry::RetryConfig {
            max_retries: config.database.retry_count,
            base_delay_ms: config.database.retry_base_delay_ms,
            max_delay_ms: config.database.retry_max_delay_ms,
        };

        let backend_name = normalize_backend_name(backend_name);
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name, config.database.pool_size).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            referral_cache: Cache::builder()
                .time_to_live(Duration::from_secs(60))
                .max_capacity(10_000)
                .build(),
            retry_config,
        };

        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn get_backend_config(&self) -> StorageConfig {
        StorageConfig {
            storage_type: self.backend_name.clone(),
            support_click: true,
        }
    }

    pub fn as_click_sink(&self) -> Arc<dyn ClickSink> {
        Arc::new(self.clone()) as Arc<dyn ClickSink>
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 连通性检查，供健康检查接口使用
    pub async fn ping(&self) -> Result<()> {
        let backend = self.db.get_database_backend();
        self.db
            .execute_raw(Statement::from_string(backend, "SELECT 1"))
            .await?;
        Ok(())
    }

    /// 横幅目标地址变更后调用
    pub(crate) fn invalidate_referral_cache(&self) {
        self.referral_cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::entities::data_point;
    use sea_orm::{ColumnTrait, EntityTrait, QuerySelect, QueryTrait};

    fn clicks_sql(backend: DatabaseBackend) -> String {
        data_point::Entity::find()
            .select_only()
            .column_as(
                sum_as_bigint(backend, data_point::Column::LinkClicks.sum()),
                "clicks",
            )
            .build(backend)
            .to_string()
    }

    #[test]
    fn test_sum_is_cast_per_backend() {
        let postgres = clicks_sql(DatabaseBackend::Postgres);
        assert!(postgres.contains("CAST(SUM("), "{}", postgres);
        assert!(postgres.contains("AS BIGINT)"), "{}", postgres);

        let mysql = clicks_sql(DatabaseBackend::MySql);
        assert!(mysql.contains("CAST(SUM("), "{}", mysql);
        assert!(mysql.contains("AS SIGNED)"), "{}", mysql);

        assert!(clicks_sql(DatabaseBackend::Sqlite).contains("AS BIGINT)"));
    }
}
