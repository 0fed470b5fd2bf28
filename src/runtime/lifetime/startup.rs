use crate::analytics::global::set_global_click_manager;
use crate::analytics::manager::ClickManager;
use crate::config::get_config;
use crate::services::leaderboard::spawn_leaderboard_schedule;
use crate::storage::{SeaOrmStorage, StorageFactory};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub route_config: RouteConfig,
}

#[derive(Clone, Debug)]
pub struct RouteConfig {
    pub admin_prefix: String,
}

/// 准备服务器启动的上下文
/// 包括存储、点击缓冲、排行榜定时任务和路由配置
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let config = get_config();

    // 初始化点击计数器
    if config.clicks.buffered {
        let manager = Arc::new(ClickManager::new(
            storage.as_click_sink(),
            Duration::from_secs(config.clicks.flush_interval_secs),
            config.clicks.max_clicks_before_flush,
        ));
        set_global_click_manager(manager.clone());

        // 启动后台任务，并保持强引用以确保任务不会被过早销毁
        tokio::spawn(async move {
            manager.start_background_task().await;
        });

        debug!(
            "ClickManager initialized with {} seconds and {} max clicks before flush",
            config.clicks.flush_interval_secs, config.clicks.max_clicks_before_flush
        );
    } else {
        warn!("Click buffering is disabled, referral clicks are written directly");
    }

    // 排行榜定时刷新（0 表示交给外部 cron）
    if config.leaderboard.refresh_interval_secs > 0 {
        spawn_leaderboard_schedule(
            storage.clone(),
            config.leaderboard.batch_size,
            Duration::from_secs(config.leaderboard.refresh_interval_secs),
        );
        info!(
            "Leaderboard will be regenerated every {} seconds",
            config.leaderboard.refresh_interval_secs
        );
    } else {
        debug!("In-process leaderboard schedule disabled");
    }

    let route_config = RouteConfig {
        admin_prefix: config.api.admin_prefix.clone(),
    };

    check_component_enabled(&route_config);

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        route_config,
    })
}

fn check_component_enabled(route_config: &RouteConfig) {
    let config = get_config();

    let jwt_secret = &config.api.jwt_secret;
    if jwt_secret.is_empty() {
        warn!(
            "WARNING: api.jwt_secret is not set. \
            A random secret is used and sessions will not survive a restart."
        );
    } else if jwt_secret.len() < 32 {
        warn!(
            "WARNING: JWT Secret is too short ({} bytes). \
            Recommended minimum is 32 bytes for security.",
            jwt_secret.len()
        );
    }

    let admin_token = &config.api.admin_token;
    if admin_token.is_empty() {
        info!("Admin API is disabled (admin_token not set)");
    } else {
        if admin_token.len() < 8 {
            warn!("WARNING: Admin Token is very short. Consider using a stronger token.");
        }
        info!("Admin API available at: {}", route_config.admin_prefix);
    }
}
