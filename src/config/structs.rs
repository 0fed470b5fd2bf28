use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 服务器地址、端口、CPU 数量
/// - database: 数据库连接配置
/// - logging: 日志配置
/// - api: 管理接口与会话令牌
/// - affiliates: 推广计划行为
/// - leaderboard: 排行榜批处理
/// - clicks: 点击缓冲与刷盘
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub affiliates: AffiliatesConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub clicks: ClickConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：AFF，分隔符：__
    /// 示例：AFF__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("AFF")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 管理接口与会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 为空时管理接口返回 404
    #[serde(default)]
    pub admin_token: String,
    /// 为空时启动时随机生成（重启后旧会话失效）
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,
    #[serde(default = "default_session_token_days")]
    pub session_token_days: u64,
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,
}

/// 推广计划行为配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliatesConfig {
    /// 旧版链接找不到对应实例时的跳转目标
    #[serde(default = "default_affiliate_link")]
    pub default_affiliate_link: String,
    /// 距上次访问至少多少天才汇总活动
    #[serde(default = "default_activity_message_min_days")]
    pub activity_message_min_days: i64,
}

/// 排行榜配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    #[serde(default = "default_leaderboard_batch_size")]
    pub batch_size: usize,
    /// 0 表示不在服务进程内定时刷新（交给 cron）
    #[serde(default)]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_leaderboard_display_limit")]
    pub display_limit: u64,
}

/// 点击缓冲配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickConfig {
    #[serde(default = "default_true")]
    pub buffered: bool,
    #[serde(default = "default_click_flush_interval")]
    pub flush_interval_secs: u64,
    #[serde(default = "default_max_clicks_before_flush")]
    pub max_clicks_before_flush: usize,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "affiliates.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_session_cookie_name() -> String {
    "affiliates_session".to_string()
}

fn default_session_token_days() -> u64 {
    30
}

fn default_admin_prefix() -> String {
    "/admin".to_string()
}

fn default_affiliate_link() -> String {
    "https://www.mozilla.org/firefox/".to_string()
}

fn default_activity_message_min_days() -> i64 {
    1
}

fn default_leaderboard_batch_size() -> usize {
    1000
}

fn default_leaderboard_display_limit() -> u64 {
    100
}

fn default_click_flush_interval() -> u64 {
    30
}

fn default_max_clicks_before_flush() -> usize {
    100
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            admin_token: String::new(),
            jwt_secret: String::new(),
            session_cookie_name: default_session_cookie_name(),
            session_token_days: default_session_token_days(),
            admin_prefix: default_admin_prefix(),
        }
    }
}

impl Default for AffiliatesConfig {
    fn default() -> Self {
        Self {
            default_affiliate_link: default_affiliate_link(),
            activity_message_min_days: default_activity_message_min_days(),
        }
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            batch_size: default_leaderboard_batch_size(),
            refresh_interval_secs: 0,
            display_limit: default_leaderboard_display_limit(),
        }
    }
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            buffered: default_true(),
            flush_interval_secs: default_click_flush_interval(),
            max_clicks_before_flush: default_max_clicks_before_flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).expect("sample config must parse");
        assert_eq!(parsed.leaderboard.batch_size, 1000);
        assert_eq!(parsed.affiliates.activity_message_min_days, 1);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [affiliates]
            default_affiliate_link = "http://test.com"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.affiliates.default_affiliate_link, "http://test.com");
        assert_eq!(parsed.server.port, 8000);
        assert_eq!(parsed.api.session_cookie_name, "affiliates_session");
        assert!(parsed.clicks.buffered);
    }
}
