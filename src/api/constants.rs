//! API 模块常量定义

/// Flash 消息 Cookie 名称
pub const MESSAGES_COOKIE_NAME: &str = "messages";

/// 管理 API 版本前缀（挂在 `api.admin_prefix` 之下）
pub const ADMIN_API_VERSION: &str = "/v1";

/// 生成器页面使用的表单字段
pub const VARIATION_FIELD: &str = "variation";

/// 旧版横幅定制表单字段
pub const LEGACY_IMAGE_FIELD: &str = "image";
