//! Admin API 服务模块
//!
//! - 模型注册表（分类与三种横幅的列表列、表单字段、搜索与内联变体）
//! - 基于注册表的通用 CRUD 端点
//! - 数据点录入与会话 token 签发

pub mod error_code;
mod helpers;
mod model_crud;
mod operations;
pub mod registry;
pub mod routes;
mod types;

// 重新导出类型
pub use types::*;

// 重新导出帮助函数
pub use helpers::{
    api_result, created_response, error_from_affiliates, error_response, json_response,
    success_response,
};

// 重新导出错误码
pub use error_code::ErrorCode;

pub use model_crud::{create_model, delete_model, get_model, list_models, update_model};
pub use operations::{issue_session, parse_day, put_datapoint};
pub use registry::{AdminModel, MODEL_ADMINS, ModelAdmin, find_model_admin};
