//! Admin API 路由配置
//!
//! 所有路由挂在 `{admin_prefix}/v1` 下，由 AdminAuth 统一鉴权。

use actix_web::web;

use crate::api::constants::ADMIN_API_VERSION;

use super::model_crud::{create_model, delete_model, get_model, list_models, update_model};
use super::operations::{issue_session, put_datapoint};

/// 链接数据点路由 `/links`
pub fn links_routes() -> actix_web::Scope {
    web::scope("/links").route(
        "/{id:\\d+}/datapoints/{date}",
        web::put().to(put_datapoint),
    )
}

/// 用户路由 `/users`
pub fn users_routes() -> actix_web::Scope {
    web::scope("/users").route("/{id:\\d+}/session", web::post().to(issue_session))
}

/// 注册表中的模型路由 `/{model}`（必须最后注册）
pub fn model_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{model}", web::get().to(list_models))
        .route("/{model}", web::post().to(create_model))
        .route("/{model}/{id:\\d+}", web::get().to(get_model))
        .route("/{model}/{id:\\d+}", web::put().to(update_model))
        .route("/{model}/{id:\\d+}", web::delete().to(delete_model));
}

/// `/v1` 作用域
pub fn admin_v1_routes() -> actix_web::Scope {
    web::scope(ADMIN_API_VERSION)
        .service(links_routes())
        .service(users_routes())
        .configure(model_routes)
}
