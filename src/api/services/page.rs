//! 公共页面的响应帮助函数
//!
//! 页面以 JSON 文档返回，信封与管理 API 相同，`data.messages` 携带 flash 消息。

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, web};
use serde::Serialize;

use crate::api::messages::take_messages;
use crate::api::middleware::CurrentUser;
use crate::api::services::admin::{ErrorCode, error_response, json_response};
use crate::services::activity::FlashMessage;
use crate::storage::SeaOrmStorage;

#[derive(Serialize)]
struct Page<T: Serialize> {
    messages: Vec<FlashMessage>,
    #[serde(flatten)]
    body: T,
}

pub(crate) fn app_storage(req: &HttpRequest) -> Option<Arc<SeaOrmStorage>> {
    req.app_data::<web::Data<Arc<SeaOrmStorage>>>()
        .map(|data| Arc::clone(data.get_ref()))
}

pub(crate) fn current_user(req: &HttpRequest) -> Option<CurrentUser> {
    req.extensions().get::<CurrentUser>().copied()
}

/// 渲染页面，并消费本次请求的 flash 消息
pub(crate) fn render<T: Serialize>(req: &HttpRequest, status: StatusCode, body: T) -> HttpResponse {
    let page = Page {
        messages: take_messages(req),
        body,
    };
    let message = if status.is_success() { "OK" } else { "Invalid form" };
    let code = if status.is_success() {
        ErrorCode::Success
    } else {
        ErrorCode::BadRequest
    };
    json_response(status, code, message, Some(page))
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header(("Location", location))
        .finish()
}

pub(crate) fn not_found(what: &str) -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, ErrorCode::NotFound, what)
}

pub(crate) fn login_required() -> HttpResponse {
    error_response(
        StatusCode::UNAUTHORIZED,
        ErrorCode::LoginRequired,
        "Login required",
    )
}

pub(crate) fn server_error() -> HttpResponse {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::InternalServerError,
        "Internal Server Error",
    )
}

/// `scheme://host` of the current request
pub(crate) fn base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}
