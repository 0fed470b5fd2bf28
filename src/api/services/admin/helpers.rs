//! API 帮助函数（管理 API 与页面共用）

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::errors::AffiliatesError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建 201 Created 响应
pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Created", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 AffiliatesError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_affiliates(err: &AffiliatesError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        tracing::error!("{}", err.format_simple());
    }
    error_response(status, ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 AffiliatesError。
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<AffiliatesError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => {
            let err: AffiliatesError = e.into();
            error_from_affiliates(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = success_response("success_data");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_created_response() {
        assert_eq!(created_response(1).status(), StatusCode::CREATED);
    }

    #[test]
    fn test_error_response() {
        let response = error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "Something went wrong",
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_api_result_maps_errors() {
        let ok: Result<i32, AffiliatesError> = Ok(1);
        assert_eq!(api_result(ok).status(), StatusCode::OK);

        let missing: Result<i32, AffiliatesError> = Err(AffiliatesError::not_found("Banner 9"));
        assert_eq!(api_result(missing).status(), StatusCode::NOT_FOUND);

        let invalid: Result<i32, AffiliatesError> =
            Err(AffiliatesError::validation("bad destination"));
        assert_eq!(api_result(invalid).status(), StatusCode::BAD_REQUEST);
    }
}
