//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::AffiliatesError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 横幅与分类错误
/// - 4000-4099: 链接与数据点错误
/// - 5000-5099: 用户错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,
    ServiceUnavailable = 1030,

    // 认证错误 2000-2099
    LoginRequired = 2000,
    TokenIssueFailed = 2001,

    // 横幅与分类错误 3000-3099
    BannerNotFound = 3000,
    BannerInvalidData = 3001,
    VariationInvalid = 3002,
    CategoryNotFound = 3010,

    // 链接与数据点错误 4000-4099
    LinkNotFound = 4000,
    DataPointInvalid = 4001,

    // 用户错误 5000-5099
    UserNotFound = 5000,

    // 数据库错误
    DatabaseError = 6000,
}

impl From<&AffiliatesError> for ErrorCode {
    fn from(err: &AffiliatesError) -> Self {
        match err {
            AffiliatesError::Validation(_) => ErrorCode::BadRequest,
            AffiliatesError::NotFound(_) => ErrorCode::NotFound,
            AffiliatesError::Unauthorized(_) => ErrorCode::Unauthorized,
            AffiliatesError::DateParse(_) => ErrorCode::InvalidDateFormat,
            AffiliatesError::DatabaseConfig(_)
            | AffiliatesError::DatabaseConnection(_)
            | AffiliatesError::DatabaseOperation(_) => ErrorCode::DatabaseError,
            AffiliatesError::FileOperation(_) | AffiliatesError::Serialization(_) => {
                ErrorCode::InternalServerError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::Success).unwrap(), "0");
        assert_eq!(
            serde_json::to_string(&ErrorCode::CategoryNotFound).unwrap(),
            "3010"
        );
        let code: ErrorCode = serde_json::from_str("4001").unwrap();
        assert_eq!(code, ErrorCode::DataPointInvalid);
    }

    #[test]
    fn test_from_error() {
        assert_eq!(
            ErrorCode::from(&AffiliatesError::validation("bad")),
            ErrorCode::BadRequest
        );
        assert_eq!(
            ErrorCode::from(&AffiliatesError::not_found("x")),
            ErrorCode::NotFound
        );
        assert_eq!(
            ErrorCode::from(&AffiliatesError::database_operation("x")),
            ErrorCode::DatabaseError
        );
    }
}
