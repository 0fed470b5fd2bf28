use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum AffiliatesError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    Unauthorized(String),
    DateParse(String),
}

impl AffiliatesError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            AffiliatesError::DatabaseConfig(_) => "E001",
            AffiliatesError::DatabaseConnection(_) => "E002",
            AffiliatesError::DatabaseOperation(_) => "E003",
            AffiliatesError::FileOperation(_) => "E004",
            AffiliatesError::Validation(_) => "E005",
            AffiliatesError::NotFound(_) => "E006",
            AffiliatesError::Serialization(_) => "E007",
            AffiliatesError::Unauthorized(_) => "E008",
            AffiliatesError::DateParse(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            AffiliatesError::DatabaseConfig(_) => "Database Configuration Error",
            AffiliatesError::DatabaseConnection(_) => "Database Connection Error",
            AffiliatesError::DatabaseOperation(_) => "Database Operation Error",
            AffiliatesError::FileOperation(_) => "File Operation Error",
            AffiliatesError::Validation(_) => "Validation Error",
            AffiliatesError::NotFound(_) => "Resource Not Found",
            AffiliatesError::Serialization(_) => "Serialization Error",
            AffiliatesError::Unauthorized(_) => "Unauthorized",
            AffiliatesError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            AffiliatesError::DatabaseConfig(msg)
            | AffiliatesError::DatabaseConnection(msg)
            | AffiliatesError::DatabaseOperation(msg)
            | AffiliatesError::FileOperation(msg)
            | AffiliatesError::Validation(msg)
            | AffiliatesError::NotFound(msg)
            | AffiliatesError::Serialization(msg)
            | AffiliatesError::Unauthorized(msg)
            | AffiliatesError::DateParse(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            AffiliatesError::Validation(_) | AffiliatesError::DateParse(_) => {
                StatusCode::BAD_REQUEST
            }
            AffiliatesError::NotFound(_) => StatusCode::NOT_FOUND,
            AffiliatesError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AffiliatesError::DatabaseConfig(_)
            | AffiliatesError::DatabaseConnection(_)
            | AffiliatesError::DatabaseOperation(_)
            | AffiliatesError::FileOperation(_)
            | AffiliatesError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于命令行）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for AffiliatesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AffiliatesError {}

// 便捷的构造函数
impl AffiliatesError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        AffiliatesError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        AffiliatesError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        AffiliatesError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        AffiliatesError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AffiliatesError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        AffiliatesError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        AffiliatesError::Serialization(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        AffiliatesError::Unauthorized(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        AffiliatesError::DateParse(msg.into())
    }
}

impl From<sea_orm::DbErr> for AffiliatesError {
    fn from(err: sea_orm::DbErr) -> Self {
        AffiliatesError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for AffiliatesError {
    fn from(err: std::io::Error) -> Self {
        AffiliatesError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for AffiliatesError {
    fn from(err: serde_json::Error) -> Self {
        AffiliatesError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for AffiliatesError {
    fn from(err: chrono::ParseError) -> Self {
        AffiliatesError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AffiliatesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_unique() {
        let errors = [
            AffiliatesError::database_config("x"),
            AffiliatesError::database_connection("x"),
            AffiliatesError::database_operation("x"),
            AffiliatesError::file_operation("x"),
            AffiliatesError::validation("x"),
            AffiliatesError::not_found("x"),
            AffiliatesError::serialization("x"),
            AffiliatesError::unauthorized("x"),
            AffiliatesError::date_parse("x"),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            AffiliatesError::not_found("banner").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AffiliatesError::validation("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AffiliatesError::database_operation("boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_simple() {
        let err = AffiliatesError::not_found("Link 42");
        assert_eq!(err.format_simple(), "Resource Not Found: Link 42");
        assert_eq!(err.to_string(), err.format_simple());
    }

    #[test]
    fn test_from_db_err() {
        let err: AffiliatesError = sea_orm::DbErr::Custom("oops".to_string()).into();
        assert_eq!(err.code(), "E003");
        assert!(err.message().contains("oops"));
    }
}
