//! Admin operations outside the model registry
//!
//! - PUT /links/{id}/datapoints/{date}: record a day's clicks and downloads
//! - POST /users/{id}/session: issue a session token for a user

use std::sync::Arc;

use actix_web::{Responder, web};
use chrono::NaiveDate;
use tracing::{error, info};

use crate::api::jwt::get_jwt_service;
use crate::config::get_config;
use crate::errors::{AffiliatesError, Result};
use crate::storage::{DataPoint, SeaOrmStorage};

use super::helpers::api_result;
use super::types::{DataPointRequest, SessionTokenResponse};

/// 日期格式 YYYY-MM-DD
pub fn parse_day(raw: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?)
}

pub async fn put_datapoint(
    path: web::Path<(i64, String)>,
    body: web::Json<DataPointRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> impl Responder {
    let (link_id, raw_date) = path.into_inner();
    let result = async {
        let date = parse_day(&raw_date)?;
        let point = storage
            .upsert_datapoint(DataPoint {
                link_id,
                date,
                link_clicks: body.link_clicks,
                firefox_downloads: body.firefox_downloads,
            })
            .await?;
        info!(
            "Admin recorded data point for link {} on {}: {} clicks, {} downloads",
            link_id, date, point.link_clicks, point.firefox_downloads
        );
        Ok::<_, AffiliatesError>(point)
    }
    .await;
    api_result(result)
}

pub async fn issue_session(
    path: web::Path<i64>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> impl Responder {
    let user_id = path.into_inner();
    let result = async {
        let user = storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| AffiliatesError::not_found(format!("User {}", user_id)))?;
        let token = get_jwt_service()
            .issue_session_token(user.id)
            .map_err(|e| {
                error!("Failed to sign session token: {}", e);
                AffiliatesError::serialization(format!("Failed to sign session token: {}", e))
            })?;
        let config = get_config();
        info!("Admin issued a session token for user {}", user.id);
        Ok::<_, AffiliatesError>(SessionTokenResponse {
            user_id: user.id,
            token,
            cookie_name: config.api.session_cookie_name.clone(),
            expires_in_days: config.api.session_token_days,
        })
    }
    .await;
    api_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day() {
        assert_eq!(
            parse_day("2024-01-03").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
        );
        assert!(matches!(
            parse_day("03/01/2024"),
            Err(AffiliatesError::DateParse(_))
        ));
    }
}
