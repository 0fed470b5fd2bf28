use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use tracing::{error, trace};

use crate::api::routing::get_router;
use crate::config::get_config;
use crate::services::LINK_CLICKS_METRIC;
use crate::storage::{SeaOrmStorage, Standing};

use super::page::{render, server_error};

#[derive(Serialize)]
struct LeaderboardPage {
    metric: &'static str,
    standings: Vec<Standing>,
}

pub struct LeaderboardService;

impl LeaderboardService {
    /// 排行榜前 `leaderboard.display_limit` 名
    pub async fn standings(
        req: HttpRequest,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> HttpResponse {
        let limit = get_config().leaderboard.display_limit;
        trace!("Leaderboard requested, limit {}", limit);
        match storage.top_standings(LINK_CLICKS_METRIC, limit).await {
            Ok(standings) => render(
                &req,
                StatusCode::OK,
                LeaderboardPage {
                    metric: LINK_CLICKS_METRIC,
                    standings,
                },
            ),
            Err(e) => {
                error!("Failed to load leaderboard: {}", e);
                server_error()
            }
        }
    }
}

pub fn leaderboard_routes(cfg: &mut web::ServiceConfig) {
    if let Some(route) = get_router().route("leaderboard") {
        cfg.route(
            &route.actix_pattern(),
            web::get().to(LeaderboardService::standings),
        );
    }
}
