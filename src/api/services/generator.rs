//! Banner generator pages
//!
//! Category tree → banners of a category → customize one banner. Posting a
//! variation creates the user's referral link.

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::api::constants::VARIATION_FIELD;
use crate::api::routing::get_router;
use crate::services::links::{create_referral_link, referral_path};
use crate::storage::{Banner, BannerKind, CategoryNode, SeaOrmStorage, Variation};

use super::page::{base_url, current_user, login_required, not_found, redirect, render, server_error};

/// Route name of the customize page for a banner kind
pub fn customize_route(kind: BannerKind) -> &'static str {
    match kind {
        BannerKind::Image => "banners.generator.image_banner.customize",
        BannerKind::Text => "banners.generator.text_banner.customize",
        BannerKind::FirefoxUpgrade => "banners.generator.firefox_upgrade_banner.customize",
    }
}

#[derive(Serialize)]
struct CategoryListPage {
    categories: Vec<CategoryNode>,
}

#[derive(Serialize)]
struct BannerSummary {
    #[serde(flatten)]
    banner: Banner,
    link_clicks: i64,
    customize_url: Option<String>,
}

#[derive(Serialize)]
struct BannerListPage {
    category: CategoryNode,
    banners: Vec<BannerSummary>,
}

#[derive(Serialize)]
struct CustomizePage {
    banner: Banner,
    variations: Vec<Variation>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    errors: HashMap<&'static str, String>,
}

pub struct GeneratorService;

impl GeneratorService {
    pub async fn categories(
        req: HttpRequest,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        match storage.list_categories().await {
            Ok(categories) => render(&req, StatusCode::OK, CategoryListPage { categories }),
            Err(e) => {
                error!("Failed to load categories: {}", e);
                server_error()
            }
        }
    }

    pub async fn banners(
        req: HttpRequest,
        path: web::Path<i64>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let category_pk = path.into_inner();
        match Self::load_banner_list(&storage, category_pk).await {
            Ok(Some(page)) => render(&req, StatusCode::OK, page),
            Ok(None) => not_found("Category not found"),
            Err(e) => {
                error!("Failed to load banners of category {}: {}", category_pk, e);
                server_error()
            }
        }
    }

    async fn load_banner_list(
        storage: &SeaOrmStorage,
        category_pk: i64,
    ) -> crate::errors::Result<Option<BannerListPage>> {
        let tree = storage.list_categories().await?;
        let Some(category) = tree.into_iter().find(|node| node.id == category_pk) else {
            return Ok(None);
        };

        let banners = storage.visible_banners_in_category(category_pk).await?;
        let ids: Vec<i64> = banners.iter().map(|b| b.id).collect();
        let clicks = storage.banner_link_clicks(&ids).await?;
        let router = get_router();

        let banners = banners
            .into_iter()
            .map(|banner| BannerSummary {
                link_clicks: clicks.get(&banner.id).copied().unwrap_or(0),
                customize_url: router
                    .reverse(customize_route(banner.kind), &[("pk", banner.id.to_string())]),
                banner,
            })
            .collect();
        Ok(Some(BannerListPage { category, banners }))
    }

    /// 可定制的横幅：存在、可见、类型匹配
    async fn customizable_banner(
        storage: &SeaOrmStorage,
        kind: BannerKind,
        pk: i64,
    ) -> crate::errors::Result<Option<(Banner, Vec<Variation>)>> {
        let Some(banner) = storage.get_banner(kind, pk).await?.filter(|b| b.visible) else {
            return Ok(None);
        };
        let variations = storage.list_variations(kind, banner.id).await?;
        Ok(Some((banner, variations)))
    }

    pub async fn customize(
        req: HttpRequest,
        kind: BannerKind,
        pk: i64,
        storage: &SeaOrmStorage,
    ) -> HttpResponse {
        if current_user(&req).is_none() {
            return login_required();
        }
        match Self::customizable_banner(storage, kind, pk).await {
            Ok(Some((banner, variations))) => render(
                &req,
                StatusCode::OK,
                CustomizePage {
                    banner,
                    variations,
                    errors: HashMap::new(),
                },
            ),
            Ok(None) => not_found("Banner not found"),
            Err(e) => {
                error!("Failed to load {} banner {}: {}", kind, pk, e);
                server_error()
            }
        }
    }

    pub async fn create_link(
        req: HttpRequest,
        kind: BannerKind,
        pk: i64,
        form: HashMap<String, String>,
        storage: &SeaOrmStorage,
    ) -> HttpResponse {
        let Some(user) = current_user(&req) else {
            return login_required();
        };
        let (banner, variations) = match Self::customizable_banner(storage, kind, pk).await {
            Ok(Some(found)) => found,
            Ok(None) => return not_found("Banner not found"),
            Err(e) => {
                error!("Failed to load {} banner {}: {}", kind, pk, e);
                return server_error();
            }
        };

        let chosen = form
            .get(VARIATION_FIELD)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(|id| variations.iter().find(|v| v.id == id).cloned());

        let Some(variation) = chosen else {
            debug!("Rejected variation {:?} for banner {}", form.get(VARIATION_FIELD), pk);
            let mut errors = HashMap::new();
            errors.insert(
                VARIATION_FIELD,
                "Select a valid choice. That choice is not one of the available choices."
                    .to_string(),
            );
            return render(
                &req,
                StatusCode::OK,
                CustomizePage {
                    banner,
                    variations,
                    errors,
                },
            );
        };

        match create_referral_link(storage, user.id, &banner, &variation, &base_url(&req)).await {
            Ok(link) => {
                info!(
                    "User {} created link {} for {} banner {}",
                    user.id, link.id, kind, banner.id
                );
                redirect(&referral_path(link.id))
            }
            Err(e) => {
                error!("Failed to create link for banner {}: {}", banner.id, e);
                server_error()
            }
        }
    }
}

macro_rules! customize_handlers {
    ($get:ident, $post:ident, $kind:expr) => {
        async fn $get(
            req: HttpRequest,
            path: web::Path<i64>,
            storage: web::Data<Arc<SeaOrmStorage>>,
        ) -> HttpResponse {
            GeneratorService::customize(req, $kind, path.into_inner(), &storage).await
        }

        async fn $post(
            req: HttpRequest,
            path: web::Path<i64>,
            form: web::Form<HashMap<String, String>>,
            storage: web::Data<Arc<SeaOrmStorage>>,
        ) -> HttpResponse {
            GeneratorService::create_link(req, $kind, path.into_inner(), form.into_inner(), &storage)
                .await
        }
    };
}

customize_handlers!(customize_image, create_image_link, BannerKind::Image);
customize_handlers!(customize_text, create_text_link, BannerKind::Text);
customize_handlers!(
    customize_upgrade,
    create_upgrade_link,
    BannerKind::FirefoxUpgrade
);

/// Generator 路由配置
pub fn generator_routes(cfg: &mut web::ServiceConfig) {
    let router = get_router();
    let pattern = |name: &str| {
        router
            .route(name)
            .map(|r| r.actix_pattern())
            .unwrap_or_default()
    };

    cfg.route(
        &pattern("banners.generator.categories"),
        web::get().to(GeneratorService::categories),
    )
    .route(
        &pattern("banners.generator.banners"),
        web::get().to(GeneratorService::banners),
    )
    .service(
        web::resource(pattern(customize_route(BannerKind::Image)))
            .route(web::get().to(customize_image))
            .route(web::post().to(create_image_link)),
    )
    .service(
        web::resource(pattern(customize_route(BannerKind::Text)))
            .route(web::get().to(customize_text))
            .route(web::post().to(create_text_link)),
    )
    .service(
        web::resource(pattern(customize_route(BannerKind::FirefoxUpgrade)))
            .route(web::get().to(customize_upgrade))
            .route(web::post().to(create_upgrade_link)),
    );
}
