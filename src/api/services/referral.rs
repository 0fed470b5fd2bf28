//! Referral redirects and legacy banner views
//!
//! `links.referral` counts a click on a generator link. `banners.link` and
//! `banners.link.old` serve links from the first banner program, which always
//! redirect: unknown instances go to the default affiliate link.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use tracing::{debug, error, trace, warn};

use crate::analytics::record_referral_click;
use crate::api::constants::LEGACY_IMAGE_FIELD;
use crate::api::routing::{ResolverMatch, get_router};
use crate::config::get_config;
use crate::storage::{BannerInstance, LegacyBanner, LegacyBannerImage, SeaOrmStorage};

use super::page::{
    app_storage, current_user, login_required, not_found, redirect, render, server_error,
};

/// A view callable straight from a resolved path
pub type ResolvedView =
    Rc<dyn Fn(HttpRequest, ResolverMatch) -> LocalBoxFuture<'static, HttpResponse>>;

#[derive(Serialize)]
struct LegacyCustomizePage {
    banner: LegacyBanner,
    images: Vec<LegacyBannerImage>,
    instances: Vec<BannerInstance>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    errors: HashMap<&'static str, String>,
}

pub struct ReferralService;

impl ReferralService {
    /// Count a click on a link and redirect to its banner's destination
    pub async fn follow_link(storage: &SeaOrmStorage, link_id: i64) -> HttpResponse {
        match storage.referral_destination(link_id).await {
            Ok(Some(destination)) => {
                if let Err(e) = record_referral_click(storage, link_id).await {
                    error!("Failed to record click for link {}: {}", link_id, e);
                }
                trace!("Link {} -> {}", link_id, destination);
                redirect(&destination)
            }
            Ok(None) => {
                debug!("Referral link {} not found", link_id);
                not_found("Link not found")
            }
            Err(e) => {
                error!("Referral lookup for link {} failed: {}", link_id, e);
                server_error()
            }
        }
    }

    fn default_redirect() -> HttpResponse {
        redirect(&get_config().affiliates.default_affiliate_link)
    }

    /// Count a click on a legacy instance and redirect to its badge
    async fn follow_instance(
        storage: &SeaOrmStorage,
        instance: Option<BannerInstance>,
    ) -> HttpResponse {
        let Some(instance) = instance else {
            return Self::default_redirect();
        };

        if let Err(e) = storage.increment_instance_clicks(instance.id).await {
            error!("Failed to count click on banner instance {}: {}", instance.id, e);
        }
        match storage.get_legacy_banner(instance.badge_id).await {
            Ok(Some(badge)) => redirect(&badge.href),
            Ok(None) => Self::default_redirect(),
            Err(e) => {
                warn!("Badge lookup for instance {} failed: {}", instance.id, e);
                Self::default_redirect()
            }
        }
    }

    pub async fn follow_instance_by_id(storage: &SeaOrmStorage, instance_id: i64) -> HttpResponse {
        let instance = storage
            .get_banner_instance(instance_id)
            .await
            .unwrap_or_else(|e| {
                warn!("Banner instance {} lookup failed: {}", instance_id, e);
                None
            });
        Self::follow_instance(storage, instance).await
    }

    /// Old URL scheme `/link/{user}/{badge}/{image}/`; never creates an instance
    pub async fn follow_old_link(
        storage: &SeaOrmStorage,
        user_id: i64,
        badge_id: i64,
        image_id: i64,
    ) -> HttpResponse {
        let instance = storage
            .find_banner_instance(user_id, badge_id, image_id)
            .await
            .unwrap_or_else(|e| {
                warn!(
                    "Banner instance ({}, {}, {}) lookup failed: {}",
                    user_id, badge_id, image_id, e
                );
                None
            });
        Self::follow_instance(storage, instance).await
    }

    async fn legacy_page(
        storage: &SeaOrmStorage,
        user_id: i64,
        badge_id: i64,
        errors: HashMap<&'static str, String>,
    ) -> crate::errors::Result<Option<LegacyCustomizePage>> {
        let Some(banner) = storage.get_legacy_banner(badge_id).await? else {
            return Ok(None);
        };
        Ok(Some(LegacyCustomizePage {
            images: storage.legacy_banner_images(badge_id).await?,
            instances: storage.user_banner_instances(user_id, badge_id).await?,
            banner,
            errors,
        }))
    }

    pub async fn legacy_customize(
        req: HttpRequest,
        path: web::Path<i64>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> HttpResponse {
        let badge_id = path.into_inner();
        let Some(user) = current_user(&req) else {
            return login_required();
        };
        match Self::legacy_page(&storage, user.id, badge_id, HashMap::new()).await {
            Ok(Some(page)) => render(&req, StatusCode::OK, page),
            Ok(None) => not_found("Banner not found"),
            Err(e) => {
                error!("Failed to load legacy banner {}: {}", badge_id, e);
                server_error()
            }
        }
    }

    /// Pick an image of a legacy badge; get-or-create the user's instance
    pub async fn legacy_customize_submit(
        req: HttpRequest,
        path: web::Path<i64>,
        form: web::Form<HashMap<String, String>>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> HttpResponse {
        let badge_id = path.into_inner();
        let Some(user) = current_user(&req) else {
            return login_required();
        };

        let image_id = form
            .get(LEGACY_IMAGE_FIELD)
            .and_then(|v| v.trim().parse::<i64>().ok());
        let valid = match image_id {
            Some(image_id) => match storage.legacy_banner_has_image(badge_id, image_id).await {
                Ok(valid) => valid,
                Err(e) => {
                    error!("Image check for badge {} failed: {}", badge_id, e);
                    return server_error();
                }
            },
            None => false,
        };

        if let (true, Some(image_id)) = (valid, image_id) {
            return match storage
                .get_or_create_banner_instance(user.id, badge_id, image_id)
                .await
            {
                Ok((instance, created)) => {
                    debug!(
                        "Banner instance {} for user {} (created: {})",
                        instance.id, user.id, created
                    );
                    let target = get_router()
                        .reverse("banners.customize", &[("banner_pk", badge_id.to_string())])
                        .unwrap_or_else(|| "/".to_string());
                    redirect(&target)
                }
                Err(e) => {
                    error!("Failed to create banner instance: {}", e);
                    server_error()
                }
            };
        }

        let mut errors = HashMap::new();
        errors.insert(
            LEGACY_IMAGE_FIELD,
            "Select a valid choice. That choice is not one of the available choices.".to_string(),
        );
        match Self::legacy_page(&storage, user.id, badge_id, errors).await {
            Ok(Some(page)) => render(&req, StatusCode::OK, page),
            Ok(None) => not_found("Banner not found"),
            Err(e) => {
                error!("Failed to load legacy banner {}: {}", badge_id, e);
                server_error()
            }
        }
    }

    async fn referral(
        path: web::Path<i64>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> HttpResponse {
        Self::follow_link(&storage, path.into_inner()).await
    }

    // 旧版链接的 id 超出 i64 时同样视为未知实例
    async fn banner_link(
        path: web::Path<String>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> HttpResponse {
        match path.parse::<i64>() {
            Ok(instance_id) => Self::follow_instance_by_id(&storage, instance_id).await,
            Err(_) => Self::default_redirect(),
        }
    }

    async fn old_link(
        path: web::Path<(String, String, String)>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> HttpResponse {
        let (user_id, badge_id, image_id) = path.into_inner();
        match (
            user_id.parse::<i64>(),
            badge_id.parse::<i64>(),
            image_id.parse::<i64>(),
        ) {
            (Ok(user_id), Ok(badge_id), Ok(image_id)) => {
                Self::follow_old_link(&storage, user_id, badge_id, image_id).await
            }
            _ => Self::default_redirect(),
        }
    }
}

/// `on_bad_id` answers when a path id does not fit in an i64
fn resolved_view<F, Fut>(view: F, on_bad_id: fn() -> HttpResponse) -> ResolvedView
where
    F: Fn(Arc<SeaOrmStorage>, ResolverMatch) -> Option<Fut> + 'static,
    Fut: Future<Output = HttpResponse> + 'static,
{
    Rc::new(move |req: HttpRequest, resolved: ResolverMatch| -> LocalBoxFuture<'static, HttpResponse> {
        let Some(storage) = app_storage(&req) else {
            error!("Storage not registered for {}", resolved.view_name);
            return Box::pin(async { server_error() });
        };
        match view(storage, resolved) {
            Some(fut) => Box::pin(fut),
            None => Box::pin(async move { on_bad_id() }),
        }
    })
}

/// Views that can answer straight from a resolved path, keyed by route name
pub fn resolved_views() -> HashMap<&'static str, ResolvedView> {
    let mut views: HashMap<&'static str, ResolvedView> = HashMap::new();
    views.insert(
        "links.referral",
        resolved_view(
            |storage, m| {
                let link_id = m.kwarg_id("pk")?;
                Some(async move { ReferralService::follow_link(&storage, link_id).await })
            },
            || not_found("Not Found"),
        ),
    );
    views.insert(
        "banners.link",
        resolved_view(
            |storage, m| {
                let instance_id = m.kwarg_id("banner_instance_id")?;
                Some(async move {
                    ReferralService::follow_instance_by_id(&storage, instance_id).await
                })
            },
            ReferralService::default_redirect,
        ),
    );
    views.insert(
        "banners.link.old",
        resolved_view(
            |storage, m| {
                let user_id = m.kwarg_id("user_id")?;
                let badge_id = m.kwarg_id("banner_id")?;
                let image_id = m.kwarg_id("banner_img_id")?;
                Some(async move {
                    ReferralService::follow_old_link(&storage, user_id, badge_id, image_id).await
                })
            },
            ReferralService::default_redirect,
        ),
    );
    views
}

/// Referral 与旧版横幅路由配置
pub fn referral_routes(cfg: &mut web::ServiceConfig) {
    let router = get_router();
    let pattern = |name: &str| {
        router
            .route(name)
            .map(|r| r.actix_pattern())
            .unwrap_or_default()
    };

    cfg.route(
        &pattern("links.referral"),
        web::get().to(ReferralService::referral),
    )
    .route(
        &pattern("banners.link"),
        web::get().to(ReferralService::banner_link),
    )
    .route(
        &pattern("banners.link.old"),
        web::get().to(ReferralService::old_link),
    )
    .service(
        web::resource(pattern("banners.customize"))
            .route(web::get().to(ReferralService::legacy_customize))
            .route(web::post().to(ReferralService::legacy_customize_submit)),
    );
}
