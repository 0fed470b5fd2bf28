//! Generator, referral and legacy banner view tests
//!
//! Requests go through the same middleware stack the server uses.

use std::sync::{Arc, Once};

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::Utc;
use serde_json::Value;
use tempfile::TempDir;

use affiliates::api::jwt::get_jwt_service;
use affiliates::api::middleware::{
    FlashMessages, ReferralSkip, RequestIdMiddleware, SessionMiddleware, StatsSinceLastVisit,
};
use affiliates::api::services::{generator_routes, leaderboard_routes, referral_routes};
use affiliates::config::{get_config, update_config};
use affiliates::storage::{
    Banner, BannerKind, CategoryInput, NewBanner, SeaOrmStorage, Variation,
};

// =============================================================================
// Test Setup
// =============================================================================

static INIT: Once = Once::new();

fn init_test_config() {
    INIT.call_once(|| {
        update_config(|c| {
            c.api.jwt_secret = "banner-views-test-secret-0123456789abcdef".to_string();
            c.affiliates.default_affiliate_link = "http://test.com".to_string();
        });
    });
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_test_config();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("banner_views_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");
    (Arc::new(storage), temp_dir)
}

macro_rules! full_app {
    ($storage:expr) => {
        test::init_service(
            App::new()
                .wrap(StatsSinceLastVisit::default())
                .wrap(FlashMessages)
                .wrap(SessionMiddleware)
                .wrap(ReferralSkip::default())
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($storage.clone()))
                .configure(generator_routes)
                .configure(referral_routes)
                .configure(leaderboard_routes),
        )
        .await
    };
}

fn session_cookie(user_id: i64) -> Cookie<'static> {
    let token = get_jwt_service().issue_session_token(user_id).unwrap();
    Cookie::new(get_config().api.session_cookie_name.clone(), token)
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

struct Fixture {
    user_id: i64,
    category_id: i64,
    banner: Banner,
    variation_id: i64,
}

async fn text_banner_fixture(storage: &SeaOrmStorage, visible: bool) -> Fixture {
    let user = storage.create_user("mkelly", "mkelly@example.com").await.unwrap();
    let category = storage
        .create_category(CategoryInput {
            name: "Firefox".to_string(),
            parent_id: None,
        })
        .await
        .unwrap();
    let banner = storage
        .create_banner(
            BannerKind::Text,
            NewBanner {
                name: "Spread the word".to_string(),
                category_id: category.id,
                destination: "https://www.mozilla.org/firefox/".to_string(),
                visible,
            },
        )
        .await
        .unwrap();
    let variations = storage
        .replace_variations(
            BannerKind::Text,
            banner.id,
            vec![Variation {
                locale: "en-us".to_string(),
                text: Some("Download Firefox".to_string()),
                ..Default::default()
            }],
        )
        .await
        .unwrap();
    Fixture {
        user_id: user.id,
        category_id: category.id,
        banner,
        variation_id: variations[0].id,
    }
}

// =============================================================================
// Generator views
// =============================================================================

#[actix_rt::test]
async fn test_generator_categories_and_banners() {
    let (storage, _dir) = create_temp_storage().await;
    let fx = text_banner_fixture(&storage, true).await;
    let app = full_app!(storage);

    let req = TestRequest::get().uri("/generator/categories/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["categories"][0]["name"], "Firefox");

    let req = TestRequest::get()
        .uri(&format!("/generator/categories/{}/", fx.category_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let banners = body["data"]["banners"].as_array().unwrap();
    assert_eq!(banners.len(), 1);
    assert_eq!(
        banners[0]["customize_url"],
        format!("/generator/text_banners/{}/customize/", fx.banner.id)
    );

    let req = TestRequest::get().uri("/generator/categories/999/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_customize_requires_login_and_matching_kind() {
    let (storage, _dir) = create_temp_storage().await;
    let fx = text_banner_fixture(&storage, true).await;
    let app = full_app!(storage);

    let uri = format!("/generator/text_banners/{}/customize/", fx.banner.id);
    let resp = test::call_service(&app, TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::get()
        .uri(&uri)
        .cookie(session_cookie(fx.user_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["banner"]["name"], "Spread the word");
    assert_eq!(body["data"]["variations"][0]["text"], "Download Firefox");

    // 文本横幅不能通过图片横幅的地址定制
    let req = TestRequest::get()
        .uri(&format!("/generator/image_banners/{}/customize/", fx.banner.id))
        .cookie(session_cookie(fx.user_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_customize_hidden_banner_is_not_found() {
    let (storage, _dir) = create_temp_storage().await;
    let fx = text_banner_fixture(&storage, false).await;
    let app = full_app!(storage);

    let req = TestRequest::get()
        .uri(&format!("/generator/text_banners/{}/customize/", fx.banner.id))
        .cookie(session_cookie(fx.user_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_create_link_redirects_to_referral() {
    let (storage, _dir) = create_temp_storage().await;
    let fx = text_banner_fixture(&storage, true).await;
    let app = full_app!(storage);

    let req = TestRequest::post()
        .uri(&format!("/generator/text_banners/{}/customize/", fx.banner.id))
        .cookie(session_cookie(fx.user_id))
        .set_form([("variation", fx.variation_id.to_string())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let links = storage.links_for_user(fx.user_id).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(location(&resp), format!("/link/{}/", links[0].id));
    assert!(links[0].html.contains(&format!("/link/{}/", links[0].id)));
    assert!(links[0].html.contains("Download Firefox"));
}

#[actix_rt::test]
async fn test_create_link_with_invalid_variation_rerenders() {
    let (storage, _dir) = create_temp_storage().await;
    let fx = text_banner_fixture(&storage, true).await;
    let other = storage
        .create_banner(
            BannerKind::Text,
            NewBanner {
                name: "Other".to_string(),
                category_id: fx.category_id,
                destination: "https://www.mozilla.org/".to_string(),
                visible: true,
            },
        )
        .await
        .unwrap();
    let foreign = storage
        .replace_variations(
            BannerKind::Text,
            other.id,
            vec![Variation {
                locale: "de".to_string(),
                text: Some("Firefox herunterladen".to_string()),
                ..Default::default()
            }],
        )
        .await
        .unwrap();
    let app = full_app!(storage);

    for bad in ["999".to_string(), foreign[0].id.to_string(), "abc".to_string()] {
        let req = TestRequest::post()
            .uri(&format!("/generator/text_banners/{}/customize/", fx.banner.id))
            .cookie(session_cookie(fx.user_id))
            .set_form([("variation", bad)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["data"]["errors"]["variation"].is_string());
    }

    assert!(storage.links_for_user(fx.user_id).await.unwrap().is_empty());
}

// =============================================================================
// Referral links
// =============================================================================

#[actix_rt::test]
async fn test_referral_link_counts_click_and_redirects() {
    let (storage, _dir) = create_temp_storage().await;
    let fx = text_banner_fixture(&storage, true).await;
    let link = storage
        .create_link(
            affiliates::storage::NewLink {
                user_id: fx.user_id,
                banner_id: fx.banner.id,
                banner_variation_id: fx.variation_id,
            },
            |_| String::new(),
        )
        .await
        .unwrap();
    let app = full_app!(storage);

    let req = TestRequest::get()
        .uri(&format!("/link/{}/", link.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "https://www.mozilla.org/firefox/");

    let today = Utc::now().date_naive();
    let yesterday = today.pred_opt().unwrap();
    let summary = storage
        .activity_between(fx.user_id, yesterday, today)
        .await
        .unwrap();
    assert_eq!(summary.clicks, 1);

    let resp = test::call_service(&app, TestRequest::get().uri("/link/999/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Legacy banners
// =============================================================================

struct LegacyFixture {
    user_id: i64,
    badge_id: i64,
    image_id: i64,
}

async fn legacy_fixture(storage: &SeaOrmStorage) -> LegacyFixture {
    let user = storage.create_user("legacy", "legacy@example.com").await.unwrap();
    let badge = storage
        .create_legacy_banner("Firefox badge", "http://mozilla.org/firefox")
        .await
        .unwrap();
    let image_id = storage
        .add_legacy_banner_image(badge.id, "Blue", "en-us", "uploads/banners/blue.png")
        .await
        .unwrap();
    storage
        .add_legacy_banner_image(badge.id, "Red", "en-us", "uploads/banners/red.png")
        .await
        .unwrap();
    LegacyFixture {
        user_id: user.id,
        badge_id: badge.id,
        image_id,
    }
}

#[actix_rt::test]
async fn test_legacy_customize_creates_instance() {
    let (storage, _dir) = create_temp_storage().await;
    let fx = legacy_fixture(&storage).await;
    let app = full_app!(storage);

    let uri = format!("/banners/{}/customize/", fx.badge_id);
    let req = TestRequest::post()
        .uri(&uri)
        .cookie(session_cookie(fx.user_id))
        .set_form([("image", fx.image_id.to_string())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), uri);

    let instance = storage
        .find_banner_instance(fx.user_id, fx.badge_id, fx.image_id)
        .await
        .unwrap();
    assert!(instance.is_some());

    let req = TestRequest::get()
        .uri(&uri)
        .cookie(session_cookie(fx.user_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["images"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["instances"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_legacy_customize_invalid_image() {
    let (storage, _dir) = create_temp_storage().await;
    let fx = legacy_fixture(&storage).await;
    let app = full_app!(storage);

    let req = TestRequest::post()
        .uri(&format!("/banners/{}/customize/", fx.badge_id))
        .cookie(session_cookie(fx.user_id))
        .set_form([("image", "999")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"]["errors"]["image"].is_string());

    assert!(
        storage
            .user_banner_instances(fx.user_id, fx.badge_id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[actix_rt::test]
async fn test_legacy_customize_requires_login() {
    let (storage, _dir) = create_temp_storage().await;
    let fx = legacy_fixture(&storage).await;
    let app = full_app!(storage);

    let req = TestRequest::post()
        .uri(&format!("/banners/{}/customize/", fx.badge_id))
        .set_form([("image", fx.image_id.to_string())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_banner_link_counts_and_redirects() {
    let (storage, _dir) = create_temp_storage().await;
    let fx = legacy_fixture(&storage).await;
    let (instance, created) = storage
        .get_or_create_banner_instance(fx.user_id, fx.badge_id, fx.image_id)
        .await
        .unwrap();
    assert!(created);
    let app = full_app!(storage);

    let req = TestRequest::get()
        .uri(&format!("/link/banner/{}/", instance.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "http://mozilla.org/firefox");

    let instance = storage.get_banner_instance(instance.id).await.unwrap().unwrap();
    assert_eq!(instance.clicks, 1);

    let resp =
        test::call_service(&app, TestRequest::get().uri("/link/banner/999/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "http://test.com");
}

#[actix_rt::test]
async fn test_old_link_never_creates_instances() {
    let (storage, _dir) = create_temp_storage().await;
    let fx = legacy_fixture(&storage).await;
    let (instance, _) = storage
        .get_or_create_banner_instance(fx.user_id, fx.badge_id, fx.image_id)
        .await
        .unwrap();
    let app = full_app!(storage);

    let req = TestRequest::get()
        .uri(&format!(
            "/link/{}/{}/{}/",
            fx.user_id, fx.badge_id, fx.image_id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "http://mozilla.org/firefox");
    let counted = storage.get_banner_instance(instance.id).await.unwrap().unwrap();
    assert_eq!(counted.clicks, 1);

    // 未知横幅
    let req = TestRequest::get()
        .uri(&format!("/link/{}/999/{}/", fx.user_id, fx.image_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "http://test.com");

    // 合法组合但实例不存在：跳默认地址且不新建
    let other_image = fx.image_id + 1;
    let req = TestRequest::get()
        .uri(&format!(
            "/link/{}/{}/{}/",
            fx.user_id, fx.badge_id, other_image
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "http://test.com");
    assert!(
        storage
            .find_banner_instance(fx.user_id, fx.badge_id, other_image)
            .await
            .unwrap()
            .is_none()
    );
}

#[actix_rt::test]
async fn test_legacy_links_with_oversized_ids_use_default_link() {
    let (storage, _dir) = create_temp_storage().await;
    let oversized = "99999999999999999999";
    let uris = [
        format!("/link/banner/{}/", oversized),
        format!("/link/{}/1/1/", oversized),
        format!("/link/1/1/{}/", oversized),
    ];

    // 经 ReferralSkip 直接处理
    let app = full_app!(storage);
    for uri in &uris {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{}", uri);
        assert_eq!(location(&resp), "http://test.com", "{}", uri);
    }

    // 只挂路由时走普通 handler
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .configure(referral_routes),
    )
    .await;
    for uri in &uris {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{}", uri);
        assert_eq!(location(&resp), "http://test.com", "{}", uri);
    }

    // 推广链接不在此列
    let req = TestRequest::get()
        .uri(&format!("/link/{}/", oversized))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

// =============================================================================
// Leaderboard page
// =============================================================================

#[actix_rt::test]
async fn test_leaderboard_page_lists_standings() {
    let (storage, _dir) = create_temp_storage().await;
    let app = full_app!(storage);

    let req = TestRequest::get().uri("/leaderboard/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["metric"], "link_clicks");
    assert!(body["data"]["standings"].as_array().unwrap().is_empty());
    assert!(body["data"]["messages"].as_array().unwrap().is_empty());
}
