//! Admin API integration tests
//!
//! Model CRUD, data point editing and session issuing behind `AdminAuth`.

use std::sync::{Arc, Once};

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tempfile::TempDir;

use affiliates::api::jwt::get_jwt_service;
use affiliates::api::middleware::AdminAuth;
use affiliates::api::services::admin::routes::admin_v1_routes;
use affiliates::config::update_config;
use affiliates::storage::{BannerKind, CategoryInput, NewLink, SeaOrmStorage};

// =============================================================================
// Test Setup
// =============================================================================

const ADMIN_TOKEN: &str = "admin-api-test-token";

static INIT: Once = Once::new();

fn init_test_config() {
    INIT.call_once(|| {
        update_config(|c| {
            c.api.admin_token = ADMIN_TOKEN.to_string();
            c.api.jwt_secret = "admin-api-test-secret-0123456789abcdef".to_string();
        });
    });
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_test_config();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("admin_api_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");
    (Arc::new(storage), temp_dir)
}

macro_rules! admin_app {
    ($storage:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($storage.clone()))
                .service(web::scope("/admin").wrap(AdminAuth).service(admin_v1_routes())),
        )
        .await
    };
}

fn authed(req: TestRequest) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {}", ADMIN_TOKEN)))
}

async fn seed_category(storage: &SeaOrmStorage, name: &str) -> i64 {
    storage
        .create_category(CategoryInput {
            name: name.to_string(),
            parent_id: None,
        })
        .await
        .unwrap()
        .id
}

// =============================================================================
// Authentication
// =============================================================================

#[actix_rt::test]
async fn test_requires_bearer_token() {
    let (storage, _dir) = create_temp_storage().await;
    let app = admin_app!(storage);

    let req = TestRequest::get().uri("/admin/v1/categories").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::get()
        .uri("/admin/v1/categories")
        .insert_header(("Authorization", "Bearer wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Model CRUD
// =============================================================================

#[actix_rt::test]
async fn test_unknown_model_is_not_found() {
    let (storage, _dir) = create_temp_storage().await;
    let app = admin_app!(storage);

    let req = authed(TestRequest::get().uri("/admin/v1/widgets")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_category_crud() {
    let (storage, _dir) = create_temp_storage().await;
    let app = admin_app!(storage);

    let req = authed(TestRequest::post().uri("/admin/v1/categories"))
        .set_json(json!({ "name": "Firefox" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let root = body["data"]["fields"]["id"].as_i64().unwrap();

    let req = authed(TestRequest::post().uri("/admin/v1/categories"))
        .set_json(json!({ "name": "Mobile", "parent_id": root }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let child = body["data"]["fields"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["fields"]["parent"], json!(root));

    let req = authed(TestRequest::get().uri("/admin/v1/categories")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let rows = body["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["depth"], json!(1));
    assert_eq!(rows[1]["link_clicks"], json!(0));

    // 不能把分类移到自己的子分类下
    let req = authed(TestRequest::put().uri(&format!("/admin/v1/categories/{}", root)))
        .set_json(json!({ "name": "Firefox", "parent_id": child }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = authed(TestRequest::delete().uri(&format!("/admin/v1/categories/{}", root)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(storage.get_category(child).await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_banner_crud_with_variations() {
    let (storage, _dir) = create_temp_storage().await;
    let category_id = seed_category(&storage, "Firefox").await;
    let app = admin_app!(storage);

    let req = authed(TestRequest::post().uri("/admin/v1/image_banners"))
        .set_json(json!({
            "name": "Blue banner",
            "category_id": category_id,
            "destination": "https://www.mozilla.org/firefox/",
            "visible": true,
            "created": "2001-01-01T00:00:00Z",
            "variations": [
                { "color": "Blue", "locale": "en-us", "image": "uploads/blue.png" },
                { "color": "Blue", "locale": "de", "image": "uploads/blue-de.png" }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let banner_id = body["data"]["fields"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["fields"]["category"]["name"], "Firefox");
    assert_ne!(body["data"]["fields"]["created"], "2001-01-01T00:00:00Z");
    let inline = &body["data"]["inline"];
    assert_eq!(inline["model"], "image_banner_variations");
    assert_eq!(inline["extra"], 0);
    assert_eq!(inline["rows"].as_array().unwrap().len(), 2);
    let kept_id = inline["rows"][0]["id"].as_i64().unwrap();

    // 同一 id 在其他类型下不存在
    let req = authed(TestRequest::get().uri(&format!("/admin/v1/text_banners/{}", banner_id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = authed(TestRequest::put().uri(&format!("/admin/v1/image_banners/{}", banner_id)))
        .set_json(json!({
            "visible": false,
            "variations": [
                { "id": kept_id, "color": "Red", "locale": "en-us", "image": "uploads/red.png" }
            ]
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["fields"]["visible"], json!(false));
    assert_eq!(body["data"]["fields"]["name"], "Blue banner");
    let rows = body["data"]["inline"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(kept_id));
    assert_eq!(rows[0]["color"], "Red");

    let req = authed(TestRequest::delete().uri(&format!("/admin/v1/image_banners/{}", banner_id)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["id"], json!(banner_id));
    assert!(
        storage
            .get_banner(BannerKind::Image, banner_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[actix_rt::test]
async fn test_banner_create_rejects_incomplete_variation() {
    let (storage, _dir) = create_temp_storage().await;
    let category_id = seed_category(&storage, "Firefox").await;
    let app = admin_app!(storage);

    let req = authed(TestRequest::post().uri("/admin/v1/firefox_upgrade_banners"))
        .set_json(json!({
            "name": "Upgrade",
            "category_id": category_id,
            "destination": "https://www.mozilla.org/firefox/new/",
            "variations": [
                { "color": "Blue", "locale": "en-us", "image": "uploads/a.png" }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(
        storage
            .list_banners(BannerKind::FirefoxUpgrade, None, &[])
            .await
            .unwrap()
            .is_empty()
    );

    let req = authed(TestRequest::post().uri("/admin/v1/text_banners"))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_banner_search() {
    let (storage, _dir) = create_temp_storage().await;
    let firefox = seed_category(&storage, "Firefox").await;
    let thunderbird = seed_category(&storage, "Thunderbird").await;
    for (name, category_id, destination) in [
        ("Fast", firefox, "https://www.mozilla.org/firefox/"),
        ("Private", firefox, "https://www.mozilla.org/privacy/"),
        ("Mail", thunderbird, "https://www.thunderbird.net/"),
    ] {
        storage
            .create_banner(
                BannerKind::Text,
                affiliates::storage::NewBanner {
                    name: name.to_string(),
                    category_id,
                    destination: destination.to_string(),
                    visible: true,
                },
            )
            .await
            .unwrap();
    }
    let app = admin_app!(storage);

    let names = |body: &Value| -> Vec<String> {
        body["data"]["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["name"].as_str().unwrap().to_string())
            .collect()
    };

    let req = authed(TestRequest::get().uri("/admin/v1/text_banners")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&body), vec!["Fast", "Private", "Mail"]);
    assert_eq!(
        body["data"]["columns"],
        json!(["name", "category", "visible", "destination", "link_clicks"])
    );

    // 按横幅名
    let req = authed(TestRequest::get().uri("/admin/v1/text_banners?q=Priv")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&body), vec!["Private"]);

    // 按分类名
    let req = authed(TestRequest::get().uri("/admin/v1/text_banners?q=Thunder")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&body), vec!["Mail"]);

    // 按目标地址
    let req = authed(TestRequest::get().uri("/admin/v1/text_banners?q=privacy")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&body), vec!["Private"]);
}

// =============================================================================
// Operations
// =============================================================================

#[actix_rt::test]
async fn test_put_datapoint() {
    let (storage, _dir) = create_temp_storage().await;
    let user = storage.create_user("dp", "dp@example.com").await.unwrap();
    let category_id = seed_category(&storage, "Firefox").await;
    let banner = storage
        .create_banner(
            BannerKind::Text,
            affiliates::storage::NewBanner {
                name: "Text".to_string(),
                category_id,
                destination: "https://www.mozilla.org/".to_string(),
                visible: true,
            },
        )
        .await
        .unwrap();
    let variation = storage
        .replace_variations(
            BannerKind::Text,
            banner.id,
            vec![affiliates::storage::Variation {
                locale: "en-us".to_string(),
                text: Some("Get Firefox".to_string()),
                ..Default::default()
            }],
        )
        .await
        .unwrap()[0]
        .id;
    let link = storage
        .create_link(
            NewLink {
                user_id: user.id,
                banner_id: banner.id,
                banner_variation_id: variation,
            },
            |_| String::new(),
        )
        .await
        .unwrap();
    let app = admin_app!(storage);

    let req = authed(
        TestRequest::put().uri(&format!("/admin/v1/links/{}/datapoints/2024-02-10", link.id)),
    )
    .set_json(json!({ "link_clicks": 4, "firefox_downloads": 7 }))
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["date"], "2024-02-10");
    assert_eq!(body["data"]["link_clicks"], json!(4));

    let after = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
    let until = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
    let summary = storage.activity_between(user.id, after, until).await.unwrap();
    assert_eq!((summary.clicks, summary.downloads), (4, 7));

    let req = authed(
        TestRequest::put().uri(&format!("/admin/v1/links/{}/datapoints/10-02-2024", link.id)),
    )
    .set_json(json!({ "link_clicks": 1 }))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = authed(TestRequest::put().uri("/admin/v1/links/999/datapoints/2024-02-10"))
        .set_json(json!({ "link_clicks": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_issue_session() {
    let (storage, _dir) = create_temp_storage().await;
    let user = storage.create_user("session", "s@example.com").await.unwrap();
    let app = admin_app!(storage);

    let req = authed(TestRequest::post().uri(&format!("/admin/v1/users/{}/session", user.id)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["user_id"], json!(user.id));
    let token = body["data"]["token"].as_str().unwrap();
    let claims = get_jwt_service().validate_session_token(token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());

    let req = authed(TestRequest::post().uri("/admin/v1/users/999/session")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
