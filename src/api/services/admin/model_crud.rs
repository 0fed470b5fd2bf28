//! Generic model admin endpoints
//!
//! `/{model}` and `/{model}/{id}` dispatch on the registry entry for the
//! model slug: categories or one of the three banner kinds.

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{info, trace};

use crate::errors::{AffiliatesError, Result};
use crate::storage::{BannerKind, CategoryInput, SeaOrmStorage};

use super::error_code::ErrorCode;
use super::helpers::{api_result, created_response, error_from_affiliates, error_response};
use super::registry::{AdminModel, ModelAdmin, find_model_admin};
use super::types::{
    AdminDetail, AdminList, BannerCreateRequest, BannerUpdateRequest, DeleteResponse, ListQuery,
};

fn unknown_model(slug: &str) -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::NotFound,
        &format!("Unknown admin model: {}", slug),
    )
}

async fn category_names(storage: &SeaOrmStorage) -> Result<HashMap<i64, String>> {
    Ok(storage
        .list_categories()
        .await?
        .into_iter()
        .map(|node| (node.id, node.name))
        .collect())
}

async fn list_rows(
    admin: &'static ModelAdmin,
    storage: &SeaOrmStorage,
    query: &ListQuery,
) -> Result<AdminList> {
    let rows = match admin.model {
        AdminModel::Category => storage
            .list_categories()
            .await?
            .iter()
            .map(|node| admin.category_row(node))
            .collect(),
        AdminModel::Banner(kind) => {
            let banners = storage
                .list_banners(kind, query.q.as_deref(), admin.search_fields)
                .await?;
            let ids: Vec<i64> = banners.iter().map(|b| b.id).collect();
            let clicks = storage.banner_link_clicks(&ids).await?;
            let names = category_names(storage).await?;
            banners
                .iter()
                .map(|banner| {
                    admin.banner_row(
                        banner,
                        names.get(&banner.category_id).map(String::as_str).unwrap_or(""),
                        clicks.get(&banner.id).copied().unwrap_or(0),
                    )
                })
                .collect()
        }
    };
    Ok(AdminList {
        model: admin.slug,
        columns: admin.list_display,
        rows,
    })
}

async fn banner_detail(
    admin: &'static ModelAdmin,
    storage: &SeaOrmStorage,
    kind: BannerKind,
    id: i64,
) -> Result<AdminDetail> {
    let banner = storage
        .get_banner(kind, id)
        .await?
        .ok_or_else(|| AffiliatesError::not_found(format!("{} banner {}", kind, id)))?;
    let category_name = storage
        .get_category(banner.category_id)
        .await?
        .map(|c| c.name)
        .unwrap_or_default();
    let link_clicks = storage
        .banner_link_clicks(&[banner.id])
        .await?
        .get(&banner.id)
        .copied()
        .unwrap_or(0);
    let variations = storage.list_variations(kind, banner.id).await?;
    Ok(admin.banner_detail(&banner, &category_name, link_clicks, &variations))
}

async fn detail(admin: &'static ModelAdmin, storage: &SeaOrmStorage, id: i64) -> Result<AdminDetail> {
    match admin.model {
        AdminModel::Category => {
            let category = storage
                .get_category(id)
                .await?
                .ok_or_else(|| AffiliatesError::not_found(format!("Category {}", id)))?;
            Ok(admin.category_detail(&category))
        }
        AdminModel::Banner(kind) => banner_detail(admin, storage, kind, id).await,
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| AffiliatesError::validation(format!("Invalid request body: {}", e)))
}

async fn create(
    admin: &'static ModelAdmin,
    storage: &SeaOrmStorage,
    body: &[u8],
) -> Result<AdminDetail> {
    match admin.model {
        AdminModel::Category => {
            let input: CategoryInput = parse_body(body)?;
            let category = storage.create_category(input).await?;
            info!("Admin created category {}", category.id);
            Ok(admin.category_detail(&category))
        }
        AdminModel::Banner(kind) => {
            let request: BannerCreateRequest = parse_body(body)?;
            for variation in &request.variations {
                variation.validate_for(kind)?;
            }
            let banner = storage.create_banner(kind, request.banner).await?;
            if !request.variations.is_empty() {
                storage
                    .replace_variations(kind, banner.id, request.variations)
                    .await?;
            }
            banner_detail(admin, storage, kind, banner.id).await
        }
    }
}

async fn update(
    admin: &'static ModelAdmin,
    storage: &SeaOrmStorage,
    id: i64,
    body: &[u8],
) -> Result<AdminDetail> {
    match admin.model {
        AdminModel::Category => {
            let input: CategoryInput = parse_body(body)?;
            let category = storage.update_category(id, input).await?;
            info!("Admin updated category {}", id);
            Ok(admin.category_detail(&category))
        }
        AdminModel::Banner(kind) => {
            let request: BannerUpdateRequest = parse_body(body)?;
            if let Some(variations) = &request.variations {
                for variation in variations {
                    variation.validate_for(kind)?;
                }
            }
            storage.update_banner(kind, id, request.banner).await?;
            if let Some(variations) = request.variations {
                storage.replace_variations(kind, id, variations).await?;
            }
            info!("Admin updated {} banner {}", kind, id);
            banner_detail(admin, storage, kind, id).await
        }
    }
}

async fn delete(admin: &'static ModelAdmin, storage: &SeaOrmStorage, id: i64) -> Result<()> {
    match admin.model {
        AdminModel::Category => storage.delete_category(id).await?,
        AdminModel::Banner(kind) => storage.delete_banner(kind, id).await?,
    }
    info!("Admin deleted {} {}", admin.slug, id);
    Ok(())
}

pub async fn list_models(
    path: web::Path<String>,
    query: web::Query<ListQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> impl Responder {
    let slug = path.into_inner();
    let Some(admin) = find_model_admin(&slug) else {
        return unknown_model(&slug);
    };
    trace!("Admin API: list {} (q={:?})", slug, query.q);
    api_result(list_rows(admin, &storage, &query).await)
}

pub async fn get_model(
    path: web::Path<(String, i64)>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> impl Responder {
    let (slug, id) = path.into_inner();
    let Some(admin) = find_model_admin(&slug) else {
        return unknown_model(&slug);
    };
    api_result(detail(admin, &storage, id).await)
}

pub async fn create_model(
    path: web::Path<String>,
    body: web::Bytes,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> impl Responder {
    let slug = path.into_inner();
    let Some(admin) = find_model_admin(&slug) else {
        return unknown_model(&slug);
    };
    match create(admin, &storage, &body).await {
        Ok(detail) => created_response(detail),
        Err(e) => error_from_affiliates(&e),
    }
}

pub async fn update_model(
    path: web::Path<(String, i64)>,
    body: web::Bytes,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> impl Responder {
    let (slug, id) = path.into_inner();
    let Some(admin) = find_model_admin(&slug) else {
        return unknown_model(&slug);
    };
    api_result(update(admin, &storage, id, &body).await)
}

pub async fn delete_model(
    path: web::Path<(String, i64)>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> impl Responder {
    let (slug, id) = path.into_inner();
    let Some(admin) = find_model_admin(&slug) else {
        return unknown_model(&slug);
    };
    api_result(
        delete(admin, &storage, id)
            .await
            .map(|()| DeleteResponse {
                model: admin.slug,
                id,
            }),
    )
}
