//! Public bundle endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::db::repos::{Bundle, BundleProduct, BundleRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::Slug;

/// Bundle listing response
#[derive(Serialize)]
pub struct BundleResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub product_count: i64,
}

/// Product line inside a bundle detail
#[derive(Serialize)]
pub struct BundleProductResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price_cents: i64,
}

impl From<BundleProduct> for BundleProductResponse {
    fn from(p: BundleProduct) -> Self {
        Self {
            id: p.id,
            slug: p.slug,
            name: p.name,
            price_cents: p.price_cents,
        }
    }
}

/// Bundle detail response
#[derive(Serialize)]
pub struct BundleDetailResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub products: Vec<BundleProductResponse>,
}

fn to_listing(bundle: Bundle, product_count: i64) -> BundleResponse {
    BundleResponse {
        id: bundle.id,
        slug: bundle.slug,
        name: bundle.name,
        description: bundle.description,
        price_cents: bundle.price_cents,
        product_count,
    }
}

/// GET /bundles - published bundles
async fn list_bundles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BundleResponse>>, ApiError> {
    let bundles = BundleRepo::new(&state.pool).list_published().await?;
    Ok(Json(
        bundles
            .into_iter()
            .map(|(bundle, count)| to_listing(bundle, count))
            .collect(),
    ))
}

/// GET /bundles/{slug} - bundle detail with member products
async fn get_bundle(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<BundleDetailResponse>, ApiError> {
    let slug = Slug::new(&slug)?;
    let detail = BundleRepo::new(&state.pool)
        .get_published_by_slug(slug.as_str())
        .await?;

    Ok(Json(BundleDetailResponse {
        id: detail.bundle.id,
        slug: detail.bundle.slug,
        name: detail.bundle.name,
        description: detail.bundle.description,
        price_cents: detail.bundle.price_cents,
        products: detail
            .products
            .into_iter()
            .map(BundleProductResponse::from)
            .collect(),
    }))
}

/// Bundle routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bundles", get(list_bundles))
        .route("/bundles/{slug}", get(get_bundle))
}
