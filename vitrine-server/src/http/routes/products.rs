//! Public product endpoints: listing, detail, search-as-you-type

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repos::{Product, ProductHit, ProductRepo, ReviewRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{Paginated, Pagination, PaginationParams, Slug};

/// Product response
#[derive(Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
    pub featured: bool,
    pub created_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            slug: p.slug,
            name: p.name,
            description: p.description,
            price_cents: p.price_cents,
            category_id: p.category_id,
            featured: p.featured,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Product detail with review aggregate
#[derive(Serialize)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub review_count: i64,
    pub average_rating: Option<f64>,
}

/// Search hit response
#[derive(Serialize)]
pub struct SearchHitResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price_cents: i64,
}

impl From<ProductHit> for SearchHitResponse {
    fn from(h: ProductHit) -> Self {
        Self {
            id: h.id,
            slug: h.slug,
            name: h.name,
            price_cents: h.price_cents,
        }
    }
}

/// Listing filter query params
#[derive(Deserialize, Default)]
pub struct ProductFilterParams {
    pub category: Option<String>,
    pub featured: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Search query params
#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /products - published products, optionally filtered
async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductFilterParams>,
) -> Result<Json<Paginated<ProductResponse>>, ApiError> {
    let page = Pagination::from(params.pagination);

    // Validate the category filter up front so junk slugs 400 instead of
    // silently matching nothing
    let category = match &params.category {
        Some(raw) => Some(Slug::new(raw)?),
        None => None,
    };

    let result = ProductRepo::new(&state.pool)
        .list_published(category.as_ref().map(Slug::as_str), params.featured, page)
        .await?;

    Ok(Json(result.map(ProductResponse::from)))
}

/// GET /products/search?q= - search-as-you-type
async fn search_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHitResponse>>, ApiError> {
    let query = params.q.trim();
    if query.is_empty() {
        return Ok(Json(vec![]));
    }

    let hits = ProductRepo::new(&state.pool).search(query).await?;
    Ok(Json(hits.into_iter().map(SearchHitResponse::from).collect()))
}

/// GET /products/{product} - product detail by slug with review aggregate
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetailResponse>, ApiError> {
    let slug = Slug::new(&slug)?;
    let product = ProductRepo::new(&state.pool)
        .get_published_by_slug(slug.as_str())
        .await?;

    let summary = ReviewRepo::new(&state.pool).summary(product.id).await?;

    Ok(Json(ProductDetailResponse {
        product: ProductResponse::from(product),
        review_count: summary.review_count,
        average_rating: summary.average_rating,
    }))
}

/// Product routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/search", get(search_products))
        // Same param name as the nested review routes; the router requires
        // overlapping segments to agree
        .route("/products/{product}", get(get_product))
}
