//! Back-office endpoints
//!
//! Everything under /admin requires the stored admin role via the
//! `AdminUser` extractor. Catalog CRUD, display reordering, review
//! moderation, order overview, content pages, newsletter export.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repos::{
    Bundle, BundleRepo, Category, CategoryRepo, NewsletterRepo, Order, OrderRepo, PageRepo,
    Product, ProductInput, ProductRepo, ReviewRepo, Service, ServiceRepo, Subscriber,
};
use crate::http::error::ApiError;
use crate::http::extractors::AdminUser;
use crate::http::server::AppState;
use crate::models::{
    ModerationStatus, Paginated, Pagination, PaginationParams, Slug, ValidationError,
};

use super::pages::PageResponse;
use super::reviews::ReviewResponse;

fn validate_price(cents: i64) -> Result<i64, ValidationError> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price_cents",
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(cents)
}

// ---------------------------------------------------------------------------
// Products

/// Full product view for the back-office (unpublished fields included)
#[derive(Serialize)]
pub struct AdminProductResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
    pub download_url: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub display_order: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for AdminProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            slug: p.slug,
            name: p.name,
            description: p.description,
            price_cents: p.price_cents,
            category_id: p.category_id,
            download_url: p.download_url,
            featured: p.featured,
            published: p.published,
            display_order: p.display_order,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
    pub download_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub published: bool,
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
    pub download_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub published: bool,
}

/// Ordered id list for display reordering
#[derive(Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<Uuid>,
}

/// GET /admin/products
async fn list_products(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<AdminProductResponse>>, ApiError> {
    let page = Pagination::from(params);
    let result = ProductRepo::new(&state.pool).list_all(page).await?;
    Ok(Json(result.map(AdminProductResponse::from)))
}

/// POST /admin/products
async fn create_product(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<AdminProductResponse>), ApiError> {
    let slug = Slug::new(&req.slug)?;
    let price_cents = validate_price(req.price_cents)?;
    if req.name.trim().is_empty() {
        return Err(ValidationError::Empty { field: "name" }.into());
    }

    let product = ProductRepo::new(&state.pool)
        .create(
            slug,
            ProductInput {
                name: req.name.trim(),
                description: &req.description,
                price_cents,
                category_id: req.category_id,
                download_url: req.download_url.as_deref(),
                featured: req.featured,
                published: req.published,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AdminProductResponse::from(product))))
}

/// PUT /admin/products/{id}
async fn update_product(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<AdminProductResponse>, ApiError> {
    let price_cents = validate_price(req.price_cents)?;
    if req.name.trim().is_empty() {
        return Err(ValidationError::Empty { field: "name" }.into());
    }

    let product = ProductRepo::new(&state.pool)
        .update(
            id,
            ProductInput {
                name: req.name.trim(),
                description: &req.description,
                price_cents,
                category_id: req.category_id,
                download_url: req.download_url.as_deref(),
                featured: req.featured,
                published: req.published,
            },
        )
        .await?;

    Ok(Json(AdminProductResponse::from(product)))
}

/// DELETE /admin/products/{id}
async fn delete_product(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ProductRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /admin/products/reorder
async fn reorder_products(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReorderRequest>,
) -> Result<StatusCode, ApiError> {
    if req.ids.is_empty() {
        return Err(ValidationError::Empty { field: "ids" }.into());
    }
    ProductRepo::new(&state.pool).reorder(&req.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Categories

#[derive(Serialize)]
pub struct AdminCategoryResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
}

impl From<Category> for AdminCategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            slug: c.slug,
            name: c.name,
            description: c.description,
            display_order: c.display_order,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

/// POST /admin/categories
async fn create_category(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<AdminCategoryResponse>), ApiError> {
    let slug = Slug::new(&req.slug)?;
    if req.name.trim().is_empty() {
        return Err(ValidationError::Empty { field: "name" }.into());
    }

    let category = CategoryRepo::new(&state.pool)
        .create(slug, req.name.trim(), req.description.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AdminCategoryResponse::from(category)),
    ))
}

/// PUT /admin/categories/{id}
async fn update_category(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<AdminCategoryResponse>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ValidationError::Empty { field: "name" }.into());
    }

    let category = CategoryRepo::new(&state.pool)
        .update(id, req.name.trim(), req.description.as_deref())
        .await?;

    Ok(Json(AdminCategoryResponse::from(category)))
}

/// DELETE /admin/categories/{id}
async fn delete_category(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    CategoryRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /admin/categories/reorder
async fn reorder_categories(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReorderRequest>,
) -> Result<StatusCode, ApiError> {
    if req.ids.is_empty() {
        return Err(ValidationError::Empty { field: "ids" }.into());
    }
    CategoryRepo::new(&state.pool).reorder(&req.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Bundles

#[derive(Serialize)]
pub struct AdminBundleResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub published: bool,
    pub display_order: i32,
}

impl From<Bundle> for AdminBundleResponse {
    fn from(b: Bundle) -> Self {
        Self {
            id: b.id,
            slug: b.slug,
            name: b.name,
            description: b.description,
            price_cents: b.price_cents,
            published: b.published,
            display_order: b.display_order,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateBundleRequest {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateBundleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

/// GET /admin/bundles
async fn list_bundles(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AdminBundleResponse>>, ApiError> {
    let bundles = BundleRepo::new(&state.pool).list_all().await?;
    Ok(Json(
        bundles.into_iter().map(AdminBundleResponse::from).collect(),
    ))
}

/// POST /admin/bundles
async fn create_bundle(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBundleRequest>,
) -> Result<(StatusCode, Json<AdminBundleResponse>), ApiError> {
    let slug = Slug::new(&req.slug)?;
    let price_cents = validate_price(req.price_cents)?;
    if req.name.trim().is_empty() {
        return Err(ValidationError::Empty { field: "name" }.into());
    }

    let bundle = BundleRepo::new(&state.pool)
        .create(
            slug,
            req.name.trim(),
            &req.description,
            price_cents,
            req.published,
            &req.product_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AdminBundleResponse::from(bundle))))
}

/// PUT /admin/bundles/{id}
async fn update_bundle(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBundleRequest>,
) -> Result<Json<AdminBundleResponse>, ApiError> {
    let price_cents = validate_price(req.price_cents)?;
    if req.name.trim().is_empty() {
        return Err(ValidationError::Empty { field: "name" }.into());
    }

    let bundle = BundleRepo::new(&state.pool)
        .update(
            id,
            req.name.trim(),
            &req.description,
            price_cents,
            req.published,
            &req.product_ids,
        )
        .await?;

    Ok(Json(AdminBundleResponse::from(bundle)))
}

/// DELETE /admin/bundles/{id}
async fn delete_bundle(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    BundleRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Services

#[derive(Serialize)]
pub struct AdminServiceResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub published: bool,
    pub display_order: i32,
}

impl From<Service> for AdminServiceResponse {
    fn from(s: Service) -> Self {
        Self {
            id: s.id,
            slug: s.slug,
            name: s.name,
            description: s.description,
            price_cents: s.price_cents,
            published: s.published,
            display_order: s.display_order,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub published: bool,
}

#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub published: bool,
}

/// GET /admin/services
async fn list_services(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AdminServiceResponse>>, ApiError> {
    let services = ServiceRepo::new(&state.pool).list_all().await?;
    Ok(Json(
        services
            .into_iter()
            .map(AdminServiceResponse::from)
            .collect(),
    ))
}

/// POST /admin/services
async fn create_service(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<AdminServiceResponse>), ApiError> {
    let slug = Slug::new(&req.slug)?;
    let price_cents = validate_price(req.price_cents)?;
    if req.name.trim().is_empty() {
        return Err(ValidationError::Empty { field: "name" }.into());
    }

    let service = ServiceRepo::new(&state.pool)
        .create(
            slug,
            req.name.trim(),
            &req.description,
            price_cents,
            req.published,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AdminServiceResponse::from(service)),
    ))
}

/// PUT /admin/services/{id}
async fn update_service(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateServiceRequest>,
) -> Result<Json<AdminServiceResponse>, ApiError> {
    let price_cents = validate_price(req.price_cents)?;
    if req.name.trim().is_empty() {
        return Err(ValidationError::Empty { field: "name" }.into());
    }

    let service = ServiceRepo::new(&state.pool)
        .update(
            id,
            req.name.trim(),
            &req.description,
            price_cents,
            req.published,
        )
        .await?;

    Ok(Json(AdminServiceResponse::from(service)))
}

/// DELETE /admin/services/{id}
async fn delete_service(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ServiceRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Review moderation

#[derive(Deserialize, Default)]
pub struct ReviewFilterParams {
    pub status: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Deserialize)]
pub struct ModerateRequest {
    pub status: String,
}

/// GET /admin/reviews?status= - moderation queue (default: pending)
async fn list_reviews(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReviewFilterParams>,
) -> Result<Json<Paginated<ReviewResponse>>, ApiError> {
    let status = ModerationStatus::parse(params.status.as_deref().unwrap_or("pending"))?;
    let page = Pagination::from(params.pagination);

    let result = ReviewRepo::new(&state.pool)
        .list_by_status(status, page)
        .await?;

    Ok(Json(result.map(ReviewResponse::from)))
}

/// POST /admin/reviews/{id}/moderate - accept or reject
async fn moderate_review(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ModerateRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let status = ModerationStatus::parse(&req.status)?;
    if status == ModerationStatus::Pending {
        return Err(ValidationError::InvalidVariant {
            field: "status",
            value: req.status,
        }
        .into());
    }

    let review = ReviewRepo::new(&state.pool).set_status(id, status).await?;
    Ok(Json(ReviewResponse::from(review)))
}

// ---------------------------------------------------------------------------
// Orders overview

#[derive(Serialize)]
pub struct AdminOrderResponse {
    pub id: Uuid,
    pub email: String,
    pub payment_status: String,
    pub total_cents: i64,
    pub fulfilled: bool,
    pub created_at: String,
}

impl From<Order> for AdminOrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            email: o.email,
            payment_status: o.payment_status,
            total_cents: o.total_cents,
            fulfilled: o.download_token.is_some(),
            created_at: o.created_at.to_rfc3339(),
        }
    }
}

#[derive(Deserialize, Default)]
pub struct OrderFilterParams {
    pub status: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// GET /admin/orders?status=
async fn list_orders(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<OrderFilterParams>,
) -> Result<Json<Paginated<AdminOrderResponse>>, ApiError> {
    // Validate the filter so typos 400 instead of matching nothing
    let status = params
        .status
        .as_deref()
        .map(crate::models::PaymentStatus::parse)
        .transpose()?;
    let page = Pagination::from(params.pagination);

    let result = OrderRepo::new(&state.pool)
        .list(status.map(|s| s.as_str()), page)
        .await?;

    Ok(Json(result.map(AdminOrderResponse::from)))
}

// ---------------------------------------------------------------------------
// Content pages

#[derive(Deserialize)]
pub struct UpsertPageRequest {
    pub title: String,
    pub body: String,
}

/// GET /admin/pages
async fn list_pages(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PageResponse>>, ApiError> {
    let pages = PageRepo::new(&state.pool).list().await?;
    Ok(Json(pages.into_iter().map(PageResponse::from).collect()))
}

/// PUT /admin/pages/{slug}
async fn upsert_page(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(req): Json<UpsertPageRequest>,
) -> Result<Json<PageResponse>, ApiError> {
    let slug = Slug::new(&slug)?;
    if req.title.trim().is_empty() {
        return Err(ValidationError::Empty { field: "title" }.into());
    }

    let page = PageRepo::new(&state.pool)
        .upsert(slug, req.title.trim(), &req.body)
        .await?;

    Ok(Json(PageResponse::from(page)))
}

// ---------------------------------------------------------------------------
// Newsletter export

#[derive(Serialize)]
pub struct SubscriberResponse {
    pub email: String,
    pub created_at: String,
}

impl From<Subscriber> for SubscriberResponse {
    fn from(s: Subscriber) -> Self {
        Self {
            email: s.email,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

/// GET /admin/newsletter - active subscribers
async fn list_subscribers(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<SubscriberResponse>>, ApiError> {
    let page = Pagination::from(params);
    let result = NewsletterRepo::new(&state.pool).list_active(page).await?;
    Ok(Json(result.map(SubscriberResponse::from)))
}

/// Back-office routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/products", get(list_products).post(create_product))
        .route("/admin/products/reorder", put(reorder_products))
        .route(
            "/admin/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/admin/categories", post(create_category))
        .route("/admin/categories/reorder", put(reorder_categories))
        .route(
            "/admin/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/admin/bundles", get(list_bundles).post(create_bundle))
        .route(
            "/admin/bundles/{id}",
            put(update_bundle).delete(delete_bundle),
        )
        .route("/admin/services", get(list_services).post(create_service))
        .route(
            "/admin/services/{id}",
            put(update_service).delete(delete_service),
        )
        .route("/admin/reviews", get(list_reviews))
        .route("/admin/reviews/{id}/moderate", post(moderate_review))
        .route("/admin/orders", get(list_orders))
        .route("/admin/pages", get(list_pages))
        .route("/admin/pages/{slug}", put(upsert_page))
        .route("/admin/newsletter", get(list_subscribers))
}
