//! Review endpoints: public listing, submission, helpfulness

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repos::{Review, ReviewRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{
    Paginated, Pagination, PaginationParams, Rating, ReviewComment, ReviewerName, ValidationError,
};

/// Review submission request. Every field is required; absence fails
/// validation before anything is written.
#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub rating: Option<i16>,
    pub comment: Option<String>,
    pub name: Option<String>,
}

/// Review response
#[derive(Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub name: String,
    pub status: String,
    pub helpful_count: i64,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            product_id: r.product_id,
            rating: r.rating,
            comment: r.comment,
            name: r.reviewer_name,
            status: r.status,
            helpful_count: r.helpful_count,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Helpful-count response
#[derive(Serialize)]
pub struct HelpfulResponse {
    pub id: Uuid,
    pub helpful_count: i64,
}

/// GET /products/{product}/reviews - accepted reviews only
async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<ReviewResponse>>, ApiError> {
    let page = Pagination::from(params);
    let result = ReviewRepo::new(&state.pool)
        .list_accepted(product_id, page)
        .await?;

    Ok(Json(result.map(ReviewResponse::from)))
}

/// POST /products/{product}/reviews - submit a review (enters moderation)
async fn create_review(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let rating = Rating::new(req.rating.ok_or(ValidationError::Empty { field: "rating" })?)?;
    let comment = ReviewComment::new(req.comment.as_deref().unwrap_or_default())?;
    let name = ReviewerName::new(req.name.as_deref().unwrap_or_default())?;

    let review = ReviewRepo::new(&state.pool)
        .create(product_id, rating, comment, name)
        .await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

/// POST /reviews/{id}/helpful - increment the helpful counter
async fn mark_helpful(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<HelpfulResponse>, ApiError> {
    let helpful_count = ReviewRepo::new(&state.pool).increment_helpful(id).await?;

    Ok(Json(HelpfulResponse { id, helpful_count }))
}

/// Review routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/products/{product}/reviews",
            get(list_reviews).post(create_review),
        )
        .route("/reviews/{id}/helpful", post(mark_helpful))
}
