//! Public category endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::db::repos::{CategoryRepo, CategoryWithCount};
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Category response with published-product count
#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub product_count: i64,
}

impl From<CategoryWithCount> for CategoryResponse {
    fn from(c: CategoryWithCount) -> Self {
        Self {
            id: c.id,
            slug: c.slug,
            name: c.name,
            description: c.description,
            product_count: c.product_count,
        }
    }
}

/// GET /categories - navigation list in display order
async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = CategoryRepo::new(&state.pool).list().await?;
    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// Category routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/categories", get(list_categories))
}
