//! Public content page endpoints (terms, refund policy, ...)

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::db::repos::{Page, PageRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::Slug;

/// Content page response
#[derive(Serialize)]
pub struct PageResponse {
    pub slug: String,
    pub title: String,
    pub body: String,
    pub updated_at: String,
}

impl From<Page> for PageResponse {
    fn from(p: Page) -> Self {
        Self {
            slug: p.slug,
            title: p.title,
            body: p.body,
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// GET /pages/{slug}
async fn get_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<PageResponse>, ApiError> {
    let slug = Slug::new(&slug)?;
    let page = PageRepo::new(&state.pool).get(slug.as_str()).await?;
    Ok(Json(PageResponse::from(page)))
}

/// Page routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/pages/{slug}", get(get_page))
}
