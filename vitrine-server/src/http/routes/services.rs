//! Public service endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::db::repos::{Service, ServiceRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Service response
#[derive(Serialize)]
pub struct ServiceResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
}

impl From<Service> for ServiceResponse {
    fn from(s: Service) -> Self {
        Self {
            id: s.id,
            slug: s.slug,
            name: s.name,
            description: s.description,
            price_cents: s.price_cents,
        }
    }
}

/// GET /services - published services
async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceResponse>>, ApiError> {
    let services = ServiceRepo::new(&state.pool).list_published().await?;
    Ok(Json(
        services.into_iter().map(ServiceResponse::from).collect(),
    ))
}

/// Service routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/services", get(list_services))
}
