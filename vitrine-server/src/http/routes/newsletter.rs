//! Newsletter endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::repos::{NewsletterRepo, SubscribeOutcome};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::EmailAddress;

/// Subscribe/unsubscribe request
#[derive(Deserialize)]
pub struct NewsletterRequest {
    pub email: String,
}

/// Subscribe response
#[derive(Serialize)]
pub struct NewsletterResponse {
    pub message: &'static str,
}

/// POST /newsletter - subscribe an email
async fn subscribe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewsletterRequest>,
) -> Result<(StatusCode, Json<NewsletterResponse>), ApiError> {
    let email = EmailAddress::new(&req.email)?;

    let outcome = NewsletterRepo::new(&state.pool).subscribe(&email).await?;

    let (status, message) = match outcome {
        SubscribeOutcome::Subscribed => (StatusCode::CREATED, "subscribed"),
        SubscribeOutcome::Resubscribed => (StatusCode::OK, "subscribed"),
        SubscribeOutcome::AlreadySubscribed => (StatusCode::OK, "already subscribed"),
    };

    Ok((status, Json(NewsletterResponse { message })))
}

/// POST /newsletter/unsubscribe - idempotent opt-out
async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewsletterRequest>,
) -> Result<Json<NewsletterResponse>, ApiError> {
    let email = EmailAddress::new(&req.email)?;

    NewsletterRepo::new(&state.pool).unsubscribe(&email).await?;

    Ok(Json(NewsletterResponse {
        message: "unsubscribed",
    }))
}

/// Newsletter routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/newsletter", post(subscribe))
        .route("/newsletter/unsubscribe", post(unsubscribe))
}
