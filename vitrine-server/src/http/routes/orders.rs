//! Order endpoints: checkout, status polling, confirmation, deletion,
//! fulfilment download

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vitrine_core::token::generate_token;

use crate::db::repos::{OrderLine, OrderRepo, ProductRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{CheckoutItem, EmailAddress, PaymentStatus, ValidationError};

/// Checkout request
#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    pub items: Vec<CheckoutItemRequest>,
}

#[derive(Deserialize)]
pub struct CheckoutItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Checkout response: where to send the customer
#[derive(Serialize)]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    pub checkout_url: String,
}

/// Status polling response
#[derive(Serialize)]
pub struct OrderStatusResponse {
    pub order_id: Uuid,
    pub paid: bool,
}

/// Confirmation response
#[derive(Serialize)]
pub struct ConfirmResponse {
    pub order_id: Uuid,
    pub paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_token: Option<String>,
}

/// Deletion request carries the requester's email for the ownership check
#[derive(Deserialize)]
pub struct DeleteOrderRequest {
    pub email: String,
}

/// Deliverable line in the download grant
#[derive(Serialize)]
pub struct DownloadItemResponse {
    pub name: String,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// Download grant response
#[derive(Serialize)]
pub struct DownloadResponse {
    pub order_id: Uuid,
    pub items: Vec<DownloadItemResponse>,
}

/// POST /checkout - create an order and a gateway checkout session
async fn checkout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let email = EmailAddress::new(&req.email)?;

    if req.items.is_empty() {
        return Err(ValidationError::Empty { field: "items" }.into());
    }

    let mut items = Vec::with_capacity(req.items.len());
    for item in &req.items {
        items.push(CheckoutItem::new(item.product_id, item.quantity)?);
    }

    // Price from the catalog, never from the client
    let ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let products = ProductRepo::new(&state.pool).fetch_for_checkout(&ids).await?;
    let by_id: HashMap<Uuid, _> = products.into_iter().map(|p| (p.id, p)).collect();

    let mut lines = Vec::with_capacity(items.len());
    let mut total_cents: i64 = 0;
    for item in &items {
        let product = by_id.get(&item.product_id).ok_or(ApiError::Validation(
            ValidationError::InvalidFormat {
                field: "items",
                reason: "unknown or unavailable product",
            },
        ))?;
        total_cents += product.price_cents * item.quantity as i64;
        lines.push(OrderLine {
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity: item.quantity,
        });
    }

    let repo = OrderRepo::new(&state.pool);
    let order = repo.create(email.as_str(), &lines, total_cents).await?;

    let session = state
        .payments
        .create_checkout(order.id, email.as_str(), total_cents, &state.config.public_url)
        .await?;

    repo.set_payment_ref(order.id, &session.id).await?;

    tracing::info!(order_id = %order.id, total_cents, "checkout session created");

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id: order.id,
            checkout_url: session.url,
        }),
    ))
}

/// GET /orders/{id}/status - polling endpoint; one keyed lookup
async fn order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderStatusResponse>, ApiError> {
    let status = OrderRepo::new(&state.pool).status(id).await?;

    Ok(Json(OrderStatusResponse {
        order_id: status.id,
        paid: status.paid,
    }))
}

/// POST /orders/{id}/confirm - ask the gateway, then fulfil
async fn confirm_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let repo = OrderRepo::new(&state.pool);
    let order = repo.get(id).await?;

    // Idempotent: confirming a completed order returns the existing state
    // without another gateway round-trip
    if order.payment_status == PaymentStatus::Completed.as_str() {
        return Ok(Json(ConfirmResponse {
            order_id: order.id,
            paid: true,
            download_token: order.download_token,
        }));
    }

    let payment_ref = order.payment_ref.as_deref().ok_or(ApiError::Conflict {
        reason: "order has no payment session".into(),
    })?;

    let session = state.payments.get_session(payment_ref).await?;

    if session.is_paid() {
        let order = repo.mark_completed(id, &generate_token()).await?;
        let items = repo.items(id).await?;

        // Best-effort: a failed email never fails the confirmation
        if let Err(err) = state
            .email
            .send_order_confirmation(&order, &items, &state.config.public_url)
            .await
        {
            tracing::warn!(order_id = %id, error = %err, "order confirmation email failed");
        }

        tracing::info!(order_id = %id, "order completed");
        return Ok(Json(ConfirmResponse {
            order_id: id,
            paid: true,
            download_token: order.download_token,
        }));
    }

    if session.is_expired() {
        repo.mark_failed(id).await?;
    }

    Ok(Json(ConfirmResponse {
        order_id: id,
        paid: false,
        download_token: None,
    }))
}

/// DELETE /orders/{id} - owner-only, never for completed orders
async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<DeleteOrderRequest>,
) -> Result<StatusCode, ApiError> {
    let email = EmailAddress::new(&req.email)?;

    let repo = OrderRepo::new(&state.pool);
    let order = repo.get(id).await?;

    if order.email != email.as_str() {
        return Err(ApiError::Forbidden {
            reason: "order belongs to a different email".into(),
        });
    }

    if order.payment_status == PaymentStatus::Completed.as_str() {
        return Err(ApiError::Conflict {
            reason: "completed orders cannot be deleted".into(),
        });
    }

    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /download/{token} - resolve a download token to the deliverables
async fn download(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let repo = OrderRepo::new(&state.pool);
    let order = repo.find_by_download_token(&token).await?;
    let deliverables = repo.deliverables(order.id).await?;

    Ok(Json(DownloadResponse {
        order_id: order.id,
        items: deliverables
            .into_iter()
            .map(|d| DownloadItemResponse {
                name: d.product_name,
                quantity: d.quantity,
                download_url: d.download_url,
            })
            .collect(),
    }))
}

/// Order routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/orders/{id}/status", get(order_status))
        .route("/orders/{id}/confirm", post(confirm_order))
        .route("/orders/{id}", delete(delete_order))
        .route("/download/{token}", get(download))
}
