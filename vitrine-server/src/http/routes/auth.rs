//! Login and identity endpoints
//!
//! Passwordless, email-identified login (authentication proper is the
//! upstream identity provider's concern). Login is where admin bootstrap
//! runs: the configured email is elevated on its first login, exactly
//! once; afterwards authority comes from the stored role alone.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use vitrine_core::token::generate_token;

use crate::db::repos::{User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::CurrentUser;
use crate::http::server::AppState;
use crate::models::EmailAddress;

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// Login response with the bearer session token
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// User identity response
#[derive(Serialize)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub email: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role,
        }
    }
}

/// POST /auth/login - upsert the user, run admin bootstrap, issue a session
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = EmailAddress::new(&req.email)?;

    let repo = UserRepo::new(&state.pool);
    let mut user = repo.upsert_by_email(&email).await?;

    // One-shot elevation for the configured email; the guard column makes
    // a second elevation impossible even across concurrent logins
    if user.admin_bootstrapped_at.is_none() && user.email == state.config.admin_email {
        if let Some(elevated) = repo.bootstrap_admin(user.id).await? {
            tracing::info!(user_id = %elevated.id, "admin role bootstrapped");
            user = elevated;
        }
    }

    let token = generate_token();
    repo.create_session(user.id, &token).await?;

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// GET /auth/me - identity for the presented bearer token
async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}
