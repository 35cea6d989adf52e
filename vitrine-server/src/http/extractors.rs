//! Custom Axum extractors
//!
//! Session-backed identity. `CurrentUser` resolves the bearer token to a
//! user row; `AdminUser` additionally requires the stored admin role -
//! authority always comes from the role column, never from comparing
//! emails at request time.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;
use super::server::AppState;
use crate::db::repos::{User, UserRepo};

/// Authenticated user (any role)
pub struct CurrentUser(pub User);

/// Authenticated user with the admin role
pub struct AdminUser(pub User);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;

        let user = UserRepo::new(&state.pool)
            .find_by_session(token)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Ok(Self(user))
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(ApiError::Forbidden {
                reason: "admin access required".into(),
            });
        }

        Ok(Self(user))
    }
}
