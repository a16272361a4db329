//! Handler helper functions
//!
//! Shared utilities used by multiple handlers.

use axum::http::HeaderMap;
use std::str::FromStr;

use crate::account::{Actor, Role, UserRepository};

use super::super::state::AppState;
use super::super::types::ApiError;

/// Resolve the acting user from request headers.
///
/// `X-User-ID` identifies the caller. With a database configured the role
/// comes from `users_tb` (and disabled users are refused); in in-memory
/// mode the `X-User-Role` header supplies it directly.
pub(crate) async fn resolve_actor(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Actor, ApiError> {
    let user_id: i64 = headers
        .get("X-User-ID")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing X-User-ID header"))?
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid X-User-ID header"))?;

    match &state.db {
        Some(db) => {
            let user = UserRepository::get_by_id(db.pool(), user_id)
                .await
                .map_err(|e| ApiError::internal(format!("User lookup failed: {}", e)))?
                .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

            if !user.is_active() {
                return Err(ApiError::forbidden("User account is disabled"));
            }

            Ok(user.actor())
        }
        None => {
            let role_str = headers
                .get("X-User-Role")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| ApiError::unauthorized("Missing X-User-Role header"))?;
            let role =
                Role::from_str(role_str).map_err(|e| ApiError::bad_request(e.to_string()))?;
            Ok(Actor::new(user_id, role))
        }
    }
}
