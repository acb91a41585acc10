//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Validates the session cookie and stashes the user id in request
/// extensions for the handlers.
///
/// Rejections go through `ApiError::Unauthenticated`, so a missing or stale
/// cookie gets the same 401 JSON body the rest of the service produces.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated("no session found".to_string()))?;

    let auth_session_id = cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .ok_or_else(|| ApiError::Unauthenticated("no session found".to_string()))?;

    let user_id = state
        .db
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            debug!("rejected auth session: {e}");
            ApiError::Unauthenticated("session is invalid or expired".to_string())
        })?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}
