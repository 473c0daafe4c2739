//! Admin login and logout.
//!
//! Login is proxied to the platform backend; the token it mints becomes the
//! session cookie. A backend rejection passes through verbatim so the
//! operator sees the backend's own message. Logout clears the cookie and the
//! session's server-held selection state.

use axum::extract::State;
use axum::Json;
use garde::Validate;
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::app_state::AppState;
use crate::routes::ApiError;
use crate::services::backend::BackendError;
use crate::services::session;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(request): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    request
        .validate()
        .map_err(|report| ApiError::Validation(report.to_string()))?;

    let credentials = serde_json::json!({
        "email": request.email,
        "password": request.password,
    });

    let success = match state.backend.admin_login(&credentials).await {
        Ok(success) => success,
        // The backend's own rejection (status and body) goes back untouched.
        Err(BackendError::Status { status, body }) => {
            tracing::info!(status = %status, "backend rejected login");
            return Err(ApiError::PassThrough(status, body));
        }
        Err(err) => return Err(err.into()),
    };

    cookies.add(session::session_cookie(
        success.token.clone(),
        state.settings.session_ttl_secs,
        state.settings.session_cookie_secure,
    ));

    tracing::info!("admin login succeeded");
    Ok(Json(serde_json::json!({
        "message": success.message.unwrap_or_else(|| "login successful".to_string()),
        "token": success.token,
    })))
}

/// POST /api/admin/logout
///
/// Clears the cookie even when it has already expired; any server-held
/// drafts and sequence state for the session go with it.
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Json<serde_json::Value> {
    if let Some(cookie) = cookies.get(session::SESSION_COOKIE) {
        let token = cookie.value().trim().to_string();
        if !token.is_empty() {
            state.dispatcher.forget_session(&token);
            state.gate.forget(&token);
        }
    }
    cookies.add(session::removal_cookie());
    Json(serde_json::json!({ "message": "logged out" }))
}
