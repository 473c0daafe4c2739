//! Session Context
//!
//! The dashboard session is an opaque token minted by the backend at login
//! and carried in an httpOnly cookie. Handlers receive an explicit
//! [`Session`] via extractor rather than reading ambient state; the page
//! guard redirects browsers between the login page and the dashboard based
//! on cookie presence.

use axum::extract::{FromRequestParts, Request};
use axum::http::{header, request::Parts, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tower_cookies::cookie::time::Duration as CookieDuration;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

/// Name of the session cookie issued on login.
pub const SESSION_COOKIE: &str = "token";

/// Pages a browser may visit without a session.
const PUBLIC_PAGES: [&str; 2] = ["/login", "/register"];

/// An authenticated operator session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
}

impl Session {
    /// Key under which per-session server state (sequence numbers, draft
    /// batches) is held.
    pub fn key(&self) -> &str {
        &self.token
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Cookie first (browser flows), then Authorization for API clients.
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        if let Some(cookie) = cookies.get(SESSION_COOKIE) {
            let token = cookie.value().trim();
            if !token.is_empty() {
                return Ok(Session { token: token.to_string() });
            }
        }
        if let Some(token) = bearer_token(parts) {
            return Ok(Session { token });
        }
        Err((
            StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({ "error": "authentication required" })),
        )
            .into_response())
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Build the session cookie issued on a successful login.
pub fn session_cookie(token: String, max_age_secs: u64, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_max_age(CookieDuration::seconds(max_age_secs as i64));
    cookie.set_secure(secure);
    cookie
}

/// Build the expired cookie that clears a session.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_max_age(CookieDuration::seconds(0));
    cookie
}

/// Whether the page guard leaves a request alone: the API namespace, health
/// and metrics endpoints, and static assets are never redirected.
pub fn exempt_from_guard(path: &str) -> bool {
    if path == "/api" || path.starts_with("/api/") || path == "/health" || path == "/metrics" {
        return true;
    }
    // Anything with a file extension is a static asset (favicon.ico, *.css).
    path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

fn is_public_page(path: &str) -> bool {
    PUBLIC_PAGES
        .iter()
        .any(|page| path == *page || path.starts_with(&format!("{page}/")))
}

/// Redirect browsers between the login page and the dashboard.
///
/// No session on a protected page sends the browser to `/login`; an existing
/// session on `/login` or `/register` sends it back to the dashboard. The
/// cookie's presence is all the guard checks; whether the token is still
/// accepted is the backend's call on the next API request.
pub async fn page_guard(cookies: Cookies, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if exempt_from_guard(&path) {
        return next.run(request).await;
    }

    let has_session = cookies
        .get(SESSION_COOKIE)
        .is_some_and(|cookie| !cookie.value().trim().is_empty());

    if has_session && is_public_page(&path) {
        return Redirect::temporary("/").into_response();
    }
    if !has_session && !is_public_page(&path) {
        return Redirect::temporary("/login").into_response();
    }
    next.run(request).await
}
