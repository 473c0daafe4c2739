pub mod auth;
pub mod earnings;
pub mod health;
pub mod leads;
pub mod metrics;
pub mod orders;
pub mod pujas;
pub mod reports;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_cookies::CookieManagerLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::services::backend::BackendError;
use crate::services::dispatch::DispatchError;
use crate::services::export::ExportError;
use crate::services::session;

/// Error surface of the JSON API.
///
/// Validation problems are 4xx and never reach the backend; backend
/// rejections and transport failures become 502 with the detail logged, not
/// leaked; login is the one place a backend reply passes through verbatim.
/// Every failure leaves server-held state (drafts, sequences) intact.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("a newer selection request superseded this one")]
    PreviewSuperseded,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("unsupported image type")]
    UnsupportedImage,

    /// Verbatim backend reply (login only).
    #[error("backend replied {0}")]
    PassThrough(StatusCode, String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ApiError {
    fn body(status: StatusCode, error: String, code: Option<&str>) -> Response {
        let mut payload = serde_json::json!({ "error": error });
        if let Some(code) = code {
            payload["code"] = serde_json::json!(code);
        }
        (status, Json(payload)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) => {
                Self::body(StatusCode::UNPROCESSABLE_ENTITY, message, None)
            }
            ApiError::PreviewSuperseded => Self::body(
                StatusCode::CONFLICT,
                ApiError::PreviewSuperseded.to_string(),
                Some("superseded"),
            ),
            ApiError::Dispatch(err) => dispatch_response(err),
            ApiError::Backend(err) => backend_response(err),
            ApiError::UnsupportedImage => Self::body(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "image must be JPEG, PNG, or WebP".to_string(),
                None,
            ),
            ApiError::PassThrough(status, body) => pass_through(status, body),
            ApiError::Export(err) => {
                tracing::error!(error = %err, "CSV export failed");
                Self::body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "export failed".to_string(),
                    None,
                )
            }
        }
    }
}

fn dispatch_response(err: DispatchError) -> Response {
    let message = err.to_string();
    match err {
        DispatchError::UnknownBatch => {
            ApiError::body(StatusCode::NOT_FOUND, message, Some("unknown_batch"))
        }
        DispatchError::InFlight => {
            ApiError::body(StatusCode::CONFLICT, message, Some("dispatch_in_flight"))
        }
        DispatchError::CountMismatch { .. } => {
            ApiError::body(StatusCode::CONFLICT, message, Some("count_mismatch"))
        }
        DispatchError::NotConfirmed => {
            ApiError::body(StatusCode::CONFLICT, message, Some("not_confirmed"))
        }
        DispatchError::EmptyBatch => {
            ApiError::body(StatusCode::UNPROCESSABLE_ENTITY, message, Some("empty_batch"))
        }
        DispatchError::Backend(inner) => backend_response(inner),
    }
}

fn backend_response(err: BackendError) -> Response {
    match &err {
        BackendError::Http(source) => {
            tracing::warn!(error = %source, "backend unreachable");
            ApiError::body(
                StatusCode::BAD_GATEWAY,
                "backend unreachable".to_string(),
                Some("backend_unreachable"),
            )
        }
        BackendError::Status { status, body } => {
            tracing::warn!(status = %status, body = %body, "backend rejected request");
            ApiError::body(
                StatusCode::BAD_GATEWAY,
                format!("backend returned HTTP {status}"),
                Some("backend_rejected"),
            )
        }
        BackendError::Decode(source) => {
            tracing::warn!(error = %source, "backend response malformed");
            ApiError::body(
                StatusCode::BAD_GATEWAY,
                "backend response malformed".to_string(),
                Some("backend_malformed"),
            )
        }
    }
}

/// Relay a backend reply untouched, keeping its status and (JSON) body.
fn pass_through(status: StatusCode, body: String) -> Response {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => (status, Json(value)).into_response(),
        Err(_) => (status, body).into_response(),
    }
}

// ── Router assembly ─────────────────────────────────────────────────────────

async fn dashboard_page() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

async fn login_page() -> Html<&'static str> {
    Html(include_str!("../../static/login.html"))
}

/// Assemble the application router with the full middleware stack.
///
/// The metrics route is optional so test harnesses can skip installing a
/// global Prometheus recorder.
pub fn router(state: AppState, metrics_handle: Option<Arc<PrometheusHandle>>) -> Router {
    let app = Router::new()
        // Static dashboard shell (embedded at compile time)
        .route("/", get(dashboard_page))
        .route("/login", get(login_page))
        .route("/register", get(login_page))
        // API endpoints
        .route("/health", get(health::health_check))
        .route("/api/admin/login", post(auth::login))
        .route("/api/admin/logout", post(auth::logout))
        .route("/api/orders", get(orders::list_orders))
        .route("/api/reports/selection", get(reports::selection_preview))
        .route("/api/reports/dispatch", post(reports::dispatch_batch))
        .route("/api/leads", get(leads::list_leads))
        .route("/api/leads/export", get(leads::export_leads))
        .route("/api/earnings", get(earnings::list_earnings))
        .route("/api/earnings/export", get(earnings::export_earnings))
        .route("/api/pujas", post(pujas::create_puja))
        .route("/api/pujas/categories", get(pujas::list_categories))
        .route("/api/pujas/{id}", get(pujas::get_puja).put(pujas::update_puja))
        .with_state(state);

    // Prometheus metrics endpoint (separate state)
    let app = match metrics_handle {
        Some(handle) => {
            app.route("/metrics", get(metrics::prometheus_metrics).with_state(handle))
        }
        None => app,
    };

    app.layer(middleware::from_fn(session::page_guard))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)) // 10 MB limit
}
