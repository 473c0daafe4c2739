//! Earnings listing and CSV export.
//!
//! The backend's `type` parameter is forwarded as a hint, and the rows are
//! re-filtered locally by kind after normalization, the same stance the
//! order selection takes toward unreliable server-side filters.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::models::earning::{Earning, EarningKind};
use crate::routes::ApiError;
use crate::services::export;
use crate::services::session::Session;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EarningParams {
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub kind: Option<String>,
}

async fn load_earnings(
    state: &AppState,
    session: &Session,
    params: EarningParams,
) -> Result<Vec<Earning>, ApiError> {
    let kind = params
        .kind
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty() && !k.eq_ignore_ascii_case("all"));

    let mut earnings = state
        .backend
        .fetch_earnings(
            &session.token,
            params.from.as_deref(),
            params.to.as_deref(),
            kind,
        )
        .await?;

    if let Some(kind) = kind {
        let want = EarningKind::from_raw(Some(kind));
        earnings.retain(|earning| earning.kind == want);
    }
    if let Some(q) = params.q.as_deref() {
        earnings.retain(|earning| earning.matches(q));
    }
    Ok(earnings)
}

/// GET /api/earnings
pub async fn list_earnings(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<EarningParams>,
) -> Result<Json<Vec<Earning>>, ApiError> {
    Ok(Json(load_earnings(&state, &session, params).await?))
}

/// GET /api/earnings/export — the same rows as a CSV attachment,
/// breakdown columns included.
pub async fn export_earnings(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<EarningParams>,
) -> Result<impl IntoResponse, ApiError> {
    let earnings = load_earnings(&state, &session, params).await?;
    let csv = export::earnings_csv(&earnings)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"earnings.csv\"",
            ),
        ],
        csv,
    ))
}
