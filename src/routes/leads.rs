//! Lead listing and CSV export.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::models::lead::Lead;
use crate::routes::ApiError;
use crate::services::export;
use crate::services::session::Session;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeadParams {
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Fetch and filter the rows both the table and the export show.
async fn load_leads(
    state: &AppState,
    session: &Session,
    params: LeadParams,
) -> Result<Vec<Lead>, ApiError> {
    // A from-date without a to-date means that single day.
    let to = match (&params.from, params.to) {
        (Some(from), None) => Some(from.clone()),
        (_, to) => to,
    };

    let mut leads = state
        .backend
        .fetch_leads(&session.token, params.from.as_deref(), to.as_deref())
        .await?;

    if let Some(q) = params.q.as_deref() {
        leads.retain(|lead| lead.matches(q));
    }
    Ok(leads)
}

/// GET /api/leads
pub async fn list_leads(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<LeadParams>,
) -> Result<Json<Vec<Lead>>, ApiError> {
    Ok(Json(load_leads(&state, &session, params).await?))
}

/// GET /api/leads/export — the same rows as a CSV attachment.
pub async fn export_leads(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<LeadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let leads = load_leads(&state, &session, params).await?;
    let csv = export::leads_csv(&leads)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leads.csv\"",
            ),
        ],
        csv,
    ))
}
