//! Report selection preview and batch dispatch.
//!
//! The preview endpoint runs the selection engine behind a per-session
//! debounce-and-sequence gate: rapid parameter changes coalesce into one
//! backend query, and a slow early query can never overwrite a newer one.
//! The dispatch endpoint carries the operator's confirmation through the
//! batch state machine and submits exactly one backend call per batch.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::selection::{SelectionParams, SelectionPreview};
use crate::routes::ApiError;
use crate::services::selection;
use crate::services::session::Session;

/// GET /api/reports/selection
pub async fn selection_preview(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SelectionParams>,
) -> Result<Json<SelectionPreview>, ApiError> {
    params
        .validate()
        .map_err(|report| ApiError::Validation(report.to_string()))?;

    let ticket = state.gate.ticket(session.key());

    // Debounce window: sit out the configured delay, then only the newest
    // request for this session carries on.
    let debounce = Duration::from_millis(state.settings.selection_debounce_ms);
    if !debounce.is_zero() {
        tokio::time::sleep(debounce).await;
    }
    if !ticket.is_latest() {
        metrics::counter!("selection_previews_superseded_total").increment(1);
        return Err(ApiError::PreviewSuperseded);
    }

    let query = selection::plan_query(&params);
    let page = state.backend.query_orders(&session.token, &query).await?;

    // Re-check after the await: discard this response if a newer preview was
    // issued while the backend call was in flight.
    if !ticket.is_latest() {
        metrics::counter!("selection_previews_superseded_total").increment(1);
        return Err(ApiError::PreviewSuperseded);
    }

    let picked = selection::select_oldest_pending(page.items, params.target_count as usize);
    let handle = state.dispatcher.register_draft(session.key(), &picked.orders)?;

    metrics::counter!("selection_previews_total").increment(1);
    tracing::info!(
        target_count = params.target_count,
        qualifying = picked.qualifying_count,
        selected = picked.orders.len(),
        "selection preview served"
    );

    Ok(Json(SelectionPreview {
        batch_id: handle.map(|(id, _)| id),
        target_count: params.target_count,
        qualifying_count: picked.qualifying_count,
        orders: picked.orders,
    }))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    #[garde(skip)]
    pub batch_id: Uuid,
    /// The count the operator acknowledged; must equal the batch size.
    #[garde(range(min = 1))]
    pub confirmed_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub status: &'static str,
    pub batch_id: Uuid,
    pub submitted: usize,
    pub job_count: u64,
}

/// POST /api/reports/dispatch
pub async fn dispatch_batch(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<DispatchRequest>,
) -> Result<Json<DispatchResponse>, ApiError> {
    request
        .validate()
        .map_err(|report| ApiError::Validation(report.to_string()))?;

    let receipt = state
        .dispatcher
        .dispatch(
            &state.backend,
            &session.token,
            session.key(),
            request.batch_id,
            request.confirmed_count,
        )
        .await?;

    Ok(Json(DispatchResponse {
        status: "succeeded",
        batch_id: receipt.batch_id,
        submitted: receipt.submitted,
        job_count: receipt.job_count,
    }))
}
