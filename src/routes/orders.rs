//! Order browsing proxy.
//!
//! Forwards the dashboard's search, date-range, status, and pagination
//! parameters to the backend and returns the normalized page. Unlike
//! selection previews, browsing honors whatever sort the operator picked.

use axum::extract::{Query, State};
use axum::Json;
use garde::Validate;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::models::order::{OrderQuery, OrdersPage};
use crate::routes::ApiError;
use crate::services::session::Session;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowseParams {
    #[garde(skip)]
    pub q: Option<String>,
    #[garde(skip)]
    pub from: Option<String>,
    #[garde(skip)]
    pub to: Option<String>,
    #[garde(skip)]
    pub status: Option<String>,
    #[garde(skip)]
    pub plan_name: Option<String>,
    #[garde(skip)]
    pub language: Option<String>,
    #[garde(skip)]
    pub report_delivery_status: Option<String>,
    #[garde(skip)]
    pub sort_by: Option<String>,
    #[garde(skip)]
    pub sort_order: Option<String>,
    #[garde(range(min = 1))]
    pub page: u32,
    #[garde(range(min = 1, max = 100))]
    pub limit: u32,
}

impl Default for BrowseParams {
    fn default() -> Self {
        Self {
            q: None,
            from: None,
            to: None,
            status: None,
            plan_name: None,
            language: None,
            report_delivery_status: None,
            sort_by: None,
            sort_order: None,
            page: 1,
            limit: 10,
        }
    }
}

/// A dropdown's "all" option means no filter at all.
fn drop_all(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().eq_ignore_ascii_case("all"))
}

impl BrowseParams {
    /// Translate into the backend's query dialect.
    ///
    /// A `from` date without a `to` means that single day, so `to` is filled
    /// in to match.
    fn into_query(self) -> OrderQuery {
        let to = match (&self.from, self.to) {
            (Some(from), None) => Some(from.clone()),
            (_, to) => to,
        };
        OrderQuery {
            q: self.q,
            from: self.from,
            to,
            status: drop_all(self.status),
            plan_name: self.plan_name,
            language: drop_all(self.language),
            delivery_status: drop_all(self.report_delivery_status),
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<BrowseParams>,
) -> Result<Json<OrdersPage>, ApiError> {
    params
        .validate()
        .map_err(|report| ApiError::Validation(report.to_string()))?;

    let query = params.into_query();
    let page = state.backend.query_orders(&session.token, &query).await?;
    Ok(Json(page))
}
