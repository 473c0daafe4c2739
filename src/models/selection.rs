use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::Order;

/// Operator request for a pending-report selection preview.
///
/// `target_count` must be positive; the upper bound keeps the over-fetched
/// backend query (3x the target) within a sane page size.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionParams {
    #[garde(range(min = 1, max = 500))]
    pub target_count: u32,
    #[garde(skip)]
    pub q: Option<String>,
    #[garde(skip)]
    pub from: Option<String>,
    #[garde(skip)]
    pub to: Option<String>,
    #[garde(skip)]
    pub plan_name: Option<String>,
    #[garde(skip)]
    pub language: Option<String>,
}

/// Preview returned to the operator before they confirm a dispatch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPreview {
    /// Handle for the draft batch; absent when nothing qualifies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<Uuid>,
    pub target_count: u32,
    /// Qualifying orders seen in the fetched window, before truncation.
    pub qualifying_count: usize,
    pub orders: Vec<Order>,
}
