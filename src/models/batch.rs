use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;
use strum::Display;
use uuid::Uuid;

use crate::models::order::Order;

/// Lifecycle of a processing batch between preview and backend hand-off.
///
/// Draft and Failed batches accept a dispatch; a Submitted batch rejects
/// further dispatches until the in-flight call settles; Succeeded batches
/// are dropped from the registry as soon as the outcome is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BatchState {
    Draft,
    Confirmed,
    Submitted,
    Succeeded,
    Failed,
}

/// A set of report ids held server-side between selection and dispatch.
#[derive(Debug, Clone)]
pub struct ProcessingBatch {
    pub id: Uuid,
    pub report_ids: Vec<String>,
    pub state: BatchState,
    pub created_at: Instant,
}

impl ProcessingBatch {
    pub fn new(report_ids: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            report_ids,
            state: BatchState::Draft,
            created_at: Instant::now(),
        }
    }
}

/// Extract the ids to submit from a selection.
///
/// Rows with an empty identifier are dropped and duplicates collapse to the
/// first occurrence, so overlapping backend pages cannot double-submit.
pub fn extract_report_ids(orders: &[Order]) -> Vec<String> {
    let mut seen = HashSet::new();
    orders
        .iter()
        .map(|order| order.id.trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}
