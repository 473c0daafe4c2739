//! Pending-Report Selection Engine
//!
//! Turns an operator's target count into a bounded, ordered, validated set
//! of candidate orders. The backend's own pending filter is known to leak
//! delivered rows, so the engine over-fetches by a fixed multiplier and
//! re-validates every row locally before truncating to the target.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::models::order::{Order, OrderQuery};
use crate::models::selection::SelectionParams;

/// Fixed over-fetch factor applied to the backend page size.
///
/// If more than `target * OVERFETCH_MULTIPLIER` qualifying orders exist, the
/// engine only sees the fetched window; there is deliberately no
/// retry-with-larger-limit loop, so query size stays bounded.
pub const OVERFETCH_MULTIPLIER: u32 = 3;

// ── Query planning ──────────────────────────────────────────────────────────

/// Build the single backend query for a selection run.
///
/// Page 1 and ascending creation order are fixed: selections always work the
/// oldest backlog first, whatever the browsing screen is sorted by. The
/// server-side pending filter is sent as an optimization hint only.
pub fn plan_query(params: &SelectionParams) -> OrderQuery {
    OrderQuery {
        q: params.q.clone(),
        from: params.from.clone(),
        to: params.to.clone(),
        status: None,
        plan_name: params.plan_name.clone(),
        language: params.language.clone(),
        delivery_status: Some("pending".to_string()),
        sort_by: Some("createdAt".to_string()),
        sort_order: Some("asc".to_string()),
        page: 1,
        limit: params.target_count * OVERFETCH_MULTIPLIER,
    }
}

// ── Winnowing ───────────────────────────────────────────────────────────────

/// Outcome of filtering and truncating one fetched window.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Oldest-first qualifying orders, at most the requested target.
    pub orders: Vec<Order>,
    /// Qualifying orders seen before truncation, for operator feedback
    /// ("N pending found, using first M").
    pub qualifying_count: usize,
}

/// Re-validate a fetched window against the pending predicate and keep the
/// oldest `target_count` qualifying orders.
///
/// The window is stably re-sorted by creation time rather than trusting
/// backend order; rows without a parseable timestamp sort last. Fewer
/// qualifying rows than requested is not an error, the result is shorter.
pub fn select_oldest_pending(mut items: Vec<Order>, target_count: usize) -> Selection {
    items.sort_by_key(|order| (order.created_at.is_none(), order.created_at));
    items.retain(Order::needs_report);
    let qualifying_count = items.len();
    items.truncate(target_count);
    Selection { orders: items, qualifying_count }
}

// ── Preview coalescing ──────────────────────────────────────────────────────

/// Per-session sequence numbers for selection previews.
///
/// Every preview takes a ticket. The handler re-checks the ticket after each
/// await (debounce sleep, backend query) and abandons the work if a newer
/// request has arrived, so a slow early query can never overwrite a faster
/// later one.
#[derive(Default)]
pub struct SelectionGate {
    sessions: Mutex<HashMap<String, Arc<AtomicU64>>>,
}

pub struct PreviewTicket {
    seq: u64,
    latest: Arc<AtomicU64>,
}

impl SelectionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next sequence number for a session.
    pub fn ticket(&self, session_key: &str) -> PreviewTicket {
        let counter = {
            let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            sessions.entry(session_key.to_string()).or_default().clone()
        };
        let seq = counter.fetch_add(1, Ordering::SeqCst) + 1;
        PreviewTicket { seq, latest: counter }
    }

    /// Drop a session's sequence state (logout).
    pub fn forget(&self, session_key: &str) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(session_key);
    }
}

impl PreviewTicket {
    /// Whether no newer preview has been issued for the same session.
    pub fn is_latest(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.seq
    }
}
