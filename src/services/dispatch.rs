//! Bulk Report Dispatch
//!
//! Holds draft batches between selection preview and operator confirmation,
//! and walks each batch through Draft → Confirmed → Submitted →
//! Succeeded/Failed against the backend. Batches live in memory only; once a
//! batch is accepted the backend is the source of truth for job state.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use uuid::Uuid;

use crate::models::batch::{extract_report_ids, BatchState, ProcessingBatch};
use crate::models::order::Order;
use crate::services::backend::{BackendApi, BackendError};

/// Outcome reported after a successful dispatch.
#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    pub batch_id: Uuid,
    pub submitted: usize,
    pub job_count: u64,
}

/// In-memory registry of processing batches, at most one per session.
///
/// A newer preview replaces the session's previous batch (draft or failed);
/// only a batch with a submission in flight refuses replacement. Entries
/// expire with the session TTL.
pub struct ReportDispatcher {
    batches: Mutex<HashMap<String, ProcessingBatch>>,
    ttl: Duration,
}

impl ReportDispatcher {
    pub fn new(ttl: Duration) -> Self {
        Self { batches: Mutex::new(HashMap::new()), ttl }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ProcessingBatch>> {
        self.batches.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prune(batches: &mut HashMap<String, ProcessingBatch>, ttl: Duration) {
        batches.retain(|_, batch| {
            batch.state == BatchState::Submitted || batch.created_at.elapsed() < ttl
        });
    }

    /// Register the draft behind a session's latest preview.
    ///
    /// Returns the batch handle and size, or `None` when nothing usable could
    /// be extracted (empty selection, or every id blank) — in that case no
    /// draft exists and nothing can be dispatched.
    pub fn register_draft(
        &self,
        session_key: &str,
        orders: &[Order],
    ) -> Result<Option<(Uuid, usize)>, DispatchError> {
        let report_ids = extract_report_ids(orders);

        let mut batches = self.lock();
        Self::prune(&mut batches, self.ttl);

        let in_flight =
            batches.get(session_key).is_some_and(|b| b.state == BatchState::Submitted);
        if in_flight {
            return Err(DispatchError::InFlight);
        }

        if report_ids.is_empty() {
            // The operator's current view has nothing to process; any older
            // draft no longer reflects what they see.
            batches.remove(session_key);
            return Ok(None);
        }

        let batch = ProcessingBatch::new(report_ids);
        let handle = (batch.id, batch.report_ids.len());
        tracing::debug!(batch_id = %batch.id, count = handle.1, "registered draft batch");
        batches.insert(session_key.to_string(), batch);
        Ok(Some(handle))
    }

    /// Record the operator's acknowledgment. The confirmed count must name
    /// the batch's exact size; without this step a batch never leaves Draft.
    pub fn confirm(
        &self,
        session_key: &str,
        batch_id: Uuid,
        confirmed_count: usize,
    ) -> Result<(), DispatchError> {
        let mut batches = self.lock();
        Self::prune(&mut batches, self.ttl);

        let batch = match batches.get_mut(session_key) {
            Some(batch) if batch.id == batch_id => batch,
            _ => return Err(DispatchError::UnknownBatch),
        };

        match batch.state {
            BatchState::Draft | BatchState::Failed | BatchState::Confirmed => {}
            BatchState::Submitted => return Err(DispatchError::InFlight),
            BatchState::Succeeded => return Err(DispatchError::UnknownBatch),
        }

        if batch.report_ids.is_empty() {
            return Err(DispatchError::EmptyBatch);
        }
        if confirmed_count != batch.report_ids.len() {
            return Err(DispatchError::CountMismatch {
                expected: batch.report_ids.len(),
                confirmed: confirmed_count,
            });
        }

        batch.state = BatchState::Confirmed;
        Ok(())
    }

    /// Move a confirmed batch into flight and hand back its ids.
    ///
    /// Exactly one caller can win this transition, which is what makes a
    /// double-click harmless: the loser sees `InFlight`.
    fn begin(&self, session_key: &str, batch_id: Uuid) -> Result<Vec<String>, DispatchError> {
        let mut batches = self.lock();

        let batch = match batches.get_mut(session_key) {
            Some(batch) if batch.id == batch_id => batch,
            _ => return Err(DispatchError::UnknownBatch),
        };

        match batch.state {
            BatchState::Confirmed => {}
            BatchState::Submitted => return Err(DispatchError::InFlight),
            _ => return Err(DispatchError::NotConfirmed),
        }

        batch.state = BatchState::Submitted;
        Ok(batch.report_ids.clone())
    }

    /// Record the terminal state. Succeeded batches leave the registry;
    /// failed ones stay, ids intact, so a retry needs no new selection.
    fn settle(&self, session_key: &str, batch_id: Uuid, state: BatchState) {
        let mut batches = self.lock();
        let matches = batches.get(session_key).is_some_and(|b| b.id == batch_id);
        if !matches {
            // Pruned mid-flight; nothing to record.
            return;
        }
        if state == BatchState::Succeeded {
            batches.remove(session_key);
        } else if let Some(batch) = batches.get_mut(session_key) {
            batch.state = state;
        }
    }

    /// Confirm and submit a batch to the backend.
    pub async fn dispatch(
        &self,
        backend: &BackendApi,
        token: &str,
        session_key: &str,
        batch_id: Uuid,
        confirmed_count: usize,
    ) -> Result<DispatchReceipt, DispatchError> {
        self.confirm(session_key, batch_id, confirmed_count)?;
        let report_ids = self.begin(session_key, batch_id)?;

        tracing::info!(batch_id = %batch_id, count = report_ids.len(), "submitting report batch");

        match backend.submit_report_batch(token, &report_ids).await {
            Ok(job_count) => {
                self.settle(session_key, batch_id, BatchState::Succeeded);
                metrics::counter!("report_batches_submitted_total").increment(1);
                tracing::info!(batch_id = %batch_id, job_count, "report batch accepted");
                Ok(DispatchReceipt { batch_id, submitted: report_ids.len(), job_count })
            }
            Err(err) => {
                self.settle(session_key, batch_id, BatchState::Failed);
                metrics::counter!("report_batches_failed_total").increment(1);
                tracing::warn!(batch_id = %batch_id, error = %err, "report batch submission failed");
                Err(DispatchError::Backend(err))
            }
        }
    }

    /// Drop a session's batch (logout).
    pub fn forget_session(&self, session_key: &str) {
        self.lock().remove(session_key);
    }

    /// State of a session's current batch, if any.
    pub fn current_state(&self, session_key: &str) -> Option<BatchState> {
        self.lock().get(session_key).map(|b| b.state)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no matching batch; run a new selection")]
    UnknownBatch,

    #[error("a submission for this batch is already in flight")]
    InFlight,

    #[error("confirmed count {confirmed} does not match the batch size {expected}")]
    CountMismatch { expected: usize, confirmed: usize },

    #[error("batch has not been confirmed")]
    NotConfirmed,

    #[error("batch has no report ids")]
    EmptyBatch,

    #[error(transparent)]
    Backend(#[from] BackendError),
}
