use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{backend::BackendApi, dispatch::ReportDispatcher, selection::SelectionGate};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendApi>,
    pub dispatcher: Arc<ReportDispatcher>,
    pub gate: Arc<SelectionGate>,
    pub settings: Arc<AppConfig>,
}

impl AppState {
    pub fn new(backend: BackendApi, config: AppConfig) -> Self {
        let session_ttl = std::time::Duration::from_secs(config.session_ttl_secs);
        Self {
            backend: Arc::new(backend),
            dispatcher: Arc::new(ReportDispatcher::new(session_ttl)),
            gate: Arc::new(SelectionGate::new()),
            settings: Arc::new(config),
        }
    }
}
