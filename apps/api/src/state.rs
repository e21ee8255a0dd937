use std::sync::Arc;

use crate::assistant::sessions::ChatStore;
use crate::backend::MedicalBackend;
use crate::layout::ReportLayout;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Remote medical API. `HttpBackend` in production, stubs in tests.
    pub backend: Arc<dyn MedicalBackend>,
    /// Page geometry for notices. A4 portrait, two 80mm columns.
    pub report_layout: ReportLayout,
    /// In-memory chat transcripts, bounded in count and idle time.
    pub chat_sessions: Arc<ChatStore>,
}

impl AppState {
    pub fn new(backend: Arc<dyn MedicalBackend>, report_layout: ReportLayout) -> Self {
        Self {
            backend,
            report_layout,
            chat_sessions: Arc::new(ChatStore::default()),
        }
    }

    pub fn with_chat_store(mut self, store: ChatStore) -> Self {
        self.chat_sessions = Arc::new(store);
        self
    }
}
