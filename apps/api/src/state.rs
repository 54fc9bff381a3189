use std::sync::Arc;

use crate::flight::SingleFlight;
use crate::llm_client::GenerativeBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn GenerativeBackend>,
    pub extraction_flight: SingleFlight,
    pub analysis_flight: SingleFlight,
    pub autofill_flight: SingleFlight,
}

impl AppState {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            extraction_flight: SingleFlight::new("extraction"),
            analysis_flight: SingleFlight::new("analysis"),
            autofill_flight: SingleFlight::new("autofill"),
        }
    }
}
