use std::sync::Arc;

use crate::generation::backend::GenerativeBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable generative backend. Default: `GeminiClient`.
    pub backend: Arc<dyn GenerativeBackend>,
}
