//! Shared handler state.

use std::sync::Arc;

use crate::Analyzer;

/// State shared by all handlers. Cloned per request; the analyzer itself is
/// built once.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}
