//! Application state.

use sift_llm::analyzer::{Analyzer, Backend};
use std::sync::Arc;

/// Application state shared across handlers. Read-only after startup.
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

    pub fn model_name(&self) -> Option<&str> {
        match self.analyzer.backend() {
            Backend::Ready(client) => Some(client.model_name()),
            Backend::Unconfigured(_) => None,
        }
    }
}
