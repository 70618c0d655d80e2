use std::sync::Arc;

use sqlx::PgPool;

use crate::classifier::ThoughtClassifier;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// `None` when no Anthropic key is configured.
    pub classifier: Option<Arc<dyn ThoughtClassifier>>,
}

impl AppState {
    pub fn classifier(&self) -> Result<Arc<dyn ThoughtClassifier>, crate::errors::AppError> {
        self.classifier
            .clone()
            .ok_or(crate::errors::AppError::AiUnavailable)
    }
}
