//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::error::HttpError;
use crate::i18n::Locale;
use livestock_core::{
    AccountStore, AnalysisStore, AssistantBuilder, HybridOrchestrator, ServiceError,
    ValuationBuilder,
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub accounts: Arc<dyn AccountStore>,
    pub analyses: Arc<dyn AnalysisStore>,
    pub orchestrator: HybridOrchestrator,
    pub valuations: ValuationBuilder,
    pub assistant: AssistantBuilder,
}

impl AppState {
    /// Wraps a service error for the response, honouring `EXPOSE_ERROR_DETAIL`.
    pub fn http_error(&self, error: ServiceError, locale: Locale) -> HttpError {
        HttpError::new(error, locale).with_detail(self.config.expose_error_detail)
    }
}
