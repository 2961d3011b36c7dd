//! services/api/src/web/locale.rs
//!
//! Extractor exposing the negotiated locale to handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use std::sync::Arc;

use crate::i18n::Locale;
use crate::web::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

impl RequestLocale {
    /// The language generated text should be written in.
    ///
    /// An explicit value wins; a bare locale code is expanded to its language name.
    pub fn response_language(self, explicit: Option<&str>) -> String {
        match explicit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(value) => Locale::from_tag(value)
                .map(|l| l.language_name().to_string())
                .unwrap_or_else(|| value.to_string()),
            None => self.0.language_name().to_string(),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for RequestLocale {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequestLocale(
            state.config.locales.resolve(&parts.headers, &parts.uri),
        ))
    }
}
