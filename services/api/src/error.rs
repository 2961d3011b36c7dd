//! services/api/src/error.rs
//!
//! Defines the startup error type for the API service and the error response
//! returned by HTTP handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use livestock_core::ServiceError;
use serde::Serialize;
use tracing::{error, warn};

use crate::config::ConfigError;
use crate::i18n::{Locale, MessageKey};

/// The primary error type for starting the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a failure to build an outbound HTTP client.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//=========================================================================================
// HTTP Error Responses
//=========================================================================================

/// A failed request, rendered as a localized JSON body.
#[derive(Debug)]
pub struct HttpError {
    error: ServiceError,
    locale: Locale,
    message: Option<MessageKey>,
    expose_detail: bool,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl HttpError {
    pub fn new(error: ServiceError, locale: Locale) -> Self {
        Self {
            error,
            locale,
            message: None,
            expose_detail: false,
        }
    }

    /// Overrides the default message for the error kind.
    pub fn with_message(mut self, key: MessageKey) -> Self {
        self.message = Some(key);
        self
    }

    /// Mirrors the internal error text into the body for debugging.
    pub fn with_detail(mut self, expose: bool) -> Self {
        self.expose_detail = expose;
        self
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotAuthorized => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::UpstreamFormat(_)
            | ServiceError::ReportGeneration(_)
            | ServiceError::ValuationGeneration(_)
            | ServiceError::Assistant(_)
            | ServiceError::Persistence(_)
            | ServiceError::VisionHint(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> MessageKey {
        self.message.unwrap_or(match self.error {
            ServiceError::Validation(_) => MessageKey::InvalidRequest,
            ServiceError::NotAuthorized => MessageKey::NotAuthorized,
            ServiceError::NotFound(_) => MessageKey::AnalysisNotFound,
            ServiceError::UpstreamFormat(_) | ServiceError::ReportGeneration(_) => {
                MessageKey::ReportFailed
            }
            ServiceError::ValuationGeneration(_) => MessageKey::ValuationFailed,
            ServiceError::Assistant(_) => MessageKey::AssistantFailed,
            ServiceError::Persistence(_) => MessageKey::ServerError,
            ServiceError::VisionHint(_) => MessageKey::AnalysisFailed,
        })
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error.code();
        if status.is_server_error() {
            error!(code, error = %self.error, "Request failed.");
        } else {
            warn!(code, error = %self.error, "Request rejected.");
        }

        let body = ErrorBody {
            code,
            message: self.locale.message(self.message_key()),
            detail: self.expose_detail.then(|| self.error.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::NotAuthorized, StatusCode::UNAUTHORIZED),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::UpstreamFormat("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Persistence("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(HttpError::new(error, Locale::En).status(), status);
        }
    }

    #[test]
    fn message_follows_locale_and_override() {
        let err = HttpError::new(ServiceError::NotFound("Analysis 1".into()), Locale::Hi);
        assert_eq!(Locale::Hi.message(err.message_key()), "विश्लेषण नहीं मिला।");

        let err = HttpError::new(ServiceError::Persistence("disk".into()), Locale::En)
            .with_message(MessageKey::SaveError);
        assert_eq!(err.message_key(), MessageKey::SaveError);
    }
}
