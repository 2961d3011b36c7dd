//! services/api/src/web/extract.rs
//!
//! Body extractors whose rejections use the service's localized error body
//! instead of axum's plain-text defaults.

use axum::{
    extract::{FromRequest, Multipart, Request},
    Json,
};
use livestock_core::ServiceError;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

use crate::error::HttpError;
use crate::i18n::MessageKey;
use crate::web::state::AppState;

/// A JSON body. Unparseable or mistyped input answers 400 `VALIDATION`.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T> FromRequest<Arc<AppState>> for ApiJson<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let locale = state.config.locales.resolve(req.headers(), req.uri());
        let path = req.uri().path().to_string();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                warn!(%path, reason = %rejection.body_text(), "Rejected JSON body.");
                Err(state
                    .http_error(ServiceError::Validation(rejection.body_text()), locale)
                    .with_message(MessageKey::InvalidRequest))
            }
        }
    }
}

/// A `multipart/form-data` body. A missing or malformed boundary answers 400 `VALIDATION`.
pub struct ApiMultipart(pub Multipart);

impl FromRequest<Arc<AppState>> for ApiMultipart {
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let locale = state.config.locales.resolve(req.headers(), req.uri());
        let path = req.uri().path().to_string();
        match Multipart::from_request(req, state).await {
            Ok(multipart) => Ok(ApiMultipart(multipart)),
            Err(rejection) => {
                warn!(%path, reason = %rejection.body_text(), "Rejected multipart body.");
                Err(state
                    .http_error(ServiceError::Validation(rejection.body_text()), locale)
                    .with_message(MessageKey::InvalidRequest))
            }
        }
    }
}
