//! services/api/src/web/generate.rs
//!
//! Handlers for the generative endpoints: the report for a photo, a market
//! valuation and the free-text assistant.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use livestock_core::{
    AnalysisImage, AnimalAttributes, ReportData, ReportRequest, ServiceError, Valuation,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::HttpError;
use crate::i18n::{Locale, MessageKey};
use crate::web::extract::ApiJson;
use crate::web::locale::RequestLocale;
use crate::web::state::AppState;
use crate::web::upload::FALLBACK_IMAGE_TYPE;

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    /// The photo as bare base64 or a `data:` URI.
    pub base64_image: Option<String>,
    pub mime_type: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    /// Top label from `/api/analyze`, if the client ran it.
    pub yolo_breed: Option<String>,
}

/// Accepts either a JSON number or a string for numeric form inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrText {
    fn into_text(self) -> String {
        match self {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValuationPayload {
    #[serde(default)]
    pub breed: String,
    #[schema(value_type = Option<String>)]
    pub age: Option<NumberOrText>,
    #[schema(value_type = Option<String>)]
    pub milk_yield: Option<NumberOrText>,
    #[serde(default)]
    pub health: String,
    #[serde(default)]
    pub location: String,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssistantPayload {
    pub message: Option<String>,
    pub image_base64: Option<String>,
    pub mime_type: Option<String>,
    pub language: Option<String>,
}

fn decode_image(payload: &str, mime_type: &str) -> Result<AnalysisImage, ServiceError> {
    if payload.trim_start().starts_with("data:") {
        AnalysisImage::from_data_uri(payload.trim())
    } else {
        AnalysisImage::from_base64(payload, mime_type)
    }
}

fn image_error(state: &AppState, error: ServiceError, locale: Locale) -> HttpError {
    state
        .http_error(error, locale)
        .with_message(MessageKey::ImageDataMissing)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Generate the three-section report for a photo.
#[utoipa::path(
    post,
    path = "/api/generate/report",
    request_body = ReportPayload,
    responses(
        (status = 200, description = "The validated report", body = Object),
        (status = 400, description = "Image data or location missing"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "The model failed or answered in the wrong shape")
    ),
    tag = "generate"
)]
pub async fn report_handler(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    ApiJson(req): ApiJson<ReportPayload>,
) -> Result<Json<ReportData>, HttpError> {
    let (payload, mime_type) = match (req.base64_image.as_deref(), req.mime_type.as_deref()) {
        (Some(payload), Some(mime)) if !payload.trim().is_empty() => (payload, mime),
        _ => {
            return Err(image_error(
                &state,
                ServiceError::Validation("base64Image and mimeType are required".to_string()),
                locale.0,
            ))
        }
    };
    let image = decode_image(payload, mime_type).map_err(|e| image_error(&state, e, locale.0))?;

    let language = locale.response_language(req.language.as_deref());
    let location = req.location.unwrap_or_default();
    let breed_hint = req
        .yolo_breed
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty());

    let report = state
        .orchestrator
        .generate_report(ReportRequest {
            image: &image,
            location: &location,
            language: &language,
            breed_hint,
        })
        .await
        .map_err(|e| state.http_error(e, locale.0))?;
    Ok(Json(report))
}

/// Estimate the market value of an animal.
#[utoipa::path(
    post,
    path = "/api/generate/valuation",
    request_body = ValuationPayload,
    responses(
        (status = 200, description = "Estimated value and factors", body = Object),
        (status = 400, description = "Breed or location missing"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Valuation failed")
    ),
    tag = "generate"
)]
pub async fn valuation_handler(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    ApiJson(req): ApiJson<ValuationPayload>,
) -> Result<Json<Valuation>, HttpError> {
    let language = locale.response_language(req.language.as_deref());
    let attributes = AnimalAttributes {
        breed: req.breed,
        age: req.age.map(NumberOrText::into_text).unwrap_or_default(),
        milk_yield: req.milk_yield.map(NumberOrText::into_text).unwrap_or_default(),
        health: req.health,
        location: req.location,
    };

    let valuation = state
        .valuations
        .estimate(&attributes, &language)
        .await
        .map_err(|e| state.http_error(e, locale.0))?;
    Ok(Json(valuation))
}

/// Ask the assistant a question, optionally about a photo. Replies in plain text.
#[utoipa::path(
    post,
    path = "/api/generate/assistant",
    request_body = AssistantPayload,
    responses(
        (status = 200, description = "The assistant's reply", body = String, content_type = "text/plain"),
        (status = 400, description = "Neither a message nor an image was sent"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "The assistant failed")
    ),
    tag = "generate"
)]
pub async fn assistant_handler(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    ApiJson(req): ApiJson<AssistantPayload>,
) -> Result<impl IntoResponse, HttpError> {
    let image = match req.image_base64.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(payload) => Some(
            decode_image(payload, req.mime_type.as_deref().unwrap_or(FALLBACK_IMAGE_TYPE))
                .map_err(|e| image_error(&state, e, locale.0))?,
        ),
        None => None,
    };
    let language = locale.response_language(req.language.as_deref());

    let reply = state
        .assistant
        .reply(req.message.as_deref(), image.as_ref(), &language)
        .await
        .map_err(|e| {
            let missing_input = matches!(e, ServiceError::Validation(_));
            let err = state.http_error(e, locale.0);
            if missing_input {
                err.with_message(MessageKey::MessageOrImageRequired)
            } else {
                err
            }
        })?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_inputs_accept_numbers_and_text() {
        let payload: ValuationPayload = serde_json::from_str(
            r#"{"breed":"Murrah","age":4,"milkYield":"12.5","health":"Good","location":"Karnal"}"#,
        )
        .unwrap();
        assert_eq!(payload.age.unwrap().into_text(), "4");
        assert_eq!(payload.milk_yield.unwrap().into_text(), "12.5");
    }

    #[test]
    fn images_decode_from_base64_or_data_uri() {
        let bare = decode_image("AQID", "image/png").unwrap();
        let uri = decode_image("data:image/png;base64,AQID", "ignored").unwrap();
        assert_eq!(bare, uri);
        assert!(decode_image("AQID", "text/plain").is_err());
    }
}
