//! services/api/src/web/analyze.rs
//!
//! The public breed-detection route: forwards an upload to the vision service
//! and relays its candidates.

use axum::{extract::State, Json};
use livestock_core::{BreedCandidate, ServiceError};
use std::sync::Arc;
use tracing::info;

use crate::error::HttpError;
use crate::i18n::MessageKey;
use crate::web::extract::ApiMultipart;
use crate::web::locale::RequestLocale;
use crate::web::state::AppState;
use crate::web::upload::read_upload;

/// Run the breed detector on an uploaded photo.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body(content_type = "multipart/form-data", description = "Field `image` (file) and optional `language`."),
    responses(
        (status = 200, description = "Detections from the vision service", body = [Object]),
        (status = 400, description = "No image file in the request"),
        (status = 500, description = "The vision service failed")
    ),
    tag = "analyze"
)]
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<Json<Vec<BreedCandidate>>, HttpError> {
    let no_file = |reason: String| {
        state
            .http_error(ServiceError::Validation(reason), locale.0)
            .with_message(MessageKey::NoImageFile)
    };

    let form = read_upload(multipart, "image")
        .await
        .map_err(|e| no_file(e.to_string()))?;
    let image = form
        .image
        .as_ref()
        .ok_or_else(|| no_file("image file is required".to_string()))?;
    image.validate().map_err(|e| state.http_error(e, locale.0))?;

    // The detector takes a locale code, not a language name.
    let language = form.text("language").unwrap_or(locale.0.code());
    info!(language, "Forwarding image to the vision service.");

    let candidates = state
        .orchestrator
        .detect_breeds(image, language)
        .await
        .map_err(|e| state.http_error(e, locale.0))?;
    Ok(Json(candidates))
}
