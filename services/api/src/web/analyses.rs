//! services/api/src/web/analyses.rs
//!
//! Handlers for the saved-analysis history: list, create, fetch one, and the
//! server-side hybrid flow that analyzes an upload and stores the result.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use livestock_core::{
    schema, AnalysisRecord, BreedCandidate, HybridAnalysisRequest, NewAnalysis, ReportData,
    ServiceError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::HttpError;
use crate::i18n::MessageKey;
use crate::web::extract::{ApiJson, ApiMultipart};
use crate::web::locale::RequestLocale;
use crate::web::middleware::AuthenticatedUser;
use crate::web::state::AppState;
use crate::web::upload::read_upload;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A stored analysis as returned to the client.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// The photo as a `data:` URI.
    pub image: String,
    pub location: String,
    #[schema(value_type = Object)]
    pub report_data: ReportData,
    #[schema(value_type = Vec<Object>)]
    pub yolo_data: Vec<BreedCandidate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AnalysisRecord> for AnalysisResponse {
    fn from(record: AnalysisRecord) -> Self {
        Self {
            id: record.id,
            owner_id: record.owner_id,
            image: record.image,
            location: record.location,
            report_data: record.report_data,
            yolo_data: record.yolo_data,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// The payload for saving a report produced client-side.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnalysisRequest {
    pub image: Option<String>,
    pub location: Option<String>,
    /// The three-section report, exactly as returned by `/api/generate/report`.
    #[schema(value_type = Object)]
    pub analysis_data: Option<serde_json::Value>,
    /// Detector candidates; absent or `null` both mean none.
    #[schema(value_type = Option<Vec<Object>>)]
    pub yolo_data: Option<Vec<BreedCandidate>>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List the caller's analyses, newest first.
#[utoipa::path(
    get,
    path = "/api/analyses",
    responses(
        (status = 200, description = "The caller's analyses", body = [AnalysisResponse]),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    ),
    tag = "analyses"
)]
pub async fn list_analyses_handler(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    Extension(AuthenticatedUser(owner_id)): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<AnalysisResponse>>, HttpError> {
    let records = state
        .analyses
        .list_analyses_by_owner(owner_id)
        .await
        .map_err(|e| {
            state
                .http_error(ServiceError::from_store(e), locale.0)
                .with_message(MessageKey::ServerError)
        })?;
    Ok(Json(records.into_iter().map(AnalysisResponse::from).collect()))
}

/// Save a finished analysis for the caller.
///
/// The report is validated against the three-section schema before anything is written.
#[utoipa::path(
    post,
    path = "/api/analyses",
    request_body = CreateAnalysisRequest,
    responses(
        (status = 201, description = "Analysis saved", body = AnalysisResponse),
        (status = 400, description = "Missing fields or malformed report"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    ),
    tag = "analyses"
)]
pub async fn create_analysis_handler(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    Extension(AuthenticatedUser(owner_id)): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateAnalysisRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let invalid = |reason: String| state.http_error(ServiceError::Validation(reason), locale.0);

    let report_value = req
        .analysis_data
        .ok_or_else(|| invalid("analysisData is required".to_string()))?;
    let report_data = schema::parse_report(&report_value.to_string())
        .map_err(|violation| invalid(violation.to_string()))?;

    let new_analysis = NewAnalysis {
        owner_id,
        image: req.image.unwrap_or_default(),
        location: req.location.unwrap_or_default().trim().to_string(),
        report_data,
        yolo_data: req.yolo_data.unwrap_or_default(),
    };
    new_analysis
        .validate()
        .map_err(|e| state.http_error(e, locale.0))?;

    let record = state
        .analyses
        .create_analysis(new_analysis)
        .await
        .map_err(|e| {
            error!(%owner_id, error = %e, "Failed to save analysis.");
            state
                .http_error(ServiceError::from_store(e), locale.0)
                .with_message(MessageKey::SaveError)
        })?;

    info!(%owner_id, analysis_id = %record.id, "Analysis saved.");
    Ok((StatusCode::CREATED, Json(AnalysisResponse::from(record))))
}

/// Fetch one of the caller's analyses.
///
/// A record owned by someone else is reported exactly like a missing one.
#[utoipa::path(
    get,
    path = "/api/analyses/{id}",
    params(
        ("id" = String, Path, description = "The analysis id.")
    ),
    responses(
        (status = 200, description = "The analysis", body = AnalysisResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such analysis for this user"),
        (status = 500, description = "Internal server error")
    ),
    tag = "analyses"
)]
pub async fn get_analysis_handler(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    Extension(AuthenticatedUser(owner_id)): Extension<AuthenticatedUser>,
    Path(raw_id): Path<String>,
) -> Result<Json<AnalysisResponse>, HttpError> {
    let not_found = |what: String| {
        state
            .http_error(ServiceError::NotFound(what), locale.0)
            .with_message(MessageKey::AnalysisNotFound)
    };

    let analysis_id = Uuid::parse_str(raw_id.trim())
        .map_err(|_| not_found(format!("'{}' is not an analysis id", raw_id)))?;

    let record = state
        .analyses
        .get_analysis_for_owner(analysis_id, owner_id)
        .await
        .map_err(|e| match ServiceError::from_store(e) {
            ServiceError::NotAuthorized => {
                warn!(%owner_id, %analysis_id, "Attempt to read another user's analysis.");
                not_found(format!("Analysis {} not found", analysis_id))
            }
            ServiceError::NotFound(what) => not_found(what),
            other => state
                .http_error(other, locale.0)
                .with_message(MessageKey::ServerError),
        })?;

    Ok(Json(record.into()))
}

/// Analyze an uploaded photo on the server and store the result.
///
/// Form fields: `image` (file), `location`, optional `language`.
#[utoipa::path(
    post,
    path = "/api/analyses/hybrid",
    request_body(content_type = "multipart/form-data", description = "Fields `image` (file), `location` and optional `language`."),
    responses(
        (status = 201, description = "Analysis generated and saved", body = AnalysisResponse),
        (status = 400, description = "Missing image or location"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Report generation or persistence failed")
    ),
    tag = "analyses"
)]
pub async fn hybrid_analysis_handler(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    Extension(AuthenticatedUser(owner_id)): Extension<AuthenticatedUser>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<impl IntoResponse, HttpError> {
    let form = read_upload(multipart, "image").await.map_err(|e| {
        state
            .http_error(ServiceError::Validation(e.to_string()), locale.0)
            .with_message(MessageKey::InvalidRequest)
    })?;

    let language = locale.response_language(form.text("language"));
    let location = form.text("location").unwrap_or_default().to_string();
    let image = form.image.ok_or_else(|| {
        state
            .http_error(
                ServiceError::Validation("image file is required".to_string()),
                locale.0,
            )
            .with_message(MessageKey::NoImageFile)
    })?;

    let record = state
        .orchestrator
        .run_hybrid_analysis(
            HybridAnalysisRequest {
                image,
                location,
                language,
            },
            owner_id,
        )
        .await
        .map_err(|e| {
            let lost_on_save = matches!(e, ServiceError::Persistence(_));
            let err = state.http_error(e, locale.0);
            if lost_on_save {
                err.with_message(MessageKey::SaveError)
            } else {
                err
            }
        })?;

    Ok((StatusCode::CREATED, Json(AnalysisResponse::from(record))))
}
