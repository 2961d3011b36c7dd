//! crates/livestock_core/src/domain.rs
//!
//! Defines the core data structures for the application: stored analyses, the
//! three-section report produced by the generative model, vision candidates,
//! valuations and user accounts.
//!
//! The report types derive `serde` because their JSON shape is the contract
//! with the generative model and with the frontend.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

//=========================================================================================
// Images
//=========================================================================================

/// A raw uploaded photo plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AnalysisImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Decodes a bare base64 payload (no `data:` prefix).
    pub fn from_base64(payload: &str, mime_type: &str) -> ServiceResult<Self> {
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| ServiceError::Validation(format!("image is not valid base64: {}", e)))?;
        let image = Self::new(bytes, mime_type);
        image.validate()?;
        Ok(image)
    }

    /// Parses a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> ServiceResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| ServiceError::Validation("image must be a data URI".to_string()))?;
        let (mime_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| ServiceError::Validation("image data URI must be base64".to_string()))?;
        Self::from_base64(payload, mime_type)
    }

    pub fn validate(&self) -> ServiceResult<()> {
        if self.bytes.is_empty() {
            return Err(ServiceError::Validation("image payload is empty".to_string()));
        }
        if !self.mime_type.starts_with("image/") {
            return Err(ServiceError::Validation(format!(
                "unsupported image type '{}'",
                self.mime_type
            )));
        }
        Ok(())
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

//=========================================================================================
// Vision hint
//=========================================================================================

/// One detection returned by the vision hint service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedCandidate {
    pub breed: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<Vec<f64>>,
}

/// A non-empty set of candidates from a successful vision call.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionHint {
    candidates: Vec<BreedCandidate>,
}

impl VisionHint {
    /// Returns `None` for an empty detection list.
    pub fn from_candidates(candidates: Vec<BreedCandidate>) -> Option<Self> {
        if candidates.is_empty() {
            None
        } else {
            Some(Self { candidates })
        }
    }

    /// The highest-confidence candidate; the earliest one wins ties.
    pub fn top_candidate(&self) -> Option<&BreedCandidate> {
        self.candidates.iter().fold(None, |best, c| match best {
            Some(b) if b.confidence >= c.confidence => Some(b),
            _ => Some(c),
        })
    }

    /// The breed label handed to the report prompt, ignoring blank labels.
    pub fn top_breed(&self) -> Option<&str> {
        self.top_candidate()
            .map(|c| c.breed.trim())
            .filter(|b| !b.is_empty())
    }

    pub fn candidates(&self) -> &[BreedCandidate] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<BreedCandidate> {
        self.candidates
    }
}

//=========================================================================================
// Report sections
//=========================================================================================

/// The full report generated for one photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub advanced_breed_detector: BreedDetector,
    pub ai_veterinary_assistant: VeterinaryAssessment,
    pub hyper_local_advisor: LocalAdvice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedDetector {
    pub primary_breed: String,
    pub confidence_score: f64,
    pub breed_origin: String,
    pub breed_formation: String,
    pub key_identifiers: Vec<String>,
    #[serde(default)]
    pub secondary_breeds: Vec<SecondaryBreed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryBreed {
    pub breed: String,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VeterinaryAssessment {
    pub overall_health_status: HealthStatus,
    pub detailed_observations: Vec<HealthObservation>,
    pub veterinary_recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Good,
    Fair,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthObservation {
    pub area: String,
    pub observation: String,
    pub status: ObservationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationStatus {
    Positive,
    Neutral,
    Concern,
}

/// Care advice localized to the requested language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalAdvice {
    pub language: String,
    pub feeding_tip: String,
    pub housing_tip: String,
    pub seasonal_tip: String,
}

//=========================================================================================
// Stored analyses
//=========================================================================================

/// A persisted analysis. Immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub image: String,
    pub location: String,
    pub report_data: ReportData,
    pub yolo_data: Vec<BreedCandidate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to create an `AnalysisRecord`; the store assigns the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysis {
    pub owner_id: Uuid,
    pub image: String,
    pub location: String,
    pub report_data: ReportData,
    pub yolo_data: Vec<BreedCandidate>,
}

impl NewAnalysis {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.image.trim().is_empty() {
            return Err(ServiceError::Validation("image is required".to_string()));
        }
        if self.location.trim().is_empty() {
            return Err(ServiceError::Validation("location is required".to_string()));
        }
        self.report_data
            .validate()
            .map_err(|v| ServiceError::Validation(v.to_string()))
    }
}

//=========================================================================================
// Valuation
//=========================================================================================

/// Attributes describing an animal to be valued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalAttributes {
    pub breed: String,
    pub age: String,
    pub milk_yield: String,
    pub health: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    pub estimated_market_value_inr: String,
    pub valuation_factors: Vec<String>,
}

//=========================================================================================
// Accounts
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(breed: &str, confidence: f64) -> BreedCandidate {
        BreedCandidate {
            breed: breed.to_string(),
            confidence,
            bounding_box: None,
        }
    }

    #[test]
    fn empty_detection_list_is_no_hint() {
        assert!(VisionHint::from_candidates(vec![]).is_none());
    }

    #[test]
    fn top_breed_prefers_highest_confidence_then_first() {
        let hint = VisionHint::from_candidates(vec![
            candidate("Sahiwal", 0.40),
            candidate("Gir", 0.91),
            candidate("Tharparkar", 0.91),
        ])
        .unwrap();
        assert_eq!(hint.top_breed(), Some("Gir"));
        assert_eq!(hint.candidates().len(), 3);
    }

    #[test]
    fn blank_top_label_is_treated_as_absent() {
        let hint = VisionHint::from_candidates(vec![candidate("  ", 0.8)]).unwrap();
        assert_eq!(hint.top_breed(), None);
    }

    #[test]
    fn data_uri_round_trips() {
        let image = AnalysisImage::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        let uri = image.to_data_uri();
        assert_eq!(uri, "data:image/jpeg;base64,/9j/");
        assert_eq!(AnalysisImage::from_data_uri(&uri).unwrap(), image);
    }

    #[test]
    fn image_validation_rejects_empty_and_non_images() {
        assert!(matches!(
            AnalysisImage::new(vec![], "image/png").validate(),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            AnalysisImage::new(vec![1], "text/plain").validate(),
            Err(ServiceError::Validation(_))
        ));
        assert!(AnalysisImage::from_base64("not base64!!", "image/png").is_err());
    }

    #[test]
    fn candidate_keeps_bounding_box_when_present() {
        let raw = r#"{"breed":"Gir","confidence":0.91,"bounding_box":[1.0,2.0,3.0,4.0]}"#;
        let parsed: BreedCandidate = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.bounding_box.as_deref(), Some(&[1.0, 2.0, 3.0, 4.0][..]));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), raw);

        let bare: BreedCandidate = serde_json::from_str(r#"{"breed":"Gir","confidence":0.91}"#).unwrap();
        assert_eq!(serde_json::to_string(&bare).unwrap(), r#"{"breed":"Gir","confidence":0.91}"#);
    }
}
