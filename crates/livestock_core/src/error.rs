//! crates/livestock_core/src/error.rs
//!
//! Domain-level failure kinds surfaced by the orchestrator, the request
//! builders and the analysis store contract.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Bad or missing input. Raised before any remote call is made.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The caller is not allowed to see the resource, or is not authenticated.
    #[error("Not authorized")]
    NotAuthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    /// A generative model answered, but not in the required shape.
    #[error("Upstream returned an unusable response: {0}")]
    UpstreamFormat(String),

    #[error("Report generation failed: {0}")]
    ReportGeneration(String),

    #[error("Valuation generation failed: {0}")]
    ValuationGeneration(String),

    #[error("Assistant request failed: {0}")]
    Assistant(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// Only surfaced by the direct vision route; the orchestrator absorbs it.
    #[error("Vision hint unavailable: {0}")]
    VisionHint(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Maps a storage-layer error onto the store contract's failure kinds.
    pub fn from_store(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => ServiceError::NotFound(what),
            PortError::Unauthorized => ServiceError::NotAuthorized,
            PortError::Conflict(what) => ServiceError::Validation(what),
            other => ServiceError::Persistence(other.to_string()),
        }
    }

    /// A stable, machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION",
            ServiceError::NotAuthorized => "NOT_AUTHORIZED",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::UpstreamFormat(_) => "UPSTREAM_FORMAT",
            ServiceError::ReportGeneration(_) => "REPORT_GENERATION",
            ServiceError::ValuationGeneration(_) => "VALUATION_GENERATION",
            ServiceError::Assistant(_) => "ASSISTANT",
            ServiceError::Persistence(_) => "PERSISTENCE",
            ServiceError::VisionHint(_) => "VISION_HINT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_contract_kinds() {
        assert!(matches!(
            ServiceError::from_store(PortError::NotFound("x".into())),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            ServiceError::from_store(PortError::Unauthorized),
            ServiceError::NotAuthorized
        ));
        assert!(matches!(
            ServiceError::from_store(PortError::Unexpected("pool closed".into())),
            ServiceError::Persistence(_)
        ));
        assert!(matches!(
            ServiceError::from_store(PortError::Timeout("db".into())),
            ServiceError::Persistence(_)
        ));
    }
}
