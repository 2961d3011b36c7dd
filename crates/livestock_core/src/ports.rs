//! crates/livestock_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::{
    AnalysisImage, AnalysisRecord, BreedCandidate, NewAnalysis, User, UserCredentials,
};
use crate::prompts::GenerationPrompt;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Bounds a remote call; expiry becomes `PortError::Timeout`.
pub async fn with_timeout<T, F>(limit: Duration, what: &str, call: F) -> PortResult<T>
where
    F: Future<Output = PortResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PortError::Timeout(format!("{} after {:?}", what, limit))),
    }
}

/// Rejects a record that is not owned by `identity`.
pub fn assert_ownership(record: &AnalysisRecord, identity: Uuid) -> PortResult<()> {
    if record.owner_id == identity {
        Ok(())
    } else {
        Err(PortError::Unauthorized)
    }
}

//=========================================================================================
// Storage Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persists a new analysis in one atomic write, assigning id and timestamps.
    async fn create_analysis(&self, analysis: NewAnalysis) -> PortResult<AnalysisRecord>;

    /// All analyses owned by `owner_id`, newest first.
    async fn list_analyses_by_owner(&self, owner_id: Uuid) -> PortResult<Vec<AnalysisRecord>>;

    /// Raw lookup without an ownership check. Prefer `get_analysis_for_owner`.
    async fn fetch_analysis(&self, analysis_id: Uuid) -> PortResult<AnalysisRecord>;

    /// Looks up a record and checks it belongs to `owner_id`.
    async fn get_analysis_for_owner(
        &self,
        analysis_id: Uuid,
        owner_id: Uuid,
    ) -> PortResult<AnalysisRecord> {
        let record = self.fetch_analysis(analysis_id).await?;
        assert_ownership(&record, owner_id)?;
        Ok(record)
    }
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a live session token to its user; expired tokens are `Unauthorized`.
    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, token: &str) -> PortResult<()>;
}

//=========================================================================================
// Remote Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait VisionHintService: Send + Sync {
    /// Runs the breed detector over an image.
    async fn detect_breeds(
        &self,
        image: &AnalysisImage,
        language: &str,
    ) -> PortResult<Vec<BreedCandidate>>;
}

#[async_trait]
pub trait ReportGenerationService: Send + Sync {
    /// Returns the model's raw JSON text for a report prompt.
    async fn generate_report(
        &self,
        image: &AnalysisImage,
        prompt: &GenerationPrompt,
    ) -> PortResult<String>;
}

#[async_trait]
pub trait ValuationGenerationService: Send + Sync {
    /// Returns the model's raw JSON text for a valuation prompt.
    async fn generate_valuation(&self, prompt: &GenerationPrompt) -> PortResult<String>;
}

#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Returns the model's free-text reply.
    async fn converse(
        &self,
        prompt: &GenerationPrompt,
        image: Option<&AnalysisImage>,
    ) -> PortResult<String>;
}
