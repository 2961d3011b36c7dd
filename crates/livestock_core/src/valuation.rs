//! crates/livestock_core/src/valuation.rs
//!
//! Turns a flat set of animal attributes into one valuation model call.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::domain::{AnimalAttributes, Valuation};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{with_timeout, ValuationGenerationService};
use crate::{prompts, schema};

#[derive(Clone)]
pub struct ValuationBuilder {
    service: Arc<dyn ValuationGenerationService>,
    timeout: Duration,
}

impl ValuationBuilder {
    pub fn new(service: Arc<dyn ValuationGenerationService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub async fn estimate(
        &self,
        attributes: &AnimalAttributes,
        language: &str,
    ) -> ServiceResult<Valuation> {
        if attributes.breed.trim().is_empty() {
            return Err(ServiceError::Validation("breed is required".to_string()));
        }
        if attributes.location.trim().is_empty() {
            return Err(ServiceError::Validation("location is required".to_string()));
        }

        let prompt = prompts::valuation_prompt(attributes, language);
        let raw = with_timeout(
            self.timeout,
            "valuation generation",
            self.service.generate_valuation(&prompt),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "Valuation generation call failed.");
            ServiceError::ValuationGeneration(e.to_string())
        })?;

        let valuation = schema::parse_valuation(&raw).map_err(|violation| {
            error!(%violation, "Valuation model returned an unusable response.");
            ServiceError::ValuationGeneration(violation.to_string())
        })?;
        info!(breed = %attributes.breed, value = %valuation.estimated_market_value_inr, "Valuation generated.");
        Ok(valuation)
    }
}
