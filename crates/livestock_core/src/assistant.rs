//! crates/livestock_core/src/assistant.rs
//!
//! Forwards a chat message, and optionally one photo, to the assistant model.
//! The reply is free text and is passed through as-is.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::domain::AnalysisImage;
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{with_timeout, AssistantService};
use crate::prompts;

#[derive(Clone)]
pub struct AssistantBuilder {
    service: Arc<dyn AssistantService>,
    timeout: Duration,
}

impl AssistantBuilder {
    pub fn new(service: Arc<dyn AssistantService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub async fn reply(
        &self,
        message: Option<&str>,
        image: Option<&AnalysisImage>,
        language: &str,
    ) -> ServiceResult<String> {
        let has_message = message.map_or(false, |m| !m.trim().is_empty());
        if !has_message && image.is_none() {
            return Err(ServiceError::Validation(
                "a message or an image is required".to_string(),
            ));
        }
        if let Some(image) = image {
            image.validate()?;
        }

        let prompt = prompts::assistant_prompt(message, language);
        let reply = with_timeout(
            self.timeout,
            "assistant",
            self.service.converse(&prompt, image),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "Assistant call failed.");
            ServiceError::Assistant(e.to_string())
        })?;

        info!(with_image = image.is_some(), chars = reply.len(), "Assistant reply generated.");
        Ok(reply)
    }
}
