//! services/api/src/adapters/assistant_llm.rs
//!
//! This module contains the adapter for the conversational assistant model.
//! It implements the `AssistantService` port from the `core` crate.

use async_openai::{config::OpenAIConfig, types::CreateChatCompletionRequestArgs, Client};
use async_trait::async_trait;
use livestock_core::{
    domain::AnalysisImage,
    ports::{AssistantService, PortResult},
    prompts::GenerationPrompt,
};

use super::genai::{build_error, complete, messages};

/// An adapter that implements `AssistantService` using an OpenAI-compatible model.
#[derive(Clone)]
pub struct OpenAiAssistantAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAssistantAdapter {
    /// Creates a new `OpenAiAssistantAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl AssistantService for OpenAiAssistantAdapter {
    /// Returns the model's free-text reply, optionally grounded on a photo.
    async fn converse(
        &self,
        prompt: &GenerationPrompt,
        image: Option<&AnalysisImage>,
    ) -> PortResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages(prompt, image)?)
            .n(1)
            .build()
            .map_err(build_error)?;

        complete(&self.client, request, "Assistant").await
    }
}
