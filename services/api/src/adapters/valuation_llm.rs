//! services/api/src/adapters/valuation_llm.rs
//!
//! Adapter for the valuation model. Implements `ValuationGenerationService`.

use async_openai::{
    config::OpenAIConfig,
    types::{CreateChatCompletionRequestArgs, ResponseFormat},
    Client,
};
use async_trait::async_trait;
use livestock_core::{
    ports::{PortResult, ValuationGenerationService},
    prompts::GenerationPrompt,
};

use super::genai::{build_error, complete, messages};

#[derive(Clone)]
pub struct OpenAiValuationAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiValuationAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl ValuationGenerationService for OpenAiValuationAdapter {
    async fn generate_valuation(&self, prompt: &GenerationPrompt) -> PortResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages(prompt, None)?)
            .response_format(ResponseFormat::JsonObject)
            .n(1)
            .build()
            .map_err(build_error)?;

        complete(&self.client, request, "Valuation").await
    }
}
