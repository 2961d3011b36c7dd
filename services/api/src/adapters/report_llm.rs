//! services/api/src/adapters/report_llm.rs
//!
//! This module contains the adapter for the report-generating model.
//! It implements the `ReportGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::{CreateChatCompletionRequestArgs, ResponseFormat},
    Client,
};
use async_trait::async_trait;
use livestock_core::{
    domain::AnalysisImage,
    ports::{PortResult, ReportGenerationService},
    prompts::GenerationPrompt,
};

use super::genai::{build_error, complete, messages};

/// An adapter that implements `ReportGenerationService` using an OpenAI-compatible model.
#[derive(Clone)]
pub struct OpenAiReportAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiReportAdapter {
    /// Creates a new `OpenAiReportAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl ReportGenerationService for OpenAiReportAdapter {
    /// Sends the photo with the report prompt and asks for a single JSON object back.
    async fn generate_report(
        &self,
        image: &AnalysisImage,
        prompt: &GenerationPrompt,
    ) -> PortResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages(prompt, Some(image))?)
            .response_format(ResponseFormat::JsonObject)
            .n(1)
            .build()
            .map_err(build_error)?;

        complete(&self.client, request, "Report generation").await
    }
}
