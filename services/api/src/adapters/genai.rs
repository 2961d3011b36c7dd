//! services/api/src/adapters/genai.rs
//!
//! Pieces shared by the chat-completion adapters: message building, the image
//! part and extraction of the reply text.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequest, CreateChatCompletionResponse, ImageDetail, ImageUrlArgs,
    },
    Client,
};
use livestock_core::{
    domain::AnalysisImage,
    ports::{PortError, PortResult},
    prompts::GenerationPrompt,
};

/// Builds a configured client. `api_base` points it at any OpenAI-compatible endpoint.
pub fn build_client(api_key: &str, api_base: Option<&str>) -> Client<OpenAIConfig> {
    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }
    Client::with_config(config)
}

pub(crate) fn build_error(e: OpenAIError) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// System message plus a user message, with the image attached when given.
pub(crate) fn messages(
    prompt: &GenerationPrompt,
    image: Option<&AnalysisImage>,
) -> PortResult<Vec<ChatCompletionRequestMessage>> {
    let system = ChatCompletionRequestSystemMessageArgs::default()
        .content(prompt.system.as_str())
        .build()
        .map_err(build_error)?
        .into();

    let user = match image {
        None => ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.user.as_str())
            .build()
            .map_err(build_error)?,
        Some(image) => {
            let text: ChatCompletionRequestUserMessageContentPart =
                ChatCompletionRequestMessageContentPartTextArgs::default()
                    .text(prompt.user.as_str())
                    .build()
                    .map_err(build_error)?
                    .into();
            let picture: ChatCompletionRequestUserMessageContentPart =
                ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(
                        ImageUrlArgs::default()
                            .url(image.to_data_uri())
                            .detail(ImageDetail::High)
                            .build()
                            .map_err(build_error)?,
                    )
                    .build()
                    .map_err(build_error)?
                    .into();
            ChatCompletionRequestUserMessageArgs::default()
                .content(vec![text, picture])
                .build()
                .map_err(build_error)?
        }
    };

    Ok(vec![system, user.into()])
}

/// Sends the request and returns the first choice's text.
pub(crate) async fn complete(
    client: &Client<OpenAIConfig>,
    request: CreateChatCompletionRequest,
    what: &str,
) -> PortResult<String> {
    let response: CreateChatCompletionResponse = client
        .chat()
        .create(request)
        .await
        .map_err(|e| PortError::Unexpected(format!("{} request failed: {}", what, e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| PortError::Unexpected(format!("{} response contained no text content.", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> GenerationPrompt {
        GenerationPrompt {
            system: "You are a livestock expert.".to_string(),
            user: "Identify this animal.".to_string(),
        }
    }

    #[test]
    fn text_only_prompt_has_two_messages() {
        let built = messages(&prompt(), None).unwrap();
        assert_eq!(built.len(), 2);
        assert!(matches!(built[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(built[1], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn image_is_sent_as_data_uri_part() {
        let image = AnalysisImage::new(vec![1, 2, 3], "image/png");
        let built = messages(&prompt(), Some(&image)).unwrap();
        let json = serde_json::to_string(&built[1]).unwrap();
        assert!(json.contains("data:image/png;base64,AQID"));
        assert!(json.contains("Identify this animal."));
    }
}
