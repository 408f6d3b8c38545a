//! Type conversions between Coursewright and OpenAI formats.

use crate::openai_compat::{ChatMessage, ChatRequest, ChatResponse};
use coursewright_core::{GenerateRequest, GenerateResponse, Output, TokenUsage};
use coursewright_error::{ModelError, ModelErrorKind};

/// Converts a GenerateRequest to OpenAI chat format.
///
/// The request's model wins over `default_model`.
pub fn to_chat_request(req: &GenerateRequest, default_model: &str) -> Result<ChatRequest, ModelError> {
    if req.messages().is_empty() {
        return Err(ModelError::new(ModelErrorKind::InvalidRequest(
            "Request contains no messages".to_string(),
        )));
    }

    let messages: Vec<ChatMessage> = req
        .messages()
        .iter()
        .map(|msg| ChatMessage {
            role: msg.role().to_string(),
            content: msg.content().clone(),
        })
        .collect();

    let model = req
        .model()
        .clone()
        .unwrap_or_else(|| default_model.to_string());

    let mut builder = ChatRequest::builder();
    builder.model(model).messages(messages);

    if let Some(max_tokens) = req.max_tokens() {
        builder.max_tokens(*max_tokens);
    }

    if let Some(temp) = req.temperature() {
        builder.temperature(*temp);
    }

    builder.build().map_err(|e| {
        ModelError::new(ModelErrorKind::Builder(format!(
            "Failed to build request: {}",
            e
        )))
    })
}

/// Converts an OpenAI chat response to a GenerateResponse.
///
/// A choice with null content becomes an empty text output.
pub fn from_chat_response(response: &ChatResponse) -> Result<GenerateResponse, ModelError> {
    let content = response
        .choices
        .first()
        .map(|choice| choice.message.content.clone().unwrap_or_default())
        .ok_or_else(|| {
            ModelError::new(ModelErrorKind::ResponseParsing(
                "No choices in response".to_string(),
            ))
        })?;

    let usage = response.usage.as_ref().and_then(|u| {
        match (u.prompt_tokens, u.completion_tokens, u.total_tokens) {
            (Some(input), Some(output), Some(total)) => Some(TokenUsage::new(input, output, total)),
            _ => None,
        }
    });

    GenerateResponse::builder()
        .outputs(vec![Output::Text(content)])
        .usage(usage)
        .build()
        .map_err(|e| {
            ModelError::new(ModelErrorKind::Builder(format!(
                "Failed to build response: {}",
                e
            )))
        })
}
