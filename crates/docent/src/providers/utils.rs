use serde::Serialize;
use serde_json::Value;

use super::base::CompletionOptions;
use crate::models::message::ChatMessage;

/// Request body for an OpenAI-compatible `/chat/completions` endpoint
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i32>,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn streaming(model: &'a str, messages: &'a [ChatMessage]) -> Self {
        Self {
            model,
            messages,
            stream: true,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn single(
        model: &'a str,
        messages: &'a [ChatMessage],
        options: CompletionOptions,
    ) -> Self {
        Self {
            model,
            messages,
            stream: false,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }
}

/// The incremental text of a streamed chunk, `choices[0].delta.content`, if non-empty
pub fn delta_content(chunk: &Value) -> Option<&str> {
    chunk
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// The trimmed text of a completion, `choices[0].message.content`, if any remains
pub fn completion_text(response: &Value) -> Option<String> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(String::from)
}
