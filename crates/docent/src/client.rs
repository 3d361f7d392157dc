use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ClientError;
use crate::models::message::ChatMessage;

pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    messages: &'a [ChatMessage],
    #[serde(rename = "documentText", skip_serializing_if = "Option::is_none")]
    document_text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct TranslatePayload<'a> {
    text: &'a str,
    #[serde(rename = "targetLanguage")]
    target_language: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// HTTP client for a running relay server
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new<S: Into<String>>(base_url: S) -> Result<Self, ClientError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Post a conversation and return the framed response body as it arrives
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        document_text: Option<&str>,
    ) -> Result<BoxStream<'static, reqwest::Result<Bytes>>, ClientError> {
        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&ChatPayload {
                messages,
                document_text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }
        Ok(response.bytes_stream().boxed())
    }

    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/api/translate"))
            .json(&TranslatePayload {
                text,
                target_language,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }
        let body: TranslateResponse = response.json().await?;
        Ok(body.translated_text)
    }
}
