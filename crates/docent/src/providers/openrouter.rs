use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

use super::base::{ByteStream, CompletionOptions, Provider};
use super::configs::OpenRouterProviderConfig;
use super::utils::{completion_text, ChatCompletionRequest};
use crate::errors::ProviderError;
use crate::models::message::ChatMessage;

pub struct OpenRouterProvider {
    client: Client,
    config: OpenRouterProviderConfig,
}

impl OpenRouterProvider {
    pub fn new(config: OpenRouterProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenRouterProviderConfig {
        &self.config
    }

    async fn post(&self, payload: &ChatCompletionRequest<'_>) -> Result<Response, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .header("HTTP-Referer", self.config.referer.as_str())
            .header("X-Title", self.config.title.as_str())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl Provider for OpenRouterProvider {
    async fn stream(&self, messages: &[ChatMessage]) -> Result<ByteStream, ProviderError> {
        let payload = ChatCompletionRequest::streaming(&self.config.model, messages);
        let response = self.post(&payload).await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ProviderError::from))
            .boxed())
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, ProviderError> {
        let payload = ChatCompletionRequest::single(&self.config.model, messages, options);
        let response: Value = self.post(&payload).await?.json().await?;

        completion_text(&response).ok_or(ProviderError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::relay::reframe;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> OpenRouterProviderConfig {
        OpenRouterProviderConfig {
            host: server.uri(),
            api_key: "test_api_key".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            referer: "http://docs.example".to_string(),
            title: "Docent Test".to_string(),
        }
    }

    async fn setup_mock_server(response: ResponseTemplate) -> (MockServer, OpenRouterProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test_api_key"))
            .and(header("HTTP-Referer", "http://docs.example"))
            .and(header("X-Title", "Docent Test"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        let provider = OpenRouterProvider::new(config_for(&mock_server)).unwrap();
        (mock_server, provider)
    }

    #[tokio::test]
    async fn test_complete_basic() -> anyhow::Result<()> {
        let response_body = json!({
            "id": "gen-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": " Bonjour \n"
                },
                "finish_reason": "stop"
            }]
        });
        let (mock_server, provider) =
            setup_mock_server(ResponseTemplate::new(200).set_body_json(response_body)).await;

        let messages = vec![ChatMessage::system("Translate to fr"), ChatMessage::user("Hello")];
        let text = provider
            .complete(&messages, CompletionOptions::new(Some(0.5), Some(4000)))
            .await?;
        assert_eq!(text, "Bonjour");

        let requests = mock_server.received_requests().await.unwrap();
        let body: Value = requests[0].body_json()?;
        assert_eq!(body["model"], "openai/gpt-4o-mini");
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "Hello"}));
        assert_eq!(body["temperature"], json!(0.5));
        assert_eq!(body["max_tokens"], json!(4000));
        assert!(body.get("stream").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_complete_empty_choice() {
        let (_, provider) = setup_mock_server(
            ResponseTemplate::new(200).set_body_json(json!({"choices": []})),
        )
        .await;

        let result = provider
            .complete(&[ChatMessage::user("Hello")], CompletionOptions::default())
            .await;
        assert!(matches!(result, Err(ProviderError::EmptyCompletion)));
    }

    #[tokio::test]
    async fn test_error_status() {
        let (_, provider) = setup_mock_server(
            ResponseTemplate::new(401).set_body_string("{\"error\":\"bad key\"}"),
        )
        .await;

        let result = provider.stream(&[ChatMessage::user("Hello")]).await;
        match result {
            Err(ProviderError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("bad key"));
            }
            _ => panic!("Expected status error"),
        }
    }

    #[tokio::test]
    async fn test_stream_requests_streaming_and_relays_body() -> anyhow::Result<()> {
        let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\n\
                   data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n\n\
                   data: [DONE]\n\n";
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
            .mount(&mock_server)
            .await;
        let provider = OpenRouterProvider::new(config_for(&mock_server))?;

        let upstream = provider.stream(&[ChatMessage::user("Hello")]).await?;
        let frames: Vec<_> = reframe(upstream).collect().await;
        let output: String = frames
            .iter()
            .map(|frame| String::from_utf8_lossy(frame).into_owned())
            .collect();

        assert_eq!(
            output,
            "0:{\"type\":\"text-delta\",\"textDelta\":\"A\"}\n\
             0:{\"type\":\"text-delta\",\"textDelta\":\"B\"}\n"
        );
        Ok(())
    }
}
