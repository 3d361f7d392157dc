use crate::error::{ApiError, MESSAGES_REQUIRED};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use bytes::Bytes;
use docent::{models::message::ChatMessage, prompt, stream::relay::reframe};
use futures::{stream::StreamExt, Stream};
use serde_json::Value;
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tokio_stream::wrappers::ReceiverStream;

/// Newline-delimited `0:` frames, written as they are produced
pub struct TextStreamResponse {
    rx: ReceiverStream<Bytes>,
}

impl TextStreamResponse {
    fn new(rx: ReceiverStream<Bytes>) -> Self {
        Self { rx }
    }
}

impl Stream for TextStreamResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx).map(|opt| opt.map(Ok))
    }
}

impl IntoResponse for TextStreamResponse {
    fn into_response(self) -> Response {
        let body = Body::from_stream(self);
        (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
            ],
            body,
        )
            .into_response()
    }
}

struct ChatRequest {
    messages: Vec<ChatMessage>,
    document_text: Option<String>,
}

impl ChatRequest {
    fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            tracing::error!("Chat request is not valid JSON: {}", e);
            ApiError::Chat
        })?;

        let messages = match value.get("messages") {
            Some(messages @ Value::Array(_)) => {
                serde_json::from_value::<Vec<ChatMessage>>(messages.clone()).map_err(|e| {
                    tracing::warn!("Rejecting chat request with invalid messages: {}", e);
                    ApiError::Validation(MESSAGES_REQUIRED)
                })?
            }
            _ => return Err(ApiError::Validation(MESSAGES_REQUIRED)),
        };

        let document_text = value
            .get("documentText")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(String::from);

        Ok(Self {
            messages,
            document_text,
        })
    }
}

/// Move frames to the response channel until either side is done.
///
/// Returns as soon as the caller goes away, dropping the upstream stream with it.
pub(crate) async fn forward<S>(frames: S, tx: mpsc::Sender<Bytes>)
where
    S: Stream<Item = Bytes>,
{
    tokio::pin!(frames);

    loop {
        tokio::select! {
            biased;
            _ = tx.closed() => {
                tracing::debug!("Client disconnected, dropping upstream stream");
                break;
            }
            frame = frames.next() => match frame {
                Some(frame) => {
                    if let Err(e) = tx.send(frame).await {
                        tracing::error!("Error sending frame through channel: {}", e);
                        break;
                    }
                }
                None => break,
            }
        }
    }
}

async fn handler(State(state): State<AppState>, body: Bytes) -> Result<TextStreamResponse, ApiError> {
    let request = ChatRequest::parse(&body)?;
    let deadline = Instant::now() + state.chat_max_duration;
    let messages = prompt::chat_messages(request.document_text.as_deref(), &request.messages);

    let upstream = match timeout_at(deadline, state.provider.stream(&messages)).await {
        Ok(Ok(upstream)) => upstream,
        Ok(Err(e)) => {
            tracing::error!("Chat request failed: {}", e);
            return Err(ApiError::Chat);
        }
        Err(_) => {
            tracing::error!(
                "Chat request timed out after {:?} before streaming started",
                state.chat_max_duration
            );
            return Err(ApiError::Chat);
        }
    };

    let (tx, rx) = mpsc::channel(100);
    let max_duration = state.chat_max_duration;
    tokio::spawn(async move {
        if timeout_at(deadline, forward(reframe(upstream), tx)).await.is_err() {
            tracing::warn!("Chat stream cut off after {:?}", max_duration);
        }
    });

    Ok(TextStreamResponse::new(ReceiverStream::new(rx)))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::configure;
    use async_trait::async_trait;
    use axum::http::{Request, StatusCode};
    use docent::errors::ProviderError;
    use docent::providers::base::{ByteStream, CompletionOptions, Provider};
    use docent::providers::configs::OpenRouterProviderConfig;
    use docent::providers::openrouter::OpenRouterProvider;
    use futures::stream;
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TWO_DELTAS: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\
                              data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n\
                              data: [DONE]\n";

    fn state_for(provider: Arc<dyn Provider>, max_duration: Duration) -> AppState {
        AppState::new(provider, max_duration, CompletionOptions::new(Some(0.3), Some(4000)))
    }

    fn openrouter(server: &MockServer) -> Arc<dyn Provider> {
        let mut config = OpenRouterProviderConfig::new("test-key");
        config.host = server.uri();
        Arc::new(OpenRouterProvider::new(config).unwrap())
    }

    async fn upstream_with(body: &str, status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(status).set_body_raw(body.to_string(), "text/event-stream"),
            )
            .mount(&server)
            .await;
        server
    }

    async fn post_chat(state: AppState, body: String) -> Response {
        configure(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_streams_reframed_deltas() {
        let server = upstream_with(TWO_DELTAS, 200).await;
        let state = state_for(openrouter(&server), Duration::from_secs(30));

        let body = json!({"messages": [{"role": "user", "content": "hi"}]}).to_string();
        let response = post_chat(state, body).await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers[header::CONNECTION], "keep-alive");

        assert_eq!(
            body_string(response).await,
            "0:{\"type\":\"text-delta\",\"textDelta\":\"A\"}\n\
             0:{\"type\":\"text-delta\",\"textDelta\":\"B\"}\n"
        );
    }

    #[tokio::test]
    async fn test_outbound_payload_prepends_system_message() {
        let server = upstream_with(TWO_DELTAS, 200).await;
        let state = state_for(openrouter(&server), Duration::from_secs(30));

        let messages = json!([
            {"role": "user", "content": "What is this about?"},
            {"role": "assistant", "content": "A report."},
            {"role": "user", "content": "Go on"}
        ]);
        let body = json!({"messages": messages, "documentText": "Quarterly numbers"}).to_string();
        let response = post_chat(state, body).await;
        body_string(response).await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();

        assert_eq!(sent["stream"], true);
        let sent_messages = sent["messages"].as_array().unwrap();
        assert_eq!(sent_messages.len(), 4);
        assert_eq!(sent_messages[0]["role"], "system");
        let system = sent_messages[0]["content"].as_str().unwrap();
        assert!(system.starts_with(prompt::CHAT_PREAMBLE));
        assert!(system.ends_with("Quarterly numbers"));
        assert_eq!(Value::Array(sent_messages[1..].to_vec()), messages);
    }

    #[tokio::test]
    async fn test_no_document_section_without_text() {
        let server = upstream_with(TWO_DELTAS, 200).await;
        let state = state_for(openrouter(&server), Duration::from_secs(30));

        let body = json!({"messages": [{"role": "user", "content": "hi"}]}).to_string();
        body_string(post_chat(state, body).await).await;

        let requests = server.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["messages"][0]["content"], prompt::CHAT_PREAMBLE);
    }

    #[tokio::test]
    async fn test_rejects_missing_or_invalid_messages() {
        let server = upstream_with(TWO_DELTAS, 200).await;
        let state = state_for(openrouter(&server), Duration::from_secs(30));

        for body in [
            json!({}),
            json!({"messages": "not-an-array"}),
            json!({"messages": [{"role": "narrator", "content": "x"}]}),
        ] {
            let response = post_chat(state.clone(), body.to_string()).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                body_string(response).await,
                json!({"error": "Messages array is required"}).to_string()
            );
        }

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_generic() {
        let server = upstream_with("{\"error\":\"invalid key\"}", 401).await;
        let state = state_for(openrouter(&server), Duration::from_secs(30));

        let body = json!({"messages": [{"role": "user", "content": "hi"}]}).to_string();
        let response = post_chat(state, body).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            json!({"error": "Chat request failed"}).to_string()
        );
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let server = upstream_with(TWO_DELTAS, 200).await;
        let state = state_for(openrouter(&server), Duration::from_secs(30));

        let response = post_chat(state, "{not json".to_string()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// A provider that never produces anything, either before or after streaming starts
    struct StalledProvider {
        stall_before_stream: bool,
    }

    #[async_trait]
    impl Provider for StalledProvider {
        async fn stream(&self, _messages: &[ChatMessage]) -> Result<ByteStream, ProviderError> {
            if self.stall_before_stream {
                futures::future::pending::<()>().await;
            }
            Ok(stream::pending().boxed())
        }

        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _options: CompletionOptions,
        ) -> Result<String, ProviderError> {
            Err(ProviderError::EmptyCompletion)
        }
    }

    #[tokio::test]
    async fn test_timeout_before_streaming() {
        let provider = Arc::new(StalledProvider {
            stall_before_stream: true,
        });
        let state = state_for(provider, Duration::from_millis(50));

        let body = json!({"messages": [{"role": "user", "content": "hi"}]}).to_string();
        let response = post_chat(state, body).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_timeout_while_streaming_closes_output() {
        let provider = Arc::new(StalledProvider {
            stall_before_stream: false,
        });
        let state = state_for(provider, Duration::from_millis(50));

        let body = json!({"messages": [{"role": "user", "content": "hi"}]}).to_string();
        let response = post_chat(state, body).await;
        assert_eq!(response.status(), StatusCode::OK);

        let collected = tokio::time::timeout(Duration::from_secs(5), body_string(response)).await;
        assert_eq!(collected.unwrap(), "");
    }

    #[tokio::test]
    async fn test_forward_delivers_frames_in_order() {
        let (tx, rx) = mpsc::channel(1);
        let frames = stream::iter(vec![Bytes::from("one\n"), Bytes::from("two\n")]);

        let pump = tokio::spawn(forward(frames, tx));
        let received: Vec<Bytes> = ReceiverStream::new(rx).collect().await;
        pump.await.unwrap();

        assert_eq!(received, vec![Bytes::from("one\n"), Bytes::from("two\n")]);
    }

    #[tokio::test]
    async fn test_forward_stops_when_client_disconnects() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            forward(stream::pending::<Bytes>(), tx),
        )
        .await;
        assert!(result.is_ok());
    }
}
