use crate::error::{ApiError, TEXT_AND_LANGUAGE_REQUIRED};
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use bytes::Bytes;
use docent::prompt;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

fn required_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

// non streaming, the whole translation comes back in one response
async fn handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TranslateResponse>, ApiError> {
    let request: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!("Translation request is not valid JSON: {}", e);
        ApiError::Translation
    })?;

    let (text, target_language) = match (
        required_str(&request, "text"),
        required_str(&request, "targetLanguage"),
    ) {
        (Some(text), Some(target_language)) => (text, target_language),
        _ => return Err(ApiError::Validation(TEXT_AND_LANGUAGE_REQUIRED)),
    };

    let messages = prompt::translation_messages(text, target_language);
    match state.provider.complete(&messages, state.translation).await {
        Ok(translated_text) => {
            tracing::debug!(
                "Translated {} characters to {}",
                text.len(),
                target_language
            );
            Ok(Json(TranslateResponse { translated_text }))
        }
        Err(e) => {
            tracing::error!("Translation failed: {}", e);
            Err(ApiError::Translation)
        }
    }
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/translate", post(handler))
        .with_state(state)
}
