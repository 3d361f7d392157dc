use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub const MESSAGES_REQUIRED: &str = "Messages array is required";
pub const TEXT_AND_LANGUAGE_REQUIRED: &str = "Text and target language are required";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a settings path such as `provider.api_key` to `DOCENT_PROVIDER__API_KEY`
pub fn to_env_var(field: &str) -> String {
    format!("DOCENT_{}", field.to_uppercase().replace('.', "__"))
}

/// Errors the relay endpoints report to callers. The detail stays in the server log;
/// callers only ever see the fixed message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Chat request failed")]
    Chat,

    #[error("Translation failed")]
    Translation,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Chat | ApiError::Translation => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
