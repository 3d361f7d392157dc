pub const OPENROUTER_HOST: &str = "https://openrouter.ai/api";
pub const OPENROUTER_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_REFERER: &str = "http://localhost:3000";
pub const DEFAULT_TITLE: &str = "Document Chatbot";

#[derive(Debug, Clone)]
pub struct OpenRouterProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    /// Sent as `HTTP-Referer`, identifies the calling site
    pub referer: String,
    /// Sent as `X-Title`, the display name of the calling site
    pub title: String,
}

impl OpenRouterProviderConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            host: OPENROUTER_HOST.to_string(),
            api_key: api_key.into(),
            model: OPENROUTER_MODEL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}
