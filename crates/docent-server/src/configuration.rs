use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment, File};
use docent::providers::base::CompletionOptions;
use docent::providers::configs::{
    OpenRouterProviderConfig, DEFAULT_REFERER, DEFAULT_TITLE, OPENROUTER_HOST, OPENROUTER_MODEL,
};
use serde::Deserialize;
use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_host")]
    pub host: String,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_title")]
    pub title: String,
}

impl ProviderSettings {
    pub fn into_config(self) -> OpenRouterProviderConfig {
        OpenRouterProviderConfig {
            host: self.host,
            api_key: self.api_key,
            model: self.model,
            referer: self.referer,
            title: self.title,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatSettings {
    /// Wall-clock budget for one chat request, streaming included
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_duration_secs: default_max_duration_secs(),
        }
    }
}

impl ChatSettings {
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct TranslationSettings {
    #[serde(default = "default_translation_temperature")]
    pub temperature: f32,
    #[serde(default = "default_translation_max_tokens")]
    pub max_tokens: i32,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            temperature: default_translation_temperature(),
            max_tokens: default_translation_max_tokens(),
        }
    }
}

impl TranslationSettings {
    pub fn options(&self) -> CompletionOptions {
        CompletionOptions::new(Some(self.temperature), Some(self.max_tokens))
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub translation: TranslationSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults
            .set_default("provider.host", default_provider_host())?
            .set_default("provider.model", default_model())?
            .set_default("provider.referer", default_referer())?
            .set_default("provider.title", default_title())?
            // Optional docent.toml in the working directory
            .add_source(File::with_name("docent").required(false))
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("DOCENT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // The conventional OpenRouter variables win when present
            .set_override_option("provider.api_key", non_empty_var("OPENROUTER_API_KEY"))?
            .set_override_option("provider.referer", non_empty_var("SITE_URL"))?
            .set_override_option("provider.title", non_empty_var("SITE_NAME"))?
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                if let Some(path) = missing_field_path(&err.to_string()) {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(&path),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Turn "missing field `api_key` for key `provider`" into `provider.api_key`
fn missing_field_path(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    let (field, rest) = rest.split_once('`')?;

    match rest
        .strip_prefix(" for key `")
        .and_then(|key| key.split_once('`'))
    {
        Some((key, _)) if !key.is_empty() => Some(format!("{}.{}", key, field)),
        _ => Some(field.to_string()),
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_provider_host() -> String {
    OPENROUTER_HOST.to_string()
}

fn default_model() -> String {
    OPENROUTER_MODEL.to_string()
}

fn default_referer() -> String {
    DEFAULT_REFERER.to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_max_duration_secs() -> u64 {
    30
}

fn default_translation_temperature() -> f32 {
    0.3
}

fn default_translation_max_tokens() -> i32 {
    4000
}
