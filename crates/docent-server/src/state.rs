use docent::providers::base::{CompletionOptions, Provider};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state. Requests share nothing mutable; each one talks to the
/// provider on its own.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn Provider>,
    pub chat_max_duration: Duration,
    pub translation: CompletionOptions,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn Provider>,
        chat_max_duration: Duration,
        translation: CompletionOptions,
    ) -> Self {
        Self {
            provider,
            chat_max_duration,
            translation,
        }
    }
}
