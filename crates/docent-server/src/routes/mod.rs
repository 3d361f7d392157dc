// Export route modules
pub mod chat;
pub mod translate;

use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};

/// Requests carry the whole extracted document text, which can exceed axum's 2 MB default
const MAX_REQUEST_BYTES: usize = 16 * 1024 * 1024;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(chat::routes(state.clone()))
        .merge(translate::routes(state))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
}
