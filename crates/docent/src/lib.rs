pub mod client;
pub mod document;
pub mod errors;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod session;
pub mod store;
pub mod stream;
