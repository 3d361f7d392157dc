//! Messages exchanged between the terminal client, the relay server and the provider.
//!
//! The relay accepts the same `{role, content}` shape the provider expects, so a single
//! `ChatMessage` type serves every hop. Client-side transcript state lives in `session`.
pub mod message;
pub mod role;
