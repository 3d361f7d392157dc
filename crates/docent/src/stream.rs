//! Streaming plumbing between the provider, the relay and the client.
//!
//! The provider speaks `data: {...}` lines ending in `data: [DONE]`. The relay turns
//! those into `0:{"type":"text-delta","textDelta":"..."}` lines, which the consumer
//! folds back into a single message.
pub mod consumer;
pub mod framing;
pub mod lines;
pub mod relay;
pub mod upstream;
