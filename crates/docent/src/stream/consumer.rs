use std::fmt::Display;

use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};

use super::framing::StreamEvent;
use super::lines::LineDecoder;

/// Shown when the relay answered but produced no text
pub const EMPTY_RESPONSE_FALLBACK: &str = "I'm having trouble connecting to the AI service right now. Please check your API key configuration.";

/// Shown when the relay could not be reached or the stream broke off
pub const CONNECTION_FALLBACK: &str =
    "I'm having trouble connecting to the AI service right now. Please try again in a moment.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Complete(String),
    Empty,
    Failed(String),
}

impl Outcome {
    /// The text to show the user, with the fallback substituted where needed
    pub fn into_message(self) -> String {
        match self {
            Outcome::Complete(text) => text,
            Outcome::Empty => EMPTY_RESPONSE_FALLBACK.to_string(),
            Outcome::Failed(_) => CONNECTION_FALLBACK.to_string(),
        }
    }
}

/// Rebuilds an assistant message from the relay's text-delta frames
#[derive(Debug, Default)]
pub struct StreamConsumer {
    decoder: LineDecoder,
    text: String,
}

impl StreamConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Feed one chunk of the body. `on_update` receives the full accumulated text
    /// after every delta.
    pub fn feed<F>(&mut self, chunk: &[u8], on_update: &mut F)
    where
        F: FnMut(&str),
    {
        for line in self.decoder.push(chunk) {
            self.apply(&line, on_update);
        }
    }

    pub fn finish<F>(mut self, on_update: &mut F) -> Outcome
    where
        F: FnMut(&str),
    {
        if let Some(line) = self.decoder.finish() {
            self.apply(&line, on_update);
        }

        if self.text.trim().is_empty() {
            Outcome::Empty
        } else {
            Outcome::Complete(self.text)
        }
    }

    fn apply<F>(&mut self, line: &str, on_update: &mut F)
    where
        F: FnMut(&str),
    {
        match StreamEvent::decode(line) {
            Some(StreamEvent::TextDelta(delta)) => {
                self.text.push_str(&delta);
                on_update(&self.text);
            }
            None => {
                if !line.is_empty() {
                    tracing::debug!("Skipping unrecognized stream line: {}", line);
                }
            }
        }
    }
}

/// Read a relay response body to the end.
pub async fn consume<S, E, F>(body: S, mut on_update: F) -> Outcome
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
    F: FnMut(&str),
{
    pin_mut!(body);
    let mut consumer = StreamConsumer::new();

    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(chunk) => consumer.feed(&chunk, &mut on_update),
            Err(e) => {
                tracing::warn!("Relay stream failed after {} bytes of text: {}", consumer.text().len(), e);
                return Outcome::Failed(e.to_string());
            }
        }
    }

    consumer.finish(&mut on_update)
}
