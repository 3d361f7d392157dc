use std::fmt::Display;

use async_stream::stream;
use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};

use super::framing::StreamEvent;
use super::lines::LineDecoder;
use super::upstream::{parse_line, UpstreamLine};

/// Per-stream counters, logged when the stream finishes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub fragments: usize,
    pub dropped: usize,
}

/// Incremental state behind [`reframe`]: turns raw upstream chunks into `0:` frames
#[derive(Debug, Default)]
pub struct Reframer {
    decoder: LineDecoder,
    stats: RelayStats,
    done: bool,
}

impl Reframer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames completed by this chunk. Once the sentinel has been seen nothing more
    /// is produced and the rest of the input is discarded.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        let mut frames = Vec::new();
        if self.done {
            return frames;
        }

        for line in self.decoder.push(chunk) {
            self.step(&line, &mut frames);
            if self.done {
                break;
            }
        }
        frames
    }

    /// Process the unterminated tail left when the upstream ends without the sentinel
    pub fn finish(&mut self) -> Vec<Bytes> {
        let mut frames = Vec::new();
        if self.done {
            return frames;
        }

        if let Some(line) = self.decoder.finish() {
            self.step(&line, &mut frames);
        }
        self.done = true;
        frames
    }

    /// True once the sentinel arrived or the input was finished
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    fn step(&mut self, line: &str, frames: &mut Vec<Bytes>) {
        match parse_line(line) {
            UpstreamLine::Delta(text) => {
                self.stats.fragments += 1;
                frames.push(Bytes::from(StreamEvent::text_delta(text).encode()));
            }
            UpstreamLine::Done => self.done = true,
            UpstreamLine::Malformed => {
                self.stats.dropped += 1;
                tracing::debug!("Dropping malformed upstream line: {}", line);
            }
            UpstreamLine::NoContent | UpstreamLine::Ignored => {}
        }
    }
}

/// Convert the provider's `data: {...}` event stream into `0:` text-delta frames.
///
/// Ends at the sentinel (discarding anything still buffered), when the upstream ends,
/// or after logging an upstream read error. Malformed payloads are dropped.
pub fn reframe<S, E>(upstream: S) -> impl Stream<Item = Bytes>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    stream! {
        pin_mut!(upstream);
        let mut reframer = Reframer::new();

        loop {
            match upstream.next().await {
                Some(Ok(chunk)) => {
                    for frame in reframer.push(&chunk) {
                        yield frame;
                    }
                    if reframer.is_done() {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::error!("Stream processing error: {}", e);
                    break;
                }
                None => {
                    for frame in reframer.finish() {
                        yield frame;
                    }
                    break;
                }
            }
        }

        let stats = reframer.stats();
        tracing::debug!(
            fragments = stats.fragments,
            dropped = stats.dropped,
            "Relay stream finished"
        );
    }
}
