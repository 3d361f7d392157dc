use serde::{Deserialize, Serialize};

/// Discriminator that starts every text line of the relay's output
pub const TEXT_PREFIX: &str = "0:";

const TEXT_DELTA: &str = "text-delta";

/// One unit of the relay's output stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    TextDelta(String),
}

// Field order is part of the wire format: `{"type":...,"textDelta":...}`
#[derive(Serialize)]
struct OutgoingFrame<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(rename = "textDelta")]
    text_delta: &'a str,
}

#[derive(Deserialize)]
struct IncomingFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "textDelta", default)]
    text_delta: Option<String>,
}

impl StreamEvent {
    pub fn text_delta<S: Into<String>>(text: S) -> Self {
        StreamEvent::TextDelta(text.into())
    }

    /// Encode as a single framed line, including the trailing newline.
    ///
    /// JSON string escaping turns backslash, double quote, newline, carriage return
    /// and tab into `\\`, `\"`, `\n`, `\r`, `\t`; other control characters become
    /// `\u00XX`, so the line always parses back.
    pub fn encode(&self) -> String {
        match self {
            StreamEvent::TextDelta(text) => {
                let frame = OutgoingFrame {
                    kind: TEXT_DELTA,
                    text_delta: text,
                };
                match serde_json::to_string(&frame) {
                    Ok(json) => format!("{}{}\n", TEXT_PREFIX, json),
                    Err(_) => String::new(),
                }
            }
        }
    }

    /// Decode one line of relay output.
    ///
    /// Returns `None` for lines with another discriminator, unparseable payloads,
    /// unknown event types and empty deltas.
    pub fn decode(line: &str) -> Option<Self> {
        let payload = line.strip_prefix(TEXT_PREFIX)?;
        let frame: IncomingFrame = serde_json::from_str(payload).ok()?;
        if frame.kind != TEXT_DELTA {
            return None;
        }
        frame
            .text_delta
            .filter(|text| !text.is_empty())
            .map(StreamEvent::TextDelta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_encode_is_bit_exact() {
        assert_eq!(
            StreamEvent::text_delta("A").encode(),
            "0:{\"type\":\"text-delta\",\"textDelta\":\"A\"}\n"
        );
    }

    #[test]
    fn test_encode_escapes_special_characters() {
        let line = StreamEvent::text_delta("say \"hi\"\\\n\r\tok").encode();
        assert_eq!(
            line,
            "0:{\"type\":\"text-delta\",\"textDelta\":\"say \\\"hi\\\"\\\\\\n\\r\\tok\"}\n"
        );

        let payload: Value = serde_json::from_str(line[2..].trim_end_matches('\n')).unwrap();
        assert_eq!(payload["textDelta"], "say \"hi\"\\\n\r\tok");
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_encode_other_control_characters() {
        let line = StreamEvent::text_delta("bell\u{7}").encode();
        assert!(line.contains("\\u0007"));
        assert!(StreamEvent::decode(line.trim_end()).is_some());
    }

    #[test]
    fn test_decode_round_trips_unicode() {
        let event = StreamEvent::text_delta("naïve 文字 🚀");
        let line = event.encode();
        assert_eq!(StreamEvent::decode(line.trim_end()), Some(event));
    }

    #[test]
    fn test_decode_ignores_other_lines() {
        assert_eq!(StreamEvent::decode("d:{\"finishReason\":\"stop\"}"), None);
        assert_eq!(StreamEvent::decode("0:not json"), None);
        assert_eq!(
            StreamEvent::decode("0:{\"type\":\"reasoning\",\"textDelta\":\"x\"}"),
            None
        );
        assert_eq!(
            StreamEvent::decode("0:{\"type\":\"text-delta\",\"textDelta\":\"\"}"),
            None
        );
        assert_eq!(StreamEvent::decode("0:{\"type\":\"text-delta\"}"), None);
    }
}
