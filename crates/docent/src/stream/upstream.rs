use serde_json::Value;

use crate::providers::utils::delta_content;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Interpretation of one line of the provider's event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamLine {
    /// A non-empty text fragment
    Delta(String),
    /// The sentinel: nothing further will arrive
    Done,
    /// Valid payload that carries no text (role announcements, finish reasons, usage)
    NoContent,
    /// Payload that is not JSON
    Malformed,
    /// Not a data line at all (comments, keep-alives, blank separators)
    Ignored,
}

pub fn parse_line(line: &str) -> UpstreamLine {
    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return UpstreamLine::Ignored;
    };
    if data == DONE_SENTINEL {
        return UpstreamLine::Done;
    }

    match serde_json::from_str::<Value>(data) {
        Ok(chunk) => match delta_content(&chunk) {
            Some(text) => UpstreamLine::Delta(text.to_string()),
            None => UpstreamLine::NoContent,
        },
        Err(_) => UpstreamLine::Malformed,
    }
}
