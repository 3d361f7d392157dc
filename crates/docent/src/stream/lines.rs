/// Splits a chunked byte stream into text lines.
///
/// Reads from the network do not respect character or line boundaries, so undecoded
/// trailing bytes and the unterminated tail are carried over to the next `push`.
/// Invalid UTF-8 sequences are replaced with U+FFFD rather than rejected.
#[derive(Debug, Default)]
pub struct LineDecoder {
    undecoded: Vec<u8>,
    partial: String,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completed, without the terminator.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.partial.find('\n') {
            let mut line: String = self.partial.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Flush whatever is left once the input has ended.
    pub fn finish(&mut self) -> Option<String> {
        if !self.undecoded.is_empty() {
            self.partial
                .push_str(&String::from_utf8_lossy(&self.undecoded));
            self.undecoded.clear();
        }

        let mut line = std::mem::take(&mut self.partial);
        if line.ends_with('\r') {
            line.pop();
        }
        (!line.is_empty()).then_some(line)
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.undecoded.extend_from_slice(chunk);

        let mut consumed = 0;
        loop {
            match std::str::from_utf8(&self.undecoded[consumed..]) {
                Ok(text) => {
                    self.partial.push_str(text);
                    consumed = self.undecoded.len();
                    break;
                }
                Err(err) => {
                    let valid_end = consumed + err.valid_up_to();
                    self.partial
                        .push_str(&String::from_utf8_lossy(&self.undecoded[consumed..valid_end]));
                    match err.error_len() {
                        Some(len) => {
                            self.partial.push(char::REPLACEMENT_CHARACTER);
                            consumed = valid_end + len;
                        }
                        // incomplete sequence at the end, wait for more bytes
                        None => {
                            consumed = valid_end;
                            break;
                        }
                    }
                }
            }
        }
        self.undecoded.drain(..consumed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_lines() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"first\nsecond\n");
        assert_eq!(lines, vec!["first", "second"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_partial_line_carried_over() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"data: {\"choi").is_empty());
        let lines = decoder.push(b"ces\":[]}\ndata: [DO");
        assert_eq!(lines, vec!["data: {\"choices\":[]}"]);
        assert_eq!(decoder.push(b"NE]\n"), vec!["data: [DONE]"]);
    }

    #[test]
    fn test_multibyte_character_split_across_reads() {
        // "é" is 0xC3 0xA9, "世" is 0xE4 0xB8 0x96
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(&[b'c', b'a', b'f', 0xC3]).is_empty());
        assert!(decoder.push(&[0xA9, b' ', 0xE4]).is_empty());
        assert!(decoder.push(&[0xB8]).is_empty());
        let lines = decoder.push(&[0x96, b'\n']);
        assert_eq!(lines, vec!["café 世"]);
    }

    #[test]
    fn test_crlf_terminators() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.push(b"one\r\ntwo\r"), vec!["one"]);
        assert_eq!(decoder.push(b"\n"), vec!["two"]);
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(&[b'a', 0xFF, b'b', b'\n']);
        assert_eq!(lines, vec!["a\u{FFFD}b"]);
    }

    #[test]
    fn test_finish_flushes_unterminated_tail() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"tail").is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_finish_with_truncated_character() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(&[b'x', 0xE4, 0xB8]).is_empty());
        assert_eq!(decoder.finish(), Some("x\u{FFFD}".to_string()));
    }
}
