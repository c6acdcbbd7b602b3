//! Decoder for the line-oriented `data: {json}` reply stream.
//!
//! Chunks arrive with arbitrary boundaries, so both incomplete UTF-8
//! sequences and incomplete lines are carried over to the next `push`.

use serde_json::Value;

pub const DATA_PREFIX: &str = "data: ";

#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Undecoded tail of the last chunk (an incomplete UTF-8 sequence)
    bytes: Vec<u8>,
    /// Decoded text not yet terminated by a newline
    text: String,
    malformed: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning the `content` fragments of every completed line
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.bytes.extend_from_slice(chunk);
        self.decode_pending();

        let mut fragments = Vec::new();
        while let Some(pos) = self.text.find('\n') {
            let line: String = self.text.drain(..=pos).collect();
            if let Some(fragment) = self.parse_line(&line) {
                fragments.push(fragment);
            }
        }
        fragments
    }

    /// Flush whatever is left once the stream has closed
    pub fn finish(&mut self) -> Vec<String> {
        if !self.bytes.is_empty() {
            let rest = String::from_utf8_lossy(&self.bytes).into_owned();
            self.text.push_str(&rest);
            self.bytes.clear();
        }

        let line = std::mem::take(&mut self.text);
        self.parse_line(&line).into_iter().collect()
    }

    /// Number of `data:` lines that failed to parse so far
    pub fn malformed_lines(&self) -> usize {
        self.malformed
    }

    fn decode_pending(&mut self) {
        loop {
            match std::str::from_utf8(&self.bytes) {
                Ok(text) => {
                    self.text.push_str(text);
                    self.bytes.clear();
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.bytes[..valid]));
                    match err.error_len() {
                        Some(bad) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            self.bytes.drain(..valid + bad);
                        }
                        // incomplete sequence at the end, wait for more bytes
                        None => {
                            self.bytes.drain(..valid);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn parse_line(&mut self, line: &str) -> Option<String> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let payload = line.strip_prefix(DATA_PREFIX)?;

        match serde_json::from_str::<Value>(payload) {
            Ok(value) => value
                .get("content")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            Err(e) => {
                self.malformed += 1;
                tracing::warn!(error = %e, line = payload, "Stream parse error");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(chunks: &[&[u8]]) -> String {
        let mut decoder = FrameDecoder::new();
        let mut out = String::new();
        for chunk in chunks {
            out.extend(decoder.push(chunk));
        }
        out.extend(decoder.finish());
        out
    }

    #[test]
    fn test_two_frames_concatenate() {
        let out = decode_all(&[b"data: {\"content\":\"Hel\"}\ndata: {\"content\":\"lo\"}\n"]);
        assert_eq!(out, "Hello");
    }

    #[test]
    fn test_line_split_across_chunks() {
        let out = decode_all(&[
            b"data: {\"conte",
            b"nt\":\"Hel\"}\nda",
            b"ta: {\"content\":\"lo\"}",
        ]);
        assert_eq!(out, "Hello");
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let frame = "data: {\"content\":\"é✓\"}\n".as_bytes();
        let cut = frame.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let out = decode_all(&[&frame[..cut], &frame[cut..]]);
        assert_eq!(out, "é✓");
    }

    #[test]
    fn test_crlf_and_other_lines() {
        let out = decode_all(&[
            b"event: message\r\n",
            b"data: {\"content\":\"a\"}\r\n",
            b": keep-alive\r\n\r\n",
            b"data: {\"role\":\"assistant\"}\r\n",
            b"data: {\"content\":42}\r\n",
            b"data: {\"content\":\"b\"}\r\n",
        ]);
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let mut decoder = FrameDecoder::new();
        let out = decoder.push(
            b"data: {\"content\":\"x\"}\ndata: {oops\ndata: [DONE]\ndata: {\"content\":\"y\"}\n",
        );
        assert_eq!(out, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(decoder.malformed_lines(), 2);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let out = decode_all(&[b"data: {\"content\":\"a\xFFb\"}\n"]);
        assert_eq!(out, "a\u{FFFD}b");
    }
}
