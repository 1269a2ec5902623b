//! Parsing of streamed GSQL command output.
//!
//! The `file` endpoint answers with an unstructured byte stream. Plain text
//! and redrawing progress bars are meant for the terminal; session control
//! messages are embedded in-band behind the `__GSQL__` separator.

use once_cell::sync::Lazy;
use regex::Regex;

/// In-band separator that introduces a control message.
pub const SEPARATOR: &str = "__GSQL__";

/// Control message carrying a replacement session cookie.
pub const COOKIE_MARKER: &str = "__GSQL__COOKIES__";

/// Delimiter between a control marker and its payload.
pub const PAYLOAD_DELIMITER: &str = "__,";

/// Upper bound on the size of a chunk handed to [`classify`].
pub const MAX_CHUNK: usize = 4096;

/// `[<bar>] <percent>% (<count>/<total>)`
static PROGRESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[.*?\]\s*\d+%.*\(\d+/\d+\)").unwrap_or_else(|_| unreachable!())
});

/// How a piece of streamed output must be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Progress indicator, written verbatim so it can redraw in place.
    Progress(&'a str),
    /// Ordinary output, already trimmed.
    Text(&'a str),
    /// Raw JSON of a replacement session cookie.
    CookieUpdate(&'a str),
    /// Control message this client does not act on.
    Control(&'a str),
}

/// Classify a chunk.
///
/// A chunk carrying the separator is control data as a whole and yields
/// nothing to display, even text in front of the separator.
#[must_use]
pub fn classify(chunk: &str) -> Option<Segment<'_>> {
    if let Some(pos) = chunk.find(SEPARATOR) {
        return Some(classify_control(&chunk[pos..]));
    }
    if PROGRESS_PATTERN.is_match(chunk) {
        return Some(Segment::Progress(chunk));
    }
    let trimmed = chunk.trim();
    (!trimmed.is_empty()).then_some(Segment::Text(trimmed))
}

fn classify_control(control: &str) -> Segment<'_> {
    if let Some(pos) = control.find(COOKIE_MARKER) {
        if let Some((_, payload)) = control[pos..].split_once(PAYLOAD_DELIMITER) {
            return Segment::CookieUpdate(payload);
        }
    }
    Segment::Control(control)
}

/// Re-chunks a byte stream into UTF-8 strings of at most [`MAX_CHUNK`] bytes.
///
/// A multi-byte sequence split across transport reads is held back until
/// the rest of it arrives. Invalid bytes are replaced, not dropped.
#[derive(Debug, Default)]
pub struct Utf8Chunker {
    pending: Vec<u8>,
}

impl Utf8Chunker {
    /// Create an empty chunker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed transport bytes, returning every complete chunk.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut chunks = Vec::new();
        while !self.pending.is_empty() {
            let window = self.pending.len().min(MAX_CHUNK);
            let take = match std::str::from_utf8(&self.pending[..window]) {
                Ok(_) => window,
                Err(e) => match e.error_len() {
                    Some(invalid) => e.valid_up_to() + invalid,
                    None => e.valid_up_to(),
                },
            };
            if take == 0 {
                break;
            }
            let piece: Vec<u8> = self.pending.drain(..take).collect();
            chunks.push(String::from_utf8_lossy(&piece).into_owned());
        }
        chunks
    }

    /// Flush whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("[==  ] 40% (2/5)\n" ; "bar with newline")]
    #[test_case("[========] 100% (2/2)" ; "complete bar")]
    #[test_case("\r[=>   ] 5% (1/20) loading" ; "carriage return redraw")]
    fn progress_is_kept_verbatim(chunk: &str) {
        assert_eq!(classify(chunk), Some(Segment::Progress(chunk)));
    }

    #[test_case("done\n", "done" ; "trailing newline")]
    #[test_case("  Successfully created graph.  \n\n", "Successfully created graph." ; "padded")]
    #[test_case("50% done", "50% done" ; "percent without bar")]
    fn text_is_trimmed(chunk: &str, expected: &str) {
        assert_eq!(classify(chunk), Some(Segment::Text(expected)));
    }

    #[test]
    fn whitespace_only_chunk_yields_nothing() {
        assert_eq!(classify(" \n\t"), None);
    }

    #[test]
    fn cookie_update_payload_is_extracted() {
        let chunk = r#"__GSQL__COOKIES__,{"clientCommit":"updated123"}"#;
        assert_eq!(
            classify(chunk),
            Some(Segment::CookieUpdate(r#"{"clientCommit":"updated123"}"#))
        );
    }

    #[test]
    fn text_in_a_control_chunk_is_not_displayed() {
        let chunk = r#"Graph g created.__GSQL__COOKIES__,{"clientCommit":"u1"}"#;
        assert_eq!(
            classify(chunk),
            Some(Segment::CookieUpdate(r#"{"clientCommit":"u1"}"#))
        );
    }

    #[test]
    fn unknown_control_is_not_text() {
        let chunk = "__GSQL__RETURN__CODE__,0";
        assert_eq!(classify(chunk), Some(Segment::Control(chunk)));
    }

    #[test]
    fn cookie_marker_without_delimiter_is_plain_control() {
        let chunk = "__GSQL__COOKIES__";
        assert_eq!(classify(chunk), Some(Segment::Control(chunk)));
    }

    #[test]
    fn chunker_holds_back_split_multibyte_sequence() {
        let text = "héllo";
        let bytes = text.as_bytes();
        let mut chunker = Utf8Chunker::new();
        // Split inside the two-byte 'é'.
        assert_eq!(chunker.push(&bytes[..2]), vec!["h".to_string()]);
        assert_eq!(chunker.push(&bytes[2..]), vec!["éllo".to_string()]);
        assert_eq!(chunker.finish(), None);
    }

    #[test]
    fn chunker_bounds_chunk_size() {
        let data = vec![b'a'; MAX_CHUNK * 2 + 10];
        let chunks = Utf8Chunker::new().push(&data);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= MAX_CHUNK));
    }

    #[test]
    fn chunker_flushes_truncated_tail_lossily() {
        let mut chunker = Utf8Chunker::new();
        assert!(chunker.push(&[0xC3]).is_empty());
        assert_eq!(chunker.finish(), Some("\u{FFFD}".to_string()));
    }

    proptest! {
        #[test]
        fn plain_text_never_yields_control(s in "[a-zA-Z0-9 .,:\n]{0,200}") {
            let is_display = matches!(classify(&s), None | Some(Segment::Text(_) | Segment::Progress(_)));
            prop_assert!(is_display);
        }

        #[test]
        fn chunker_preserves_valid_utf8(s in "\\PC{0,300}", split in 0usize..300) {
            let bytes = s.as_bytes();
            let split = split.min(bytes.len());
            let mut chunker = Utf8Chunker::new();
            let mut out = chunker.push(&bytes[..split]).concat();
            out.push_str(&chunker.push(&bytes[split..]).concat());
            if let Some(rest) = chunker.finish() {
                out.push_str(&rest);
            }
            prop_assert_eq!(out, s);
        }
    }
}
