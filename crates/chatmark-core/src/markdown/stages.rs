//! Typed pipeline stages
//!
//! Each stage wraps the working text so the ordering rules are enforced by the
//! compiler: fragments are extracted from [`RawText`], escaping is only
//! reachable from [`ProtectedText`], and inline/block transforms only accept
//! [`EscapedText`].

use super::arena::SENTINEL;
use super::escape::escape_html;

/// The caller's document with line endings normalised
#[derive(Debug)]
pub struct RawText(String);

impl RawText {
    pub fn new(input: &str) -> Self {
        let text = input
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .replace(SENTINEL, "");
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Code and tables replaced by placeholders; everything else still unescaped
#[derive(Debug)]
pub struct ProtectedText(String);

impl ProtectedText {
    pub(super) fn new(text: String) -> Self {
        Self(text)
    }

    /// Escape the text between placeholders. Consumes the stage, so the
    /// same text can never be escaped twice.
    pub fn escape(self) -> EscapedText {
        EscapedText(escape_html(&self.0))
    }
}

/// Entity-escaped text; any markup in it was produced by the pipeline itself
#[derive(Debug)]
pub struct EscapedText(String);

impl EscapedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Apply a markup-producing transform, staying in the escaped stage
    pub fn map(self, transform: impl FnOnce(&str) -> String) -> Self {
        Self(transform(&self.0))
    }

    #[cfg(test)]
    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text_normalises_line_endings() {
        let raw = RawText::new("a\r\nb\rc\0d");
        assert_eq!(raw.as_str(), "a\nb\ncd");
    }

    #[test]
    fn test_escape_leaves_tokens_intact() {
        let protected = ProtectedText::new("<x> \0FRAG0\0 & y".to_string());
        let escaped = protected.escape();
        assert_eq!(escaped.as_str(), "&lt;x&gt; \0FRAG0\0 &amp; y");
    }
}
