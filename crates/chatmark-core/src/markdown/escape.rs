//! HTML entity escaping

/// Escape `&`, `<` and `>` (in that order). Quotes are left alone.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
