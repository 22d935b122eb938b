//! Final HTML normalisation
//!
//! Idempotent: running it on its own output changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;

static EMPTY_PARAGRAPH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<p>\s*(?:<br/>\s*)*</p>").unwrap());
static BREAK_BEFORE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:<br/>\s*)+(<(?:table|pre|div|ul|ol|blockquote|h[1-6]|hr)\b)").unwrap()
});
static BREAK_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:<br/>\s*){3,}").unwrap());
static PARAGRAPH_GAP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"</p>\s+<p>").unwrap());

pub fn cleanup(html: &str) -> String {
    let html = EMPTY_PARAGRAPH_REGEX.replace_all(html, "");
    let html = BREAK_BEFORE_BLOCK_REGEX.replace_all(&html, "${1}");
    let html = BREAK_RUN_REGEX.replace_all(&html, "<br/><br/>");
    let html = PARAGRAPH_GAP_REGEX.replace_all(&html, "</p><p>");
    html.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_empty_paragraphs() {
        assert_eq!(cleanup("<p></p><p>x</p><p> <br/> </p>"), "<p>x</p>");
    }

    #[test]
    fn test_drops_break_before_block() {
        assert_eq!(
            cleanup("<p>a<br/> <br/><ul><li>b</li></ul>"),
            "<p>a<ul><li>b</li></ul>"
        );
        assert_eq!(cleanup("x<br/><h2>y</h2>"), "x<h2>y</h2>");
        // Only element names, not prefixes of other tags
        assert_eq!(cleanup("x<br/><header>"), "x<br/><header>");
    }

    #[test]
    fn test_collapses_break_runs() {
        assert_eq!(cleanup("a<br/><br/><br/><br/>b"), "a<br/><br/>b");
        assert_eq!(cleanup("a<br/><br/>b"), "a<br/><br/>b");
    }

    #[test]
    fn test_joins_paragraphs_and_trims() {
        assert_eq!(cleanup("  <p>a</p>\n  <p>b</p>\n"), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "<p>a<br/><br/><br/>b</p><p></p>",
            "<br/><p><br/></p><table></table>",
            "<p>x</p> <p> </p> <p>y</p>",
        ];
        for input in inputs {
            let once = cleanup(input);
            assert_eq!(cleanup(&once), once, "input: {input}");
        }
    }
}
