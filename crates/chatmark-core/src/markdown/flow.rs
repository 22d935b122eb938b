//! Line-break reassembly
//!
//! Turns the text flow into paragraphs. Blank-line gaps separate paragraphs,
//! single newlines inside a paragraph become `<br/>`, and block lines (block
//! tokens, headings, rules) are emitted bare between paragraphs.

use once_cell::sync::Lazy;
use regex::Regex;

use super::arena::FragmentArena;
use super::stages::EscapedText;

/// Two or more newlines, whitespace-only lines included
static PARAGRAPH_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n)+").unwrap());

/// Block-level markup produced by the inline pass
static BLOCK_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<(?:h[1-6]|hr)\b").unwrap());

pub fn reassemble(text: EscapedText, arena: &FragmentArena) -> String {
    let mut html = String::with_capacity(text.as_str().len());

    for chunk in PARAGRAPH_BREAK_REGEX.split(text.as_str()) {
        let mut paragraph: Vec<&str> = Vec::new();
        for line in chunk.split('\n') {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if arena.is_block_token(trimmed) || BLOCK_TAG_REGEX.is_match(trimmed) {
                flush_paragraph(&mut html, &mut paragraph);
                html.push_str(trimmed);
            } else {
                paragraph.push(line.trim_end());
            }
        }
        flush_paragraph(&mut html, &mut paragraph);
    }

    html
}

fn flush_paragraph(html: &mut String, paragraph: &mut Vec<&str>) {
    if paragraph.is_empty() {
        return;
    }
    html.push_str("<p>");
    html.push_str(&paragraph.join("<br/>"));
    html.push_str("</p>");
    paragraph.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::arena::FragmentKind;
    use crate::markdown::stages::ProtectedText;

    fn run(text: &str, arena: &FragmentArena) -> String {
        reassemble(ProtectedText::new(text.to_string()).escape(), arena)
    }

    #[test]
    fn test_plain_text_single_paragraph() {
        let arena = FragmentArena::new();
        assert_eq!(run("hello world", &arena), "<p>hello world</p>");
    }

    #[test]
    fn test_newlines_and_blank_lines() {
        let arena = FragmentArena::new();
        assert_eq!(run("a\nb\n\nc", &arena), "<p>a<br/>b</p><p>c</p>");
        assert_eq!(run("a\n  \n\n\nc\n", &arena), "<p>a</p><p>c</p>");
    }

    #[test]
    fn test_block_tokens_split_paragraphs() {
        let mut arena = FragmentArena::new();
        let block = arena.push(FragmentKind::Block, "<ul></ul>".to_string());
        let inline = arena.push(FragmentKind::Inline, "<span></span>".to_string());
        assert_eq!(
            run(&format!("intro\n{block}\nafter {inline}"), &arena),
            format!("<p>intro</p>{block}<p>after {inline}</p>")
        );
    }

    #[test]
    fn test_headings_not_wrapped() {
        let mut arena = FragmentArena::new();
        let text = crate::markdown::inline::transform(
            ProtectedText::new("# T\nbody".to_string()).escape(),
            &mut arena,
        );
        let html = reassemble(text, &arena);
        assert_eq!(
            html,
            r#"<h1 style="margin-bottom: 10px;"><font size="6">T</font></h1><p>body</p>"#
        );
    }
}
