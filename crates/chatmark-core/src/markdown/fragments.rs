//! Fragment protection: fenced code, inline code and pipe tables
//!
//! Runs on raw text, before escaping. Every match is rendered to its final
//! HTML right away (escaping its own content once) and replaced with an
//! arena token, so nothing later in the pipeline can touch it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use super::arena::{FragmentArena, FragmentKind};
use super::colors::ColorConfig;
use super::escape::escape_html;
use super::stages::{ProtectedText, RawText};

/// Opening fence, optional language, body up to the next fence or end of text
static CODE_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```+(?:([^\n`]*)\n)?(.*?)(?:```+|\z)").unwrap());

static INLINE_CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

/// Header row, separator row (needs at least one dash), then data rows
static TABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^([ \t]*\|.*\|)[ \t]*\n[ \t]*\|[ \t:|-]*-[ \t:|-]*\|[ \t]*\n((?:[ \t]*\|.*\|[ \t]*(?:\n|\z))+)",
    )
    .unwrap()
});

/// Border around code blocks
const CODE_BORDER: &str = "#40808080";
/// Background of table header cells
const TABLE_HEADER_BG: &str = "#30FFFFFF";
/// URI scheme the host intercepts to copy a code block
pub const COPY_SCHEME: &str = "copy://";

/// Extract code blocks, inline code and tables, in that order
pub fn protect(raw: RawText, arena: &mut FragmentArena, colors: &ColorConfig) -> ProtectedText {
    let text = protect_code_blocks(raw.as_str(), arena, colors);
    let text = protect_inline_code(&text, arena, colors);
    let text = protect_tables(&text, arena);
    debug!("Protected {} fragments", arena.fragment_count());
    ProtectedText::new(text)
}

fn protect_code_blocks(text: &str, arena: &mut FragmentArena, colors: &ColorConfig) -> String {
    CODE_FENCE_REGEX
        .replace_all(text, |caps: &Captures| {
            let lang = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let body = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let html = render_code_block(lang, &dedent(body), colors);
            arena.push(FragmentKind::Block, html)
        })
        .into_owned()
}

fn protect_inline_code(text: &str, arena: &mut FragmentArena, colors: &ColorConfig) -> String {
    INLINE_CODE_REGEX
        .replace_all(text, |caps: &Captures| {
            let html = format!(
                r#"<span style="font-family: monospace; background-color: {};">&nbsp;{}&nbsp;</span>"#,
                colors.inline_code_bg,
                escape_html(&caps[1])
            );
            arena.push(FragmentKind::Inline, html)
        })
        .into_owned()
}

fn protect_tables(text: &str, arena: &mut FragmentArena) -> String {
    TABLE_REGEX
        .replace_all(text, |caps: &Captures| {
            let headers = split_cells(&caps[1]);
            let rows: Vec<Vec<String>> = caps[2]
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(split_cells)
                .collect();
            debug!(
                "Table with {} columns and {} rows",
                headers.len(),
                rows.len()
            );

            let token = arena.push(FragmentKind::Block, render_table(&headers, &rows));
            if caps[0].ends_with('\n') {
                format!("{token}\n")
            } else {
                token
            }
        })
        .into_owned()
}

/// Trim blank lines at both ends and strip the indentation shared by every
/// non-blank line
pub fn dedent(body: &str) -> String {
    let lines: Vec<&str> = body.split('\n').collect();
    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let lines = &lines[first..=last];

    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_width(line))
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            let strip = indent.min(indent_width(line));
            &line[strip..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches(|c: char| c == ' ' || c == '\t').len()
}

fn render_code_block(lang: &str, code: &str, colors: &ColorConfig) -> String {
    let copy_link = format!(
        r#"<a href="{COPY_SCHEME}{}">copy</a>"#,
        STANDARD.encode(code.as_bytes())
    );
    let header = if lang.is_empty() {
        copy_link
    } else {
        format!(
            r#"<span style="opacity: 0.6;">{}</span>&nbsp;&nbsp;{}"#,
            escape_html(lang),
            copy_link
        )
    };

    format!(
        r#"<div style="background-color: {}; border: 1px solid {CODE_BORDER}; padding: 10px; margin: 8px 0;"><div style="font-size: 9px; padding-bottom: 4px;">{}</div><pre style="margin: 0;"><code>{}</code></pre></div>"#,
        colors.code_bg,
        header,
        escape_html(code)
    )
}

/// Split a `| a | b |` row into trimmed cells, dropping the empty cells
/// produced by the outer delimiters
fn split_cells(row: &str) -> Vec<String> {
    let mut cells: Vec<&str> = row.trim().split('|').map(str::trim).collect();
    if cells.first().is_some_and(|cell| cell.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }
    cells.into_iter().map(escape_html).collect()
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut html = String::from(
        r#"<table border="1" cellpadding="5" cellspacing="0" style="border-collapse: collapse; margin: 8px 0;">"#,
    );

    html.push_str("<tr>");
    for header in headers {
        html.push_str(&format!(
            r#"<th style="background-color: {TABLE_HEADER_BG}; padding: 5px;">{header}</th>"#
        ));
    }
    html.push_str("</tr>");

    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!(r#"<td style="padding: 5px;">{cell}</td>"#));
        }
        html.push_str("</tr>");
    }

    html.push_str("</table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protect_str(text: &str) -> (String, FragmentArena) {
        let mut arena = FragmentArena::new();
        let protected = protect(RawText::new(text), &mut arena, &ColorConfig::default());
        let text = protected.escape().into_string();
        (text, arena)
    }

    #[test]
    fn test_dedent_strips_common_indent() {
        assert_eq!(dedent("\n\n    a\n      b\n\n    c\n   "), "a\n  b\n\nc");
        assert_eq!(dedent("x\n  y"), "x\n  y");
        assert_eq!(dedent("\n  \n"), "");
    }

    #[test]
    fn test_code_block_escaped_once_with_copy_payload() {
        let (text, arena) = protect_str("```html\n<b>&</b>\n```");
        assert!(arena.is_block_token(&text));
        let html = arena.restore(text);
        assert!(html.contains("<code>&lt;b&gt;&amp;&lt;/b&gt;</code>"));
        assert!(html.contains(&format!("copy://{}", STANDARD.encode("<b>&</b>"))));
        assert!(html.contains(">html</span>"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_unterminated_fence_takes_rest_of_document() {
        let (text, arena) = protect_str("intro\n```\nfn main() {}\nmore");
        assert!(text.starts_with("intro\n"));
        let html = arena.restore(text);
        assert!(html.contains("<code>fn main() {}\nmore</code>"));
    }

    #[test]
    fn test_indented_fence_is_dedented() {
        let (text, arena) = protect_str("1. step\n   ```sh\n   cargo build\n     --release\n   ```\n2. next");
        let html = arena.restore(text);
        assert!(html.contains("<code>cargo build\n  --release</code>"));
        assert!(html.contains(&STANDARD.encode("cargo build\n  --release")));
    }

    #[test]
    fn test_single_line_triple_backticks() {
        let (text, arena) = protect_str("run ```ls -la``` now");
        assert!(text.starts_with("run \0FRAG0\0 now"));
        assert!(arena.restore(text).contains("<code>ls -la</code>"));
    }

    #[test]
    fn test_inline_code_escaped() {
        let (text, arena) = protect_str("use `<b>` tags & more");
        assert_eq!(text, "use \0FRAG0\0 tags &amp; more");
        let html = arena.restore(text);
        assert!(html.contains("&nbsp;&lt;b&gt;&nbsp;</span>"));
    }

    #[test]
    fn test_table_cells() {
        let (text, arena) = protect_str("| A | B |\n|---|:-:|\n| 1 | <2> |\n| 3 |\nafter");
        assert!(text.ends_with("\nafter"));
        let html = arena.restore(text);
        assert!(html.contains(">A</th>"));
        assert!(html.contains(">B</th>"));
        assert!(html.contains(">&lt;2&gt;</td>"));
        // Short rows are rendered as-is
        assert!(html.contains(r#"<tr><td style="padding: 5px;">3</td></tr>"#));
    }

    #[test]
    fn test_table_keeps_interior_empty_cells() {
        assert_eq!(split_cells("| a |  | c |"), vec!["a", "", "c"]);
        assert_eq!(split_cells("|x|"), vec!["x"]);
    }

    #[test]
    fn test_table_with_inline_code_cell() {
        let (text, arena) = protect_str("| cmd |\n| --- |\n| `ls` |\n");
        let html = arena.restore(text);
        assert!(html.contains("&nbsp;ls&nbsp;</span></td>"));
    }

    #[test]
    fn test_malformed_table_left_alone() {
        let (text, arena) = protect_str("| just | a row |\nplain");
        assert_eq!(arena.fragment_count(), 0);
        assert_eq!(text, "| just | a row |\nplain");
    }
}
