//! Inline transforms on escaped text
//!
//! Order matters here. Headings and rules go first so their markers are not
//! read as emphasis, emphasis runs from the most specific marker to the least,
//! and task items are tagged before plain bullets (a task item is also a
//! bullet). List items are only tagged (`<li_ul>`, `<li_ol>`, `<li_task>`);
//! the block pass groups them into lists. Link targets and bare URLs are
//! parked in the arena up front, so emphasis never rewrites inside a URL.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::arena::{FragmentArena, FragmentKind};
use super::stages::EscapedText;

static HEADING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]+(.*?)[ \t]*$").unwrap());
static RULE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:\*{3,}|-{3,}|_{3,})[ \t]*$").unwrap());

// Openers must be followed by a non-space, so `* item` never starts emphasis
static BOLD_ITALIC_STAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*\*([^\s*](?:[^*\n]*?[^\s*])?)\*\*\*").unwrap());
static BOLD_STAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^\s*](?:[^\n]*?[^\s*])?)\*\*").unwrap());
static ITALIC_STAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^\s*](?:[^*\n]*?[^\s*])?)\*").unwrap());
static BOLD_ITALIC_UNDERSCORE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"___([^\s_](?:[^_\n]*?[^\s_])?)___").unwrap());
static BOLD_UNDERSCORE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__([^\s_](?:[^\n]*?[^\s_])?)__").unwrap());
static ITALIC_UNDERSCORE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_([^\s_](?:[^_\n]*?[^\s_])?)_").unwrap());
static STRIKETHROUGH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~\n]+?)~~").unwrap());

static LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").unwrap());

static TASK_ITEM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*] \[([ xX])\] (.*)$").unwrap());
static BULLET_ITEM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*] (.*)$").unwrap());
static ORDERED_ITEM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(\d{1,9})\. (.*)$").unwrap());

static BARE_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:https?|file)://[^\s<>"']+"#).unwrap());

/// Font size and bottom margin per heading level. The target surface sizes
/// `<hN>` unreliably, so size is forced with `<font size>`.
const HEADING_STYLES: [(u8, u8); 6] = [(6, 10), (5, 8), (4, 8), (3, 8), (3, 8), (2, 8)];

const CHECKED_BOX: char = '\u{2611}';
const UNCHECKED_BOX: char = '\u{2610}';

/// Run every inline transform, in order
pub fn transform(text: EscapedText, arena: &mut FragmentArena) -> EscapedText {
    text.map(|text| {
        let text = protect_urls(text, arena);

        let text = HEADING_REGEX.replace_all(&text, |caps: &Captures| {
            render_heading(caps[1].len(), &caps[2])
        });
        let text = RULE_REGEX.replace_all(&text, r#"<hr style="margin: 12px 0;"/>"#);

        let text = BOLD_ITALIC_STAR_REGEX.replace_all(&text, "<b><i>${1}</i></b>");
        let text = BOLD_STAR_REGEX.replace_all(&text, "<b>${1}</b>");
        let text = ITALIC_STAR_REGEX.replace_all(&text, "<i>${1}</i>");
        let text = replace_flanked(&BOLD_ITALIC_UNDERSCORE_REGEX, &text, "<b><i>", "</i></b>");
        let text = replace_flanked(&BOLD_UNDERSCORE_REGEX, &text, "<b>", "</b>");
        let text = replace_flanked(&ITALIC_UNDERSCORE_REGEX, &text, "<i>", "</i>");
        let text = STRIKETHROUGH_REGEX.replace_all(&text, "<s>${1}</s>");

        let text = LINK_REGEX.replace_all(&text, r#"<a href="${2}">${1}</a>"#);

        let text = TASK_ITEM_REGEX.replace_all(&text, |caps: &Captures| {
            let checkbox = if caps[1].eq_ignore_ascii_case("x") {
                CHECKED_BOX
            } else {
                UNCHECKED_BOX
            };
            format!("<li_task>{} {}</li_task>", checkbox, &caps[2])
        });
        let text = BULLET_ITEM_REGEX.replace_all(&text, "<li_ul>${1}</li_ul>");
        let text = ORDERED_ITEM_REGEX.replace_all(&text, r#"<li_ol n="${1}">${2}</li_ol>"#);

        text.into_owned()
    })
}

fn render_heading(level: usize, content: &str) -> String {
    let level = level.clamp(1, 6);
    let (size, margin) = HEADING_STYLES[level - 1];
    if level == 5 {
        format!(
            r#"<h5 style="margin-bottom: {margin}px;"><i><font size="{size}">{content}</font></i></h5>"#
        )
    } else {
        format!(
            r#"<h{level} style="margin-bottom: {margin}px;"><font size="{size}">{content}</font></h{level}>"#
        )
    }
}

/// Like `replace_all`, but skips matches glued to a word character on either
/// side, so `snake_case_names` keep their underscores
fn replace_flanked(regex: &Regex, text: &str, open: &str, close: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for caps in regex.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        if before.is_some_and(is_word_char) || after.is_some_and(is_word_char) {
            continue;
        }

        result.push_str(&text[last_end..whole.start()]);
        result.push_str(open);
        result.push_str(&caps[1]);
        result.push_str(close);
        last_end = whole.end();
    }

    result.push_str(&text[last_end..]);
    result
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Replace link targets with tokens and bare URLs with finished anchors
///
/// URLs inside a link label are left as text; the label becomes the anchor
/// body later.
fn protect_urls(text: &str, arena: &mut FragmentArena) -> String {
    let text = LINK_REGEX.replace_all(text, |caps: &Captures| {
        let target = arena.push(FragmentKind::Inline, caps[2].to_string());
        format!("[{}]({})", &caps[1], target)
    });

    let link_spans: Vec<Range<usize>> = LINK_REGEX.find_iter(&text).map(|m| m.range()).collect();
    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for found in BARE_URL_REGEX.find_iter(&text) {
        if link_spans.iter().any(|span| span.contains(&found.start())) {
            continue;
        }

        let url = trim_url(found.as_str());
        result.push_str(&text[last_end..found.start()]);
        result.push_str(&arena.push(
            FragmentKind::Inline,
            format!(r#"<a href="{url}">{url}</a>"#),
        ));
        last_end = found.start() + url.len();
    }

    result.push_str(&text[last_end..]);
    result
}

/// Cut a matched URL at an escaped angle bracket and drop trailing
/// sentence punctuation
fn trim_url(url: &str) -> &str {
    let end = ["&lt;", "&gt;"]
        .iter()
        .filter_map(|entity| url.find(entity))
        .min()
        .unwrap_or(url.len());
    url[..end].trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')'))
}
