//! Block structuring: lists and blockquotes
//!
//! Works line by line on the tagged output of the inline pass. Every list or
//! quote becomes a single block token on its own line, so the line-break pass
//! cannot inject `<br/>` inside it.

use tracing::debug;

use super::arena::{FragmentArena, FragmentKind};
use super::colors::ColorConfig;
use super::stages::EscapedText;

const LIST_STYLE: &str = "margin: 8px 0;";
const TASK_LIST_STYLE: &str = "list-style-type: none; margin: 8px 0;";
const QUOTE_TEXT_COLOR: &str = "#a0a0a0";

/// Group list items and quote lines into block fragments
pub fn structure(text: EscapedText, arena: &mut FragmentArena, colors: &ColorConfig) -> EscapedText {
    text.map(|text| {
        let text = merge_runs(text, arena, task_item, true, |items| {
            render_list("ul", TASK_LIST_STYLE, None, items)
        });
        let text = merge_runs(&text, arena, bullet_item, true, |items| {
            render_list("ul", LIST_STYLE, None, items)
        });
        let text = renumber_ordered(&text, arena);
        merge_runs(&text, arena, quote_line, false, |lines| {
            render_quote(lines, colors)
        })
    })
}

fn task_item(line: &str) -> Option<&str> {
    strip_tag(line, "li_task")
}

fn bullet_item(line: &str) -> Option<&str> {
    strip_tag(line, "li_ul")
}

fn strip_tag<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    line.trim()
        .strip_prefix('<')?
        .strip_prefix(tag)?
        .strip_prefix('>')?
        .strip_suffix('>')?
        .strip_suffix(tag)?
        .strip_suffix("</")
}

/// Content of a `&gt; ...` line (the `>` was escaped earlier)
///
/// The marker needs a space after it, or nothing at all, so prose such as
/// `>= 5` stays prose.
fn quote_line(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("&gt;")?.trim_end();
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ')
    }
}

struct OrderedItem<'a> {
    number: u64,
    text: &'a str,
}

fn ordered_item(line: &str) -> Option<OrderedItem<'_>> {
    let rest = line.trim().strip_prefix(r#"<li_ol n=""#)?;
    let (number, rest) = rest.split_once(r#"">"#)?;
    Some(OrderedItem {
        number: number.parse().ok()?,
        text: rest.strip_suffix("</li_ol>")?,
    })
}

/// Replace each run of member lines with one block token
///
/// With `allow_gaps`, blank lines between members do not end the run, as long
/// as another member follows them.
fn merge_runs<M, R>(
    text: &str,
    arena: &mut FragmentArena,
    member: M,
    allow_gaps: bool,
    render: R,
) -> String
where
    M: Fn(&str) -> Option<&str>,
    R: Fn(&[&str]) -> String,
{
    let lines: Vec<&str> = text.split('\n').collect();
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let Some(first) = member(lines[i]) else {
            output.push(lines[i].to_string());
            i += 1;
            continue;
        };

        let mut items = vec![first];
        i += 1;
        loop {
            let mut next = i;
            if allow_gaps {
                while next < lines.len() && lines[next].trim().is_empty() {
                    next += 1;
                }
            }
            match lines.get(next).and_then(|&line| member(line)) {
                Some(item) => {
                    items.push(item);
                    i = next + 1;
                }
                None => break,
            }
        }

        output.push(arena.push(FragmentKind::Block, render(&items)));
    }

    output.join("\n")
}

/// What sits between two ordered items
enum Gap {
    Blank,
    Interruption,
    Content,
}

fn classify_gap(line: &str, arena: &FragmentArena) -> Gap {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Gap::Blank
    } else if arena.is_token(trimmed) || quote_line(line).is_some() {
        Gap::Interruption
    } else {
        Gap::Content
    }
}

/// Render ordered lists, continuing the numbering across interruptions
///
/// An ordered item opens a list context. Blank lines, block tokens and quote
/// lines after it stay inside the context only if another ordered item shows
/// up before any other content. Items separated only by blank lines share a
/// segment; an interruption closes the segment, and the next one starts where
/// the previous left off. Each segment is its own `<ol>` with an explicit
/// `start`, and the interrupting lines pass through between them.
fn renumber_ordered(text: &str, arena: &mut FragmentArena) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let Some(first) = ordered_item(lines[i]) else {
            output.push(lines[i].to_string());
            i += 1;
            continue;
        };

        let mut start = first.number;
        let mut segment = vec![first.text];
        let mut segments = 1usize;
        i += 1;

        loop {
            let mut next = i;
            let mut interrupted = false;
            while next < lines.len() && ordered_item(lines[next]).is_none() {
                match classify_gap(lines[next], arena) {
                    Gap::Blank => {}
                    Gap::Interruption => interrupted = true,
                    Gap::Content => break,
                }
                next += 1;
            }

            let Some(item) = lines.get(next).and_then(|&line| ordered_item(line)) else {
                // Context ends; the gap lines are handled by the outer loop
                break;
            };

            if interrupted {
                output.push(push_ordered_segment(arena, start, &segment));
                start += segment.len() as u64;
                output.extend(lines[i..next].iter().map(|line| line.to_string()));
                segment = vec![item.text];
                segments += 1;
            } else {
                segment.push(item.text);
            }
            i = next + 1;
        }

        output.push(push_ordered_segment(arena, start, &segment));
        debug!(
            "Ordered list from {} in {} segments",
            first.number, segments
        );
    }

    output.join("\n")
}

fn push_ordered_segment(arena: &mut FragmentArena, start: u64, items: &[&str]) -> String {
    arena.push(
        FragmentKind::Block,
        render_list("ol", LIST_STYLE, Some(start), items),
    )
}

fn render_list(tag: &str, style: &str, start: Option<u64>, items: &[&str]) -> String {
    let start_attr = match start {
        Some(start) if start != 1 => format!(r#" start="{start}""#),
        _ => String::new(),
    };
    let items: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", item.replace('\n', "")))
        .collect();
    format!(r#"<{tag}{start_attr} style="{style}">{items}</{tag}>"#)
}

fn render_quote(lines: &[&str], colors: &ColorConfig) -> String {
    let inner = lines.join("<br/>");
    format!(
        r#"<blockquote style="background-color: {}; border-left: 4px solid {}; padding: 4px; margin: 8px 0;"><font color="{QUOTE_TEXT_COLOR}"><i>{}</i></font></blockquote>"#,
        colors.blockquote_bg,
        colors.blockquote_border,
        inner.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::inline;
    use crate::markdown::stages::ProtectedText;

    fn run(text: &str, arena: &mut FragmentArena) -> String {
        let escaped = inline::transform(ProtectedText::new(text.to_string()).escape(), arena);
        let structured = structure(escaped, arena, &ColorConfig::default());
        arena.restore(structured.into_string())
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_unordered_list_merged() {
        let mut arena = FragmentArena::new();
        let html = run("- a\n- b\n\n- c\nafter", &mut arena);
        assert_eq!(
            html,
            r#"<ul style="margin: 8px 0;"><li>a</li><li>b</li><li>c</li></ul>
after"#
        );
    }

    #[test]
    fn test_task_list_separate_from_bullets() {
        let mut arena = FragmentArena::new();
        let html = run("- [x] done\n- [ ] todo\n- plain", &mut arena);
        assert!(html.starts_with(r#"<ul style="list-style-type: none; margin: 8px 0;"><li>☑ done</li><li>☐ todo</li></ul>"#));
        assert!(html.ends_with(r#"<ul style="margin: 8px 0;"><li>plain</li></ul>"#));
    }

    #[test]
    fn test_blockquote_lines_joined() {
        let mut arena = FragmentArena::new();
        let html = run("> one\n> two\n>\n> three\n\n> other", &mut arena);
        assert_eq!(count(&html, "<blockquote"), 2);
        assert!(html.contains("<i>one<br/>two<br/><br/>three</i>"));
        assert!(html.contains("<i>other</i>"));
    }

    #[test]
    fn test_quote_marker_needs_space() {
        let mut arena = FragmentArena::new();
        let html = run("x\n>= 5 holds\n>not a quote", &mut arena);
        assert_eq!(html, "x\n&gt;= 5 holds\n&gt;not a quote");
        assert_eq!(arena.fragment_count(), 0);
    }

    #[test]
    fn test_blockquote_colors() {
        let mut arena = FragmentArena::new();
        let colors = ColorConfig::default()
            .with_blockquote_bg("#111")
            .with_blockquote_border("#222");
        let escaped = ProtectedText::new("> q".to_string()).escape();
        let text = structure(escaped, &mut arena, &colors).into_string();
        let html = arena.restore(text);
        assert!(html.contains("background-color: #111; border-left: 4px solid #222;"));
    }

    #[test]
    fn test_ordered_list_single_segment() {
        let mut arena = FragmentArena::new();
        let html = run("1. a\n2. b\n\n3. c", &mut arena);
        assert_eq!(
            html,
            r#"<ol style="margin: 8px 0;"><li>a</li><li>b</li><li>c</li></ol>"#
        );
    }

    #[test]
    fn test_ordered_list_continues_across_block() {
        let mut arena = FragmentArena::new();
        let code = arena.push(FragmentKind::Block, "<pre>x</pre>".to_string());
        let html = run(&format!("1. a\n2. b\n\n{code}\n\n3. c"), &mut arena);
        assert_eq!(
            html,
            r#"<ol style="margin: 8px 0;"><li>a</li><li>b</li></ol>

<pre>x</pre>

<ol start="3" style="margin: 8px 0;"><li>c</li></ol>"#
        );
    }

    #[test]
    fn test_ordered_list_continues_across_quote() {
        let mut arena = FragmentArena::new();
        let html = run("1. a\n> note\n2. b\n3. c", &mut arena);
        assert_eq!(count(&html, "<ol"), 2);
        assert!(html.contains(r#"<ol start="2" style="margin: 8px 0;"><li>b</li><li>c</li></ol>"#));
        assert!(html.contains("<i>note</i>"));
    }

    #[test]
    fn test_ordered_list_continues_across_inline_token() {
        let mut arena = FragmentArena::new();
        let code = arena.push(FragmentKind::Inline, "<span>npm i</span>".to_string());
        let html = run(&format!("1. Run:\n{code}\n1. Next"), &mut arena);
        assert_eq!(
            html,
            r#"<ol style="margin: 8px 0;"><li>Run:</li></ol>
<span>npm i</span>
<ol start="2" style="margin: 8px 0;"><li>Next</li></ol>"#
        );
    }

    #[test]
    fn test_ordered_list_ends_at_other_content() {
        let mut arena = FragmentArena::new();
        let html = run("1. a\n\nParagraph\n\n1. fresh", &mut arena);
        assert_eq!(count(&html, "start="), 0);
        assert_eq!(count(&html, "<ol"), 2);
        assert!(html.contains("\n\nParagraph\n\n"));
    }

    #[test]
    fn test_ordered_list_trailing_block_not_absorbed() {
        let mut arena = FragmentArena::new();
        let code = arena.push(FragmentKind::Block, "<pre>x</pre>".to_string());
        let html = run(&format!("1. a\n\n{code}\n\nDone"), &mut arena);
        assert_eq!(
            html,
            r#"<ol style="margin: 8px 0;"><li>a</li></ol>

<pre>x</pre>

Done"#
        );
    }

    #[test]
    fn test_ordered_list_honours_first_number() {
        let mut arena = FragmentArena::new();
        let code = arena.push(FragmentKind::Block, "<pre>x</pre>".to_string());
        let html = run(&format!("4. d\n5. e\n{code}\n6. f"), &mut arena);
        assert!(html.starts_with(r#"<ol start="4" style="margin: 8px 0;">"#));
        assert!(html.contains(r#"<ol start="6" style="margin: 8px 0;"><li>f</li></ol>"#));
    }

    #[test]
    fn test_bullets_inside_ordered_list_interrupt() {
        let mut arena = FragmentArena::new();
        let html = run("1. a\n   - sub\n2. b", &mut arena);
        assert!(html.contains(r#"<ul style="margin: 8px 0;"><li>sub</li></ul>"#));
        assert!(html.contains(r#"<ol start="2" style="margin: 8px 0;"><li>b</li></ol>"#));
    }
}
