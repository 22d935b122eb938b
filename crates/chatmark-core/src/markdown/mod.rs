//! Markdown to restricted HTML for assistant messages
//!
//! The target surface understands a small HTML subset: no flexbox, unreliable
//! heading sizes, and no `<ol>` renumbering across interruptions. Rendering
//! runs as a fixed pipeline over typed stages:
//!
//! 1. [`fragments::protect`] pulls code fences, inline code and tables out of
//!    the raw text into a per-call [`arena::FragmentArena`].
//! 2. The remaining text is HTML-escaped exactly once.
//! 3. [`inline::transform`] applies headings, rules, emphasis, links and
//!    list-item tags.
//! 4. [`blocks::structure`] groups lists and quotes into block fragments.
//! 5. [`flow::reassemble`] builds paragraphs and line breaks, after which all
//!    fragments are restored.
//! 6. [`cleanup::cleanup`] normalises breaks and empty paragraphs.

mod arena;
mod blocks;
mod cleanup;
mod colors;
mod escape;
mod flow;
mod fragments;
mod inline;
mod stages;

use tracing::debug;

pub use colors::ColorConfig;
pub use escape::escape_html;
pub use fragments::COPY_SCHEME;

use arena::FragmentArena;
use stages::RawText;

/// Render assistant Markdown to HTML
///
/// Never fails. Missing colors fall back to [`ColorConfig::default`].
pub fn render(text: &str, colors: Option<&ColorConfig>) -> String {
    if text.is_empty() {
        return String::new();
    }

    let default_colors;
    let colors = match colors {
        Some(colors) => colors,
        None => {
            default_colors = ColorConfig::default();
            &default_colors
        }
    };

    let mut arena = FragmentArena::new();
    let protected = fragments::protect(RawText::new(text), &mut arena, colors);
    let escaped = inline::transform(protected.escape(), &mut arena);
    let structured = blocks::structure(escaped, &mut arena, colors);
    let html = arena.restore(flow::reassemble(structured, &arena));
    let html = cleanup::cleanup(&html);

    debug!(
        "Rendered {} bytes of markdown into {} bytes of html ({} fragments)",
        text.len(),
        html.len(),
        arena.fragment_count()
    );
    html
}

/// [`render`] for a possibly absent document
pub fn render_opt(text: Option<&str>, colors: Option<&ColorConfig>) -> String {
    text.map(|text| render(text, colors)).unwrap_or_default()
}
