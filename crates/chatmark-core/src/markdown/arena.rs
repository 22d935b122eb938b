//! Placeholder arena
//!
//! Rendered fragments are parked here while the surrounding text goes through
//! destructive transforms. The working text only carries a serialized index
//! (`\0FRAG<n>\0`), which is swapped back for the fragment at the end.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

/// Delimits placeholder tokens. Stripped from input documents, so it can
/// only ever appear as part of a token.
pub const SENTINEL: char = '\0';

/// Upper bound on restoration passes
const MAX_RESTORE_PASSES: usize = 5;

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x00FRAG(\d+)\x00").unwrap());

/// How a fragment takes part in text flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Sits inside a paragraph (inline code)
    Inline,
    /// Stands on its own line and is never wrapped in a paragraph
    Block,
}

#[derive(Debug, Clone)]
struct Fragment {
    kind: FragmentKind,
    html: String,
}

/// Append-only store of rendered fragments, owned by a single render call
#[derive(Debug, Default)]
pub struct FragmentArena {
    fragments: Vec<Fragment>,
}

impl FragmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fragment and return the token that stands in for it
    pub fn push(&mut self, kind: FragmentKind, html: String) -> String {
        let index = self.fragments.len();
        self.fragments.push(Fragment { kind, html });
        token(index)
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// True when `line` (already trimmed) is exactly one known token of
    /// either kind
    pub fn is_token(&self, line: &str) -> bool {
        parse_token(line).is_some_and(|index| index < self.fragments.len())
    }

    /// True when `line` (already trimmed) is exactly one block token
    pub fn is_block_token(&self, line: &str) -> bool {
        parse_token(line)
            .and_then(|index| self.fragments.get(index))
            .is_some_and(|fragment| fragment.kind == FragmentKind::Block)
    }

    /// Substitute every token in `text` with its fragment
    ///
    /// Fragments may themselves contain tokens (inline code inside a table
    /// cell or list item), so this runs in passes until nothing is left or
    /// the pass limit is hit. Unknown or leftover tokens stay as literal text.
    pub fn restore(&self, mut text: String) -> String {
        for pass in 0..MAX_RESTORE_PASSES {
            if !text.contains(SENTINEL) {
                return text;
            }

            let mut replaced = 0usize;
            let next = TOKEN_REGEX
                .replace_all(&text, |caps: &Captures| {
                    let fragment = caps[1]
                        .parse::<usize>()
                        .ok()
                        .and_then(|index| self.fragments.get(index));
                    match fragment {
                        Some(fragment) => {
                            replaced += 1;
                            fragment.html.clone()
                        }
                        None => caps[0].to_string(),
                    }
                })
                .into_owned();
            text = next;

            debug!("Restore pass {}: {} fragments substituted", pass + 1, replaced);
            if replaced == 0 {
                break;
            }
        }

        if text.contains(SENTINEL) {
            warn!("Unresolved placeholders left in rendered output");
        }
        text
    }
}

fn token(index: usize) -> String {
    format!("{SENTINEL}FRAG{index}{SENTINEL}")
}

/// Index of a lone token, or None if `line` is anything else
fn parse_token(line: &str) -> Option<usize> {
    line.strip_prefix(SENTINEL)?
        .strip_prefix("FRAG")?
        .strip_suffix(SENTINEL)?
        .parse()
        .ok()
}
