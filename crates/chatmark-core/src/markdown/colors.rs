//! Color configuration for rendered HTML
//!
//! Values are opaque CSS strings inserted verbatim into `style` attributes.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CODE_BG: &str = "#20FFFFFF";
pub const DEFAULT_INLINE_CODE_BG: &str = "#30FFFFFF";
pub const DEFAULT_BLOCKQUOTE_BG: &str = "transparent";
pub const DEFAULT_BLOCKQUOTE_BORDER: &str = "#808080";

/// Colors used by code blocks, inline code and blockquotes
///
/// Every key falls back to its own default when omitted, so a config file or
/// JSON object may name any subset of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    #[serde(alias = "codeBg")]
    pub code_bg: String,
    #[serde(alias = "inlineCodeBg")]
    pub inline_code_bg: String,
    #[serde(alias = "blockquoteBg")]
    pub blockquote_bg: String,
    #[serde(alias = "blockquoteBorder")]
    pub blockquote_border: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            code_bg: DEFAULT_CODE_BG.to_string(),
            inline_code_bg: DEFAULT_INLINE_CODE_BG.to_string(),
            blockquote_bg: DEFAULT_BLOCKQUOTE_BG.to_string(),
            blockquote_border: DEFAULT_BLOCKQUOTE_BORDER.to_string(),
        }
    }
}

impl ColorConfig {
    pub fn with_code_bg(mut self, color: impl Into<String>) -> Self {
        self.code_bg = color.into();
        self
    }

    pub fn with_inline_code_bg(mut self, color: impl Into<String>) -> Self {
        self.inline_code_bg = color.into();
        self
    }

    pub fn with_blockquote_bg(mut self, color: impl Into<String>) -> Self {
        self.blockquote_bg = color.into();
        self
    }

    pub fn with_blockquote_border(mut self, color: impl Into<String>) -> Self {
        self.blockquote_border = color.into();
        self
    }
}
