//! Core library for chatmark
//!
//! - [`markdown`] converts assistant Markdown into the restricted HTML subset
//!   understood by simple rich-text surfaces.
//! - [`ai`] builds streaming request command lines for chat providers.

pub mod ai;
pub mod markdown;

pub use markdown::{render, render_opt, ColorConfig};
