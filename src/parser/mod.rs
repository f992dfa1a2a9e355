//! Story markup and inline markdown parsing
//!
//! This module handles:
//! - Splitting story markup into structured records (tolerant, never fails)
//! - Rendering records back to markup (the round-trip inverse)
//! - Single-pass inline emphasis/code/link/strikethrough tokenization

pub mod inline;
pub mod story;

pub use inline::{parse_inline, render_inline, InlineNode};
pub use story::StoryParser;
