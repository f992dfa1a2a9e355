//! Document format converters
//!
//! This module handles:
//! - Markdown ⇄ tree-structured rich document (first target system)
//! - Markdown → flat card + checklist payload (second target system)

pub mod card;
pub mod rich;

pub use card::{story_document, to_card_payload, CardPayload, ChecklistItem, ChecklistPayload};
pub use rich::{
    from_rich_document, nodes_from_json, to_rich_document, Mark, RichDoc, RichNode,
};
