//! Core data model for story synchronization
//!
//! This module holds:
//! - The parsed story record and its acceptance criteria
//! - Per-item and per-batch sync outcome types
//! - Conflict records produced by pull synchronization

pub mod story;
pub mod sync;

pub use story::{AcceptanceCriterion, Member, StoryRecord};
pub use sync::{BatchSyncReport, PendingConflict, Resolution, SyncConflict, SyncResult};
