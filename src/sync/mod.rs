//! Push/pull synchronization engines
//!
//! This module handles:
//! - Sequential batch execution with inter-item throttling and cancellation
//! - Pushing records to the tracker and board targets
//! - Pulling remote edits back with watermark-gated conflict detection

pub mod batch;
pub mod conflict;
pub mod pull;
pub mod push;

pub use batch::{run_batch, CancelToken, ProgressFn, Scheduler};
pub use conflict::{apply_resolutions, detect_conflicts};
pub use pull::{fetch_since, issue_to_record, pull_document, PullOutcome};
pub use push::{BoardPush, TrackerPush};
