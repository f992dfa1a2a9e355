//! Sequential batch execution shared by the push and pull engines.
//!
//! One batch spans multiple remote calls, so it is the only place in the
//! crate with pacing and cancellation concerns. Items run strictly
//! sequentially; a per-item failure is recorded and the batch continues.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::debug;

use crate::models::{BatchSyncReport, SyncResult};

/// Inter-item delay state, owned by the caller of `sync_batch` and passed
/// in explicitly so the policy is testable and cannot leak across batches.
#[derive(Debug)]
pub struct Scheduler {
    delay: Duration,
    last_call: Option<Instant>,
}

impl Scheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_call: None,
        }
    }

    /// Sleep out whatever remains of the delay since the previous call.
    /// The first call never sleeps.
    pub fn pause(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                std::thread::sleep(self.delay - elapsed);
            }
        }
        self.last_call = Some(Instant::now());
    }
}

/// Cooperative cancellation flag, checked between items, never mid-item.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Progress callback: (current 1-based, total, current item title).
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize, usize, &str);

/// Drive one batch: progress callback, cancellation check, pacing, then the
/// per-item work with error isolation. Returns the aggregate report; when
/// cancelled, the report holds the partial results collected so far.
pub fn run_batch<T, F>(
    items: &[T],
    title_of: impl Fn(&T) -> &str,
    scheduler: &mut Scheduler,
    cancel: &CancelToken,
    mut on_progress: Option<ProgressFn<'_>>,
    mut work: F,
) -> BatchSyncReport
where
    F: FnMut(&T) -> Result<SyncResult>,
{
    let total = items.len();
    let mut details = Vec::with_capacity(total);

    for (idx, item) in items.iter().enumerate() {
        if cancel.is_cancelled() {
            debug!(processed = idx, total, "batch cancelled");
            break;
        }
        if let Some(callback) = on_progress.as_deref_mut() {
            callback(idx + 1, total, title_of(item));
        }
        scheduler.pause();

        let result = match work(item) {
            Ok(result) => result,
            Err(err) => SyncResult::failed(format!("{err:#}")),
        };
        details.push(result);
    }

    BatchSyncReport::from_details(total, details)
}
