use serde::{Deserialize, Serialize};

/// Outcome of pushing or pulling a single story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub success: bool,
    pub remote_key: Option<String>,
    pub error: Option<String>,
    pub sub_items_created: usize,
}

impl SyncResult {
    pub fn created(key: String, sub_items_created: usize) -> Self {
        Self {
            success: true,
            remote_key: Some(key),
            error: None,
            sub_items_created,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            remote_key: None,
            error: Some(error.into()),
            sub_items_created: 0,
        }
    }
}

/// Aggregate report for one push or pull invocation.
///
/// Never persisted by this crate; callers present partial success from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSyncReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub details: Vec<SyncResult>,
}

impl BatchSyncReport {
    pub fn from_details(total: usize, details: Vec<SyncResult>) -> Self {
        let succeeded = details.iter().filter(|r| r.success).count();
        let failed = details.len() - succeeded;
        Self {
            total,
            succeeded,
            failed,
            details,
        }
    }
}

/// One field-level disagreement between local and remote content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConflict {
    pub field: String,
    pub local_value: String,
    pub remote_value: String,
}

/// Caller-supplied choice for one conflicted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Local,
    Remote,
}

/// A story whose remote edits were withheld pending caller resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConflict {
    pub remote_key: String,
    pub conflicts: Vec<SyncConflict>,
}
