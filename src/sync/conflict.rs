//! Timestamp-gated conflict detection and caller-driven resolution.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::{Resolution, StoryRecord, SyncConflict};

/// Compare a locally-parsed record to a remote-derived one.
///
/// Conflicts are only raised when the remote item changed after the last
/// sync watermark; with no watermark (a first pull) the remote content is
/// treated as authoritative and no conflicts are produced. Title,
/// description and priority are compared textually, whitespace-trimmed.
pub fn detect_conflicts(
    local: &StoryRecord,
    remote: &StoryRecord,
    remote_updated: DateTime<Utc>,
    watermark: Option<DateTime<Utc>>,
) -> Vec<SyncConflict> {
    let Some(watermark) = watermark else {
        return Vec::new();
    };
    if remote_updated <= watermark {
        return Vec::new();
    }

    let mut conflicts = Vec::new();
    let fields: [(&str, &str, &str); 3] = [
        ("title", &local.title, &remote.title),
        ("description", &local.description, &remote.description),
        ("priority", &local.priority, &remote.priority),
    ];
    for (field, local_value, remote_value) in fields {
        if local_value.trim() != remote_value.trim() {
            conflicts.push(SyncConflict {
                field: field.to_string(),
                local_value: local_value.to_string(),
                remote_value: remote_value.to_string(),
            });
        }
    }
    conflicts
}

/// Overlay caller-chosen values onto the remote-derived record.
///
/// The remote record is the base; each conflict whose resolution is
/// [`Resolution::Local`] takes the local value instead. A conflict without
/// a supplied resolution keeps the remote value.
pub fn apply_resolutions(
    local: &StoryRecord,
    remote: &StoryRecord,
    conflicts: &[SyncConflict],
    resolutions: &HashMap<String, Resolution>,
) -> StoryRecord {
    let mut merged = remote.clone();
    for conflict in conflicts {
        let choice = resolutions
            .get(&conflict.field)
            .copied()
            .unwrap_or(Resolution::Remote);
        if choice == Resolution::Local {
            match conflict.field.as_str() {
                "title" => merged.title = local.title.clone(),
                "description" => merged.description = local.description.clone(),
                "priority" => merged.priority = local.priority.clone(),
                _ => {}
            }
        }
    }
    merged
}
