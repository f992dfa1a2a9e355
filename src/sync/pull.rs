//! Pull engine: fetch remote items since a watermark, convert them back to
//! markup, and merge against local content.
//!
//! Merge policy per item: remote wins when the diff is clean; conflicting
//! items are withheld pending caller resolutions; remote items not matched
//! to any local key are appended to the document.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::convert::rich::from_rich_document;
use crate::models::{
    AcceptanceCriterion, BatchSyncReport, PendingConflict, StoryRecord, SyncResult,
};
use crate::parser::story::{render, StoryParser};
use crate::remote::tracker::{TrackerApi, TrackerConfig, TrackerIssue};
use crate::remote::RemoteError;
use crate::sync::batch::CancelToken;
use crate::sync::conflict::detect_conflicts;

/// Result of one pull invocation: the merged markup, the conflicts that
/// still need caller resolutions, and the per-item report.
#[derive(Debug)]
pub struct PullOutcome {
    pub markup: String,
    pub pending: Vec<PendingConflict>,
    pub report: BatchSyncReport,
}

/// Fetch remote items, filtered to those updated at or after the watermark
/// when one is given.
pub fn fetch_since<A: TrackerApi>(
    api: &A,
    config: &TrackerConfig,
    watermark: Option<DateTime<Utc>>,
) -> Result<Vec<TrackerIssue>, RemoteError> {
    let mut jql = format!(
        "project = \"{}\" AND issuetype = \"{}\"",
        config.project_key, config.issue_type
    );
    if let Some(watermark) = watermark {
        jql.push_str(&format!(" AND updated >= \"{}\"", watermark.to_rfc3339()));
    }
    api.search(&jql)
}

/// Convert a remote issue back to a story record: reverse rich-document
/// conversion for the description plus direct field copies; sub-tasks
/// become acceptance criteria with `checked` from their completion state.
pub fn issue_to_record(issue: &TrackerIssue) -> StoryRecord {
    let mut record = StoryRecord::new(&issue.summary);
    record.description = from_rich_document(&issue.description);
    if let Some(priority) = &issue.priority {
        record.priority = priority.clone();
    }
    record.labels = issue.labels.clone();
    record.assignees = issue.assignee.iter().cloned().collect();
    record.reporter = issue.reporter.clone().unwrap_or_default();
    record.acceptance_criteria = issue
        .subtasks
        .iter()
        .map(|subtask| AcceptanceCriterion::new(&subtask.summary, subtask.done))
        .collect();
    record.remote_key = Some(issue.key.clone());
    record.remote_updated_at = Some(issue.updated_at);
    record
}

/// Pull remote edits into a local document.
///
/// For each fetched item: an unmatched key appends a new story; a matched
/// item older than the watermark leaves local content alone; a newer one
/// either replaces the local story (clean diff: remote wins) or is withheld
/// as a [`PendingConflict`] for the caller to resolve with
/// [`super::conflict::apply_resolutions`].
pub fn pull_document<A: TrackerApi>(
    api: &A,
    config: &TrackerConfig,
    local_markup: &str,
    watermark: Option<DateTime<Utc>>,
    cancel: &CancelToken,
) -> Result<PullOutcome> {
    config.validate()?;
    let issues = fetch_since(api, config, watermark)?;
    debug!(count = issues.len(), "fetched remote items");

    let parser = StoryParser::new();
    let mut records = parser.parse(local_markup);
    let mut pending = Vec::new();
    let mut details = Vec::new();
    let total = issues.len();

    for issue in &issues {
        if cancel.is_cancelled() {
            break;
        }
        let remote_record = issue_to_record(issue);
        let matched = records
            .iter_mut()
            .find(|record| record.remote_key.as_deref() == Some(issue.key.as_str()));

        match matched {
            None => {
                records.push(remote_record);
                details.push(SyncResult::created(issue.key.clone(), 0));
            }
            Some(local) => {
                let conflicts =
                    detect_conflicts(local, &remote_record, issue.updated_at, watermark);
                if conflicts.is_empty() {
                    let remote_is_new =
                        watermark.map_or(true, |mark| issue.updated_at > mark);
                    if remote_is_new {
                        *local = remote_record;
                    } else {
                        // Unchanged remotely since the last sync; local
                        // content stands.
                        local.remote_updated_at = Some(issue.updated_at);
                    }
                    details.push(SyncResult::created(issue.key.clone(), 0));
                } else {
                    pending.push(PendingConflict {
                        remote_key: issue.key.clone(),
                        conflicts,
                    });
                    details.push(SyncResult::created(issue.key.clone(), 0));
                }
            }
        }
    }

    Ok(PullOutcome {
        markup: render(&records),
        pending,
        report: BatchSyncReport::from_details(total, details),
    })
}
