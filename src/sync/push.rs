//! Push engines: one per target system.
//!
//! Both follow the same shape: map the record to a platform payload, issue
//! the create (or update, when the record already carries a remote key),
//! then create nested items from the acceptance criteria sequentially. A
//! nested-item failure is logged and skipped; it never fails the parent.

use anyhow::Result;
use std::collections::HashMap;
use tracing::warn;

use crate::convert::card::{story_document, to_card_payload};
use crate::convert::rich::to_rich_document;
use crate::mapping::{resolve_assignees, resolve_labels, resolve_priority_label};
use crate::models::{BatchSyncReport, Member, StoryRecord, SyncResult};
use crate::remote::board::{BoardApi, BoardConfig};
use crate::remote::tracker::{IdRef, IssueFields, KeyRef, NameRef, TrackerApi, TrackerConfig};
use crate::sync::batch::{run_batch, CancelToken, ProgressFn, Scheduler};

/// Push engine for the issue tracker target.
pub struct TrackerPush<'a, A: TrackerApi> {
    api: &'a A,
    config: &'a TrackerConfig,
}

impl<'a, A: TrackerApi> TrackerPush<'a, A> {
    /// Fails fast when the configuration is unusable: no remote call can
    /// succeed without it, so the batch never starts.
    pub fn new(api: &'a A, config: &'a TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { api, config })
    }

    pub fn sync_one(&self, record: &StoryRecord, directory: &[Member]) -> SyncResult {
        let fields = self.build_fields(record, directory);

        // Records that already carry a remote key are updated in place
        // rather than duplicated by a second create.
        if let Some(key) = &record.remote_key {
            return match self.api.update_issue(key, &fields) {
                Ok(()) => SyncResult {
                    success: true,
                    remote_key: Some(key.clone()),
                    error: None,
                    sub_items_created: 0,
                },
                Err(err) => SyncResult::failed(err.to_string()),
            };
        }

        let created = match self.api.create_issue(&fields) {
            Ok(created) => created,
            Err(err) => return SyncResult::failed(err.to_string()),
        };

        let mut sub_items_created = 0;
        for criterion in &record.acceptance_criteria {
            let subtask = self.build_subtask_fields(&created.key, &criterion.text);
            match self.api.create_issue(&subtask) {
                Ok(_) => sub_items_created += 1,
                Err(err) => {
                    warn!(
                        parent = %created.key,
                        criterion = %criterion.text,
                        error = %err,
                        "sub-task creation failed; skipping"
                    );
                }
            }
        }

        SyncResult::created(created.key, sub_items_created)
    }

    pub fn sync_batch(
        &self,
        records: &[StoryRecord],
        scheduler: &mut Scheduler,
        cancel: &CancelToken,
        on_progress: Option<ProgressFn<'_>>,
    ) -> BatchSyncReport {
        let directory = match self.api.assignable_users() {
            Ok(members) => members,
            Err(err) => {
                warn!(error = %err, "assignee directory unavailable; assignees will be dropped");
                Vec::new()
            }
        };

        run_batch(
            records,
            |record| record.title.as_str(),
            scheduler,
            cancel,
            on_progress,
            |record| Ok(self.sync_one(record, &directory)),
        )
    }

    fn build_fields(&self, record: &StoryRecord, directory: &[Member]) -> IssueFields {
        let description = if record.description.is_empty() {
            None
        } else {
            Some(to_rich_document(&record.description))
        };

        let assignee = resolve_assignees(&record.assignees, directory, &self.config.alias_map)
            .into_iter()
            .next()
            .map(|id| IdRef { id });

        IssueFields {
            project: KeyRef {
                key: self.config.project_key.clone(),
            },
            summary: record.title.clone(),
            description,
            issuetype: NameRef {
                name: self.config.issue_type.clone(),
            },
            priority: Some(NameRef {
                name: record.priority.clone(),
            }),
            labels: record.labels.clone(),
            assignee,
            parent: None,
        }
    }

    fn build_subtask_fields(&self, parent_key: &str, summary: &str) -> IssueFields {
        IssueFields {
            project: KeyRef {
                key: self.config.project_key.clone(),
            },
            summary: summary.to_string(),
            description: None,
            issuetype: NameRef {
                name: self.config.subtask_type.clone(),
            },
            priority: None,
            labels: Vec::new(),
            assignee: None,
            parent: Some(KeyRef {
                key: parent_key.to_string(),
            }),
        }
    }
}

/// Push engine for the board target.
pub struct BoardPush<'a, A: BoardApi> {
    api: &'a A,
    config: &'a BoardConfig,
}

impl<'a, A: BoardApi> BoardPush<'a, A> {
    pub fn new(api: &'a A, config: &'a BoardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { api, config })
    }

    pub fn sync_one(
        &self,
        record: &StoryRecord,
        members: &[Member],
        known_labels: &HashMap<String, String>,
    ) -> SyncResult {
        let mut card = to_card_payload(&story_document(record), &self.config.list_id);
        card.label_ids = resolve_labels(&record.labels, known_labels);
        if let Some(label_id) =
            resolve_priority_label(&record.priority, &self.config.priority_label_map)
        {
            card.label_ids.push(label_id);
        }
        card.member_ids = resolve_assignees(&record.assignees, members, &self.config.alias_map);

        if let Some(card_id) = &record.remote_key {
            return match self.api.update_card(card_id, &card) {
                Ok(()) => SyncResult {
                    success: true,
                    remote_key: Some(card_id.clone()),
                    error: None,
                    sub_items_created: 0,
                },
                Err(err) => SyncResult::failed(err.to_string()),
            };
        }

        let created = match self.api.create_card(&card) {
            Ok(created) => created,
            Err(err) => return SyncResult::failed(err.to_string()),
        };

        let mut sub_items_created = 0;
        if let Some(checklist) = &card.checklist {
            match self.api.create_checklist(&created.id, &checklist.name) {
                Ok(checklist_id) => {
                    for item in &checklist.items {
                        match self.api.add_check_item(&checklist_id, &item.text, item.checked) {
                            Ok(_) => sub_items_created += 1,
                            Err(err) => {
                                warn!(
                                    card = %created.id,
                                    item = %item.text,
                                    error = %err,
                                    "checklist item creation failed; skipping"
                                );
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(
                        card = %created.id,
                        error = %err,
                        "checklist creation failed; card kept without checklist"
                    );
                }
            }
        }

        SyncResult::created(created.id, sub_items_created)
    }

    pub fn sync_batch(
        &self,
        records: &[StoryRecord],
        scheduler: &mut Scheduler,
        cancel: &CancelToken,
        on_progress: Option<ProgressFn<'_>>,
    ) -> BatchSyncReport {
        let members = match self.api.members() {
            Ok(members) => members,
            Err(err) => {
                warn!(error = %err, "board member directory unavailable; assignees will be dropped");
                Vec::new()
            }
        };
        let known_labels: HashMap<String, String> = match self.api.labels() {
            Ok(labels) => labels
                .into_iter()
                .map(|label| (label.name, label.id))
                .collect(),
            Err(err) => {
                warn!(error = %err, "board labels unavailable; labels will be dropped");
                HashMap::new()
            }
        };

        run_batch(
            records,
            |record| record.title.as_str(),
            scheduler,
            cancel,
            on_progress,
            |record| Ok(self.sync_one(record, &members, &known_labels)),
        )
    }
}
