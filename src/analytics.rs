//! Aggregate statistics over a parsed story document. Pure roll-ups, no I/O.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::StoryRecord;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentStats {
    pub total_stories: usize,
    pub synced: usize,
    pub unsynced: usize,
    pub total_criteria: usize,
    pub completed_criteria: usize,
    pub by_priority: HashMap<String, usize>,
}

impl DocumentStats {
    pub fn collect(records: &[StoryRecord]) -> Self {
        let mut stats = Self {
            total_stories: records.len(),
            ..Self::default()
        };
        for record in records {
            if record.is_synced() {
                stats.synced += 1;
            } else {
                stats.unsynced += 1;
            }
            stats.total_criteria += record.acceptance_criteria.len();
            stats.completed_criteria += record.criteria_done();
            *stats.by_priority.entry(record.priority.clone()).or_insert(0) += 1;
        }
        stats
    }

    /// Share of acceptance criteria completed, 0–100.
    pub fn completion_percent(&self) -> f32 {
        if self.total_criteria == 0 {
            return 0.0;
        }
        (self.completed_criteria as f32 / self.total_criteria as f32) * 100.0
    }
}
