use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default priority assigned when the markup carries none.
pub const DEFAULT_PRIORITY: &str = "Medium";

/// One parsed unit of work from the story markup.
///
/// Records are rebuilt fresh on every parse of a markup blob; the platform
/// `remote_key` (and its last-seen update time) are the only values carried
/// forward between parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub reporter: String,
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
    pub remote_key: Option<String>,
    pub remote_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceCriterion {
    pub text: String,
    pub checked: bool,
}

impl StoryRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: DEFAULT_PRIORITY.to_string(),
            labels: Vec::new(),
            assignees: Vec::new(),
            reporter: String::new(),
            acceptance_criteria: Vec::new(),
            remote_key: None,
            remote_updated_at: None,
        }
    }

    pub fn mark_synced(&mut self, key: String, updated_at: DateTime<Utc>) {
        self.remote_key = Some(key);
        self.remote_updated_at = Some(updated_at);
    }

    pub fn is_synced(&self) -> bool {
        self.remote_key.is_some()
    }

    pub fn criteria_done(&self) -> usize {
        self.acceptance_criteria.iter().filter(|c| c.checked).count()
    }
}

impl AcceptanceCriterion {
    pub fn new(text: impl Into<String>, checked: bool) -> Self {
        Self {
            text: text.into(),
            checked,
        }
    }
}

/// Directory entry used to resolve assignee aliases to platform member ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub username: String,
    pub display_name: String,
}
