//! Story markup parser - extracts structured records from plain text
//!
//! The grammar is line-oriented: a column-0 `- Story:` marker opens each
//! section; within a section, `Key: value` lines fill the record's fields
//! and a fenced `Acceptance_Criteria:` block holds checkbox items. The
//! parser never fails: malformed lines degrade to defaults or are skipped,
//! because input may come from hand edits or generated text that imperfectly
//! follows the grammar.

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::models::{AcceptanceCriterion, StoryRecord};

/// The column-0 marker that opens a story section.
const STORY_MARKER: &str = "- Story:";

/// One classified line of story markup.
#[derive(Debug, PartialEq, Eq)]
enum TaggedLine<'a> {
    StoryMarker(&'a str),
    Field { key: &'a str, value: &'a str },
    Checkbox { checked: bool, text: &'a str },
    Blank,
    Plain(&'a str),
}

/// Which multi-line field the parser is currently filling.
#[derive(Debug, PartialEq, Eq)]
enum FieldContext {
    None,
    Description,
    Criteria,
}

pub struct StoryParser {
    field_re: Regex,
    checkbox_re: Regex,
    labels_re: Regex,
}

impl StoryParser {
    pub fn new() -> Self {
        // The patterns are fixed literals; construction cannot fail.
        Self {
            field_re: Regex::new(r"^\s{0,8}([A-Za-z_][A-Za-z0-9_]*):\s*(.*)$")
                .expect("Invalid regex pattern"),
            checkbox_re: Regex::new(r"^\s*-\s*\[([ xX])\]\s*(.*)$")
                .expect("Invalid regex pattern"),
            labels_re: Regex::new(r"^\[(.*)\]$")
                .expect("Invalid regex pattern"),
        }
    }

    /// Parse markup into records. Never fails; unrecognizable content is
    /// skipped and missing fields fall back to documented defaults.
    pub fn parse(&self, text: &str) -> Vec<StoryRecord> {
        let mut records = Vec::new();
        let mut current: Option<StoryRecord> = None;
        let mut context = FieldContext::None;

        for line in text.lines() {
            match self.tag_line(line) {
                TaggedLine::StoryMarker(title) => {
                    if let Some(record) = current.take() {
                        records.push(record);
                    }
                    current = Some(StoryRecord::new(title.trim()));
                    context = FieldContext::None;
                }
                TaggedLine::Field { key, value } => {
                    let Some(ref mut record) = current else {
                        continue;
                    };
                    context = self.apply_field(record, key, value);
                }
                TaggedLine::Checkbox { checked, text } => {
                    let Some(ref mut record) = current else {
                        continue;
                    };
                    if context == FieldContext::Criteria {
                        record
                            .acceptance_criteria
                            .push(AcceptanceCriterion::new(text.trim_end(), checked));
                    }
                }
                TaggedLine::Blank => {}
                TaggedLine::Plain(rest) => {
                    let Some(ref mut record) = current else {
                        continue;
                    };
                    // Continuation lines extend the open description.
                    if context == FieldContext::Description {
                        if !record.description.is_empty() {
                            record.description.push(' ');
                        }
                        record.description.push_str(rest.trim());
                    }
                }
            }
        }

        if let Some(record) = current {
            records.push(record);
        }

        records
    }

    fn tag_line<'a>(&self, line: &'a str) -> TaggedLine<'a> {
        if let Some(title) = line.strip_prefix(STORY_MARKER) {
            return TaggedLine::StoryMarker(title);
        }
        if line.trim().is_empty() {
            return TaggedLine::Blank;
        }
        if let Some(caps) = self.checkbox_re.captures(line) {
            let checked = caps
                .get(1)
                .map(|m| m.as_str().eq_ignore_ascii_case("x"))
                .unwrap_or(false);
            let text = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            return TaggedLine::Checkbox { checked, text };
        }
        if let Some(caps) = self.field_re.captures(line) {
            let key = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            return TaggedLine::Field { key, value };
        }
        TaggedLine::Plain(line)
    }

    /// Apply one recognized `Key: value` line and return the context the
    /// following lines belong to. Unknown keys are ignored.
    fn apply_field(&self, record: &mut StoryRecord, key: &str, value: &str) -> FieldContext {
        let value = value.trim();
        match key {
            "Description" => {
                record.description = value.to_string();
                return FieldContext::Description;
            }
            "Acceptance_Criteria" => return FieldContext::Criteria,
            "Priority" => {
                if !value.is_empty() {
                    record.priority = value.to_string();
                }
            }
            "Labels" => record.labels = self.split_labels(value),
            "Assignees" => record.assignees = split_list(value),
            "Reporter" => record.reporter = value.to_string(),
            "Remote_Key" => {
                if !value.is_empty() {
                    record.remote_key = Some(value.to_string());
                }
            }
            "Remote_Updated" => {
                record.remote_updated_at = DateTime::parse_from_rfc3339(value)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc));
            }
            _ => {}
        }
        FieldContext::None
    }

    fn split_labels(&self, value: &str) -> Vec<String> {
        let inner = match self.labels_re.captures(value) {
            Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(""),
            // Tolerate a missing bracket pair.
            None => value,
        };
        split_list(inner)
    }
}

impl Default for StoryParser {
    fn default() -> Self {
        Self::new()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Render records back to story markup. Inverse of [`StoryParser::parse`]:
/// title, description, priority, labels, assignees, reporter and criterion
/// (text, checked) pairs survive the round trip in order.
pub fn render(records: &[StoryRecord]) -> String {
    let mut out = String::new();
    for (idx, record) in records.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(STORY_MARKER);
        out.push(' ');
        out.push_str(&record.title);
        out.push('\n');

        if !record.description.is_empty() {
            // Descriptions are one logical line in the grammar.
            let flat = record.description.replace('\n', " ");
            out.push_str(&format!("  Description: {flat}\n"));
        }
        if !record.acceptance_criteria.is_empty() {
            out.push_str("  Acceptance_Criteria:\n");
            for criterion in &record.acceptance_criteria {
                let mark = if criterion.checked { 'x' } else { ' ' };
                out.push_str(&format!("    - [{mark}] {}\n", criterion.text));
            }
        }
        out.push_str(&format!("  Priority: {}\n", record.priority));
        if !record.labels.is_empty() {
            out.push_str(&format!("  Labels: [{}]\n", record.labels.join(", ")));
        }
        if !record.assignees.is_empty() {
            out.push_str(&format!("  Assignees: {}\n", record.assignees.join(", ")));
        }
        if !record.reporter.is_empty() {
            out.push_str(&format!("  Reporter: {}\n", record.reporter));
        }
        if let Some(key) = &record.remote_key {
            out.push_str(&format!("  Remote_Key: {key}\n"));
        }
        if let Some(updated) = &record.remote_updated_at {
            out.push_str(&format!("  Remote_Updated: {}\n", updated.to_rfc3339()));
        }
    }
    out
}
