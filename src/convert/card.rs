//! Markdown → card + checklist conversion for the board target.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::models::StoryRecord;

/// Flat card payload for the board system. Label and member ids are filled
/// in by the push engine after field mapping; the converter leaves them
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardPayload {
    pub name: String,
    pub desc: String,
    #[serde(rename = "idList")]
    pub id_list: String,
    #[serde(rename = "idLabels")]
    pub label_ids: Vec<String>,
    #[serde(rename = "idMembers")]
    pub member_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub checklist: Option<ChecklistPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistPayload {
    pub name: String,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub text: String,
    pub checked: bool,
}

/// Convert a markdown document to a card payload.
///
/// The title comes from the first heading, or the first non-empty line when
/// no heading exists. Checkbox lines under a recognized "Acceptance
/// Criteria" heading become one checklist; everything else becomes the card
/// description. A document with zero checkbox lines yields `checklist: None`
/// so callers can tell "no criteria" from "empty criteria".
pub fn to_card_payload(markdown: &str, id_list: &str) -> CardPayload {
    let criteria_heading_re =
        Regex::new(r"(?i)^#{1,6}\s*Acceptance[ _]Criteria\s*:?\s*$").expect("Invalid regex pattern");
    let checkbox_re =
        Regex::new(r"^\s*-\s*\[([ xX])\]\s*(.*)$").expect("Invalid regex pattern");

    let mut name = String::new();
    let mut desc_lines: Vec<&str> = Vec::new();
    let mut items: Vec<ChecklistItem> = Vec::new();
    let mut in_criteria = false;

    for line in markdown.lines() {
        let trimmed = line.trim();

        if criteria_heading_re.is_match(trimmed) {
            in_criteria = true;
            continue;
        }
        if in_criteria {
            if let Some(caps) = checkbox_re.captures(trimmed) {
                let checked = caps
                    .get(1)
                    .map(|m| m.as_str().eq_ignore_ascii_case("x"))
                    .unwrap_or(false);
                let text = caps.get(2).map(|m| m.as_str().trim_end()).unwrap_or("");
                items.push(ChecklistItem {
                    text: text.to_string(),
                    checked,
                });
                continue;
            }
            // Any other heading closes the criteria section.
            if trimmed.starts_with('#') {
                in_criteria = false;
            } else {
                continue;
            }
        }

        if name.is_empty() {
            if let Some(heading) = trimmed.strip_prefix('#') {
                name = heading.trim_start_matches('#').trim().to_string();
                continue;
            }
            if !trimmed.is_empty() {
                name = trimmed.to_string();
                continue;
            }
        }
        desc_lines.push(line);
    }

    let desc = desc_lines.join("\n").trim().to_string();
    let checklist = if items.is_empty() {
        None
    } else {
        Some(ChecklistPayload {
            name: "Acceptance Criteria".to_string(),
            items,
        })
    };

    CardPayload {
        name,
        desc,
        id_list: id_list.to_string(),
        label_ids: Vec::new(),
        member_ids: Vec::new(),
        due: None,
        checklist,
    }
}

/// Render a story record as a standalone markdown document: title heading,
/// description, then an Acceptance Criteria section when criteria exist.
/// This is the form both converters consume when pushing a record.
pub fn story_document(record: &StoryRecord) -> String {
    let mut out = format!("# {}\n", record.title);
    if !record.description.is_empty() {
        out.push('\n');
        out.push_str(&record.description);
        out.push('\n');
    }
    if !record.acceptance_criteria.is_empty() {
        out.push_str("\n## Acceptance Criteria\n");
        for criterion in &record.acceptance_criteria {
            let mark = if criterion.checked { 'x' } else { ' ' };
            out.push_str(&format!("- [{mark}] {}\n", criterion.text));
        }
    }
    out
}
