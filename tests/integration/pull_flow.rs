//! End-to-end pull tests: remote items → markup merge + conflict handling.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shuttle::convert::rich::to_rich_document;
use shuttle::models::Resolution;
use shuttle::parser::story::{render, StoryParser};
use shuttle::remote::tracker::{Subtask, TrackerConfig, TrackerIssue};
use shuttle::sync::batch::CancelToken;
use shuttle::sync::conflict::apply_resolutions;
use shuttle::sync::pull::{issue_to_record, pull_document};

use super::fakes::FakeTracker;

fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

fn remote_issue(key: &str, summary: &str, description: &str, updated: &str) -> TrackerIssue {
    TrackerIssue {
        key: key.to_string(),
        summary: summary.to_string(),
        description: to_rich_document(description).content,
        priority: Some("High".to_string()),
        labels: vec!["auth".to_string()],
        assignee: Some("Jane".to_string()),
        reporter: Some("PM".to_string()),
        subtasks: vec![Subtask {
            key: format!("{key}-s1"),
            summary: "verify".to_string(),
            done: true,
        }],
        updated_at: at(updated),
    }
}

fn config() -> TrackerConfig {
    TrackerConfig::new("https://tracker.example.com", "a@b.c", "token", "PROJ")
}

#[test]
fn test_pull_merges_matched_and_appends_new() {
    let local = "\
- Story: Known Story
  Description: local words
  Priority: High
  Remote_Key: PROJ-1
";
    let api = FakeTracker {
        remote_issues: vec![
            remote_issue("PROJ-1", "Known Story", "local words", "2024-06-02T00:00:00Z"),
            remote_issue("PROJ-2", "Brand New", "fresh remote story", "2024-06-03T00:00:00Z"),
        ],
        ..Default::default()
    };

    let outcome = pull_document(
        &api,
        &config(),
        local,
        Some(at("2024-06-01T00:00:00Z")),
        &CancelToken::new(),
    )
    .unwrap();

    // PROJ-1 is newer but identical on every compared field: clean diff,
    // remote wins without conflicts. PROJ-2 is appended.
    assert!(outcome.pending.is_empty());
    assert_eq!(outcome.report.total, 2);
    assert_eq!(outcome.report.succeeded, 2);
    assert!(outcome.markup.contains("- Story: Known Story"));
    assert!(outcome.markup.contains("- Story: Brand New"));
    assert!(outcome.markup.contains("Remote_Key: PROJ-2"));

    // The merged document parses back with the remote-derived criteria.
    let records = StoryParser::new().parse(&outcome.markup);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].acceptance_criteria.len(), 1);
    assert!(records[1].acceptance_criteria[0].checked);
}

#[test]
fn test_pull_conflict_then_resolution() {
    let local = "\
- Story: Local Title
  Description: local words
  Priority: Low
  Remote_Key: PROJ-1
";
    let remote = remote_issue(
        "PROJ-1",
        "Remote Title",
        "remote words",
        "2024-06-02T00:00:00Z",
    );
    let api = FakeTracker {
        remote_issues: vec![remote.clone()],
        ..Default::default()
    };

    let outcome = pull_document(
        &api,
        &config(),
        local,
        Some(at("2024-06-01T00:00:00Z")),
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(outcome.pending.len(), 1);
    let pending = &outcome.pending[0];
    let fields: Vec<&str> = pending.conflicts.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, vec!["title", "description", "priority"]);
    // Conflicted content is never applied silently.
    assert!(outcome.markup.contains("- Story: Local Title"));

    // Caller resolves: keep the local title, take remote for the rest.
    let parser = StoryParser::new();
    let local_record = parser.parse(local).remove(0);
    let remote_record = issue_to_record(&remote);
    let resolutions = HashMap::from([
        ("title".to_string(), Resolution::Local),
        ("description".to_string(), Resolution::Remote),
        ("priority".to_string(), Resolution::Remote),
    ]);
    let merged = apply_resolutions(
        &local_record,
        &remote_record,
        &pending.conflicts,
        &resolutions,
    );

    assert_eq!(merged.title, "Local Title");
    assert_eq!(merged.description, "remote words");
    assert_eq!(merged.priority, "High");

    let merged_markup = render(&[merged]);
    assert!(merged_markup.contains("- Story: Local Title"));
    assert!(merged_markup.contains("Description: remote words"));
}

#[test]
fn test_pull_ignores_remote_older_than_watermark() {
    let local = "\
- Story: Local Title
  Description: local words
  Priority: Low
  Remote_Key: PROJ-1
";
    let api = FakeTracker {
        remote_issues: vec![remote_issue(
            "PROJ-1",
            "Remote Title",
            "remote words",
            "2024-05-01T00:00:00Z",
        )],
        ..Default::default()
    };

    let outcome = pull_document(
        &api,
        &config(),
        local,
        Some(at("2024-06-01T00:00:00Z")),
        &CancelToken::new(),
    )
    .unwrap();

    assert!(outcome.pending.is_empty());
    assert!(outcome.markup.contains("- Story: Local Title"));
    assert!(outcome.markup.contains("Priority: Low"));
}
