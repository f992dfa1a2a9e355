//! Round-trip and tolerance tests for the parser + renderer pair.

use shuttle::analytics::DocumentStats;
use shuttle::convert::card::to_card_payload;
use shuttle::parser::story::{render, StoryParser};

const SAMPLE: &str = r#"- Story: User Login
  Description: As a user, I want to login.
  Acceptance_Criteria:
    - [ ] Enter credentials
    - [x] Validate session
  Priority: High
  Labels: [auth, security]
  Assignees: Jane
  Reporter: PM

- Story: Password Reset
  Description: As a user, I want to reset my password.
  Priority: Low
  Labels: [auth]
"#;

#[test]
fn test_example_scenario_from_grammar() {
    let parser = StoryParser::new();
    let records = parser.parse(SAMPLE);
    assert_eq!(records.len(), 2);

    let record = &records[0];
    assert_eq!(record.title, "User Login");
    assert_eq!(record.priority, "High");
    assert_eq!(record.labels, vec!["auth", "security"]);
    assert_eq!(record.assignees, vec!["Jane"]);
    assert_eq!(record.acceptance_criteria.len(), 2);
    assert!(!record.acceptance_criteria[0].checked);
    assert!(record.acceptance_criteria[1].checked);
}

#[test]
fn test_round_trip_preserves_semantic_content() {
    let parser = StoryParser::new();
    let records = parser.parse(SAMPLE);
    let reparsed = parser.parse(&render(&records));
    assert_eq!(records, reparsed);
}

#[test]
fn test_parser_never_fails_on_garbage() {
    let parser = StoryParser::new();
    assert!(parser.parse("").is_empty());
    assert!(parser.parse("   \n \t \n").is_empty());
    assert!(parser.parse("random prose\nwith: colons\n- [x] stray box\n").is_empty());

    let records = parser.parse("- Story: Only Title\ngarbage ]] [[ ***\n");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Only Title");
    assert_eq!(records[0].priority, "Medium");
}

#[test]
fn test_card_conversion_builds_checklist_from_criteria() {
    let markdown = "# User Login\n\nAs a user, I want to login.\n\n\
                    ## Acceptance Criteria\n- [ ] Enter credentials\n- [x] Validate session\n";
    let card = to_card_payload(markdown, "list-1");
    let checklist = card.checklist.expect("two criteria must yield a checklist");
    assert_eq!(checklist.items.len(), 2);
    assert!(!checklist.items[0].checked);
    assert!(checklist.items[1].checked);
}

#[test]
fn test_document_stats_over_parsed_records() {
    let parser = StoryParser::new();
    let records = parser.parse(SAMPLE);
    let stats = DocumentStats::collect(&records);

    assert_eq!(stats.total_stories, 2);
    assert_eq!(stats.unsynced, 2);
    assert_eq!(stats.total_criteria, 2);
    assert_eq!(stats.completed_criteria, 1);
    assert_eq!(stats.by_priority.get("High"), Some(&1));
    assert_eq!(stats.by_priority.get("Low"), Some(&1));
    assert!((stats.completion_percent() - 50.0).abs() < f32::EPSILON);
}
