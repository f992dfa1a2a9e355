//! End-to-end push tests: markup → records → remote payloads.

use std::collections::HashMap;
use std::time::Duration;

use shuttle::parser::story::StoryParser;
use shuttle::remote::board::BoardConfig;
use shuttle::remote::tracker::TrackerConfig;
use shuttle::sync::batch::{CancelToken, Scheduler};
use shuttle::sync::push::{BoardPush, TrackerPush};

use super::fakes::{member, FakeBoard, FakeTracker};

const THREE_STORIES: &str = "\
- Story: One
  Description: first story
  Acceptance_Criteria:
    - [ ] step a
    - [x] step b
  Assignees: Jane
- Story: Two
  Description: second story
- Story: Three
  Description: third story
";

fn tracker_config() -> TrackerConfig {
    TrackerConfig::new("https://tracker.example.com", "a@b.c", "token", "PROJ")
}

#[test]
fn test_tracker_batch_with_one_failure() {
    let api = FakeTracker {
        fail_summaries: vec!["Two".to_string()],
        directory: vec![member("acct-1", "jdoe", "Jane")],
        ..Default::default()
    };
    let config = tracker_config();
    let push = TrackerPush::new(&api, &config).unwrap();

    let records = StoryParser::new().parse(THREE_STORIES);
    assert_eq!(records.len(), 3);

    let mut progress: Vec<(usize, usize, String)> = Vec::new();
    let mut scheduler = Scheduler::new(Duration::ZERO);
    let mut on_progress = |current: usize, total: usize, title: &str| {
        progress.push((current, total, title.to_string()));
    };
    let report = push.sync_batch(
        &records,
        &mut scheduler,
        &CancelToken::new(),
        Some(&mut on_progress),
    );

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert!(report.details[0].success);
    assert!(!report.details[1].success);
    assert!(report.details[2].success);

    // Progress fires before each item, including the failing one.
    assert_eq!(progress.len(), 3);
    assert_eq!(progress[1], (2, 3, "Two".to_string()));

    // Story One created two sub-tasks; assignee resolved through the
    // directory.
    assert_eq!(report.details[0].sub_items_created, 2);
    let created = api.created.borrow();
    assert_eq!(created[0].assignee.as_ref().unwrap().id, "acct-1");
    assert!(created
        .iter()
        .any(|fields| fields.parent.is_some() && fields.summary == "step a"));
}

#[test]
fn test_tracker_batch_cancellation_stops_remote_calls() {
    let api = FakeTracker::default();
    let config = tracker_config();
    let push = TrackerPush::new(&api, &config).unwrap();

    let records = StoryParser::new().parse(THREE_STORIES);
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut scheduler = Scheduler::new(Duration::ZERO);
    let report = push.sync_batch(&records, &mut scheduler, &cancel, None);
    assert_eq!(report.total, 3);
    assert!(report.details.is_empty());
    assert!(api.created.borrow().is_empty());
}

#[test]
fn test_board_batch_builds_checklists_and_maps_fields() {
    let api = FakeBoard {
        members_list: vec![member("mem-1", "jdoe", "Jane")],
        labels_list: vec![
            shuttle::remote::board::BoardLabel {
                id: "lbl-auth".to_string(),
                name: "auth".to_string(),
            },
            shuttle::remote::board::BoardLabel {
                id: "lbl-high".to_string(),
                name: "prio-high".to_string(),
            },
        ],
        ..Default::default()
    };
    let mut config = BoardConfig::new("key", "token", "board-1", "list-1");
    config.priority_label_map =
        HashMap::from([("High".to_string(), "lbl-high".to_string())]);
    let push = BoardPush::new(&api, &config).unwrap();

    let markup = "\
- Story: Login
  Description: login flow
  Acceptance_Criteria:
    - [ ] credentials
    - [x] session
  Priority: High
  Labels: [auth, unknown]
  Assignees: Jane
";
    let records = StoryParser::new().parse(markup);
    let mut scheduler = Scheduler::new(Duration::ZERO);
    let report = push.sync_batch(&records, &mut scheduler, &CancelToken::new(), None);

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.details[0].sub_items_created, 2);

    let cards = api.cards.borrow();
    assert_eq!(cards[0].name, "Login");
    assert_eq!(cards[0].desc, "login flow");
    assert_eq!(cards[0].id_list, "list-1");
    // Known label mapped, unknown dropped, priority label appended.
    assert_eq!(cards[0].label_ids, vec!["lbl-auth", "lbl-high"]);
    assert_eq!(cards[0].member_ids, vec!["mem-1"]);

    let checklists = api.checklists.borrow();
    assert_eq!(checklists[0].1, "Acceptance Criteria");

    let items = api.check_items.borrow();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].1, "credentials");
    assert!(!items[0].2);
    assert!(items[1].2);
}

#[test]
fn test_board_story_without_criteria_gets_no_checklist() {
    let api = FakeBoard::default();
    let config = BoardConfig::new("key", "token", "board-1", "list-1");
    let push = BoardPush::new(&api, &config).unwrap();

    let records = StoryParser::new().parse("- Story: Bare\n  Description: nothing else\n");
    let mut scheduler = Scheduler::new(Duration::ZERO);
    let report = push.sync_batch(&records, &mut scheduler, &CancelToken::new(), None);

    assert_eq!(report.succeeded, 1);
    assert!(api.checklists.borrow().is_empty());
    assert!(api.check_items.borrow().is_empty());
}
