//! In-memory fakes for the remote API traits.

use std::cell::RefCell;

use shuttle::convert::card::CardPayload;
use shuttle::models::Member;
use shuttle::remote::board::{BoardApi, BoardLabel, CreatedCard};
use shuttle::remote::tracker::{CreatedIssue, IssueFields, TrackerApi, TrackerIssue};
use shuttle::remote::RemoteError;

fn api_error(body: &str) -> RemoteError {
    RemoteError::Api {
        status: 400,
        body: body.to_string(),
    }
}

/// Fake tracker: records every create/update, can be scripted to fail
/// creates for specific summaries, and serves a fixed issue list to search.
#[derive(Default)]
pub struct FakeTracker {
    pub created: RefCell<Vec<IssueFields>>,
    pub updated: RefCell<Vec<(String, IssueFields)>>,
    pub fail_summaries: Vec<String>,
    pub remote_issues: Vec<TrackerIssue>,
    pub directory: Vec<Member>,
    pub counter: RefCell<usize>,
}

impl TrackerApi for FakeTracker {
    fn create_issue(&self, fields: &IssueFields) -> Result<CreatedIssue, RemoteError> {
        if self.fail_summaries.contains(&fields.summary) {
            return Err(api_error("scripted failure"));
        }
        let mut counter = self.counter.borrow_mut();
        *counter += 1;
        let key = format!("PROJ-{counter}");
        self.created.borrow_mut().push(fields.clone());
        Ok(CreatedIssue {
            id: format!("{counter}"),
            key,
        })
    }

    fn update_issue(&self, key: &str, fields: &IssueFields) -> Result<(), RemoteError> {
        self.updated
            .borrow_mut()
            .push((key.to_string(), fields.clone()));
        Ok(())
    }

    fn search(&self, _jql: &str) -> Result<Vec<TrackerIssue>, RemoteError> {
        Ok(self.remote_issues.clone())
    }

    fn assignable_users(&self) -> Result<Vec<Member>, RemoteError> {
        Ok(self.directory.clone())
    }
}

/// Fake board: records cards and checklist items.
#[derive(Default)]
pub struct FakeBoard {
    pub cards: RefCell<Vec<CardPayload>>,
    pub checklists: RefCell<Vec<(String, String)>>,
    pub check_items: RefCell<Vec<(String, String, bool)>>,
    pub members_list: Vec<Member>,
    pub labels_list: Vec<BoardLabel>,
    pub fail_names: Vec<String>,
}

impl BoardApi for FakeBoard {
    fn create_card(&self, card: &CardPayload) -> Result<CreatedCard, RemoteError> {
        if self.fail_names.contains(&card.name) {
            return Err(api_error("scripted failure"));
        }
        self.cards.borrow_mut().push(card.clone());
        Ok(CreatedCard {
            id: format!("card-{}", self.cards.borrow().len()),
        })
    }

    fn update_card(&self, _card_id: &str, card: &CardPayload) -> Result<(), RemoteError> {
        self.cards.borrow_mut().push(card.clone());
        Ok(())
    }

    fn create_checklist(&self, card_id: &str, name: &str) -> Result<String, RemoteError> {
        let id = format!("cl-{}", self.checklists.borrow().len() + 1);
        self.checklists
            .borrow_mut()
            .push((card_id.to_string(), name.to_string()));
        Ok(id)
    }

    fn add_check_item(
        &self,
        checklist_id: &str,
        text: &str,
        checked: bool,
    ) -> Result<String, RemoteError> {
        self.check_items
            .borrow_mut()
            .push((checklist_id.to_string(), text.to_string(), checked));
        Ok(format!("ci-{}", self.check_items.borrow().len()))
    }

    fn members(&self) -> Result<Vec<Member>, RemoteError> {
        Ok(self.members_list.clone())
    }

    fn labels(&self) -> Result<Vec<BoardLabel>, RemoteError> {
        Ok(self.labels_list.clone())
    }
}

pub fn member(id: &str, username: &str, display_name: &str) -> Member {
    Member {
        id: id.to_string(),
        username: username.to_string(),
        display_name: display_name.to_string(),
    }
}
