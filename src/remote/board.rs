//! Board client (second target system): cards, checklists, members, labels.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::{build_http_client, check_status, RemoteError};
use crate::convert::card::CardPayload;
use crate::models::Member;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_token: String,
    pub board_id: String,
    pub list_id: String,
    /// Priority name → label id applied to the card for that priority.
    #[serde(default)]
    pub priority_label_map: HashMap<String, String>,
    /// Assignee alias → board username.
    #[serde(default)]
    pub alias_map: HashMap<String, String>,
}

impl BoardConfig {
    pub fn new(
        api_key: impl Into<String>,
        api_token: impl Into<String>,
        board_id: impl Into<String>,
        list_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: "https://api.trello.com".to_string(),
            api_key: api_key.into(),
            api_token: api_token.into(),
            board_id: board_id.into(),
            list_id: list_id.into(),
            priority_label_map: HashMap::new(),
            alias_map: HashMap::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() || self.api_token.trim().is_empty() {
            bail!("Board credentials are not configured");
        }
        if self.list_id.trim().is_empty() {
            bail!("Board target list is not configured");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedCard {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardLabel {
    pub id: String,
    pub name: String,
}

/// Remote calls the board push engine needs. A trait so tests can drive the
/// engine with in-memory fakes.
pub trait BoardApi {
    fn create_card(&self, card: &CardPayload) -> Result<CreatedCard, RemoteError>;
    fn update_card(&self, card_id: &str, card: &CardPayload) -> Result<(), RemoteError>;
    fn create_checklist(&self, card_id: &str, name: &str) -> Result<String, RemoteError>;
    fn add_check_item(
        &self,
        checklist_id: &str,
        text: &str,
        checked: bool,
    ) -> Result<String, RemoteError>;
    fn members(&self) -> Result<Vec<Member>, RemoteError>;
    fn labels(&self) -> Result<Vec<BoardLabel>, RemoteError>;
}

pub struct HttpBoard {
    client: reqwest::blocking::Client,
    config: BoardConfig,
}

impl HttpBoard {
    pub fn new(config: BoardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: build_http_client()?,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/1{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn auth_query(&self) -> [(&'static str, &str); 2] {
        [
            ("key", self.config.api_key.as_str()),
            ("token", self.config.api_token.as_str()),
        ]
    }
}

impl BoardApi for HttpBoard {
    fn create_card(&self, card: &CardPayload) -> Result<CreatedCard, RemoteError> {
        debug!(name = %card.name, "creating board card");
        let response = self
            .client
            .post(self.url("/cards"))
            .query(&self.auth_query())
            .json(card)
            .send()?;
        let response = check_status(response)?;
        Ok(response.json::<CreatedCard>()?)
    }

    fn update_card(&self, card_id: &str, card: &CardPayload) -> Result<(), RemoteError> {
        debug!(card_id = %card_id, "updating board card");
        let response = self
            .client
            .put(self.url(&format!("/cards/{card_id}")))
            .query(&self.auth_query())
            .json(card)
            .send()?;
        check_status(response)?;
        Ok(())
    }

    fn create_checklist(&self, card_id: &str, name: &str) -> Result<String, RemoteError> {
        let response = self
            .client
            .post(self.url("/checklists"))
            .query(&self.auth_query())
            .json(&serde_json::json!({ "idCard": card_id, "name": name }))
            .send()?;
        let response = check_status(response)?;
        let created = response.json::<WireId>()?;
        Ok(created.id)
    }

    fn add_check_item(
        &self,
        checklist_id: &str,
        text: &str,
        checked: bool,
    ) -> Result<String, RemoteError> {
        let response = self
            .client
            .post(self.url(&format!("/checklists/{checklist_id}/checkItems")))
            .query(&self.auth_query())
            .json(&serde_json::json!({ "name": text, "checked": checked }))
            .send()?;
        let response = check_status(response)?;
        let created = response.json::<WireId>()?;
        Ok(created.id)
    }

    fn members(&self) -> Result<Vec<Member>, RemoteError> {
        let response = self
            .client
            .get(self.url(&format!("/boards/{}/members", self.config.board_id)))
            .query(&self.auth_query())
            .send()?;
        let response = check_status(response)?;
        let wire = response.json::<Vec<WireMember>>()?;
        Ok(wire
            .into_iter()
            .map(|m| Member {
                id: m.id,
                username: m.username,
                display_name: m.full_name,
            })
            .collect())
    }

    fn labels(&self) -> Result<Vec<BoardLabel>, RemoteError> {
        let response = self
            .client
            .get(self.url(&format!("/boards/{}/labels", self.config.board_id)))
            .query(&self.auth_query())
            .send()?;
        let response = check_status(response)?;
        Ok(response.json::<Vec<BoardLabel>>()?)
    }
}

#[derive(Debug, Deserialize)]
struct WireId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WireMember {
    id: String,
    #[serde(default)]
    username: String,
    #[serde(rename = "fullName", default)]
    full_name: String,
}
