//! Issue tracker client (first target system).
//!
//! Issues carry rich-document descriptions; acceptance criteria become
//! sub-task issues under the parent. Wire shapes are deserialized here and
//! converted to domain types at the edge.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{build_http_client, check_status, RemoteError};
use crate::convert::rich::{nodes_from_json, RichDoc, RichNode};
use crate::models::Member;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub project_key: String,
    pub issue_type: String,
    pub subtask_type: String,
    /// Assignee alias → tracker username.
    #[serde(default)]
    pub alias_map: std::collections::HashMap<String, String>,
}

impl TrackerConfig {
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
        project_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            email: email.into(),
            api_token: api_token.into(),
            project_key: project_key.into(),
            issue_type: "Story".to_string(),
            subtask_type: "Sub-task".to_string(),
            alias_map: std::collections::HashMap::new(),
        }
    }

    /// No remote call can succeed without credentials and a target project;
    /// surfaced before any batch work begins.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("Tracker base URL is not configured");
        }
        if self.email.trim().is_empty() || self.api_token.trim().is_empty() {
            bail!("Tracker credentials are not configured");
        }
        if self.project_key.trim().is_empty() {
            bail!("Tracker project key is not configured");
        }
        Ok(())
    }
}

/// Typed create/update payload for one issue.
#[derive(Debug, Clone, Serialize)]
pub struct IssueFields {
    pub project: KeyRef,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<RichDoc>,
    pub issuetype: NameRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<NameRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<IdRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<KeyRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyRef {
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

/// One remote issue, already converted from its wire shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerIssue {
    pub key: String,
    pub summary: String,
    pub description: Vec<RichNode>,
    pub priority: Option<String>,
    pub labels: Vec<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub subtasks: Vec<Subtask>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtask {
    pub key: String,
    pub summary: String,
    pub done: bool,
}

/// Remote calls the push/pull engines need from the tracker. A trait so
/// tests can drive the engines with in-memory fakes.
pub trait TrackerApi {
    fn create_issue(&self, fields: &IssueFields) -> Result<CreatedIssue, RemoteError>;
    fn update_issue(&self, key: &str, fields: &IssueFields) -> Result<(), RemoteError>;
    fn search(&self, jql: &str) -> Result<Vec<TrackerIssue>, RemoteError>;
    fn assignable_users(&self) -> Result<Vec<Member>, RemoteError>;
}

pub struct HttpTracker {
    client: reqwest::blocking::Client,
    config: TrackerConfig,
}

impl HttpTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: build_http_client()?,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/api/3{path}", self.config.base_url.trim_end_matches('/'))
    }
}

impl TrackerApi for HttpTracker {
    fn create_issue(&self, fields: &IssueFields) -> Result<CreatedIssue, RemoteError> {
        debug!(summary = %fields.summary, "creating tracker issue");
        let response = self
            .client
            .post(self.url("/issue"))
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .json(&serde_json::json!({ "fields": fields }))
            .send()?;
        let response = check_status(response)?;
        Ok(response.json::<CreatedIssue>()?)
    }

    fn update_issue(&self, key: &str, fields: &IssueFields) -> Result<(), RemoteError> {
        debug!(key = %key, "updating tracker issue");
        let response = self
            .client
            .put(self.url(&format!("/issue/{key}")))
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .json(&serde_json::json!({ "fields": fields }))
            .send()?;
        check_status(response)?;
        Ok(())
    }

    fn search(&self, jql: &str) -> Result<Vec<TrackerIssue>, RemoteError> {
        debug!(jql = %jql, "searching tracker issues");
        let response = self
            .client
            .get(self.url("/search"))
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .query(&[("jql", jql), ("fields", "*all")])
            .send()?;
        let response = check_status(response)?;
        let wire = response.json::<WireSearchResponse>()?;
        Ok(wire.issues.iter().map(issue_from_wire).collect())
    }

    fn assignable_users(&self) -> Result<Vec<Member>, RemoteError> {
        let response = self
            .client
            .get(self.url("/user/assignable/search"))
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .query(&[("project", self.config.project_key.as_str())])
            .send()?;
        let response = check_status(response)?;
        let wire = response.json::<Vec<WireUser>>()?;
        Ok(wire.into_iter().map(member_from_wire).collect())
    }
}

// Wire shapes, converted to domain types below and nowhere else.

#[derive(Debug, Deserialize)]
struct WireSearchResponse {
    #[serde(default)]
    issues: Vec<WireIssue>,
}

#[derive(Debug, Deserialize)]
struct WireIssue {
    key: String,
    fields: WireFields,
}

#[derive(Debug, Deserialize)]
struct WireFields {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    priority: Option<WireName>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    assignee: Option<WireUser>,
    #[serde(default)]
    reporter: Option<WireUser>,
    #[serde(default)]
    subtasks: Vec<WireSubtask>,
    #[serde(default)]
    updated: String,
}

#[derive(Debug, Deserialize)]
struct WireName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    #[serde(rename = "accountId", default)]
    account_id: String,
    #[serde(rename = "displayName", default)]
    display_name: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSubtask {
    key: String,
    fields: WireSubtaskFields,
}

#[derive(Debug, Deserialize)]
struct WireSubtaskFields {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    status: Option<WireStatus>,
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    #[serde(default)]
    name: String,
    #[serde(rename = "statusCategory", default)]
    status_category: Option<WireStatusCategory>,
}

#[derive(Debug, Deserialize)]
struct WireStatusCategory {
    #[serde(default)]
    key: String,
}

fn issue_from_wire(wire: &WireIssue) -> TrackerIssue {
    let description = wire
        .fields
        .description
        .as_ref()
        .map(nodes_from_json)
        .unwrap_or_default();

    TrackerIssue {
        key: wire.key.clone(),
        summary: wire.fields.summary.clone(),
        description,
        priority: wire.fields.priority.as_ref().map(|p| p.name.clone()),
        labels: wire.fields.labels.clone(),
        assignee: wire
            .fields
            .assignee
            .as_ref()
            .map(|u| u.display_name.clone()),
        reporter: wire
            .fields
            .reporter
            .as_ref()
            .map(|u| u.display_name.clone()),
        subtasks: wire
            .fields
            .subtasks
            .iter()
            .map(|s| Subtask {
                key: s.key.clone(),
                summary: s.fields.summary.clone(),
                done: subtask_done(&s.fields.status),
            })
            .collect(),
        updated_at: parse_timestamp(&wire.fields.updated).unwrap_or_else(Utc::now),
    }
}

fn member_from_wire(wire: WireUser) -> Member {
    let username = wire.name.unwrap_or_else(|| wire.display_name.clone());
    Member {
        id: wire.account_id,
        username,
        display_name: wire.display_name,
    }
}

fn subtask_done(status: &Option<WireStatus>) -> bool {
    let Some(status) = status else {
        return false;
    };
    if let Some(category) = &status.status_category {
        return category.key == "done";
    }
    matches!(status.name.as_str(), "Done" | "Closed" | "Resolved")
}

/// The tracker emits `2024-03-01T10:00:00.000+0000`; RFC 3339 is accepted
/// too for lenience.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
