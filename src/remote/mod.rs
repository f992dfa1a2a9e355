//! Remote system boundary
//!
//! This module handles:
//! - The typed error taxonomy for remote calls (network / auth / rejection)
//! - HTTP client construction with timeouts
//! - The issue tracker client (rich-document descriptions, sub-tasks)
//! - The board client (cards, checklists, members, labels)
//!
//! Both clients sit behind traits so the sync engines can be driven by
//! in-memory fakes in tests. Wire JSON shapes live here and are converted
//! to domain types at the edge; nothing deeper in the crate touches raw
//! payloads.

pub mod board;
pub mod tracker;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use thiserror::Error;

pub use board::{BoardApi, BoardConfig, BoardLabel, CreatedCard, HttpBoard};
pub use tracker::{
    CreatedIssue, HttpTracker, IssueFields, Subtask, TrackerApi, TrackerConfig, TrackerIssue,
};

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Failure of one remote call. Timeouts surface as [`RemoteError::Network`]
/// and are treated like any other failed call: isolated, recorded, and the
/// batch continues.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("authentication rejected (HTTP {status})")]
    Auth { status: u16 },
    #[error("remote rejected request (HTTP {status}): {body}")]
    Api { status: u16, body: String },
}

/// Create the blocking HTTP client both remote targets use.
/// Timeouts prevent indefinite hangs on slow or unresponsive servers.
pub(crate) fn build_http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
        .user_agent("shuttle-sync")
        .build()
        .context("Failed to create HTTP client")
}

/// Classify a non-success response into the error taxonomy.
pub(crate) fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(RemoteError::Auth {
            status: status.as_u16(),
        });
    }
    let body = response.text().unwrap_or_default();
    Err(RemoteError::Api {
        status: status.as_u16(),
        body,
    })
}
