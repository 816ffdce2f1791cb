//! Serde-deserializable types matching the period documents published by the
//! reporting service under `api/<period>.json`.
//!
//! These are kept apart from the domain types so the renderer never has to
//! care about which optional keys the service happened to emit.
//!
//! Issues are decoded one at a time: a malformed entry only affects itself.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::types::{IssueRecord, IssueState, PeriodDocument, Progress};

#[derive(Debug, Deserialize)]
pub struct ApiPeriodDocument {
  pub repository: String,
  pub issues: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ApiIssue {
  pub number: u64,
  pub state: ApiIssueState,
  #[serde(default)]
  pub progress: ApiProgress,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiIssueState {
  Open,
  Closed,
}

/// Externally tagged progress object; exactly one key is expected.
#[derive(Debug, Default, Deserialize)]
pub struct ApiProgress {
  #[serde(rename = "Tracked")]
  pub tracked: Option<ApiTracked>,
  #[serde(rename = "Binary")]
  pub binary: Option<Value>,
  #[serde(rename = "Error")]
  pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTracked {
  pub completed: u32,
  pub total: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiError {
  #[serde(default)]
  pub message: Option<String>,
}

impl From<ApiIssueState> for IssueState {
  fn from(state: ApiIssueState) -> Self {
    match state {
      ApiIssueState::Open => IssueState::Open,
      ApiIssueState::Closed => IssueState::Closed,
    }
  }
}

impl From<ApiProgress> for Progress {
  fn from(progress: ApiProgress) -> Self {
    if let Some(ApiTracked { completed, total }) = progress.tracked {
      return Progress::Tracked { completed, total };
    }
    if progress.binary.is_some() {
      return Progress::Binary;
    }
    // Anything unrecognized is shown as an error glyph
    let message = progress
      .error
      .and_then(|e| e.message)
      .filter(|m| !m.is_empty());
    Progress::Error { message }
  }
}

impl From<ApiIssue> for IssueRecord {
  fn from(issue: ApiIssue) -> Self {
    Self {
      number: issue.number,
      state: issue.state.into(),
      progress: issue.progress.into(),
    }
  }
}

/// Decode one entry of the `issues` array.
///
/// Entries without a numeric `number` cannot be matched to anything and are
/// dropped. Any other malformed entry becomes an error record.
pub fn issue_from_value(value: &Value) -> Option<IssueRecord> {
  let Some(number) = value.get("number").and_then(Value::as_u64) else {
    warn!(issue = %value, "skipping issue without a number");
    return None;
  };

  match ApiIssue::deserialize(value) {
    Ok(issue) => Some(issue.into()),
    Err(e) => {
      warn!(number, "malformed issue: {}", e);
      let state = value
        .get("state")
        .and_then(|s| ApiIssueState::deserialize(s).ok())
        .map_or(IssueState::Open, IssueState::from);
      Some(IssueRecord {
        number,
        state,
        progress: Progress::Error { message: None },
      })
    }
  }
}

impl From<ApiPeriodDocument> for PeriodDocument {
  fn from(doc: ApiPeriodDocument) -> Self {
    Self {
      repository: doc.repository,
      issues: doc.issues.iter().filter_map(issue_from_value).collect(),
    }
  }
}

/// Parse a response body into a period document.
pub fn parse_period_document(body: &[u8]) -> serde_json::Result<PeriodDocument> {
  let doc: ApiPeriodDocument = serde_json::from_slice(body)?;
  Ok(doc.into())
}
