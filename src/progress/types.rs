use std::fmt;
use std::str::FromStr;

use super::error::LoadError;

/// Identifier attached to a tracking element, `period:org:repo:number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingId {
  pub period: String,
  pub org: String,
  pub repo: String,
  pub number: u64,
}

impl TrackingId {
  /// The `org/repo` pair a period document must declare.
  pub fn repository(&self) -> String {
    format!("{}/{}", self.org, self.repo)
  }
}

impl FromStr for TrackingId {
  type Err = LoadError;

  fn from_str(id: &str) -> Result<Self, Self::Err> {
    let format_error = || LoadError::Format { id: id.to_string() };

    let parts: Vec<&str> = id.split(':').collect();
    let [period, org, repo, number] = parts.as_slice() else {
      return Err(format_error());
    };
    if [period, org, repo, number].iter().any(|p| p.is_empty()) {
      return Err(format_error());
    }
    // The period names a file under `api/`
    if period.contains(['/', '\\']) || period.contains("..") {
      return Err(format_error());
    }

    let number: u64 = number.parse().map_err(|_| format_error())?;
    if number == 0 {
      return Err(format_error());
    }

    Ok(Self {
      period: period.to_string(),
      org: org.to_string(),
      repo: repo.to_string(),
      number,
    })
  }
}

impl fmt::Display for TrackingId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}:{}:{}", self.period, self.org, self.repo, self.number)
  }
}

/// Github issue state as reported in the period document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
  Open,
  Closed,
}

/// How far along a tracking issue is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
  /// Checkboxes or linked issues were found on the tracking issue
  Tracked { completed: u32, total: u32 },
  /// Nothing to count, only open or closed
  Binary,
  /// The reporting service could not determine progress
  Error { message: Option<String> },
}

/// One tracked issue of a reporting period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
  pub number: u64,
  pub state: IssueState,
  pub progress: Progress,
}

/// All tracked issues of one reporting period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodDocument {
  pub repository: String,
  pub issues: Vec<IssueRecord>,
}

impl PeriodDocument {
  /// Find an issue by number. The list is small, so a scan is fine.
  pub fn issue(&self, number: u64) -> Option<&IssueRecord> {
    self.issues.iter().find(|issue| issue.number == number)
  }
}
