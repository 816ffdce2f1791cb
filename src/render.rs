//! Turns an issue record into the indicator shown next to it.

use crate::progress::{IssueRecord, IssueState, Progress};

pub const ERROR_FALLBACK: &str = "Error loading status";

const COMPLETED_BADGE: &str = "https://img.shields.io/badge/Completed!%20%3A%29-green";
const INCOMPLETE_BADGE: &str = "https://img.shields.io/badge/Incomplete%20%3A%28-yellow";

/// Outcome badge for a closed tracked issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
  Completed,
  Incomplete,
}

/// Visual indicator for one tracking element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
  Badge(Badge),
  ProgressBar { value: u32, max: u32 },
  Warning { title: String },
}

/// Decide which indicator an issue gets.
///
/// Only tracked issues get a badge once closed; a closed binary issue is a
/// full progress bar.
pub fn render(record: &IssueRecord) -> Artifact {
  match (&record.progress, record.state) {
    (Progress::Tracked { completed, total }, IssueState::Closed) => {
      if completed == total {
        Artifact::Badge(Badge::Completed)
      } else {
        Artifact::Badge(Badge::Incomplete)
      }
    }
    (Progress::Tracked { completed, total }, IssueState::Open) => Artifact::ProgressBar {
      value: *completed,
      max: *total,
    },
    (Progress::Binary, IssueState::Open) => Artifact::ProgressBar { value: 0, max: 1 },
    (Progress::Binary, IssueState::Closed) => Artifact::ProgressBar { value: 1, max: 1 },
    (Progress::Error { message }, _) => Artifact::Warning {
      title: message
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(ERROR_FALLBACK)
        .to_string(),
    },
  }
}

impl Artifact {
  /// Serialize as an HTML fragment.
  pub fn to_html(&self) -> String {
    match self {
      Artifact::Badge(Badge::Completed) => badge_html(COMPLETED_BADGE, "Completed"),
      Artifact::Badge(Badge::Incomplete) => badge_html(INCOMPLETE_BADGE, "Incomplete"),
      Artifact::ProgressBar { value, max } => {
        format!(r#"<progress value="{}" max="{}"></progress>"#, value, max)
      }
      Artifact::Warning { title } => {
        format!(r#"<span title="{}">⚠️</span>"#, escape_attr(title))
      }
    }
  }
}

fn badge_html(src: &str, alt: &str) -> String {
  format!(r#"<center><img src="{}" alt="{}"></center>"#, src, alt)
}

fn escape_attr(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '"' => escaped.push_str("&quot;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      _ => escaped.push(c),
    }
  }
  escaped
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(state: IssueState, progress: Progress) -> IssueRecord {
    IssueRecord {
      number: 1,
      state,
      progress,
    }
  }

  fn tracked(completed: u32, total: u32) -> Progress {
    Progress::Tracked { completed, total }
  }

  #[test]
  fn test_closed_tracked_complete() {
    let artifact = render(&record(IssueState::Closed, tracked(5, 5)));
    assert_eq!(artifact, Artifact::Badge(Badge::Completed));
  }

  #[test]
  fn test_closed_tracked_incomplete() {
    let artifact = render(&record(IssueState::Closed, tracked(3, 5)));
    assert_eq!(artifact, Artifact::Badge(Badge::Incomplete));
  }

  #[test]
  fn test_open_tracked() {
    let artifact = render(&record(IssueState::Open, tracked(3, 5)));
    assert_eq!(artifact, Artifact::ProgressBar { value: 3, max: 5 });
  }

  #[test]
  fn test_open_tracked_complete_is_still_a_bar() {
    let artifact = render(&record(IssueState::Open, tracked(5, 5)));
    assert_eq!(artifact, Artifact::ProgressBar { value: 5, max: 5 });
  }

  #[test]
  fn test_open_binary() {
    let artifact = render(&record(IssueState::Open, Progress::Binary));
    assert_eq!(artifact, Artifact::ProgressBar { value: 0, max: 1 });
  }

  #[test]
  fn test_closed_binary_never_badged() {
    let artifact = render(&record(IssueState::Closed, Progress::Binary));
    assert_eq!(artifact, Artifact::ProgressBar { value: 1, max: 1 });
  }

  #[test]
  fn test_error_with_message() {
    for state in [IssueState::Open, IssueState::Closed] {
      let artifact = render(&record(
        state,
        Progress::Error {
          message: Some("boom".to_string()),
        },
      ));
      assert_eq!(
        artifact,
        Artifact::Warning {
          title: "boom".to_string()
        }
      );
    }
  }

  #[test]
  fn test_error_without_message() {
    let artifact = render(&record(IssueState::Open, Progress::Error { message: None }));
    assert_eq!(
      artifact,
      Artifact::Warning {
        title: ERROR_FALLBACK.to_string()
      }
    );
  }

  #[test]
  fn test_render_is_pure() {
    let record = record(IssueState::Closed, tracked(1, 2));
    assert_eq!(render(&record), render(&record));
  }

  #[test]
  fn test_badge_html() {
    assert_eq!(
      Artifact::Badge(Badge::Completed).to_html(),
      r#"<center><img src="https://img.shields.io/badge/Completed!%20%3A%29-green" alt="Completed"></center>"#
    );
    assert!(Artifact::Badge(Badge::Incomplete)
      .to_html()
      .contains(r#"alt="Incomplete""#));
  }

  #[test]
  fn test_progress_html() {
    assert_eq!(
      Artifact::ProgressBar { value: 3, max: 5 }.to_html(),
      r#"<progress value="3" max="5"></progress>"#
    );
  }

  #[test]
  fn test_warning_html_escapes_title() {
    let html = Artifact::Warning {
      title: r#"bad "label" <x> & more"#.to_string(),
    }
    .to_html();
    assert_eq!(
      html,
      r#"<span title="bad &quot;label&quot; &lt;x&gt; &amp; more">⚠️</span>"#
    );
  }
}
