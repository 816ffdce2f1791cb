//! In-memory document source for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::error::LoadError;
use super::source::{DocumentSource, FetchedDocument};

/// Serves canned documents by URL and counts every fetch.
#[derive(Clone, Default)]
pub struct FakeSource {
  documents: Arc<HashMap<String, String>>,
  calls: Arc<AtomicUsize>,
  delay: Option<Duration>,
}

impl FakeSource {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_document(mut self, url: &str, body: &str) -> Self {
    let mut documents = (*self.documents).clone();
    documents.insert(url.to_string(), body.to_string());
    self.documents = Arc::new(documents);
    self
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

impl DocumentSource for FakeSource {
  async fn fetch(&self, url: &str) -> Result<FetchedDocument, LoadError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }

    Ok(match self.documents.get(url) {
      Some(body) => FetchedDocument::ok(body.as_bytes()),
      None => FetchedDocument {
        status: 404,
        body: Vec::new(),
      },
    })
  }
}

/// Build a period document body from `(number, state, progress_json)` rows.
pub fn period_json(repository: &str, issues: &[(u64, &str, &str)]) -> String {
  let issues: Vec<String> = issues
    .iter()
    .map(|(number, state, progress)| {
      format!(
        r#"{{"number":{},"title":"Goal {}","state":"{}","progress":{}}}"#,
        number, number, state, progress
      )
    })
    .collect();
  format!(
    r#"{{"repository":"{}","milestone":"test","issues":[{}]}}"#,
    repository,
    issues.join(",")
  )
}
