//! Page scanner: loads and renders every tracking element of a page.

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, error};

use crate::page::HtmlPage;
use crate::progress::{DocumentSource, IssueStore};
use crate::render::render;

/// What happened to the tracking elements of one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
  /// Elements that received an indicator
  pub rendered: usize,
  /// Elements whose issue is not in the period document
  pub skipped: usize,
  /// Elements that could not be loaded
  pub failed: usize,
}

impl ScanReport {
  pub fn total(&self) -> usize {
    self.rendered + self.skipped + self.failed
  }
}

impl std::ops::AddAssign for ScanReport {
  fn add_assign(&mut self, other: Self) {
    self.rendered += other.rendered;
    self.skipped += other.skipped;
    self.failed += other.failed;
  }
}

/// Drives the issue store over pages. Pages scanned by the same scanner
/// share one cache.
pub struct Scanner<S> {
  store: IssueStore<S>,
}

impl<S: DocumentSource> Scanner<S> {
  pub fn new(store: IssueStore<S>) -> Self {
    Self { store }
  }

  pub fn store(&self) -> &IssueStore<S> {
    &self.store
  }

  /// Attach an indicator to every tracking element of `page`.
  ///
  /// Every element is loaded independently; failures are logged against the
  /// element's id and never stop the others.
  pub async fn run(&self, page: &mut HtmlPage) -> ScanReport {
    let mut report = ScanReport::default();

    let mut loads = FuturesUnordered::new();
    for element in page.tracking_elements() {
      let Some(id) = element.id.clone() else {
        error!("progress element is missing an id");
        report.failed += 1;
        continue;
      };
      let store = &self.store;
      loads.push(async move {
        let result = store.load(&id).await;
        (element, id, result)
      });
    }

    while let Some((element, id, result)) = loads.next().await {
      match result {
        Ok(Some(record)) => {
          page.attach(&element, render(&record).to_html());
          report.rendered += 1;
        }
        Ok(None) => {
          debug!(%id, "no such issue in period document");
          report.skipped += 1;
        }
        Err(e) => {
          error!(%id, "Error loading data: {}", e);
          report.failed += 1;
        }
      }
    }

    report
  }
}
