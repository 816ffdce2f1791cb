//! Issue store: loads tracking issues by identifier, one document per period.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheLayer, CacheSource};
use crate::endpoint::EndpointResolver;

use super::api_types::parse_period_document;
use super::error::LoadError;
use super::source::DocumentSource;
use super::types::{IssueRecord, PeriodDocument, TrackingId};

/// Owns the per-period document cache.
///
/// A store lives as long as one run. Separate stores never share entries.
pub struct IssueStore<S> {
  source: S,
  resolver: EndpointResolver,
  cache: CacheLayer<PeriodDocument>,
}

impl<S: DocumentSource> IssueStore<S> {
  pub fn new(source: S, resolver: EndpointResolver) -> Self {
    Self {
      source,
      resolver,
      cache: CacheLayer::new(),
    }
  }

  /// Load the issue named by a `period:org:repo:number` identifier.
  ///
  /// Returns `Ok(None)` when the period document has no such issue.
  pub async fn load(&self, id: &str) -> Result<Option<IssueRecord>, LoadError> {
    let id: TrackingId = id.parse()?;
    let document = self.period_document(&id.period).await?;

    let expected = id.repository();
    if document.repository != expected {
      return Err(LoadError::Mismatch {
        expected,
        found: document.repository.clone(),
      });
    }

    Ok(document.issue(id.number).cloned())
  }

  async fn period_document(&self, period: &str) -> Result<Arc<PeriodDocument>, LoadError> {
    let source = &self.source;
    let resolver = &self.resolver;

    let result = self
      .cache
      .fetch_one(period, move || async move {
        let url = resolver.resolve_url(period);
        let fetched = source.fetch(&url).await?;
        if !fetched.is_success() {
          return Err(LoadError::Fetch {
            url,
            status: fetched.status,
          });
        }

        parse_period_document(&fetched.body).map_err(|e| LoadError::Parse {
          url,
          message: e.to_string(),
        })
      })
      .await?;

    if result.source == CacheSource::Network {
      debug!(
        period,
        repository = %result.data.repository,
        issues = result.data.issues.len(),
        "cached period document"
      );
    }
    Ok(result.data)
  }

  /// Number of document fetches started by this store.
  pub fn fetch_count(&self) -> usize {
    self.cache.fetch_count()
  }

  /// Periods whose documents are cached.
  pub fn cached_periods(&self) -> Vec<String> {
    self.cache.keys()
  }
}
