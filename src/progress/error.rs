use thiserror::Error;

/// Why a single tracking element could not be loaded.
///
/// Every variant is scoped to one element: the scanner logs it and moves on.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
  #[error("id {id} does not have the expected format: period:org:repo:issue")]
  Format { id: String },

  #[error("HTTP error! status: {status} ({url})")]
  Fetch { url: String, status: u16 },

  #[error("expected repository {expected} but found {found}")]
  Mismatch { expected: String, found: String },

  #[error("failed to parse period document from {url}: {message}")]
  Parse { url: String, message: String },

  #[error("failed to reach {url}: {message}")]
  Transport { url: String, message: String },
}
