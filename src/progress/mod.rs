pub mod api_types;
pub mod error;
pub mod source;
pub mod store;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use source::{ConfiguredSource, DocumentSource, HttpSource, SiteDirSource};
pub use store::IssueStore;
pub use types::{IssueRecord, IssueState, Progress};
