//! Locates the period documents for a page.
//!
//! When the book is served locally the site lives at `/`, but on the
//! deployed site everything sits under a sub-path such as
//! `/rust-project-goals/`. Those are the only two roots recognized.

use url::Url;

pub const DEFAULT_SUBPATH: &str = "/rust-project-goals/";

/// Computes endpoint URLs for the page it was created for.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
  root: String,
  origin: Option<Url>,
}

impl EndpointResolver {
  /// Create a resolver for the page served at `page_path`.
  pub fn for_page(page_path: &str, subpath: &str, origin: Option<&Url>) -> Self {
    let subpath = normalize_subpath(subpath);
    let root = if page_path.starts_with(&subpath) {
      subpath
    } else {
      "/".to_string()
    };

    Self {
      root,
      origin: origin.cloned(),
    }
  }

  /// The deployment root chosen for this page, always ending in `/`.
  pub fn root(&self) -> &str {
    &self.root
  }

  /// URL of the JSON document describing every tracked issue of `period`.
  pub fn resolve_url(&self, period: &str) -> String {
    let path = format!("{}api/{}.json", self.root, period);
    match &self.origin {
      Some(origin) => origin
        .join(&path)
        .map(String::from)
        .unwrap_or(path),
      None => path,
    }
  }
}

/// Ensure a sub-path has a leading and trailing slash.
fn normalize_subpath(subpath: &str) -> String {
  let trimmed = subpath.trim_matches('/');
  if trimmed.is_empty() {
    "/".to_string()
  } else {
    format!("/{}/", trimmed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_local_root() {
    let resolver = EndpointResolver::for_page("/2024h2/goals.html", DEFAULT_SUBPATH, None);
    assert_eq!(resolver.root(), "/");
    assert_eq!(resolver.resolve_url("2024h2"), "/api/2024h2.json");
  }

  #[test]
  fn test_deployed_root() {
    let resolver = EndpointResolver::for_page(
      "/rust-project-goals/2024h2/goals.html",
      DEFAULT_SUBPATH,
      None,
    );
    assert_eq!(resolver.root(), "/rust-project-goals/");
    assert_eq!(
      resolver.resolve_url("2024h2"),
      "/rust-project-goals/api/2024h2.json"
    );
  }

  #[test]
  fn test_subpath_must_match_whole_segment() {
    let resolver =
      EndpointResolver::for_page("/rust-project-goals-old/index.html", DEFAULT_SUBPATH, None);
    assert_eq!(resolver.root(), "/");
  }

  #[test]
  fn test_subpath_normalized() {
    let resolver = EndpointResolver::for_page("/goals/index.html", "goals", None);
    assert_eq!(resolver.resolve_url("2025h1"), "/goals/api/2025h1.json");
  }

  #[test]
  fn test_with_origin() {
    let origin = Url::parse("https://rust-lang.github.io").unwrap();
    let resolver = EndpointResolver::for_page(
      "/rust-project-goals/index.html",
      DEFAULT_SUBPATH,
      Some(&origin),
    );
    assert_eq!(
      resolver.resolve_url("2024h2"),
      "https://rust-lang.github.io/rust-project-goals/api/2024h2.json"
    );
  }
}
