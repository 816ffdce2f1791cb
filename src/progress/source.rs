//! Where period documents come from.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use tracing::debug;
use url::Url;

use super::error::LoadError;

/// Raw response for one period document request.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
  pub status: u16,
  pub body: Vec<u8>,
}

impl FetchedDocument {
  pub fn ok(body: impl Into<Vec<u8>>) -> Self {
    Self {
      status: 200,
      body: body.into(),
    }
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Fetches the document behind an endpoint URL.
///
/// Implementations report non-success responses through
/// [`FetchedDocument::status`]; only failures that never produced a response
/// are returned as errors.
pub trait DocumentSource: Send + Sync {
  fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedDocument, LoadError>> + Send;
}

/// Fetches documents from the deployed site over HTTP.
#[derive(Clone)]
pub struct HttpSource {
  client: reqwest::Client,
}

impl HttpSource {
  pub fn new(user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(user_agent)
      .timeout(timeout)
      .build()?;
    Ok(Self { client })
  }
}

impl DocumentSource for HttpSource {
  async fn fetch(&self, url: &str) -> Result<FetchedDocument, LoadError> {
    let transport = |e: reqwest::Error| LoadError::Transport {
      url: url.to_string(),
      message: e.to_string(),
    };

    let response = self.client.get(url).send().await.map_err(transport)?;
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(transport)?;
    debug!(url, status, bytes = body.len(), "fetched period document");

    Ok(FetchedDocument {
      status,
      body: body.to_vec(),
    })
  }
}

/// Reads documents out of a locally built site directory.
///
/// Endpoint paths are mapped onto the directory after removing the
/// deployment root, so `/rust-project-goals/api/2024h2.json` and
/// `/api/2024h2.json` both resolve to `<root>/api/2024h2.json`.
#[derive(Debug, Clone)]
pub struct SiteDirSource {
  root: PathBuf,
  subpath: String,
}

impl SiteDirSource {
  pub fn new(root: impl Into<PathBuf>, subpath: &str) -> Self {
    Self {
      root: root.into(),
      subpath: subpath.to_string(),
    }
  }

  /// Map an endpoint URL into the site directory. `None` if the path would
  /// leave it.
  fn local_path(&self, url: &str) -> Option<PathBuf> {
    let path = match Url::parse(url) {
      Ok(parsed) => parsed.path().to_string(),
      Err(_) => url.to_string(),
    };
    let relative = path
      .strip_prefix(self.subpath.as_str())
      .or_else(|| path.strip_prefix('/'))
      .unwrap_or(&path);

    let relative = Path::new(relative);
    let inside = relative
      .components()
      .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    inside.then(|| self.root.join(relative))
  }
}

impl DocumentSource for SiteDirSource {
  async fn fetch(&self, url: &str) -> Result<FetchedDocument, LoadError> {
    let Some(path) = self.local_path(url) else {
      return Err(LoadError::Transport {
        url: url.to_string(),
        message: "path leaves the site directory".to_string(),
      });
    };
    debug!(url, path = %path.display(), "reading period document");

    match tokio::fs::read(&path).await {
      Ok(body) => Ok(FetchedDocument::ok(body)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(FetchedDocument {
        status: 404,
        body: Vec::new(),
      }),
      Err(e) => Err(LoadError::Transport {
        url: url.to_string(),
        message: format!("{}: {}", path.display(), e),
      }),
    }
  }
}

/// The source picked at startup: a local site build or the deployed site.
#[derive(Clone)]
pub enum ConfiguredSource {
  Http(HttpSource),
  SiteDir(SiteDirSource),
}

impl DocumentSource for ConfiguredSource {
  async fn fetch(&self, url: &str) -> Result<FetchedDocument, LoadError> {
    match self {
      ConfiguredSource::Http(source) => source.fetch(url).await,
      ConfiguredSource::SiteDir(source) => source.fetch(url).await,
    }
  }
}
