use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::endpoint::DEFAULT_SUBPATH;
use crate::page::DEFAULT_MARKER_CLASS;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Sub-path the site is deployed under (e.g. "/rust-project-goals/")
  pub site_subpath: String,
  /// Class marking tracking elements
  pub marker_class: String,
  /// Origin the period documents are fetched from (e.g. "https://rust-lang.github.io")
  pub origin: Option<String>,
  pub http: HttpConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      site_subpath: DEFAULT_SUBPATH.to_string(),
      marker_class: DEFAULT_MARKER_CLASS.to_string(),
      origin: None,
      http: HttpConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
  pub user_agent: String,
  /// Per-request timeout; there are no retries
  pub timeout_secs: u64,
}

impl Default for HttpConfig {
  fn default() -> Self {
    Self {
      user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
      timeout_secs: 30,
    }
  }
}

impl HttpConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./goal-progress.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/goal-progress/config.yaml
  ///
  /// Without an explicit path, a missing file means defaults.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("goal-progress.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("goal-progress").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Parsed origin, if one is configured.
  pub fn origin_url(&self) -> Result<Option<Url>> {
    self
      .origin
      .as_deref()
      .map(|origin| Url::parse(origin).map_err(|e| eyre!("Invalid origin {}: {}", origin, e)))
      .transpose()
  }
}
