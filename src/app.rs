use crate::config::Config;
use crate::endpoint::EndpointResolver;
use crate::page::HtmlPage;
use crate::progress::{ConfiguredSource, HttpSource, IssueStore, SiteDirSource};
use crate::render::render;
use crate::scanner::{ScanReport, Scanner};
use color_eyre::{eyre::eyre, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Where documents come from and where the pages are served.
#[derive(Debug, Clone, Default)]
pub struct SiteOptions {
  /// Built site to read period documents from instead of the network
  pub site_dir: Option<PathBuf>,
  /// URL path the pages are served under
  pub base: String,
  /// Overrides the configured origin
  pub origin: Option<String>,
}

/// Where enriched pages are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
  Stdout,
  InPlace,
  Dir(PathBuf),
}

/// Main application state
pub struct App {
  /// Application configuration
  config: Config,
}

impl App {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  fn scanner(&self, site: &SiteOptions) -> Result<Scanner<ConfiguredSource>> {
    let origin = match &site.origin {
      Some(origin) => Some(
        url::Url::parse(origin).map_err(|e| eyre!("Invalid origin {}: {}", origin, e))?,
      ),
      None => self.config.origin_url()?,
    };

    let source = match (&site.site_dir, &origin) {
      (Some(dir), _) => {
        ConfiguredSource::SiteDir(SiteDirSource::new(dir, &self.config.site_subpath))
      }
      (None, Some(_)) => ConfiguredSource::Http(
        HttpSource::new(&self.config.http.user_agent, self.config.http.timeout())
          .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?,
      ),
      (None, None) => {
        return Err(eyre!(
          "Nowhere to load period documents from. Pass --site-dir or configure an origin."
        ))
      }
    };

    // Documents from a site directory are addressed by path alone
    let origin = if site.site_dir.is_some() { None } else { origin };
    let resolver =
      EndpointResolver::for_page(&site.base, &self.config.site_subpath, origin.as_ref());
    info!(root = resolver.root(), "resolved deployment root");

    Ok(Scanner::new(IssueStore::new(source, resolver)))
  }

  /// Add progress indicators to each page and write it to `output`.
  pub async fn enrich_pages(
    &self,
    files: &[PathBuf],
    site: &SiteOptions,
    output: &Output,
  ) -> Result<ScanReport> {
    if files.len() > 1 && *output == Output::Stdout {
      return Err(eyre!("Several pages given: pass --in-place or --out-dir"));
    }

    let targets = match output {
      Output::Dir(dir) => Some(out_dir_targets(files, site.site_dir.as_deref(), dir).await?),
      _ => None,
    };

    let scanner = self.scanner(site)?;
    let mut total = ScanReport::default();

    for (index, file) in files.iter().enumerate() {
      let html = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| eyre!("Failed to read page {}: {}", file.display(), e))?;

      let mut page = HtmlPage::new(html, &self.config.marker_class);
      let report = scanner.run(&mut page).await;
      info!(
        page = %file.display(),
        elements = report.total(),
        rendered = report.rendered,
        skipped = report.skipped,
        failed = report.failed,
        "processed page"
      );
      total += report;

      let html = page.finish();
      match output {
        Output::Stdout => print!("{}", html),
        Output::InPlace => write_page(file, &html).await?,
        Output::Dir(_) => {
          if let Some(target) = targets.as_ref().and_then(|t| t.get(index)) {
            write_page(target, &html).await?;
          }
        }
      }
    }

    info!(
      periods = scanner.store().cached_periods().len(),
      fetches = scanner.store().fetch_count(),
      "done"
    );
    Ok(total)
  }

  /// Print the indicator each identifier would get.
  pub async fn print_status(&self, ids: &[String], site: &SiteOptions) -> Result<()> {
    let scanner = self.scanner(site)?;

    for id in ids {
      match scanner.store().load(id).await {
        Ok(Some(record)) => println!("{}: {}", id, render(&record).to_html()),
        Ok(None) => println!("{}: no such issue", id),
        Err(e) => {
          error!(%id, "Error loading data: {}", e);
          println!("{}: error: {}", id, e);
        }
      }
    }

    Ok(())
  }
}

/// Where each page is written under `out_dir`, worked out before anything is
/// written.
///
/// Pages keep their path within the site directory; without one, only the
/// file name is kept. Pages outside the site directory and pages that would
/// land on the same target are refused.
async fn out_dir_targets(
  files: &[PathBuf],
  site_dir: Option<&Path>,
  out_dir: &Path,
) -> Result<Vec<PathBuf>> {
  let site_dir = match site_dir {
    Some(dir) => Some(canonical(dir).await?),
    None => None,
  };

  let mut seen = HashSet::new();
  let mut targets = Vec::with_capacity(files.len());
  for file in files {
    let relative = match &site_dir {
      Some(dir) => canonical(file)
        .await?
        .strip_prefix(dir)
        .map(Path::to_path_buf)
        .map_err(|_| {
          eyre!(
            "Page {} is not inside the site directory {}",
            file.display(),
            dir.display()
          )
        })?,
      None => file
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| eyre!("Page {} has no file name", file.display()))?,
    };

    let target = out_dir.join(relative);
    if !seen.insert(target.clone()) {
      return Err(eyre!("Several pages would be written to {}", target.display()));
    }
    targets.push(target);
  }

  Ok(targets)
}

async fn canonical(path: &Path) -> Result<PathBuf> {
  tokio::fs::canonicalize(path)
    .await
    .map_err(|e| eyre!("Failed to resolve {}: {}", path.display(), e))
}

async fn write_page(path: &Path, html: &str) -> Result<()> {
  if let Some(parent) = path.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .map_err(|e| eyre!("Failed to create {}: {}", parent.display(), e))?;
  }
  tokio::fs::write(path, html)
    .await
    .map_err(|e| eyre!("Failed to write page {}: {}", path.display(), e))
}
