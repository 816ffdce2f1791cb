//! A built HTML page and the tracking elements inside it.

use std::sync::OnceLock;

use regex::Regex;

pub const DEFAULT_MARKER_CLASS: &str = "tracking-issue-progress";

fn re_div_open() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?is)<div\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap())
}

fn re_div_tag() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?is)<(/?)div\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap())
}

fn re_attr() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
      .unwrap()
  })
}

/// An element that declares a tracked issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingElement {
  /// The element's `id` attribute, if it has one
  pub id: Option<String>,
  /// Byte offset of the element's closing tag, where children are appended
  insert_at: usize,
}

/// HTML text with pending fragment insertions.
///
/// Insertions are collected and applied in one pass by [`HtmlPage::finish`],
/// so offsets found by [`HtmlPage::tracking_elements`] stay valid no matter
/// in which order elements are attached.
#[derive(Debug)]
pub struct HtmlPage {
  html: String,
  marker_class: String,
  pending: Vec<(usize, String)>,
}

impl HtmlPage {
  pub fn new(html: impl Into<String>, marker_class: &str) -> Self {
    Self {
      html: html.into(),
      marker_class: marker_class.to_string(),
      pending: Vec::new(),
    }
  }

  /// All `div` elements carrying the marker class, in document order.
  pub fn tracking_elements(&self) -> Vec<TrackingElement> {
    re_div_open()
      .captures_iter(&self.html)
      .filter_map(|caps| {
        let tag = caps.get(0)?;
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        let class = attribute(attrs, "class")?;
        if !class.split_whitespace().any(|c| c == self.marker_class) {
          return None;
        }

        let id = attribute(attrs, "id").filter(|id| !id.is_empty());
        let insert_at = if attrs.trim_end().ends_with('/') {
          tag.end()
        } else {
          self.closing_tag(tag.end())
        };
        Some(TrackingElement { id, insert_at })
      })
      .collect()
  }

  /// Find the `</div>` closing the element whose content starts at `from`.
  ///
  /// Falls back to the start of the content when the element is never closed.
  fn closing_tag(&self, from: usize) -> usize {
    let mut depth = 1usize;
    for caps in re_div_tag().captures_iter(&self.html[from..]) {
      let Some(tag) = caps.get(0) else { continue };
      let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
      let self_closing = caps
        .get(2)
        .is_some_and(|m| m.as_str().trim_end().ends_with('/'));

      if closing {
        depth -= 1;
        if depth == 0 {
          return from + tag.start();
        }
      } else if !self_closing {
        depth += 1;
      }
    }
    from
  }

  /// Append an HTML fragment as the last child of `element`.
  pub fn attach(&mut self, element: &TrackingElement, fragment: String) {
    self.pending.push((element.insert_at, fragment));
  }

  /// Apply all attached fragments and return the resulting HTML.
  pub fn finish(mut self) -> String {
    if self.pending.is_empty() {
      return self.html;
    }

    // Stable sort keeps attach order for elements sharing an offset
    self.pending.sort_by_key(|(offset, _)| *offset);

    let extra: usize = self.pending.iter().map(|(_, f)| f.len()).sum();
    let mut out = String::with_capacity(self.html.len() + extra);
    let mut last = 0;
    for (offset, fragment) in &self.pending {
      out.push_str(&self.html[last..*offset]);
      out.push_str(fragment);
      last = *offset;
    }
    out.push_str(&self.html[last..]);
    out
  }
}

/// Look up an attribute value in the attribute text of a start tag.
fn attribute(attrs: &str, name: &str) -> Option<String> {
  re_attr().captures_iter(attrs).find_map(|caps| {
    if !caps[1].eq_ignore_ascii_case(name) {
      return None;
    }
    caps
      .get(2)
      .or_else(|| caps.get(3))
      .or_else(|| caps.get(4))
      .map(|m| m.as_str().to_string())
  })
}
