//! Heading anchors and table-of-contents generation.
use std::{collections::HashSet, fmt::Write};

use crate::{types::Heading, utils::slugify};

/// Fallback id for headings whose text has no alphanumeric characters.
const EMPTY_SLUG: &str = "section";

/// Issues unique anchor ids for the headings of a single document.
///
/// A registry belongs to one parse; create a fresh one per document.
#[derive(Debug, Clone, Default)]
pub struct AnchorRegistry {
  issued: HashSet<String>,
}

impl AnchorRegistry {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Issue an id derived from heading text.
  pub fn issue(&mut self, text: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
      self.claim(EMPTY_SLUG)
    } else {
      self.claim(&slug)
    }
  }

  /// Claim `base` as-is, or `base-2`, `base-3`, ... if it is taken.
  pub fn claim(&mut self, base: &str) -> String {
    let mut candidate = base.to_string();
    let mut suffix = 2;
    while self.issued.contains(&candidate) {
      candidate = format!("{base}-{suffix}");
      suffix += 1;
    }
    self.issued.insert(candidate.clone());
    candidate
  }
}

/// A heading together with the headings nested under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocNode {
  pub heading:  Heading,
  pub children: Vec<Self>,
}

/// Nest a flat heading list by level.
///
/// A heading nests under the nearest preceding heading with a lower level;
/// skipped levels do not create intermediate nodes.
#[must_use]
pub fn build_toc(headings: &[Heading]) -> Vec<TocNode> {
  let mut roots = Vec::new();
  for heading in headings {
    insert(&mut roots, heading.clone());
  }
  roots
}

fn insert(nodes: &mut Vec<TocNode>, heading: Heading) {
  match nodes.last_mut() {
    Some(last) if last.heading.level < heading.level => {
      insert(&mut last.children, heading);
    },
    _ => {
      nodes.push(TocNode {
        heading,
        children: Vec::new(),
      });
    },
  }
}

/// Render a table of contents.
///
/// Returns an empty string when there is nothing to list so callers can
/// skip the wrapper entirely.
#[must_use]
pub fn render_toc(nodes: &[TocNode], title: Option<&str>) -> String {
  if nodes.is_empty() {
    return String::new();
  }

  let mut html = String::from("<nav class=\"toc\">\n");
  if let Some(title) = title {
    let _ = writeln!(
      html,
      "<p class=\"toc-title\">{}</p>",
      html_escape::encode_text(title)
    );
  }
  render_level(nodes, &mut html);
  html.push_str("</nav>");
  html
}

fn render_level(nodes: &[TocNode], html: &mut String) {
  html.push_str("<ul>\n");
  for node in nodes {
    let _ = write!(
      html,
      "<li><a href=\"#{}\">{}</a>",
      html_escape::encode_double_quoted_attribute(&node.heading.id),
      html_escape::encode_text(&node.heading.text)
    );
    if !node.children.is_empty() {
      html.push('\n');
      render_level(&node.children, html);
    }
    html.push_str("</li>\n");
  }
  html.push_str("</ul>\n");
}
