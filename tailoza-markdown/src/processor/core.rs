//! Core implementation of the Markdown processor.
//!
//! This module contains the rendering pipeline: frontmatter extraction, the
//! block parser and table of contents generation.
use log::trace;

use super::types::{MarkdownOptions, MarkdownProcessor};
use crate::{
  block::{self, ParsedBody},
  frontmatter::extract_frontmatter,
  inline::InlineFormatter,
  toc::{build_toc, render_toc},
  types::{Heading, MarkdownResult, RenderedDocument},
  utils,
};

impl MarkdownProcessor {
  /// Create a new `MarkdownProcessor` with the given options.
  #[must_use]
  pub fn new(options: MarkdownOptions) -> Self {
    let inline = InlineFormatter::new()
      .with_image_base(options.image_base.clone())
      .with_download_marking(options.mark_downloads);
    Self { options, inline }
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// The inline formatter configured from these options.
  #[must_use]
  pub const fn inline(&self) -> &InlineFormatter {
    &self.inline
  }

  /// Render a Markdown body (no frontmatter) to HTML.
  ///
  /// The table of contents is included when the `toc` option is set.
  #[must_use]
  pub fn render(&self, markdown: &str) -> MarkdownResult {
    self.render_with_toc(markdown, self.options.toc)
  }

  /// Render a full source document: frontmatter first, then the body.
  ///
  /// A `toc` key in the frontmatter overrides the `toc` option.
  #[must_use]
  pub fn render_document(&self, source: &str) -> RenderedDocument {
    let document = extract_frontmatter(source);
    let toc = document.metadata.toc().unwrap_or(self.options.toc);
    trace!(
      "Rendering document with {} metadata entries (toc: {toc})",
      document.metadata.len()
    );
    let result = self.render_with_toc(&document.body, toc);
    RenderedDocument {
      metadata: document.metadata,
      result,
    }
  }

  /// Extract headings with the ids they would be rendered with.
  #[must_use]
  pub fn extract_headings(&self, markdown: &str) -> Vec<Heading> {
    block::parse(&self.inline, markdown).headings
  }

  /// Reading time for rendered HTML, in whole minutes.
  #[must_use]
  pub fn reading_time(&self, html: &str) -> usize {
    utils::reading_time(html, self.options.words_per_minute)
  }

  fn render_with_toc(&self, markdown: &str, toc: bool) -> MarkdownResult {
    let ParsedBody { html, headings } = block::parse(&self.inline, markdown);

    let title = headings
      .iter()
      .find(|heading| heading.level == 1)
      .map(|heading| heading.text.clone());

    let toc = if toc {
      render_toc(&build_toc(&headings), self.options.toc_title.as_deref())
    } else {
      String::new()
    };

    MarkdownResult {
      html,
      headings,
      toc,
      title,
    }
  }
}
