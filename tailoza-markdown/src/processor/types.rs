//! Type definitions for the Markdown processor.
//!
//! # Examples
//!
//! ```
//! use tailoza_markdown::{MarkdownOptions, MarkdownProcessor};
//!
//! let options = MarkdownOptions {
//!   toc: true,
//!   toc_title: Some("Contents".to_string()),
//!   ..Default::default()
//! };
//!
//! let processor = MarkdownProcessor::new(options);
//! ```
use serde::{Deserialize, Serialize};

use crate::{inline::InlineFormatter, utils::DEFAULT_WORDS_PER_MINUTE};

/// Options for configuring the Markdown processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
  /// Render a table of contents for documents that do not set `toc` in their
  /// frontmatter.
  pub toc: bool,

  /// Optional heading shown above the table of contents.
  pub toc_title: Option<String>,

  /// Optional: prefix for relative image sources.
  pub image_base: Option<String>,

  /// Mark links to archives and office documents as downloads.
  pub mark_downloads: bool,

  /// Reading speed used for reading-time estimates.
  pub words_per_minute: usize,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self {
      toc:              false,
      toc_title:        None,
      image_base:       None,
      mark_downloads:   false,
      words_per_minute: DEFAULT_WORDS_PER_MINUTE,
    }
  }
}

/// Main Markdown processor.
///
/// Holds no per-document state, so one processor can render many documents,
/// including from several threads at once.
#[derive(Debug, Clone)]
pub struct MarkdownProcessor {
  pub(crate) options: MarkdownOptions,
  pub(crate) inline:  InlineFormatter,
}

/// Builder for constructing `MarkdownOptions` with method chaining.
#[derive(Debug, Clone)]
pub struct MarkdownOptionsBuilder {
  options: MarkdownOptions,
}

impl MarkdownOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self {
      options: MarkdownOptions::default(),
    }
  }

  /// Enable or disable the table of contents by default.
  #[must_use]
  pub const fn toc(mut self, enabled: bool) -> Self {
    self.options.toc = enabled;
    self
  }

  /// Set the table of contents title.
  #[must_use]
  pub fn toc_title<S: Into<String>>(mut self, title: Option<S>) -> Self {
    self.options.toc_title = title.map(Into::into);
    self
  }

  /// Set the prefix for relative image sources.
  #[must_use]
  pub fn image_base<S: Into<String>>(mut self, base: Option<S>) -> Self {
    self.options.image_base = base.map(Into::into);
    self
  }

  /// Enable or disable download marking on links.
  #[must_use]
  pub const fn mark_downloads(mut self, enabled: bool) -> Self {
    self.options.mark_downloads = enabled;
    self
  }

  /// Set the reading speed. Zero falls back to the default.
  #[must_use]
  pub const fn words_per_minute(mut self, words: usize) -> Self {
    self.options.words_per_minute = words;
    self
  }

  /// Build the final `MarkdownOptions`.
  #[must_use]
  pub fn build(self) -> MarkdownOptions {
    self.options
  }
}

impl Default for MarkdownOptionsBuilder {
  fn default() -> Self {
    Self::new()
  }
}
