//! Types for tailoza-markdown public API and internal use.
use serde::{Deserialize, Serialize};

use crate::frontmatter::Metadata;

/// A heading collected while parsing a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Heading {
  /// Heading text (inline content, no markdown formatting).
  pub text:  String,
  /// Heading level (1-6).
  pub level: u8,
  /// Anchor ID shared by the heading tag and the table of contents.
  pub id:    String,
}

/// Result of Markdown processing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkdownResult {
  /// Rendered HTML fragment.
  pub html: String,

  /// Headings in document order.
  pub headings: Vec<Heading>,

  /// Table of contents markup; empty when disabled or when there are no
  /// headings.
  pub toc: String,

  /// Title of the document, if found (first H1).
  pub title: Option<String>,
}

/// A full source document after frontmatter extraction and rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderedDocument {
  pub metadata: Metadata,
  pub result:   MarkdownResult,
}
