//! # tailoza-markdown
//!
//! The Markdown engine behind the Tailoza blog generator: a single-pass,
//! line-oriented parser for a small Markdown dialect, with frontmatter
//! extraction, heading anchors, tables of contents and pagination links.
//!
//! ## Quick Start
//!
//! ```rust
//! use tailoza_markdown::{MarkdownOptions, MarkdownProcessor};
//!
//! let processor = MarkdownProcessor::new(MarkdownOptions::default());
//! let result = processor.render("# Hello World\n\nThis is **bold** text.");
//!
//! assert!(result.html.contains("<h1 id=\"hello-world\">Hello World</h1>"));
//! assert_eq!(result.title.as_deref(), Some("Hello World"));
//! ```
//!
//! ## Documents with frontmatter
//!
//! ```rust
//! use tailoza_markdown::{MarkdownOptions, MarkdownProcessor};
//!
//! let processor = MarkdownProcessor::new(MarkdownOptions::default());
//! let doc = processor.render_document("---\ntitle: Notes\ntoc: yes\n---\n## First\n");
//!
//! assert_eq!(doc.metadata.title(), Some("Notes"));
//! assert!(doc.result.toc.contains("<a href=\"#first\">First</a>"));
//! ```
//!
//! ## Pagination
//!
//! ```rust
//! use tailoza_markdown::pagination::{PaginationRequest, build_pagination};
//!
//! let links = build_pagination(&PaginationRequest::new(195, 20, 5))?;
//! assert_eq!(links.len(), 9);
//! # Ok::<(), tailoza_markdown::PaginationError>(())
//! ```
//!
//! ## Features
//!
//! - **Block parser** written as an explicit state machine, one transition per
//!   line
//! - **Inline formatting** that escapes exactly once and is idempotent on its
//!   own output
//! - **Heading extraction** with unique anchor ids shared by headings and the
//!   table of contents
//! - **Pagination** with ellipsis collapsing
pub mod block;
pub mod error;
pub mod frontmatter;
pub mod inline;
pub mod pagination;
pub mod processor;
pub mod toc;
mod types;
pub mod utils;

pub use crate::{
  error::{PaginationError, ValidationError},
  frontmatter::{Document, Metadata, MetadataValue, extract_frontmatter},
  processor::{MarkdownOptions, MarkdownOptionsBuilder, MarkdownProcessor},
  types::{Heading, MarkdownResult, RenderedDocument},
};
