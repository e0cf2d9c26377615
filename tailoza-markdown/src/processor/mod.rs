//! Markdown processing entry point.
//!
//! - [`core`]: the rendering pipeline (frontmatter, blocks, table of contents)
//! - [`types`]: options, their builder and the processor itself
pub mod core;
pub mod types;

pub use types::{MarkdownOptions, MarkdownOptionsBuilder, MarkdownProcessor};

#[cfg(test)]
mod tests {
  use super::{MarkdownOptions, MarkdownOptionsBuilder, MarkdownProcessor};

  #[test]
  fn test_builder_matches_struct_literal() {
    let built = MarkdownOptionsBuilder::new()
      .toc(true)
      .toc_title(Some("On this page"))
      .image_base(Some("/assets"))
      .mark_downloads(true)
      .words_per_minute(250)
      .build();

    assert_eq!(built, MarkdownOptions {
      toc:              true,
      toc_title:        Some("On this page".to_string()),
      image_base:       Some("/assets".to_string()),
      mark_downloads:   true,
      words_per_minute: 250,
    });
  }

  #[test]
  fn test_processor_exposes_options() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    assert!(!processor.options().toc);
    assert_eq!(processor.options().words_per_minute, 200);
  }
}
