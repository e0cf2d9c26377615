//! Post discovery and loading.
use std::{
  fs,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use jiff::civil::Date;
use log::{debug, trace};
use regex::Regex;
use tailoza_markdown::{
  MarkdownProcessor,
  MarkdownResult,
  Metadata,
  ValidationError,
  utils::never_matching_regex,
};
use walkdir::WalkDir;

use crate::error::{Result, TailozaError};

static FILENAME_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(\d{4}-\d{2}-\d{2})").unwrap_or_else(|e| {
    log::error!("Failed to compile FILENAME_DATE_RE regex: {e}");
    never_matching_regex()
  })
});

/// A rendered post, ready to be written out and listed.
#[derive(Debug, Clone)]
pub struct Post {
  /// File stem, used for the output file name.
  pub slug:         String,
  pub source:       PathBuf,
  pub date:         Date,
  pub metadata:     Metadata,
  pub result:       MarkdownResult,
  /// Estimated reading time in minutes.
  pub reading_time: usize,
}

impl Post {
  /// The post title. Loading guarantees it is present when `title` is a
  /// required field; the slug stands in otherwise.
  #[must_use]
  pub fn title(&self) -> &str {
    self.metadata.title().unwrap_or(&self.slug)
  }
}

/// Files whose name starts with an underscore are drafts.
#[must_use]
pub fn is_draft(path: &Path) -> bool {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .is_some_and(|name| name.starts_with('_'))
}

/// Collect the Markdown posts under `input_dir`, skipping drafts.
///
/// The result is sorted by path so repeated builds see the same order.
#[must_use]
pub fn collect_posts(input_dir: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
    .follow_links(true)
    .into_iter()
    .filter_map(std::result::Result::ok)
    .map(walkdir::DirEntry::into_path)
    .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
    .filter(|path| {
      let draft = is_draft(path);
      if draft {
        debug!("Skipping draft {}", path.display());
      }
      !draft
    })
    .collect();
  files.sort();

  trace!("Found {} posts to process", files.len());
  files
}

/// Work out a post's date: the `date` field, then a `YYYY-MM-DD` prefix in
/// the file name, then `today`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] when the field or file name holds
/// something that looks like a date but is not one.
pub fn resolve_date(
  metadata: &Metadata,
  file_name: &str,
  today: Date,
) -> std::result::Result<Date, ValidationError> {
  if let Some(value) = metadata.date().filter(|value| !value.trim().is_empty()) {
    return parse_date("date", value);
  }
  if let Some(prefix) = FILENAME_DATE_RE.find(file_name) {
    return parse_date("filename", prefix.as_str());
  }
  Ok(today)
}

/// Parse a date, ignoring any time of day after it.
fn parse_date(field: &str, value: &str) -> std::result::Result<Date, ValidationError> {
  let trimmed = value.trim();
  let day = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
  day.parse::<Date>().map_err(|_| {
    ValidationError::InvalidDate {
      field: field.to_string(),
      value: value.to_string(),
    }
  })
}

/// Read, validate and render one post.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required field is
/// missing, or the date is malformed.
pub fn load_post(
  path: &Path,
  processor: &MarkdownProcessor,
  required_fields: &[String],
  today: Date,
) -> Result<Post> {
  let source = fs::read_to_string(path).map_err(|source| {
    TailozaError::Read {
      path: path.to_path_buf(),
      source,
    }
  })?;
  let invalid = |source| {
    TailozaError::Post {
      path: path.to_path_buf(),
      source,
    }
  };

  let document = processor.render_document(&source);
  for field in required_fields {
    document.metadata.require(field).map_err(invalid)?;
  }

  let file_name = path
    .file_name()
    .and_then(|name| name.to_str())
    .unwrap_or_default();
  let date = resolve_date(&document.metadata, file_name, today).map_err(invalid)?;

  let slug = path
    .file_stem()
    .and_then(|stem| stem.to_str())
    .unwrap_or_default()
    .to_string();
  let reading_time = processor.reading_time(&document.result.html);

  Ok(Post {
    slug,
    source: path.to_path_buf(),
    date,
    metadata: document.metadata,
    result: document.result,
    reading_time,
  })
}

/// Newest first; posts on the same day are ordered by slug.
pub fn sort_posts(posts: &mut [Post]) {
  posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
}
