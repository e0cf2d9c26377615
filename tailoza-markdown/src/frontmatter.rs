//! Frontmatter extraction.
//!
//! A document may start with a `---` line, followed by `key: value` pairs and
//! a closing `---` line. Anything else is treated as plain body text.
use std::fmt::Write;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const DELIMITER: &str = "---";

/// Keys understood by the extractor. Everything else is dropped.
pub const KNOWN_KEYS: [&str; 8] = [
  "title",
  "date",
  "description",
  "author",
  "categories",
  "keywords",
  "image",
  "toc",
];

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
  Text(String),
  Bool(bool),
  List(Vec<String>),
}

impl MetadataValue {
  fn render(&self) -> String {
    match self {
      Self::Text(text) => text.clone(),
      Self::Bool(flag) => flag.to_string(),
      Self::List(items) => items.join(", "),
    }
  }
}

/// Document metadata, in the order the keys appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
  entries: IndexMap<String, MetadataValue>,
}

impl Metadata {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub fn get(&self, key: &str) -> Option<&MetadataValue> {
    self.entries.get(key)
  }

  /// Insert a raw `key: value` pair, typed according to the key.
  ///
  /// Returns `false` (and stores nothing) for unknown keys.
  pub fn insert_raw(&mut self, key: &str, raw: &str) -> bool {
    if !KNOWN_KEYS.contains(&key) {
      return false;
    }
    let value = match key {
      "categories" | "keywords" => MetadataValue::List(split_list(raw)),
      "toc" => MetadataValue::Bool(parse_flag(raw)),
      _ => MetadataValue::Text(raw.to_string()),
    };
    self.entries.insert(key.to_string(), value);
    true
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v))
  }

  /// Text value for `key`, if present and textual.
  #[must_use]
  pub fn text(&self, key: &str) -> Option<&str> {
    match self.entries.get(key) {
      Some(MetadataValue::Text(text)) => Some(text.as_str()),
      _ => None,
    }
  }

  /// List value for `key`; empty when absent.
  #[must_use]
  pub fn list(&self, key: &str) -> &[String] {
    match self.entries.get(key) {
      Some(MetadataValue::List(items)) => items,
      _ => &[],
    }
  }

  #[must_use]
  pub fn title(&self) -> Option<&str> {
    self.text("title")
  }

  #[must_use]
  pub fn date(&self) -> Option<&str> {
    self.text("date")
  }

  #[must_use]
  pub fn description(&self) -> Option<&str> {
    self.text("description")
  }

  #[must_use]
  pub fn author(&self) -> Option<&str> {
    self.text("author")
  }

  #[must_use]
  pub fn image(&self) -> Option<&str> {
    self.text("image")
  }

  #[must_use]
  pub fn categories(&self) -> &[String] {
    self.list("categories")
  }

  #[must_use]
  pub fn keywords(&self) -> &[String] {
    self.list("keywords")
  }

  /// The `toc` flag, or `None` when the document does not say.
  #[must_use]
  pub fn toc(&self) -> Option<bool> {
    match self.entries.get("toc") {
      Some(MetadataValue::Bool(flag)) => Some(*flag),
      _ => None,
    }
  }

  /// Require a non-empty text field.
  ///
  /// # Errors
  ///
  /// Returns [`ValidationError::MissingField`] if the field is absent, not
  /// text, or blank.
  pub fn require(&self, field: &str) -> Result<&str, ValidationError> {
    self
      .text(field)
      .filter(|value| !value.trim().is_empty())
      .ok_or_else(|| {
        ValidationError::MissingField {
          field: field.to_string(),
        }
      })
  }

  /// Require every field in `fields`, reporting the first one missing.
  ///
  /// # Errors
  ///
  /// Returns [`ValidationError::MissingField`] naming the first absent field.
  pub fn validate(&self, fields: &[&str]) -> Result<(), ValidationError> {
    for field in fields {
      self.require(field)?;
    }
    Ok(())
  }
}

/// A source document split into metadata and body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  pub metadata: Metadata,
  pub body:     String,
}

impl Document {
  /// Serialize back into frontmatter + body form.
  ///
  /// Documents without metadata are returned as the bare body.
  #[must_use]
  pub fn to_markdown(&self) -> String {
    if self.metadata.is_empty() {
      return self.body.clone();
    }

    let mut out = String::with_capacity(self.body.len() + 64);
    out.push_str(DELIMITER);
    out.push('\n');
    for (key, value) in self.metadata.iter() {
      let _ = writeln!(out, "{key}: {}", value.render());
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&self.body);
    out
  }
}

/// Split a document into its frontmatter and body.
///
/// Missing or unterminated frontmatter is not an error: the whole input
/// becomes the body and the metadata is empty.
#[must_use]
pub fn extract_frontmatter(content: &str) -> Document {
  let whole = || {
    Document {
      metadata: Metadata::new(),
      body:     content.to_string(),
    }
  };

  let mut lines = content.split_inclusive('\n');
  match lines.next() {
    Some(first) if is_delimiter(first) => {},
    _ => return whole(),
  }

  let mut metadata = Metadata::new();
  let mut consumed = content.find('\n').map_or(content.len(), |i| i + 1);

  for line in lines {
    consumed += line.len();
    if is_delimiter(line) {
      return Document {
        metadata,
        body: content[consumed..].to_string(),
      };
    }

    let Some((key, value)) = line.split_once(':') else {
      continue;
    };
    let key = key.trim();
    if !metadata.insert_raw(key, &unquote(value.trim())) {
      log::trace!("Ignoring unknown frontmatter key: {key}");
    }
  }

  log::debug!("Frontmatter opened but never closed, treating input as body");
  whole()
}

fn is_delimiter(line: &str) -> bool {
  line.trim_end_matches(['\n', '\r']) == DELIMITER
}

fn unquote(value: &str) -> String {
  for quote in ['"', '\''] {
    if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
      return value[1..value.len() - 1].to_string();
    }
  }
  value.to_string()
}

fn split_list(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(ToString::to_string)
    .collect()
}

fn parse_flag(raw: &str) -> bool {
  matches!(
    raw.trim().to_ascii_lowercase().as_str(),
    "true" | "yes" | "on" | "1"
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_basic_frontmatter() {
    let doc = extract_frontmatter("---\ntitle: X\n---\nbody");
    assert_eq!(doc.metadata.title(), Some("X"));
    assert_eq!(doc.metadata.len(), 1);
    assert_eq!(doc.body, "body");
  }

  #[test]
  fn test_no_frontmatter() {
    let doc = extract_frontmatter("# Hello\n\ntext");
    assert!(doc.metadata.is_empty());
    assert_eq!(doc.body, "# Hello\n\ntext");
  }

  #[test]
  fn test_unterminated_frontmatter_is_body() {
    let input = "---\ntitle: X\nno closing line";
    let doc = extract_frontmatter(input);
    assert!(doc.metadata.is_empty());
    assert_eq!(doc.body, input);
  }

  #[test]
  fn test_crlf_delimiters() {
    let doc = extract_frontmatter("---\r\ntitle: Windows\r\n---\r\nbody");
    assert_eq!(doc.metadata.title(), Some("Windows"));
    assert_eq!(doc.body, "body");
  }

  #[test]
  fn test_quotes_and_lists() {
    let doc = extract_frontmatter(
      "---\ntitle: \"Quoted: yes\"\nauthor: 'Sam'\ncategories: Rust, , Web \
       Dev,\nkeywords: a,b\ntoc: Yes\nlayout: wide\nnot a pair\n---\n",
    );
    assert_eq!(doc.metadata.title(), Some("Quoted: yes"));
    assert_eq!(doc.metadata.author(), Some("Sam"));
    assert_eq!(doc.metadata.categories(), ["Rust", "Web Dev"]);
    assert_eq!(doc.metadata.keywords(), ["a", "b"]);
    assert_eq!(doc.metadata.toc(), Some(true));
    assert!(doc.metadata.get("layout").is_none());
    assert_eq!(doc.body, "");
  }

  #[test]
  fn test_mismatched_quotes_are_kept() {
    let doc = extract_frontmatter("---\ntitle: \"half'\n---\n");
    assert_eq!(doc.metadata.title(), Some("\"half'"));
  }

  #[test]
  fn test_require_reports_missing_field() {
    let doc = extract_frontmatter("---\ntitle: X\ndate:   \n---\n");
    assert_eq!(doc.metadata.require("title"), Ok("X"));
    assert_eq!(
      doc.metadata.validate(&["title", "date"]),
      Err(ValidationError::MissingField {
        field: "date".to_string(),
      })
    );
  }

  #[test]
  fn test_round_trip() {
    let source = "---\ntitle: X\ncategories: a, b\ntoc: true\n---\nbody\n";
    let doc = extract_frontmatter(source);
    let again = extract_frontmatter(&doc.to_markdown());
    assert_eq!(doc, again);
    assert_eq!(doc.to_markdown(), source);
  }
}
