//! Line classification for the block parser.
//!
//! Every helper here looks at exactly one line; the parser decides what to do
//! with the result based on its current state.
use std::sync::LazyLock;

use regex::Regex;

use super::types::Alignment;
use crate::utils::never_matching_regex;

/// Tabs count as this many columns of indentation.
const TAB_WIDTH: usize = 4;

static EXPLICIT_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(.*?)\s*\{#([A-Za-z0-9_-]+)\}\s*$").unwrap_or_else(|e| {
    log::error!("Failed to compile EXPLICIT_ID_RE regex: {e}");
    never_matching_regex()
  })
});

static IMAGE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"^!\[([^\]]*)\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)$"#)
    .unwrap_or_else(|e| {
      log::error!("Failed to compile IMAGE_LINE_RE regex: {e}");
      never_matching_regex()
    })
});

static HTML_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?i)^<(?:!--|/?(?:address|article|aside|audio|blockquote|canvas|details|dialog|div|dl|fieldset|figcaption|figure|footer|form|h[1-6]|header|hr|iframe|main|nav|ol|p|pre|script|section|style|summary|svg|table|ul|video)(?:[\s/>]|$))",
  )
  .unwrap_or_else(|e| {
    log::error!("Failed to compile HTML_BLOCK_RE regex: {e}");
    never_matching_regex()
  })
});

/// What a single line looks like, ignoring parser state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
  Blank,
  Fence {
    len:      usize,
    language: Option<&'a str>,
  },
  Heading {
    level: u8,
    text:  &'a str,
    id:    Option<&'a str>,
  },
  Quote(&'a str),
  ListItem(ListMarker<'a>),
  Rule,
  TableRow,
  Text,
}

/// A recognised list-item line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker<'a> {
  pub indent:  usize,
  pub ordered: bool,
  pub number:  Option<u64>,
  pub checked: Option<bool>,
  pub text:    &'a str,
}

/// Classify a line in rule priority order.
#[must_use]
pub fn classify(line: &str) -> LineKind<'_> {
  if line.trim().is_empty() {
    return LineKind::Blank;
  }
  if let Some((len, language)) = fence_open(line) {
    return LineKind::Fence { len, language };
  }
  if let Some((level, text, id)) = heading(line) {
    return LineKind::Heading { level, text, id };
  }
  if let Some(rest) = quote(line) {
    return LineKind::Quote(rest);
  }
  if let Some(marker) = list_marker(line) {
    return LineKind::ListItem(marker);
  }
  if is_rule(line) {
    return LineKind::Rule;
  }
  if line.trim_start().starts_with('|') {
    return LineKind::TableRow;
  }
  LineKind::Text
}

/// Width of the leading whitespace, with tabs expanded.
#[must_use]
pub fn indent_width(line: &str) -> usize {
  line
    .chars()
    .take_while(|c| *c == ' ' || *c == '\t')
    .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
    .sum()
}

/// Strip up to three spaces of indentation; `None` if the line is indented
/// further.
fn strip_indent(line: &str) -> Option<&str> {
  let trimmed = line.trim_start_matches(' ');
  (line.len() - trimmed.len() <= 3).then_some(trimmed)
}

fn backtick_run(line: &str) -> Option<(usize, &str)> {
  let stripped = strip_indent(line)?;
  let len = stripped.chars().take_while(|c| *c == '`').count();
  (len >= 3).then(|| (len, &stripped[len..]))
}

/// Opening fence: three or more backticks, optionally followed by a language.
fn fence_open(line: &str) -> Option<(usize, Option<&str>)> {
  let (len, rest) = backtick_run(line)?;
  let language = rest.split_whitespace().next().filter(|token| {
    token
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || "-_+#.".contains(c))
  });
  Some((len, language))
}

/// Whether `line` closes a fence opened with `open_len` backticks.
#[must_use]
pub fn is_closing_fence(line: &str, open_len: usize) -> bool {
  backtick_run(line).is_some_and(|(len, rest)| len >= open_len && rest.trim().is_empty())
}

fn heading(line: &str) -> Option<(u8, &str, Option<&str>)> {
  let stripped = strip_indent(line)?;
  let hashes = stripped.chars().take_while(|c| *c == '#').count();
  if !(1..=6).contains(&hashes) {
    return None;
  }
  let rest = stripped[hashes..].strip_prefix([' ', '\t'])?;
  let mut text = strip_closing_hashes(rest.trim());

  let mut id = None;
  if let Some(caps) = EXPLICIT_ID_RE.captures(text) {
    if let (Some(body), Some(anchor)) = (caps.get(1), caps.get(2)) {
      text = body.as_str();
      id = Some(anchor.as_str());
    }
  }

  if text.is_empty() {
    return None;
  }
  Some((u8::try_from(hashes).ok()?, text, id))
}

/// Drop an optional closing `###` sequence, which must follow a space.
fn strip_closing_hashes(text: &str) -> &str {
  let without = text.trim_end_matches('#');
  if without.len() == text.len() {
    return text;
  }
  if without.is_empty() {
    return without;
  }
  if without.ends_with([' ', '\t']) {
    without.trim_end()
  } else {
    text
  }
}

fn quote(line: &str) -> Option<&str> {
  let rest = strip_indent(line)?.strip_prefix('>')?;
  Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Recognise `- item`, `* item`, `+ item`, `1. item` and task items.
#[must_use]
pub fn list_marker(line: &str) -> Option<ListMarker<'_>> {
  let indent = indent_width(line);
  let body = line.trim_start_matches([' ', '\t']);

  let (ordered, number, after) = if let Some(rest) = body.strip_prefix(['-', '*', '+']) {
    (false, None, rest)
  } else {
    let digits = body.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
      return None;
    }
    let rest = body[digits..].strip_prefix('.')?;
    (true, body[..digits].parse::<u64>().ok(), rest)
  };

  // A marker must be followed by whitespace, or end the line.
  let text = if after.is_empty() {
    after
  } else {
    after.strip_prefix([' ', '\t'])?.trim()
  };

  let (checked, text) = task_state(text);
  Some(ListMarker {
    indent,
    ordered,
    number,
    checked,
    text,
  })
}

fn task_state(text: &str) -> (Option<bool>, &str) {
  for (prefix, checked) in [("[ ]", false), ("[x]", true), ("[X]", true)] {
    if let Some(rest) = text.strip_prefix(prefix) {
      if rest.is_empty() {
        return (Some(checked), rest);
      }
      if let Some(rest) = rest.strip_prefix([' ', '\t']) {
        return (Some(checked), rest.trim_start());
      }
    }
  }
  (None, text)
}

/// Three or more of the same `-`, `*` or `_` character and nothing else.
#[must_use]
pub fn is_rule(line: &str) -> bool {
  let Some(stripped) = strip_indent(line) else {
    return false;
  };
  let trimmed = stripped.trim_end();
  let mut chars = trimmed.chars();
  match chars.next() {
    Some(first @ ('-' | '*' | '_')) => {
      trimmed.len() >= 3 && chars.all(|c| c == first)
    },
    _ => false,
  }
}

/// Parse a table separator row into column alignments.
///
/// Outer pipes are optional, so a bare `---` line also qualifies.
#[must_use]
pub fn table_separator(line: &str) -> Option<Vec<Alignment>> {
  let cells = split_cells(line);
  if cells.is_empty() {
    return None;
  }
  cells
    .iter()
    .map(|cell| {
      let dashes = cell.trim_start_matches(':').trim_end_matches(':');
      let valid = !dashes.is_empty()
        && dashes.chars().all(|c| c == '-')
        && cell.len() - dashes.len() <= 2;
      valid.then(|| Alignment::from_separator(cell))
    })
    .collect()
}

/// Split a table row into trimmed cells, honouring `\|` escapes.
#[must_use]
pub fn split_cells(line: &str) -> Vec<String> {
  let mut row = line.trim();
  row = row.strip_prefix('|').unwrap_or(row);
  if row.ends_with('|') && !row.ends_with("\\|") {
    row = &row[..row.len() - 1];
  }
  if row.trim().is_empty() {
    return Vec::new();
  }

  let mut cells = Vec::new();
  let mut current = String::new();
  let mut chars = row.chars().peekable();
  while let Some(c) = chars.next() {
    match c {
      '\\' if chars.peek() == Some(&'|') => {
        current.push('|');
        chars.next();
      },
      '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
      _ => current.push(c),
    }
  }
  cells.push(current.trim().to_string());
  cells
}

/// A line holding nothing but an image: `(alt, src)`.
#[must_use]
pub fn standalone_image(line: &str) -> Option<(&str, &str)> {
  let caps = IMAGE_LINE_RE.captures(line.trim())?;
  Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// A line that is a single italic span (`*caption*` or `_caption_`).
#[must_use]
pub fn caption(line: &str) -> Option<&str> {
  let trimmed = line.trim();
  ['*', '_'].into_iter().find_map(|marker| {
    let inner = trimmed.strip_prefix(marker)?.strip_suffix(marker)?;
    let clean = !inner.is_empty()
      && !inner.contains(marker)
      && !inner.starts_with(char::is_whitespace)
      && !inner.ends_with(char::is_whitespace);
    clean.then_some(inner)
  })
}

/// Whether the line opens a raw HTML block.
#[must_use]
pub fn is_html_block_start(line: &str) -> bool {
  strip_indent(line).is_some_and(|s| HTML_BLOCK_RE.is_match(s))
}
