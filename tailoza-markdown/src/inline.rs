//! Inline span formatting.
//!
//! Turns a single run of text into HTML: code spans, images, links,
//! bold/italic/strikethrough and backslash escapes. Text outside markup is
//! escaped exactly once; character references and inline tags that are
//! already present pass through unchanged, so feeding the formatter its own
//! output returns it untouched.
use std::{fmt::Write as _, sync::LazyLock};

use regex::Regex;

use crate::utils::{never_matching_regex, strip_tags};

/// Characters a backslash can escape.
const ESCAPABLE: &[u8] = b"\\`*_~[]()!#<>|-+.{}";

/// Characters the formatter itself acts on. When they must come out literally
/// they are written as character references, which a later pass leaves alone.
const MARKUP: &[u8] = b"\\`*_~[]";

/// Link targets treated as downloads when download marking is enabled.
const DOWNLOAD_EXTENSIONS: [&str; 10] = [
  ".pdf", ".zip", ".tar", ".gz", ".doc", ".docx", ".xls", ".xlsx", ".ppt",
  ".pptx",
];

const DOWNLOAD_MARK: &str = "⬇";

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
    .unwrap_or_else(|e| {
      log::error!("Failed to compile ENTITY_RE regex: {e}");
      never_matching_regex()
    })
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?:<!--[\s\S]*?-->|</?[A-Za-z][A-Za-z0-9-]*(?:\s+[^<>]*?)?\s*/?>)")
    .unwrap_or_else(|e| {
      log::error!("Failed to compile TAG_RE regex: {e}");
      never_matching_regex()
    })
});

/// Formatter for inline Markdown spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineFormatter {
  image_base:     Option<String>,
  mark_downloads: bool,
}

struct LinkParts<'a> {
  label: &'a str,
  url:   &'a str,
  title: Option<&'a str>,
  /// Byte offset just past the closing parenthesis.
  end:   usize,
}

impl InlineFormatter {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Rewrite relative image sources to live under `base`.
  #[must_use]
  pub fn with_image_base<S: Into<String>>(mut self, base: Option<S>) -> Self {
    self.image_base = base.map(Into::into);
    self
  }

  /// Add a `download` attribute and marker to links pointing at archives and
  /// office documents.
  #[must_use]
  pub const fn with_download_marking(mut self, enabled: bool) -> Self {
    self.mark_downloads = enabled;
    self
  }

  /// Format one run of text into HTML.
  #[must_use]
  pub fn format(&self, text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    self.format_into(text, &mut out);
    out
  }

  /// Text content of `text` once formatted: no tags, entities decoded.
  #[must_use]
  pub fn plain_text(&self, text: &str) -> String {
    let stripped = strip_tags(&self.format(text));
    html_escape::decode_html_entities(&stripped).trim().to_string()
  }

  fn format_into(&self, text: &str, out: &mut String) {
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
      match bytes[i] {
        b'\\' => {
          if let Some(&next) = bytes.get(i + 1) {
            if ESCAPABLE.contains(&next) {
              push_escaped_char(out, next);
              i += 2;
              continue;
            }
          }
        },
        b'`' => {
          if let Some(end) = code_span_end(text, i) {
            out.push_str("<code>");
            push_code(out, &text[i + 1..end]);
            out.push_str("</code>");
            i = end + 1;
            continue;
          }
        },
        b'!' => {
          if bytes.get(i + 1) == Some(&b'[') {
            if let Some(link) = parse_link(text, i + 1) {
              self.push_image(&link, out);
              i = link.end;
              continue;
            }
          }
        },
        b'[' => {
          if let Some(link) = parse_link(text, i) {
            if !link.label.trim().is_empty() {
              self.push_link(&link, out);
              i = link.end;
              continue;
            }
          }
        },
        b'*' | b'_' | b'~' => {
          i = self.emphasis(text, i, out);
          continue;
        },
        b'&' => {
          match ENTITY_RE.find(&text[i..]) {
            Some(m) => {
              out.push_str(m.as_str());
              i += m.end();
            },
            None => {
              out.push_str("&amp;");
              i += 1;
            },
          }
          continue;
        },
        b'<' => {
          match TAG_RE.find(&text[i..]) {
            Some(m) => {
              out.push_str(m.as_str());
              i += m.end();
            },
            None => {
              out.push_str("&lt;");
              i += 1;
            },
          }
          continue;
        },
        b'>' => {
          out.push_str("&gt;");
          i += 1;
          continue;
        },
        _ => {},
      }

      // Plain character, possibly multi-byte.
      let Some(ch) = text[i..].chars().next() else {
        break;
      };
      out.push(ch);
      i += ch.len_utf8();
    }
  }

  /// Handle a delimiter run at `start`, returning the index to resume at.
  ///
  /// The longest delimiter is tried first; when the run is longer than the
  /// delimiter that matched, the surplus is emitted literally.
  fn emphasis(&self, text: &str, start: usize, out: &mut String) -> usize {
    let bytes = text.as_bytes();
    let marker = bytes[start];
    let run = run_length(bytes, start);
    let lengths: &[usize] = match marker {
      b'*' => &[3, 2, 1],
      b'~' => &[2],
      _ => &[1],
    };

    let intraword = marker == b'_'
      && text[..start]
        .chars()
        .next_back()
        .is_some_and(char::is_alphanumeric);

    if !intraword {
      for &len in lengths.iter().filter(|&&len| len <= run) {
        let content_start = start + run;
        let Some(close) = find_closing(text, content_start, marker, len) else {
          continue;
        };

        for _ in 0..run - len {
          out.push(char::from(marker));
        }
        let (open_tag, close_tag) = emphasis_tags(marker, len);
        out.push_str(open_tag);
        self.format_into(&text[content_start..close], out);
        out.push_str(close_tag);
        return close + len;
      }
    }

    out.push_str(&text[start..start + run]);
    start + run
  }

  fn push_link(&self, link: &LinkParts<'_>, out: &mut String) {
    let download = self.mark_downloads && is_download_url(link.url);

    out.push_str("<a href=\"");
    push_escaped(out, link.url);
    out.push('"');
    if let Some(title) = link.title {
      out.push_str(" title=\"");
      push_escaped(out, title);
      out.push('"');
    }
    if download {
      out.push_str(" download");
    }
    out.push('>');
    self.format_into(link.label, out);
    if download && !link.label.contains(DOWNLOAD_MARK) {
      out.push(' ');
      out.push_str(DOWNLOAD_MARK);
    }
    out.push_str("</a>");
  }

  fn push_image(&self, link: &LinkParts<'_>, out: &mut String) {
    out.push_str("<img src=\"");
    push_escaped(out, &self.image_src(link.url));
    out.push_str("\" alt=\"");
    push_escaped(out, link.label);
    out.push('"');
    if let Some(title) = link.title {
      out.push_str(" title=\"");
      push_escaped(out, title);
      out.push('"');
    }
    out.push_str(" loading=\"lazy\">");
  }

  /// Render a standalone `<img>` tag.
  pub(crate) fn image_tag(&self, alt: &str, src: &str) -> String {
    let mut out = String::new();
    self.push_image(
      &LinkParts {
        label: alt,
        url:   src,
        title: None,
        end:   0,
      },
      &mut out,
    );
    out
  }

  fn image_src(&self, src: &str) -> String {
    match &self.image_base {
      Some(base) if is_local_path(src) => {
        let file = src.strip_prefix("images/").unwrap_or(src);
        format!("{}/{file}", base.trim_end_matches('/'))
      },
      _ => src.to_string(),
    }
  }
}

/// Parse `[label](url "title")` starting at the `[` at `open`.
fn parse_link(text: &str, open: usize) -> Option<LinkParts<'_>> {
  let bytes = text.as_bytes();
  let close = matching_bracket(bytes, open, b'[', b']')?;
  if bytes.get(close + 1) != Some(&b'(') {
    return None;
  }
  let paren_close = matching_bracket(bytes, close + 1, b'(', b')')?;
  let target = text[close + 2..paren_close].trim();
  if target.is_empty() {
    return None;
  }

  let (url, title) = match target.split_once(char::is_whitespace) {
    Some((url, rest)) => {
      let rest = rest.trim();
      let title = rest
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .or_else(|| rest.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')));
      match title {
        Some(title) => (url, Some(title)),
        None => (target, None),
      }
    },
    None => (target, None),
  };

  Some(LinkParts {
    label: &text[open + 1..close],
    url,
    title,
    end: paren_close + 1,
  })
}

/// Find the bracket closing the one at `open`, honouring nesting, escapes and
/// code spans.
fn matching_bracket(bytes: &[u8], open: usize, left: u8, right: u8) -> Option<usize> {
  let mut depth = 0usize;
  let mut j = open;
  while j < bytes.len() {
    let b = bytes[j];
    if b == b'\\' {
      j += 2;
      continue;
    }
    if b == b'`' {
      if let Some(end) = code_span_end_bytes(bytes, j) {
        j = end + 1;
        continue;
      }
    }
    if b == left {
      depth += 1;
    } else if b == right {
      depth -= 1;
      if depth == 0 {
        return Some(j);
      }
    }
    j += 1;
  }
  None
}

/// Find a closing delimiter run of exactly `len` markers at or after `from`.
///
/// Emphasis content must be non-empty and must not start or end with
/// whitespace.
fn find_closing(text: &str, from: usize, marker: u8, len: usize) -> Option<usize> {
  if text[from..].chars().next().is_none_or(char::is_whitespace) {
    return None;
  }

  let bytes = text.as_bytes();
  let mut j = from;
  while j < bytes.len() {
    let b = bytes[j];
    if b == b'\\' {
      j += 2;
      continue;
    }
    if b == b'`' {
      if let Some(end) = code_span_end_bytes(bytes, j) {
        j = end + 1;
        continue;
      }
    }
    if b != marker {
      j += 1;
      continue;
    }

    let run = run_length(bytes, j);
    let ends_cleanly = text[..j]
      .chars()
      .next_back()
      .is_some_and(|c| !c.is_whitespace());
    let word_follows = marker == b'_'
      && text[j + run..]
        .chars()
        .next()
        .is_some_and(char::is_alphanumeric);

    if run == len && j > from && ends_cleanly && !word_follows {
      return Some(j);
    }
    j += run;
  }
  None
}

fn run_length(bytes: &[u8], start: usize) -> usize {
  bytes[start..]
    .iter()
    .take_while(|&&b| b == bytes[start])
    .count()
}

fn code_span_end(text: &str, open: usize) -> Option<usize> {
  code_span_end_bytes(text.as_bytes(), open)
}

/// Index of the backtick closing a non-empty code span opened at `open`.
fn code_span_end_bytes(bytes: &[u8], open: usize) -> Option<usize> {
  let offset = bytes.get(open + 1..)?.iter().position(|&b| b == b'`')?;
  (offset > 0).then_some(open + 1 + offset)
}

const fn emphasis_tags(marker: u8, len: usize) -> (&'static str, &'static str) {
  match (marker, len) {
    (b'~', _) => ("<del>", "</del>"),
    (_, 3) => ("<strong><em>", "</em></strong>"),
    (_, 2) => ("<strong>", "</strong>"),
    _ => ("<em>", "</em>"),
  }
}

fn push_escaped_char(out: &mut String, byte: u8) {
  match byte {
    b'<' => out.push_str("&lt;"),
    b'>' => out.push_str("&gt;"),
    b if MARKUP.contains(&b) => {
      let _ = write!(out, "&#{b};");
    },
    _ => out.push(char::from(byte)),
  }
}

/// Escape code span content so no markup inside it survives a second pass.
fn push_code(out: &mut String, content: &str) {
  for c in html_escape::encode_text(content).chars() {
    if u8::try_from(c).is_ok_and(|b| MARKUP.contains(&b)) {
      let _ = write!(out, "&#{};", u32::from(c));
    } else {
      out.push(c);
    }
  }
}

/// Escape text for an attribute value, leaving existing character references
/// alone.
fn push_escaped(out: &mut String, value: &str) {
  let mut rest = value;
  while let Some(c) = rest.chars().next() {
    match c {
      '&' => {
        if let Some(m) = ENTITY_RE.find(rest) {
          out.push_str(m.as_str());
          rest = &rest[m.end()..];
          continue;
        }
        out.push_str("&amp;");
      },
      '"' => out.push_str("&quot;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      _ => out.push(c),
    }
    rest = &rest[c.len_utf8()..];
  }
}

fn is_local_path(src: &str) -> bool {
  !["http://", "https://", "//", "/", "../", "data:"]
    .iter()
    .any(|prefix| src.starts_with(prefix))
}

fn is_download_url(url: &str) -> bool {
  let lower = url.to_ascii_lowercase();
  DOWNLOAD_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
