use std::sync::LazyLock;

use regex::Regex;

/// Words per minute assumed by [`reading_time`] when none is configured.
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"<[^<>]+>").unwrap_or_else(|e| {
    log::error!("Failed to compile TAG_RE regex: {e}");
    never_matching_regex()
  })
});

/// Slugify a string for use as an anchor ID.
///
/// Lowercases the text, replaces every non-alphanumeric character with a dash,
/// collapses runs of dashes and trims leading/trailing dashes. May return an
/// empty string when the input has no alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  let mut pending_dash = false;

  for c in text.chars().flat_map(char::to_lowercase) {
    if c.is_alphanumeric() {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(c);
    } else {
      pending_dash = true;
    }
  }

  slug
}

/// Turn a category name into the URL segment used for its listing pages.
#[must_use]
pub fn category_slug(name: &str) -> String {
  name.trim().to_lowercase().replace(' ', "-")
}

/// Remove HTML tags from a fragment, leaving text and entities untouched.
#[must_use]
pub fn strip_tags(html: &str) -> String {
  TAG_RE.replace_all(html, "").into_owned()
}

/// Estimated reading time in whole minutes, rounded up, never below one.
#[must_use]
pub fn reading_time(text: &str, words_per_minute: usize) -> usize {
  let wpm = if words_per_minute == 0 {
    DEFAULT_WORDS_PER_MINUTE
  } else {
    words_per_minute
  };
  let words = strip_tags(text).split_whitespace().count();
  words.div_ceil(wpm).max(1)
}

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile.
///
/// # Panics
///
/// Panics if the fallback regex pattern `r"^\b$"` fails to compile, which
/// should never happen.
#[must_use]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(clippy::unwrap_used, reason = "pattern is a compile-time constant")]
    Regex::new(r"^\b$").unwrap()
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_slugify_collapses_and_trims() {
    assert_eq!(slugify("Hello, World!"), "hello-world");
    assert_eq!(slugify("  --Already--Dashed--  "), "already-dashed");
    assert_eq!(slugify("snake_case name"), "snake-case-name");
    assert_eq!(slugify("Version 2.0"), "version-2-0");
  }

  #[test]
  fn test_slugify_without_alphanumerics_is_empty() {
    assert_eq!(slugify("!!! ???"), "");
  }

  #[test]
  fn test_slugify_keeps_unicode_letters() {
    assert_eq!(slugify("Ünïcode Héading"), "ünïcode-héading");
  }

  #[test]
  fn test_category_slug() {
    assert_eq!(category_slug("Web Development"), "web-development");
  }

  #[test]
  fn test_strip_tags() {
    assert_eq!(
      strip_tags("<strong>bold</strong> &amp; <em>it</em>"),
      "bold &amp; it"
    );
  }

  #[test]
  fn test_reading_time_rounds_up() {
    let text = "word ".repeat(201);
    assert_eq!(reading_time(&text, 200), 2);
    assert_eq!(reading_time("", 200), 1);
    assert_eq!(reading_time("a b c", 0), 1);
  }
}
