//! Block-level values produced by the parser.
//!
//! Blocks are transient: the parser builds one, renders it and drops it.

/// Column alignment declared by a table separator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
  Left,
  Center,
  Right,
  #[default]
  None,
}

impl Alignment {
  /// Alignment for a separator cell such as `:--`, `:-:` or `--:`.
  #[must_use]
  pub fn from_separator(cell: &str) -> Self {
    match (cell.starts_with(':'), cell.ends_with(':')) {
      (true, true) => Self::Center,
      (true, false) => Self::Left,
      (false, true) => Self::Right,
      (false, false) => Self::None,
    }
  }

  /// Value for a `text-align` declaration, if any.
  #[must_use]
  pub const fn css(self) -> Option<&'static str> {
    match self {
      Self::Left => Some("left"),
      Self::Center => Some("center"),
      Self::Right => Some("right"),
      Self::None => None,
    }
  }
}

/// A list item. `checked` is only set for task-list items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListItem {
  pub text:     String,
  pub checked:  Option<bool>,
  pub children: Vec<List>,
}

impl ListItem {
  #[must_use]
  pub fn new(text: &str, checked: Option<bool>) -> Self {
    Self {
      text: text.to_string(),
      checked,
      children: Vec::new(),
    }
  }
}

/// An ordered or unordered list with its (possibly nested) items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct List {
  pub ordered: bool,
  /// First number of an ordered list when it does not start at 1.
  pub start:   Option<u64>,
  pub items:   Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
  Heading {
    level: u8,
    text:  String,
    id:    String,
  },
  Paragraph(String),
  CodeFence {
    language: Option<String>,
    lines:    Vec<String>,
  },
  List(List),
  Table {
    header:    Vec<String>,
    alignment: Vec<Alignment>,
    rows:      Vec<Vec<String>>,
  },
  Blockquote(Vec<String>),
  HorizontalRule,
  Image {
    src:     String,
    alt:     String,
    caption: Option<String>,
  },
  RawHtml(Vec<String>),
}
