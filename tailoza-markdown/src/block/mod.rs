//! Line-oriented block parser.
//!
//! The parser is an explicit state machine: [`ParserState`] holds the block
//! currently being accumulated, and [`BlockParser::feed`] applies one
//! transition per input line. Completed blocks are rendered immediately; only
//! the heading list survives the parse.
//!
//! # Examples
//!
//! ```
//! use tailoza_markdown::{block::BlockParser, inline::InlineFormatter};
//!
//! let inline = InlineFormatter::new();
//! let parsed = BlockParser::new(&inline).parse("# Title\n\n- a\n- b");
//! assert!(parsed.html.starts_with("<h1 id=\"title\">Title</h1>"));
//! assert_eq!(parsed.headings.len(), 1);
//! ```
pub mod line;
mod render;
pub mod types;

use std::{iter::Peekable, mem, vec::IntoIter};

use line::{LineKind, ListMarker};
pub use types::{Alignment, Block, List, ListItem};

use crate::{inline::InlineFormatter, toc::AnchorRegistry, types::Heading};

/// Blockquotes nested deeper than this keep their remaining `>` markers as
/// text.
const MAX_QUOTE_DEPTH: usize = 32;

/// Output of a single parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBody {
  pub html:     String,
  pub headings: Vec<Heading>,
}

/// Table detection progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableState {
  /// A `|` line was seen; the next line decides whether it is a table.
  AwaitingSeparator { header: String },
  Rows {
    header:    Vec<String>,
    alignment: Vec<Alignment>,
    rows:      Vec<Vec<String>>,
  },
}

/// The block currently being accumulated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParserState {
  #[default]
  Idle,
  Paragraph(Vec<String>),
  CodeFence {
    fence_len: usize,
    language:  Option<String>,
    lines:     Vec<String>,
  },
  List(ListAccumulator),
  Blockquote(Vec<String>),
  Table(TableState),
  RawHtml(Vec<String>),
  /// A standalone image line; the next line may be its caption.
  ImageCaption {
    alt: String,
    src: String,
  },
}

/// Flat list entries gathered line by line, nested when the list closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListAccumulator {
  base_indent:   usize,
  unit:          Option<usize>,
  entries:       Vec<ListEntry>,
  pending_blank: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ListEntry {
  depth:   usize,
  ordered: bool,
  number:  Option<u64>,
  item:    ListItem,
}

impl ListAccumulator {
  fn new(marker: &ListMarker<'_>) -> Self {
    let mut list = Self {
      base_indent:   marker.indent,
      unit:          None,
      entries:       Vec::new(),
      pending_blank: false,
    };
    list.push(marker);
    list
  }

  /// Add an item. Depth is the indentation relative to the first item,
  /// divided by the first non-zero relative indentation seen in this list.
  fn push(&mut self, marker: &ListMarker<'_>) {
    self.pending_blank = false;
    let relative = marker.indent.saturating_sub(self.base_indent);
    let depth = if relative == 0 {
      0
    } else {
      relative / *self.unit.get_or_insert(relative)
    };
    self.entries.push(ListEntry {
      depth,
      ordered: marker.ordered,
      number: marker.number,
      item: ListItem::new(marker.text, marker.checked),
    });
  }

  fn continue_last(&mut self, text: &str) {
    if let Some(entry) = self.entries.last_mut() {
      if !entry.item.text.is_empty() {
        entry.item.text.push(' ');
      }
      entry.item.text.push_str(text);
    }
  }

  /// Nest the flat entries. A change between ordered and unordered at the top
  /// level yields separate lists.
  fn build(self) -> Vec<List> {
    let mut entries = self.entries.into_iter().peekable();
    let mut lists = Vec::new();
    while let Some(first) = entries.peek() {
      let depth = first.depth;
      lists.push(build_list(&mut entries, depth));
    }
    lists
  }
}

fn build_list(entries: &mut Peekable<IntoIter<ListEntry>>, depth: usize) -> List {
  let (ordered, start) = entries.peek().map_or((false, None), |first| {
    (first.ordered, first.number.filter(|n| first.ordered && *n != 1))
  });
  let mut items: Vec<ListItem> = Vec::new();

  while let Some(next) = entries.peek() {
    let (next_depth, next_ordered) = (next.depth, next.ordered);
    if next_depth < depth {
      break;
    }
    if next_depth > depth {
      if let Some(last) = items.last_mut() {
        last.children.push(build_list(entries, next_depth));
        continue;
      }
    } else if next_ordered != ordered && !items.is_empty() {
      break;
    }
    if let Some(entry) = entries.next() {
      items.push(entry.item);
    }
  }

  List {
    ordered,
    start,
    items,
  }
}

/// Parses a document body into HTML, collecting headings on the way.
///
/// One parser handles one document; its heading list and anchor registry are
/// never shared.
#[derive(Debug)]
pub struct BlockParser<'a> {
  inline:   &'a InlineFormatter,
  anchors:  AnchorRegistry,
  headings: Vec<Heading>,
  html:     Vec<String>,
  state:    ParserState,
  /// Blockquote nesting level of the content being fed.
  depth:    usize,
}

impl<'a> BlockParser<'a> {
  #[must_use]
  pub fn new(inline: &'a InlineFormatter) -> Self {
    Self {
      inline,
      anchors: AnchorRegistry::new(),
      headings: Vec::new(),
      html: Vec::new(),
      state: ParserState::Idle,
      depth: 0,
    }
  }

  /// Parse a whole body.
  #[must_use]
  pub fn parse(mut self, body: &str) -> ParsedBody {
    for line in body.lines() {
      self.feed(line);
    }
    self.finish();
    ParsedBody {
      html:     self.html.join("\n"),
      headings: self.headings,
    }
  }

  /// Current accumulator state.
  #[must_use]
  pub const fn state(&self) -> &ParserState {
    &self.state
  }

  /// Apply the transition for one line.
  pub fn feed(&mut self, line: &str) {
    let state = mem::take(&mut self.state);
    self.state = self.transition(state, line);
  }

  /// Close whatever block is still open at end of input.
  pub fn finish(&mut self) {
    let state = mem::take(&mut self.state);
    if let ParserState::CodeFence { language, .. } = &state {
      log::debug!(
        "Closing unterminated code fence (language: {}) at end of input",
        language.as_deref().unwrap_or("none")
      );
    }
    self.close(state);
  }

  fn transition(&mut self, state: ParserState, line: &str) -> ParserState {
    match state {
      ParserState::CodeFence {
        fence_len,
        language,
        mut lines,
      } => {
        if line::is_closing_fence(line, fence_len) {
          self.emit(Block::CodeFence { language, lines });
          ParserState::Idle
        } else {
          lines.push(line.to_string());
          ParserState::CodeFence {
            fence_len,
            language,
            lines,
          }
        }
      },
      ParserState::RawHtml(mut lines) => {
        if line.trim().is_empty() {
          self.emit(Block::RawHtml(lines));
          ParserState::Idle
        } else {
          lines.push(line.to_string());
          ParserState::RawHtml(lines)
        }
      },
      ParserState::Table(TableState::AwaitingSeparator { header }) => {
        match line::table_separator(line) {
          Some(mut alignment) => {
            let header = line::split_cells(&header);
            alignment.resize(header.len(), Alignment::None);
            ParserState::Table(TableState::Rows {
              header,
              alignment,
              rows: Vec::new(),
            })
          },
          None => {
            log::debug!(
              "Table header not followed by a separator row, rendering as a \
               paragraph"
            );
            self.emit(Block::Paragraph(header.trim().to_string()));
            self.transition(ParserState::Idle, line)
          },
        }
      },
      ParserState::ImageCaption { alt, src } => {
        match line::caption(line) {
          Some(caption) => {
            self.emit(Block::Image {
              src,
              alt,
              caption: Some(caption.to_string()),
            });
            ParserState::Idle
          },
          None => {
            self.emit(Block::Image {
              src,
              alt,
              caption: None,
            });
            self.transition(ParserState::Idle, line)
          },
        }
      },
      state => self.transition_open(state, line),
    }
  }

  /// Transitions for states that any block-starting line can interrupt.
  fn transition_open(&mut self, state: ParserState, line: &str) -> ParserState {
    match line::classify(line) {
      LineKind::Fence { len, language } => {
        self.close(state);
        ParserState::CodeFence {
          fence_len: len,
          language:  language.map(ToString::to_string),
          lines:     Vec::new(),
        }
      },
      LineKind::Heading { level, text, id } => {
        self.close(state);
        self.emit_heading(level, text, id);
        ParserState::Idle
      },
      LineKind::Blank => {
        match state {
          ParserState::List(mut list) => {
            list.pending_blank = true;
            ParserState::List(list)
          },
          other => {
            self.close(other);
            ParserState::Idle
          },
        }
      },
      LineKind::Quote(rest) => {
        match state {
          ParserState::Blockquote(mut lines) => {
            lines.push(rest.to_string());
            ParserState::Blockquote(lines)
          },
          other => {
            self.close(other);
            ParserState::Blockquote(vec![rest.to_string()])
          },
        }
      },
      LineKind::ListItem(marker) => {
        match state {
          ParserState::List(mut list) => {
            list.push(&marker);
            ParserState::List(list)
          },
          other => {
            self.close(other);
            ParserState::List(ListAccumulator::new(&marker))
          },
        }
      },
      LineKind::Rule => {
        self.close(state);
        self.emit(Block::HorizontalRule);
        ParserState::Idle
      },
      LineKind::TableRow => {
        match state {
          ParserState::Table(TableState::Rows {
            header,
            alignment,
            mut rows,
          }) => {
            let mut cells = line::split_cells(line);
            cells.resize(header.len(), String::new());
            rows.push(cells);
            ParserState::Table(TableState::Rows {
              header,
              alignment,
              rows,
            })
          },
          other => {
            self.close(other);
            ParserState::Table(TableState::AwaitingSeparator {
              header: line.to_string(),
            })
          },
        }
      },
      LineKind::Text => {
        match state {
          ParserState::Paragraph(mut lines) => {
            lines.push(line.trim().to_string());
            ParserState::Paragraph(lines)
          },
          ParserState::List(mut list)
            if !list.pending_blank && line::indent_width(line) > 0 =>
          {
            list.continue_last(line.trim());
            ParserState::List(list)
          },
          other => {
            self.close(other);
            Self::open_text(line)
          },
        }
      },
    }
  }

  /// State for a text line that starts a new block.
  fn open_text(line: &str) -> ParserState {
    if let Some((alt, src)) = line::standalone_image(line) {
      return ParserState::ImageCaption {
        alt: alt.to_string(),
        src: src.to_string(),
      };
    }
    if line::is_html_block_start(line) {
      return ParserState::RawHtml(vec![line.to_string()]);
    }
    ParserState::Paragraph(vec![line.trim().to_string()])
  }

  /// Emit the block held by `state`, if any.
  fn close(&mut self, state: ParserState) {
    match state {
      ParserState::Idle => {},
      ParserState::Paragraph(lines) => {
        self.emit(Block::Paragraph(lines.join(" ")));
      },
      ParserState::CodeFence {
        language, lines, ..
      } => self.emit(Block::CodeFence { language, lines }),
      ParserState::List(list) => {
        for list in list.build() {
          self.emit(Block::List(list));
        }
      },
      ParserState::Blockquote(lines) => self.emit(Block::Blockquote(lines)),
      ParserState::Table(TableState::AwaitingSeparator { header }) => {
        self.emit(Block::Paragraph(header.trim().to_string()));
      },
      ParserState::Table(TableState::Rows {
        header,
        alignment,
        rows,
      }) => {
        self.emit(Block::Table {
          header,
          alignment,
          rows,
        });
      },
      ParserState::RawHtml(lines) => self.emit(Block::RawHtml(lines)),
      ParserState::ImageCaption { alt, src } => {
        self.emit(Block::Image {
          src,
          alt,
          caption: None,
        });
      },
    }
  }

  /// Record a heading, then emit its block. The record is pushed first so
  /// the heading list stays in document order even for nested content.
  fn emit_heading(&mut self, level: u8, text: &str, explicit_id: Option<&str>) {
    let plain = self.inline.plain_text(text);
    let id = match explicit_id {
      Some(id) => self.anchors.claim(id),
      None => self.anchors.issue(&plain),
    };
    self.headings.push(Heading {
      text: plain,
      level,
      id: id.clone(),
    });
    self.emit(Block::Heading {
      level,
      text: text.to_string(),
      id,
    });
  }

  fn emit(&mut self, block: Block) {
    let html = match block {
      Block::Blockquote(lines) if self.depth < MAX_QUOTE_DEPTH => {
        render::blockquote(&self.parse_nested(&lines))
      },
      other => render::render_block(&other, self.inline),
    };
    self.html.push(html);
  }

  /// Parse blockquote content with this parser's headings and anchors, so
  /// ids stay unique across the whole document.
  fn parse_nested(&mut self, lines: &[String]) -> String {
    let outer_state = mem::take(&mut self.state);
    let outer_html = mem::take(&mut self.html);
    self.depth += 1;

    for line in lines {
      self.feed(line);
    }
    self.finish();

    self.depth -= 1;
    let inner = mem::replace(&mut self.html, outer_html);
    self.state = outer_state;
    inner.join("\n")
  }
}

/// Parse a body with a fresh parser.
#[must_use]
pub fn parse(inline: &InlineFormatter, body: &str) -> ParsedBody {
  BlockParser::new(inline).parse(body)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn html(body: &str) -> String {
    parse(&InlineFormatter::new(), body).html
  }

  #[test]
  fn test_heading_and_paragraph() {
    assert_eq!(
      html("# Title\n\nSome **bold** text."),
      "<h1 id=\"title\">Title</h1>\n<p>Some <strong>bold</strong> text.</p>"
    );
  }

  #[test]
  fn test_paragraph_lines_join_with_space() {
    assert_eq!(html("one\ntwo\n\nthree"), "<p>one two</p>\n<p>three</p>");
  }

  #[test]
  fn test_simple_list() {
    assert_eq!(
      html("- a\n- b\n- c"),
      "<ul>\n<li>a</li>\n<li>b</li>\n<li>c</li>\n</ul>"
    );
  }

  #[test]
  fn test_nested_list_uses_first_indent_unit() {
    let out = html("- a\n    - b\n        - c\n    - d\n- e");
    assert_eq!(
      out,
      "<ul>\n<li>a\n<ul>\n<li>b\n<ul>\n<li>c</li>\n</ul>\n</li>\n<li>d</li>\n</ul>\n</li>\n<li>e</li>\n</ul>"
    );
  }

  #[test]
  fn test_ordered_list_start_and_type_switch() {
    let out = html("3. three\n4. four\n- bullet");
    assert_eq!(
      out,
      "<ol start=\"3\">\n<li>three</li>\n<li>four</li>\n</ol>\n<ul>\n<li>bullet</li>\n</ul>"
    );
  }

  #[test]
  fn test_task_list() {
    let out = html("- [ ] todo\n- [x] done");
    assert!(out.contains(
      "<li class=\"task-list-item\"><input type=\"checkbox\" disabled> todo</li>"
    ));
    assert!(out.contains(
      "<li class=\"task-list-item\"><input type=\"checkbox\" checked disabled> \
       done</li>"
    ));
  }

  #[test]
  fn test_blank_line_inside_list_keeps_it_open() {
    assert_eq!(
      html("- a\n\n- b\n\nafter"),
      "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n<p>after</p>"
    );
  }

  #[test]
  fn test_list_item_continuation() {
    assert_eq!(
      html("- first\n  continued\nnot part"),
      "<ul>\n<li>first continued</li>\n</ul>\n<p>not part</p>"
    );
  }

  #[test]
  fn test_code_fence_is_verbatim() {
    assert_eq!(
      html("```rust\nlet x = **1** < 2;\n\n# not a heading\n```"),
      "<pre><code class=\"language-rust\">let x = **1** &lt; 2;\n\n# not a \
       heading</code></pre>"
    );
  }

  #[test]
  fn test_unterminated_fence_runs_to_end() {
    let parsed = parse(&InlineFormatter::new(), "```python\nprint(1)\n# still code");
    assert_eq!(
      parsed.html,
      "<pre><code class=\"language-python\">print(1)\n# still code</code></pre>"
    );
    assert!(parsed.headings.is_empty());
  }

  #[test]
  fn test_longer_fence_needs_longer_close() {
    assert_eq!(
      html("````\n```\ninner\n```\n````"),
      "<pre><code>```\ninner\n```</code></pre>"
    );
  }

  #[test]
  fn test_blockquote_with_nested_blocks() {
    assert_eq!(
      html("> quoted\n> - a\n> - b\n\nafter"),
      "<blockquote>\n<p>quoted</p>\n<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n</blockquote>\n<p>after</p>"
    );
    assert_eq!(
      html("> outer\n>> inner"),
      "<blockquote>\n<p>outer</p>\n<blockquote>\n<p>inner</p>\n</blockquote>\n</blockquote>"
    );
  }

  #[test]
  fn test_deep_blockquote_nesting_is_capped() {
    let out = html(&format!("{} x", ">".repeat(5000)));
    assert_eq!(out.matches("<blockquote>").count(), MAX_QUOTE_DEPTH + 1);
    assert_eq!(out.matches("</blockquote>").count(), MAX_QUOTE_DEPTH + 1);
    assert!(out.contains(&format!("<p>{} x</p>", "&gt;".repeat(5000 - MAX_QUOTE_DEPTH - 1))));
  }

  #[test]
  fn test_horizontal_rule_closes_paragraph() {
    assert_eq!(html("text\n***\nmore"), "<p>text</p>\n<hr>\n<p>more</p>");
  }

  #[test]
  fn test_table_with_alignment() {
    let out = html("| a | b |\n|:--|--:|\n| 1 | **2** |\n| 3 |");
    assert_eq!(
      out,
      "<table>\n<thead>\n<tr>\n<th style=\"text-align: left\">a</th>\n<th \
       style=\"text-align: right\">b</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td \
       style=\"text-align: left\">1</td>\n<td style=\"text-align: \
       right\"><strong>2</strong></td>\n</tr>\n<tr>\n<td style=\"text-align: \
       left\">3</td>\n<td style=\"text-align: \
       right\"></td>\n</tr>\n</tbody>\n</table>"
    );
  }

  #[test]
  fn test_failed_table_lookahead() {
    assert_eq!(
      html("| not a table\n- item"),
      "<p>| not a table</p>\n<ul>\n<li>item</li>\n</ul>"
    );
    assert_eq!(
      html("| header\n\ntext"),
      "<p>| header</p>\n<p>text</p>"
    );
  }

  #[test]
  fn test_dash_divider_after_pipe_line_is_a_table() {
    assert!(html("| a |\n---").starts_with("<table>"));
  }

  #[test]
  fn test_image_with_caption() {
    assert_eq!(
      html("![Cat](cat.png)\n*A sleepy cat*\n\nnext"),
      "<figure>\n<img src=\"cat.png\" alt=\"Cat\" \
       loading=\"lazy\">\n<figcaption>A sleepy cat</figcaption>\n</figure>\n<p>next</p>"
    );
    assert_eq!(
      html("![Cat](cat.png)\nplain"),
      "<p><img src=\"cat.png\" alt=\"Cat\" loading=\"lazy\"></p>\n<p>plain</p>"
    );
  }

  #[test]
  fn test_raw_html_block() {
    assert_eq!(
      html("<div class=\"note\">\n*kept*\n</div>\n\ntext"),
      "<div class=\"note\">\n*kept*\n</div>\n<p>text</p>"
    );
  }

  #[test]
  fn test_headings_collected_in_order_with_unique_ids() {
    let parsed = parse(
      &InlineFormatter::new(),
      "# Intro\n## Setup\n> ## Setup\n## Setup {#custom}\n### *Fancy* `code`",
    );
    let ids: Vec<_> = parsed.headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, ["intro", "setup", "setup-2", "custom", "fancy-code"]);
    assert_eq!(parsed.headings[4].text, "Fancy code");
    assert_eq!(parsed.headings[4].level, 3);
    assert!(
      parsed
        .html
        .contains("<h3 id=\"fancy-code\"><em>Fancy</em> <code>code</code></h3>")
    );
  }

  #[test]
  fn test_state_machine_transitions() {
    let inline = InlineFormatter::new();
    let mut parser = BlockParser::new(&inline);
    parser.feed("| a | b |");
    assert!(matches!(
      parser.state(),
      ParserState::Table(TableState::AwaitingSeparator { .. })
    ));
    parser.feed("|---|---|");
    assert!(matches!(
      parser.state(),
      ParserState::Table(TableState::Rows { .. })
    ));
    parser.feed("```sh");
    assert!(matches!(
      parser.state(),
      ParserState::CodeFence { fence_len: 3, .. }
    ));
    parser.feed("```");
    assert_eq!(parser.state(), &ParserState::Idle);
  }
}
