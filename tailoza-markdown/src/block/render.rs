//! HTML rendering for completed blocks.
use std::fmt::Write;

use super::types::{Alignment, Block, List};
use crate::inline::InlineFormatter;

/// Render a block to HTML.
///
/// The parser renders blockquote content recursively and only uses
/// [`blockquote`] to wrap it. A `Block::Blockquote` reaches this function once
/// the nesting limit is hit, and its lines become a single literal paragraph.
pub fn render_block(block: &Block, inline: &InlineFormatter) -> String {
  let mut html = String::new();
  match block {
    Block::Heading { level, text, id } => {
      let _ = write!(
        html,
        "<h{level} id=\"{}\">{}</h{level}>",
        html_escape::encode_double_quoted_attribute(id),
        inline.format(text)
      );
    },
    Block::Paragraph(text) => {
      let _ = write!(html, "<p>{}</p>", inline.format(text));
    },
    Block::CodeFence { language, lines } => {
      html.push_str("<pre><code");
      if let Some(language) = language {
        let _ = write!(
          html,
          " class=\"language-{}\"",
          html_escape::encode_double_quoted_attribute(language)
        );
      }
      html.push('>');
      html.push_str(&html_escape::encode_text(&lines.join("\n")));
      html.push_str("</code></pre>");
    },
    Block::List(list) => render_list(list, inline, &mut html),
    Block::Table {
      header,
      alignment,
      rows,
    } => render_table(header, alignment, rows, inline, &mut html),
    Block::Blockquote(lines) => {
      let inner = format!("<p>{}</p>", inline.format(&lines.join(" ")));
      html = blockquote(&inner);
    },
    Block::HorizontalRule => html.push_str("<hr>"),
    Block::Image { src, alt, caption } => {
      let img = inline.image_tag(alt, src);
      match caption {
        Some(caption) => {
          let _ = write!(
            html,
            "<figure>\n{img}\n<figcaption>{}</figcaption>\n</figure>",
            inline.format(caption)
          );
        },
        None => {
          let _ = write!(html, "<p>{img}</p>");
        },
      }
    },
    Block::RawHtml(lines) => html.push_str(&lines.join("\n")),
  }
  html
}

/// Wrap already-rendered blockquote content.
#[must_use]
pub fn blockquote(inner: &str) -> String {
  if inner.is_empty() {
    return "<blockquote>\n</blockquote>".to_string();
  }
  format!("<blockquote>\n{inner}\n</blockquote>")
}

fn render_list(list: &List, inline: &InlineFormatter, html: &mut String) {
  let tag = if list.ordered { "ol" } else { "ul" };
  match list.start {
    Some(start) if list.ordered => {
      let _ = writeln!(html, "<ol start=\"{start}\">");
    },
    _ => {
      let _ = writeln!(html, "<{tag}>");
    },
  }

  for item in &list.items {
    match item.checked {
      Some(true) => {
        html.push_str(
          "<li class=\"task-list-item\"><input type=\"checkbox\" checked \
           disabled> ",
        );
      },
      Some(false) => {
        html.push_str(
          "<li class=\"task-list-item\"><input type=\"checkbox\" disabled> ",
        );
      },
      None => html.push_str("<li>"),
    }
    html.push_str(&inline.format(&item.text));
    for child in &item.children {
      html.push('\n');
      render_list(child, inline, html);
    }
    if !item.children.is_empty() {
      html.push('\n');
    }
    html.push_str("</li>\n");
  }

  let _ = write!(html, "</{tag}>");
}

fn render_table(
  header: &[String],
  alignment: &[Alignment],
  rows: &[Vec<String>],
  inline: &InlineFormatter,
  html: &mut String,
) {
  html.push_str("<table>\n<thead>\n");
  render_row(header, alignment, "th", inline, html);
  html.push_str("</thead>\n");
  if !rows.is_empty() {
    html.push_str("<tbody>\n");
    for row in rows {
      render_row(row, alignment, "td", inline, html);
    }
    html.push_str("</tbody>\n");
  }
  html.push_str("</table>");
}

fn render_row(
  cells: &[String],
  alignment: &[Alignment],
  tag: &str,
  inline: &InlineFormatter,
  html: &mut String,
) {
  html.push_str("<tr>\n");
  for (i, cell) in cells.iter().enumerate() {
    let align = alignment.get(i).copied().unwrap_or_default();
    match align.css() {
      Some(css) => {
        let _ = write!(html, "<{tag} style=\"text-align: {css}\">");
      },
      None => {
        let _ = write!(html, "<{tag}>");
      },
    }
    let _ = writeln!(html, "{}</{tag}>", inline.format(cell));
  }
  html.push_str("</tr>\n");
}
