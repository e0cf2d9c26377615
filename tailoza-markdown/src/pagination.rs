//! Pagination links for listing pages.
//!
//! [`build_pagination`] decides which links a listing page shows;
//! [`render_pagination`] turns them into markup.
use std::{collections::BTreeSet, fmt::Write};

use serde::{Deserialize, Serialize};

use crate::error::PaginationError;

const PREVIOUS_LABEL: &str = "← Previous";
const NEXT_LABEL: &str = "Next →";
const ELLIPSIS: &str = "…";

/// Which listing page is being built, and how many items there are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationRequest {
  pub total_items:  usize,
  pub page_size:    usize,
  /// One-based.
  pub current_page: usize,
}

impl PaginationRequest {
  #[must_use]
  pub const fn new(total_items: usize, page_size: usize, current_page: usize) -> Self {
    Self {
      total_items,
      page_size,
      current_page,
    }
  }

  /// Number of pages, never less than one.
  ///
  /// # Errors
  ///
  /// Returns [`PaginationError::InvalidRequest`] if `page_size` is zero.
  pub fn total_pages(&self) -> Result<usize, PaginationError> {
    if self.page_size == 0 {
      return Err(PaginationError::InvalidRequest {
        reason: "page size must be at least 1",
      });
    }
    Ok(self.total_items.div_ceil(self.page_size).max(1))
  }
}

/// Target of a previous/next link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavTarget {
  Page(usize),
  /// Rendered without a link at the first or last page.
  Disabled,
}

/// One entry of a pagination bar, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaginationLink {
  Previous { target: NavTarget },
  Page { number: usize, current: bool },
  Ellipsis,
  Next { target: NavTarget },
}

/// Build the link set for one listing page.
///
/// The result is empty when everything fits on a single page. Otherwise it
/// starts with a previous link and ends with a next link (disabled at the
/// edges), and lists page 1, the last page and the pages around the current
/// one. A gap of one page is filled in; longer gaps become one ellipsis.
///
/// `current_page` is not clamped. Past the last page, no entry is marked
/// current and the previous link still targets `current_page - 1`.
///
/// # Errors
///
/// Returns [`PaginationError::InvalidRequest`] if `page_size` or
/// `current_page` is zero.
pub fn build_pagination(
  request: &PaginationRequest,
) -> Result<Vec<PaginationLink>, PaginationError> {
  let total = request.total_pages()?;
  if request.current_page == 0 {
    return Err(PaginationError::InvalidRequest {
      reason: "current page must be at least 1",
    });
  }
  if total <= 1 {
    return Ok(Vec::new());
  }

  let current = request.current_page;
  if current > total {
    log::debug!("Current page {current} is past the last page {total}");
  }

  let pages: BTreeSet<usize> =
    [1, total, current.saturating_sub(1), current, current + 1]
      .into_iter()
      .filter(|page| (1..=total).contains(page))
      .collect();

  let mut links = Vec::with_capacity(pages.len() + 4);
  links.push(PaginationLink::Previous {
    target: if current > 1 {
      NavTarget::Page(current - 1)
    } else {
      NavTarget::Disabled
    },
  });

  let mut previous: Option<usize> = None;
  for page in pages {
    if let Some(prev) = previous {
      match page - prev {
        1 => {},
        2 => links.push(PaginationLink::Page {
          number:  prev + 1,
          current: prev + 1 == current,
        }),
        _ => links.push(PaginationLink::Ellipsis),
      }
    }
    links.push(PaginationLink::Page {
      number:  page,
      current: page == current,
    });
    previous = Some(page);
  }

  links.push(PaginationLink::Next {
    target: if current < total {
      NavTarget::Page(current + 1)
    } else {
      NavTarget::Disabled
    },
  });
  Ok(links)
}

/// Render a link set as a `<nav class="pagination">` element.
///
/// `url_for` maps a page number to its href. An empty link set renders as
/// an empty string, not an empty wrapper.
#[must_use]
pub fn render_pagination<F>(links: &[PaginationLink], url_for: F) -> String
where
  F: Fn(usize) -> String,
{
  if links.is_empty() {
    return String::new();
  }

  let mut html = String::from("<nav class=\"pagination\">\n");
  let mut in_numbers = false;
  for link in links {
    match link {
      PaginationLink::Previous { target } | PaginationLink::Next { target } => {
        if in_numbers {
          html.push_str("</div>\n");
          in_numbers = false;
        }
        let (label, class) = if matches!(link, PaginationLink::Previous { .. }) {
          (PREVIOUS_LABEL, "pagination-prev")
        } else {
          (NEXT_LABEL, "pagination-next")
        };
        match target {
          NavTarget::Page(page) => {
            let _ = writeln!(
              html,
              "<a href=\"{}\" class=\"{class}\">{label}</a>",
              html_escape::encode_double_quoted_attribute(&url_for(*page))
            );
          },
          NavTarget::Disabled => {
            let _ = writeln!(html, "<span class=\"{class} disabled\">{label}</span>");
          },
        }
      },
      PaginationLink::Page { number, current } => {
        open_numbers(&mut html, &mut in_numbers);
        if *current {
          let _ = writeln!(html, "<span class=\"pagination-current\">{number}</span>");
        } else {
          let _ = writeln!(
            html,
            "<a href=\"{}\">{number}</a>",
            html_escape::encode_double_quoted_attribute(&url_for(*number))
          );
        }
      },
      PaginationLink::Ellipsis => {
        open_numbers(&mut html, &mut in_numbers);
        let _ = writeln!(html, "<span class=\"pagination-ellipsis\">{ELLIPSIS}</span>");
      },
    }
  }
  if in_numbers {
    html.push_str("</div>\n");
  }
  html.push_str("</nav>");
  html
}

fn open_numbers(html: &mut String, in_numbers: &mut bool) {
  if !*in_numbers {
    html.push_str("<div class=\"pagination-numbers\">\n");
    *in_numbers = true;
  }
}
