#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
use tailoza_markdown::{
  PaginationError,
  pagination::{
    NavTarget,
    PaginationLink,
    PaginationRequest,
    build_pagination,
    render_pagination,
  },
};

fn build(total: usize, size: usize, current: usize) -> Vec<PaginationLink> {
  build_pagination(&PaginationRequest::new(total, size, current))
    .expect("valid request")
}

#[test]
fn test_scenario_195_items_page_5() {
  let request = PaginationRequest::new(195, 20, 5);
  assert_eq!(request.total_pages(), Ok(10));

  let numbers: Vec<String> = build(195, 20, 5)
    .iter()
    .map(|link| {
      match link {
        PaginationLink::Previous {
          target: NavTarget::Page(n),
        } => format!("prev({n})"),
        PaginationLink::Next {
          target: NavTarget::Page(n),
        } => format!("next({n})"),
        PaginationLink::Page {
          number,
          current: true,
        } => format!("{number}*"),
        PaginationLink::Page { number, .. } => number.to_string(),
        PaginationLink::Ellipsis => "…".to_string(),
        other => panic!("unexpected link {other:?}"),
      }
    })
    .collect();

  assert_eq!(numbers, [
    "prev(4)", "1", "…", "4", "5*", "6", "…", "10", "next(6)"
  ]);
}

#[test]
fn test_invariants_hold_for_all_small_inputs() {
  for total_items in 0..=120_usize {
    for page_size in 1..=12 {
      let total_pages = total_items.div_ceil(page_size).max(1);
      for current in 1..=total_pages {
        let links = build(total_items, page_size, current);

        if total_pages <= 1 {
          assert!(links.is_empty());
          continue;
        }

        let pages: Vec<usize> = links
          .iter()
          .filter_map(|link| {
            match link {
              PaginationLink::Page { number, .. } => Some(*number),
              _ => None,
            }
          })
          .collect();
        assert!(pages.windows(2).all(|w| w[0] < w[1]), "{pages:?}");
        assert!(pages.iter().all(|p| (1..=total_pages).contains(p)));
        assert_eq!(pages.first(), Some(&1));
        assert_eq!(pages.last(), Some(&total_pages));

        let currents: Vec<_> = links
          .iter()
          .filter(|link| {
            matches!(link, PaginationLink::Page { current: true, .. })
          })
          .collect();
        assert_eq!(currents, [&PaginationLink::Page {
          number:  current,
          current: true,
        }]);

        for pair in links.windows(2) {
          assert!(
            !matches!(pair, [PaginationLink::Ellipsis, PaginationLink::Ellipsis]),
            "adjacent ellipses in {links:?}"
          );
        }

        // Every ellipsis hides at least two pages.
        for (i, link) in links.iter().enumerate() {
          if *link == PaginationLink::Ellipsis {
            let (PaginationLink::Page { number: before, .. }, PaginationLink::Page {
              number: after,
              ..
            }) = (&links[i - 1], &links[i + 1])
            else {
              panic!("ellipsis not between pages in {links:?}");
            };
            assert!(after - before > 2);
          }
        }

        assert!(matches!(links.first(), Some(PaginationLink::Previous { .. })));
        assert!(matches!(links.last(), Some(PaginationLink::Next { .. })));
      }
    }
  }
}

#[test]
fn test_precondition_failures() {
  assert_eq!(
    build_pagination(&PaginationRequest::new(10, 0, 1)),
    Err(PaginationError::InvalidRequest {
      reason: "page size must be at least 1",
    })
  );
  assert!(matches!(
    build_pagination(&PaginationRequest::new(0, 10, 0)),
    Err(PaginationError::InvalidRequest { .. })
  ));
}

#[test]
fn test_rendered_markup_for_middle_page() {
  let html = render_pagination(&build(195, 20, 5), |n| {
    if n == 1 {
      "/".to_string()
    } else {
      format!("/page/{n}/")
    }
  });
  assert!(html.starts_with("<nav class=\"pagination\">\n<a href=\"/page/4/\" class=\"pagination-prev\">"));
  assert!(html.contains("<a href=\"/\">1</a>\n<span class=\"pagination-ellipsis\">…</span>"));
  assert!(html.contains("<span class=\"pagination-current\">5</span>"));
  assert_eq!(html.matches("pagination-ellipsis").count(), 2);
  assert!(html.ends_with("<a href=\"/page/6/\" class=\"pagination-next\">Next →</a>\n</nav>"));
}

#[test]
fn test_json_shape() {
  let json = serde_json::to_string(&build(30, 10, 1)).expect("serializable");
  assert!(json.starts_with(r#"[{"kind":"previous","target":"disabled"},{"kind":"page","number":1,"current":true}"#));
}
