#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
use std::{fs, path::Path};

use tailoza::{
  config::Config,
  error::TailozaError,
  posts::collect_posts,
  site::build_site,
};
use tailoza_markdown::{MarkdownOptions, ValidationError};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
  let path = dir.join(name);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).expect("create parent");
  }
  fs::write(path, content).expect("write post");
}

fn config(input: &Path, output: &Path, page_size: usize) -> Config {
  Config {
    input_dir: input.to_path_buf(),
    output_dir: output.to_path_buf(),
    jobs: Some(2),
    page_size,
    markdown: MarkdownOptions {
      toc: true,
      ..MarkdownOptions::default()
    },
    ..Config::default()
  }
}

#[test]
fn test_build_writes_posts_and_paginated_listings() {
  let input = TempDir::new().expect("temp input");
  let output = TempDir::new().expect("temp output");

  write(
    input.path(),
    "first.md",
    "---\ntitle: First\ndate: 2024-01-01\n---\n## Intro\n\nHello.\n",
  );
  write(
    input.path(),
    "2024-02-01-second.md",
    "---\ntitle: Second\ndescription: The <second> one\n---\nBody\n",
  );
  write(
    input.path(),
    "nested/third.md",
    "---\ntitle: Third\ndate: 2024-03-01\ncategories: Rust Tips, web\ntoc: \
     false\n---\n## Hidden toc\n",
  );
  write(input.path(), "_draft.md", "no frontmatter at all\n");
  write(input.path(), "notes.txt", "ignored\n");

  let summary = build_site(&config(input.path(), output.path(), 2)).expect("build");
  assert_eq!(summary.posts, 3);
  assert_eq!(summary.pages, 2);
  assert_eq!(summary.categories, 2);

  let out = output.path();
  let first = fs::read_to_string(out.join("posts/first.html")).expect("first");
  assert!(first.contains("<h1>First</h1>"));
  assert!(first.contains("<time datetime=\"2024-01-01\">2024-01-01</time>"));
  assert!(first.contains("<nav class=\"toc\">"));
  assert!(first.contains("<h2 id=\"intro\">Intro</h2>"));

  let third = fs::read_to_string(out.join("posts/third.html")).expect("third");
  assert!(!third.contains("<nav class=\"toc\">"));
  assert!(third.contains("<a href=\"../categories/rust-tips/\" class=\"category\">Rust Tips</a>"));
  assert!(third.contains(
    "<a href=\"2024-02-01-second.html\" class=\"post-nav-link post-nav-prev\"><span \
     class=\"post-nav-label\">Previous</span> <span class=\"post-nav-title\">Second</span></a>"
  ));
  assert!(third.contains("<span class=\"post-nav-link post-nav-next disabled\"></span>"));

  // The oldest post links forward only.
  assert!(first.contains("<span class=\"post-nav-link post-nav-prev disabled\"></span>"));
  assert!(first.contains("<a href=\"2024-02-01-second.html\" class=\"post-nav-link post-nav-next\">"));

  let rust = fs::read_to_string(out.join("categories/rust-tips/index.html")).expect("category");
  assert!(rust.starts_with("<h1>Category: Rust Tips</h1>\n"));
  assert!(rust.contains("<a href=\"../../posts/third.html\">Third</a>"));
  assert!(!rust.contains("second"));
  assert!(out.join("categories/web/index.html").exists());

  assert!(!out.join("posts/_draft.html").exists());

  // Newest first: third (March), second (February), then first.
  let index = fs::read_to_string(out.join("index.html")).expect("index");
  let third_at = index.find("posts/third.html").expect("third listed");
  let second_at = index.find("posts/2024-02-01-second.html").expect("second listed");
  assert!(third_at < second_at);
  assert!(!index.contains("posts/first.html"));
  assert!(index.contains("<p>The &lt;second&gt; one</p>"));
  assert!(index.contains("<a href=\"categories/web/\" class=\"category\">web</a>"));
  assert!(index.contains("<a href=\"page/2/\" class=\"pagination-next\">"));

  let page_two = fs::read_to_string(out.join("page/2/index.html")).expect("page 2");
  assert!(page_two.contains("<a href=\"../../posts/first.html\">First</a>"));
  assert!(page_two.contains("<a href=\"../../index.html\" class=\"pagination-prev\">"));
  assert!(page_two.contains("<span class=\"pagination-next disabled\">"));
}

#[test]
fn test_category_listings_are_paginated() {
  let input = TempDir::new().expect("temp input");
  let output = TempDir::new().expect("temp output");
  for day in 1..=3 {
    write(
      input.path(),
      &format!("2024-04-0{day}-go.md"),
      &format!("---\ntitle: Go {day}\ncategories: Go\n---\nbody\n"),
    );
  }

  let summary = build_site(&config(input.path(), output.path(), 1)).expect("build");
  assert_eq!(summary.pages, 3);
  assert_eq!(summary.categories, 1);

  let go = output.path().join("categories/go");
  let first = fs::read_to_string(go.join("index.html")).expect("category page 1");
  assert!(first.contains("<a href=\"../../posts/2024-04-03-go.html\">Go 3</a>"));
  assert!(first.contains("<a href=\"page/2/\" class=\"pagination-next\">"));

  let second = fs::read_to_string(go.join("page/2/index.html")).expect("category page 2");
  assert!(second.contains("<a href=\"../../../../posts/2024-04-02-go.html\">Go 2</a>"));
  assert!(second.contains("<a href=\"../../index.html\" class=\"pagination-prev\">"));
  assert!(second.contains("<a href=\"../3/\" class=\"pagination-next\">"));
  assert!(go.join("page/3/index.html").exists());
}

#[test]
fn test_duplicate_slugs_fail_the_build() {
  let input = TempDir::new().expect("temp input");
  let output = TempDir::new().expect("temp output");
  write(input.path(), "a/same.md", "---\ntitle: A\n---\n");
  write(input.path(), "b/same.md", "---\ntitle: B\n---\n");

  let err = build_site(&config(input.path(), output.path(), 5))
    .expect_err("colliding output names must fail");
  match err {
    TailozaError::Config(message) => assert!(message.contains("posts/same.html")),
    other => panic!("unexpected error: {other}"),
  }
  assert!(!output.path().join("posts/same.html").exists());
}

#[test]
fn test_single_page_has_no_pagination() {
  let input = TempDir::new().expect("temp input");
  let output = TempDir::new().expect("temp output");
  write(input.path(), "only.md", "---\ntitle: Only\ndate: 2024-05-05\n---\nx\n");

  let summary = build_site(&config(input.path(), output.path(), 10)).expect("build");
  assert_eq!(summary.pages, 1);

  let index = fs::read_to_string(output.path().join("index.html")).expect("index");
  assert!(!index.contains("pagination"));
  assert!(!index.contains("post-nav"));
  assert!(!output.path().join("page").exists());
}

#[test]
fn test_empty_input_still_writes_index() {
  let input = TempDir::new().expect("temp input");
  let output = TempDir::new().expect("temp output");

  let summary = build_site(&config(input.path(), output.path(), 5)).expect("build");
  assert_eq!(summary.posts, 0);
  assert_eq!(summary.pages, 1);
  assert_eq!(
    fs::read_to_string(output.path().join("index.html")).expect("index"),
    "<section class=\"post-list\">\n</section>\n"
  );
}

#[test]
fn test_missing_title_fails_the_build() {
  let input = TempDir::new().expect("temp input");
  let output = TempDir::new().expect("temp output");
  write(input.path(), "untitled.md", "---\ndate: 2024-01-01\n---\nbody\n");

  let err = build_site(&config(input.path(), output.path(), 5))
    .expect_err("missing title must fail");
  match err {
    TailozaError::Post { path, source } => {
      assert!(path.ends_with("untitled.md"));
      assert_eq!(source, ValidationError::MissingField {
        field: "title".to_string(),
      });
    },
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn test_invalid_date_fails_the_build() {
  let input = TempDir::new().expect("temp input");
  let output = TempDir::new().expect("temp output");
  write(input.path(), "bad.md", "---\ntitle: Bad\ndate: 2024-02-30\n---\n");

  let err = build_site(&config(input.path(), output.path(), 5))
    .expect_err("invalid date must fail");
  assert!(matches!(err, TailozaError::Post {
    source: ValidationError::InvalidDate { .. },
    ..
  }));
}

#[test]
fn test_collect_posts_skips_drafts_and_other_files() {
  let input = TempDir::new().expect("temp input");
  write(input.path(), "b.md", "");
  write(input.path(), "a.md", "");
  write(input.path(), "_wip.md", "");
  write(input.path(), "sub/c.md", "");
  write(input.path(), "image.png", "");

  let names: Vec<_> = collect_posts(input.path())
    .iter()
    .map(|p| {
      p.strip_prefix(input.path())
        .expect("inside input")
        .to_string_lossy()
        .into_owned()
    })
    .collect();
  assert_eq!(names, ["a.md", "b.md", "sub/c.md"]);
}
