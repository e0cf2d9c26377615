//! Site generation: post fragments and paginated listings.
use std::{
  collections::{BTreeMap, HashMap},
  fmt::Write as _,
  fs,
  path::{Path, PathBuf},
};

use log::{debug, info, warn};
use rayon::prelude::*;
use tailoza_markdown::{
  MarkdownProcessor,
  pagination::{PaginationRequest, build_pagination, render_pagination},
  utils::category_slug,
};

use crate::{
  config::Config,
  error::{Result, TailozaError},
  posts::{Post, collect_posts, load_post, sort_posts},
};

/// What a build produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
  pub posts:      usize,
  /// Pages of the main listing.
  pub pages:      usize,
  pub categories: usize,
}

/// A paginated listing: the main index or one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing<'a> {
  Index,
  Category { name: &'a str, slug: &'a str },
}

impl Listing<'_> {
  /// Directory of the listing's first page, relative to the output root.
  #[must_use]
  pub fn base(&self) -> PathBuf {
    match self {
      Self::Index => PathBuf::new(),
      Self::Category { slug, .. } => Path::new("categories").join(slug),
    }
  }

  /// Prefix that leads from listing page `page` back to the output root.
  #[must_use]
  pub const fn root_prefix(&self, page: usize) -> &'static str {
    match (self, page <= 1) {
      (Self::Index, true) => "",
      (Self::Index, false) | (Self::Category { .. }, true) => "../../",
      (Self::Category { .. }, false) => "../../../../",
    }
  }
}

/// Output path of a listing page, relative to the listing's base directory.
#[must_use]
pub fn listing_path(page: usize) -> PathBuf {
  if page <= 1 {
    PathBuf::from("index.html")
  } else {
    Path::new("page").join(page.to_string()).join("index.html")
  }
}

/// Link from listing page `from` to listing page `to` of the same listing.
#[must_use]
pub fn listing_url(from: usize, to: usize) -> String {
  match (from <= 1, to <= 1) {
    (true, true) => "index.html".to_string(),
    (true, false) => format!("page/{to}/"),
    (false, true) => "../../index.html".to_string(),
    (false, false) => format!("../{to}/"),
  }
}

/// A category name may only become a listing directory if its slug is a
/// single, ordinary path segment.
fn is_path_segment(slug: &str) -> bool {
  !slug.is_empty() && slug != "." && slug != ".." && !slug.contains(['/', '\\'])
}

/// Render every post under the configured input directory and write the
/// results into the output directory.
///
/// # Errors
///
/// Returns an error if a post cannot be read or fails validation, if two posts
/// would be written to the same file, or if an output file cannot be written.
pub fn build_site(config: &Config) -> Result<BuildSummary> {
  info!("Input directory: {}", config.input_dir.display());
  let files = collect_posts(&config.input_dir);
  info!("Found {} posts", files.len());

  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build()?;

  let processor = MarkdownProcessor::new(config.markdown.clone());
  let today = jiff::Zoned::now().date();

  let mut posts = pool.install(|| {
    files
      .par_iter()
      .map(|path| load_post(path, &processor, &config.required_fields, today))
      .collect::<Result<Vec<_>>>()
  })?;
  check_unique_slugs(&posts)?;
  sort_posts(&mut posts);

  let posts_dir = config.output_dir.join("posts");
  fs::create_dir_all(&posts_dir)?;
  pool.install(|| {
    posts.par_iter().enumerate().try_for_each(|(index, post)| {
      // Newest first, so the older post comes next in the list.
      let older = posts.get(index + 1);
      let newer = index.checked_sub(1).and_then(|i| posts.get(i));
      let path = posts_dir.join(format!("{}.html", post.slug));
      fs::write(&path, render_post(post, older, newer))?;
      debug!("Wrote {}", path.display());
      Ok::<(), TailozaError>(())
    })
  })?;

  let all: Vec<&Post> = posts.iter().collect();
  let pages = write_listing(config, Listing::Index, &all)?;

  let categories = group_by_category(&posts);
  for (slug, (name, members)) in &categories {
    let listing = Listing::Category {
      name: *name,
      slug: slug.as_str(),
    };
    write_listing(config, listing, members)?;
  }

  info!(
    "Generated {} posts, {pages} listing pages and {} categories in {}",
    posts.len(),
    categories.len(),
    config.output_dir.display()
  );

  Ok(BuildSummary {
    posts: posts.len(),
    pages,
    categories: categories.len(),
  })
}

/// Posts from different directories may share a file stem; refuse to let one
/// silently overwrite the other.
fn check_unique_slugs(posts: &[Post]) -> Result<()> {
  let mut seen: HashMap<&str, &Path> = HashMap::with_capacity(posts.len());
  for post in posts {
    if let Some(first) = seen.insert(post.slug.as_str(), post.source.as_path()) {
      return Err(TailozaError::Config(format!(
        "{} and {} would both be written to posts/{}.html",
        first.display(),
        post.source.display(),
        post.slug
      )));
    }
  }
  Ok(())
}

/// Group posts by category slug, keeping the newest-first order inside each
/// group. The first spelling seen names the category.
fn group_by_category(posts: &[Post]) -> BTreeMap<String, (&str, Vec<&Post>)> {
  let mut groups: BTreeMap<String, (&str, Vec<&Post>)> = BTreeMap::new();
  for post in posts {
    for name in post.metadata.categories() {
      let slug = category_slug(name);
      if !is_path_segment(&slug) {
        warn!("Skipping category {name:?} of {}", post.source.display());
        continue;
      }
      let (_, members) = groups.entry(slug).or_insert_with(|| (name.as_str(), Vec::new()));
      // A post listing the same category twice appears once.
      if !members.last().is_some_and(|last| last.slug == post.slug) {
        members.push(post);
      }
    }
  }
  groups
}

/// Write every page of one listing, returning the number of pages.
fn write_listing(config: &Config, listing: Listing<'_>, posts: &[&Post]) -> Result<usize> {
  let chunks: Vec<&[&Post]> = if posts.is_empty() {
    vec![posts]
  } else {
    posts.chunks(config.page_size).collect()
  };

  let base = config.output_dir.join(listing.base());
  for (index, chunk) in chunks.iter().enumerate() {
    let page = index + 1;
    let links = build_pagination(&PaginationRequest::new(
      posts.len(),
      config.page_size,
      page,
    ))?;
    let nav = render_pagination(&links, |to| listing_url(page, to));

    let path = base.join(listing_path(page));
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&path, render_listing(chunk, listing, page, &nav))?;
    debug!("Wrote {}", path.display());
  }

  Ok(chunks.len())
}

/// Render the fragment for a single post, with links to its older and newer
/// neighbours.
#[must_use]
pub fn render_post(post: &Post, older: Option<&Post>, newer: Option<&Post>) -> String {
  let mut html = String::from("<article>\n");
  let _ = writeln!(html, "<h1>{}</h1>", html_escape::encode_text(post.title()));
  html.push_str("<div class=\"post-meta\">\n");
  html.push_str(&post_meta(post));
  if let Some(author) = post.metadata.author() {
    let _ = write!(
      html,
      " • <span class=\"author\">{}</span>",
      html_escape::encode_text(author)
    );
  }
  html.push_str(&category_links(post, "../"));
  html.push_str("\n</div>\n");

  if !post.result.toc.is_empty() {
    html.push_str(&post.result.toc);
    html.push('\n');
  }
  html.push_str(&post.result.html);
  html.push('\n');
  let nav = render_post_nav(older, newer);
  if !nav.is_empty() {
    html.push_str(&nav);
    html.push('\n');
  }
  html.push_str("</article>\n");
  html
}

/// Previous/next links between post pages. Empty when the post has no
/// neighbours.
#[must_use]
pub fn render_post_nav(older: Option<&Post>, newer: Option<&Post>) -> String {
  if older.is_none() && newer.is_none() {
    return String::new();
  }

  let mut html = String::from("<nav class=\"post-nav\">\n");
  for (neighbour, label, class) in [
    (older, "Previous", "post-nav-prev"),
    (newer, "Next", "post-nav-next"),
  ] {
    match neighbour {
      Some(post) => {
        let _ = writeln!(
          html,
          "<a href=\"{}.html\" class=\"post-nav-link {class}\"><span \
           class=\"post-nav-label\">{label}</span> <span \
           class=\"post-nav-title\">{}</span></a>",
          html_escape::encode_double_quoted_attribute(&post.slug),
          html_escape::encode_text(post.title())
        );
      },
      None => {
        let _ = writeln!(html, "<span class=\"post-nav-link {class} disabled\"></span>");
      },
    }
  }
  html.push_str("</nav>");
  html
}

/// Render one listing page: a preview per post followed by pagination.
#[must_use]
pub fn render_listing(
  posts: &[&Post],
  listing: Listing<'_>,
  page: usize,
  pagination: &str,
) -> String {
  let prefix = listing.root_prefix(page);
  let mut html = String::new();
  if let Listing::Category { name, .. } = listing {
    let _ = writeln!(html, "<h1>Category: {}</h1>", html_escape::encode_text(name));
  }
  html.push_str("<section class=\"post-list\">\n");
  for post in posts {
    html.push_str("<article class=\"post-preview\">\n");
    let _ = writeln!(
      html,
      "<h2><a href=\"{prefix}posts/{}.html\">{}</a></h2>",
      html_escape::encode_double_quoted_attribute(&post.slug),
      html_escape::encode_text(post.title())
    );
    html.push_str(&post_meta(post));
    html.push_str(&category_links(post, prefix));
    html.push('\n');
    if let Some(description) = post.metadata.description() {
      let _ = writeln!(html, "<p>{}</p>", html_escape::encode_text(description));
    }
    html.push_str("</article>\n");
  }
  html.push_str("</section>\n");
  if !pagination.is_empty() {
    html.push_str(pagination);
    html.push('\n');
  }
  html
}

fn post_meta(post: &Post) -> String {
  format!(
    "<time datetime=\"{date}\">{date}</time> • <span \
     class=\"reading-time\">{} min read</span>",
    post.reading_time,
    date = post.date
  )
}

/// Links to the post's category listings; `prefix` leads to the output root.
fn category_links(post: &Post, prefix: &str) -> String {
  let categories = post.metadata.categories();
  if categories.is_empty() {
    return String::new();
  }

  let links: Vec<String> = categories
    .iter()
    .map(|name| {
      let slug = category_slug(name);
      let text = html_escape::encode_text(name);
      if is_path_segment(&slug) {
        format!(
          "<a href=\"{prefix}categories/{}/\" class=\"category\">{text}</a>",
          html_escape::encode_double_quoted_attribute(&slug)
        )
      } else {
        format!("<span class=\"category\">{text}</span>")
      }
    })
    .collect();
  format!(" • <span class=\"categories\">{}</span>", links.join(", "))
}
