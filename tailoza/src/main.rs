use std::{
  fs,
  io::{self, Write},
};

use color_eyre::eyre::{Context, Result};
use log::{LevelFilter, info};
use tailoza::{
  cli::{Cli, Commands},
  config::Config,
  site,
};
use tailoza_markdown::{
  MarkdownProcessor,
  pagination::{PaginationRequest, build_pagination, render_pagination},
};

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  let config = Config::load(&cli).wrap_err("Failed to load configuration")?;

  match &cli.command {
    Commands::Render { file, json, .. } => {
      let source = fs::read_to_string(file)
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
      let processor = MarkdownProcessor::new(config.markdown);
      let document = processor.render_document(&source);

      let mut out = io::stdout().lock();
      if *json {
        let json = serde_json::to_string_pretty(&document)
          .wrap_err("Failed to serialize rendered document")?;
        writeln!(out, "{json}")?;
      } else {
        if !document.result.toc.is_empty() {
          writeln!(out, "{}", document.result.toc)?;
        }
        writeln!(out, "{}", document.result.html)?;
      }
    },

    Commands::Paginate {
      total,
      page_size,
      current,
      json,
    } => {
      let links =
        build_pagination(&PaginationRequest::new(*total, *page_size, *current))
          .wrap_err("Failed to build pagination")?;

      let mut out = io::stdout().lock();
      if *json {
        writeln!(out, "{}", serde_json::to_string_pretty(&links)?)?;
      } else {
        let html = render_pagination(&links, |to| site::listing_url(*current, to));
        if !html.is_empty() {
          writeln!(out, "{html}")?;
        }
      }
    },

    Commands::Build { .. } => {
      info!("Starting site generation...");
      let summary = site::build_site(&config).wrap_err_with(|| {
        format!(
          "Failed to build site from {}",
          config.input_dir.display()
        )
      })?;
      info!(
        "Site generation complete: {} posts, {} listing pages, {} categories",
        summary.posts, summary.pages, summary.categories
      );
    },
  }

  Ok(())
}
