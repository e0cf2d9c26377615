use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for tailoza
#[derive(Parser, Debug)]
#[command(author, version, about = "Tailoza: a small static blog generator")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to a TOML configuration file. Command line flags take precedence
  /// over values read from it.
  #[arg(short = 'c', long = "config-file", global = true)]
  pub config_file: Option<PathBuf>,
}

/// All supported subcommands for the tailoza CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Render a single Markdown file and print the HTML fragment.
  Render {
    /// Markdown file to render, optionally starting with frontmatter.
    file: PathBuf,

    /// Include a table of contents unless the file's frontmatter disables it.
    #[arg(long)]
    toc: bool,

    /// Print metadata, headings and HTML as JSON instead.
    #[arg(long)]
    json: bool,
  },

  /// Print the pagination links for one listing page.
  Paginate {
    /// Total number of items being listed.
    #[arg(long)]
    total: usize,

    /// Items per page.
    #[arg(long = "page-size")]
    page_size: usize,

    /// Page to build links for, starting at 1.
    #[arg(long)]
    current: usize,

    /// Print the link set as JSON instead of HTML.
    #[arg(long)]
    json: bool,
  },

  /// Render every post and the paginated listings into the output directory.
  Build {
    /// Directory containing Markdown posts.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output directory for generated fragments.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of threads to use for parallel processing.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,

    /// Posts per listing page.
    #[arg(long = "page-size")]
    page_size: Option<usize>,
  },
}

impl Cli {
  /// Parse command line arguments.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
