use std::{
  fs,
  path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};
use tailoza_markdown::MarkdownOptions;

use crate::{
  cli::{Cli, Commands},
  error::{Result, TailozaError},
};

fn default_input_dir() -> PathBuf {
  PathBuf::from("posts")
}

fn default_output_dir() -> PathBuf {
  PathBuf::from("public")
}

const fn default_page_size() -> usize {
  10
}

fn default_required_fields() -> Vec<String> {
  vec!["title".to_string()]
}

/// Configuration options for tailoza
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  /// Directory containing Markdown posts
  #[serde(default = "default_input_dir")]
  pub input_dir: PathBuf,

  /// Directory the generated fragments are written to
  #[serde(default = "default_output_dir")]
  pub output_dir: PathBuf,

  /// Number of threads to use for parallel processing
  #[serde(default)]
  pub jobs: Option<usize>,

  /// Posts per listing page
  #[serde(default = "default_page_size")]
  pub page_size: usize,

  /// Frontmatter fields every post must set
  #[serde(default = "default_required_fields")]
  pub required_fields: Vec<String>,

  /// Options handed to the Markdown processor (`[markdown]` table)
  #[serde(default)]
  pub markdown: MarkdownOptions,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      input_dir:       default_input_dir(),
      output_dir:      default_output_dir(),
      jobs:            None,
      page_size:       default_page_size(),
      required_fields: default_required_fields(),
      markdown:        MarkdownOptions::default(),
    }
  }
}

impl Config {
  /// Read a configuration from a TOML file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not valid TOML for
  /// this structure.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content =
      fs::read_to_string(path).map_err(|source| TailozaError::Read {
        path: path.to_path_buf(),
        source,
      })?;
    Self::from_toml(&content)
  }

  /// Parse a configuration from TOML text.
  ///
  /// # Errors
  ///
  /// Returns an error if the text is not valid TOML for this structure.
  pub fn from_toml(content: &str) -> Result<Self> {
    Ok(toml::from_str(content)?)
  }

  /// Build the effective configuration: the file named on the command line
  /// (or defaults), overridden by command line flags.
  ///
  /// # Errors
  ///
  /// Returns an error if the configuration file cannot be loaded or the
  /// merged configuration is invalid.
  pub fn load(cli: &Cli) -> Result<Self> {
    let mut config = match &cli.config_file {
      Some(path) => {
        debug!("Loading configuration from {}", path.display());
        Self::from_file(path)?
      },
      None => Self::default(),
    };
    config.merge_with_cli(cli);
    config.validate()?;
    Ok(config)
  }

  /// Apply command line overrides.
  pub fn merge_with_cli(&mut self, cli: &Cli) {
    match &cli.command {
      Commands::Build {
        input_dir,
        output_dir,
        jobs,
        page_size,
      } => {
        if let Some(input_dir) = input_dir {
          self.input_dir.clone_from(input_dir);
        }

        if let Some(output_dir) = output_dir {
          self.output_dir.clone_from(output_dir);
        }

        self.jobs = jobs.or(self.jobs);

        if let Some(page_size) = page_size {
          self.page_size = *page_size;
        }
      },
      Commands::Render { toc, .. } => {
        // The flag can only switch the table of contents on.
        if *toc {
          self.markdown.toc = true;
        }
      },
      Commands::Paginate { .. } => {},
    }
  }

  /// Check values that deserialization cannot rule out.
  ///
  /// # Errors
  ///
  /// Returns [`TailozaError::Config`] for a zero page size or job count.
  pub fn validate(&self) -> Result<()> {
    if self.page_size == 0 {
      return Err(TailozaError::Config(
        "page_size must be at least 1".to_string(),
      ));
    }
    if self.jobs == Some(0) {
      return Err(TailozaError::Config("jobs must be at least 1".to_string()));
    }
    Ok(())
  }
}
