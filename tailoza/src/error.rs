use std::{io, path::PathBuf};

use tailoza_markdown::{PaginationError, ValidationError};
use thiserror::Error;

/// Top-level error type for the tailoza crate.
#[derive(Debug, Error)]
pub enum TailozaError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Failed to read {path}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Invalid post {path}: {source}")]
  Post {
    path:   PathBuf,
    #[source]
    source: ValidationError,
  },

  #[error("Pagination error: {0}")]
  Pagination(#[from] PaginationError),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("Thread pool error: {0}")]
  ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result alias used throughout the binary.
pub type Result<T, E = TailozaError> = std::result::Result<T, E>;
