//! Error types surfaced by the core.
//!
//! The Markdown parser itself never fails; malformed input degrades to
//! literal text. Only metadata validation and pagination requests can be
//! rejected.
use thiserror::Error;

/// Raised when a document's metadata does not satisfy the caller's
/// requirements.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
  #[error("missing required metadata field `{field}`")]
  MissingField { field: String },

  #[error("metadata field `{field}` has an invalid date: {value}")]
  InvalidDate { field: String, value: String },
}

/// Raised for pagination requests that violate the builder's preconditions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaginationError {
  #[error("invalid pagination request: {reason}")]
  InvalidRequest { reason: &'static str },
}
