//! Expose tailoza's internal API for integration tests. The Markdown engine
//! itself lives in `tailoza-markdown`; this crate only adds configuration,
//! post loading and page writing around it.
pub mod cli;
pub mod config;
pub mod error;
pub mod posts;
pub mod site;
