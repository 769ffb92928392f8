//! Pipeline entry points for catalog operations.
//!
//! - `run_browse`: Page through a listing the way an infinite-scroll view does
//! - `run_validate`: Check configuration and listing registries
//! - `parse_filters` / `describe_facets`: CLI-facing filter helpers

pub mod browse;
pub mod filters;
pub mod validate;

pub use browse::{BrowseOptions, BrowseStats, OutputFormat, run_browse};
pub use filters::{describe_facets, parse_filters};
pub use validate::run_validate;
