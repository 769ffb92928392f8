// src/models/mod.rs

//! Domain models for the catalog library.
//!
//! This module contains the item contract, the concrete catalog entry,
//! the listing registry and the configuration structures.

mod config;
mod entry;
mod item;
mod listing;

// Re-export all public types
pub use config::{
    Config, LoggingConfig, OutputConfig, SessionConfig, SourceConfig, TriggerConfig,
};
pub use entry::CatalogEntry;
pub use item::{CatalogItem, FieldValue};
pub(crate) use item::format_number;
pub use listing::Listing;
