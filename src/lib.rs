// src/lib.rs

//! Catalog Listing Library
//!
//! Incrementally loaded, filterable catalog listings: a [`session`] pages
//! items in from a [`source`] under an immutable [`filter`] model, a
//! [`trigger`] decides when the next page is due, and a [`sidebar`] edits
//! the filter.

pub mod error;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod sidebar;
pub mod source;
pub mod trigger;
pub mod utils;

pub use filter::{FacetValue, FilterModel};
pub use session::{CollectionSession, LoadOutcome, SessionStatus};
pub use source::{DataSource, FetchRequest, Page};
