//! Data source abstractions for paged catalog fetches.
//!
//! A [`DataSource`] answers one [`FetchRequest`] with one [`Page`]. Sessions
//! call a source at most once at a time; sources must still tolerate
//! concurrent calls from independent sessions.
//!
//! - [`InMemorySource`]: filters a fixed collection client-side
//! - [`HttpSource`]: forwards the filter as query parameters (feature `http`)
//! - [`synthetic`]: deterministic stand-in data for every listing

#[cfg(feature = "http")]
pub mod http;
pub mod memory;
pub mod synthetic;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::FilterModel;
use crate::models::CatalogItem;

// Re-export for convenience
#[cfg(feature = "http")]
pub use http::HttpSource;
pub use memory::InMemorySource;

/// Position of the next page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cursor {
    /// Number of items already consumed.
    Offset(usize),
    /// Opaque continuation token issued by the source.
    Token(String),
}

impl Cursor {
    /// Position of the first page.
    pub fn start() -> Self {
        Cursor::Offset(0)
    }

    /// Cursor after consuming `count` more items, if it can be derived locally.
    ///
    /// Tokens cannot be advanced without the source's help.
    pub fn advance(&self, count: usize) -> Option<Self> {
        match self {
            Cursor::Offset(offset) => Some(Cursor::Offset(offset + count)),
            Cursor::Token(_) => None,
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Offset(offset) => write!(f, "offset {offset}"),
            Cursor::Token(token) => write!(f, "token {token}"),
        }
    }
}

/// A single page request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Filter snapshot the request was issued under
    pub filter: FilterModel,
    pub cursor: Cursor,
    pub page_size: usize,
    /// Session generation at issue time
    pub generation: u64,
}

/// A single page response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Cursor of the following page; derived from the request when absent
    pub next_cursor: Option<Cursor>,

    /// Source says no further page exists
    pub is_last_page: bool,

    /// Total number of items matching the filter, when the source knows it
    pub total: Option<usize>,
}

impl<T> Page<T> {
    /// A page with no paging hints.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
            is_last_page: false,
            total: None,
        }
    }

    /// A page with nothing in it.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_next_cursor(mut self, cursor: Cursor) -> Self {
        self.next_cursor = Some(cursor);
        self
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    pub fn last(mut self) -> Self {
        self.is_last_page = true;
        self
    }
}

/// Trait for paged item backends.
#[async_trait]
pub trait DataSource: Send + Sync {
    type Item: CatalogItem;

    /// Fetch the page at `request.cursor` under `request.filter`.
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Page<Self::Item>>;
}
