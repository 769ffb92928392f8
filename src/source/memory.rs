//! In-memory data source.
//!
//! Pages through a fixed collection, applying the request's filter
//! client-side. An optional latency stands in for network time.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::CatalogItem;
use crate::source::{Cursor, DataSource, FetchRequest, Page};

/// Offset-paged source over items held in memory.
pub struct InMemorySource<T> {
    items: Arc<Vec<T>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl<T: CatalogItem> InMemorySource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Delay every page by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of items held, before filtering.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of `fetch_page` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: CatalogItem> DataSource for InMemorySource<T> {
    type Item = T;

    async fn fetch_page(&self, request: &FetchRequest) -> Result<Page<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let offset = match &request.cursor {
            Cursor::Offset(offset) => *offset,
            Cursor::Token(token) => {
                return Err(AppError::fetch(
                    "in-memory source",
                    format!("unsupported cursor token '{token}'"),
                ));
            }
        };

        let matching: Vec<&T> = self
            .items
            .iter()
            .filter(|item| request.filter.matches(*item))
            .collect();
        let total = matching.len();

        let items: Vec<T> = matching
            .into_iter()
            .skip(offset)
            .take(request.page_size)
            .cloned()
            .collect();
        let next = offset + items.len();

        log::debug!(
            "In-memory page at {}: {} of {} matching items",
            request.cursor,
            items.len(),
            total
        );

        Ok(Page {
            items,
            next_cursor: Some(Cursor::Offset(next)),
            is_last_page: next >= total,
            total: Some(total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FacetValue, FilterModel};
    use crate::models::{CatalogEntry, Listing};

    fn make_entries(count: usize) -> Vec<CatalogEntry> {
        (0..count)
            .map(|i| {
                let category = if i % 2 == 0 { "SSC" } else { "Banking" };
                CatalogEntry::new(format!("e{i}"), Listing::Courses, format!("Course {i}"), category)
            })
            .collect()
    }

    fn request(filter: FilterModel, offset: usize, page_size: usize) -> FetchRequest {
        FetchRequest {
            filter,
            cursor: Cursor::Offset(offset),
            page_size,
            generation: 0,
        }
    }

    #[tokio::test]
    async fn test_pages_through_items() {
        let source = InMemorySource::new(make_entries(5));

        let first = source.fetch_page(&request(FilterModel::new(), 0, 2)).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_cursor, Some(Cursor::Offset(2)));
        assert!(!first.is_last_page);
        assert_eq!(first.total, Some(5));

        let last = source.fetch_page(&request(FilterModel::new(), 4, 2)).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.is_last_page);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_applies_filter_before_paging() {
        let source = InMemorySource::new(make_entries(6));
        let filter = FilterModel::new()
            .set("category", FacetValue::multi_select(["Banking"]))
            .unwrap();

        let page = source.fetch_page(&request(filter, 1, 10)).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e3", "e5"]);
        assert_eq!(page.total, Some(3));
        assert!(page.is_last_page);
    }

    #[tokio::test]
    async fn test_offset_past_end_is_empty() {
        let source = InMemorySource::new(make_entries(3));
        let page = source.fetch_page(&request(FilterModel::new(), 10, 5)).await.unwrap();
        assert!(page.items.is_empty());
        assert!(page.is_last_page);
    }

    #[tokio::test]
    async fn test_rejects_token_cursor() {
        let source = InMemorySource::new(make_entries(3));
        let mut req = request(FilterModel::new(), 0, 5);
        req.cursor = Cursor::Token("opaque".into());
        assert!(matches!(
            source.fetch_page(&req).await,
            Err(AppError::Fetch { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let source = InMemorySource::new(make_entries(3)).with_latency(Duration::from_millis(250));
        let started = tokio::time::Instant::now();
        source.fetch_page(&request(FilterModel::new(), 0, 5)).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
