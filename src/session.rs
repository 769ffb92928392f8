//! Paged, filterable collection session.
//!
//! A [`CollectionSession`] accumulates items from a [`DataSource`] one page
//! at a time. At most one page request is in flight per session: the status
//! doubles as the single-flight gate. Every [`reset`](CollectionSession::reset)
//! bumps the session generation, and a page that resolves under an older
//! generation is discarded without touching state.
//!
//! State transitions happen synchronously when `load_more` or `reset` is
//! called; the returned future only performs the fetch and applies its
//! result. Dropping an unresolved future releases the gate.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde::Serialize;
use tokio::sync::watch;

use crate::error::{AppError, Result};
use crate::filter::FilterModel;
use crate::models::{CatalogItem, SessionConfig};
use crate::source::{Cursor, DataSource, FetchRequest, Page};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Future returned by [`CollectionSession::load_more`] and
/// [`CollectionSession::reset`].
pub type LoadFuture = BoxFuture<'static, Result<LoadOutcome>>;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Ready to load the next page
    Idle,
    /// A page request is in flight
    Loading,
    /// No further pages under the current filter
    Exhausted,
    /// The last page request failed; `load_more` retries it
    Error,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Exhausted => "exhausted",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a `load_more` call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InFlight,
    Exhausted,
}

/// What one applied page did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageSummary {
    /// Items appended
    pub added: usize,
    /// Items dropped because their id was already present
    pub duplicates: usize,
    /// The page ended the listing
    pub exhausted: bool,
}

/// Result of a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was applied.
    Appended(PageSummary),
    /// Nothing was requested.
    Skipped(SkipReason),
    /// The page arrived after a reset and was discarded.
    Stale { generation: u64 },
}

impl LoadOutcome {
    /// Number of items the outcome appended.
    pub fn added(&self) -> usize {
        match self {
            Self::Appended(summary) => summary.added,
            _ => 0,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// Point-in-time copy of a session's observable state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot<T> {
    pub items: Vec<T>,
    pub status: SessionStatus,
    pub generation: u64,
    pub cursor: Cursor,
    pub cap: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

struct SessionState<T> {
    items: Vec<T>,
    seen: HashSet<String>,
    status: SessionStatus,
    cursor: Cursor,
    generation: u64,
    filter: FilterModel,
    cap: Option<usize>,
    /// Total reported by the source for the current filter
    source_total: Option<usize>,
    last_error: Option<String>,
}

impl<T: CatalogItem> SessionState<T> {
    /// Caller cap, else the source's total hint.
    fn limit(&self) -> Option<usize> {
        self.cap.or(self.source_total)
    }

    fn at_limit(&self) -> bool {
        self.limit().is_some_and(|limit| self.items.len() >= limit)
    }

    /// Append `items` in order, dropping known ids and stopping at the limit.
    fn append(&mut self, items: Vec<T>) -> (usize, usize) {
        let (mut added, mut duplicates) = (0, 0);
        for item in items {
            if self.at_limit() {
                break;
            }
            if self.seen.insert(item.id().to_string()) {
                self.items.push(item);
                added += 1;
            } else {
                duplicates += 1;
            }
        }
        (added, duplicates)
    }
}

struct Inner<S: DataSource> {
    source: S,
    page_size: usize,
    state: Mutex<SessionState<S::Item>>,
    status_tx: watch::Sender<SessionStatus>,
}

impl<S: DataSource> Inner<S> {
    fn lock(&self) -> MutexGuard<'_, SessionState<S::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, state: &mut SessionState<S::Item>, status: SessionStatus) {
        if state.status != status {
            log::debug!(
                "Session generation {}: {} -> {}",
                state.generation,
                state.status,
                status
            );
        }
        state.status = status;
        self.status_tx.send_if_modified(|current| {
            let changed = *current != status;
            *current = status;
            changed
        });
    }

    /// Pass the single-flight gate and capture the request to issue.
    fn begin(
        &self,
        state: &mut SessionState<S::Item>,
    ) -> std::result::Result<FetchRequest, SkipReason> {
        match state.status {
            SessionStatus::Loading => return Err(SkipReason::InFlight),
            SessionStatus::Exhausted => return Err(SkipReason::Exhausted),
            SessionStatus::Idle | SessionStatus::Error => {}
        }
        state.last_error = None;
        self.set_status(state, SessionStatus::Loading);
        Ok(FetchRequest {
            filter: state.filter.clone(),
            cursor: state.cursor.clone(),
            page_size: self.page_size,
            generation: state.generation,
        })
    }

    /// Apply the outcome of `request` if it is still current.
    fn complete(
        &self,
        request: &FetchRequest,
        result: Result<Page<S::Item>>,
    ) -> Result<LoadOutcome> {
        let mut state = self.lock();
        if state.generation != request.generation {
            log::debug!(
                "Discarding page for generation {} (current {})",
                request.generation,
                state.generation
            );
            return Ok(LoadOutcome::Stale {
                generation: request.generation,
            });
        }

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                log::warn!("Page fetch at {} failed: {}", request.cursor, err);
                state.last_error = Some(err.to_string());
                self.set_status(&mut state, SessionStatus::Error);
                return Err(err);
            }
        };

        let fetched = page.items.len();
        if page.total.is_some() {
            state.source_total = page.total;
        }
        let (added, duplicates) = state.append(page.items);
        let next_cursor = page
            .next_cursor
            .or_else(|| request.cursor.advance(fetched));

        let exhausted = fetched < request.page_size
            || page.is_last_page
            || next_cursor.is_none()
            || state.at_limit();
        if let Some(cursor) = next_cursor {
            state.cursor = cursor;
        }

        log::debug!(
            "Applied page at {}: {} added, {} duplicate(s), {} total",
            request.cursor,
            added,
            duplicates,
            state.items.len()
        );

        let status = if exhausted {
            SessionStatus::Exhausted
        } else {
            SessionStatus::Idle
        };
        self.set_status(&mut state, status);

        Ok(LoadOutcome::Appended(PageSummary {
            added,
            duplicates,
            exhausted,
        }))
    }
}

/// Releases the single-flight gate if its future is dropped before the page
/// is applied.
struct InFlight<S: DataSource> {
    inner: Arc<Inner<S>>,
    generation: u64,
    armed: bool,
}

impl<S: DataSource> InFlight<S> {
    fn disarm(mut self) -> Arc<Inner<S>> {
        self.armed = false;
        Arc::clone(&self.inner)
    }
}

impl<S: DataSource> Drop for InFlight<S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.inner.lock();
        if state.generation == self.generation && state.status == SessionStatus::Loading {
            log::debug!("Load for generation {} dropped", self.generation);
            self.inner.set_status(&mut state, SessionStatus::Idle);
        }
    }
}

/// Builder for [`CollectionSession`].
pub struct SessionBuilder<S: DataSource> {
    source: S,
    filter: FilterModel,
    page_size: usize,
    cap: Option<usize>,
    initial_items: Vec<S::Item>,
    initial_cursor: Option<Cursor>,
}

impl<S: DataSource + 'static> SessionBuilder<S> {
    pub fn filter(mut self, filter: FilterModel) -> Self {
        self.filter = filter;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Stop once this many items are loaded.
    pub fn cap(mut self, cap: Option<usize>) -> Self {
        self.cap = cap;
        self
    }

    /// Take page size and cap from configuration.
    pub fn config(self, config: &SessionConfig) -> Self {
        self.page_size(config.page_size).cap(config.cap)
    }

    /// Items already on screen before the first fetch.
    pub fn initial_items(mut self, items: Vec<S::Item>) -> Self {
        self.initial_items = items;
        self
    }

    /// Where the first fetch starts; defaults to just after the seed items.
    pub fn initial_cursor(mut self, cursor: Cursor) -> Self {
        self.initial_cursor = Some(cursor);
        self
    }

    pub fn build(self) -> Result<CollectionSession<S>> {
        if self.page_size == 0 {
            return Err(AppError::validation("page size must be > 0"));
        }
        if self.cap == Some(0) {
            return Err(AppError::validation("cap must be > 0 when set"));
        }

        let mut state = SessionState {
            items: Vec::with_capacity(self.initial_items.len()),
            seen: HashSet::new(),
            status: SessionStatus::Idle,
            cursor: Cursor::start(),
            generation: 0,
            filter: self.filter,
            cap: self.cap,
            source_total: None,
            last_error: None,
        };
        let (_, duplicates) = state.append(self.initial_items);
        if duplicates > 0 {
            log::debug!("Dropped {duplicates} duplicate seed item(s)");
        }
        state.cursor = self
            .initial_cursor
            .unwrap_or(Cursor::Offset(state.items.len()));
        if state.at_limit() {
            state.status = SessionStatus::Exhausted;
        }

        let (status_tx, _) = watch::channel(state.status);
        Ok(CollectionSession {
            inner: Arc::new(Inner {
                source: self.source,
                page_size: self.page_size,
                state: Mutex::new(state),
                status_tx,
            }),
        })
    }
}

/// Incrementally loaded, filterable collection over a [`DataSource`].
///
/// Cloning yields another handle to the same session.
pub struct CollectionSession<S: DataSource> {
    inner: Arc<Inner<S>>,
}

impl<S: DataSource> Clone for CollectionSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DataSource + 'static> CollectionSession<S> {
    pub fn builder(source: S) -> SessionBuilder<S> {
        SessionBuilder {
            source,
            filter: FilterModel::new(),
            page_size: DEFAULT_PAGE_SIZE,
            cap: None,
            initial_items: Vec::new(),
            initial_cursor: None,
        }
    }

    /// Create a session seeded with `initial_items` under `filter`.
    pub fn initialize(
        source: S,
        initial_items: Vec<S::Item>,
        filter: FilterModel,
        cap: Option<usize>,
    ) -> Result<Self> {
        Self::builder(source)
            .initial_items(initial_items)
            .filter(filter)
            .cap(cap)
            .build()
    }

    /// Request the next page.
    ///
    /// Resolves to `Skipped` without contacting the source when a request
    /// is already in flight or the listing is exhausted. From `Error` this
    /// retries the failed page.
    pub fn load_more(&self) -> LoadFuture {
        let begun = {
            let mut state = self.inner.lock();
            self.inner.begin(&mut state)
        };
        match begun {
            Ok(request) => self.dispatch(request),
            Err(reason) => {
                log::debug!("load_more skipped: {reason:?}");
                future::ready(Ok(LoadOutcome::Skipped(reason))).boxed()
            }
        }
    }

    /// Start over under `filter` and request its first page.
    ///
    /// Items are cleared and the generation bumped before this returns; any
    /// request still in flight resolves as `Stale`.
    pub fn reset(&self, filter: FilterModel) -> LoadFuture {
        let request = {
            let mut state = self.inner.lock();
            state.items.clear();
            state.seen.clear();
            state.cursor = Cursor::start();
            state.generation += 1;
            state.filter = filter;
            state.source_total = None;
            state.last_error = None;
            log::debug!("Session reset to generation {}", state.generation);
            self.inner.set_status(&mut state, SessionStatus::Idle);
            self.inner.begin(&mut state)
        };
        match request {
            Ok(request) => self.dispatch(request),
            Err(reason) => future::ready(Ok(LoadOutcome::Skipped(reason))).boxed(),
        }
    }

    fn dispatch(&self, request: FetchRequest) -> LoadFuture {
        let guard = InFlight {
            inner: Arc::clone(&self.inner),
            generation: request.generation,
            armed: true,
        };
        async move {
            let current = guard.inner.lock().generation;
            if current != request.generation {
                log::debug!(
                    "Skipping fetch for generation {} (current {})",
                    request.generation,
                    current
                );
                guard.disarm();
                return Ok(LoadOutcome::Stale {
                    generation: request.generation,
                });
            }

            let result = guard.inner.source.fetch_page(&request).await;
            let inner = guard.disarm();
            inner.complete(&request, result)
        }
        .boxed()
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Copy of the loaded items, in load order.
    pub fn items(&self) -> Vec<S::Item> {
        self.inner.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.lock().status
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn cursor(&self) -> Cursor {
        self.inner.lock().cursor.clone()
    }

    pub fn filter(&self) -> FilterModel {
        self.inner.lock().filter.clone()
    }

    pub fn cap(&self) -> Option<usize> {
        self.inner.lock().cap
    }

    pub fn page_size(&self) -> usize {
        self.inner.page_size
    }

    /// Message of the failure that put the session into `Error`.
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot<S::Item> {
        let state = self.inner.lock();
        SessionSnapshot {
            items: state.items.clone(),
            status: state.status,
            generation: state.generation,
            cursor: state.cursor.clone(),
            cap: state.cap,
            last_error: state.last_error.clone(),
        }
    }

    /// Watch status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status_tx.subscribe()
    }
}
