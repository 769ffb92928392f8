// src/pipeline/browse.rs

//! Listing browse pipeline.
//!
//! Drives a collection session the way a scrolling view would: after every
//! page the view is scrolled to the last rendered item and the load trigger
//! decides whether to fetch again.

use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::filter::FilterModel;
use crate::models::{CatalogEntry, Config, Listing};
use crate::session::{CollectionSession, LoadOutcome, SessionStatus};
use crate::source::{DataSource, synthetic};
use crate::trigger::LoadTrigger;

/// How browsed entries are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per entry, rendered with the configured template
    #[default]
    Template,
    /// One JSON object per line
    Json,
}

/// Parameters of one browse run.
#[derive(Debug, Clone)]
pub struct BrowseOptions {
    pub listing: Listing,
    pub filter: FilterModel,
    /// Maximum number of pages to load
    pub pages: usize,
    /// Overrides `[session].page_size`
    pub page_size: Option<usize>,
    /// Overrides `[session].cap`
    pub cap: Option<usize>,
    /// Fetch from the remote API instead of synthetic data
    pub remote: bool,
    pub format: OutputFormat,
}

impl BrowseOptions {
    pub fn new(listing: Listing) -> Self {
        Self {
            listing,
            filter: FilterModel::with_registry(listing.registry()),
            pages: 1,
            page_size: None,
            cap: None,
            remote: false,
            format: OutputFormat::default(),
        }
    }
}

/// Browse run statistics.
#[derive(Debug, Clone, Serialize)]
pub struct BrowseStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub pages_loaded: usize,
    pub item_count: usize,
    pub retries: usize,
    pub status: SessionStatus,
    pub generation: u64,
}

impl BrowseStats {
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

/// Browse `options.listing`, writing each loaded entry to `out`.
pub async fn run_browse(
    config: &Config,
    options: &BrowseOptions,
    out: &mut dyn Write,
) -> Result<BrowseStats> {
    if options.pages == 0 {
        return Err(AppError::validation("pages must be > 0"));
    }
    log::info!(
        "Browsing {} ({} source)",
        options.listing.display_name(),
        if options.remote { "remote" } else { "synthetic" }
    );

    if options.remote {
        #[cfg(feature = "http")]
        {
            let source = crate::source::HttpSource::from_config(&config.source, options.listing)?;
            return browse(source, config, options, out).await;
        }
        #[cfg(not(feature = "http"))]
        return Err(AppError::config(
            "remote browsing requires the `http` feature",
        ));
    }

    let source = synthetic::source(options.listing, config.source.synthetic_count)
        .with_latency(Duration::from_millis(config.source.latency_ms));
    browse(source, config, options, out).await
}

async fn browse<S>(
    source: S,
    config: &Config,
    options: &BrowseOptions,
    out: &mut dyn Write,
) -> Result<BrowseStats>
where
    S: DataSource<Item = CatalogEntry> + 'static,
{
    let start_time = Utc::now();

    let mut builder = CollectionSession::builder(source)
        .config(&config.session)
        .filter(FilterModel::with_registry(options.listing.registry()));
    if let Some(page_size) = options.page_size {
        builder = builder.page_size(page_size);
    }
    if options.cap.is_some() {
        builder = builder.cap(options.cap);
    }
    let session = builder.build()?;
    let trigger = LoadTrigger::from_config(&config.trigger);

    // First page is loaded by applying the filter.
    let mut outcome = session.reset(options.filter.clone()).await;
    let mut pages_loaded = 0;
    let mut retries = 0;
    let mut written = 0;

    loop {
        match outcome {
            Ok(LoadOutcome::Appended(summary)) => {
                pages_loaded += 1;
                log::debug!(
                    "Page {}: {} new, {} duplicate(s)",
                    pages_loaded,
                    summary.added,
                    summary.duplicates
                );
            }
            Ok(LoadOutcome::Skipped(reason)) => {
                log::debug!("Load skipped: {reason:?}");
            }
            Ok(LoadOutcome::Stale { generation }) => {
                log::debug!("Discarded stale page of generation {generation}");
            }
            Err(e) if !e.is_retryable() => {
                log::error!("Page fetch failed: {}", e);
                return Err(e);
            }
            Err(e) => {
                if retries >= config.session.max_retries {
                    log::error!("Page fetch failed after {} retries: {}", retries, e);
                    return Err(e);
                }
                retries += 1;
                log::warn!(
                    "Page fetch failed ({}), retry {}/{}",
                    e,
                    retries,
                    config.session.max_retries
                );
            }
        }

        let items = session.items();
        written += write_entries(&items[written..], &config.output.template, options.format, out)?;

        if pages_loaded >= options.pages {
            break;
        }
        let next = match session.status() {
            SessionStatus::Error => trigger.retry(&session).await,
            _ => trigger.on_scroll(&session, items.len().saturating_sub(1)).await,
        };
        outcome = match next {
            Some(outcome) => outcome,
            None => break,
        };
    }
    out.flush()?;

    let stats = BrowseStats {
        start_time,
        end_time: Utc::now(),
        pages_loaded,
        item_count: session.len(),
        retries,
        status: session.status(),
        generation: session.generation(),
    };

    log::info!(
        "Loaded {} {} in {} page(s), session {}",
        stats.item_count,
        options.listing.display_name(),
        stats.pages_loaded,
        stats.status
    );

    Ok(stats)
}

fn write_entries(
    entries: &[CatalogEntry],
    template: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<usize> {
    for entry in entries {
        match format {
            OutputFormat::Template => writeln!(out, "{}", entry.format(template))?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(entry)?)?,
        }
    }
    Ok(entries.len())
}
