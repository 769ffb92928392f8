//! Filter sidebar state.
//!
//! The sidebar edits a draft filter; nothing reaches the session until the
//! draft is applied.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::Result;
use crate::filter::{FacetRegistry, FacetValue, FilterModel};
use crate::models::Listing;
use crate::session::{CollectionSession, LoadFuture};
use crate::source::DataSource;

/// Draft and applied filters over one listing's facets.
#[derive(Debug, Clone)]
pub struct FilterSidebar {
    registry: Arc<FacetRegistry>,
    draft: FilterModel,
    applied: FilterModel,
}

impl FilterSidebar {
    pub fn new(registry: Arc<FacetRegistry>) -> Self {
        let empty = FilterModel::with_registry(Arc::clone(&registry));
        Self {
            registry,
            draft: empty.clone(),
            applied: empty,
        }
    }

    pub fn for_listing(listing: Listing) -> Self {
        Self::new(listing.registry())
    }

    pub fn registry(&self) -> &FacetRegistry {
        &self.registry
    }

    pub fn draft(&self) -> &FilterModel {
        &self.draft
    }

    /// Filter the session was last reset with.
    pub fn applied(&self) -> &FilterModel {
        &self.applied
    }

    /// The draft differs from the applied filter.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.applied
    }

    /// Select `option` of a multi-select facet, or deselect it if selected.
    pub fn toggle_option(&mut self, key: &str, option: &str) -> Result<()> {
        let mut selected = match self.draft.get(key) {
            Some(FacetValue::MultiSelect(selected)) => selected.clone(),
            _ => BTreeSet::new(),
        };
        if !selected.remove(option) {
            selected.insert(option.to_string());
        }

        self.draft = if selected.is_empty() {
            self.draft.remove(key)
        } else {
            self.draft.set(key, FacetValue::MultiSelect(selected))?
        };
        Ok(())
    }

    pub fn set_range(&mut self, key: &str, min: f64, max: f64) -> Result<()> {
        self.draft = self.draft.set(key, FacetValue::range(min, max))?;
        Ok(())
    }

    /// Set a text facet; blank text clears it.
    pub fn set_text(&mut self, key: &str, text: &str) -> Result<()> {
        self.draft = if text.trim().is_empty() {
            self.draft.remove(key)
        } else {
            self.draft.set(key, FacetValue::text(text))?
        };
        Ok(())
    }

    pub fn clear_facet(&mut self, key: &str) {
        self.draft = self.draft.remove(key);
    }

    /// Apply the draft: the session restarts under it.
    pub fn on_apply<S>(&mut self, session: &CollectionSession<S>) -> LoadFuture
    where
        S: DataSource + 'static,
    {
        log::debug!("Applying filter {:?}", self.draft);
        self.applied = self.draft.clone();
        session.reset(self.applied.clone())
    }

    /// Drop every constraint and restart the session unfiltered.
    pub fn on_reset_filters<S>(&mut self, session: &CollectionSession<S>) -> LoadFuture
    where
        S: DataSource + 'static,
    {
        self.draft = self.draft.clear();
        self.applied = self.draft.clone();
        session.reset(self.applied.clone())
    }
}
