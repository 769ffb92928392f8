//! Scroll-proximity load trigger.

use crate::error::Result;
use crate::models::TriggerConfig;
use crate::session::{CollectionSession, LoadOutcome, SessionStatus};
use crate::source::DataSource;

/// Requests the next page when the viewer nears the end of the rendered items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTrigger {
    proximity: usize,
}

impl LoadTrigger {
    /// Fire when at most `proximity` rendered items remain after the last
    /// visible one.
    pub fn new(proximity: usize) -> Self {
        Self { proximity }
    }

    pub fn from_config(config: &TriggerConfig) -> Self {
        Self::new(config.proximity)
    }

    pub fn proximity(&self) -> usize {
        self.proximity
    }

    /// Whether a load should start.
    ///
    /// `last_visible` is the index of the last item on screen. Only an idle
    /// session loads; `Error` waits for an explicit [`retry`](Self::retry).
    pub fn should_load(&self, status: SessionStatus, rendered: usize, last_visible: usize) -> bool {
        if status != SessionStatus::Idle {
            return false;
        }
        let remaining = rendered.saturating_sub(last_visible.saturating_add(1));
        remaining <= self.proximity
    }

    /// Handle a scroll to `last_visible`, loading the next page if due.
    pub async fn on_scroll<S>(
        &self,
        session: &CollectionSession<S>,
        last_visible: usize,
    ) -> Option<Result<LoadOutcome>>
    where
        S: DataSource + 'static,
    {
        if !self.should_load(session.status(), session.len(), last_visible) {
            return None;
        }
        log::debug!(
            "Scrolled to {} of {} rendered items, loading more",
            last_visible,
            session.len()
        );
        Some(session.load_more().await)
    }

    /// Retry a failed page on user request.
    pub async fn retry<S>(&self, session: &CollectionSession<S>) -> Option<Result<LoadOutcome>>
    where
        S: DataSource + 'static,
    {
        if session.status() != SessionStatus::Error {
            return None;
        }
        log::info!("Retrying failed page at {}", session.cursor());
        Some(session.load_more().await)
    }
}

impl Default for LoadTrigger {
    fn default() -> Self {
        Self::from_config(&TriggerConfig::default())
    }
}
