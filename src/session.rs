//! View-session wiring: one store subscription driving one mirror.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::LookupConfig;
use crate::data::AcronymRecord;
use crate::errors::LookupError;
use crate::mirror::RecordMirror;
use crate::search;
use crate::stats::{self, LookupOverview};
use crate::store::{RecordStore, SubscriptionHandle};
use crate::submit::{self, EntryForm, SubmittedEntry};

/// Live lookup view over one store collection.
///
/// The session owns the subscription that keeps its mirror current; writes
/// round-trip through the store and come back through the same feed, so the
/// mirror never diverges from last-observed store state. Dropping the
/// session (or calling `detach`) releases the subscription.
pub struct LookupSession {
    store: Arc<dyn RecordStore>,
    mirror: RecordMirror,
    subscription: Option<SubscriptionHandle>,
    config: LookupConfig,
}

impl LookupSession {
    /// Subscribe the configured collection into a fresh mirror.
    ///
    /// The mirror holds the store's initial snapshot before this returns.
    pub fn attach(store: Arc<dyn RecordStore>, config: LookupConfig) -> Result<Self, LookupError> {
        let mirror = RecordMirror::new();
        let feed = mirror.clone();
        let subscription = store.subscribe(
            &config.collection,
            Arc::new(move |records| feed.replace(records)),
        )?;
        debug!(collection = %config.collection, "lookup session attached");
        Ok(Self {
            store,
            mirror,
            subscription: Some(subscription),
            config,
        })
    }

    /// Filter the current mirror snapshot against `query`.
    pub fn search(&self, query: &str) -> Vec<AcronymRecord> {
        let snapshot = self.mirror.snapshot();
        search::filter(&snapshot, query, self.config.search)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Validate, normalize, and submit one entry to the store.
    pub fn submit(&self, form: &EntryForm) -> Result<SubmittedEntry, LookupError> {
        submit::submit_entry(
            self.store.as_ref(),
            &self.config.collection,
            form,
            self.config.team,
        )
    }

    /// Quick-stats payload for the current snapshot.
    pub fn overview(&self) -> LookupOverview {
        stats::overview(&self.mirror.snapshot(), self.config.recent_limit)
    }

    /// Current mirrored records in store order.
    pub fn records(&self) -> Vec<AcronymRecord> {
        self.mirror.snapshot()
    }

    /// Number of snapshot deliveries observed so far.
    pub fn update_count(&self) -> u64 {
        self.mirror.update_count()
    }

    /// Wait until more snapshots than `last_seen` have been delivered.
    pub fn wait_for_update(&self, last_seen: u64, timeout: Duration) -> u64 {
        self.mirror.wait_for_update(last_seen, timeout)
    }

    /// Session settings.
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Release the subscription explicitly.
    ///
    /// Equivalent to dropping the session; provided so teardown can be a
    /// visible step in calling code.
    pub fn detach(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }
    }
}
