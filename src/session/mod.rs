use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use futures::future::{join_all, try_join_all};
use serde::Serialize;

use crate::{
    classify::{Classifier, DecisionStore, StorageKey, StoreError},
    domain::{ApplyStyle, Listing, ListingId, Reason},
    history::HistoryOracle,
};

pub mod summary;

pub use summary::Summary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyResult {
    pub ignored: usize,
    pub visited: usize,
    pub failed: usize,
    /// History-derived decisions that could not be written back.
    pub unsaved: usize,
}

impl ApplyResult {
    pub fn to_check(&self, total: usize) -> usize {
        total.saturating_sub(self.ignored + self.visited)
    }
}

pub struct PageSession {
    store: Arc<dyn DecisionStore>,
    classifier: Classifier,
    listings: Vec<Listing>,
    classified: HashMap<ListingId, Reason>,
}

impl PageSession {
    pub fn new(
        listings: Vec<Listing>,
        store: Arc<dyn DecisionStore>,
        oracle: Arc<dyn HistoryOracle>,
    ) -> Self {
        Self {
            classifier: Classifier::new(store.clone(), oracle),
            store,
            listings,
            classified: HashMap::new(),
        }
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn total(&self) -> usize {
        self.listings.len()
    }

    pub fn classification(&self, id: ListingId) -> Option<Reason> {
        self.classified.get(&id).copied()
    }

    pub fn summary(&self, result: &ApplyResult) -> Summary {
        Summary::new(result, self.total())
    }

    /// Decisions inferred from history are written back only after the whole
    /// scan, so every read during the pass sees the store as it was when the
    /// pass started.
    pub async fn apply(&mut self, style: ApplyStyle) -> ApplyResult {
        let mut result = ApplyResult::default();
        let mut from_history = BTreeSet::new();

        for listing in &mut self.listings {
            let classification = match self.classifier.classify(listing).await {
                Ok(Some(classification)) => classification,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(
                        target: "session",
                        error = %err,
                        title = %listing.title,
                        "classification failed; listing left as is"
                    );
                    result.failed += 1;
                    continue;
                }
            };

            if classification.from_history {
                from_history.insert(StorageKey::from_label(&listing.title));
            }

            let reason = classification.decision.reason;
            self.classified.insert(listing.id, reason);
            listing.container.set_style(style);
            listing.container.annotate(reason);

            match reason {
                Reason::Ignored => result.ignored += 1,
                Reason::Visited => result.visited += 1,
            }
        }

        result.unsaved = self.record_visits(from_history).await;

        tracing::info!(
            target: "session",
            total = self.total(),
            ignored = result.ignored,
            visited = result.visited,
            failed = result.failed,
            style = %style,
            "classification pass finished"
        );
        result
    }

    async fn record_visits(&self, keys: BTreeSet<StorageKey>) -> usize {
        let store = &self.store;
        let outcomes = join_all(keys.iter().map(|key| async move {
            (key, store.set(key, Reason::Visited).await)
        }))
        .await;

        let mut unsaved = 0;
        for (key, outcome) in outcomes {
            if let Err(err) = outcome {
                tracing::warn!(target: "session", error = %err, key = %key, "failed to record visit");
                unsaved += 1;
            }
        }
        unsaved
    }

    pub fn reapply(&mut self, style: ApplyStyle) -> usize {
        let mut changed = 0;
        for listing in &mut self.listings {
            if self.classified.contains_key(&listing.id) && listing.container.set_style(style) {
                changed += 1;
            }
        }
        tracing::debug!(target: "session", style = %style, changed, "style reapplied");
        changed
    }

    /// Styling is left to the next classification pass.
    pub async fn mark_all_ignored(&self) -> Result<usize, StoreError> {
        let keys: Vec<StorageKey> = self
            .listings
            .iter()
            .filter(|listing| self.classification(listing.id).is_none())
            .map(|listing| StorageKey::from_label(&listing.title))
            .collect();

        let store = &self.store;
        try_join_all(keys.iter().map(|key| store.set(key, Reason::Ignored))).await?;

        tracing::info!(target: "session", marked = keys.len(), "unclassified listings ignored");
        Ok(keys.len())
    }

    pub async fn change_style(&mut self, next: ApplyStyle) -> Result<bool, StoreError> {
        let mut config = self.store.get_config().await?;
        if config.apply_style == next {
            return Ok(false);
        }
        self.reapply(next);
        config.apply_style = next;
        self.store.set_config(config).await?;
        Ok(true)
    }
}
