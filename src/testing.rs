//! In-memory fakes for the store and history boundaries.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use url::Url;

use crate::{
    classify::{DecisionStore, StorageKey, StoreError},
    domain::{Configuration, Decision, Listing, ListingId, Reason},
    history::{HistoryError, HistoryOracle},
};

pub fn listing(index: usize, title: &str, links: &[&str]) -> Listing {
    let links = links
        .iter()
        .map(|link| Url::parse(link).expect("test link"))
        .collect();
    Listing::new(ListingId(index), title, links)
}

#[derive(Default)]
pub struct MemoryDecisionStore {
    entries: Mutex<HashMap<StorageKey, Decision>>,
    config: Mutex<Option<Configuration>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decision(self, label: &str, reason: Reason) -> Self {
        self.entries
            .lock()
            .insert(StorageKey::from_label(label), Decision::recorded(reason, Utc::now()));
        self
    }

    /// Looks an entry up without counting it as a read.
    pub fn peek(&self, label: &str) -> Option<Decision> {
        self.entries.lock().get(&StorageKey::from_label(label)).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl DecisionStore for MemoryDecisionStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<Decision>, StoreError> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &StorageKey, reason: Reason) -> Result<(), StoreError> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .insert(key.clone(), Decision::recorded(reason, Utc::now()));
        Ok(())
    }

    async fn get_config(&self) -> Result<Configuration, StoreError> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let config = *self.config.lock();
        Ok(config.unwrap_or_default())
    }

    async fn set_config(&self, config: Configuration) -> Result<(), StoreError> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.config.lock() = Some(config);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.check()?;
        self.entries.lock().clear();
        *self.config.lock() = None;
        Ok(())
    }
}

/// Oracle answering from a fixed set of visited URLs, logging every query.
#[derive(Default)]
pub struct StaticOracle {
    visited: HashSet<String>,
    failing: HashSet<String>,
    queries: Mutex<Vec<String>>,
}

impl StaticOracle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn visited<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            visited: urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Lookups for `url` fail as if the background side had gone away.
    pub fn failing_for(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl HistoryOracle for StaticOracle {
    async fn is_visited(&self, url: &str) -> Result<bool, HistoryError> {
        self.queries.lock().push(url.to_string());
        if self.failing.contains(url) {
            return Err(HistoryError::Disconnected);
        }
        Ok(self.visited.contains(url))
    }
}
