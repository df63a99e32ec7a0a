use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;

use crate::domain::{Configuration, Decision, Reason};

use super::key::StorageKey;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("decision store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    #[error("corrupt record for `{key}`: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("failed to encode configuration: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait DecisionStore: Send + Sync {
    async fn get(&self, key: &StorageKey) -> Result<Option<Decision>, StoreError>;

    async fn set(&self, key: &StorageKey, reason: Reason) -> Result<(), StoreError>;

    async fn get_config(&self) -> Result<Configuration, StoreError>;

    async fn set_config(&self, config: Configuration) -> Result<(), StoreError>;

    /// Removes every decision and the configuration. Irreversible.
    async fn clear_all(&self) -> Result<(), StoreError>;
}

pub struct DryRunStore {
    inner: Arc<dyn DecisionStore>,
    overlay: Mutex<Overlay>,
}

#[derive(Default)]
struct Overlay {
    cleared: bool,
    decisions: HashMap<StorageKey, Decision>,
    config: Option<Configuration>,
}

impl DryRunStore {
    pub fn new(inner: Arc<dyn DecisionStore>) -> Self {
        Self {
            inner,
            overlay: Mutex::new(Overlay::default()),
        }
    }

    pub fn pending(&self) -> Vec<(StorageKey, Decision)> {
        let overlay = self.overlay.lock();
        let mut pending: Vec<_> = overlay
            .decisions
            .iter()
            .map(|(key, decision)| (key.clone(), decision.clone()))
            .collect();
        pending.sort_by(|a, b| a.0.cmp(&b.0));
        pending
    }
}

#[async_trait]
impl DecisionStore for DryRunStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<Decision>, StoreError> {
        {
            let overlay = self.overlay.lock();
            if let Some(decision) = overlay.decisions.get(key) {
                return Ok(Some(decision.clone()));
            }
            if overlay.cleared {
                return Ok(None);
            }
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &StorageKey, reason: Reason) -> Result<(), StoreError> {
        self.overlay
            .lock()
            .decisions
            .insert(key.clone(), Decision::recorded(reason, Utc::now()));
        Ok(())
    }

    async fn get_config(&self) -> Result<Configuration, StoreError> {
        let staged = {
            let overlay = self.overlay.lock();
            overlay
                .config
                .or_else(|| overlay.cleared.then(Configuration::default))
        };
        match staged {
            Some(config) => Ok(config),
            None => self.inner.get_config().await,
        }
    }

    async fn set_config(&self, config: Configuration) -> Result<(), StoreError> {
        self.overlay.lock().config = Some(config);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        let mut overlay = self.overlay.lock();
        *overlay = Overlay {
            cleared: true,
            ..Overlay::default()
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::ApplyStyle, testing::MemoryDecisionStore};

    #[tokio::test]
    async fn dry_run_never_reaches_inner_store() {
        let inner = Arc::new(MemoryDecisionStore::new().with_decision("Aoba", Reason::Ignored));
        let dry = DryRunStore::new(inner.clone());

        let key = StorageKey::from_label("Kita");
        dry.set(&key, Reason::Visited).await.unwrap();
        dry.set_config(Configuration {
            apply_style: ApplyStyle::Hide,
        })
        .await
        .unwrap();

        assert_eq!(dry.get(&key).await.unwrap().unwrap().reason, Reason::Visited);
        assert_eq!(
            dry.get(&StorageKey::from_label("Aoba")).await.unwrap().unwrap().reason,
            Reason::Ignored
        );
        assert_eq!(dry.get_config().await.unwrap().apply_style, ApplyStyle::Hide);

        assert_eq!(inner.writes(), 0);
        assert!(inner.get(&key).await.unwrap().is_none());
        assert_eq!(dry.pending().len(), 1);
    }

    #[tokio::test]
    async fn dry_clear_hides_inner_decisions() {
        let inner = Arc::new(MemoryDecisionStore::new().with_decision("Aoba", Reason::Ignored));
        let dry = DryRunStore::new(inner.clone());

        dry.clear_all().await.unwrap();

        assert!(dry.get(&StorageKey::from_label("Aoba")).await.unwrap().is_none());
        assert_eq!(dry.get_config().await.unwrap(), Configuration::default());
        assert!(inner.get(&StorageKey::from_label("Aoba")).await.unwrap().is_some());
    }
}
