use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;

use crate::{
    domain::{Decision, Listing},
    history::{HistoryError, HistoryOracle},
};

use super::{
    key::StorageKey,
    store::{DecisionStore, StoreError},
};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub decision: Decision,
    pub from_history: bool,
}

// History is only consulted when the store has nothing for the title.
#[derive(Clone)]
pub struct Classifier {
    store: Arc<dyn DecisionStore>,
    oracle: Arc<dyn HistoryOracle>,
}

impl Classifier {
    pub fn new(store: Arc<dyn DecisionStore>, oracle: Arc<dyn HistoryOracle>) -> Self {
        Self { store, oracle }
    }

    pub async fn classify(&self, listing: &Listing) -> Result<Option<Classification>, ClassifyError> {
        let key = StorageKey::from_label(&listing.title);
        if let Some(decision) = self.store.get(&key).await? {
            tracing::trace!(target: "classify", key = %key, reason = %decision.reason, "stored decision");
            return Ok(Some(Classification {
                decision,
                from_history: false,
            }));
        }

        let answers =
            join_all(listing.links.iter().map(|link| self.oracle.is_visited(link.as_str()))).await;

        let mut first_error = None;
        for answer in answers {
            match answer {
                Ok(true) => {
                    tracing::debug!(target: "classify", key = %key, "visited according to history");
                    return Ok(Some(Classification {
                        decision: Decision::from_history(),
                        from_history: true,
                    }));
                }
                Ok(false) => {}
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        // a failed lookup only matters when no other link was visited
        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(None),
        }
    }
}
