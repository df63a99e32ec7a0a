use async_trait::async_trait;
use thiserror::Error;

pub mod service;
pub mod source;

pub use service::{HistoryClient, HistoryService};
pub use source::{BrowserHistory, HistorySource, NoHistory, VisitedUrls};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history service is not running")]
    Disconnected,
    #[error("history database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait HistoryOracle: Send + Sync {
    async fn is_visited(&self, url: &str) -> Result<bool, HistoryError>;
}
