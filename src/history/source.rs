use std::{collections::HashSet, path::Path, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    query_as,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use url::Url;

use super::HistoryError;

#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn has_visits(&self, url: &str) -> Result<bool, HistoryError>;
}

/// Chromium-format `History` database. A URL counts as visited when it has
/// at least one row in `visits`.
pub struct BrowserHistory {
    pool: SqlitePool,
}

impl BrowserHistory {
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .immutable(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open history database {}", path.display()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl HistorySource for BrowserHistory {
    async fn has_visits(&self, url: &str) -> Result<bool, HistoryError> {
        let (count,): (i64,) = query_as(
            r#"SELECT COUNT(*) FROM visits v JOIN urls u ON v.url = u.id WHERE u.url = ?1"#,
        )
        .bind(url)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}

#[derive(Debug, Default)]
pub struct VisitedUrls {
    urls: HashSet<String>,
}

impl VisitedUrls {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls
                .into_iter()
                .filter_map(|url| canonical_url(&url.into()))
                .collect(),
        }
    }

    /// One URL per line; blank lines and `#` comments are skipped.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read visited URL list {}", path.display()))?;
        Ok(Self::new(
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        ))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[async_trait]
impl HistorySource for VisitedUrls {
    async fn has_visits(&self, url: &str) -> Result<bool, HistoryError> {
        Ok(canonical_url(url).is_some_and(|url| self.urls.contains(&url)))
    }
}

// Page links reach the oracle serialized from `Url`; list entries must take the same shape.
fn canonical_url(raw: &str) -> Option<String> {
    match Url::parse(raw) {
        Ok(url) => Some(url.to_string()),
        Err(err) => {
            tracing::warn!(target: "history", url = raw, error = %err, "ignoring unparseable visited URL");
            None
        }
    }
}

pub struct NoHistory;

#[async_trait]
impl HistorySource for NoHistory {
    async fn has_visits(&self, _url: &str) -> Result<bool, HistoryError> {
        Ok(false)
    }
}
