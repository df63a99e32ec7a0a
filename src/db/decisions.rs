use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    query, query_as,
    sqlite::{SqlitePool, SqliteRow},
    FromRow, Row,
};

use crate::{
    classify::{DecisionStore, StorageKey, StoreError},
    domain::{Configuration, Decision, Reason},
};

const CONFIG_SETTING: &str = "config";

#[derive(Clone)]
pub struct DecisionRepository {
    pool: SqlitePool,
}

impl DecisionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = query_as(r#"SELECT COUNT(*) FROM decisions"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl DecisionStore for DecisionRepository {
    async fn get(&self, key: &StorageKey) -> Result<Option<Decision>, StoreError> {
        let row = query_as::<_, DecisionRow>(
            r#"SELECT key, reason, recorded_at FROM decisions WHERE key = ?1"#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(DecisionRow::into_decision).transpose()
    }

    async fn set(&self, key: &StorageKey, reason: Reason) -> Result<(), StoreError> {
        query(
            r#"INSERT OR REPLACE INTO decisions (key, reason, recorded_at)
                VALUES (?1, ?2, ?3)"#,
        )
        .bind(key.as_str())
        .bind(reason.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        tracing::debug!(target: "db", key = %key, reason = %reason, "decision recorded");
        Ok(())
    }

    async fn get_config(&self) -> Result<Configuration, StoreError> {
        let value: Option<(String,)> = query_as(r#"SELECT value FROM settings WHERE name = ?1"#)
            .bind(CONFIG_SETTING)
            .fetch_optional(&self.pool)
            .await?;
        match value {
            Some((raw,)) => serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt {
                key: CONFIG_SETTING.to_string(),
                reason: err.to_string(),
            }),
            None => Ok(Configuration::default()),
        }
    }

    async fn set_config(&self, config: Configuration) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&config)?;
        query(r#"INSERT OR REPLACE INTO settings (name, value) VALUES (?1, ?2)"#)
            .bind(CONFIG_SETTING)
            .bind(raw)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        query(r#"DELETE FROM decisions"#).execute(&mut *tx).await?;
        query(r#"DELETE FROM settings"#).execute(&mut *tx).await?;
        tx.commit().await?;
        tracing::info!(target: "db", "all decisions and settings cleared");
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct DecisionRow {
    key: String,
    reason: String,
    recorded_at: Option<DateTime<Utc>>,
}

impl DecisionRow {
    fn into_decision(self) -> Result<Decision, StoreError> {
        let reason = self.reason.parse::<Reason>().map_err(|err| StoreError::Corrupt {
            key: self.key,
            reason: err.to_string(),
        })?;
        Ok(Decision {
            reason,
            recorded_at: self.recorded_at,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for DecisionRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            key: row.try_get("key")?,
            reason: row.try_get("reason")?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }
}
