use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, Sqlite, Transaction};
use tracing::{debug, warn};

use orderflow_core::domain::status::{StatusCategory, StatusConfig};
use orderflow_core::workflow::store::{StatusSnapshot, StatusStore, StoreError};

use super::RepositoryError;
use crate::DbPool;

/// SQLite home of the status configuration. Each status is one row whose
/// `payload` column holds the full JSON record.
#[derive(Clone)]
pub struct SqlStatusStore {
    pool: DbPool,
}

impl SqlStatusStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn load_category(
        &self,
        category: StatusCategory,
    ) -> Result<Vec<StatusConfig>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT payload FROM status_config WHERE category = ? ORDER BY position ASC, name ASC",
        )
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_status).collect()
    }

    pub async fn current_revision(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT revision FROM status_config_revision WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| revision_from_row(&row)).unwrap_or(Ok(0))
    }

    pub async fn load_snapshot(&self) -> Result<StatusSnapshot, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let revision = sqlx::query("SELECT revision FROM status_config_revision WHERE id = 1")
            .fetch_optional(&mut *tx)
            .await?
            .map(|row| revision_from_row(&row))
            .unwrap_or(Ok(0))?;
        let rows = sqlx::query(
            "SELECT payload FROM status_config ORDER BY category ASC, position ASC, name ASC",
        )
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let mut snapshot = StatusSnapshot { revision, ..StatusSnapshot::default() };
        for row in &rows {
            let status = row_to_status(row)?;
            match status.category {
                StatusCategory::Quote => snapshot.quote.push(status),
                StatusCategory::Order => snapshot.order.push(status),
            }
        }
        Ok(snapshot)
    }

    /// Replaces both categories in one transaction, guarded by the revision
    /// row. Any failure rolls the whole write back.
    pub async fn replace_all(
        &self,
        expected_revision: u64,
        quote: &[StatusConfig],
        order: &[StatusConfig],
    ) -> Result<u64, RepositoryError> {
        let expected = to_db_revision(expected_revision)?;
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        // Bumping first takes the write lock before anything is read.
        let bumped = sqlx::query(
            "UPDATE status_config_revision
             SET revision = revision + 1, updated_at = ?
             WHERE id = 1 AND revision = ?",
        )
        .bind(&now)
        .bind(expected)
        .execute(&mut *tx)
        .await?;

        if bumped.rows_affected() == 0 {
            let actual = sqlx::query("SELECT revision FROM status_config_revision WHERE id = 1")
                .fetch_optional(&mut *tx)
                .await?
                .map(|row| revision_from_row(&row))
                .unwrap_or(Ok(0))?;
            tx.rollback().await?;
            warn!(
                event_name = "db.status_config.revision_conflict",
                expected_revision,
                actual_revision = actual,
                "status configuration write rejected"
            );
            return Err(RepositoryError::Conflict { expected: expected_revision, actual });
        }

        sqlx::query("DELETE FROM status_config").execute(&mut *tx).await?;
        insert_category(&mut tx, quote, &now).await?;
        insert_category(&mut tx, order, &now).await?;
        tx.commit().await?;

        let revision = expected_revision + 1;
        debug!(
            event_name = "db.status_config.replaced",
            revision,
            quote_statuses = quote.len(),
            order_statuses = order.len(),
            "status configuration replaced"
        );
        Ok(revision)
    }
}

#[async_trait]
impl StatusStore for SqlStatusStore {
    async fn get(&self, category: StatusCategory) -> Result<Vec<StatusConfig>, StoreError> {
        Ok(self.load_category(category).await?)
    }

    async fn revision(&self) -> Result<u64, StoreError> {
        Ok(self.current_revision().await?)
    }

    async fn snapshot(&self) -> Result<StatusSnapshot, StoreError> {
        Ok(self.load_snapshot().await?)
    }

    async fn put_all(
        &self,
        expected_revision: u64,
        quote: &[StatusConfig],
        order: &[StatusConfig],
    ) -> Result<u64, StoreError> {
        Ok(self.replace_all(expected_revision, quote, order).await?)
    }
}

async fn insert_category(
    tx: &mut Transaction<'_, Sqlite>,
    statuses: &[StatusConfig],
    now: &str,
) -> Result<(), RepositoryError> {
    for status in statuses {
        let payload =
            serde_json::to_string(status).map_err(|e| RepositoryError::Decode(e.to_string()))?;
        sqlx::query(
            "INSERT INTO status_config (id, category, name, position, payload, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&status.id.0)
        .bind(status.category.as_str())
        .bind(&status.name)
        .bind(status.order)
        .bind(payload)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn row_to_status(row: &sqlx::sqlite::SqliteRow) -> Result<StatusConfig, RepositoryError> {
    let payload: String =
        row.try_get("payload").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    serde_json::from_str(&payload).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn revision_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<u64, RepositoryError> {
    let revision: i64 =
        row.try_get("revision").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    u64::try_from(revision)
        .map_err(|_| RepositoryError::Decode(format!("negative revision {revision}")))
}

fn to_db_revision(revision: u64) -> Result<i64, RepositoryError> {
    i64::try_from(revision)
        .map_err(|_| RepositoryError::Decode(format!("revision {revision} is out of range")))
}

#[cfg(test)]
mod tests {
    use orderflow_core::domain::status::{StatusCategory, StatusConfig, StatusId};

    use super::SqlStatusStore;
    use crate::repositories::RepositoryError;
    use crate::{connect_with_settings, migrations};

    async fn store() -> SqlStatusStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlStatusStore::new(pool)
    }

    fn status(category: StatusCategory, name: &str, order: i32) -> StatusConfig {
        let mut status = StatusConfig::placeholder(category, name, order);
        status.id = StatusId(format!("status-{category}-{name}"));
        status
    }

    #[tokio::test]
    async fn empty_store_reports_revision_zero() {
        let store = store().await;
        assert_eq!(store.current_revision().await.expect("revision"), 0);
        assert!(store.load_category(StatusCategory::Quote).await.expect("load").is_empty());
    }

    #[tokio::test]
    async fn category_rows_come_back_in_position_order() {
        let store = store().await;
        let quote = vec![status(StatusCategory::Quote, "sent", 2), status(StatusCategory::Quote, "pending", 1)];

        store.replace_all(0, &quote, &[]).await.expect("write");

        let names: Vec<String> = store
            .load_category(StatusCategory::Quote)
            .await
            .expect("load")
            .into_iter()
            .map(|status| status.name)
            .collect();
        assert_eq!(names, vec!["pending", "sent"]);
    }

    #[tokio::test]
    async fn stale_revision_is_rejected() {
        let store = store().await;
        store.replace_all(0, &[status(StatusCategory::Quote, "pending", 1)], &[]).await.expect("first");

        let error = store.replace_all(0, &[], &[]).await.expect_err("stale");
        assert!(matches!(error, RepositoryError::Conflict { expected: 0, actual: 1 }));
        assert_eq!(store.load_category(StatusCategory::Quote).await.expect("load").len(), 1);
    }
}
