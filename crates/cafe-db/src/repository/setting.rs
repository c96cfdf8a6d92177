//! # Setting Repository
//!
//! Business key/value settings (name, currency symbol, thresholds).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use cafe_core::Setting;

#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
}

impl SettingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingRepository { pool }
    }

    pub async fn all(&self) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT key, value, description FROM settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Value of a key, `None` when unset.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Inserts or replaces the value. An existing description is kept.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, "Updating setting");

        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?1, ?2)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts the pair only when the key is absent.
    ///
    /// ## Returns
    /// `true` if a row was written.
    pub async fn insert_default(&self, key: &str, value: &str, description: &str) -> DbResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO settings (key, value, description) VALUES (?1, ?2, ?3)",
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_upsert_and_defaults() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = db.settings();

        assert!(settings.insert_default("theme", "light", "UI theme").await.unwrap());
        assert!(!settings.insert_default("theme", "dark", "ignored").await.unwrap());
        assert_eq!(settings.get("theme").await.unwrap().as_deref(), Some("light"));

        settings.set("theme", "dark").await.unwrap();
        settings.set("tax_rate", "18").await.unwrap();

        let all = settings.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].key, "theme");
        assert_eq!(all[1].value, "dark");
        assert_eq!(all[1].description, "UI theme");
        assert!(settings.get("missing").await.unwrap().is_none());
    }
}
