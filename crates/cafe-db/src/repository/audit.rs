//! # Audit Repository
//!
//! Read side of `audit_log`. Rows are written by the `trg_sales_audit`
//! trigger, never by application code.

use sqlx::SqlitePool;

use crate::error::DbResult;
use cafe_core::AuditEntry;

#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Newest entries first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            "SELECT id, action, detail, created_at FROM audit_log ORDER BY id DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
