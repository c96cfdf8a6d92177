//! # Customer Repository
//!
//! Registered customers. Sales reference customers by name only, so
//! purchase history is a name join against `sales.customer_name`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use cafe_core::{Customer, CustomerActivity, CustomerInput};

const SELECT_CUSTOMER: &str = "SELECT id, name, email, phone, created_at FROM customers";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

/// Blank optional text is stored as NULL.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<Customer>> {
        let sql = format!("{SELECT_CUSTOMER} ORDER BY name, id");
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Customers whose name contains `query` (case-insensitive).
    pub async fn find_by_name(&self, query: &str) -> DbResult<Vec<Customer>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_all().await;
        }

        let sql = format!("{SELECT_CUSTOMER} WHERE name LIKE ?1 ORDER BY name, id");
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(format!("%{}%", query))
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Exact, case-sensitive name match.
    pub async fn find_exact(&self, name: &str) -> DbResult<Option<Customer>> {
        let sql = format!("{SELECT_CUSTOMER} WHERE name = ?1 ORDER BY id LIMIT 1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let sql = format!("{SELECT_CUSTOMER} WHERE id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn require(&self, id: i64) -> DbResult<Customer> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    pub async fn insert(&self, input: &CustomerInput) -> DbResult<Customer> {
        debug!(name = %input.name, "Inserting customer");

        let id = sqlx::query(
            "INSERT INTO customers (name, email, phone, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(input.name.trim())
        .bind(non_blank(input.email.as_deref()))
        .bind(non_blank(input.phone.as_deref()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.require(id).await
    }

    pub async fn update(&self, id: i64, input: &CustomerInput) -> DbResult<()> {
        debug!(id = %id, "Updating customer");

        let result =
            sqlx::query("UPDATE customers SET name = ?2, email = ?3, phone = ?4 WHERE id = ?1")
                .bind(id)
                .bind(input.name.trim())
                .bind(non_blank(input.email.as_deref()))
                .bind(non_blank(input.phone.as_deref()))
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Deletes the customer record. Past sales keep the name.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Registered customers with at least one sale, most purchases first.
    ///
    /// Sales carry a name, not a customer id, so they are totalled per name
    /// first. Customers sharing a name appear once, under the oldest id.
    pub async fn frequent(&self, limit: u32) -> DbResult<Vec<CustomerActivity>> {
        let rows = sqlx::query_as::<_, CustomerActivity>(
            r#"
            WITH spend AS (
                SELECT customer_name, COUNT(*) AS purchases, SUM(total_cents) AS total_spent_cents
                FROM sales
                GROUP BY customer_name
            ),
            registered AS (
                SELECT MIN(id) AS id, name
                FROM customers
                GROUP BY name
            )
            SELECT
                r.id AS id,
                r.name AS name,
                sp.purchases AS purchases,
                sp.total_spent_cents AS total_spent_cents
            FROM registered r
            INNER JOIN spend sp ON sp.customer_name = r.name
            ORDER BY purchases DESC, total_spent_cents DESC, r.name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn input(name: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            email: Some("  ".to_string()),
            phone: Some("987654321".to_string()),
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let ana = repo.insert(&input("Ana Torres")).await.unwrap();
        assert_eq!(ana.email, None);
        assert_eq!(ana.phone.as_deref(), Some("987654321"));

        repo.update(ana.id, &input("Ana T.")).await.unwrap();
        assert_eq!(repo.require(ana.id).await.unwrap().name, "Ana T.");

        assert_eq!(repo.find_by_name("ana").await.unwrap().len(), 1);
        assert!(repo.find_exact("ana t.").await.unwrap().is_none());
        assert!(repo.find_exact("Ana T.").await.unwrap().is_some());

        repo.delete(ana.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(matches!(
            repo.update(ana.id, &input("x")).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_frequent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();
        repo.insert(&input("Ana")).await.unwrap();
        repo.insert(&input("Luis")).await.unwrap();
        repo.insert(&input("Nobody")).await.unwrap();

        for (name, cents) in [("Ana", 500), ("Luis", 300), ("Luis", 200)] {
            sqlx::query("INSERT INTO sales (customer_name, total_cents) VALUES (?1, ?2)")
                .bind(name)
                .bind(cents)
                .execute(db.pool())
                .await
                .unwrap();
        }

        let rows = repo.frequent(10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Luis");
        assert_eq!(rows[0].purchases, 2);
        assert_eq!(rows[0].total_spent_cents, 500);
        assert_eq!(repo.frequent(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_frequent_counts_shared_names_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();
        let first = repo.insert(&input("Ana")).await.unwrap();
        repo.insert(&input("Ana")).await.unwrap();

        for cents in [700, 500] {
            sqlx::query("INSERT INTO sales (customer_name, total_cents) VALUES ('Ana', ?1)")
                .bind(cents)
                .execute(db.pool())
                .await
                .unwrap();
        }

        let rows = repo.frequent(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, first.id);
        assert_eq!(rows[0].purchases, 2);
        assert_eq!(rows[0].total_spent_cents, 1200);
    }
}
