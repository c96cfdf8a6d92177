//! # Sale Repository
//!
//! Database operations for sales and sale lines.
//!
//! ## Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       commit_sale (one transaction)                     │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   ├── INSERT sales (customer, total, user)    → sale_id                │
//! │   │      └── trigger: audit_log "Sale #id - Customer: .. - Total: .."  │
//! │   ├── for each cart line:                                              │
//! │   │     ├── INSERT sale_lines                                          │
//! │   │     └── UPDATE products SET stock = stock - qty                    │
//! │   │              WHERE id = ? AND stock >= qty   (0 rows → conflict)   │
//! │   └── named customer not on file? INSERT customers                     │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any failure → ROLLBACK, then the error is returned. Nothing partial   │
//! │  remains and the caller's cart is untouched.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use cafe_core::types::resolve_customer_name;
use cafe_core::{DailyTotal, ProductSales, Sale, SaleDetail, SaleDraft, SaleLine};

const SELECT_SALE: &str = "SELECT id, customer_name, total_cents, created_at, user_id FROM sales";

/// `YYYY-MM-DD`, the form compared against `substr(created_at, 1, 10)`.
fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Persists a sale atomically.
    ///
    /// ## Arguments
    /// * `draft` - Lines and total from the sale builder
    /// * `customer_name` - Free text; blank means the generic walk-in name
    /// * `user_id` - Cashier committing the sale
    ///
    /// ## Returns
    /// The new sale id. On error the transaction has already been rolled back.
    pub async fn commit_sale(
        &self,
        draft: &SaleDraft,
        customer_name: &str,
        user_id: Option<i64>,
    ) -> DbResult<i64> {
        let (customer, registrable) = resolve_customer_name(customer_name);

        debug!(
            customer = %customer,
            lines = draft.lines.len(),
            total = %draft.total,
            "Committing sale"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        match write_sale(&mut tx, draft, &customer, registrable, user_id).await {
            Ok(sale_id) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
                info!(sale_id = sale_id, total = %draft.total, "Sale committed");
                Ok(sale_id)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                warn!(error = %err, "Sale commit rolled back");
                Err(err)
            }
        }
    }

    /// Most recent sales first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sql = format!("{SELECT_SALE} ORDER BY created_at DESC, id DESC LIMIT ?1");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Sales whose calendar day falls in `from..=to`, oldest first.
    pub async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "{SELECT_SALE} WHERE substr(created_at, 1, 10) BETWEEN ?1 AND ?2 ORDER BY created_at, id"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(day(from))
            .bind(day(to))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = sales.len(), from = %from, to = %to, "Listed sales");
        Ok(sales)
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sql = format!("{SELECT_SALE} WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets all lines of a sale, in the order they were committed.
    pub async fn lines(&self, sale_id: i64) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT id, sale_id, product_id, product_name, quantity, unit_price_cents, subtotal_cents
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// A sale and its lines.
    pub async fn get_with_lines(&self, id: i64) -> DbResult<Option<SaleDetail>> {
        let Some(sale) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let lines = self.lines(id).await?;

        Ok(Some(SaleDetail { sale, lines }))
    }

    /// Changes the customer name recorded on a sale.
    pub async fn update_customer(&self, id: i64, customer_name: &str) -> DbResult<()> {
        let (customer, _) = resolve_customer_name(customer_name);
        debug!(id = %id, customer = %customer, "Updating sale customer");

        let result = sqlx::query("UPDATE sales SET customer_name = ?2 WHERE id = ?1")
            .bind(id)
            .bind(customer)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Deletes a sale; its lines go with it. Stock is not restored.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Best sellers by units, optionally restricted to a day range.
    pub async fn top_products(
        &self,
        period: Option<(NaiveDate, NaiveDate)>,
        limit: u32,
    ) -> DbResult<Vec<ProductSales>> {
        let (from, to) = match period {
            Some((from, to)) => (day(from), day(to)),
            None => ("0000-01-01".to_string(), "9999-12-31".to_string()),
        };

        let rows = sqlx::query_as::<_, ProductSales>(
            r#"
            SELECT
                sl.product_name AS product_name,
                SUM(sl.quantity) AS quantity,
                SUM(sl.subtotal_cents) AS revenue_cents
            FROM sale_lines sl
            INNER JOIN sales s ON s.id = sl.sale_id
            WHERE substr(s.created_at, 1, 10) BETWEEN ?1 AND ?2
            GROUP BY sl.product_name
            ORDER BY quantity DESC, revenue_cents DESC, sl.product_name
            LIMIT ?3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Per-day totals for the `days` days ending on `today`. Days without
    /// sales are omitted.
    pub async fn daily_totals(&self, days: u32, today: NaiveDate) -> DbResult<Vec<DailyTotal>> {
        let first = today - Duration::days(i64::from(days.max(1)) - 1);

        let rows = sqlx::query_as::<_, DailyTotal>(
            r#"
            SELECT
                substr(created_at, 1, 10) AS day,
                COUNT(*) AS sales,
                SUM(total_cents) AS total_cents
            FROM sales
            WHERE substr(created_at, 1, 10) BETWEEN ?1 AND ?2
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(day(first))
        .bind(day(today))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// `(count, total_cents)` of sales in a day range.
    pub async fn totals_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<(i64, i64)> {
        let totals: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_cents), 0)
            FROM sales
            WHERE substr(created_at, 1, 10) BETWEEN ?1 AND ?2
            "#,
        )
        .bind(day(from))
        .bind(day(to))
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}

/// The body of [`SaleRepository::commit_sale`], run inside its transaction.
async fn write_sale(
    conn: &mut SqliteConnection,
    draft: &SaleDraft,
    customer: &str,
    registrable: bool,
    user_id: Option<i64>,
) -> DbResult<i64> {
    let sale_id = sqlx::query(
        "INSERT INTO sales (customer_name, total_cents, created_at, user_id) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(customer)
    .bind(draft.total.cents())
    .bind(Utc::now())
    .bind(user_id)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    for line in &draft.lines {
        sqlx::query(
            r#"
            INSERT INTO sale_lines (
                sale_id, product_id, product_name, quantity, unit_price_cents, subtotal_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(sale_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.unit_price.cents())
        .bind(line.subtotal.cents())
        .execute(&mut *conn)
        .await?;

        let updated =
            sqlx::query("UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2")
                .bind(line.product_id)
                .bind(line.quantity)
                .execute(&mut *conn)
                .await?
                .rows_affected();

        if updated == 0 {
            return Err(DbError::StockConflict {
                product_id: line.product_id,
                requested: line.quantity,
            });
        }
    }

    if registrable {
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM customers WHERE name = ?1 LIMIT 1")
                .bind(customer)
                .fetch_optional(&mut *conn)
                .await?;

        if existing.is_none() {
            debug!(customer = %customer, "Registering new customer from sale");
            sqlx::query("INSERT INTO customers (name, created_at) VALUES (?1, ?2)")
                .bind(customer)
                .bind(Utc::now())
                .execute(&mut *conn)
                .await?;
        }
    }

    Ok(sale_id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use cafe_core::{Product, ProductInput, SaleBuilder};

    async fn setup() -> (Database, Product, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let latte = db
            .products()
            .insert(&ProductInput {
                name: "Latte".to_string(),
                category: "Hot Drinks".to_string(),
                price_cents: 350,
                stock: 10,
                min_stock: 2,
                description: String::new(),
            })
            .await
            .unwrap();
        let muffin = db
            .products()
            .insert(&ProductInput {
                name: "Muffin".to_string(),
                category: "Pastry".to_string(),
                price_cents: 250,
                stock: 5,
                min_stock: 1,
                description: String::new(),
            })
            .await
            .unwrap();
        (db, latte, muffin)
    }

    #[tokio::test]
    async fn test_commit_writes_everything() {
        let (db, latte, muffin) = setup().await;
        let mut cart = SaleBuilder::new();
        cart.add(&latte, 4).unwrap();
        cart.add(&muffin, 2).unwrap();

        let sale_id = db
            .sales()
            .commit_sale(&cart.draft().unwrap(), "  Ana  ", None)
            .await
            .unwrap();

        let detail = db.sales().get_with_lines(sale_id).await.unwrap().unwrap();
        assert_eq!(detail.sale.customer_name, "Ana");
        assert_eq!(detail.sale.total_cents, 1900);
        assert_eq!(detail.lines.len(), 2);
        assert_eq!(detail.lines[0].subtotal_cents, 1400);

        assert_eq!(db.products().require(latte.id).await.unwrap().stock, 6);
        assert_eq!(db.products().require(muffin.id).await.unwrap().stock, 3);
        assert!(db.customers().find_exact("Ana").await.unwrap().is_some());

        let audit = db.audit().recent(10).await.unwrap();
        assert_eq!(
            audit[0].detail,
            format!("Sale #{} - Customer: Ana - Total: 19.00", sale_id)
        );
    }

    #[tokio::test]
    async fn test_generic_and_existing_customers_not_duplicated() {
        let (db, latte, _) = setup().await;
        let mut cart = SaleBuilder::new();
        cart.add(&latte, 1).unwrap();
        let draft = cart.draft().unwrap();

        db.sales().commit_sale(&draft, "", None).await.unwrap();
        db.sales().commit_sale(&draft, "general customer", None).await.unwrap();
        db.sales().commit_sale(&draft, "Luis", None).await.unwrap();
        db.sales().commit_sale(&draft, "Luis", None).await.unwrap();
        db.sales().commit_sale(&draft, "luis", None).await.unwrap();

        let names: Vec<String> = db
            .customers()
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Luis", "luis"]);

        let recent = db.sales().list_recent(10).await.unwrap();
        assert!(recent.iter().any(|s| s.customer_name == "General Customer"));
    }

    #[tokio::test]
    async fn test_stock_conflict_rolls_back() {
        let (db, latte, muffin) = setup().await;
        let mut cart = SaleBuilder::new();
        cart.add(&latte, 2).unwrap();
        cart.add(&muffin, 5).unwrap();
        let draft = cart.draft().unwrap();

        // Another till sold muffins in the meantime
        db.products().set_stock(muffin.id, 4).await.unwrap();

        let err = db
            .sales()
            .commit_sale(&draft, "Rosa", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StockConflict { .. }));

        assert!(db.sales().list_recent(10).await.unwrap().is_empty());
        assert_eq!(db.products().require(latte.id).await.unwrap().stock, 10);
        assert!(db.customers().find_exact("Rosa").await.unwrap().is_none());
        assert!(db.audit().recent(10).await.unwrap().is_empty());
        assert_eq!(cart.total_quantity(), 7);
    }

    #[tokio::test]
    async fn test_delete_cascades_lines() {
        let (db, latte, _) = setup().await;
        let mut cart = SaleBuilder::new();
        cart.add(&latte, 3).unwrap();
        let sale_id = db
            .sales()
            .commit_sale(&cart.draft().unwrap(), "Ana", None)
            .await
            .unwrap();

        db.sales().delete(sale_id).await.unwrap();
        assert!(db.sales().lines(sale_id).await.unwrap().is_empty());
        assert!(matches!(
            db.sales().delete(sale_id).await,
            Err(DbError::NotFound { .. })
        ));
        assert_eq!(db.products().require(latte.id).await.unwrap().stock, 7);
    }

    #[tokio::test]
    async fn test_aggregates() {
        let (db, latte, muffin) = setup().await;
        let mut cart = SaleBuilder::new();
        cart.add(&latte, 3).unwrap();
        cart.add(&muffin, 1).unwrap();
        db.sales()
            .commit_sale(&cart.draft().unwrap(), "Ana", None)
            .await
            .unwrap();

        let today = Utc::now().date_naive();

        let top = db.sales().top_products(Some((today, today)), 5).await.unwrap();
        assert_eq!(top[0].product_name, "Latte");
        assert_eq!(top[0].quantity, 3);
        assert_eq!(top[0].revenue_cents, 1050);

        let days = db.sales().daily_totals(7, today).await.unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].total_cents, 1300);

        assert_eq!(
            db.sales().totals_between(today, today).await.unwrap(),
            (1, 1300)
        );
        assert_eq!(db.sales().list_between(today, today).await.unwrap().len(), 1);

        let yesterday = today - Duration::days(1);
        assert!(db
            .sales()
            .list_between(yesterday, yesterday)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_customer() {
        let (db, latte, _) = setup().await;
        let mut cart = SaleBuilder::new();
        cart.add(&latte, 1).unwrap();
        let id = db
            .sales()
            .commit_sale(&cart.draft().unwrap(), "Ana", None)
            .await
            .unwrap();

        db.sales().update_customer(id, "Ana Torres").await.unwrap();
        assert_eq!(
            db.sales().require_for_test(id).await.customer_name,
            "Ana Torres"
        );
    }

    impl SaleRepository {
        async fn require_for_test(&self, id: i64) -> Sale {
            self.get_by_id(id).await.unwrap().unwrap()
        }
    }
}
