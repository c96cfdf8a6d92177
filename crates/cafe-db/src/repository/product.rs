//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Listing, name/category search and category filter
//! - CRUD operations
//! - Absolute stock adjustment and low-stock queries
//!
//! ## Stock Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Who changes products.stock?                                           │
//! │                                                                         │
//! │  set_stock(id, n)          absolute, from the inventory screen          │
//! │  SaleRepository::commit    stock = stock - qty WHERE stock >= qty       │
//! │                                                                         │
//! │  CHECK (stock >= 0) in the schema backs both paths.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use cafe_core::{Product, ProductInput};

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, category, price_cents, stock, min_stock, description, created_at
    FROM products
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let lattes = repo.search("latte").await?;
/// let product = repo.require(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products ordered by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} ORDER BY name, id");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Products whose name or category contains `query` (case-insensitive).
    ///
    /// An empty query lists everything.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, "Searching products");

        if query.is_empty() {
            return self.list_all().await;
        }

        let pattern = format!("%{}%", query);
        let sql = format!(
            "{SELECT_PRODUCT} WHERE name LIKE ?1 OR category LIKE ?1 ORDER BY name, id"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Products in one category (exact match).
    pub async fn by_category(&self, category: &str) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE category = ?1 ORDER BY name, id");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(category.trim())
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Distinct non-empty categories, sorted.
    pub async fn categories(&self) -> DbResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM products WHERE category <> '' ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Like [`ProductRepository::get_by_id`], but a missing row is an error.
    pub async fn require(&self, id: i64) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// The stored product with its generated id.
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        debug!(name = %input.name, "Inserting product");

        let now = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO products (name, category, price_cents, stock, min_stock, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(input.name.trim())
        .bind(input.category.trim())
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(&input.description)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.require(id).await
    }

    /// Replaces every editable field of a product.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<()> {
        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                price_cents = ?4,
                stock = ?5,
                min_stock = ?6,
                description = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.category.trim())
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(&input.description)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Sets the stock level to an absolute value.
    ///
    /// A negative value is rejected by the schema CHECK constraint.
    pub async fn set_stock(&self, id: i64, stock: i64) -> DbResult<()> {
        debug!(id = %id, stock = %stock, "Setting stock");

        let result = sqlx::query("UPDATE products SET stock = ?2 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// Products referenced by past sale lines cannot be deleted
    /// (`ForeignKeyViolation`).
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Products at or below their minimum stock, lowest first.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE stock <= min_stock ORDER BY stock, name");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Counts products (for the dashboard).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn repo() -> ProductRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
    }

    fn input(name: &str, category: &str, stock: i64, min_stock: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            category: category.to_string(),
            price_cents: 350,
            stock,
            min_stock,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repo().await;

        let latte = repo.insert(&input("Latte", "Hot Drinks", 10, 3)).await.unwrap();
        assert!(latte.id > 0);

        let fetched = repo.require(latte.id).await.unwrap();
        assert_eq!(fetched.name, "Latte");
        assert_eq!(fetched.price_cents, 350);
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_and_categories() {
        let repo = repo().await;
        repo.insert(&input("Latte", "Hot Drinks", 10, 3)).await.unwrap();
        repo.insert(&input("Iced Latte", "Cold Drinks", 10, 3)).await.unwrap();
        repo.insert(&input("Croissant", "Pastry", 10, 3)).await.unwrap();

        assert_eq!(repo.search("latte").await.unwrap().len(), 2);
        assert_eq!(repo.search("pastry").await.unwrap().len(), 1);
        assert_eq!(repo.search("  ").await.unwrap().len(), 3);
        assert_eq!(repo.by_category("Pastry").await.unwrap().len(), 1);
        assert_eq!(
            repo.categories().await.unwrap(),
            vec!["Cold Drinks", "Hot Drinks", "Pastry"]
        );
    }

    #[tokio::test]
    async fn test_stock_updates() {
        let repo = repo().await;
        let p = repo.insert(&input("Mocha", "Hot Drinks", 10, 5)).await.unwrap();

        repo.set_stock(p.id, 5).await.unwrap();
        assert_eq!(repo.low_stock().await.unwrap().len(), 1);

        let err = repo.set_stock(p.id, -1).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)));
        assert_eq!(repo.require(p.id).await.unwrap().stock, 5);

        assert!(matches!(
            repo.set_stock(404, 1).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = repo().await;
        let p = repo.insert(&input("Tea", "Hot Drinks", 10, 5)).await.unwrap();

        let mut edit = input("Green Tea", "Hot Drinks", 8, 2);
        edit.price_cents = 400;
        repo.update(p.id, &edit).await.unwrap();

        let updated = repo.require(p.id).await.unwrap();
        assert_eq!(updated.name, "Green Tea");
        assert_eq!(updated.price_cents, 400);

        repo.delete(p.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.delete(p.id).await.is_err());
    }
}
