//! # Product Commands
//!
//! Catalog listing and search for anyone on the inventory screen; create,
//! edit, delete and stock changes for roles holding the matching action.
//!
//! ## Stock Adjustment Flow
//! ```text
//! product stock 7 25
//!      │
//!      ▼
//! authorize(AdjustStock) ── denied ──► PERMISSION_DENIED
//!      │
//!      ▼
//! validate_stock(25)     ── < 0 ─────► VALIDATION_ERROR
//!      │
//!      ▼
//! products().set_stock(7, 25)  (absolute, not a delta)
//! ```

use serde::Serialize;
use tracing::info;

use cafe_core::validation::{
    validate_price_cents, validate_product, validate_search_query, validate_stock,
};
use cafe_core::{Action, Money, Product, ProductInput, Screen};
use cafe_db::Database;

use crate::error::{ApiError, ApiResult};
use crate::state::SessionState;

/// Fallback when the `default_min_stock` setting is missing or invalid.
const FALLBACK_MIN_STOCK: i64 = 10;

/// Field changes for `product edit`; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub description: Option<String>,
}

impl ProductPatch {
    fn apply(self, product: &Product) -> ProductInput {
        ProductInput {
            name: self.name.unwrap_or_else(|| product.name.clone()),
            category: self.category.unwrap_or_else(|| product.category.clone()),
            price_cents: self.price_cents.unwrap_or(product.price_cents),
            stock: self.stock.unwrap_or(product.stock),
            min_stock: self.min_stock.unwrap_or(product.min_stock),
            description: self
                .description
                .unwrap_or_else(|| product.description.clone()),
        }
    }
}

/// Products at or below their minimum, with a count for the header line.
#[derive(Debug, Clone, Serialize)]
pub struct LowStock {
    pub count: usize,
    pub products: Vec<Product>,
}

/// Parses an operator-typed price (`3.50`, `3,50`, `S/ 3.50`) into cents.
pub fn parse_price(text: &str) -> ApiResult<i64> {
    let cents = Money::parse_lenient(text)
        .filter(|m| !m.is_negative())
        .map(|m| m.cents())
        .ok_or_else(|| ApiError::validation(format!("Invalid price: '{}'", text.trim())))?;
    validate_price_cents(cents)?;
    Ok(cents)
}

pub async fn list(db: &Database, session: &SessionState) -> ApiResult<Vec<Product>> {
    session.authorize_screen(Screen::Inventory)?;
    Ok(db.products().list_all().await?)
}

pub async fn search(db: &Database, session: &SessionState, query: &str) -> ApiResult<Vec<Product>> {
    session.authorize_screen(Screen::Inventory)?;
    let query = validate_search_query(query)?;
    Ok(db.products().search(&query).await?)
}

pub async fn by_category(
    db: &Database,
    session: &SessionState,
    category: &str,
) -> ApiResult<Vec<Product>> {
    session.authorize_screen(Screen::Inventory)?;
    Ok(db.products().by_category(category).await?)
}

pub async fn categories(db: &Database, session: &SessionState) -> ApiResult<Vec<String>> {
    session.authorize_screen(Screen::Inventory)?;
    Ok(db.products().categories().await?)
}

pub async fn show(db: &Database, session: &SessionState, id: i64) -> ApiResult<Product> {
    session.authorize_screen(Screen::Inventory)?;
    Ok(db.products().require(id).await?)
}

pub async fn low_stock(db: &Database, session: &SessionState) -> ApiResult<LowStock> {
    session.authorize_screen(Screen::Inventory)?;
    let products = db.products().low_stock().await?;
    Ok(LowStock {
        count: products.len(),
        products,
    })
}

/// The `default_min_stock` setting, used when `product add` gets no minimum.
pub async fn default_min_stock(db: &Database) -> ApiResult<i64> {
    let stored = db.settings().get("default_min_stock").await?;
    Ok(stored
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 0)
        .unwrap_or(FALLBACK_MIN_STOCK))
}

pub async fn create(
    db: &Database,
    session: &SessionState,
    input: ProductInput,
) -> ApiResult<Product> {
    let session = session.authorize(Action::CreateProduct)?;
    validate_product(&input)?;

    let product = db.products().insert(&input).await?;
    info!(id = product.id, name = %product.name, by = %session.username, "Product created");
    Ok(product)
}

pub async fn update(
    db: &Database,
    session: &SessionState,
    id: i64,
    patch: ProductPatch,
) -> ApiResult<Product> {
    session.authorize(Action::EditProduct)?;

    let current = db.products().require(id).await?;
    let input = patch.apply(&current);
    validate_product(&input)?;

    db.products().update(id, &input).await?;
    Ok(db.products().require(id).await?)
}

pub async fn delete(db: &Database, session: &SessionState, id: i64) -> ApiResult<()> {
    let session = session.authorize(Action::DeleteProduct)?;
    db.products().delete(id).await?;
    info!(id, by = %session.username, "Product deleted");
    Ok(())
}

/// Sets the stock level to an absolute value.
pub async fn set_stock(
    db: &Database,
    session: &SessionState,
    id: i64,
    stock: i64,
) -> ApiResult<Product> {
    let session = session.authorize(Action::AdjustStock)?;
    validate_stock(stock)?;

    db.products().set_stock(id, stock).await?;
    info!(id, stock, by = %session.username, "Stock adjusted");
    Ok(db.products().require(id).await?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{as_role, db, product};
    use crate::error::ErrorCode;
    use cafe_core::Role;

    fn input(name: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            category: "Pastry".to_string(),
            price_cents: 650,
            stock: 12,
            min_stock: 4,
            description: String::new(),
        }
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("3.50").unwrap(), 350);
        assert_eq!(parse_price("3,5").unwrap(), 350);
        assert_eq!(parse_price("S/ 12").unwrap(), 1200);
        assert!(parse_price("abc").is_err());
        assert!(parse_price("-1").is_err());
        assert!(parse_price("40000000000000000").is_err());
    }

    #[tokio::test]
    async fn test_clerk_manages_catalog() {
        let db = db().await;
        let clerk = as_role(&db, Role::InventoryClerk).await;

        let croissant = create(&db, &clerk, input("Croissant")).await.unwrap();
        let patch = ProductPatch {
            price_cents: Some(700),
            ..Default::default()
        };
        let updated = update(&db, &clerk, croissant.id, patch).await.unwrap();
        assert_eq!(updated.price_cents, 700);
        assert_eq!(updated.name, "Croissant");

        let adjusted = set_stock(&db, &clerk, croissant.id, 3).await.unwrap();
        assert_eq!(adjusted.stock, 3);
        assert_eq!(low_stock(&db, &clerk).await.unwrap().count, 1);

        delete(&db, &clerk, croissant.id).await.unwrap();
        assert!(list(&db, &clerk).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_salesperson_cannot_touch_catalog() {
        let db = db().await;
        let seller = as_role(&db, Role::Salesperson).await;
        let latte = product(&db, "Latte", 900, 10).await;

        let err = create(&db, &seller, input("Scone")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        let err = set_stock(&db, &seller, latte.id, 99).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(db.products().require(latte.id).await.unwrap().stock, 10);

        let err = list(&db, &seller).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_validation_runs_before_writes() {
        let db = db().await;
        let admin = as_role(&db, Role::Admin).await;

        let err = create(&db, &admin, input("  ")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(db.products().count().await.unwrap(), 0);

        let latte = product(&db, "Latte", 900, 10).await;
        let err = set_stock(&db, &admin, latte.id, -5).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = show(&db, &admin, 404).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_default_min_stock_setting() {
        let db = db().await;
        assert_eq!(default_min_stock(&db).await.unwrap(), FALLBACK_MIN_STOCK);
        db.settings().set("default_min_stock", "4").await.unwrap();
        assert_eq!(default_min_stock(&db).await.unwrap(), 4);
        db.settings().set("default_min_stock", "many").await.unwrap();
        assert_eq!(default_min_stock(&db).await.unwrap(), FALLBACK_MIN_STOCK);
    }
}
