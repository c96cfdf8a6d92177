//! # Sale Commands
//!
//! Building a sale from the command line, committing it, and browsing or
//! correcting past sales.
//!
//! ## `sale new` Flow
//! ```text
//! --item 3:2 --item 5:1 --remove 3:1
//!      │
//!      ▼
//! authorize(CreateSale)
//!      │
//!      ▼
//! build_cart ── for each item: require product, add_input(product, "2")
//!      │        then each removal: remove(id, qty)
//!      │        (INVALID_QUANTITY / INSUFFICIENT_STOCK stop here, nothing saved)
//!      ▼
//! print cart
//!      │
//!      ▼
//! commit_sale ── draft() ── EMPTY_SALE
//!      │
//!      ▼
//! SaleRepository::commit_sale (one transaction)
//!      ├── Ok(id)  ──► cart cleared, receipt returned
//!      └── Err     ──► COMMIT_FAILED, cart untouched
//! ```

use chrono::NaiveDate;
use tracing::{debug, info};

use cafe_core::cart::parse_quantity;
use cafe_core::{Action, Money, Sale, SaleBuilder, SaleDetail, Screen};
use cafe_db::Database;

use crate::error::{ApiError, ApiResult};
use crate::state::SessionState;

/// One `<product_id>:<quantity>` argument. The quantity stays as typed so
/// the builder applies its own parsing rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemArg {
    pub product_id: i64,
    pub quantity: String,
}

/// Parses `"<product_id>:<quantity>"`.
pub fn parse_item(text: &str) -> ApiResult<ItemArg> {
    let (id, quantity) = text
        .split_once(':')
        .ok_or_else(|| ApiError::validation(format!("Expected <product_id>:<quantity>, got '{}'", text)))?;

    let product_id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::validation(format!("Invalid product id: '{}'", id.trim())))?;

    Ok(ItemArg {
        product_id,
        quantity: quantity.trim().to_string(),
    })
}

/// Fills a new builder from `items`, then applies `removals`.
///
/// Each item is added with the product's current price and stock.
pub async fn build_cart(
    db: &Database,
    session: &SessionState,
    items: &[ItemArg],
    removals: &[ItemArg],
) -> ApiResult<SaleBuilder> {
    session.authorize(Action::CreateSale)?;

    let mut cart = SaleBuilder::new();
    for item in items {
        let product = db.products().require(item.product_id).await?;
        let line = cart.add_input(&product, &item.quantity)?;
        debug!(product_id = item.product_id, quantity = line.quantity, "Added to cart");
    }

    for removal in removals {
        let quantity = parse_quantity(&removal.quantity)?;
        cart.remove(removal.product_id, quantity)?;
        debug!(product_id = removal.product_id, quantity, "Removed from cart");
    }

    Ok(cart)
}

/// Commits `cart` and clears it. On failure the cart is left as it was.
pub async fn commit_sale(
    db: &Database,
    session: &SessionState,
    cart: &mut SaleBuilder,
    customer_name: &str,
) -> ApiResult<SaleDetail> {
    let session = session.authorize(Action::CreateSale)?;
    let draft = cart.draft()?;

    let sale_id = db
        .sales()
        .commit_sale(&draft, customer_name, Some(session.user_id))
        .await
        .map_err(ApiError::commit_failed)?;

    cart.clear();
    info!(sale_id, by = %session.username, "Sale recorded");

    db.sales()
        .get_with_lines(sale_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &sale_id.to_string()))
}

/// Sales in `period` (inclusive days), or the most recent `limit` sales.
pub async fn list(
    db: &Database,
    session: &SessionState,
    period: Option<(NaiveDate, NaiveDate)>,
    limit: u32,
) -> ApiResult<Vec<Sale>> {
    session.authorize_screen(Screen::Sales)?;

    match period {
        Some((from, to)) => {
            if from > to {
                return Err(ApiError::validation("--from must not be after --to"));
            }
            Ok(db.sales().list_between(from, to).await?)
        }
        None => Ok(db.sales().list_recent(limit).await?),
    }
}

pub async fn show(db: &Database, session: &SessionState, id: i64) -> ApiResult<SaleDetail> {
    session.authorize_screen(Screen::Sales)?;
    db.sales()
        .get_with_lines(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id.to_string()))
}

/// Corrects the customer name on a past sale.
pub async fn edit_customer(
    db: &Database,
    session: &SessionState,
    id: i64,
    customer_name: &str,
) -> ApiResult<Sale> {
    let session = session.authorize(Action::EditSale)?;
    db.sales().update_customer(id, customer_name).await?;
    info!(id, by = %session.username, "Sale customer changed");

    db.sales()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id.to_string()))
}

/// Deletes a sale and its lines. Stock is not put back.
pub async fn delete(db: &Database, session: &SessionState, id: i64) -> ApiResult<()> {
    let session = session.authorize(Action::DeleteSale)?;
    db.sales().delete(id).await?;
    info!(id, by = %session.username, "Sale deleted");
    Ok(())
}

/// Total of a listing, for the footer line.
pub fn total_of(sales: &[Sale]) -> Money {
    sales.iter().map(|s| Money::from_cents(s.total_cents)).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
