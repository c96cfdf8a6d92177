//! # Dashboard
//!
//! Figures for the summary screen, gathered in one call.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::DbResult;
use crate::pool::Database;
use cafe_core::{DailyTotal, Money, Product, ProductSales};

/// Snapshot shown on the summary screen.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub day: NaiveDate,
    pub sales_today: i64,
    pub revenue_today_cents: i64,
    pub product_count: i64,
    pub low_stock: Vec<Product>,
    pub customer_count: i64,
    /// Last 7 days, days without sales omitted.
    pub last_week: Vec<DailyTotal>,
    pub top_products: Vec<ProductSales>,
}

impl Dashboard {
    pub fn revenue_today(&self) -> Money {
        Money::from_cents(self.revenue_today_cents)
    }

    /// Builds the snapshot for `today`.
    pub async fn load(db: &Database, today: NaiveDate) -> DbResult<Self> {
        let (sales_today, revenue_today_cents) = db.sales().totals_between(today, today).await?;

        Ok(Dashboard {
            day: today,
            sales_today,
            revenue_today_cents,
            product_count: db.products().count().await?,
            low_stock: db.products().low_stock().await?,
            customer_count: db.customers().count().await?,
            last_week: db.sales().daily_totals(7, today).await?,
            top_products: db.sales().top_products(None, 5).await?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use cafe_core::{ProductInput, SaleBuilder};
    use chrono::Utc;

    #[tokio::test]
    async fn test_load() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cold_brew = db
            .products()
            .insert(&ProductInput {
                name: "Cold Brew".to_string(),
                category: "Cold Drinks".to_string(),
                price_cents: 450,
                stock: 12,
                min_stock: 10,
                description: String::new(),
            })
            .await
            .unwrap();

        let mut cart = SaleBuilder::new();
        cart.add(&cold_brew, 3).unwrap();
        db.sales()
            .commit_sale(&cart.draft().unwrap(), "Ana", None)
            .await
            .unwrap();

        let dash = Dashboard::load(&db, Utc::now().date_naive()).await.unwrap();
        assert_eq!(dash.sales_today, 1);
        assert_eq!(dash.revenue_today(), Money::from_cents(1350));
        assert_eq!(dash.product_count, 1);
        assert_eq!(dash.low_stock.len(), 1);
        assert_eq!(dash.customer_count, 1);
        assert_eq!(dash.last_week.len(), 1);
        assert_eq!(dash.top_products[0].quantity, 3);
    }
}
