//! # Domain Types
//!
//! Core domain types used throughout Cafe POS.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──┼─────────────────┼───│  product_id     │       │
//! │  │  price_cents    │   │  id             │◄──│  sale_id        │       │
//! │  │  stock          │   │  customer_name  │   │  quantity       │       │
//! │  │  min_stock      │   │  total_cents    │   │  unit_price     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │      User       │   │    Setting      │       │
//! │  │  name, email,   │   │  username, role │   │  key → value    │       │
//! │  │  phone          │   │  password_hash  │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are SQLite integer row ids. Money columns are stored in cents
//! and exposed through `Money` accessors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product on the menu or shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,

    /// Display name shown in the cart and on reports.
    pub name: String,

    /// Free-text category label ("Hot Drinks", "Pastry", ...).
    pub category: String,

    /// Current unit price in cents.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Low-stock threshold. Never negative.
    pub min_stock: i64,

    pub description: String,

    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Stock at or below the minimum threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// Fields for creating or editing a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub stock: i64,
    pub min_stock: i64,
    pub description: String,
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating or editing a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Name recorded on walk-in sales with no named customer.
///
/// Sales under this name never create a customer record.
pub const GENERIC_CUSTOMER_NAME: &str = "General Customer";

/// Returns the customer name to record on a sale and whether it should be
/// registered as a customer.
///
/// ## Rules
/// - Surrounding whitespace is trimmed
/// - Empty names become [`GENERIC_CUSTOMER_NAME`]
/// - The generic name (any letter case) is never registered
///
/// ## Example
/// ```rust
/// use cafe_core::types::resolve_customer_name;
///
/// assert_eq!(resolve_customer_name("  Ana  "), ("Ana".to_string(), true));
/// assert_eq!(resolve_customer_name(""), ("General Customer".to_string(), false));
/// assert_eq!(resolve_customer_name("general customer"), ("general customer".to_string(), false));
/// ```
pub fn resolve_customer_name(input: &str) -> (String, bool) {
    let name = input.trim();
    if name.is_empty() {
        return (GENERIC_CUSTOMER_NAME.to_string(), false);
    }
    let registrable = !name.eq_ignore_ascii_case(GENERIC_CUSTOMER_NAME);
    (name.to_string(), registrable)
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Immutable once written, except for deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,

    /// Denormalized customer name, not a foreign key.
    pub customer_name: String,

    /// Sum of line subtotals at commit time.
    pub total_cents: i64,

    pub created_at: DateTime<Utc>,

    /// Cashier who committed the sale. `None` once the user is deleted.
    pub user_id: Option<i64>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item of a committed sale.
///
/// The unit price is frozen at commit time, so later price edits do not
/// change historical totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    /// Product name copied in at commit time.
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

impl SaleLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// A sale together with its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDetail {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

// =============================================================================
// Report Source Rows
// =============================================================================

/// Aggregated sales of one product over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductSales {
    pub product_name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// Purchase history of one customer, matched by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerActivity {
    pub id: i64,
    pub name: String,
    pub purchases: i64,
    pub total_spent_cents: i64,
}

/// Sales total for one calendar day (dashboard chart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DailyTotal {
    /// `YYYY-MM-DD`
    pub day: String,
    pub sales: i64,
    pub total_cents: i64,
}

// =============================================================================
// User & Role
// =============================================================================

/// Staff role. Decides screens and actions in [`crate::access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Salesperson,
    InventoryClerk,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Salesperson, Role::InventoryClerk];

    /// Name stored in the `users.role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Salesperson => "salesperson",
            Role::InventoryClerk => "inventory_clerk",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the stored form and the hyphenated form (`inventory-clerk`).
impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "admin" => Ok(Role::Admin),
            "salesperson" => Ok(Role::Salesperson),
            "inventory_clerk" => Ok(Role::InventoryClerk),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A staff account.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    /// argon2 PHC string. Never shown.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    /// Raw stored role. See [`User::role`].
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Parsed role. `None` for a value no role matches, which grants nothing.
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Settings & Audit
// =============================================================================

/// One configuration key/value pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub description: String,
}

/// Row written by the database audit trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditEntry {
    pub id: i64,
    pub action: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, min_stock: i64) -> Product {
        Product {
            id: 1,
            name: "Latte".to_string(),
            category: "Hot Drinks".to_string(),
            price_cents: 350,
            stock,
            min_stock,
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        assert!(product(10, 10).is_low_stock());
        assert!(product(3, 10).is_low_stock());
        assert!(!product(11, 10).is_low_stock());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("Salesperson".parse::<Role>(), Ok(Role::Salesperson));
        assert_eq!("inventory-clerk".parse::<Role>(), Ok(Role::InventoryClerk));
        assert_eq!("inventory_clerk".parse::<Role>(), Ok(Role::InventoryClerk));
        assert!("barista".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_round_trips_through_storage_name() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn test_user_unknown_role() {
        let user = User {
            id: 1,
            username: "x".to_string(),
            password_hash: String::new(),
            display_name: "X".to_string(),
            role: "owner".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(user.role(), None);
        assert!(!format!("{:?}", user).contains("password_hash"));
    }

    #[test]
    fn test_resolve_customer_name() {
        assert_eq!(resolve_customer_name("Ana"), ("Ana".to_string(), true));
        assert_eq!(resolve_customer_name(" Ana "), ("Ana".to_string(), true));
        assert_eq!(
            resolve_customer_name("   "),
            (GENERIC_CUSTOMER_NAME.to_string(), false)
        );
        assert_eq!(
            resolve_customer_name("GENERAL CUSTOMER"),
            ("GENERAL CUSTOMER".to_string(), false)
        );
    }
}
