//! # Reports
//!
//! Canonical report rows, the normalizer that produces them from loosely
//! shaped input, and the summaries printed under each report.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JSON rows (tuple or record) ──► normalize(kind, rows) ──┐              │
//! │                                                          ├─► ReportRows │
//! │  Typed repository rows ─────────► From<row> ─────────────┘      │       │
//! │                                                                 ▼       │
//! │                          Report { kind, rows } ──► headers / cells      │
//! │                                    │          ──► summary               │
//! │                                    │          ──► chart_points          │
//! │                                    ▼                                    │
//! │                           cafe-reports (PDF / XLSX / CSV)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every input row yields exactly one canonical row, in input order. Fields
//! that cannot be read become zero (numbers) or empty (text).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::money::Money;
use crate::types::{CustomerActivity, Product, ProductSales, Sale};

/// Status shown for every committed sale.
pub const SALE_STATUS_COMPLETED: &str = "Completed";

// =============================================================================
// Report Kind
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    DailySales,
    MonthlySales,
    TopProducts,
    Inventory,
    FrequentCustomers,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::DailySales,
        ReportKind::MonthlySales,
        ReportKind::TopProducts,
        ReportKind::Inventory,
        ReportKind::FrequentCustomers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::DailySales => "daily-sales",
            ReportKind::MonthlySales => "monthly-sales",
            ReportKind::TopProducts => "top-products",
            ReportKind::Inventory => "inventory",
            ReportKind::FrequentCustomers => "frequent-customers",
        }
    }

    /// Heading printed at the top of the PDF.
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::DailySales => "DAILY SALES REPORT",
            ReportKind::MonthlySales => "MONTHLY SALES REPORT",
            ReportKind::TopProducts => "TOP SELLING PRODUCTS REPORT",
            ReportKind::Inventory => "INVENTORY REPORT",
            ReportKind::FrequentCustomers => "FREQUENT CUSTOMERS REPORT",
        }
    }

    /// Worksheet name in spreadsheet exports.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            ReportKind::DailySales | ReportKind::MonthlySales => "Sales",
            ReportKind::TopProducts => "Top Products",
            ReportKind::Inventory => "Inventory",
            ReportKind::FrequentCustomers => "Customers",
        }
    }

    /// Base name for exported files, e.g. `daily_sales`.
    pub fn file_stem(&self) -> String {
        self.as_str().replace('-', "_")
    }

    pub fn is_sales(&self) -> bool {
        matches!(self, ReportKind::DailySales | ReportKind::MonthlySales)
    }

    /// Date range used when the operator gives none.
    ///
    /// ```rust
    /// use cafe_core::report::ReportKind;
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
    /// let (from, to) = ReportKind::MonthlySales.default_period(today).unwrap();
    /// assert_eq!(from, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    /// assert_eq!(to, today);
    /// assert!(ReportKind::Inventory.default_period(today).is_none());
    /// ```
    pub fn default_period(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            ReportKind::DailySales => Some((today, today)),
            ReportKind::MonthlySales => Some((today.with_day(1).unwrap_or(today), today)),
            _ => None,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown report kind '{}'", s))
    }
}

// =============================================================================
// Canonical Rows
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReportRow {
    pub id: i64,
    pub date: String,
    pub customer: String,
    pub total: Money,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProductRow {
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub stock: i64,
    pub min_stock: i64,
    /// `stock <= min_stock`
    pub low_stock: bool,
}

impl InventoryRow {
    pub fn new(
        id: i64,
        name: String,
        category: String,
        price: Money,
        stock: i64,
        min_stock: i64,
    ) -> Self {
        InventoryRow {
            id,
            name,
            category,
            price,
            stock,
            min_stock,
            low_stock: stock <= min_stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerReportRow {
    pub id: i64,
    pub name: String,
    pub purchases: i64,
    pub total_spent: Money,
}

/// Canonical rows of one report, one variant per row shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "rows", rename_all = "snake_case")]
pub enum ReportRows {
    Sales(Vec<SalesReportRow>),
    TopProducts(Vec<TopProductRow>),
    Inventory(Vec<InventoryRow>),
    Customers(Vec<CustomerReportRow>),
}

impl ReportRows {
    /// Empty rows of the shape `kind` uses.
    pub fn empty(kind: ReportKind) -> Self {
        match kind {
            ReportKind::DailySales | ReportKind::MonthlySales => ReportRows::Sales(Vec::new()),
            ReportKind::TopProducts => ReportRows::TopProducts(Vec::new()),
            ReportKind::Inventory => ReportRows::Inventory(Vec::new()),
            ReportKind::FrequentCustomers => ReportRows::Customers(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ReportRows::Sales(rows) => rows.len(),
            ReportRows::TopProducts(rows) => rows.len(),
            ReportRows::Inventory(rows) => rows.len(),
            ReportRows::Customers(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The amount column of each row: total, revenue, price or total spent.
    fn amounts(&self) -> Vec<Money> {
        match self {
            ReportRows::Sales(rows) => rows.iter().map(|r| r.total).collect(),
            ReportRows::TopProducts(rows) => rows.iter().map(|r| r.revenue).collect(),
            ReportRows::Inventory(rows) => rows.iter().map(|r| r.price).collect(),
            ReportRows::Customers(rows) => rows.iter().map(|r| r.total_spent).collect(),
        }
    }
}

// =============================================================================
// Typed Conversions
// =============================================================================

impl From<Sale> for SalesReportRow {
    fn from(sale: Sale) -> Self {
        SalesReportRow {
            id: sale.id,
            date: sale.created_at.format("%Y-%m-%d %H:%M").to_string(),
            customer: sale.customer_name,
            total: Money::from_cents(sale.total_cents),
            status: SALE_STATUS_COMPLETED.to_string(),
        }
    }
}

impl From<ProductSales> for TopProductRow {
    fn from(row: ProductSales) -> Self {
        TopProductRow {
            name: row.product_name,
            quantity: row.quantity,
            revenue: Money::from_cents(row.revenue_cents),
        }
    }
}

impl From<Product> for InventoryRow {
    fn from(p: Product) -> Self {
        InventoryRow::new(
            p.id,
            p.name,
            p.category,
            Money::from_cents(p.price_cents),
            p.stock,
            p.min_stock,
        )
    }
}

impl From<CustomerActivity> for CustomerReportRow {
    fn from(row: CustomerActivity) -> Self {
        CustomerReportRow {
            id: row.id,
            name: row.name,
            purchases: row.purchases,
            total_spent: Money::from_cents(row.total_spent_cents),
        }
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// A raw row viewed either positionally or by key.
enum RawRow<'a> {
    Tuple(&'a [Value]),
    Record(&'a Map<String, Value>),
    Unknown,
}

impl<'a> RawRow<'a> {
    fn new(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => RawRow::Tuple(items),
            Value::Object(map) => RawRow::Record(map),
            _ => RawRow::Unknown,
        }
    }

    fn width(&self) -> usize {
        match self {
            RawRow::Tuple(items) => items.len(),
            _ => 0,
        }
    }

    /// Field at `index` for tuples, or under the first present key for records.
    fn field(&self, index: usize, keys: &[&str]) -> Option<&'a Value> {
        match self {
            RawRow::Tuple(items) => items.get(index),
            RawRow::Record(map) => keys.iter().find_map(|k| map.get(*k)),
            RawRow::Unknown => None,
        }
    }

    fn text(&self, index: usize, keys: &[&str]) -> String {
        coerce_text(self.field(index, keys))
    }

    fn int(&self, index: usize, keys: &[&str]) -> i64 {
        coerce_int(self.field(index, keys))
    }

    fn money(&self, index: usize, keys: &[&str]) -> Money {
        coerce_money(self.field(index, keys))
    }
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn coerce_int(value: Option<&Value>) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(truncate)),
        Some(Value::String(s)) => s
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(truncate),
        _ => None,
    };
    parsed.unwrap_or(0)
}

fn truncate(value: f64) -> i64 {
    // `as` saturates, NaN becomes 0
    value.trunc() as i64
}

fn coerce_money(value: Option<&Value>) -> Money {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().and_then(Money::from_major_f64),
        Some(Value::String(s)) => Money::parse_lenient(s),
        _ => None,
    };
    parsed.unwrap_or_default()
}

/// Normalizes loosely shaped rows into the canonical rows of `kind`.
///
/// ## Field Order
/// | Kind                 | Tuple layout                                   |
/// |----------------------|------------------------------------------------|
/// | daily / monthly      | `[id, customer, total, date]`                  |
/// | top-products         | `[name, quantity, revenue]`                    |
/// | inventory            | `[id, name, category, price, stock, min_stock]`|
/// | frequent-customers   | `[id, name, purchases, total]`, or with email  |
/// |                      | and phone after the name (6 fields), or with a |
/// |                      | registration date as well (7+ fields)          |
///
/// ## Example
/// ```rust
/// use cafe_core::report::{normalize, ReportKind, ReportRows};
/// use serde_json::json;
///
/// let rows = normalize(
///     ReportKind::TopProducts,
///     &[json!(["Latte", "7", "21.00"]), json!(["Mocha", null, "bad"])],
/// );
/// let ReportRows::TopProducts(rows) = rows else { unreachable!() };
/// assert_eq!(rows[0].quantity, 7);
/// assert_eq!(rows[1].revenue.cents(), 0);
/// ```
pub fn normalize(kind: ReportKind, raw_rows: &[Value]) -> ReportRows {
    let rows = raw_rows.iter().map(RawRow::new);

    match kind {
        ReportKind::DailySales | ReportKind::MonthlySales => ReportRows::Sales(
            rows.map(|r| SalesReportRow {
                id: r.int(0, &["id"]),
                customer: r.text(1, &["customer", "customer_name"]),
                total: match &r {
                    RawRow::Record(map) if !map.contains_key("total") => {
                        Money::from_cents(r.int(2, &["total_cents"]))
                    }
                    _ => r.money(2, &["total"]),
                },
                date: r.text(3, &["date", "created_at"]),
                status: SALE_STATUS_COMPLETED.to_string(),
            })
            .collect(),
        ),
        ReportKind::TopProducts => ReportRows::TopProducts(
            rows.map(|r| TopProductRow {
                name: r.text(0, &["name", "product"]),
                quantity: r.int(1, &["quantity", "qty"]),
                revenue: r.money(2, &["revenue", "total"]),
            })
            .collect(),
        ),
        ReportKind::Inventory => ReportRows::Inventory(
            rows.map(|r| {
                InventoryRow::new(
                    r.int(0, &["id", "product_id"]),
                    r.text(1, &["name", "product"]),
                    r.text(2, &["category"]),
                    r.money(3, &["price"]),
                    r.int(4, &["stock", "quantity"]),
                    r.int(5, &["min_stock", "minimum"]),
                )
            })
            .collect(),
        ),
        ReportKind::FrequentCustomers => ReportRows::Customers(
            rows.map(|r| {
                let (purchases_at, total_at) = match r.width() {
                    w if w >= 7 => (5, 6),
                    6 => (4, 5),
                    _ => (2, 3),
                };
                CustomerReportRow {
                    id: r.int(0, &["id"]),
                    name: r.text(1, &["name", "customer"]),
                    purchases: r.int(purchases_at, &["purchases", "purchase_count", "count"]),
                    total_spent: r.money(total_at, &["total_spent", "total"]),
                }
            })
            .collect(),
        ),
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Aggregate figures printed under a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ReportSummary {
    Sales {
        count: usize,
        total: Money,
    },
    TopProducts {
        products: usize,
        quantity: i64,
        revenue: Money,
    },
    Inventory {
        products: usize,
        low_stock: usize,
    },
    Customers {
        customers: usize,
        purchases: i64,
        total_spent: Money,
    },
}

impl ReportSummary {
    /// Labelled lines, amounts prefixed with `symbol`.
    pub fn lines(&self, symbol: &str) -> Vec<String> {
        match self {
            ReportSummary::Sales { count, total } => vec![
                format!("TOTAL SALES: {}", total.with_symbol(symbol)),
                format!("NUMBER OF SALES: {}", count),
            ],
            ReportSummary::TopProducts {
                products,
                quantity,
                revenue,
            } => vec![
                format!("TOTAL PRODUCTS: {}", products),
                format!("UNITS SOLD: {}", quantity),
                format!("TOTAL REVENUE: {}", revenue.with_symbol(symbol)),
            ],
            ReportSummary::Inventory {
                products,
                low_stock,
            } => vec![
                format!("TOTAL PRODUCTS: {}", products),
                format!("LOW STOCK PRODUCTS: {}", low_stock),
            ],
            ReportSummary::Customers {
                customers,
                purchases,
                total_spent,
            } => vec![
                format!("TOTAL CUSTOMERS: {}", customers),
                format!("TOTAL PURCHASES: {}", purchases),
                format!("TOTAL SPENT: {}", total_spent.with_symbol(symbol)),
            ],
        }
    }
}

/// Totals over the rows. Counts and amounts saturate rather than overflow,
/// since imported rows may carry values near the i64 range.
pub fn summarize(rows: &ReportRows) -> ReportSummary {
    match rows {
        ReportRows::Sales(rows) => ReportSummary::Sales {
            count: rows.len(),
            total: rows.iter().map(|r| r.total).sum(),
        },
        ReportRows::TopProducts(rows) => ReportSummary::TopProducts {
            products: rows.len(),
            quantity: saturating_sum(rows.iter().map(|r| r.quantity)),
            revenue: rows.iter().map(|r| r.revenue).sum(),
        },
        ReportRows::Inventory(rows) => ReportSummary::Inventory {
            products: rows.len(),
            low_stock: rows.iter().filter(|r| r.low_stock).count(),
        },
        ReportRows::Customers(rows) => ReportSummary::Customers {
            customers: rows.len(),
            purchases: saturating_sum(rows.iter().map(|r| r.purchases)),
            total_spent: rows.iter().map(|r| r.total_spent).sum(),
        },
    }
}

fn saturating_sum(values: impl Iterator<Item = i64>) -> i64 {
    values.fold(0, i64::saturating_add)
}

// =============================================================================
// Report
// =============================================================================

/// One table cell, typed so writers can pick a native representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Money(Money),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(n) => write!(f, "{}", n),
            Cell::Money(m) => write!(f, "{}", m),
        }
    }
}

/// A report ready for preview or export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub kind: ReportKind,
    pub rows: ReportRows,
}

impl Report {
    pub fn new(kind: ReportKind, rows: ReportRows) -> Self {
        Report { kind, rows }
    }

    /// Builds a report straight from loosely shaped rows.
    pub fn from_raw(kind: ReportKind, raw_rows: &[Value]) -> Self {
        Report::new(kind, normalize(kind, raw_rows))
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self.rows {
            ReportRows::Sales(_) => &["ID", "Date", "Customer", "Total", "Status"],
            ReportRows::TopProducts(_) => &["Product", "Quantity Sold", "Total Revenue"],
            ReportRows::Inventory(_) => &["ID", "Name", "Category", "Price", "Stock", "Min Stock"],
            ReportRows::Customers(_) => &["ID", "Customer", "Purchases", "Total Spent"],
        }
    }

    /// Rows as cells, in header order.
    pub fn cells(&self) -> Vec<Vec<Cell>> {
        match &self.rows {
            ReportRows::Sales(rows) => rows
                .iter()
                .map(|r| {
                    vec![
                        Cell::Int(r.id),
                        Cell::Text(r.date.clone()),
                        Cell::Text(r.customer.clone()),
                        Cell::Money(r.total),
                        Cell::Text(r.status.clone()),
                    ]
                })
                .collect(),
            ReportRows::TopProducts(rows) => rows
                .iter()
                .map(|r| {
                    vec![
                        Cell::Text(r.name.clone()),
                        Cell::Int(r.quantity),
                        Cell::Money(r.revenue),
                    ]
                })
                .collect(),
            ReportRows::Inventory(rows) => rows
                .iter()
                .map(|r| {
                    vec![
                        Cell::Int(r.id),
                        Cell::Text(r.name.clone()),
                        Cell::Text(r.category.clone()),
                        Cell::Money(r.price),
                        Cell::Int(r.stock),
                        Cell::Int(r.min_stock),
                    ]
                })
                .collect(),
            ReportRows::Customers(rows) => rows
                .iter()
                .map(|r| {
                    vec![
                        Cell::Int(r.id),
                        Cell::Text(r.name.clone()),
                        Cell::Int(r.purchases),
                        Cell::Money(r.total_spent),
                    ]
                })
                .collect(),
        }
    }

    /// Per-row tag for the preview (`LOW STOCK` on inventory rows).
    pub fn row_flags(&self) -> Vec<Option<&'static str>> {
        match &self.rows {
            ReportRows::Inventory(rows) => rows
                .iter()
                .map(|r| r.low_stock.then_some("LOW STOCK"))
                .collect(),
            other => vec![None; other.len()],
        }
    }

    pub fn summary(&self) -> ReportSummary {
        summarize(&self.rows)
    }

    /// False when there are no rows or every amount is zero.
    pub fn has_data(&self) -> bool {
        self.rows.amounts().iter().any(|m| !m.is_zero())
    }

    /// `(label, value)` pairs for a bar chart.
    ///
    /// Sales are grouped by calendar day in first-seen order; the other
    /// kinds give one bar per row.
    pub fn chart_points(&self) -> Vec<(String, f64)> {
        match &self.rows {
            ReportRows::Sales(rows) => {
                let mut points: Vec<(String, Money)> = Vec::new();
                for row in rows {
                    let day: String = row.date.chars().take(10).collect();
                    match points.iter_mut().find(|(label, _)| *label == day) {
                        Some((_, total)) => *total += row.total,
                        None => points.push((day, row.total)),
                    }
                }
                points
                    .into_iter()
                    .map(|(label, total)| (label, total.to_major_f64()))
                    .collect()
            }
            ReportRows::TopProducts(rows) => rows
                .iter()
                .map(|r| (r.name.clone(), r.quantity as f64))
                .collect(),
            ReportRows::Inventory(rows) => rows
                .iter()
                .map(|r| (r.name.clone(), r.stock as f64))
                .collect(),
            ReportRows::Customers(rows) => rows
                .iter()
                .map(|r| (r.name.clone(), r.total_spent.to_major_f64()))
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
