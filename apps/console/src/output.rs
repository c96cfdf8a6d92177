//! # Text Output
//!
//! Plain-text rendering for the terminal. Every function returns a
//! `String`; the caller in lib.rs decides between this and `--json`.
//!
//! ```text
//! ID  Name      Category    Price    Stock  Min Stock
//! ──  ────────  ──────────  ───────  ─────  ─────────
//! 1   Latte     Hot Drinks  S/ 3.50     12         10
//! 2   Muffin    Pastry      S/ 2.50      1          2  LOW STOCK
//! ```

use std::fmt::Write as _;

use cafe_core::report::Cell;
use cafe_core::{
    AuditEntry, Customer, CustomerActivity, Money, Product, Report, SaleBuilder, SaleDetail,
    Sale, Session, Setting, User,
};
use cafe_db::bootstrap::BootstrapReport;
use cafe_db::Dashboard;

use crate::commands::sale::total_of;
use crate::error::ApiError;

const BAR_WIDTH: usize = 40;

/// Column alignment in [`table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Aligned table with an underlined header. `tags` are appended after the
/// last column, one per row, when present.
pub fn table(headers: &[&str], align: &[Align], rows: &[Vec<String>], tags: &[Option<&str>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String], tag: Option<&str>| {
        let mut out = String::new();
        for (i, cell) in cells.iter().enumerate() {
            let width = widths.get(i).copied().unwrap_or(0);
            if i > 0 {
                out.push_str("  ");
            }
            match align.get(i).copied().unwrap_or(Align::Left) {
                Align::Left => {
                    let _ = write!(out, "{:<width$}", cell);
                }
                Align::Right => {
                    let _ = write!(out, "{:>width$}", cell);
                }
            }
        }
        if let Some(tag) = tag {
            out.push_str("  ");
            out.push_str(tag);
        }
        out.trim_end().to_string()
    };

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();

    let mut out = String::new();
    out.push_str(&line(&header, None));
    out.push('\n');
    out.push_str(&line(&rule, None));
    out.push('\n');
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&line(row, tags.get(i).copied().flatten()));
        out.push('\n');
    }
    out
}

/// Horizontal bars scaled to the largest value.
pub fn bar_chart(points: &[(String, f64)]) -> String {
    if points.is_empty() {
        return String::new();
    }

    let label_width = points.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

    let mut out = String::new();
    for (label, value) in points {
        let len = if max > 0.0 {
            ((value.max(0.0) / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(out, "{:<label_width$}  {} {}", label, "█".repeat(len), trim_number(*value));
    }
    out
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn money(cents: i64, symbol: &str) -> String {
    Money::from_cents(cents).with_symbol(symbol)
}

// =============================================================================
// Entities
// =============================================================================

pub fn products(products: &[Product], symbol: &str) -> String {
    if products.is_empty() {
        return "No products.\n".to_string();
    }
    let rows: Vec<Vec<String>> = products
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.category.clone(),
                money(p.price_cents, symbol),
                p.stock.to_string(),
                p.min_stock.to_string(),
            ]
        })
        .collect();
    let tags: Vec<Option<&str>> = products
        .iter()
        .map(|p| p.is_low_stock().then_some("LOW STOCK"))
        .collect();

    table(
        &["ID", "Name", "Category", "Price", "Stock", "Min Stock"],
        &[Align::Right, Align::Left, Align::Left, Align::Right, Align::Right, Align::Right],
        &rows,
        &tags,
    )
}

pub fn product(p: &Product, symbol: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", p.id, p.name);
    let _ = writeln!(out, "Category:  {}", p.category);
    let _ = writeln!(out, "Price:     {}", money(p.price_cents, symbol));
    let _ = writeln!(out, "Stock:     {} (minimum {})", p.stock, p.min_stock);
    if !p.description.is_empty() {
        let _ = writeln!(out, "Notes:     {}", p.description);
    }
    if p.is_low_stock() {
        out.push_str("LOW STOCK\n");
    }
    out
}

pub fn customers(customers: &[Customer]) -> String {
    if customers.is_empty() {
        return "No customers.\n".to_string();
    }
    let rows: Vec<Vec<String>> = customers
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.email.clone().unwrap_or_default(),
                c.phone.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(
        &["ID", "Name", "Email", "Phone"],
        &[Align::Right],
        &rows,
        &[],
    )
}

pub fn frequent_customers(rows: &[CustomerActivity], symbol: &str) -> String {
    if rows.is_empty() {
        return "No purchases by registered customers yet.\n".to_string();
    }
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.name.clone(),
                r.purchases.to_string(),
                money(r.total_spent_cents, symbol),
            ]
        })
        .collect();
    table(
        &["ID", "Customer", "Purchases", "Total Spent"],
        &[Align::Right, Align::Left, Align::Right, Align::Right],
        &rows,
        &[],
    )
}

pub fn sales(sales: &[Sale], symbol: &str) -> String {
    if sales.is_empty() {
        return "No sales.\n".to_string();
    }
    let rows: Vec<Vec<String>> = sales
        .iter()
        .map(|s| {
            vec![
                s.id.to_string(),
                s.created_at.format("%Y-%m-%d %H:%M").to_string(),
                s.customer_name.clone(),
                money(s.total_cents, symbol),
            ]
        })
        .collect();
    let total = total_of(sales);

    let mut out = table(
        &["ID", "Date", "Customer", "Total"],
        &[Align::Right, Align::Left, Align::Left, Align::Right],
        &rows,
        &[],
    );
    let _ = writeln!(out, "\n{} sale(s), {}", sales.len(), total.with_symbol(symbol));
    out
}

pub fn sale_detail(detail: &SaleDetail, symbol: &str) -> String {
    let sale = &detail.sale;
    let rows: Vec<Vec<String>> = detail
        .lines
        .iter()
        .map(|l| {
            vec![
                l.product_name.clone(),
                l.quantity.to_string(),
                money(l.unit_price_cents, symbol),
                money(l.subtotal_cents, symbol),
            ]
        })
        .collect();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Sale #{}  {}  {}",
        sale.id,
        sale.created_at.format("%Y-%m-%d %H:%M"),
        sale.customer_name
    );
    out.push_str(&table(
        &["Product", "Qty", "Unit", "Subtotal"],
        &[Align::Left, Align::Right, Align::Right, Align::Right],
        &rows,
        &[],
    ));
    let _ = writeln!(out, "TOTAL: {}", money(sale.total_cents, symbol));
    out
}

/// The cart before commit.
pub fn cart(cart: &SaleBuilder, symbol: &str) -> String {
    if cart.is_empty() {
        return "Cart is empty.\n".to_string();
    }
    let rows: Vec<Vec<String>> = cart
        .lines()
        .iter()
        .map(|l| {
            vec![
                l.product_id.to_string(),
                l.product_name.clone(),
                l.quantity.to_string(),
                l.unit_price.with_symbol(symbol),
                l.subtotal.with_symbol(symbol),
            ]
        })
        .collect();

    let mut out = table(
        &["ID", "Product", "Qty", "Unit", "Subtotal"],
        &[Align::Right, Align::Left, Align::Right, Align::Right, Align::Right],
        &rows,
        &[],
    );
    let _ = writeln!(
        out,
        "{} item(s), {} unit(s)  TOTAL: {}",
        cart.item_count(),
        cart.total_quantity(),
        cart.total().with_symbol(symbol)
    );
    out
}

pub fn users(users: &[User]) -> String {
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.username.clone(),
                u.display_name.clone(),
                u.role.clone(),
                u.created_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    table(&["Username", "Name", "Role", "Since"], &[], &rows, &[])
}

pub fn settings(settings: &[Setting]) -> String {
    let rows: Vec<Vec<String>> = settings
        .iter()
        .map(|s| vec![s.key.clone(), s.value.clone(), s.description.clone()])
        .collect();
    table(&["Key", "Value", "Description"], &[], &rows, &[])
}

pub fn audit(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "Audit log is empty.\n".to_string();
    }
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                e.action.clone(),
                e.detail.clone(),
            ]
        })
        .collect();
    table(&["When", "Action", "Detail"], &[], &rows, &[])
}

pub fn session(session: &Session) -> String {
    let role = session
        .role
        .map(|r| r.to_string())
        .unwrap_or_else(|| "(unrecognised role)".to_string());
    format!("{} ({}), role: {}\n", session.display_name, session.username, role)
}

pub fn screens(session: &Session) -> String {
    let screens = session.screens();
    if screens.is_empty() {
        return "No screens available.\n".to_string();
    }
    screens.iter().map(|s| format!("{}\n", s)).collect()
}

pub fn bootstrap(report: &BootstrapReport, db_path: &std::path::Path) -> String {
    let mut out = format!("Database ready at {}\n", db_path.display());
    if report.admin_created {
        out.push_str("Created the admin account (username: admin)\n");
    }
    if report.settings_inserted > 0 {
        let _ = writeln!(out, "Added {} default setting(s)", report.settings_inserted);
    }
    out
}

pub fn dashboard(d: &Dashboard, symbol: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Summary for {}", d.day);
    let _ = writeln!(
        out,
        "Sales today:     {} ({})",
        d.sales_today,
        d.revenue_today().with_symbol(symbol)
    );
    let _ = writeln!(out, "Products:        {}", d.product_count);
    let _ = writeln!(out, "Low stock:       {}", d.low_stock.len());
    let _ = writeln!(out, "Customers:       {}", d.customer_count);

    if !d.low_stock.is_empty() {
        out.push_str("\nLow stock\n");
        for p in &d.low_stock {
            let _ = writeln!(out, "  {} ({} left, minimum {})", p.name, p.stock, p.min_stock);
        }
    }

    if !d.last_week.is_empty() {
        out.push_str("\nLast 7 days\n");
        let points: Vec<(String, f64)> = d
            .last_week
            .iter()
            .map(|t| (t.day.clone(), Money::from_cents(t.total_cents).to_major_f64()))
            .collect();
        out.push_str(&bar_chart(&points));
    }

    if !d.top_products.is_empty() {
        out.push_str("\nBest sellers\n");
        for p in &d.top_products {
            let _ = writeln!(out, "  {} x{}", p.product_name, p.quantity);
        }
    }
    out
}

// =============================================================================
// Reports
// =============================================================================

/// Title, table, summary lines and, with `chart`, the bar chart.
pub fn report(report: &Report, symbol: &str, chart: bool) -> String {
    let mut out = format!("{}\n\n", report.kind.title());

    if report.rows.is_empty() {
        out.push_str("No rows.\n");
    } else {
        let rows: Vec<Vec<String>> = report
            .cells()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        Cell::Money(m) => m.with_symbol(symbol),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect();
        let align: Vec<Align> = report
            .cells()
            .first()
            .map(|row| {
                row.iter()
                    .map(|c| match c {
                        Cell::Text(_) => Align::Left,
                        Cell::Int(_) | Cell::Money(_) => Align::Right,
                    })
                    .collect()
            })
            .unwrap_or_default();
        out.push_str(&table(report.headers(), &align, &rows, &report.row_flags()));
    }

    out.push('\n');
    for line in report.summary().lines(symbol) {
        out.push_str(&line);
        out.push('\n');
    }

    if chart {
        let points = report.chart_points();
        if !points.is_empty() {
            out.push('\n');
            out.push_str(&bar_chart(&points));
        }
    }
    out
}

/// `error [CODE]: message`, or the JSON object.
pub fn error(err: &ApiError, json: bool) -> String {
    if json {
        serde_json::to_string(err).unwrap_or_else(|_| err.to_string())
    } else {
        format!("error [{}]: {}", err.code.as_str(), err.message)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
