//! # First-Run Bootstrap
//!
//! Puts a freshly migrated database into a usable state: one admin account
//! and the default business settings. Safe to run on every start.

use serde::Serialize;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use cafe_core::Role;

/// Username of the account created when no admin exists.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Initial admin password when none is configured.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// `(key, value, description)` inserted when missing.
pub const DEFAULT_SETTINGS: &[(&str, &str, &str)] = &[
    ("business_name", "Nexus Coffee", "Business name printed on reports"),
    ("business_address", "", "Business address"),
    ("business_phone", "01-2345678", "Contact phone"),
    ("business_email", "info@nexuscafe.com", "Contact email"),
    ("business_tax_id", "", "Tax identification number"),
    ("tax_rate", "0", "Sales tax rate in percent"),
    ("backup_path", "backups", "Directory for database backups"),
    ("backup_schedule", "daily", "Backup frequency"),
    ("currency_symbol", "S/", "Currency symbol for amounts"),
    ("default_min_stock", "10", "Minimum stock for new products"),
    ("theme", "light", "Interface theme"),
];

/// What [`ensure_defaults`] had to create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub admin_created: bool,
    pub settings_inserted: usize,
}

/// Creates the admin account if no admin exists and inserts missing
/// default settings. Existing values are never overwritten.
pub async fn ensure_defaults(db: &Database, admin_password: &str) -> DbResult<BootstrapReport> {
    let mut report = BootstrapReport::default();

    if db.users().count_with_role(Role::Admin).await? == 0 {
        db.users()
            .insert(
                DEFAULT_ADMIN_USERNAME,
                admin_password,
                "Administrator",
                Role::Admin,
            )
            .await?;
        report.admin_created = true;
        info!(username = DEFAULT_ADMIN_USERNAME, "Default admin account created");
    }

    let settings = db.settings();
    for (key, value, description) in DEFAULT_SETTINGS {
        if settings.insert_default(key, value, description).await? {
            report.settings_inserted += 1;
        }
    }

    if report.settings_inserted > 0 {
        info!(count = report.settings_inserted, "Default settings inserted");
    }

    Ok(report)
}

// =============================================================================
// Unit Tests
// =============================================================================
