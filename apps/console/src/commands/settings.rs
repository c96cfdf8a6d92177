//! # Settings Commands
//!
//! Business settings stored in the `settings` table. Admin only.

use tracing::info;

use cafe_core::validation::{validate_min_stock, validate_setting_key};
use cafe_core::{Action, Setting};
use cafe_db::Database;

use crate::error::{ApiError, ApiResult};
use crate::state::SessionState;

pub async fn list(db: &Database, session: &SessionState) -> ApiResult<Vec<Setting>> {
    session.authorize(Action::ViewSettings)?;
    Ok(db.settings().all().await?)
}

pub async fn get(db: &Database, session: &SessionState, key: &str) -> ApiResult<String> {
    session.authorize(Action::ViewSettings)?;
    db.settings()
        .get(key)
        .await?
        .ok_or_else(|| ApiError::not_found("Setting", key))
}

/// Stores `value` under `key`, creating the key if needed.
pub async fn set(db: &Database, session: &SessionState, key: &str, value: &str) -> ApiResult<()> {
    let session = session.authorize(Action::EditSettings)?;
    validate_setting_key(key)?;
    check_value(key, value)?;

    db.settings().set(key, value.trim()).await?;
    info!(key, by = %session.username, "Setting changed");
    Ok(())
}

/// Keys the application reads back as numbers or symbols.
fn check_value(key: &str, value: &str) -> ApiResult<()> {
    let value = value.trim();
    match key {
        "default_min_stock" => {
            let parsed = value.parse::<i64>().map_err(|_| {
                ApiError::validation("default_min_stock must be a whole number")
            })?;
            validate_min_stock(parsed)?;
        }
        "tax_rate" => {
            let parsed = value
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|r| (0.0..=100.0).contains(r));
            if parsed.is_none() {
                return Err(ApiError::validation("tax_rate must be a percentage between 0 and 100"));
            }
        }
        "currency_symbol" if value.is_empty() => {
            return Err(ApiError::validation("currency_symbol must not be empty"));
        }
        _ => {}
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
