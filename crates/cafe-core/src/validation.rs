//! # Validation Module
//!
//! Input validation for forms and command arguments.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console (clap)                                               │
//! │  └── Type parsing of arguments                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rules (required names, non-negative stock, ...)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (stock >= 0) constraints                         │
//! │  ├── UNIQUE (username, setting key)                                    │
//! │  └── Foreign keys (sale lines → products)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{CustomerInput, ProductInput};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 100;
const MAX_CATEGORY_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 500;
const MIN_PASSWORD_LEN: usize = 6;

/// Highest unit price accepted: 1,000,000.00.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Highest stock level accepted.
pub const MAX_STOCK: i64 = 1_000_000_000;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
///
/// ## Example
/// ```rust
/// use cafe_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Flat White").is_ok());
/// assert!(validate_product_name("  ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("name", name, MAX_NAME_LEN)
}

/// Validates a customer name. Same rules as product names.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required("customer name", name, MAX_NAME_LEN)
}

/// Validates a login name.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - No whitespace
pub fn validate_username(username: &str) -> ValidationResult<()> {
    required("username", username, 50)?;

    if username.trim().chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    Ok(())
}

/// Validates a new password.
///
/// ## Rules
/// - At least 6 characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::OutOfRange {
            field: "password length".to_string(),
            min: MIN_PASSWORD_LEN as i64,
            max: 128,
        });
    }

    Ok(())
}

/// Validates an optional email address.
///
/// Only checks the shape `local@domain.tld`; deliverability is not checked.
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string (may be empty, meaning "everything").
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a settings key: lowercase letters, digits and underscores.
pub fn validate_setting_key(key: &str) -> ValidationResult<()> {
    required("key", key, 64)?;

    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "key".to_string(),
            reason: "use lowercase letters, digits and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
///
/// ## Example
/// ```rust
/// use cafe_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(350).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(i64::MAX).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    in_range("price", cents, MAX_PRICE_CENTS)
}

/// Validates a stock level (absolute). Must be in `0..=MAX_STOCK`.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    in_range("stock", stock, MAX_STOCK)
}

/// Validates a low-stock threshold. Same range as stock.
pub fn validate_min_stock(min_stock: i64) -> ValidationResult<()> {
    in_range("minimum stock", min_stock, MAX_STOCK)
}

fn in_range(field: &str, value: i64, max: i64) -> ValidationResult<()> {
    if !(0..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates every field of a product form.
pub fn validate_product(input: &ProductInput) -> ValidationResult<()> {
    validate_product_name(&input.name)?;
    if input.category.trim().chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: MAX_CATEGORY_LEN,
        });
    }
    if input.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }
    validate_price_cents(input.price_cents)?;
    validate_stock(input.stock)?;
    validate_min_stock(input.min_stock)
}

/// Validates every field of a customer form.
pub fn validate_customer(input: &CustomerInput) -> ValidationResult<()> {
    validate_customer_name(&input.name)?;
    validate_email(input.email.as_deref())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn latte() -> ProductInput {
        ProductInput {
            name: "Latte".to_string(),
            category: "Hot Drinks".to_string(),
            price_cents: 350,
            stock: 10,
            min_stock: 5,
            description: String::new(),
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Cappuccino").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&latte()).is_ok());

        let mut bad = latte();
        bad.stock = -1;
        assert!(matches!(
            validate_product(&bad),
            Err(ValidationError::OutOfRange { .. })
        ));

        let mut bad = latte();
        bad.min_stock = -5;
        assert!(validate_product(&bad).is_err());

        let mut bad = latte();
        bad.price_cents = -1;
        assert!(validate_product(&bad).is_err());
    }

    #[test]
    fn test_amount_upper_bounds() {
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents(i64::MAX).is_err());
        assert!(validate_stock(MAX_STOCK).is_ok());
        assert!(validate_stock(MAX_STOCK + 1).is_err());
        assert!(validate_min_stock(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(None).is_ok());
        assert!(validate_email(Some("")).is_ok());
        assert!(validate_email(Some("ana@cafe.pe")).is_ok());
        assert!(validate_email(Some("ana")).is_err());
        assert!(validate_email(Some("@cafe.pe")).is_err());
        assert!(validate_email(Some("ana@cafe")).is_err());
    }

    #[test]
    fn test_validate_username_and_password() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("two words").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_password("admin123").is_ok());
        assert!(validate_password("123").is_err());
    }

    #[test]
    fn test_validate_setting_key() {
        assert!(validate_setting_key("currency_symbol").is_ok());
        assert!(validate_setting_key("Currency").is_err());
        assert!(validate_setting_key("with space").is_err());
    }

    #[test]
    fn test_validate_customer() {
        let input = CustomerInput {
            name: "Ana".to_string(),
            email: Some("not-an-email".to_string()),
            phone: None,
        };
        assert!(validate_customer(&input).is_err());
    }
}
