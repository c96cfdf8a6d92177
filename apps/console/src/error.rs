//! # API Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Cafe POS                               │
//! │                                                                         │
//! │  Command Function  ── Result<T, ApiError>                              │
//! │         │                                                               │
//! │         ├── CoreError   (cart, permissions, validation) ──┐            │
//! │         ├── DbError     (logged, generic message)  ───────┤            │
//! │         ├── ExportError (NoData or ExportFailed)   ───────┤            │
//! │         │                                                  ▼            │
//! │         │                                         ApiError { code,     │
//! │         │                                                    message } │
//! │         ▼                                                  │            │
//! │  main.rs prints "error [CODE]: message" to stderr ◄────────┘            │
//! │          (or the JSON object with --json) and exits non-zero            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use cafe_core::CoreError;
use cafe_db::DbError;
use cafe_reports::ExportError;

use crate::state::ConfigError;

/// Error returned from console commands.
///
/// ## Serialization
/// With `--json` the operator sees:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Latte: available 10, requested 13"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Quantity text did not parse or was not positive
    InvalidQuantity,

    /// Requested more than the product's stock
    InsufficientStock,

    /// Commit with an empty cart
    EmptySale,

    /// The sale transaction failed and was rolled back
    CommitFailed,

    /// Database could not be opened at startup
    PersistenceUnavailable,

    /// Report file could not be written
    ExportFailed,

    /// Role may not perform the action or open the screen
    PermissionDenied,

    /// Unknown user or wrong password
    AuthenticationFailed,

    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Report has no rows or only zero amounts
    NoData,

    /// Database operation failed
    DatabaseError,

    /// Internal error
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidQuantity => "INVALID_QUANTITY",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::EmptySale => "EMPTY_SALE",
            ErrorCode::CommitFailed => "COMMIT_FAILED",
            ErrorCode::PersistenceUnavailable => "PERSISTENCE_UNAVAILABLE",
            ErrorCode::ExportFailed => "EXPORT_FAILED",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NoData => "NO_DATA",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// A failed sale commit. The cause is logged; the operator only learns
    /// that nothing was saved, plus the stock hint when that was the cause.
    pub fn commit_failed(err: DbError) -> Self {
        tracing::error!(error = %err, "Sale commit failed");
        let message = match err {
            DbError::StockConflict { product_id, .. } => format!(
                "Sale not saved: stock for product {} changed, review the cart",
                product_id
            ),
            _ => "Sale not saved, the cart is unchanged".to_string(),
        };
        ApiError::new(ErrorCode::CommitFailed, message)
    }

    /// The database could not be opened.
    pub fn persistence_unavailable(err: DbError) -> Self {
        tracing::error!(error = %err, "Database unavailable");
        ApiError::new(
            ErrorCode::PersistenceUnavailable,
            "Database is not available",
        )
    }

    pub fn authentication_failed() -> Self {
        ApiError::new(ErrorCode::AuthenticationFailed, "Invalid username or password")
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(
                    ErrorCode::ValidationError,
                    "Record is still referenced by other records",
                )
            }
            DbError::ConstraintViolation(message) => {
                tracing::error!("Constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Value not allowed")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Connection failed: {}", e);
                ApiError::new(ErrorCode::PersistenceUnavailable, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::PersistenceUnavailable, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::StockConflict { .. } | DbError::TransactionFailed(_) => {
                ApiError::commit_failed(err)
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PasswordHash(e) => {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::internal("Password could not be processed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InvalidQuantity { .. } => ErrorCode::InvalidQuantity,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::EmptySale => ErrorCode::EmptySale,
            CoreError::NotInCart(_) => ErrorCode::NotFound,
            CoreError::PermissionDenied { .. } | CoreError::ScreenDenied { .. } => {
                ErrorCode::PermissionDenied
            }
            CoreError::AmountTooLarge { .. } | CoreError::Validation(_) => {
                ErrorCode::ValidationError
            }
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<cafe_core::ValidationError> for ApiError {
    fn from(err: cafe_core::ValidationError) -> Self {
        ApiError::from(CoreError::from(err))
    }
}

/// Converts export errors to API errors.
impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NoData { kind } => ApiError::new(
                ErrorCode::NoData,
                format!("No data to export for {}", kind),
            ),
            other => {
                tracing::error!(error = %other, "Export failed");
                ApiError::new(ErrorCode::ExportFailed, "Report could not be written")
            }
        }
    }
}

/// An invalid `CAFE_*` value stops startup before the database is opened.
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::validation(format!("Configuration: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for console commands.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_codes() {
        let err: ApiError = CoreError::EmptySale.into();
        assert_eq!(err.code, ErrorCode::EmptySale);

        let err: ApiError = CoreError::PermissionDenied {
            action: "delete-sale".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.to_string(), "[PERMISSION_DENIED] Permission denied: delete-sale");
    }

    #[test]
    fn test_db_details_are_not_leaked() {
        let err: ApiError = DbError::QueryFailed("near \"SELEC\": syntax error".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("SELEC"));

        let err = ApiError::commit_failed(DbError::TransactionFailed("disk I/O".to_string()));
        assert_eq!(err.code, ErrorCode::CommitFailed);
        assert!(!err.message.contains("disk"));
    }

    #[test]
    fn test_serialized_code() {
        let err = ApiError::new(ErrorCode::NoData, "nothing");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"NO_DATA","message":"nothing"}"#);
    }
}
