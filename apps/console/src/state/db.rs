//! # Database State
//!
//! Opens the `Database` for a console invocation.
//!
//! ## Startup
//! ```text
//! ConfigState ──► Database::new (directory, pool, migrations)
//!                          │
//!                          ▼
//!              bootstrap::ensure_defaults
//!              (admin account, default settings)
//!
//! Any failure here ──► PERSISTENCE_UNAVAILABLE, no command runs
//! ```

use cafe_db::bootstrap::{ensure_defaults, BootstrapReport};
use cafe_db::{Database, DbConfig};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::ConfigState;

/// Wrapper around `Database` for the console commands.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Opens the configured database, migrates it and applies first-run
    /// defaults.
    pub async fn open(config: &ConfigState) -> ApiResult<(DbState, BootstrapReport)> {
        let db_config = DbConfig::new(&config.db_path).max_connections(config.max_connections);
        let db = Database::new(db_config)
            .await
            .map_err(ApiError::persistence_unavailable)?;

        let report = ensure_defaults(&db, &config.admin_password)
            .await
            .map_err(ApiError::persistence_unavailable)?;

        info!(path = %config.db_path.display(), "Database ready");
        Ok((DbState::new(db), report))
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
