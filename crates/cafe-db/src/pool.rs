//! # Database Handle
//!
//! Opens the SQLite file, migrates it and hands out repositories.
//!
//! ## Opening
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new(path).max_connections(n)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config)                                                  │
//! │       ├── create the parent directory (file databases only)             │
//! │       ├── WAL, NORMAL sync, foreign_keys = ON, busy timeout             │
//! │       ├── SqlitePool (max_connections)                                  │
//! │       └── embedded migrations                                           │
//! │                                                                         │
//! │  products().list_all() ──► any pooled connection                        │
//! │  sales().commit_sale() ──► one connection, held for the transaction     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two `cafe` processes may share one file. A writer that finds the file
//! locked waits up to `busy_timeout` before the statement fails, so two
//! tills committing at once serialize instead of erroring.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::audit::AuditRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::setting::SettingRepository;
use crate::repository::user::UserRepository;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives and how many connections to pool.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Default: 5, plenty for one till and a report export.
    pub max_connections: u32,

    /// How long a statement waits on another process's write lock.
    /// Default: 5 seconds
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// A file database at `path`, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    /// A private in-memory database, migrated like a real one. Tests use it.
    ///
    /// Every connection would get its own empty database, so the pool is
    /// held at one connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            busy_timeout: Duration::from_secs(1),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Pooled access to the cafe database.
///
/// Cloning is cheap (the pool is reference counted). Each accessor hands
/// out a short-lived repository sharing the same pool.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("cafe.db")).await?;
/// let low = db.products().low_stock().await?;
/// let sale_id = db.sales().commit_sale(&draft, "Ana", Some(user_id)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) and migrates the database.
    ///
    /// ## Errors
    /// `ConnectionFailed` when the directory or file cannot be created or
    /// opened; `MigrationFailed` when the schema cannot be applied.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            create_parent_dir(&config.database_path)?;
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        }
        // off by default in SQLite; sale_lines and the RESTRICT on products need it
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout);

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if config.is_in_memory() {
            // the data dies with the connection
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool created");

        migrations::run_migrations(&pool).await?;

        Ok(Database { pool })
    }

    /// The underlying pool, for statements no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    /// Staff accounts.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn settings(&self) -> SettingRepository {
        SettingRepository::new(self.pool.clone())
    }

    pub fn audit(&self) -> AuditRepository {
        AuditRepository::new(self.pool.clone())
    }
}

fn create_parent_dir(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| {
                DbError::ConnectionFailed(format!("cannot create {}: {}", parent.display(), e))
            }),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
