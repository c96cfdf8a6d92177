//! # State Module
//!
//! State for one console invocation, split into focused types so each
//! command takes only what it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │   DbState    │  │  SessionState    │  │   ConfigState    │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Database    │  │  Option<Session> │  │  db_path         │          │
//! │  │  (SQLite     │  │  authorize()     │  │  export_dir      │          │
//! │  │   pool)      │  │  authorize_      │  │  currency_symbol │          │
//! │  │              │  │    screen()      │  │  max_connections │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  ConfigState is read-only once the currency setting is applied.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod session;

pub use config::{default_database_path, ConfigError, ConfigState};
pub use db::DbState;
pub use session::SessionState;
