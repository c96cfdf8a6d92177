//! # Configuration State
//!
//! Stores console configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command line flags (`--db`)
//! 2. Environment variables (`CAFE_*`)
//! 3. Database `settings` table (currency symbol)
//! 4. Defaults (this file)
//!
//! Read-only after startup.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Serialize;
use thiserror::Error;

use cafe_core::Money;
use cafe_db::bootstrap::DEFAULT_ADMIN_PASSWORD;

/// Invalid configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number between {min} and {max}, got '{value}'")]
    OutOfRange {
        var: &'static str,
        value: String,
        min: u32,
        max: u32,
    },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },

    #[error("CAFE_ADMIN_PASSWORD must be at least 6 characters")]
    WeakAdminPassword,

    #[error("Could not determine an app data directory; set CAFE_DB_PATH")]
    NoDataDir,
}

/// Console configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigState {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Where exported reports go when `--out` is not given.
    pub export_dir: PathBuf,

    /// Symbol shown before amounts.
    pub currency_symbol: String,

    /// True when the symbol came from `CAFE_CURRENCY_SYMBOL`, in which case
    /// the `currency_symbol` setting is ignored.
    #[serde(skip)]
    pub currency_overridden: bool,

    /// Password for the admin account created on first run.
    #[serde(skip)]
    pub admin_password: String,

    /// Pool size.
    pub max_connections: u32,

    /// Raw `CAFE_MAX_CONNECTIONS`, checked by [`ConfigState::validate`].
    #[serde(skip)]
    max_connections_raw: Option<String>,
}

impl Default for ConfigState {
    /// Returns defaults suitable for a single till.
    ///
    /// ## Default Values
    /// - Database: `cafe.db` in the platform data directory
    /// - Exports: current directory
    /// - Currency: `S/`
    /// - Pool: 5 connections
    fn default() -> Self {
        ConfigState {
            db_path: default_database_path().unwrap_or_else(|| PathBuf::from("cafe.db")),
            export_dir: PathBuf::from("."),
            currency_symbol: "S/".to_string(),
            currency_overridden: false,
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            max_connections: 5,
            max_connections_raw: None,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `CAFE_DB_PATH`: Database file
    /// - `CAFE_EXPORT_DIR`: Default export directory
    /// - `CAFE_CURRENCY_SYMBOL`: Currency symbol override
    /// - `CAFE_ADMIN_PASSWORD`: Initial admin password
    /// - `CAFE_MAX_CONNECTIONS`: Pool size
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Like [`ConfigState::from_env`], reading variables through `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ConfigState::default();

        if let Some(path) = var("CAFE_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(dir) = var("CAFE_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }

        if let Some(symbol) = var("CAFE_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol.trim().to_string();
            config.currency_overridden = true;
        }

        if let Some(password) = var("CAFE_ADMIN_PASSWORD") {
            config.admin_password = password;
        }

        if let Some(raw) = var("CAFE_MAX_CONNECTIONS") {
            if let Ok(n) = raw.trim().parse::<u32>() {
                config.max_connections = n;
            }
            config.max_connections_raw = Some(raw);
        }

        config
    }

    /// Checks every value, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Empty { var: "CAFE_DB_PATH" });
        }

        if self.currency_symbol.is_empty() {
            return Err(ConfigError::Empty {
                var: "CAFE_CURRENCY_SYMBOL",
            });
        }

        if self.admin_password.chars().count() < 6 {
            return Err(ConfigError::WeakAdminPassword);
        }

        let parsed = match &self.max_connections_raw {
            Some(raw) => raw.trim().parse::<u32>().ok(),
            None => Some(self.max_connections),
        };
        match parsed {
            Some(n) if (1..=32).contains(&n) => Ok(()),
            _ => Err(ConfigError::OutOfRange {
                var: "CAFE_MAX_CONNECTIONS",
                value: self
                    .max_connections_raw
                    .clone()
                    .unwrap_or_else(|| self.max_connections.to_string()),
                min: 1,
                max: 32,
            }),
        }
    }

    /// Adopts the stored `currency_symbol` setting unless the environment
    /// already chose one.
    pub fn apply_currency_setting(&mut self, stored: Option<String>) {
        if self.currency_overridden {
            return;
        }
        if let Some(symbol) = stored.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            self.currency_symbol = symbol;
        }
    }

    /// Formats an amount with the currency symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "S/ 12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        amount.with_symbol(&self.currency_symbol)
    }
}

/// `cafe.db` in the platform data directory, created if missing.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.cafe.pos/cafe.db`
/// - **Windows**: `%APPDATA%\cafe\pos\data\cafe.db`
/// - **Linux**: `~/.local/share/pos/cafe.db`
pub fn default_database_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("com", "cafe", "pos")?;
    Some(dirs.data_dir().join("cafe.db"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_cents(1234)), "S/ 12.34");
        assert_eq!(config.format_currency(Money::from_cents(0)), "S/ 0.00");
        assert_eq!(config.format_currency(Money::from_cents(-550)), "-S/ 5.50");
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigState::from_vars(vars(&[
            ("CAFE_DB_PATH", "/tmp/shop.db"),
            ("CAFE_EXPORT_DIR", "/tmp/out"),
            ("CAFE_CURRENCY_SYMBOL", "$"),
            ("CAFE_MAX_CONNECTIONS", "3"),
        ]));

        assert_eq!(config.db_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.max_connections, 3);
        assert!(config.validate().is_ok());
        assert_eq!(config.format_currency(Money::from_cents(100)), "$ 1.00");
    }

    #[test]
    fn test_currency_setting_precedence() {
        let mut config = ConfigState::from_vars(vars(&[]));
        config.apply_currency_setting(Some("€".to_string()));
        assert_eq!(config.currency_symbol, "€");

        let mut config = ConfigState::from_vars(vars(&[("CAFE_CURRENCY_SYMBOL", "$")]));
        config.apply_currency_setting(Some("€".to_string()));
        assert_eq!(config.currency_symbol, "$");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ConfigState::from_vars(vars(&[("CAFE_MAX_CONNECTIONS", "lots")]));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));

        let config = ConfigState::from_vars(vars(&[("CAFE_MAX_CONNECTIONS", "0")]));
        assert!(config.validate().is_err());

        let config = ConfigState::from_vars(vars(&[("CAFE_ADMIN_PASSWORD", "123")]));
        assert_eq!(config.validate(), Err(ConfigError::WeakAdminPassword));

        let config = ConfigState::from_vars(vars(&[("CAFE_CURRENCY_SYMBOL", "  ")]));
        assert!(matches!(config.validate(), Err(ConfigError::Empty { .. })));
    }
}
