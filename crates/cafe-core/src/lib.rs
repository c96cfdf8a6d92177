//! # cafe-core: Pure Business Logic for the Cafe POS
//!
//! Domain types, role tables, the sale builder and report normalization.
//! Nothing in this crate touches the database or the file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Cafe POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Console (`cafe` binary)                      │   │
//! │  │    product ─ customer ─ sale ─ report ─ settings ─ user        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ authorize(session, action)             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cafe-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │ access  │ │  cart   │ │ report  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌───────────────────────┐     │     ┌───────────────────────────────┐ │
//! │  │  cafe-db (SQLite)     │◄────┴────►│  cafe-reports (PDF/XLSX/CSV)  │ │
//! │  └───────────────────────┘           └───────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Product, Sale, Customer, User, ...)
//! - [`money`] - Integer-cent money
//! - [`access`] - Screens, actions, sessions and the authorization gate
//! - [`cart`] - The in-memory sale builder
//! - [`report`] - Canonical report rows, normalization and summaries
//! - [`error`] - Domain error types
//! - [`validation`] - Form validation
//!
//! ## Example Usage
//!
//! ```rust
//! use cafe_core::cart::SaleBuilder;
//! use cafe_core::{Money, Product};
//! use chrono::Utc;
//!
//! let latte = Product {
//!     id: 1,
//!     name: "Latte".to_string(),
//!     category: "Hot Drinks".to_string(),
//!     price_cents: 350,
//!     stock: 10,
//!     min_stock: 5,
//!     description: String::new(),
//!     created_at: Utc::now(),
//! };
//!
//! let mut sale = SaleBuilder::new();
//! sale.add(&latte, 4).unwrap();
//! assert_eq!(sale.total(), Money::from_cents(1400));
//! assert!(sale.add(&latte, 7).is_err()); // 11 > 10 in stock
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod cart;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use cafe_core::Money` instead of
// `use cafe_core::money::Money`

pub use access::{authorize, authorize_screen, Action, Screen, Session};
pub use cart::{CartLine, SaleBuilder, SaleDraft};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{Report, ReportKind, ReportRows, ReportSummary};
pub use types::*;
