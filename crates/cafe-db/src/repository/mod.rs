//! # Repository Module
//!
//! Database repository implementations for Cafe POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Console command                                                       │
//! │       │                                                                 │
//! │       │  db.products().search("latte")                                 │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── search(&self, query)                                              │
//! │  ├── require(&self, id)                                                │
//! │  ├── insert(&self, input)                                              │
//! │  └── set_stock(&self, id, stock)                                       │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Every repository returns typed rows with named fields.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog and stock
//! - [`sale::SaleRepository`] - Transactional commit, history, aggregates
//! - [`customer::CustomerRepository`] - Customers and purchase activity
//! - [`user::UserRepository`] - Staff accounts and login
//! - [`setting::SettingRepository`] - Business settings
//! - [`audit::AuditRepository`] - Trigger-written audit log

pub mod audit;
pub mod customer;
pub mod product;
pub mod sale;
pub mod setting;
pub mod user;
