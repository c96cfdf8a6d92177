//! # Commands Module
//!
//! Everything the console can do, one module per area.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── product.rs    ◄─── Catalog and stock
//! ├── customer.rs   ◄─── Customers
//! ├── sale.rs       ◄─── Cart building and commit, sale history
//! ├── report.rs     ◄─── Report building, preview and export
//! ├── dashboard.rs  ◄─── Summary screen
//! ├── settings.rs   ◄─── Business settings
//! ├── user.rs       ◄─── Staff accounts
//! └── audit.rs      ◄─── Audit log
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  pub async fn create(                                                   │
//! │      db: &Database,                                                     │
//! │      session: &SessionState,   ◄── explicit, never global               │
//! │      input: ProductInput,                                               │
//! │  ) -> ApiResult<Product>                                                │
//! │         │                                                               │
//! │         ├── session.authorize(Action::CreateProduct)?   FIRST          │
//! │         ├── validate_product(&input)?                                  │
//! │         └── db.products().insert(&input).await?                        │
//! │                                                                         │
//! │  Read-only commands check the screen instead:                          │
//! │      session.authorize_screen(Screen::Inventory)?                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands return data; printing lives in [`crate::output`].

pub mod audit;
pub mod customer;
pub mod dashboard;
pub mod product;
pub mod report;
pub mod sale;
pub mod settings;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support {
    use cafe_core::{Product, ProductInput, Role, Session};
    use cafe_db::{Database, DbConfig};

    use crate::state::SessionState;

    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Creates an account with `role` and signs it in.
    pub async fn as_role(db: &Database, role: Role) -> SessionState {
        let user = db
            .users()
            .insert(role.as_str(), "secret1", role.as_str(), role)
            .await
            .unwrap();
        SessionState::signed_in(Session::for_user(&user))
    }

    pub async fn product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
        db.products()
            .insert(&ProductInput {
                name: name.to_string(),
                category: "Hot Drinks".to_string(),
                price_cents,
                stock,
                min_stock: 2,
                description: String::new(),
            })
            .await
            .unwrap()
    }
}
