//! # Customer Commands
//!
//! Registered customers. Sales also register customers implicitly on
//! commit; these commands manage the records directly.

use tracing::info;

use cafe_core::validation::{validate_customer, validate_search_query};
use cafe_core::{Action, Customer, CustomerActivity, CustomerInput, Screen};
use cafe_db::Database;

use crate::error::ApiResult;
use crate::state::SessionState;

/// Field changes for `customer edit`. An empty email or phone clears it.
#[derive(Debug, Clone, Default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CustomerPatch {
    fn apply(self, customer: &Customer) -> CustomerInput {
        CustomerInput {
            name: self.name.unwrap_or_else(|| customer.name.clone()),
            email: self.email.or_else(|| customer.email.clone()),
            phone: self.phone.or_else(|| customer.phone.clone()),
        }
    }
}

pub async fn list(db: &Database, session: &SessionState) -> ApiResult<Vec<Customer>> {
    session.authorize_screen(Screen::Customers)?;
    Ok(db.customers().list_all().await?)
}

pub async fn search(db: &Database, session: &SessionState, query: &str) -> ApiResult<Vec<Customer>> {
    session.authorize_screen(Screen::Customers)?;
    let query = validate_search_query(query)?;
    Ok(db.customers().find_by_name(&query).await?)
}

pub async fn show(db: &Database, session: &SessionState, id: i64) -> ApiResult<Customer> {
    session.authorize_screen(Screen::Customers)?;
    Ok(db.customers().require(id).await?)
}

/// Customers with the most purchases.
pub async fn frequent(
    db: &Database,
    session: &SessionState,
    limit: u32,
) -> ApiResult<Vec<CustomerActivity>> {
    session.authorize_screen(Screen::Customers)?;
    Ok(db.customers().frequent(limit).await?)
}

pub async fn create(
    db: &Database,
    session: &SessionState,
    input: CustomerInput,
) -> ApiResult<Customer> {
    let session = session.authorize(Action::CreateCustomer)?;
    validate_customer(&input)?;

    let customer = db.customers().insert(&input).await?;
    info!(id = customer.id, by = %session.username, "Customer created");
    Ok(customer)
}

pub async fn update(
    db: &Database,
    session: &SessionState,
    id: i64,
    patch: CustomerPatch,
) -> ApiResult<Customer> {
    session.authorize(Action::EditCustomer)?;

    let current = db.customers().require(id).await?;
    let input = patch.apply(&current);
    validate_customer(&input)?;

    db.customers().update(id, &input).await?;
    Ok(db.customers().require(id).await?)
}

/// Removes the record. Past sales keep the customer's name.
pub async fn delete(db: &Database, session: &SessionState, id: i64) -> ApiResult<()> {
    let session = session.authorize(Action::DeleteCustomer)?;
    db.customers().delete(id).await?;
    info!(id, by = %session.username, "Customer deleted");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
