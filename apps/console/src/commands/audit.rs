//! # Audit Command
//!
//! Recent entries written by the sales trigger. Admin only.

use cafe_core::{Action, AuditEntry};
use cafe_db::Database;

use crate::error::ApiResult;
use crate::state::SessionState;

pub async fn recent(db: &Database, session: &SessionState, limit: u32) -> ApiResult<Vec<AuditEntry>> {
    session.authorize(Action::ViewAudit)?;
    Ok(db.audit().recent(limit).await?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sale::{build_cart, commit_sale, ItemArg};
    use crate::commands::test_support::{as_role, db, product};
    use crate::error::ErrorCode;
    use cafe_core::Role;

    #[tokio::test]
    async fn test_sales_show_up_for_admin_only() {
        let db = db().await;
        let admin = as_role(&db, Role::Admin).await;
        let seller = as_role(&db, Role::Salesperson).await;
        let latte = product(&db, "Latte", 350, 10).await;

        let items = [ItemArg {
            product_id: latte.id,
            quantity: "2".to_string(),
        }];
        let mut cart = build_cart(&db, &seller, &items, &[]).await.unwrap();
        let receipt = commit_sale(&db, &seller, &mut cart, "Ana").await.unwrap();

        let entries = recent(&db, &admin, 5).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].detail.starts_with(&format!("Sale #{}", receipt.sale.id)));

        let err = recent(&db, &seller, 5).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }
}
