//! # Session State
//!
//! The signed-in operator, passed explicitly to every command. All
//! permission checks go through [`SessionState::authorize`] and
//! [`SessionState::authorize_screen`], which wrap the `cafe_core` gate.

use tracing::{debug, warn};

use cafe_core::{authorize, authorize_screen, Action, Screen, Session};
use cafe_db::Database;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session: Option<Session>,
}

impl SessionState {
    /// No one signed in. Every check is denied.
    pub fn anonymous() -> Self {
        SessionState { session: None }
    }

    pub fn signed_in(session: Session) -> Self {
        SessionState {
            session: Some(session),
        }
    }

    /// Verifies credentials and builds the session.
    pub async fn login(db: &Database, username: &str, password: &str) -> ApiResult<Self> {
        if username.trim().is_empty() {
            return Err(ApiError::authentication_failed());
        }

        let user = db
            .users()
            .authenticate(username, password)
            .await?
            .ok_or_else(ApiError::authentication_failed)?;

        let session = Session::for_user(&user);
        debug!(username = %session.username, role = ?session.role, "Signed in");
        Ok(SessionState::signed_in(session))
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Gate for guarded operations.
    pub fn authorize(&self, action: Action) -> ApiResult<&Session> {
        authorize(self.session(), action).map_err(|e| {
            warn!(
                user = self.username(),
                action = %action,
                "Action denied"
            );
            ApiError::from(e)
        })
    }

    /// Gate for read-only views.
    pub fn authorize_screen(&self, screen: Screen) -> ApiResult<&Session> {
        authorize_screen(self.session(), screen).map_err(|e| {
            warn!(
                user = self.username(),
                screen = %screen,
                "Screen denied"
            );
            ApiError::from(e)
        })
    }

    fn username(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.username.as_str())
            .unwrap_or("<none>")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use cafe_core::Role;
    use cafe_db::DbConfig;

    #[tokio::test]
    async fn test_login() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users()
            .insert("rosa", "secret1", "Rosa", Role::InventoryClerk)
            .await
            .unwrap();

        let state = SessionState::login(&db, "rosa", "secret1").await.unwrap();
        let session = state.session().unwrap();
        assert_eq!(session.role, Some(Role::InventoryClerk));
        assert!(state.authorize(Action::AdjustStock).is_ok());
        assert!(state.authorize_screen(Screen::Sales).is_err());

        let err = SessionState::login(&db, "rosa", "nope").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthenticationFailed);
        let err = SessionState::login(&db, " ", "secret1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthenticationFailed);
    }

    #[test]
    fn test_anonymous_denied() {
        let state = SessionState::anonymous();
        let err = state.authorize(Action::CreateSale).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert!(state.authorize_screen(Screen::About).is_err());
    }
}
