//! # User Commands
//!
//! Staff accounts. Managing other accounts is admin only; anyone may
//! change their own password.

use tracing::info;

use cafe_core::validation::{validate_password, validate_username};
use cafe_core::{Action, Role, User};
use cafe_db::Database;

use crate::error::{ApiError, ApiResult};
use crate::state::SessionState;

pub async fn list(db: &Database, session: &SessionState) -> ApiResult<Vec<User>> {
    session.authorize(Action::ManageUsers)?;
    Ok(db.users().list_all().await?)
}

/// Creates an account. The display name defaults to the username.
pub async fn add(
    db: &Database,
    session: &SessionState,
    username: &str,
    password: &str,
    display_name: Option<&str>,
    role: Role,
) -> ApiResult<User> {
    let session = session.authorize(Action::ManageUsers)?;
    validate_username(username)?;
    validate_password(password)?;

    let display_name = display_name
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(username);

    let user = db
        .users()
        .insert(username, password, display_name, role)
        .await?;
    info!(username = %user.username, role = %role, by = %session.username, "Account created");
    Ok(user)
}

/// Deletes an account other than your own.
pub async fn delete(db: &Database, session: &SessionState, username: &str) -> ApiResult<()> {
    let session = session.authorize(Action::ManageUsers)?;
    let username = username.trim();

    if username == session.username {
        return Err(ApiError::validation("You cannot delete your own account"));
    }

    db.users().delete(username).await?;
    info!(username, by = %session.username, "Account deleted");
    Ok(())
}

/// Sets a new password for `username`.
pub async fn change_password(
    db: &Database,
    session: &SessionState,
    username: &str,
    new_password: &str,
) -> ApiResult<()> {
    let username = username.trim();
    let session = match session.session() {
        Some(own) if own.username == username => own,
        _ => session.authorize(Action::ManageUsers)?,
    };

    validate_password(new_password)?;
    db.users().set_password(username, new_password).await?;
    info!(username, by = %session.username, "Password changed");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
